use crate::interrupt::InterruptVector;

/// Machine-agnostic interface for an emulated board.
///
/// The lifecycle loop in [`crate::runner`] only talks to the board through
/// this trait: it fetches and executes one operation at a time, injects
/// interrupts when the engine accepts them, and reads the video bitplane
/// once per frame. It never writes memory.
pub trait Machine {
    /// Native display resolution as (width, height) in pixels.
    fn display_size(&self) -> (u32, u32);

    /// The 1bpp video bitplane, in the board's native scan order.
    ///
    /// Must hold at least `width * height` bits (from `display_size()`).
    fn video_memory(&self) -> &[u8];

    /// Engine-owned interrupt-enable flag (8080 INTE).
    fn interrupt_enabled(&self) -> bool;

    /// Read the next opcode byte and advance the program counter.
    fn fetch_next_operation(&mut self) -> u8;

    /// Execute one operation. Returns `true` if the engine halted.
    fn execute(&mut self, opcode: u8) -> bool;

    /// Service an interrupt: run the vector's restart instruction ahead of
    /// the normally fetched stream. Returns `true` if the engine halted.
    fn interrupt(&mut self, vector: InterruptVector) -> bool;

    /// Reset the machine to its initial power-on state.
    fn reset(&mut self);
}
