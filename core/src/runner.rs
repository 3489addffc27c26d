//! The top-level emulation loop.
//!
//! One iteration: poll for quit, hand any pending interrupt to the engine,
//! fetch and execute one operation, then sample the clock and refresh the
//! display when a frame boundary is crossed. The loop busy-polls the clock
//! instead of sleeping; interrupt points are only as fine as one instruction.

use std::time::{Duration, Instant};

use crate::core::Machine;
use crate::interrupt::{Scheduler, Tick};
use crate::video::{self, Geometry, PixelTarget, RenderError};

/// Monotonic time source for frame pacing.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin. Never decreases.
    fn now(&mut self) -> Duration;
}

/// Wall-clock pacing backed by [`Instant`].
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

/// The presentation side of the loop: a pixel target plus quit polling.
pub trait Host: PixelTarget {
    /// Drain pending window events without blocking. Returns `true` if the
    /// application was asked to quit.
    fn poll_quit(&mut self) -> bool;
}

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shutdown {
    /// The host reported a quit request.
    Quit,
    /// The engine executed a halt.
    Halt,
}

/// Run `machine` until the host quits or the engine halts.
///
/// Render failures end the loop with an error; the caller owns teardown.
pub fn run<M, H, C>(
    machine: &mut M,
    host: &mut H,
    scheduler: &mut Scheduler,
    clock: &mut C,
) -> Result<Shutdown, RenderError>
where
    M: Machine + ?Sized,
    H: Host + ?Sized,
    C: Clock + ?Sized,
{
    let geometry = Geometry::from(machine.display_size());

    loop {
        if host.poll_quit() {
            return Ok(Shutdown::Quit);
        }

        if let Some(vector) = scheduler.deliver(machine.interrupt_enabled())
            && machine.interrupt(vector)
        {
            return Ok(Shutdown::Halt);
        }

        let opcode = machine.fetch_next_operation();
        if machine.execute(opcode) {
            return Ok(Shutdown::Halt);
        }

        if scheduler.tick(clock.now()) == Tick::Frame {
            video::render(machine.video_memory(), geometry, host)?;
        }
    }
}
