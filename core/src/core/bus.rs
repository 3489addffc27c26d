/// Memory and I/O interface seen by the execution engine.
pub trait Bus {
    type Address: Copy + Into<u64>;
    type Data;

    fn read(&mut self, addr: Self::Address) -> Self::Data;
    fn write(&mut self, addr: Self::Address, data: Self::Data);

    /// Read from the I/O port space (separate from memory on the 8080).
    /// Default: nothing connected, the port reads as zero.
    fn io_read(&mut self, _port: u8) -> u8 {
        0x00
    }

    /// Write to the I/O port space. Default: ignored.
    fn io_write(&mut self, _port: u8, _data: u8) {}
}
