use vblank_core::core::Bus;

/// Minimal bus for testing: flat 64KB read/write memory plus a port log.
pub struct TestBus {
    pub memory: [u8; 0x10000],
    pub port_in: [u8; 0x100],
    pub port_writes: Vec<(u8, u8)>,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            port_in: [0; 0x100],
            port_writes: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }
}

impl Bus for TestBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
    }

    fn io_read(&mut self, port: u8) -> u8 {
        self.port_in[port as usize]
    }

    fn io_write(&mut self, port: u8, data: u8) {
        self.port_writes.push((port, data));
    }
}
