use tracing::{debug, info};

use vblank_core::core::{Bus, Machine};
use vblank_core::cpu::I8080;
use vblank_core::cpu::state::{CpuStateTrait, I8080State};
use vblank_core::interrupt::InterruptVector;

use crate::registry::MachineEntry;
use crate::rom_loader::{ChecksumPolicy, RomEntry, RomLoadError, RomRegion, RomSet};

// ---------------------------------------------------------------------------
// Space Invaders ROM definitions ("invaders" Midway set)
// ---------------------------------------------------------------------------

/// Program ROM: 8KB at 0x0000-0x1FFF as four 2KB chips.
pub static INVADERS_SPLIT_ROM: RomRegion = RomRegion {
    size: 0x2000,
    entries: &[
        RomEntry {
            name: "invaders.h",
            size: 0x0800,
            offset: 0x0000,
            crc32: Some(0x734f5ad8),
        },
        RomEntry {
            name: "invaders.g",
            size: 0x0800,
            offset: 0x0800,
            crc32: Some(0x6bfaca4a),
        },
        RomEntry {
            name: "invaders.f",
            size: 0x0800,
            offset: 0x1000,
            crc32: Some(0x0ccead96),
        },
        RomEntry {
            name: "invaders.e",
            size: 0x0800,
            offset: 0x1800,
            crc32: Some(0x14e538b0),
        },
    ],
};

/// The same program concatenated into one 8KB image. Unchecked: such images
/// are commonly patched.
pub static INVADERS_IMAGE_ROM: RomRegion = RomRegion {
    size: 0x2000,
    entries: &[RomEntry {
        name: "invaders",
        size: 0x2000,
        offset: 0x0000,
        crc32: None,
    }],
};

// ---------------------------------------------------------------------------
// Memory map
// ---------------------------------------------------------------------------
// 0x0000-0x1FFF  ROM
// 0x2000-0x23FF  work RAM
// 0x2400-0x3FFF  video RAM (1bpp, 256 bits per column, 224 columns)
// 0x4000-0xFFFF  mirrors of the above (A14/A15 not decoded)

pub const SCREEN_WIDTH: u32 = 224;
pub const SCREEN_HEIGHT: u32 = 256;

pub const ROM_SIZE: usize = 0x2000;
pub const RAM_START: u16 = 0x2000;
pub const VRAM_START: u16 = 0x2400;
pub const VRAM_LENGTH: usize = 0x1C00;

const ADDRESS_MASK: u16 = 0x3FFF;
const RAM_SIZE: usize = 0x2000;

/// ROM plus work/video RAM behind the board's address decoder.
pub struct InvadersMemory {
    rom: [u8; ROM_SIZE],
    ram: [u8; RAM_SIZE],
}

impl InvadersMemory {
    fn new() -> Self {
        Self {
            rom: [0; ROM_SIZE],
            ram: [0; RAM_SIZE],
        }
    }

    /// The video RAM window, in the board's native scan order.
    pub fn vram(&self) -> &[u8] {
        let start = (VRAM_START - RAM_START) as usize;
        &self.ram[start..start + VRAM_LENGTH]
    }
}

impl Bus for InvadersMemory {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        let addr = addr & ADDRESS_MASK;
        if addr < RAM_START {
            self.rom[addr as usize]
        } else {
            self.ram[(addr - RAM_START) as usize]
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        let addr = addr & ADDRESS_MASK;
        // ROM is read-only; writes are dropped
        if addr >= RAM_START {
            self.ram[(addr - RAM_START) as usize] = data;
        }
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Space Invaders (Taito/Midway, 1978): an 8080 with 8KB ROM and 8KB RAM,
/// 7KB of which is the display bitplane.
///
/// Shifter, sound and input ports are not wired: `IN` reads 0x00.
pub struct SpaceInvadersSystem {
    cpu: I8080,
    memory: InvadersMemory,
}

impl SpaceInvadersSystem {
    pub fn new() -> Self {
        Self {
            cpu: I8080::new(),
            memory: InvadersMemory::new(),
        }
    }

    /// Load the program ROM, preferring a single `invaders` image when the
    /// set contains one and falling back to the four split chips.
    pub fn load_rom_set(
        &mut self,
        rom_set: &RomSet,
        policy: ChecksumPolicy,
    ) -> Result<(), RomLoadError> {
        let (region, layout) = if INVADERS_IMAGE_ROM.is_present_in(rom_set) {
            (&INVADERS_IMAGE_ROM, "single image")
        } else {
            (&INVADERS_SPLIT_ROM, "split ROMs")
        };
        let rom_data = region.load(rom_set, policy)?;
        self.memory.rom.copy_from_slice(&rom_data);
        info!(layout, ?policy, "loaded Space Invaders program");
        Ok(())
    }

    /// Copy `program` into ROM at `offset`, bypassing the ROM set machinery.
    ///
    /// Bytes past the end of ROM are ignored.
    pub fn load_program(&mut self, offset: usize, program: &[u8]) {
        let end = (offset + program.len()).min(ROM_SIZE);
        if offset >= end {
            return;
        }
        self.memory.rom[offset..end].copy_from_slice(&program[..end - offset]);
    }

    /// Read a byte through the board's address decoder.
    pub fn read(&mut self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    /// Write a byte through the board's address decoder.
    pub fn write(&mut self, addr: u16, data: u8) {
        self.memory.write(addr, data);
    }

    pub fn get_cpu_state(&self) -> I8080State {
        self.cpu.snapshot()
    }
}

impl Default for SpaceInvadersSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for SpaceInvadersSystem {
    fn display_size(&self) -> (u32, u32) {
        (SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    fn video_memory(&self) -> &[u8] {
        self.memory.vram()
    }

    fn interrupt_enabled(&self) -> bool {
        self.cpu.inte
    }

    fn fetch_next_operation(&mut self) -> u8 {
        self.cpu.fetch(&mut self.memory)
    }

    fn execute(&mut self, opcode: u8) -> bool {
        self.cpu.execute(&mut self.memory, opcode)
    }

    fn interrupt(&mut self, vector: InterruptVector) -> bool {
        self.cpu.interrupt(&mut self.memory, vector.opcode())
    }

    fn reset(&mut self) {
        debug!("reset");
        self.cpu.reset();
        self.memory.ram.fill(0);
    }
}

fn create_machine(
    rom_set: &RomSet,
    policy: ChecksumPolicy,
) -> Result<Box<dyn Machine>, RomLoadError> {
    let mut sys = SpaceInvadersSystem::new();
    sys.load_rom_set(rom_set, policy)?;
    Ok(Box::new(sys))
}

inventory::submit! {
    MachineEntry::new(
        "invaders",
        "invaders",
        "Space Invaders (Taito/Midway, 1978)",
        create_machine,
    )
}
