//! Runtime list of the machines the frontend can launch.
//!
//! Machine modules add themselves with [`inventory::submit!`]; nothing here
//! needs editing when a board is added.

use vblank_core::core::Machine;

use crate::rom_loader::{ChecksumPolicy, RomLoadError, RomSet};

/// Builds a machine with its ROMs loaded, ready for `reset` and `run`.
pub type CreateFn = fn(&RomSet, ChecksumPolicy) -> Result<Box<dyn Machine>, RomLoadError>;

pub struct MachineEntry {
    /// Name accepted on the command line.
    pub name: &'static str,
    /// Archive stem looked up in a rompath directory (`<rom_name>.zip`).
    pub rom_name: &'static str,
    pub description: &'static str,
    pub create: CreateFn,
}

impl MachineEntry {
    pub const fn new(
        name: &'static str,
        rom_name: &'static str,
        description: &'static str,
        create: CreateFn,
    ) -> Self {
        Self {
            name,
            rom_name,
            description,
            create,
        }
    }
}

inventory::collect!(MachineEntry);

/// Every registered machine, alphabetical.
pub fn all() -> Vec<&'static MachineEntry> {
    let mut machines: Vec<&'static MachineEntry> = inventory::iter::<MachineEntry>.into_iter().collect();
    machines.sort_unstable_by_key(|m| m.name);
    machines
}

pub fn find(name: &str) -> Option<&'static MachineEntry> {
    inventory::iter::<MachineEntry>
        .into_iter()
        .find(|m| m.name == name)
}
