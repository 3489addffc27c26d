pub mod invaders;
pub mod registry;
pub mod rom_loader;

pub use invaders::SpaceInvadersSystem;
