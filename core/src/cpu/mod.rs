// Re-export state types
pub mod state;
pub use state::{CpuStateTrait, I8080State};

// Intel 8080
pub mod i8080;
pub use i8080::I8080;
