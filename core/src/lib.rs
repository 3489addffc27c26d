pub mod core;
pub mod cpu;
pub mod interrupt;
pub mod runner;
pub mod video;

pub mod prelude {
    pub use crate::core::{Bus, Machine};
    pub use crate::cpu::I8080;
    pub use crate::interrupt::{InterruptVector, Scheduler, Tick};
    pub use crate::runner::{Clock, Host, MonotonicClock, Shutdown};
    pub use crate::video::{Geometry, PixelTarget, RenderError};
}
