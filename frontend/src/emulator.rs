use tracing::info;

use vblank_core::core::Machine;
use vblank_core::interrupt::Scheduler;
use vblank_core::runner::{self, Clock, MonotonicClock, Shutdown};

use crate::config::Settings;
use crate::error::FrontendError;
use crate::video::{self, SdlHost};

/// Open a window for `machine` and run it until quit, halt or a render error.
///
/// SDL resources are released on every return path when they go out of scope.
pub fn run(
    machine: &mut dyn Machine,
    title: &str,
    settings: &Settings,
) -> Result<Shutdown, FrontendError> {
    let sdl_context = sdl2::init().map_err(FrontendError::Sdl)?;
    let sdl_video = sdl_context.video().map_err(FrontendError::Sdl)?;

    let (width, height) = machine.display_size();
    let canvas = video::create_canvas(&sdl_video, title, width, height, settings.scale)?;
    let texture_creator = canvas.texture_creator();
    let event_pump = sdl_context.event_pump().map_err(FrontendError::Sdl)?;
    let mut host = SdlHost::new(canvas, &texture_creator, event_pump, width, height);

    let mut clock = MonotonicClock::new();
    let mut scheduler = Scheduler::new(settings.frame_threshold, clock.now());

    info!(
        width,
        height,
        scale = settings.scale,
        threshold_ms = settings.frame_threshold.as_millis() as u64,
        "starting"
    );
    let shutdown = runner::run(machine, &mut host, &mut scheduler, &mut clock)?;
    info!(?shutdown, "stopped");
    Ok(shutdown)
}
