use sdl2::EventPump;
use sdl2::event::Event;
use sdl2::keyboard::Scancode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use tracing::{debug, warn};

use vblank_core::runner::Host;
use vblank_core::video::{PixelTarget, RenderError};

use crate::error::FrontendError;

/// Create a window scaled up from the native resolution, and its renderer.
pub fn create_canvas(
    sdl_video: &sdl2::VideoSubsystem,
    title: &str,
    native_width: u32,
    native_height: u32,
    scale: u32,
) -> Result<Canvas<Window>, FrontendError> {
    let window = sdl_video
        .window(title, native_width * scale, native_height * scale)
        .position_centered()
        .build()
        .map_err(|e| FrontendError::Sdl(e.to_string()))?;

    window
        .into_canvas()
        .accelerated()
        .build()
        .map_err(|e| FrontendError::Sdl(e.to_string()))
}

/// SDL-backed presentation: a streaming ABGR8888 texture at native
/// resolution, stretched over the window on present.
///
/// The texture is created on the first frame and dropped with the host.
pub struct SdlHost<'a> {
    canvas: Canvas<Window>,
    texture_creator: &'a TextureCreator<WindowContext>,
    texture: Option<Texture<'a>>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

impl<'a> SdlHost<'a> {
    pub fn new(
        canvas: Canvas<Window>,
        texture_creator: &'a TextureCreator<WindowContext>,
        event_pump: EventPump,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            canvas,
            texture_creator,
            texture: None,
            event_pump,
            width,
            height,
        }
    }
}

impl PixelTarget for SdlHost<'_> {
    fn with_pixels(
        &mut self,
        write: &mut dyn FnMut(&mut [u8], usize),
    ) -> Result<(), RenderError> {
        if self.texture.is_none() {
            let texture = self
                .texture_creator
                .create_texture_streaming(PixelFormatEnum::ABGR8888, self.width, self.height)
                .map_err(|e| RenderError::Lock(e.to_string()))?;
            debug!(width = self.width, height = self.height, "created frame texture");
            self.texture = Some(texture);
        }
        let texture = self
            .texture
            .as_mut()
            .ok_or_else(|| RenderError::Lock("frame texture unavailable".into()))?;

        texture
            .with_lock(None, |buffer: &mut [u8], pitch: usize| write(buffer, pitch))
            .map_err(RenderError::Lock)
    }

    fn present(&mut self) {
        let Some(texture) = self.texture.as_ref() else {
            return;
        };
        self.canvas.clear();
        if let Err(e) = self.canvas.copy(texture, None, None) {
            warn!(error = %e, "failed to copy frame to window");
        }
        self.canvas.present();
    }
}

impl Host for SdlHost<'_> {
    fn poll_quit(&mut self) -> bool {
        let mut quit = false;
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    scancode: Some(Scancode::Escape),
                    ..
                } => quit = true,
                _ => {}
            }
        }
        quit
    }
}
