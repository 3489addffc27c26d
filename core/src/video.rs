//! 1bpp bitplane to 32-bit framebuffer conversion.
//!
//! The board's video RAM is a packed monochrome bitplane scanned from the
//! bottom-left corner upwards, one column at a time, least-significant bit
//! first. The display wants rows from the top-left corner, one packed
//! ABGR8888 pixel each. Bit `i` therefore lands at
//!
//! ```text
//! row = H - 1 - (i % H)
//! col = i / H
//! dest_index = row * W + col
//! ```
//!
//! which flips the image vertically and transposes it in one pass.

use std::fmt;

/// Packed ABGR8888 for a lit pixel: white, fully opaque.
pub const PIXEL_ON: u32 = 0xFFFF_FFFF;
/// Packed ABGR8888 for an unlit pixel: black, fully opaque.
pub const PIXEL_OFF: u32 = 0xFF00_0000;

pub const BYTES_PER_PIXEL: usize = 4;

/// Display dimensions of the decoded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
}

impl Geometry {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Bytes of bitplane needed to cover every pixel.
    pub const fn bitplane_len(&self) -> usize {
        self.pixel_count().div_ceil(8)
    }

    /// Destination (row, column) for source bit `i`.
    #[inline]
    pub const fn dest_coords(&self, i: usize) -> (usize, usize) {
        (self.height - 1 - (i % self.height), i / self.height)
    }

    /// Destination linear pixel index for source bit `i`.
    #[inline]
    pub const fn dest_index(&self, i: usize) -> usize {
        let (row, col) = self.dest_coords(i);
        row * self.width + col
    }
}

impl From<(u32, u32)> for Geometry {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as usize, height as usize)
    }
}

/// Errors raised while pushing a frame to the display.
///
/// All of them are fatal: a framebuffer that cannot be written is unusable
/// for every later frame too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The presentation layer refused exclusive access to the pixel buffer.
    Lock(String),

    /// The locked buffer (or the bitplane) is smaller than the frame needs.
    BufferTooSmall { required: usize, actual: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lock(msg) => write!(f, "pixel buffer lock failed: {msg}"),
            Self::BufferTooSmall { required, actual } => {
                write!(f, "buffer too small: need {required} bytes, got {actual}")
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// A presentation surface that accepts one decoded frame at a time.
pub trait PixelTarget {
    /// Lock the pixel buffer, hand it to `write` as (bytes, pitch), then
    /// unlock it. The unlock must happen even if `write` unwinds.
    fn with_pixels(
        &mut self,
        write: &mut dyn FnMut(&mut [u8], usize),
    ) -> Result<(), RenderError>;

    /// Show the most recently written buffer.
    fn present(&mut self);
}

/// Decode `bitplane` into a locked, row-pitched byte buffer.
///
/// Writes every one of the `W * H` pixels exactly once as a native-endian
/// packed `u32`. `pitch` is the byte length of one destination row.
pub fn decode_into(
    bitplane: &[u8],
    geometry: Geometry,
    pixels: &mut [u8],
    pitch: usize,
) -> Result<(), RenderError> {
    let row_bytes = geometry.width * BYTES_PER_PIXEL;
    if pitch < row_bytes {
        return Err(RenderError::BufferTooSmall {
            required: row_bytes,
            actual: pitch,
        });
    }
    let required = match geometry.height {
        0 => 0,
        h => (h - 1) * pitch + row_bytes,
    };
    if pixels.len() < required {
        return Err(RenderError::BufferTooSmall {
            required,
            actual: pixels.len(),
        });
    }
    if bitplane.len() < geometry.bitplane_len() {
        return Err(RenderError::BufferTooSmall {
            required: geometry.bitplane_len(),
            actual: bitplane.len(),
        });
    }

    let on = PIXEL_ON.to_ne_bytes();
    let off = PIXEL_OFF.to_ne_bytes();

    for i in 0..geometry.pixel_count() {
        let bit = (bitplane[i / 8] >> (i % 8)) & 0x01;
        let (row, col) = geometry.dest_coords(i);
        let offset = row * pitch + col * BYTES_PER_PIXEL;
        let value = if bit != 0 { &on } else { &off };
        pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(value);
    }
    Ok(())
}

/// Decode `bitplane` into a tightly packed `W * H` pixel vector.
pub fn decode(bitplane: &[u8], geometry: Geometry) -> Result<Vec<u32>, RenderError> {
    let mut bytes = vec![0u8; geometry.pixel_count() * BYTES_PER_PIXEL];
    decode_into(
        bitplane,
        geometry,
        &mut bytes,
        geometry.width * BYTES_PER_PIXEL,
    )?;
    Ok(bytes
        .chunks_exact(BYTES_PER_PIXEL)
        .map(|px| u32::from_ne_bytes([px[0], px[1], px[2], px[3]]))
        .collect())
}

/// Lock `target`, decode one frame into it, unlock, and present.
pub fn render<T: PixelTarget + ?Sized>(
    bitplane: &[u8],
    geometry: Geometry,
    target: &mut T,
) -> Result<(), RenderError> {
    let mut result = Ok(());
    target.with_pixels(&mut |pixels: &mut [u8], pitch: usize| {
        result = decode_into(bitplane, geometry, pixels, pitch);
    })?;
    result?;
    target.present();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory target with a padded pitch, like a streaming texture.
    struct FakeTarget {
        geometry: Geometry,
        pitch: usize,
        bytes: Vec<u8>,
        locks: usize,
        presents: usize,
        fail_lock: bool,
    }

    impl FakeTarget {
        fn new(geometry: Geometry, padding: usize) -> Self {
            let pitch = geometry.width * BYTES_PER_PIXEL + padding;
            Self {
                geometry,
                pitch,
                bytes: vec![0xAB; pitch * geometry.height],
                locks: 0,
                presents: 0,
                fail_lock: false,
            }
        }

        fn pixel(&self, row: usize, col: usize) -> u32 {
            let off = row * self.pitch + col * BYTES_PER_PIXEL;
            u32::from_ne_bytes(self.bytes[off..off + 4].try_into().unwrap())
        }
    }

    impl PixelTarget for FakeTarget {
        fn with_pixels(
            &mut self,
            write: &mut dyn FnMut(&mut [u8], usize),
        ) -> Result<(), RenderError> {
            if self.fail_lock {
                return Err(RenderError::Lock("device lost".into()));
            }
            self.locks += 1;
            write(&mut self.bytes, self.pitch);
            Ok(())
        }

        fn present(&mut self) {
            self.presents += 1;
        }
    }

    #[test]
    fn single_bit_maps_to_single_pixel_exhaustive() {
        let geometry = Geometry::new(8, 16);
        for i in 0..geometry.pixel_count() {
            let mut bitplane = vec![0u8; geometry.bitplane_len()];
            bitplane[i / 8] |= 1 << (i % 8);

            let pixels = decode(&bitplane, geometry).unwrap();
            let expected = (16 - 1 - (i % 16)) * 8 + (i / 16);
            for (j, &px) in pixels.iter().enumerate() {
                if j == expected {
                    assert_eq!(px, PIXEL_ON, "bit {i} should light pixel {j}");
                } else {
                    assert_eq!(px, PIXEL_OFF, "bit {i} leaked into pixel {j}");
                }
            }
        }
    }

    #[test]
    fn single_bit_mapping_at_native_resolution() {
        let geometry = Geometry::new(224, 256);
        for i in [0, 1, 7, 8, 255, 256, 257, 0x1234, 224 * 256 - 1] {
            let mut bitplane = vec![0u8; 0x1C00];
            bitplane[i / 8] |= 1 << (i % 8);

            let pixels = decode(&bitplane, geometry).unwrap();
            let lit: Vec<usize> = pixels
                .iter()
                .enumerate()
                .filter(|(_, px)| **px == PIXEL_ON)
                .map(|(j, _)| j)
                .collect();
            assert_eq!(lit, vec![(255 - (i % 256)) * 224 + i / 256]);
        }
    }

    #[test]
    fn corners_of_the_transform() {
        let geometry = Geometry::new(224, 256);
        // First bit: bottom-left of the screen
        assert_eq!(geometry.dest_coords(0), (255, 0));
        // End of first column: top-left
        assert_eq!(geometry.dest_coords(255), (0, 0));
        // Start of last column: bottom-right
        assert_eq!(geometry.dest_coords(223 * 256), (255, 223));
        // Last bit: top-right
        assert_eq!(geometry.dest_index(224 * 256 - 1), 223);
    }

    #[test]
    fn all_zero_bitplane_is_opaque_black() {
        let geometry = Geometry::new(224, 256);
        let pixels = decode(&[0u8; 0x1C00], geometry).unwrap();
        assert_eq!(pixels.len(), 224 * 256);
        assert!(pixels.iter().all(|&px| px == PIXEL_OFF));
    }

    #[test]
    fn all_one_bitplane_is_opaque_white() {
        let geometry = Geometry::new(224, 256);
        let pixels = decode(&[0xFFu8; 0x1C00], geometry).unwrap();
        assert!(pixels.iter().all(|&px| px == PIXEL_ON));
        assert!(pixels.iter().all(|&px| px >> 24 == 0xFF));
    }

    #[test]
    fn bits_within_a_byte_are_lsb_first() {
        let geometry = Geometry::new(4, 8);
        // Bit 0 of byte 0 -> source row 0 (bottom) of column 0
        let pixels = decode(&[0x01, 0, 0, 0], geometry).unwrap();
        assert_eq!(pixels[7 * 4], PIXEL_ON);
        // Bit 7 of byte 0 -> source row 7 (top) of column 0
        let pixels = decode(&[0x80, 0, 0, 0], geometry).unwrap();
        assert_eq!(pixels[0], PIXEL_ON);
    }

    #[test]
    fn render_honours_pitch_and_presents_once() {
        let geometry = Geometry::new(8, 16);
        let mut target = FakeTarget::new(geometry, 12);
        let mut bitplane = vec![0u8; geometry.bitplane_len()];
        bitplane[0] = 0x01; // bottom-left

        render(&bitplane, geometry, &mut target).unwrap();

        assert_eq!(target.locks, 1);
        assert_eq!(target.presents, 1);
        assert_eq!(target.pixel(15, 0), PIXEL_ON);
        for row in 0..geometry.height {
            for col in 0..geometry.width {
                if (row, col) != (15, 0) {
                    assert_eq!(target.pixel(row, col), PIXEL_OFF);
                }
            }
        }
        // Row padding is left alone
        let pad = &target.bytes[8 * 4..target.pitch];
        assert!(pad.iter().all(|&b| b == 0xAB));
        assert_eq!(target.geometry, geometry);
    }

    #[test]
    fn lock_failure_is_reported_and_nothing_is_presented() {
        let geometry = Geometry::new(8, 16);
        let mut target = FakeTarget::new(geometry, 0);
        target.fail_lock = true;

        let err = render(&[0u8; 16], geometry, &mut target).unwrap_err();
        assert!(matches!(err, RenderError::Lock(_)));
        assert_eq!(target.presents, 0);
    }

    #[test]
    fn short_pitch_is_rejected() {
        let geometry = Geometry::new(8, 16);
        let mut bytes = vec![0u8; 8 * 16 * 4];
        let err = decode_into(&[0u8; 16], geometry, &mut bytes, 16).unwrap_err();
        assert_eq!(
            err,
            RenderError::BufferTooSmall {
                required: 32,
                actual: 16
            }
        );
    }

    #[test]
    fn short_bitplane_is_rejected() {
        let geometry = Geometry::new(8, 16);
        let err = decode(&[0u8; 15], geometry).unwrap_err();
        assert!(matches!(err, RenderError::BufferTooSmall { required: 16, .. }));
    }
}
