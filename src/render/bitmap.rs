use crate::{
    foundation::core::{Canvas, PixelRect, Rgba8Premul},
    foundation::error::{ComposeError, ComposeResult},
    render::blend,
};

/// Owned premultiplied RGBA8 pixels, tightly packed, row-major.
///
/// Used for decoded frames, the saved restore-previous snapshot and the composed result. Each of
/// those has exactly one owner; bitmaps are never shared.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self::solid(width, height, Rgba8Premul::transparent())
    }

    /// Bitmap filled with one color.
    pub fn solid(width: u32, height: u32, color: Rgba8Premul) -> Self {
        let len = Canvas { width, height }.rgba8_len() / 4;
        Self {
            width,
            height,
            data: color.to_array().repeat(len),
        }
    }

    /// Wrap premultiplied RGBA8 bytes, validating the length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> ComposeResult<Self> {
        let expected = Canvas { width, height }.rgba8_len();
        if data.len() != expected {
            return Err(ComposeError::validation(format!(
                "bitmap {width}x{height} expects {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap straight-alpha RGBA8 bytes, premultiplying them.
    pub fn from_straight(width: u32, height: u32, mut data: Vec<u8>) -> ComposeResult<Self> {
        blend::premultiply_in_place(&mut data);
        Self::from_premul(width, height, data)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a [`Canvas`].
    pub fn size(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Rectangle at the origin covering the bitmap.
    pub fn bounds(&self) -> PixelRect {
        self.size().rect()
    }

    /// Premultiplied pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable premultiplied pixel bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pixel at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let p = &self.data[i..i + 4];
        Some(Rgba8Premul {
            r: p[0],
            g: p[1],
            b: p[2],
            a: p[3],
        })
    }

    /// One row of pixels as bytes; the caller keeps `x + len <= width` and `y < height`.
    pub(crate) fn row(&self, y: u32, x: u32, len: u32) -> &[u8] {
        let start = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        &self.data[start..start + (len as usize) * 4]
    }

    /// Convert to straight-alpha RGBA8, e.g. for PNG export.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for p in self.data.chunks_exact(4) {
            out.extend_from_slice(&blend::unpremultiply([p[0], p[1], p[2], p[3]]));
        }
        out
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/bitmap.rs"]
mod tests;
