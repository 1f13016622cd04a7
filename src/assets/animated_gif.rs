use std::{io::Cursor, path::Path};

use anyhow::Context;

use crate::{
    foundation::core::{Canvas, FrameIndex, PixelRect, Rgba8Premul},
    foundation::error::{ComposeError, ComposeResult},
    frame::{
        meta::{DisposalMethod, FrameMeta},
        source::FrameSource,
    },
    render::bitmap::Bitmap,
};

struct DecodedFrame {
    pixels: Bitmap,
    meta: FrameMeta,
}

/// In-memory, random-access frames of one animated GIF.
///
/// All frames are decoded up front so that [`FrameSource::decode_frame`] is a copy.
pub struct GifFrameSource {
    canvas: Canvas,
    background: Rgba8Premul,
    frames: Vec<DecodedFrame>,
}

impl GifFrameSource {
    /// Read and decode a GIF file.
    pub fn from_path(path: impl AsRef<Path>) -> ComposeResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("read gif '{}'", path.display()))?;
        Self::from_bytes(&bytes)
    }

    /// Decode GIF bytes.
    pub fn from_bytes(bytes: &[u8]) -> ComposeResult<Self> {
        let mut opts = gif::DecodeOptions::new();
        opts.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = opts
            .read_info(Cursor::new(bytes))
            .map_err(|e| ComposeError::decode(format!("read gif header: {e}")))?;

        let canvas = Canvas {
            width: u32::from(decoder.width()),
            height: u32::from(decoder.height()),
        };
        let background = background_color(decoder.global_palette(), decoder.bg_color());

        let mut frames = Vec::new();
        while let Some(frame) = decoder
            .read_next_frame()
            .map_err(|e| ComposeError::decode(format!("decode gif frame {}: {e}", frames.len())))?
        {
            let rect = PixelRect::new(
                u32::from(frame.left),
                u32::from(frame.top),
                u32::from(frame.width),
                u32::from(frame.height),
            );
            let disposal = DisposalMethod::from_wire(frame.dispose as u8)?;
            let pixels = Bitmap::from_straight(rect.width, rect.height, frame.buffer.to_vec())?;
            frames.push(DecodedFrame {
                pixels,
                meta: FrameMeta::from_gif(rect, frame.delay, disposal),
            });
        }

        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            frames = frames.len(),
            "decoded gif"
        );
        Ok(Self {
            canvas,
            background,
            frames,
        })
    }

    /// Build a source from already decoded frames; each bitmap must match its rect's size.
    pub fn from_frames(
        canvas: Canvas,
        background: Rgba8Premul,
        frames: Vec<(Bitmap, FrameMeta)>,
    ) -> ComposeResult<Self> {
        let frames = frames
            .into_iter()
            .enumerate()
            .map(|(i, (pixels, meta))| {
                if pixels.width() != meta.rect.width || pixels.height() != meta.rect.height {
                    return Err(ComposeError::validation(format!(
                        "frame {i}: bitmap {}x{} does not match rect {}x{}",
                        pixels.width(),
                        pixels.height(),
                        meta.rect.width,
                        meta.rect.height
                    )));
                }
                Ok(DecodedFrame { pixels, meta })
            })
            .collect::<ComposeResult<Vec<_>>>()?;
        Ok(Self {
            canvas,
            background,
            frames,
        })
    }

    /// Metadata of every frame, in order.
    pub fn frame_metas(&self) -> impl Iterator<Item = &FrameMeta> + '_ {
        self.frames.iter().map(|f| &f.meta)
    }

    /// Sum of all frame delays in milliseconds.
    pub fn loop_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.meta.delay_ms)).sum()
    }
}

impl FrameSource for GifFrameSource {
    fn frame_count(&self) -> u32 {
        self.frames.len().try_into().unwrap_or(u32::MAX)
    }

    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn background(&self) -> Rgba8Premul {
        self.background
    }

    fn decode_frame(&mut self, index: FrameIndex) -> ComposeResult<(Bitmap, FrameMeta)> {
        let frame = self.frames.get(index.0 as usize).ok_or_else(|| {
            ComposeError::decode(format!(
                "frame {} out of range ({} frames)",
                index.0,
                self.frames.len()
            ))
        })?;
        Ok((frame.pixels.clone(), frame.meta))
    }
}

/// Background from the global palette entry, opaque; transparent without a usable entry.
fn background_color(palette: Option<&[u8]>, index: Option<usize>) -> Rgba8Premul {
    let (Some(palette), Some(index)) = (palette, index) else {
        return Rgba8Premul::transparent();
    };
    match palette.get(index * 3..index * 3 + 3) {
        Some(&[r, g, b]) => Rgba8Premul::opaque(r, g, b),
        _ => Rgba8Premul::transparent(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/animated_gif.rs"]
mod tests;
