use crate::{
    foundation::core::{Canvas, FrameIndex, Rgba8Premul},
    foundation::error::ComposeResult,
    frame::meta::FrameMeta,
    render::bitmap::Bitmap,
};

/// Random-access provider of decoded animation frames.
///
/// Decoding is expected to be a fast in-memory operation; the composer calls it on the UI
/// thread once per composed frame.
pub trait FrameSource {
    /// Total number of frames in one loop of the animation.
    fn frame_count(&self) -> u32;

    /// Logical canvas dimensions.
    fn canvas(&self) -> Canvas;

    /// Color used for the first frame of every loop and for background disposal.
    fn background(&self) -> Rgba8Premul;

    /// Decode frame `index`: premultiplied pixels sized to `meta.rect` plus its metadata.
    fn decode_frame(&mut self, index: FrameIndex) -> ComposeResult<(Bitmap, FrameMeta)>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn frame_count(&self) -> u32 {
        (**self).frame_count()
    }

    fn canvas(&self) -> Canvas {
        (**self).canvas()
    }

    fn background(&self) -> Rgba8Premul {
        (**self).background()
    }

    fn decode_frame(&mut self, index: FrameIndex) -> ComposeResult<(Bitmap, FrameMeta)> {
        (**self).decode_frame(index)
    }
}
