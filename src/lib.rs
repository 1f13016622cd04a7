//! gifcomp composes animated GIF frames into displayable bitmaps.
//!
//! A [`FrameComposer`] pulls frames from a [`FrameSource`], applies each frame's
//! [`DisposalMethod`] to an accumulating [`CompositeSurface`], and caches the result for the host
//! to paint. The host ([`RenderHost`]) owns the timer and the device; the composer only asks it to
//! allocate surfaces, schedule the next tick and repaint.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: `FrameSource::decode_frame(index) -> (Bitmap, FrameMeta)`
//! 2. **Dispose**: undo the previous frame per its disposal (keep, clear to background, restore)
//! 3. **Overlay**: snapshot if needed, draw the new frame at its rectangle, cache the composite
//! 4. **Schedule**: skip zero-delay frames, then ask the host for a tick after the frame's delay
//!
//! Concrete pieces for running without a GUI are included: [`GifFrameSource`] (the `gif` crate),
//! [`CpuSurface`] / [`CpuTarget`] (software raster), and [`Player`] (simulated host and clock).
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded**: every operation runs to completion on the caller's thread.
//! - **Premultiplied RGBA8** end-to-end.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod compose;
mod foundation;
mod frame;
mod playback;
mod render;

pub use assets::animated_gif::GifFrameSource;
pub use compose::composer::FrameComposer;
pub use compose::host::{AnimationClock, ManualClock, RenderHost};
pub use compose::opts::ComposerOpts;
pub use foundation::core::{Canvas, FrameIndex, PixelRect, Rgba8Premul};
pub use foundation::error::{ComposeError, ComposeResult};
pub use frame::meta::{DisposalMethod, FrameMeta, MIN_FRAME_DELAY_MS, normalize_delay_ms};
pub use frame::source::FrameSource;
pub use playback::headless::{HeadlessHost, Player};
pub use render::bitmap::Bitmap;
pub use render::blend::{over, premultiply, unpremultiply};
pub use render::cpu::{CpuSurface, CpuTarget};
pub use render::surface::{CompositeSurface, DrawTarget};
