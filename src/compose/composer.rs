use crate::{
    compose::{host::RenderHost, opts::ComposerOpts},
    foundation::core::{Canvas, FrameIndex, PixelRect, Rgba8Premul},
    foundation::error::{ComposeError, ComposeResult},
    frame::{
        meta::{DisposalMethod, FrameMeta, normalize_delay_ms},
        source::FrameSource,
    },
    render::{
        bitmap::Bitmap,
        surface::{CompositeSurface, DrawTarget},
    },
};

/// Composes animated-image frames according to their disposal methods.
///
/// The composer keeps one composite surface per image and three owned bitmaps: the frame
/// decoded last, the snapshot taken before a restore-previous frame, and the composed result
/// handed to the host for painting. It is driven entirely by the host: [`FrameComposer::create`]
/// once the host has a device, then [`FrameComposer::handle_anim_event`] every time the
/// scheduled animation delay elapses.
///
/// Every operation runs to completion on the caller's thread; `&mut self` rules out overlapping
/// composition passes.
pub struct FrameComposer<F, S> {
    source: F,
    opts: ComposerOpts,
    canvas: Canvas,
    background: Rgba8Premul,
    frame_count: u32,

    surface: Option<S>,
    // Frame that will be composited next.
    next_index: FrameIndex,
    // Metadata of the frame read last; drives the next disposal.
    meta: FrameMeta,
    raw_frame: Option<Bitmap>,
    saved_frame: Option<Bitmap>,
    composed: Option<Bitmap>,

    consecutive_failures: u32,
    stalled: bool,
}

impl<F: FrameSource, S: CompositeSurface> FrameComposer<F, S> {
    /// Bind a composer to `source`. Canvas size, background and frame count are read once here.
    pub fn new(source: F, opts: ComposerOpts) -> Self {
        let canvas = source.canvas();
        let background = source.background();
        let frame_count = source.frame_count();
        Self {
            source,
            opts,
            canvas,
            background,
            frame_count,
            surface: None,
            next_index: FrameIndex(0),
            meta: FrameMeta::default(),
            raw_frame: None,
            saved_frame: None,
            composed: None,
            consecutive_failures: 0,
            stalled: false,
        }
    }

    /// Drop cached bitmaps and metadata and rewind to the first frame.
    ///
    /// The composite surface allocation is left alone.
    pub fn reset(&mut self) {
        self.next_index = FrameIndex(0);
        self.meta = FrameMeta::default();
        self.raw_frame = None;
        self.saved_frame = None;
        self.composed = None;
        self.consecutive_failures = 0;
        self.stalled = false;
    }

    /// Discard the composite surface, e.g. after the host detected device loss.
    pub fn release_surface(&mut self) {
        self.surface = None;
    }

    /// (Re)allocate the composite surface and compose the first displayable frame.
    ///
    /// On allocation failure the composer is left without a surface.
    #[tracing::instrument(skip(self, host), fields(frames = self.frame_count))]
    pub fn create<H>(&mut self, host: &mut H) -> ComposeResult<()>
    where
        H: RenderHost<Surface = S>,
    {
        self.surface = None;
        let surface = host.create_surface(self.canvas).inspect_err(|e| {
            tracing::warn!(error = %e, "composite surface allocation failed");
        })?;
        self.surface = Some(surface);
        self.consecutive_failures = 0;
        self.stalled = false;

        if self.frame_count == 0 {
            return Ok(());
        }
        let res = self.compose_next_frame(host);
        host.invalidate();
        res
    }

    /// Advance the animation by one displayed frame.
    ///
    /// Zero-delay frames are composed without yielding until a frame with a delay is produced or
    /// the loop's last frame has been drawn. For multi-frame images the next tick is scheduled
    /// with the delay read last, even when this pass failed, so a transient failure is retried on
    /// the next tick instead of freezing the animation.
    #[tracing::instrument(skip(self, host), fields(index = self.next_index.0))]
    pub fn compose_next_frame<H>(&mut self, host: &mut H) -> ComposeResult<()>
    where
        H: RenderHost<Surface = S>,
    {
        host.stop_animation();
        if self.surface.is_none() {
            return Err(no_surface());
        }
        if self.frame_count == 0 {
            return Err(ComposeError::validation("animation has no frames"));
        }

        let mut res = self.step_frame();
        while res.is_ok() && self.meta.delay_ms == 0 && !self.is_last_frame() {
            res = self.step_frame();
        }

        match &res {
            Ok(()) => {
                self.consecutive_failures = 0;
                self.stalled = false;
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                tracing::warn!(
                    error = %e,
                    index = self.next_index.0,
                    failures = self.consecutive_failures,
                    "frame composition failed"
                );
            }
        }

        if self.frame_count > 1 {
            match self.opts.max_consecutive_failures {
                Some(limit) if res.is_err() && self.consecutive_failures >= limit => {
                    if !self.stalled {
                        tracing::warn!(limit, "animation stalled, no further ticks scheduled");
                    }
                    self.stalled = true;
                }
                _ => host.start_animation(self.meta.delay_ms),
            }
        }
        res
    }

    /// Draw the composed frame (or its `src` part) into `dest` on the host's target.
    pub fn draw_bitmap<T>(
        &self,
        target: &mut T,
        dest: PixelRect,
        src: Option<PixelRect>,
    ) -> ComposeResult<()>
    where
        T: DrawTarget + ?Sized,
    {
        if self.surface.is_none() {
            return Err(no_surface());
        }
        let composed = self
            .composed
            .as_ref()
            .ok_or_else(|| ComposeError::not_ready("no frame composed yet"))?;
        target.draw_bitmap(composed, dest, src)
    }

    /// Animation timer callback: compose the next frame and request a repaint.
    pub fn handle_anim_event<H>(&mut self, host: &mut H) -> ComposeResult<()>
    where
        H: RenderHost<Surface = S>,
    {
        let res = self.compose_next_frame(host);
        host.invalidate();
        res
    }

    /// Index of the frame that will be composited next.
    pub fn frame_index(&self) -> FrameIndex {
        self.next_index
    }

    /// Metadata of the frame read last.
    pub fn frame_meta(&self) -> FrameMeta {
        self.meta
    }

    /// Number of frames in one loop.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Logical canvas dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Background color of the image.
    pub fn background(&self) -> Rgba8Premul {
        self.background
    }

    /// Return `true` while a composite surface is allocated.
    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// The composite surface, for hosts that manage device resources.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// The result of the last successful composition pass.
    pub fn composed(&self) -> Option<&Bitmap> {
        self.composed.as_ref()
    }

    /// The frame decoded last.
    pub fn raw_frame(&self) -> Option<&Bitmap> {
        self.raw_frame.as_ref()
    }

    /// Return `true` when the failure limit was reached and ticks are no longer scheduled.
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// The bound frame source.
    pub fn source(&self) -> &F {
        &self.source
    }

    fn is_last_frame(&self) -> bool {
        self.next_index.is_first()
    }

    fn step_frame(&mut self) -> ComposeResult<()> {
        self.dispose_current_frame()?;
        self.overlay_next_frame()
    }

    fn dispose_current_frame(&mut self) -> ComposeResult<()> {
        let surface = self.surface.as_mut().ok_or_else(no_surface)?;
        match self.meta.disposal {
            DisposalMethod::Unspecified | DisposalMethod::NoDisposal => Ok(()),
            DisposalMethod::RestoreBackground => {
                surface.begin_draw();
                surface.push_clip(self.meta.rect);
                surface.clear(self.background);
                surface.pop_clip();
                surface.end_draw()
            }
            DisposalMethod::RestorePrevious => {
                let saved = self.saved_frame.as_ref().ok_or_else(|| {
                    ComposeError::allocation("restore-previous disposal without a saved frame")
                })?;
                surface.copy_from(saved)
            }
        }
    }

    fn overlay_next_frame(&mut self) -> ComposeResult<()> {
        let (raw, meta) = self.source.decode_frame(self.next_index)?;
        let meta = FrameMeta {
            delay_ms: normalize_delay_ms(meta.delay_ms, self.opts.min_delay_ms),
            ..meta
        };
        let surface = self.surface.as_mut().ok_or_else(no_surface)?;

        // The snapshot must precede drawing: it is what this frame's disposal restores.
        if meta.disposal == DisposalMethod::RestorePrevious {
            if self.saved_frame.is_none() {
                self.saved_frame = Some(surface.create_compatible_bitmap()?);
            }
            if let Some(saved) = self.saved_frame.as_mut() {
                surface.copy_to(saved)?;
            }
        }
        // Committed only once a restore-previous disposal has its snapshot.
        self.meta = meta;
        let raw = self.raw_frame.insert(raw);

        surface.begin_draw();
        if self.next_index.is_first() {
            surface.clear(self.background);
        }
        surface.draw_bitmap(raw, self.meta.rect);
        surface.end_draw()?;

        self.composed = Some(surface.current_bitmap()?);

        tracing::debug!(
            frame = self.next_index.0,
            delay_ms = self.meta.delay_ms,
            disposal = %self.meta.disposal,
            "composed frame"
        );
        self.next_index = self.next_index.next_in(self.frame_count);
        Ok(())
    }
}

fn no_surface() -> ComposeError {
    ComposeError::not_ready("no composite surface; call create first")
}

#[cfg(test)]
#[path = "../../tests/unit/compose/composer.rs"]
mod tests;
