use crate::{
    compose::{
        composer::FrameComposer,
        host::{AnimationClock, ManualClock, RenderHost},
        opts::ComposerOpts,
    },
    foundation::core::{Canvas, Rgba8Premul},
    foundation::error::{ComposeError, ComposeResult},
    frame::source::FrameSource,
    render::{
        bitmap::Bitmap,
        cpu::{CpuSurface, CpuTarget},
    },
};

/// Window-less [`RenderHost`] backed by CPU surfaces and a [`ManualClock`].
#[derive(Debug)]
pub struct HeadlessHost {
    clock: ManualClock,
    invalidated: bool,
    device_available: bool,
    surfaces_created: u32,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// Host with an available device and a disarmed clock.
    pub fn new() -> Self {
        Self {
            clock: ManualClock::new(),
            invalidated: false,
            device_available: true,
            surfaces_created: 0,
        }
    }

    /// Simulate the drawing surface becoming (un)available.
    pub fn set_device_available(&mut self, available: bool) {
        self.device_available = available;
    }

    /// The animation clock.
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Mutable access to the animation clock.
    pub fn clock_mut(&mut self) -> &mut ManualClock {
        &mut self.clock
    }

    /// Return `true` when a repaint was requested since the last [`HeadlessHost::take_invalidated`].
    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Consume a pending repaint request.
    pub fn take_invalidated(&mut self) -> bool {
        std::mem::take(&mut self.invalidated)
    }

    /// Number of composite surfaces allocated so far.
    pub fn surfaces_created(&self) -> u32 {
        self.surfaces_created
    }
}

impl RenderHost for HeadlessHost {
    type Surface = CpuSurface;

    fn create_surface(&mut self, canvas: Canvas) -> ComposeResult<CpuSurface> {
        if !self.device_available {
            return Err(ComposeError::allocation("drawing surface unavailable"));
        }
        let surface = CpuSurface::new(canvas)?;
        self.surfaces_created = self.surfaces_created.saturating_add(1);
        Ok(surface)
    }

    fn start_animation(&mut self, delay_ms: u32) {
        self.clock.start(delay_ms);
    }

    fn stop_animation(&mut self) {
        self.clock.stop();
    }

    fn invalidate(&mut self) {
        self.invalidated = true;
    }
}

/// Plays one animated image without a window: timer, device and framebuffer are all simulated.
///
/// Device loss reported by a tick is handled the way a windowed view would: the composite surface
/// is discarded, the composer reset and the surface recreated.
pub struct Player<F> {
    composer: FrameComposer<F, CpuSurface>,
    host: HeadlessHost,
    target: CpuTarget,
}

impl<F: FrameSource> Player<F> {
    /// Bind a player to `source`; nothing is composed until [`Player::start`].
    pub fn new(source: F, opts: ComposerOpts) -> Self {
        let composer = FrameComposer::new(source, opts);
        let canvas = composer.canvas();
        Self {
            composer,
            host: HeadlessHost::new(),
            target: CpuTarget::new(canvas.width, canvas.height),
        }
    }

    /// Rewind and compose the first displayable frame.
    pub fn start(&mut self) -> ComposeResult<()> {
        self.composer.reset();
        self.composer.create(&mut self.host)
    }

    /// Let `elapsed_ms` pass. Returns `Ok(true)` when an animation event fired.
    ///
    /// A failed tick is returned as an error but the next tick stays scheduled, so callers may
    /// keep advancing.
    pub fn advance(&mut self, elapsed_ms: u32) -> ComposeResult<bool> {
        if !self.host.clock_mut().advance(elapsed_ms) {
            return Ok(false);
        }
        match self.composer.handle_anim_event(&mut self.host) {
            Ok(()) => Ok(true),
            Err(e) if e.is_device_lost() => {
                tracing::warn!(error = %e, "device lost during tick");
                self.recover()?;
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    /// Paint the composed frame into the framebuffer if a repaint was requested.
    ///
    /// Returns `Ok(true)` when the framebuffer changed.
    pub fn paint(&mut self) -> ComposeResult<bool> {
        if !self.host.take_invalidated() {
            return Ok(false);
        }
        let canvas = self.composer.canvas();
        self.target.clear(Rgba8Premul::transparent());
        self.composer.draw_bitmap(&mut self.target, canvas.rect(), None)?;
        Ok(true)
    }

    /// Milliseconds until the next animation event, `None` for static images or a stalled player.
    pub fn next_delay_ms(&self) -> Option<u32> {
        self.host.clock().remaining_ms()
    }

    /// What the view currently shows.
    pub fn framebuffer(&self) -> &Bitmap {
        self.target.frame()
    }

    /// The underlying composer.
    pub fn composer(&self) -> &FrameComposer<F, CpuSurface> {
        &self.composer
    }

    /// The simulated host.
    pub fn host(&self) -> &HeadlessHost {
        &self.host
    }

    /// Mutable access to the simulated host.
    pub fn host_mut(&mut self) -> &mut HeadlessHost {
        &mut self.host
    }

    /// Mark the current composite surface as lost; the next tick triggers recovery.
    pub fn lose_device(&mut self) {
        if let Some(surface) = self.composer.surface_mut() {
            surface.lose_device();
        }
    }

    fn recover(&mut self) -> ComposeResult<()> {
        self.composer.release_surface();
        self.composer.reset();
        self.composer.create(&mut self.host)?;
        tracing::info!(
            surfaces = self.host.surfaces_created(),
            "recreated composite surface"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/headless.rs"]
mod tests;
