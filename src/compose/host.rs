use crate::{
    foundation::core::Canvas, foundation::error::ComposeResult, render::surface::CompositeSurface,
};

/// The view that owns a [`crate::FrameComposer`].
///
/// The composer never owns a timer or a device; it asks the host for both.
pub trait RenderHost {
    /// Composite surface type this host allocates.
    type Surface: CompositeSurface;

    /// Allocate a composite surface of `canvas` size.
    ///
    /// Fails when the host's drawing surface is unavailable (occluded window, no device).
    fn create_surface(&mut self, canvas: Canvas) -> ComposeResult<Self::Surface>;

    /// Schedule the next animation event in `delay_ms`.
    fn start_animation(&mut self, delay_ms: u32);

    /// Cancel any pending animation event.
    fn stop_animation(&mut self);

    /// Request a repaint; the composed frame is drawn on the next paint pass.
    fn invalidate(&mut self);
}

/// Timer the host uses to deliver animation events.
pub trait AnimationClock {
    /// Arm the timer to fire once after `delay_ms`, replacing any pending deadline.
    fn start(&mut self, delay_ms: u32);

    /// Disarm the timer.
    fn stop(&mut self);

    /// Milliseconds until the timer fires, or `None` when disarmed.
    fn remaining_ms(&self) -> Option<u32>;
}

/// One-shot clock advanced explicitly by elapsed time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    remaining_ms: Option<u32>,
}

impl ManualClock {
    /// Disarmed clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `elapsed_ms` pass; returns `true` (and disarms) when the deadline is reached.
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        match self.remaining_ms {
            None => false,
            Some(left) if elapsed_ms >= left => {
                self.remaining_ms = None;
                true
            }
            Some(left) => {
                self.remaining_ms = Some(left - elapsed_ms);
                false
            }
        }
    }
}

impl AnimationClock for ManualClock {
    fn start(&mut self, delay_ms: u32) {
        self.remaining_ms = Some(delay_ms);
    }

    fn stop(&mut self) {
        self.remaining_ms = None;
    }

    fn remaining_ms(&self) -> Option<u32> {
        self.remaining_ms
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/host.rs"]
mod tests;
