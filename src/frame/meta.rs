use crate::{
    foundation::core::PixelRect,
    foundation::error::{ComposeError, ComposeResult},
};

/// Default smallest delay scheduled for a frame that records one.
pub const MIN_FRAME_DELAY_MS: u32 = 5;

/// What happens to a frame's region before the next frame is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DisposalMethod {
    /// No disposal specified; treated like [`DisposalMethod::NoDisposal`].
    #[default]
    Unspecified,
    /// Leave the frame in place.
    NoDisposal,
    /// Clear the frame's rectangle to the background color.
    RestoreBackground,
    /// Restore the composite to what it was before the frame was drawn.
    RestorePrevious,
}

impl DisposalMethod {
    /// Map a GIF graphic-control-extension disposal value.
    ///
    /// Values outside `0..=3` come from corrupt or unsupported files and are decode errors.
    pub fn from_wire(v: u8) -> ComposeResult<Self> {
        match v {
            0 => Ok(Self::Unspecified),
            1 => Ok(Self::NoDisposal),
            2 => Ok(Self::RestoreBackground),
            3 => Ok(Self::RestorePrevious),
            other => Err(ComposeError::decode(format!(
                "invalid gif disposal method {other}"
            ))),
        }
    }

    /// The GIF wire value.
    pub fn to_wire(self) -> u8 {
        match self {
            Self::Unspecified => 0,
            Self::NoDisposal => 1,
            Self::RestoreBackground => 2,
            Self::RestorePrevious => 3,
        }
    }
}

impl std::fmt::Display for DisposalMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unspecified => "unspecified",
            Self::NoDisposal => "none",
            Self::RestoreBackground => "background",
            Self::RestorePrevious => "previous",
        };
        f.write_str(s)
    }
}

/// Per-frame metadata read alongside the frame's pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameMeta {
    /// Canvas region covered by the frame's pixels.
    pub rect: PixelRect,
    /// Display time in milliseconds; 0 means no delay was recorded.
    pub delay_ms: u32,
    /// Disposal applied before the following frame is drawn.
    pub disposal: DisposalMethod,
}

impl FrameMeta {
    /// Build metadata with the delay as recorded; the composer applies its minimum when
    /// scheduling.
    pub fn new(rect: PixelRect, delay_ms: u32, disposal: DisposalMethod) -> Self {
        Self {
            rect,
            delay_ms,
            disposal,
        }
    }

    /// Metadata from a GIF delay in hundredths of a second.
    pub fn from_gif(rect: PixelRect, delay_cs: u16, disposal: DisposalMethod) -> Self {
        Self::new(rect, u32::from(delay_cs) * 10, disposal)
    }
}

/// Keep the 0 sentinel, raise any other delay to at least `min_ms`.
pub fn normalize_delay_ms(delay_ms: u32, min_ms: u32) -> u32 {
    if delay_ms == 0 { 0 } else { delay_ms.max(min_ms) }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/meta.rs"]
mod tests;
