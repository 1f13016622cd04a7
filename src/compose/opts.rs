use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{ComposeError, ComposeResult};

/// Tuning for a [`crate::FrameComposer`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposerOpts {
    /// Minimum scheduled delay for frames that record a nonzero delay.
    pub min_delay_ms: u32,
    /// Stop rescheduling after this many consecutive failed ticks.
    ///
    /// `None` keeps retrying on every tick for as long as the animation is shown.
    pub max_consecutive_failures: Option<u32>,
}

impl Default for ComposerOpts {
    fn default() -> Self {
        Self {
            min_delay_ms: crate::frame::meta::MIN_FRAME_DELAY_MS,
            max_consecutive_failures: None,
        }
    }
}

impl ComposerOpts {
    /// Check option invariants.
    pub fn validate(&self) -> ComposeResult<()> {
        if self.max_consecutive_failures == Some(0) {
            return Err(ComposeError::validation(
                "max_consecutive_failures must be > 0 when set",
            ));
        }
        Ok(())
    }

    /// Parse and validate options from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> ComposeResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| ComposeError::validation(format!("parse composer options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Read options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> ComposeResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read composer options '{}'", path.display()))?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/opts.rs"]
mod tests;
