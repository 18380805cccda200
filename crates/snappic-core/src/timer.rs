//! Freshness timer shown under each gallery image.
//!
//! An image is shown at full strength for [`DISPLAY_SECS`], then fades for
//! [`FADEOUT_SECS`]. The timer only describes how an item should look; items
//! leave the gallery when the backend stops listing them, never because of
//! their age alone.

use crate::image::ImageState;

pub const DISPLAY_SECS: f64 = 5.0;
pub const FADEOUT_SECS: f64 = 10.0;

pub const FADING_LABEL: &str = "Fading...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Visible,
    Fading,
    /// Fade has run out but the backend still lists the image.
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimerView {
    pub phase: TimerPhase,
    /// 0..=100
    pub remaining_pct: f64,
    pub label: String,
}

impl TimerView {
    /// Compute the timer from the age and phase reported by the backend.
    pub fn evaluate(age: f64, state: ImageState) -> Self {
        match state {
            ImageState::Visible => {
                let remaining = (DISPLAY_SECS - age).clamp(0.0, DISPLAY_SECS);
                Self {
                    phase: TimerPhase::Visible,
                    remaining_pct: (remaining / DISPLAY_SECS * 100.0).min(100.0),
                    label: format!("{}s", remaining.ceil() as u64),
                }
            }
            ImageState::Fading => {
                let fade_age = age - DISPLAY_SECS;
                let remaining = (FADEOUT_SECS - fade_age).max(0.0);
                let remaining_pct = (remaining / FADEOUT_SECS * 100.0).min(100.0);
                let phase = if remaining_pct <= 0.0 {
                    TimerPhase::Expired
                } else {
                    TimerPhase::Fading
                };
                Self {
                    phase,
                    remaining_pct,
                    label: FADING_LABEL.to_string(),
                }
            }
        }
    }

    /// Compute the timer from age alone, deriving the phase the way the
    /// backend does.
    pub fn from_age(age: f64) -> Self {
        let state = ImageState::from_age(age).unwrap_or(ImageState::Fading);
        Self::evaluate(age, state)
    }

    /// Fill ratio for gauges, 0.0..=1.0.
    pub fn ratio(&self) -> f64 {
        (self.remaining_pct / 100.0).clamp(0.0, 1.0)
    }

    pub fn is_fading(&self) -> bool {
        !matches!(self.phase, TimerPhase::Visible)
    }
}
