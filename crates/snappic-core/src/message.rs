use std::time::{Duration, Instant};

/// How long a transient message stays on screen.
pub const MESSAGE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// A message that clears itself after [`MESSAGE_TTL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub text: String,
    pub kind: FlashKind,
    expires_at: Instant,
}

impl Flash {
    pub fn success(text: impl Into<String>, now: Instant) -> Self {
        Self::new(text, FlashKind::Success, now)
    }

    pub fn error(text: impl Into<String>, now: Instant) -> Self {
        Self::new(text, FlashKind::Error, now)
    }

    fn new(text: impl Into<String>, kind: FlashKind, now: Instant) -> Self {
        Self {
            text: text.into(),
            kind,
            expires_at: now + MESSAGE_TTL,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }
}
