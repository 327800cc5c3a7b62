#![forbid(unsafe_code)]

//! The two-valued activity signal emitted by motion streams.

/// Whether a motion stream is currently doing work.
///
/// Streams that participate in at-rest aggregation emit this alongside (or
/// instead of) their values. There are exactly two states; "paused",
/// "scheduled" and similar refinements are a producer-side concern and must
/// be collapsed to one of these before emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionState {
    /// The stream is actively producing or about to produce values.
    Active,
    /// The stream has settled; no further values are expected until
    /// something perturbs it again.
    AtRest,
}

impl MotionState {
    /// Whether this is the [`Active`](MotionState::Active) state.
    #[inline]
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_active() {
        assert!(MotionState::Active.is_active());
        assert!(!MotionState::AtRest.is_active());
    }

    #[test]
    fn equality() {
        assert_eq!(MotionState::Active, MotionState::Active);
        assert_ne!(MotionState::Active, MotionState::AtRest);
    }
}
