//! Fixed cross-fade parameters for the welcome/live transition.
//!
//! The outgoing view fades immediately; the incoming view waits out a
//! stagger of half the fade duration before ramping in, so the two
//! opacities never sum past full during the swap.

use std::time::Duration;

/// Opacity ramp duration for each side of the fade.
pub const FADE_DURATION: Duration = Duration::from_millis(500);

/// Delay before the incoming view starts ramping (half the duration).
pub const FADE_STAGGER: Duration = Duration::from_millis(250);

/// Easing applied to the opacity ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
}

/// Cross-fade between the outgoing and incoming view.
#[derive(Debug, Clone, Copy)]
pub struct Crossfade {
    pub duration: Duration,
    pub stagger: Duration,
    pub easing: Easing,
}

impl Default for Crossfade {
    fn default() -> Self {
        Self {
            duration: FADE_DURATION,
            stagger: FADE_STAGGER,
            easing: Easing::Linear,
        }
    }
}

impl Crossfade {
    /// Opacity of the view being faded out, `elapsed` after the swap.
    pub fn outgoing_opacity(&self, elapsed: Duration) -> f32 {
        1.0 - self.progress(elapsed)
    }

    /// Opacity of the view being faded in, `elapsed` after the swap. The
    /// ramp only starts once the stagger has passed.
    pub fn incoming_opacity(&self, elapsed: Duration) -> f32 {
        match elapsed.checked_sub(self.stagger) {
            Some(after_stagger) => self.progress(after_stagger),
            None => 0.0,
        }
    }

    /// Wall time after which both views have settled.
    pub fn total(&self) -> Duration {
        self.stagger + self.duration
    }

    fn progress(&self, elapsed: Duration) -> f32 {
        let raw = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        match self.easing {
            Easing::Linear => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stagger_is_half_duration() {
        let fade = Crossfade::default();
        assert_eq!(fade.stagger * 2, fade.duration);
    }

    #[test]
    fn test_outgoing_ramps_immediately() {
        let fade = Crossfade::default();
        assert_eq!(fade.outgoing_opacity(Duration::ZERO), 1.0);
        assert_eq!(fade.outgoing_opacity(Duration::from_millis(250)), 0.5);
        assert_eq!(fade.outgoing_opacity(Duration::from_millis(500)), 0.0);
        assert_eq!(fade.outgoing_opacity(Duration::from_secs(10)), 0.0);
    }

    #[test]
    fn test_incoming_waits_out_stagger() {
        let fade = Crossfade::default();
        assert_eq!(fade.incoming_opacity(Duration::ZERO), 0.0);
        assert_eq!(fade.incoming_opacity(Duration::from_millis(249)), 0.0);
        assert_eq!(fade.incoming_opacity(Duration::from_millis(500)), 0.5);
        assert_eq!(fade.incoming_opacity(Duration::from_millis(750)), 1.0);
    }

    #[test]
    fn test_views_are_mutually_exclusive_at_crossover() {
        // While the incoming view is still held at zero the outgoing view
        // has already reached half; they never both sit at full.
        let fade = Crossfade::default();
        for ms in [0u64, 100, 250, 400, 600, 750] {
            let t = Duration::from_millis(ms);
            assert!(fade.outgoing_opacity(t) + fade.incoming_opacity(t) <= 1.0 + f32::EPSILON);
        }
    }

    #[test]
    fn test_total_settle_time() {
        assert_eq!(Crossfade::default().total(), Duration::from_millis(750));
    }
}
