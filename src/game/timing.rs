//! Timing minigame
//!
//! A press is graded by its distance from a target instant one second into
//! the window. The window closes `medium` seconds after the target; no press
//! by then is a `Failed` result.

use crate::core::TimingResult;
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};

/// Target instant inside the window, in seconds
pub const TARGET_TIME: f32 = 1.0;

/// Tolerance bands, in seconds from the target. `perfect <= small <= medium`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingBands {
    pub perfect: f32,
    pub small: f32,
    pub medium: f32,
}

impl Default for TimingBands {
    fn default() -> Self {
        TimingBands {
            perfect: 0.125,
            small: 0.25,
            medium: 0.35,
        }
    }
}

impl TimingBands {
    pub fn new(perfect: f32, small: f32, medium: f32) -> Self {
        TimingBands {
            perfect,
            small,
            medium,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let ordered = 0.0 <= self.perfect && self.perfect <= self.small && self.small <= self.medium;
        if !ordered || !self.medium.is_finite() {
            return Err(DuelError::InvalidConfig(format!(
                "timing bands must satisfy 0 <= perfect <= small <= medium, got {:?}",
                self
            )));
        }
        Ok(())
    }

    /// Total window length
    pub fn window(&self) -> f32 {
        TARGET_TIME + self.medium
    }

    /// Grade a distance from the target
    pub fn classify(&self, delta: f32) -> TimingResult {
        let delta = delta.abs();
        if delta <= self.perfect {
            TimingResult::Perfect
        } else if delta <= self.small {
            TimingResult::SmallMiss
        } else if delta <= self.medium {
            TimingResult::MediumMiss
        } else {
            TimingResult::Failed
        }
    }

    /// Grade a press made `press_time` seconds into the window, or no press
    pub fn grade_press(&self, press_time: Option<f32>) -> TimingResult {
        match press_time {
            Some(t) => self.classify(TARGET_TIME - t),
            None => TimingResult::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ActiveWindow {
    bands: TimingBands,
    elapsed: f32,
}

/// Tick-driven minigame runner.
///
/// Holds at most one open window; the only state kept across runs is the
/// last result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingEngine {
    window: Option<ActiveWindow>,
    last_result: Option<TimingResult>,
}

impl TimingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new window (replaces any window still open)
    pub fn start(&mut self, bands: TimingBands) {
        self.window = Some(ActiveWindow {
            bands,
            elapsed: 0.0,
        });
    }

    pub fn is_running(&self) -> bool {
        self.window.is_some()
    }

    /// Seconds since the open window started
    pub fn elapsed(&self) -> Option<f32> {
        self.window.map(|w| w.elapsed)
    }

    pub fn last_result(&self) -> Option<TimingResult> {
        self.last_result
    }

    /// Advance the open window by one tick.
    ///
    /// Returns the result on the tick the window resolves, `None` otherwise
    /// (or when no window is open).
    pub fn tick(&mut self, dt: f32, key_pressed: bool) -> Option<TimingResult> {
        let window = self.window.as_mut()?;
        window.elapsed += dt.max(0.0);

        let result = if key_pressed {
            window.bands.grade_press(Some(window.elapsed))
        } else if window.elapsed >= window.bands.window() {
            TimingResult::Failed
        } else {
            return None;
        };

        self.window = None;
        self.last_result = Some(result);
        Some(result)
    }

    /// Close the open window without producing a result
    pub fn cancel(&mut self) {
        self.window = None;
    }

    /// Run a whole window against a scripted press time at a fixed tick rate
    pub fn run_minigame(&mut self, bands: TimingBands, dt: f32, press_at: Option<f32>) -> TimingResult {
        self.start(bands);
        let dt = if dt > 0.0 { dt } else { 1.0 / 60.0 };
        loop {
            let elapsed = self.elapsed().unwrap_or(0.0);
            let pressed = press_at.is_some_and(|t| elapsed + dt >= t);
            if let Some(result) = self.tick(dt, pressed) {
                return result;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_classify_bands() {
        let bands = TimingBands::default();
        assert_eq!(bands.classify(0.0), TimingResult::Perfect);
        assert_eq!(bands.classify(0.125), TimingResult::Perfect);
        assert_eq!(bands.classify(-0.2), TimingResult::SmallMiss);
        assert_eq!(bands.classify(0.3), TimingResult::MediumMiss);
        assert_eq!(bands.classify(0.36), TimingResult::Failed);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let bands = TimingBands::default();
        let mut previous = TimingResult::Perfect;
        for step in 0..200 {
            let delta = step as f32 * 0.0025;
            let grade = bands.classify(delta);
            assert!(grade >= previous, "grade regressed at delta {delta}");
            previous = grade;
        }
        assert_eq!(previous, TimingResult::Failed);
    }

    #[test]
    fn test_no_press_fails_after_window() {
        let mut engine = TimingEngine::new();
        engine.start(TimingBands::default());
        let mut ticks = 0;
        let result = loop {
            ticks += 1;
            if let Some(r) = engine.tick(DT, false) {
                break r;
            }
        };
        assert_eq!(result, TimingResult::Failed);
        // 1.35s at 60Hz
        assert!((81..=82).contains(&ticks), "resolved after {ticks} ticks");
        assert!(!engine.is_running());
        assert_eq!(engine.last_result(), Some(TimingResult::Failed));
    }

    #[test]
    fn test_press_on_target_is_perfect() {
        let mut engine = TimingEngine::new();
        let result = engine.run_minigame(TimingBands::default(), DT, Some(1.0));
        assert_eq!(result, TimingResult::Perfect);
    }

    #[test]
    fn test_early_press_grades() {
        let mut engine = TimingEngine::new();
        assert_eq!(
            engine.run_minigame(TimingBands::default(), DT, Some(0.8)),
            TimingResult::SmallMiss
        );
        assert_eq!(
            engine.run_minigame(TimingBands::default(), DT, Some(0.7)),
            TimingResult::MediumMiss
        );
        assert_eq!(
            engine.run_minigame(TimingBands::default(), DT, Some(0.2)),
            TimingResult::Failed
        );
        assert_eq!(engine.last_result(), Some(TimingResult::Failed));
    }

    #[test]
    fn test_tick_without_window_is_noop() {
        let mut engine = TimingEngine::new();
        assert_eq!(engine.tick(DT, true), None);
        assert_eq!(engine.last_result(), None);
    }

    #[test]
    fn test_bands_validation() {
        assert!(TimingBands::default().validate().is_ok());
        assert!(TimingBands::new(0.3, 0.2, 0.4).validate().is_err());
    }
}
