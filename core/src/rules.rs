use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Longest duration any rule may ask for.
pub const MAX_DURATION_SECS: f32 = 24.0 * 60.0 * 60.0;

/// Largest per-step combo growth.
pub const MAX_COMBO_FACTOR: f32 = 10.0;

/// Playback pacing hints attached to the action queues a session produces.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Delay between consecutive `Create` actions of one refill.
    pub spawn_stagger_secs: f32,
    /// Pause queued between two cascade steps.
    pub combo_pause_secs: f32,
    /// Barriers give up waiting after this long; `None` waits indefinitely.
    pub barrier_timeout_secs: Option<f32>,
}

impl Timing {
    pub fn spawn_stagger(&self) -> Duration {
        secs(self.spawn_stagger_secs)
    }

    pub fn combo_pause(&self) -> Duration {
        secs(self.combo_pause_secs)
    }

    pub fn barrier_timeout(&self) -> Option<Duration> {
        self.barrier_timeout_secs.map(secs)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            spawn_stagger_secs: 0.0,
            combo_pause_secs: 0.1,
            barrier_timeout_secs: Some(5.0),
        }
    }
}

/// Tunables of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub size: Coord2,
    /// Number of ordinary kinds used when no explicit kind set is given.
    pub kind_count: u8,
    pub base_score: u32,
    pub per_extra_gem_multiplier: f32,
    pub wild_bonus_multiplier: f32,
    /// Score multiplier growth per cascade step.
    pub combo_factor: f32,
    /// Session length; zero plays without a timer.
    pub time_limit_secs: f32,
    pub repair_passes: u8,
    /// Attempts at generating a board that has at least one playable swap.
    pub regenerate_attempts: u8,
    pub timing: Timing,
}

impl Rules {
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.size;
        if w < 3 && h < 3 {
            return Err(GameError::InvalidRules("board too small to hold a match"));
        }
        if w == 0 || h == 0 {
            return Err(GameError::InvalidRules("board has no cells"));
        }
        if self.kind_count < 3 || self.kind_count > 26 {
            return Err(GameError::InvalidRules("kind count must be between 3 and 26"));
        }
        let multipliers = [
            self.per_extra_gem_multiplier,
            self.wild_bonus_multiplier,
            self.combo_factor,
        ];
        if multipliers.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(GameError::InvalidRules("multipliers must be finite and non-negative"));
        }
        if !(1.0..=MAX_COMBO_FACTOR).contains(&self.combo_factor) {
            return Err(GameError::InvalidRules("combo factor must be between 1 and 10"));
        }
        let durations = [
            Some(self.time_limit_secs),
            Some(self.timing.spawn_stagger_secs),
            Some(self.timing.combo_pause_secs),
            self.timing.barrier_timeout_secs,
        ];
        if durations
            .into_iter()
            .flatten()
            .any(|d| !(0.0..=MAX_DURATION_SECS).contains(&d))
        {
            return Err(GameError::InvalidRules("durations must be between 0 and 24 hours"));
        }
        Ok(())
    }

    /// The first `kind_count` ordinary kinds.
    pub fn kinds(&self) -> Vec<GemKind> {
        GemKind::ordinary_kinds(self.kind_count).collect()
    }

    pub fn time_limit(&self) -> Duration {
        secs(self.time_limit_secs)
    }

    pub fn clear_params(&self, score_multiplier: f32) -> ClearParams {
        ClearParams {
            base_score: self.base_score,
            score_multiplier,
            per_extra_gem_multiplier: self.per_extra_gem_multiplier,
            wild_bonus_multiplier: self.wild_bonus_multiplier,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            size: Grid::DEFAULT_SIZE,
            kind_count: 6,
            base_score: 10,
            per_extra_gem_multiplier: 0.5,
            wild_bonus_multiplier: 1.0,
            combo_factor: 1.5,
            time_limit_secs: 60.0,
            repair_passes: DEFAULT_REPAIR_PASSES,
            regenerate_attempts: 8,
            timing: Timing::default(),
        }
    }
}

/// Negative and NaN values become zero, values too large to represent saturate.
fn secs(value: f32) -> Duration {
    match Duration::try_from_secs_f32(value) {
        Ok(duration) => duration,
        Err(_) if value > 0.0 => Duration::MAX,
        Err(_) => Duration::ZERO,
    }
}
