//! Level derivation from cumulative XP.
//!
//! Level 2 costs 50 XP and every further level costs twice the previous
//! one, so the cumulative thresholds run 50, 150, 350, 750, ...

use serde::{Deserialize, Serialize};

/// XP needed to go from level 1 to level 2.
pub const FIRST_LEVEL_XP: u64 = 50;

/// Level reached with `earned_xp` cumulative XP. Always at least 1.
pub fn level_for_xp(earned_xp: u64) -> u32 {
    let mut level = 1u32;
    let mut step = FIRST_LEVEL_XP;
    let mut threshold = FIRST_LEVEL_XP;
    while earned_xp >= threshold {
        level += 1;
        let Some(next_step) = step.checked_mul(2) else {
            break;
        };
        let Some(next_threshold) = threshold.checked_add(next_step) else {
            break;
        };
        step = next_step;
        threshold = next_threshold;
    }
    level
}

/// Cumulative XP required to reach `level`: `50 * (2^(level-1) - 1)`.
///
/// Saturates at `u64::MAX` for levels beyond representable XP.
pub fn xp_for_level(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    let doublings = level - 1;
    if doublings >= 64 {
        return u64::MAX;
    }
    let factor = (1u64 << doublings) - 1;
    FIRST_LEVEL_XP.saturating_mul(factor)
}

// ---------------------------------------------------------------------------
// LevelProgress
// ---------------------------------------------------------------------------

/// Where a user sits between their current level and the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    /// Cumulative XP at which the current level was reached.
    pub level_floor_xp: u64,
    /// Cumulative XP at which the next level is reached.
    pub next_level_xp: u64,
    /// Progress through the current level, 0-100.
    pub percent: u8,
}

impl LevelProgress {
    pub fn for_xp(earned_xp: u64) -> Self {
        let level = level_for_xp(earned_xp);
        let floor = xp_for_level(level);
        let next = xp_for_level(level.saturating_add(1));
        let span = next.saturating_sub(floor).max(1);
        let into = earned_xp.saturating_sub(floor).min(span);
        let percent = ((into as u128 * 100) / span as u128) as u8;
        Self {
            level,
            level_floor_xp: floor,
            next_level_xp: next,
            percent,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_thresholds() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(49), 1);
        assert_eq!(level_for_xp(50), 2);
        assert_eq!(level_for_xp(149), 2);
        assert_eq!(level_for_xp(150), 3);
        assert_eq!(level_for_xp(349), 3);
        assert_eq!(level_for_xp(350), 4);
        assert_eq!(level_for_xp(750), 5);
    }

    #[test]
    fn level_is_monotonic_and_at_least_one() {
        let mut prev = level_for_xp(0);
        assert!(prev >= 1);
        for xp in 1..5_000u64 {
            let l = level_for_xp(xp);
            assert!(l >= prev, "level dropped at xp {xp}");
            prev = l;
        }
    }

    #[test]
    fn xp_for_level_matches_level_for_xp() {
        for level in 2..30u32 {
            let need = xp_for_level(level);
            assert_eq!(level_for_xp(need), level);
            assert_eq!(level_for_xp(need - 1), level - 1);
        }
    }

    #[test]
    fn extreme_xp_terminates() {
        let l = level_for_xp(u64::MAX);
        assert!(l > 50);
        assert_eq!(xp_for_level(200), u64::MAX);
    }

    #[test]
    fn progress_within_level() {
        let p = LevelProgress::for_xp(100);
        assert_eq!(p.level, 2);
        assert_eq!(p.level_floor_xp, 50);
        assert_eq!(p.next_level_xp, 150);
        assert_eq!(p.percent, 50);

        let start = LevelProgress::for_xp(0);
        assert_eq!(start.level, 1);
        assert_eq!(start.next_level_xp, 50);
        assert_eq!(start.percent, 0);
    }
}
