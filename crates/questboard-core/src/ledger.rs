//! Points and XP bookkeeping on a [`User`].
//!
//! Points are spendable and only ever grow by base XP; earned XP is the
//! cumulative total including bonuses. Level and badges are derived from
//! earned XP and resynced on every credit.

use crate::badge::sync_badges;
use crate::error::{QuestError, Result};
use crate::level::level_for_xp;
use crate::types::ExperienceLevel;
use crate::user::User;
use serde::{Deserialize, Serialize};

/// What changed on a user as a result of a credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerChange {
    pub previous_level: u32,
    pub level: u32,
    pub new_badges: Vec<String>,
}

impl LedgerChange {
    pub fn level_up(&self) -> bool {
        self.level > self.previous_level
    }
}

impl User {
    /// Record a completed task worth `base_xp` points and `total_xp` XP.
    pub fn credit_completion(&mut self, base_xp: u64, total_xp: u64) -> LedgerChange {
        self.points = self.points.saturating_add(base_xp);
        self.earned_xp = self.earned_xp.saturating_add(total_xp);
        self.completed_tasks = self.completed_tasks.saturating_add(1);
        self.sync_progress()
    }

    /// Add spendable points without touching XP.
    pub fn credit_points(&mut self, points: u64) {
        self.points = self.points.saturating_add(points);
    }

    /// Spend `cost` points. Fails without mutating if the balance is short.
    pub fn debit_for_skill(&mut self, cost: u64) -> Result<()> {
        if self.points < cost {
            return Err(QuestError::InsufficientPoints {
                required: cost,
                available: self.points,
            });
        }
        self.points -= cost;
        Ok(())
    }

    /// Recompute level and experience bracket from XP and append any newly
    /// qualified badges.
    pub fn sync_progress(&mut self) -> LedgerChange {
        let previous_level = self.level;
        self.level = level_for_xp(self.earned_xp);
        self.experience_level = ExperienceLevel::for_level(self.level);
        let new_badges = sync_badges(&mut self.badges, self.earned_xp);
        LedgerChange {
            previous_level,
            level: self.level,
            new_badges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("Ada", "ada@example.com")
    }

    #[test]
    fn credit_adds_only_base_to_points() {
        let mut u = user();
        let change = u.credit_completion(10, 24);
        assert_eq!(u.points, 10);
        assert_eq!(u.earned_xp, 24);
        assert_eq!(u.completed_tasks, 1);
        assert!(!change.level_up());
        assert!(change.new_badges.is_empty());
    }

    #[test]
    fn credit_crossing_thresholds_levels_up_and_badges() {
        let mut u = user();
        u.credit_completion(10, 20);
        let change = u.credit_completion(10, 35);
        assert_eq!(u.earned_xp, 55);
        assert_eq!(change.previous_level, 1);
        assert_eq!(change.level, 2);
        assert!(change.level_up());
        assert_eq!(change.new_badges, vec!["Task Beginner".to_string()]);
        assert!(u.level_is_consistent());
    }

    #[test]
    fn debit_exact_balance_succeeds() {
        let mut u = user();
        u.credit_points(10);
        u.debit_for_skill(10).unwrap();
        assert_eq!(u.points, 0);
    }

    #[test]
    fn debit_over_balance_leaves_points() {
        let mut u = user();
        u.credit_points(4);
        let err = u.debit_for_skill(5).unwrap_err();
        assert!(matches!(
            err,
            QuestError::InsufficientPoints {
                required: 5,
                available: 4
            }
        ));
        assert_eq!(u.points, 4);
    }

    #[test]
    fn debit_never_touches_xp() {
        let mut u = user();
        u.credit_completion(10, 60);
        let before = (u.earned_xp, u.level, u.badges.clone());
        u.debit_for_skill(7).unwrap();
        assert_eq!((u.earned_xp, u.level, u.badges.clone()), before);
    }

    #[test]
    fn experience_level_tracks_level() {
        let mut u = user();
        u.credit_completion(0, crate::level::xp_for_level(4));
        assert_eq!(u.level, 4);
        assert_eq!(u.experience_level, ExperienceLevel::Mid);
    }
}
