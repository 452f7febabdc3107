//! Milestone badges keyed on cumulative XP.

/// A badge and the cumulative XP at which it is earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeRule {
    pub name: &'static str,
    pub threshold: u64,
}

/// The canonical badge table, ordered by threshold.
pub const BADGES: &[BadgeRule] = &[
    BadgeRule {
        name: "Task Beginner",
        threshold: 30,
    },
    BadgeRule {
        name: "Task Master",
        threshold: 100,
    },
    BadgeRule {
        name: "XP Achiever",
        threshold: 200,
    },
    BadgeRule {
        name: "Legendary Worker",
        threshold: 500,
    },
];

/// Names of every badge whose threshold `earned_xp` meets.
pub fn badges_earned(earned_xp: u64) -> Vec<&'static str> {
    BADGES
        .iter()
        .filter(|b| earned_xp >= b.threshold)
        .map(|b| b.name)
        .collect()
}

/// Add any badge qualified for at `earned_xp` that `badges` lacks.
///
/// Never removes entries. Returns the names that were added, in table order.
pub fn sync_badges(badges: &mut Vec<String>, earned_xp: u64) -> Vec<String> {
    let mut added = Vec::new();
    for name in badges_earned(earned_xp) {
        if !badges.iter().any(|b| b == name) {
            badges.push(name.to_string());
            added.push(name.to_string());
        }
    }
    added
}

/// The next badge not yet reachable at `earned_xp`, if any.
pub fn next_badge(earned_xp: u64) -> Option<&'static BadgeRule> {
    BADGES.iter().find(|b| earned_xp < b.threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive() {
        assert!(badges_earned(29).is_empty());
        assert_eq!(badges_earned(30), vec!["Task Beginner"]);
        assert_eq!(badges_earned(100), vec!["Task Beginner", "Task Master"]);
        assert_eq!(badges_earned(500).len(), 4);
    }

    #[test]
    fn earned_set_is_monotonic() {
        let mut prev = badges_earned(0);
        for xp in (0..700u64).step_by(7) {
            let now = badges_earned(xp);
            assert!(prev.iter().all(|b| now.contains(b)), "lost a badge at {xp}");
            prev = now;
        }
    }

    #[test]
    fn sync_appends_only_missing() {
        let mut badges = vec!["Task Beginner".to_string(), "Founding Member".to_string()];
        let added = sync_badges(&mut badges, 250);
        assert_eq!(added, vec!["Task Master", "XP Achiever"]);
        assert_eq!(badges.len(), 4);
        assert!(badges.contains(&"Founding Member".to_string()));

        let again = sync_badges(&mut badges, 250);
        assert!(again.is_empty());
    }

    #[test]
    fn next_badge_after_xp() {
        assert_eq!(next_badge(0).map(|b| b.name), Some("Task Beginner"));
        assert_eq!(next_badge(150).map(|b| b.name), Some("XP Achiever"));
        assert!(next_badge(500).is_none());
    }
}
