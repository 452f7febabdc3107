use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// XP awarded for completing a task of this priority, before bonuses.
    pub fn base_xp(self) -> u64 {
        match self {
            Priority::High => 10,
            Priority::Medium => 5,
            Priority::Low => 3,
        }
    }

    /// Parse a stored label, falling back to the default priority for
    /// anything unrecognised.
    pub fn from_label_or_default(label: &str) -> Priority {
        label.parse().unwrap_or_default()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = crate::error::QuestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(crate::error::QuestError::Validation(format!(
                "unknown priority '{s}' (expected high, medium or low)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Testing,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Testing => "testing",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn is_completed(self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = crate::error::QuestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "testing" => Ok(TaskStatus::Testing),
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(crate::error::QuestError::Validation(format!(
                "unknown task status '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// SkillBranch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillBranch {
    TaskManagement,
    Collaboration,
    Productivity,
    Analytics,
}

impl SkillBranch {
    pub fn as_str(self) -> &'static str {
        match self {
            SkillBranch::TaskManagement => "task_management",
            SkillBranch::Collaboration => "collaboration",
            SkillBranch::Productivity => "productivity",
            SkillBranch::Analytics => "analytics",
        }
    }
}

impl fmt::Display for SkillBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SkillBranch {
    type Err = crate::error::QuestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "task_management" => Ok(SkillBranch::TaskManagement),
            "collaboration" => Ok(SkillBranch::Collaboration),
            "productivity" => Ok(SkillBranch::Productivity),
            "analytics" => Ok(SkillBranch::Analytics),
            _ => Err(crate::error::QuestError::Validation(format!(
                "unknown skill branch '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ExperienceLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Junior,
    Mid,
    Senior,
}

impl ExperienceLevel {
    /// Seniority bracket for a level: 1-3 junior, 4-6 mid, 7+ senior.
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=3 => ExperienceLevel::Junior,
            4..=6 => ExperienceLevel::Mid,
            _ => ExperienceLevel::Senior,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_base_xp() {
        assert_eq!(Priority::High.base_xp(), 10);
        assert_eq!(Priority::Medium.base_xp(), 5);
        assert_eq!(Priority::Low.base_xp(), 3);
    }

    #[test]
    fn unknown_priority_label_gets_default_base() {
        assert_eq!(Priority::from_label_or_default("High").base_xp(), 10);
        assert_eq!(Priority::from_label_or_default("urgent").base_xp(), 5);
        assert_eq!(Priority::from_label_or_default("").base_xp(), 5);
    }

    #[test]
    fn task_status_parses_loose_spellings() {
        assert_eq!("Completed".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        assert_eq!("In Progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn branch_roundtrips_through_str() {
        for b in [
            SkillBranch::TaskManagement,
            SkillBranch::Collaboration,
            SkillBranch::Productivity,
            SkillBranch::Analytics,
        ] {
            assert_eq!(b.as_str().parse::<SkillBranch>().unwrap(), b);
        }
    }

    #[test]
    fn experience_level_brackets() {
        assert_eq!(ExperienceLevel::for_level(1), ExperienceLevel::Junior);
        assert_eq!(ExperienceLevel::for_level(3), ExperienceLevel::Junior);
        assert_eq!(ExperienceLevel::for_level(4), ExperienceLevel::Mid);
        assert_eq!(ExperienceLevel::for_level(6), ExperienceLevel::Mid);
        assert_eq!(ExperienceLevel::for_level(7), ExperienceLevel::Senior);
    }
}
