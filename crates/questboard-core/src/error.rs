use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuestError {
    #[error("not initialized: run 'questboard init'")]
    NotInitialized,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("skill not found: {0}")]
    SkillNotFound(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("user already exists: {0}")]
    UserExists(String),

    #[error("skill already exists: {0}")]
    SkillExists(String),

    #[error("task already completed: {0}")]
    AlreadyCompleted(String),

    #[error("skill already unlocked: {0}")]
    AlreadyUnlocked(String),

    #[error("not enough points: {required} required, {available} available")]
    InsufficientPoints { required: u64, available: u64 },

    #[error("skill '{skill}' requires unlocking first: {}", missing.join(", "))]
    DependencyNotMet { skill: String, missing: Vec<String> },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(String),

    /// Another process (usually `questboard serve`) holds the database lock.
    #[error("workspace database is in use by another process: {0}")]
    WorkspaceBusy(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_message_lists_missing_skills() {
        let err = QuestError::DependencyNotMet {
            skill: "Deadline Master".into(),
            missing: vec!["Fast Finisher".into(), "Early Bird".into()],
        };
        assert_eq!(
            err.to_string(),
            "skill 'Deadline Master' requires unlocking first: Fast Finisher, Early Bird"
        );
    }

    #[test]
    fn insufficient_points_message() {
        let err = QuestError::InsufficientPoints {
            required: 25,
            available: 7,
        };
        assert_eq!(err.to_string(), "not enough points: 25 required, 7 available");
    }
}
