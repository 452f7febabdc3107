use crate::badge::next_badge;
use crate::error::{QuestError, Result};
use crate::level::{level_for_xp, LevelProgress};
use crate::skill::Skill;
use crate::store::{self, Document, DocumentReader, Store};
use crate::types::ExperienceLevel;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Spendable currency; only base XP from completions is credited here.
    #[serde(default)]
    pub points: u64,
    /// Cumulative XP, never decreases.
    #[serde(default)]
    pub earned_xp: u64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub completed_tasks: u64,
    #[serde(default)]
    pub unlocked_skills: Vec<String>,
    #[serde(default)]
    pub badges: Vec<String>,
    pub created_at: DateTime<Utc>,
}

fn default_level() -> u32 {
    1
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: store::new_id(),
            name: name.into(),
            email: email.into(),
            points: 0,
            earned_xp: 0,
            level: 1,
            experience_level: ExperienceLevel::Junior,
            completed_tasks: 0,
            unlocked_skills: Vec::new(),
            badges: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn has_unlocked(&self, skill_id: &str) -> bool {
        self.unlocked_skills.iter().any(|s| s == skill_id)
    }

    /// True when the stored level matches the level derived from XP.
    pub fn level_is_consistent(&self) -> bool {
        self.level == level_for_xp(self.earned_xp)
    }
}

impl Document for User {
    const TABLE: store::DocTable = store::USERS;

    fn id(&self) -> &str {
        &self.id
    }

    fn missing(id: &str) -> QuestError {
        QuestError::UserNotFound(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Registration and lookup
// ---------------------------------------------------------------------------

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

pub fn validate_email(email: &str) -> Result<()> {
    if email_re().is_match(email) {
        Ok(())
    } else {
        Err(QuestError::Validation(format!("invalid email '{email}'")))
    }
}

/// Create a user with an empty ledger. Emails are unique, case-insensitively.
pub fn register_user(store: &Store, name: &str, email: &str) -> Result<User> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() {
        return Err(QuestError::Validation("name is required".into()));
    }
    validate_email(email)?;

    store.write(|tx| {
        let existing: Vec<User> = tx.list()?;
        if existing.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(QuestError::UserExists(email.to_string()));
        }
        let user = User::new(name, email);
        tx.put(&user)?;
        tracing::info!(user = %user.id, "registered user");
        Ok(user)
    })
}

pub fn get_user(store: &Store, id: &str) -> Result<User> {
    store.read(|tx| tx.load(id))
}

/// All users, oldest first.
pub fn list_users(store: &Store) -> Result<Vec<User>> {
    let mut users: Vec<User> = store.read(|tx| tx.list())?;
    users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(users)
}

// ---------------------------------------------------------------------------
// XP summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockedSkillRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpSummary {
    pub user_id: String,
    pub earned_xp: u64,
    pub points: u64,
    pub completed_tasks: u64,
    pub level: u32,
    pub experience_level: ExperienceLevel,
    pub next_level_xp: u64,
    pub progress_percent: u8,
    pub badges: Vec<String>,
    /// Next XP milestone badge and its threshold, if any remain.
    pub next_badge: Option<NextBadge>,
    pub unlocked_skills: Vec<UnlockedSkillRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextBadge {
    pub name: String,
    pub threshold: u64,
}

/// Read-only XP, level, badge and skill snapshot for a user.
pub fn get_user_xp_summary(store: &Store, id: &str) -> Result<XpSummary> {
    store.read(|tx| {
        let user: User = tx.load(id)?;
        let mut unlocked = Vec::with_capacity(user.unlocked_skills.len());
        for skill_id in &user.unlocked_skills {
            // Skills are immutable once referenced, but tolerate a dangling id.
            let name = tx
                .get::<Skill>(skill_id)?
                .map(|s| s.name)
                .unwrap_or_else(|| skill_id.clone());
            unlocked.push(UnlockedSkillRef {
                id: skill_id.clone(),
                name,
            });
        }
        let progress = LevelProgress::for_xp(user.earned_xp);
        Ok(XpSummary {
            user_id: user.id,
            earned_xp: user.earned_xp,
            points: user.points,
            completed_tasks: user.completed_tasks,
            level: user.level,
            experience_level: user.experience_level,
            next_level_xp: progress.next_level_xp,
            progress_percent: progress.percent,
            badges: user.badges,
            next_badge: next_badge(user.earned_xp).map(|b| NextBadge {
                name: b.name.to_string(),
                threshold: b.threshold,
            }),
            unlocked_skills: unlocked,
        })
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
