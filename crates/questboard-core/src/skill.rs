use crate::error::{QuestError, Result};
use crate::store::{self, Document, DocumentReader, Store};
use crate::types::SkillBranch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Perk
// ---------------------------------------------------------------------------

/// Bonus-XP capability granted by a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perk {
    EarlyBird,
    NightOwl,
    FastFinisher,
    DeadlineMaster,
    TaskStreaker,
    Multitasker,
}

impl Perk {
    pub fn all() -> &'static [Perk] {
        &[
            Perk::EarlyBird,
            Perk::NightOwl,
            Perk::FastFinisher,
            Perk::DeadlineMaster,
            Perk::TaskStreaker,
            Perk::Multitasker,
        ]
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Perk::EarlyBird => "Early Bird",
            Perk::NightOwl => "Night Owl",
            Perk::FastFinisher => "Fast Finisher",
            Perk::DeadlineMaster => "Deadline Master",
            Perk::TaskStreaker => "Task Streaker",
            Perk::Multitasker => "Multitasker",
        }
    }

    /// Resolve a perk from a skill name, ignoring case, spaces, `-` and `_`.
    pub fn from_name(name: &str) -> Option<Perk> {
        let key: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "earlybird" => Some(Perk::EarlyBird),
            "nightowl" => Some(Perk::NightOwl),
            "fastfinisher" => Some(Perk::FastFinisher),
            "deadlinemaster" => Some(Perk::DeadlineMaster),
            "taskstreaker" => Some(Perk::TaskStreaker),
            "multitasker" => Some(Perk::Multitasker),
            _ => None,
        }
    }
}

impl fmt::Display for Perk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Perk {
    type Err = QuestError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Perk::from_name(s).ok_or_else(|| QuestError::Validation(format!("unknown perk '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Skill
// ---------------------------------------------------------------------------

pub const MIN_TIER: u8 = 1;
pub const MAX_TIER: u8 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub branch: SkillBranch,
    /// Ordering hint within the tree, 1-4.
    pub tier: u8,
    pub points_required: u64,
    /// Skills that should be unlocked before this one.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub perk: Option<Perk>,
    pub created_at: DateTime<Utc>,
}

impl Document for Skill {
    const TABLE: store::DocTable = store::SKILLS;

    fn id(&self) -> &str {
        &self.id
    }

    fn missing(id: &str) -> QuestError {
        QuestError::SkillNotFound(id.to_string())
    }
}

/// Perks granted by the given skills.
pub fn perks_of<'a>(skills: impl IntoIterator<Item = &'a Skill>) -> BTreeSet<Perk> {
    skills.into_iter().filter_map(|s| s.perk).collect()
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSkill {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub branch: SkillBranch,
    pub tier: u8,
    #[serde(default)]
    pub points_required: u64,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Explicit perk; resolved from the name when absent.
    #[serde(default)]
    pub perk: Option<Perk>,
}

impl NewSkill {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(QuestError::Validation("skill name is required".into()));
        }
        if !(MIN_TIER..=MAX_TIER).contains(&self.tier) {
            return Err(QuestError::Validation(format!(
                "tier must be between {MIN_TIER} and {MAX_TIER}, got {}",
                self.tier
            )));
        }
        Ok(())
    }
}

/// Insert a new skill. Names are unique and every dependency must exist.
pub fn create_skill(store: &Store, new: NewSkill) -> Result<Skill> {
    new.validate()?;
    store.write(|tx| insert_skill(tx, new))
}

fn insert_skill(tx: &store::WriteTx, new: NewSkill) -> Result<Skill> {
    let name = new.name.trim().to_string();
    let existing: Vec<Skill> = tx.list()?;
    if existing.iter().any(|s| s.name.eq_ignore_ascii_case(&name)) {
        return Err(QuestError::SkillExists(name));
    }
    for dep in &new.dependencies {
        if !existing.iter().any(|s| &s.id == dep) {
            return Err(QuestError::SkillNotFound(dep.clone()));
        }
    }
    let mut dependencies: Vec<String> = Vec::with_capacity(new.dependencies.len());
    for dep in new.dependencies {
        if !dependencies.contains(&dep) {
            dependencies.push(dep);
        }
    }

    let skill = Skill {
        id: store::new_id(),
        perk: new.perk.or_else(|| Perk::from_name(&name)),
        name,
        description: new.description,
        branch: new.branch,
        tier: new.tier,
        points_required: new.points_required,
        dependencies,
        created_at: Utc::now(),
    };
    tx.put(&skill)?;
    tracing::info!(skill = %skill.id, name = %skill.name, "created skill");
    Ok(skill)
}

pub fn get_skill(store: &Store, id: &str) -> Result<Skill> {
    store.read(|tx| tx.load(id))
}

/// All skills ordered by branch, tier, then name.
pub fn list_skills(store: &Store) -> Result<Vec<Skill>> {
    let mut skills: Vec<Skill> = store.read(|tx| tx.list())?;
    sort_skills(&mut skills);
    Ok(skills)
}

fn sort_skills(skills: &mut [Skill]) {
    skills.sort_by(|a, b| {
        a.branch
            .cmp(&b.branch)
            .then(a.tier.cmp(&b.tier))
            .then_with(|| a.name.cmp(&b.name))
    });
}

// ---------------------------------------------------------------------------
// Default catalog
// ---------------------------------------------------------------------------

struct CatalogEntry {
    perk: Perk,
    description: &'static str,
    branch: SkillBranch,
    tier: u8,
    points_required: u64,
    requires: &'static [Perk],
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        perk: Perk::FastFinisher,
        description: "+2 XP on every completed task",
        branch: SkillBranch::Productivity,
        tier: 1,
        points_required: 5,
        requires: &[],
    },
    CatalogEntry {
        perk: Perk::EarlyBird,
        description: "+3 XP for tasks completed before noon",
        branch: SkillBranch::Productivity,
        tier: 1,
        points_required: 10,
        requires: &[],
    },
    CatalogEntry {
        perk: Perk::NightOwl,
        description: "+3 XP for tasks completed after 8pm",
        branch: SkillBranch::Productivity,
        tier: 1,
        points_required: 10,
        requires: &[],
    },
    CatalogEntry {
        perk: Perk::Multitasker,
        description: "+4 XP from the second task completed in a day",
        branch: SkillBranch::TaskManagement,
        tier: 2,
        points_required: 15,
        requires: &[Perk::FastFinisher],
    },
    CatalogEntry {
        perk: Perk::TaskStreaker,
        description: "+5 XP from the third task completed in a day",
        branch: SkillBranch::TaskManagement,
        tier: 3,
        points_required: 25,
        requires: &[Perk::Multitasker],
    },
    CatalogEntry {
        perk: Perk::DeadlineMaster,
        description: "Double base XP for tasks finished before their due date",
        branch: SkillBranch::TaskManagement,
        tier: 4,
        points_required: 40,
        requires: &[Perk::TaskStreaker],
    },
];

/// Insert the built-in perk skills that are not present yet, matched by name.
///
/// Returns the skills that were inserted.
pub fn seed_default_skills(store: &Store) -> Result<Vec<Skill>> {
    store.write(|tx| {
        let mut inserted = Vec::new();
        for entry in CATALOG {
            let existing: Vec<Skill> = tx.list()?;
            let name = entry.perk.display_name();
            if existing.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
                continue;
            }
            let dependencies = entry
                .requires
                .iter()
                .filter_map(|p| existing.iter().find(|s| s.perk == Some(*p)))
                .map(|s| s.id.clone())
                .collect();
            let skill = insert_skill(
                tx,
                NewSkill {
                    name: name.to_string(),
                    description: entry.description.to_string(),
                    branch: entry.branch,
                    tier: entry.tier,
                    points_required: entry.points_required,
                    dependencies,
                    perk: Some(entry.perk),
                },
            )?;
            inserted.push(skill);
        }
        Ok(inserted)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn new_skill(name: &str, tier: u8) -> NewSkill {
        NewSkill {
            name: name.to_string(),
            description: String::new(),
            branch: SkillBranch::Productivity,
            tier,
            points_required: 10,
            dependencies: Vec::new(),
            perk: None,
        }
    }

    #[test]
    fn perk_resolves_from_loose_names() {
        assert_eq!(Perk::from_name("Early Bird"), Some(Perk::EarlyBird));
        assert_eq!(Perk::from_name("early_bird"), Some(Perk::EarlyBird));
        assert_eq!(Perk::from_name("DEADLINE-MASTER"), Some(Perk::DeadlineMaster));
        assert_eq!(Perk::from_name("Time Wizard"), None);
    }

    #[test]
    fn create_skill_resolves_perk_from_name() {
        let (_dir, store) = open_tmp();
        let skill = create_skill(&store, new_skill("Night Owl", 1)).unwrap();
        assert_eq!(skill.perk, Some(Perk::NightOwl));

        let plain = create_skill(&store, new_skill("Mentoring", 2)).unwrap();
        assert_eq!(plain.perk, None);
    }

    #[test]
    fn create_skill_rejects_bad_tier_and_duplicates() {
        let (_dir, store) = open_tmp();
        assert!(matches!(
            create_skill(&store, new_skill("Focus", 5)),
            Err(QuestError::Validation(_))
        ));
        create_skill(&store, new_skill("Focus", 1)).unwrap();
        assert!(matches!(
            create_skill(&store, new_skill("focus", 2)),
            Err(QuestError::SkillExists(_))
        ));
    }

    #[test]
    fn create_skill_requires_existing_dependencies() {
        let (_dir, store) = open_tmp();
        let mut s = new_skill("Focus", 2);
        s.dependencies = vec!["missing".into()];
        assert!(matches!(
            create_skill(&store, s),
            Err(QuestError::SkillNotFound(_))
        ));
    }

    #[test]
    fn seed_is_idempotent_and_links_dependencies() {
        let (_dir, store) = open_tmp();
        let first = seed_default_skills(&store).unwrap();
        assert_eq!(first.len(), Perk::all().len());
        let second = seed_default_skills(&store).unwrap();
        assert!(second.is_empty());

        let skills = list_skills(&store).unwrap();
        let by_perk = |p: Perk| skills.iter().find(|s| s.perk == Some(p)).unwrap();
        let streaker = by_perk(Perk::TaskStreaker);
        assert_eq!(streaker.dependencies, vec![by_perk(Perk::Multitasker).id.clone()]);
        assert!(by_perk(Perk::FastFinisher).dependencies.is_empty());
    }

    #[test]
    fn list_orders_by_branch_then_tier() {
        let (_dir, store) = open_tmp();
        seed_default_skills(&store).unwrap();
        let skills = list_skills(&store).unwrap();
        for pair in skills.windows(2) {
            assert!((pair[0].branch, pair[0].tier) <= (pair[1].branch, pair[1].tier));
        }
    }
}
