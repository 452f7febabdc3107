//! Spending points to unlock skills.

use crate::error::{QuestError, Result};
use crate::skill::Skill;
use crate::store::{DocumentReader, Store};
use crate::user::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockOutcome {
    pub skill: Skill,
    pub points_remaining: u64,
    pub unlocked_skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockPolicy {
    /// Require every dependency of a skill to be unlocked first.
    pub enforce_dependencies: bool,
}

impl Default for UnlockPolicy {
    fn default() -> Self {
        Self {
            enforce_dependencies: true,
        }
    }
}

/// Unlock `skill_id` for `user_id`, debiting its cost from the user's points.
///
/// Checks run in order: already unlocked, skill exists, dependencies (when
/// enforced), affordability. A failed check leaves the user untouched.
pub fn unlock_skill(
    store: &Store,
    user_id: &str,
    skill_id: &str,
    policy: UnlockPolicy,
) -> Result<UnlockOutcome> {
    let outcome = store.write(|tx| {
        let mut user: User = tx.load(user_id)?;
        if user.has_unlocked(skill_id) {
            return Err(QuestError::AlreadyUnlocked(skill_id.to_string()));
        }
        let skill: Skill = tx.load(skill_id)?;

        if policy.enforce_dependencies {
            let mut missing = Vec::new();
            for dep in skill.dependencies.iter().filter(|d| !user.has_unlocked(d)) {
                let name = tx
                    .get::<Skill>(dep)?
                    .map(|s| s.name)
                    .unwrap_or_else(|| dep.clone());
                missing.push(name);
            }
            if !missing.is_empty() {
                return Err(QuestError::DependencyNotMet {
                    skill: skill.name,
                    missing,
                });
            }
        }

        user.debit_for_skill(skill.points_required)?;
        user.unlocked_skills.push(skill.id.clone());
        tx.put(&user)?;

        Ok(UnlockOutcome {
            points_remaining: user.points,
            unlocked_skills: user.unlocked_skills,
            skill,
        })
    });
    match &outcome {
        Ok(o) => tracing::info!(user = %user_id, skill = %o.skill.name, "skill unlocked"),
        Err(e) => tracing::warn!(user = %user_id, skill = %skill_id, "unlock rejected: {e}"),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::{create_skill, seed_default_skills, NewSkill, Perk};
    use crate::types::SkillBranch;
    use crate::user::{get_user, register_user};
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn user_with_points(store: &Store, points: u64) -> User {
        let user = register_user(store, "Ada", "ada@example.com").unwrap();
        store
            .write(|tx| {
                let mut u: User = tx.load(&user.id)?;
                u.credit_points(points);
                tx.put(&u)?;
                Ok(u)
            })
            .unwrap()
    }

    fn skill(store: &Store, name: &str, cost: u64, deps: Vec<String>) -> Skill {
        create_skill(
            store,
            NewSkill {
                name: name.into(),
                description: String::new(),
                branch: SkillBranch::Collaboration,
                tier: 1,
                points_required: cost,
                dependencies: deps,
                perk: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn exact_balance_unlocks() {
        let (_dir, store) = open_tmp();
        let user = user_with_points(&store, 10);
        let s = skill(&store, "Pairing", 10, vec![]);

        let out = unlock_skill(&store, &user.id, &s.id, UnlockPolicy::default()).unwrap();
        assert_eq!(out.points_remaining, 0);
        assert_eq!(out.unlocked_skills, vec![s.id.clone()]);

        let user = get_user(&store, &user.id).unwrap();
        assert_eq!(user.points, 0);
        assert!(user.has_unlocked(&s.id));
    }

    #[test]
    fn second_unlock_fails_and_keeps_points() {
        let (_dir, store) = open_tmp();
        let user = user_with_points(&store, 30);
        let s = skill(&store, "Pairing", 10, vec![]);
        unlock_skill(&store, &user.id, &s.id, UnlockPolicy::default()).unwrap();

        let err = unlock_skill(&store, &user.id, &s.id, UnlockPolicy::default()).unwrap_err();
        assert!(matches!(err, QuestError::AlreadyUnlocked(_)));
        let user = get_user(&store, &user.id).unwrap();
        assert_eq!(user.points, 20);
        assert_eq!(user.unlocked_skills.len(), 1);
    }

    #[test]
    fn insufficient_points_mutates_nothing() {
        let (_dir, store) = open_tmp();
        let user = user_with_points(&store, 9);
        let s = skill(&store, "Pairing", 10, vec![]);

        let err = unlock_skill(&store, &user.id, &s.id, UnlockPolicy::default()).unwrap_err();
        assert!(matches!(
            err,
            QuestError::InsufficientPoints {
                required: 10,
                available: 9
            }
        ));
        let after = get_user(&store, &user.id).unwrap();
        assert_eq!(after, user);
    }

    #[test]
    fn missing_skill_and_user() {
        let (_dir, store) = open_tmp();
        let user = user_with_points(&store, 9);
        assert!(matches!(
            unlock_skill(&store, &user.id, "ghost", UnlockPolicy::default()),
            Err(QuestError::SkillNotFound(_))
        ));
        assert!(matches!(
            unlock_skill(&store, "nobody", "ghost", UnlockPolicy::default()),
            Err(QuestError::UserNotFound(_))
        ));
    }

    #[test]
    fn dependencies_enforced_by_default() {
        let (_dir, store) = open_tmp();
        let user = user_with_points(&store, 100);
        let base = skill(&store, "Pairing", 5, vec![]);
        let advanced = skill(&store, "Mentoring", 5, vec![base.id.clone()]);

        let err =
            unlock_skill(&store, &user.id, &advanced.id, UnlockPolicy::default()).unwrap_err();
        match err {
            QuestError::DependencyNotMet { skill, missing } => {
                assert_eq!(skill, "Mentoring");
                assert_eq!(missing, vec!["Pairing".to_string()]);
            }
            other => panic!("expected DependencyNotMet, got {other:?}"),
        }
        assert_eq!(get_user(&store, &user.id).unwrap().points, 100);

        unlock_skill(&store, &user.id, &base.id, UnlockPolicy::default()).unwrap();
        unlock_skill(&store, &user.id, &advanced.id, UnlockPolicy::default()).unwrap();
        assert_eq!(get_user(&store, &user.id).unwrap().points, 90);
    }

    #[test]
    fn dependencies_can_be_ignored() {
        let (_dir, store) = open_tmp();
        let user = user_with_points(&store, 100);
        seed_default_skills(&store).unwrap();
        let skills = crate::skill::list_skills(&store).unwrap();
        let deadline = skills
            .iter()
            .find(|s| s.perk == Some(Perk::DeadlineMaster))
            .unwrap();

        let relaxed = UnlockPolicy {
            enforce_dependencies: false,
        };
        let out = unlock_skill(&store, &user.id, &deadline.id, relaxed).unwrap();
        assert_eq!(out.points_remaining, 100 - deadline.points_required);
    }
}
