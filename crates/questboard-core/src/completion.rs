//! Task completion and the XP reward it pays out.
//!
//! A task is credited exactly once: the status check, the ledger credit and
//! the task update all happen inside one write transaction, and a task that
//! is already `Completed` is rejected before anything is touched.

use crate::bonus::{bonus_xp, CompletionContext, PerkBonus};
use crate::error::{QuestError, Result};
use crate::skill::{perks_of, Skill};
use crate::store::{DocumentReader, Store, WriteTx};
use crate::task::Task;
use crate::types::TaskStatus;
use crate::user::User;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    pub task_id: String,
    pub member_id: String,
    pub base_xp: u64,
    pub bonus_xp: u64,
    pub total_xp: u64,
    /// Names of the unlocked skills whose perk paid out.
    pub activated_skills: Vec<String>,
    pub bonuses: Vec<PerkBonus>,
    pub level_up: bool,
    pub previous_level: u32,
    pub level: u32,
    pub new_badges: Vec<String>,
    pub user: User,
    pub task: Task,
}

/// Complete `task_id` and credit XP to the acting member.
///
/// The member is `member_id` when given, otherwise the task's assignee.
pub fn complete_task(
    store: &Store,
    task_id: &str,
    member_id: Option<&str>,
    now: DateTime<FixedOffset>,
) -> Result<CompletionOutcome> {
    let outcome = store.write(|tx| {
        let task: Task = tx.load(task_id)?;
        complete_loaded(tx, task, member_id, now)
    });
    match &outcome {
        Ok(o) => tracing::info!(
            task = %o.task_id,
            member = %o.member_id,
            total_xp = o.total_xp,
            level_up = o.level_up,
            "task completed"
        ),
        Err(e) => tracing::warn!(task = %task_id, "completion rejected: {e}"),
    }
    outcome
}

fn complete_loaded(
    tx: &WriteTx,
    mut task: Task,
    member_id: Option<&str>,
    now: DateTime<FixedOffset>,
) -> Result<CompletionOutcome> {
    if task.is_completed() {
        return Err(QuestError::AlreadyCompleted(task.id));
    }
    let member_id = member_id
        .map(str::to_string)
        .or_else(|| task.assigned_to.clone())
        .ok_or_else(|| QuestError::UserNotFound(format!("(no assignee on task {})", task.id)))?;
    let mut user: User = tx.load(&member_id)?;

    let mut skills = Vec::with_capacity(user.unlocked_skills.len());
    for id in &user.unlocked_skills {
        if let Some(skill) = tx.get::<Skill>(id)? {
            skills.push(skill);
        }
    }

    let ctx = CompletionContext {
        now,
        due_date: task.due_date,
        completed_today: completed_on_day(tx, &member_id, now)? + 1,
    };
    let base_xp = task.priority.base_xp();
    let breakdown = bonus_xp(base_xp, &perks_of(&skills), &ctx);
    let bonus = breakdown.total();
    let total_xp = base_xp + bonus;
    tracing::debug!(
        task = %task.id,
        base_xp,
        bonus,
        completed_today = ctx.completed_today,
        "computed completion reward"
    );

    let change = user.credit_completion(base_xp, total_xp);
    tx.put(&user)?;

    task.status = TaskStatus::Completed;
    task.completed_at = Some(now.with_timezone(&Utc));
    task.completed_by = Some(member_id.clone());
    tx.put(&task)?;

    let activated_skills = breakdown
        .perks()
        .filter_map(|p| skills.iter().find(|s| s.perk == Some(p)))
        .map(|s| s.name.clone())
        .collect();

    Ok(CompletionOutcome {
        task_id: task.id.clone(),
        member_id,
        base_xp,
        bonus_xp: bonus,
        total_xp,
        activated_skills,
        bonuses: breakdown.bonuses,
        level_up: change.level_up(),
        previous_level: change.previous_level,
        level: change.level,
        new_badges: change.new_badges,
        user,
        task,
    })
}

/// Tasks credited to `member_id` on the local calendar day of `now`.
fn completed_on_day(tx: &WriteTx, member_id: &str, now: DateTime<FixedOffset>) -> Result<u32> {
    let offset = *now.offset();
    let day = now.date_naive();
    let count = tx
        .list::<Task>()?
        .iter()
        .filter(|t| t.is_completed())
        .filter(|t| {
            t.completed_by
                .as_deref()
                .or(t.assigned_to.as_deref())
                == Some(member_id)
        })
        .filter_map(|t| t.completed_at)
        .filter(|at| at.with_timezone(&offset).date_naive() == day)
        .count();
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

// ---------------------------------------------------------------------------
// Status updates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusUpdate {
    /// A non-completing status was set.
    Updated { task: Task },
    /// The task moved into `Completed` and XP was credited.
    Completed { outcome: Box<CompletionOutcome> },
}

/// Set a task's status. Any open status may be set directly; moving into
/// `Completed` pays out through the completion workflow. Completed tasks
/// are terminal.
pub fn set_task_status(
    store: &Store,
    task_id: &str,
    status: TaskStatus,
    member_id: Option<&str>,
    now: DateTime<FixedOffset>,
) -> Result<StatusUpdate> {
    if status.is_completed() {
        return complete_task(store, task_id, member_id, now)
            .map(|outcome| StatusUpdate::Completed {
                outcome: Box::new(outcome),
            });
    }
    store.write(|tx| {
        let mut task: Task = tx.load(task_id)?;
        if task.is_completed() {
            return Err(QuestError::AlreadyCompleted(task.id));
        }
        if status == TaskStatus::InProgress && task.started_at.is_none() {
            task.started_at = Some(now.with_timezone(&Utc));
        }
        task.status = status;
        tx.put(&task)?;
        Ok(StatusUpdate::Updated { task })
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::{create_skill, NewSkill, Perk};
    use crate::task::{create_task, get_task, NewTask};
    use crate::types::{Priority, SkillBranch};
    use crate::user::{get_user, register_user};
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn afternoon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 2, 15, 0, 0)
            .unwrap()
    }

    fn task_for(store: &Store, user: &User, priority: Priority) -> Task {
        let mut new = NewTask::titled("Ship it");
        new.assigned_to = Some(user.id.clone());
        new.priority = priority;
        create_task(store, new).unwrap()
    }

    /// Give `user` an unlocked perk skill directly.
    fn grant(store: &Store, user: &User, perk: Perk) {
        let skill = create_skill(
            store,
            NewSkill {
                name: perk.display_name().into(),
                description: String::new(),
                branch: SkillBranch::Productivity,
                tier: 1,
                points_required: 0,
                dependencies: Vec::new(),
                perk: Some(perk),
            },
        )
        .unwrap();
        store
            .write(|tx| {
                let mut u: User = tx.load(&user.id)?;
                u.unlocked_skills.push(skill.id.clone());
                tx.put(&u)
            })
            .unwrap();
    }

    #[test]
    fn completion_credits_base_xp() {
        let (_dir, store) = open_tmp();
        let user = register_user(&store, "Ada", "ada@example.com").unwrap();
        let task = task_for(&store, &user, Priority::High);

        let out = complete_task(&store, &task.id, None, afternoon()).unwrap();
        assert_eq!(out.base_xp, 10);
        assert_eq!(out.bonus_xp, 0);
        assert_eq!(out.total_xp, 10);
        assert!(!out.level_up);
        assert!(out.activated_skills.is_empty());

        let user = get_user(&store, &user.id).unwrap();
        assert_eq!(user.points, 10);
        assert_eq!(user.earned_xp, 10);
        assert_eq!(user.completed_tasks, 1);

        let task = get_task(&store, &task.id).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.completed_by.as_deref(), Some(user.id.as_str()));
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn second_completion_is_rejected_without_mutation() {
        let (_dir, store) = open_tmp();
        let user = register_user(&store, "Ada", "ada@example.com").unwrap();
        let task = task_for(&store, &user, Priority::Medium);
        complete_task(&store, &task.id, None, afternoon()).unwrap();

        let err = complete_task(&store, &task.id, None, afternoon()).unwrap_err();
        assert!(matches!(err, QuestError::AlreadyCompleted(_)));
        let err = set_task_status(&store, &task.id, TaskStatus::Completed, None, afternoon())
            .unwrap_err();
        assert!(matches!(err, QuestError::AlreadyCompleted(_)));

        let user = get_user(&store, &user.id).unwrap();
        assert_eq!(user.earned_xp, 5);
        assert_eq!(user.completed_tasks, 1);
    }

    #[test]
    fn deadline_master_doubles_high_priority() {
        let (_dir, store) = open_tmp();
        let user = register_user(&store, "Ada", "ada@example.com").unwrap();
        grant(&store, &user, Perk::DeadlineMaster);

        let now = afternoon();
        let mut new = NewTask::titled("Before the deadline");
        new.assigned_to = Some(user.id.clone());
        new.priority = Priority::High;
        new.due_date = Some(now.with_timezone(&Utc) + Duration::days(2));
        let task = create_task(&store, new).unwrap();

        let out = complete_task(&store, &task.id, None, now).unwrap();
        assert_eq!(out.base_xp, 10);
        assert!(out.bonus_xp >= 10);
        assert!(out.total_xp >= 20);
        assert_eq!(out.activated_skills, vec!["Deadline Master".to_string()]);

        let user = get_user(&store, &user.id).unwrap();
        assert_eq!(user.points, 10, "bonus XP is not spendable");
        assert_eq!(user.earned_xp, 20);
    }

    #[test]
    fn third_task_of_day_triggers_streak() {
        let (_dir, store) = open_tmp();
        let user = register_user(&store, "Ada", "ada@example.com").unwrap();
        grant(&store, &user, Perk::TaskStreaker);

        let now = afternoon();
        for i in 0..2 {
            let t = task_for(&store, &user, Priority::Low);
            let out = complete_task(&store, &t.id, None, now + Duration::minutes(i)).unwrap();
            assert_eq!(out.bonus_xp, 0);
        }
        let third = task_for(&store, &user, Priority::Low);
        let out = complete_task(&store, &third.id, None, now + Duration::minutes(5)).unwrap();
        assert_eq!(out.base_xp, 3);
        assert_eq!(out.bonus_xp, 5);
        assert_eq!(out.total_xp, 8);
    }

    #[test]
    fn yesterdays_completions_do_not_count_toward_today() {
        let (_dir, store) = open_tmp();
        let user = register_user(&store, "Ada", "ada@example.com").unwrap();
        grant(&store, &user, Perk::Multitasker);

        let today = afternoon();
        let t1 = task_for(&store, &user, Priority::Low);
        complete_task(&store, &t1.id, None, today - Duration::days(1)).unwrap();
        let t2 = task_for(&store, &user, Priority::Low);
        let out = complete_task(&store, &t2.id, None, today).unwrap();
        assert_eq!(out.bonus_xp, 0);

        let t3 = task_for(&store, &user, Priority::Low);
        let out = complete_task(&store, &t3.id, None, today + Duration::hours(1)).unwrap();
        assert_eq!(out.bonus_xp, 4);
    }

    #[test]
    fn explicit_member_is_credited() {
        let (_dir, store) = open_tmp();
        let ada = register_user(&store, "Ada", "ada@example.com").unwrap();
        let bob = register_user(&store, "Bob", "bob@example.com").unwrap();
        let task = task_for(&store, &ada, Priority::High);

        let out = complete_task(&store, &task.id, Some(&bob.id), afternoon()).unwrap();
        assert_eq!(out.member_id, bob.id);
        assert_eq!(get_user(&store, &bob.id).unwrap().earned_xp, 10);
        assert_eq!(get_user(&store, &ada.id).unwrap().earned_xp, 0);
    }

    #[test]
    fn missing_entities_fail_without_mutation() {
        let (_dir, store) = open_tmp();
        let err = complete_task(&store, "nope", None, afternoon()).unwrap_err();
        assert!(matches!(err, QuestError::TaskNotFound(_)));

        let orphan = create_task(&store, NewTask::titled("Nobody's")).unwrap();
        let err = complete_task(&store, &orphan.id, None, afternoon()).unwrap_err();
        assert!(matches!(err, QuestError::UserNotFound(_)));
        assert!(err.to_string().contains(&orphan.id));

        let err = complete_task(&store, &orphan.id, Some("ghost"), afternoon()).unwrap_err();
        assert!(matches!(err, QuestError::UserNotFound(_)));
        assert_eq!(get_task(&store, &orphan.id).unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn completion_levels_up_and_awards_badges() {
        let (_dir, store) = open_tmp();
        let user = register_user(&store, "Ada", "ada@example.com").unwrap();
        let mut last = None;
        for _ in 0..5 {
            let t = task_for(&store, &user, Priority::High);
            last = Some(complete_task(&store, &t.id, None, afternoon()).unwrap());
        }
        let last = last.unwrap();
        assert!(last.level_up);
        assert_eq!(last.previous_level, 1);
        assert_eq!(last.level, 2);

        let user = get_user(&store, &user.id).unwrap();
        assert_eq!(user.earned_xp, 50);
        assert_eq!(user.badges, vec!["Task Beginner".to_string()]);
        assert!(user.level_is_consistent());
    }

    #[test]
    fn open_statuses_can_be_set_freely() {
        let (_dir, store) = open_tmp();
        let user = register_user(&store, "Ada", "ada@example.com").unwrap();
        let task = task_for(&store, &user, Priority::Medium);

        for status in [TaskStatus::Testing, TaskStatus::InProgress, TaskStatus::Pending] {
            let update = set_task_status(&store, &task.id, status, None, afternoon()).unwrap();
            match update {
                StatusUpdate::Updated { task } => assert_eq!(task.status, status),
                other => panic!("expected Updated, got {other:?}"),
            }
        }
        assert!(get_task(&store, &task.id).unwrap().started_at.is_some());
        assert_eq!(get_user(&store, &user.id).unwrap().earned_xp, 0);

        let update =
            set_task_status(&store, &task.id, TaskStatus::Completed, None, afternoon()).unwrap();
        assert!(matches!(update, StatusUpdate::Completed { .. }));
        let err = set_task_status(&store, &task.id, TaskStatus::Pending, None, afternoon())
            .unwrap_err();
        assert!(matches!(err, QuestError::AlreadyCompleted(_)));
    }

    #[test]
    fn concurrent_completions_for_one_user_all_land() {
        let (_dir, store) = open_tmp();
        let store = Arc::new(store);
        let user = register_user(&store, "Ada", "ada@example.com").unwrap();
        let tasks: Vec<Task> = (0..8)
            .map(|_| task_for(&store, &user, Priority::Medium))
            .collect();

        let handles: Vec<_> = tasks
            .into_iter()
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || complete_task(&store, &t.id, None, afternoon()))
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }

        let user = get_user(&store, &user.id).unwrap();
        assert_eq!(user.completed_tasks, 8);
        assert_eq!(user.earned_xp, 40);
        assert_eq!(user.points, 40);
    }

    #[test]
    fn racing_completions_of_same_task_credit_once() {
        let (_dir, store) = open_tmp();
        let store = Arc::new(store);
        let user = register_user(&store, "Ada", "ada@example.com").unwrap();
        let task = task_for(&store, &user, Priority::High);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = task.id.clone();
                std::thread::spawn(move || complete_task(&store, &id, None, afternoon()))
            })
            .collect();
        let ok = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(ok, 1);
        assert_eq!(get_user(&store, &user.id).unwrap().earned_xp, 10);
    }
}
