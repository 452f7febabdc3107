use crate::cmd::open_workspace;
use crate::output::{join_or_dash, print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use clap::Subcommand;
use questboard_core::completion::{self, CompletionOutcome, StatusUpdate};
use questboard_core::task::{self, NewTask, TaskFilter, TaskPatch};
use questboard_core::types::{Priority, TaskStatus};
use std::path::Path;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Create a task
    Add {
        #[arg(required = true)]
        title: Vec<String>,
        /// high, medium or low; anything else counts as medium
        #[arg(long, default_value = "medium", value_parser = parse_priority)]
        priority: Priority,
        #[arg(long)]
        project: Option<String>,
        /// User id to assign
        #[arg(long)]
        assign: Option<String>,
        /// Due date: YYYY-MM-DD (end of that day) or RFC 3339
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Edit an open task
    Edit {
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
        /// Due date: YYYY-MM-DD (end of that day) or RFC 3339
        #[arg(long)]
        due: Option<String>,
    },
    /// List tasks
    List {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Set a task's status; `completed` pays out XP
    Status {
        task_id: String,
        status: TaskStatus,
        /// Member credited on completion (defaults to the assignee)
        #[arg(long)]
        member: Option<String>,
    },
    /// Complete a task and credit XP
    Complete {
        task_id: String,
        /// Member credited (defaults to the assignee)
        #[arg(long)]
        member: Option<String>,
    },
    /// Assign a task to a user
    Assign { task_id: String, user_id: String },
}

pub fn run(root: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::Add {
            title,
            priority,
            project,
            assign,
            due,
            description,
        } => {
            let new = NewTask {
                title: title.join(" "),
                description,
                project,
                assigned_to: assign,
                priority,
                due_date: None,
            };
            add(root, new, due.as_deref(), json)
        }
        TaskSubcommand::Edit {
            task_id,
            title,
            description,
            project,
            priority,
            due,
        } => {
            let patch = TaskPatch {
                title,
                description,
                project,
                priority,
                due_date: None,
            };
            edit(root, &task_id, patch, due.as_deref(), json)
        }
        TaskSubcommand::List { project, assignee } => {
            list(root, &TaskFilter { project, assignee }, json)
        }
        TaskSubcommand::Status {
            task_id,
            status,
            member,
        } => set_status(root, &task_id, status, member.as_deref(), json),
        TaskSubcommand::Complete { task_id, member } => {
            complete(root, &task_id, member.as_deref(), json)
        }
        TaskSubcommand::Assign { task_id, user_id } => assign(root, &task_id, &user_id, json),
    }
}

fn parse_priority(raw: &str) -> Result<Priority, std::convert::Infallible> {
    Ok(Priority::from_label_or_default(raw))
}

/// Parse a due date. A bare date means the last second of that day in `offset`.
fn parse_due(raw: &str, offset: FixedOffset) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid due date '{raw}': expected YYYY-MM-DD or RFC 3339"))?;
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).context("invalid end-of-day time")?;
    let local = date
        .and_time(end_of_day)
        .and_local_timezone(offset)
        .single()
        .with_context(|| format!("ambiguous due date '{raw}'"))?;
    Ok(local.with_timezone(&Utc))
}

fn add(root: &Path, mut new: NewTask, due: Option<&str>, json: bool) -> anyhow::Result<()> {
    let (config, store) = open_workspace(root)?;
    if let Some(raw) = due {
        new.due_date = Some(parse_due(raw, config.gamification.offset())?);
    }
    let created = task::create_task(&store, new)?;

    if json {
        print_json(&created)?;
    } else {
        println!("Added task [{}]: {}", created.id, created.title);
    }
    Ok(())
}

fn edit(
    root: &Path,
    task_id: &str,
    mut patch: TaskPatch,
    due: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let (config, store) = open_workspace(root)?;
    if let Some(raw) = due {
        patch.due_date = Some(parse_due(raw, config.gamification.offset())?);
    }
    if patch.is_empty() {
        anyhow::bail!("nothing to change: pass --title, --description, --project, --priority or --due");
    }
    let updated = task::update_task(&store, task_id, patch)?;

    if json {
        print_json(&updated)?;
    } else {
        println!("Updated task [{}]: {}", updated.id, updated.title);
    }
    Ok(())
}

fn list(root: &Path, filter: &TaskFilter, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let tasks = task::list_tasks(&store, filter)?;

    if json {
        return print_json(&tasks);
    }
    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    let rows = tasks
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.title.clone(),
                t.priority.to_string(),
                t.status.to_string(),
                t.assigned_to.clone().unwrap_or_else(|| "-".to_string()),
                t.due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "PRIORITY", "STATUS", "ASSIGNEE", "DUE"], rows);
    println!("\n{}", task::summarize(&tasks));
    Ok(())
}

fn set_status(
    root: &Path,
    task_id: &str,
    status: TaskStatus,
    member: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let (config, store) = open_workspace(root)?;
    let update = completion::set_task_status(
        &store,
        task_id,
        status,
        member,
        config.gamification.now(),
    )?;

    if json {
        return print_json(&update);
    }
    match update {
        StatusUpdate::Updated { task } => println!("Task [{}] is now {}", task.id, task.status),
        StatusUpdate::Completed { outcome } => print_outcome(&outcome),
    }
    Ok(())
}

fn complete(root: &Path, task_id: &str, member: Option<&str>, json: bool) -> anyhow::Result<()> {
    let (config, store) = open_workspace(root)?;
    let outcome =
        completion::complete_task(&store, task_id, member, config.gamification.now())?;

    if json {
        print_json(&outcome)?;
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &CompletionOutcome) {
    println!(
        "Completed task [{}]: +{} XP ({} base, {} bonus)",
        outcome.task_id, outcome.total_xp, outcome.base_xp, outcome.bonus_xp
    );
    if !outcome.activated_skills.is_empty() {
        println!("  skills:  {}", join_or_dash(&outcome.activated_skills));
    }
    if outcome.level_up {
        println!(
            "  level up: {} → {}",
            outcome.previous_level, outcome.level
        );
    }
    if !outcome.new_badges.is_empty() {
        println!("  badges:  {}", join_or_dash(&outcome.new_badges));
    }
}

fn assign(root: &Path, task_id: &str, user_id: &str, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let updated = task::assign_task(&store, task_id, user_id)?;

    if json {
        print_json(&updated)?;
    } else {
        println!("Assigned task [{}] to {}", updated.id, user_id);
    }
    Ok(())
}
