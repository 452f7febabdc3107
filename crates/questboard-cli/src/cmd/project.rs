use crate::cmd::open_workspace;
use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::Subcommand;
use questboard_core::project::{self, NewProject, ProjectPatch};
use std::path::Path;

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Create a project
    Add {
        #[arg(required = true)]
        name: Vec<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Rename a project or change its description or start date
    Edit {
        project_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Start date: YYYY-MM-DD (start of that day) or RFC 3339
        #[arg(long)]
        start: Option<String>,
    },
    /// List projects, newest first
    List,
    /// Add a user to a project's member list
    Member { project_id: String, user_id: String },
}

pub fn run(root: &Path, subcmd: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProjectSubcommand::Add { name, description } => add(root, &name.join(" "), description, json),
        ProjectSubcommand::Edit {
            project_id,
            name,
            description,
            start,
        } => {
            let patch = ProjectPatch {
                name,
                description,
                start_date: None,
            };
            edit(root, &project_id, patch, start.as_deref(), json)
        }
        ProjectSubcommand::List => list(root, json),
        ProjectSubcommand::Member {
            project_id,
            user_id,
        } => member(root, &project_id, &user_id, json),
    }
}

fn add(root: &Path, name: &str, description: String, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let created = project::create_project(
        &store,
        NewProject {
            name: name.to_string(),
            description,
            start_date: None,
        },
    )?;

    if json {
        print_json(&created)?;
    } else {
        println!("Added project [{}]: {}", created.id, created.name);
    }
    Ok(())
}

/// A bare date means midnight at the start of that day in `offset`.
fn parse_start(raw: &str, offset: FixedOffset) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid start date '{raw}': expected YYYY-MM-DD or RFC 3339"))?;
    let local = date
        .and_hms_opt(0, 0, 0)
        .context("invalid start-of-day time")?
        .and_local_timezone(offset)
        .single()
        .with_context(|| format!("ambiguous start date '{raw}'"))?;
    Ok(local.with_timezone(&Utc))
}

fn edit(
    root: &Path,
    project_id: &str,
    mut patch: ProjectPatch,
    start: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let (config, store) = open_workspace(root)?;
    if let Some(raw) = start {
        patch.start_date = Some(parse_start(raw, config.gamification.offset())?);
    }
    if patch.is_empty() {
        anyhow::bail!("nothing to change: pass --name, --description or --start");
    }
    let updated = project::update_project(&store, project_id, patch)?;

    if json {
        print_json(&updated)?;
    } else {
        println!("Updated project [{}]: {}", updated.id, updated.name);
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let projects = project::list_projects(&store)?;

    if json {
        return print_json(&projects);
    }
    if projects.is_empty() {
        println!("No projects.");
        return Ok(());
    }
    let rows = projects
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                p.start_date.format("%Y-%m-%d").to_string(),
                p.members.len().to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "STARTED", "MEMBERS"], rows);
    Ok(())
}

fn member(root: &Path, project_id: &str, user_id: &str, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let updated = project::add_member(&store, project_id, user_id)?;

    if json {
        print_json(&updated)?;
    } else {
        println!(
            "Project '{}' now has {} member(s)",
            updated.name,
            updated.members.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_start_is_local_midnight() {
        let offset = FixedOffset::east_opt(-5 * 3600).unwrap();
        let start = parse_start("2026-02-01", offset).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-02-01T05:00:00+00:00");
    }

    #[test]
    fn bad_start_is_rejected() {
        let offset = FixedOffset::east_opt(0).unwrap();
        assert!(parse_start("soon", offset).is_err());
    }
}
