use crate::cmd::open_workspace;
use crate::output::{join_or_dash, print_json, print_table};
use clap::Subcommand;
use questboard_core::user;
use std::path::Path;

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Register a user
    Add {
        #[arg(required = true)]
        name: Vec<String>,
        #[arg(long)]
        email: String,
    },
    /// List users
    List,
    /// Show a user record
    Show { id: String },
    /// Show XP, level progress, badges and unlocked skills
    Summary { id: String },
}

pub fn run(root: &Path, subcmd: UserSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        UserSubcommand::Add { name, email } => add(root, &name.join(" "), &email, json),
        UserSubcommand::List => list(root, json),
        UserSubcommand::Show { id } => show(root, &id, json),
        UserSubcommand::Summary { id } => summary(root, &id, json),
    }
}

fn add(root: &Path, name: &str, email: &str, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let created = user::register_user(&store, name, email)?;

    if json {
        print_json(&created)?;
    } else {
        println!("Added user [{}]: {} <{}>", created.id, created.name, created.email);
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let users = user::list_users(&store)?;

    if json {
        return print_json(&users);
    }
    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }
    let rows = users
        .iter()
        .map(|u| {
            vec![
                u.id.clone(),
                u.name.clone(),
                u.email.clone(),
                u.level.to_string(),
                u.earned_xp.to_string(),
                u.points.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "EMAIL", "LEVEL", "XP", "POINTS"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let u = user::get_user(&store, id)?;

    if json {
        return print_json(&u);
    }
    println!("{} <{}>", u.name, u.email);
    println!("  id:         {}", u.id);
    println!("  level:      {} ({})", u.level, u.experience_level);
    println!("  xp:         {}", u.earned_xp);
    println!("  points:     {}", u.points);
    println!("  completed:  {}", u.completed_tasks);
    println!("  badges:     {}", join_or_dash(&u.badges));
    println!("  skills:     {}", join_or_dash(&u.unlocked_skills));
    Ok(())
}

fn summary(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let s = user::get_user_xp_summary(&store, id)?;

    if json {
        return print_json(&s);
    }
    let skills: Vec<String> = s.unlocked_skills.iter().map(|r| r.name.clone()).collect();
    println!("Level {} ({})", s.level, s.experience_level);
    println!(
        "  xp:        {} / {} ({}% to next level)",
        s.earned_xp, s.next_level_xp, s.progress_percent
    );
    println!("  points:    {}", s.points);
    println!("  completed: {}", s.completed_tasks);
    println!("  badges:    {}", join_or_dash(&s.badges));
    if let Some(next) = &s.next_badge {
        println!("  next:      {} at {} XP", next.name, next.threshold);
    }
    println!("  skills:    {}", join_or_dash(&skills));
    Ok(())
}
