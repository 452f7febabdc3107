use crate::cmd::open_workspace;
use crate::output::{print_json, print_table};
use clap::Subcommand;
use questboard_core::skill::{self, NewSkill, Perk};
use questboard_core::types::SkillBranch;
use questboard_core::unlock;
use std::path::Path;

#[derive(Subcommand)]
pub enum SkillSubcommand {
    /// Add a skill to the tree
    Add {
        #[arg(required = true)]
        name: Vec<String>,
        /// task_management, collaboration, productivity or analytics
        #[arg(long)]
        branch: SkillBranch,
        /// Tier 1-4
        #[arg(long, default_value_t = 1)]
        tier: u8,
        /// Points needed to unlock
        #[arg(long, default_value_t = 0)]
        cost: u64,
        /// Skill ids that must be unlocked first (comma-separated)
        #[arg(long, value_delimiter = ',')]
        requires: Vec<String>,
        /// Perk granted (defaults to the one matching the name, if any)
        #[arg(long)]
        perk: Option<Perk>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List the skill tree
    List,
    /// Install the built-in perk skills
    Seed,
    /// Unlock a skill for a user, spending points
    Unlock { user_id: String, skill_id: String },
}

pub fn run(root: &Path, subcmd: SkillSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SkillSubcommand::Add {
            name,
            branch,
            tier,
            cost,
            requires,
            perk,
            description,
        } => {
            let new = NewSkill {
                name: name.join(" "),
                description,
                branch,
                tier,
                points_required: cost,
                dependencies: requires,
                perk,
            };
            add(root, new, json)
        }
        SkillSubcommand::List => list(root, json),
        SkillSubcommand::Seed => seed(root, json),
        SkillSubcommand::Unlock { user_id, skill_id } => unlock(root, &user_id, &skill_id, json),
    }
}

fn add(root: &Path, new: NewSkill, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let created = skill::create_skill(&store, new)?;

    if json {
        print_json(&created)?;
    } else {
        println!("Added skill [{}]: {}", created.id, created.name);
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let skills = skill::list_skills(&store)?;

    if json {
        return print_json(&skills);
    }
    if skills.is_empty() {
        println!("No skills. Run `questboard skill seed` to install the defaults.");
        return Ok(());
    }
    let rows = skills
        .iter()
        .map(|s| {
            let requires: Vec<String> = s
                .dependencies
                .iter()
                .map(|d| {
                    skills
                        .iter()
                        .find(|o| &o.id == d)
                        .map(|o| o.name.clone())
                        .unwrap_or_else(|| d.clone())
                })
                .collect();
            vec![
                s.id.clone(),
                s.name.clone(),
                s.branch.to_string(),
                s.tier.to_string(),
                s.points_required.to_string(),
                crate::output::join_or_dash(&requires),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "BRANCH", "TIER", "COST", "REQUIRES"], rows);
    Ok(())
}

fn seed(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let created = skill::seed_default_skills(&store)?;

    if json {
        print_json(&serde_json::json!({ "created": created.len(), "skills": created }))?;
    } else if created.is_empty() {
        println!("Default skills already installed.");
    } else {
        for s in &created {
            println!("Added skill [{}]: {}", s.id, s.name);
        }
    }
    Ok(())
}

fn unlock(root: &Path, user_id: &str, skill_id: &str, json: bool) -> anyhow::Result<()> {
    let (config, store) = open_workspace(root)?;
    let outcome = unlock::unlock_skill(
        &store,
        user_id,
        skill_id,
        config.gamification.unlock_policy(),
    )?;

    if json {
        print_json(&outcome)?;
    } else {
        println!(
            "Unlocked '{}' ({} points remaining)",
            outcome.skill.name, outcome.points_remaining
        );
    }
    Ok(())
}
