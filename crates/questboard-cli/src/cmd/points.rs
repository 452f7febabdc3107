use crate::cmd::open_workspace;
use crate::output::print_json;
use clap::Subcommand;
use questboard_core::leaderboard;
use std::path::Path;

#[derive(Subcommand)]
pub enum PointsSubcommand {
    /// Grant spendable points to a user (XP is unaffected)
    Add { user_id: String, points: u64 },
}

pub fn run(root: &Path, subcmd: PointsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PointsSubcommand::Add { user_id, points } => add(root, &user_id, points, json),
    }
}

fn add(root: &Path, user_id: &str, points: u64, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let user = leaderboard::add_points(&store, user_id, points)?;

    if json {
        print_json(&serde_json::json!({ "user_id": user.id, "points": user.points }))?;
    } else {
        println!("{} now has {} points", user.name, user.points);
    }
    Ok(())
}
