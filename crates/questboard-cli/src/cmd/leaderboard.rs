use crate::cmd::open_workspace;
use crate::output::{print_json, print_table};
use questboard_core::leaderboard;
use std::path::Path;

pub fn run(root: &Path, limit: usize, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_workspace(root)?;
    let entries = leaderboard::leaderboard(&store, limit)?;

    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No users yet.");
        return Ok(());
    }
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.rank.to_string(),
                e.name.clone(),
                e.points.to_string(),
                e.earned_xp.to_string(),
                e.level.to_string(),
                e.badges.to_string(),
            ]
        })
        .collect();
    print_table(&["#", "NAME", "POINTS", "XP", "LEVEL", "BADGES"], rows);
    Ok(())
}
