pub mod config;
pub mod init;
pub mod leaderboard;
pub mod points;
pub mod project;
pub mod serve;
pub mod skill;
pub mod task;
pub mod user;

use anyhow::Context;
use questboard_core::config::Config;
use questboard_core::{paths, QuestError, Store};
use std::path::Path;

/// Load the workspace config and open its database.
///
/// The database is exclusively locked by whichever process has it open, so a
/// running `questboard serve` gets its own message instead of a raw store error.
pub fn open_workspace(root: &Path) -> anyhow::Result<(Config, Store)> {
    let config = Config::load(root).context("failed to load config")?;
    let store = match Store::open(&paths::db_path(root)) {
        Ok(store) => store,
        Err(QuestError::WorkspaceBusy(_)) => anyhow::bail!(
            "workspace {} is in use by a running server; stop `questboard serve` or use its HTTP API",
            root.display()
        ),
        Err(e) => return Err(anyhow::Error::new(e).context("failed to open database")),
    };
    Ok((config, store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn held_database_reports_running_server() {
        let dir = TempDir::new().unwrap();
        Config::new("busy").save(dir.path()).unwrap();
        let _server = Store::open(&paths::db_path(dir.path())).unwrap();

        let err = open_workspace(dir.path()).err().unwrap();
        assert!(err.to_string().contains("in use by a running server"), "{err:#}");
    }
}
