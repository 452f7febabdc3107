use questboard_core::config::Config;
use questboard_core::{paths, Store};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

/// What a mutating request touched. Sent to `/api/events` subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    User,
    Skill,
    Project,
    Task,
    Leaderboard,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::User => "user",
            ChangeKind::Skill => "skill",
            ChangeKind::Project => "project",
            ChangeKind::Task => "task",
            ChangeKind::Leaderboard => "leaderboard",
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub store: Arc<Store>,
    pub event_tx: broadcast::Sender<ChangeKind>,
}

impl AppState {
    /// Load `.questboard/config.yaml` and open the database under `root`.
    pub fn new(root: PathBuf) -> questboard_core::Result<Self> {
        let config = Config::load(&root)?;
        let store = Store::open(&paths::db_path(&root))?;
        let (tx, _) = broadcast::channel(64);
        Ok(Self {
            root,
            config: Arc::new(config),
            store: Arc::new(store),
            event_tx: tx,
        })
    }

    /// Broadcast a change. No subscribers is not an error.
    pub fn notify(&self, kind: ChangeKind) {
        let _ = self.event_tx.send(kind);
    }
}
