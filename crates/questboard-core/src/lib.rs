pub mod badge;
pub mod bonus;
pub mod completion;
pub mod config;
pub mod error;
pub mod io;
pub mod leaderboard;
pub mod ledger;
pub mod level;
pub mod paths;
pub mod project;
pub mod skill;
pub mod store;
pub mod task;
pub mod types;
pub mod unlock;
pub mod user;

pub use error::{QuestError, Result};
pub use store::Store;
