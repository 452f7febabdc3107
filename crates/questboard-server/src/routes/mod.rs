pub mod events;
pub mod health;
pub mod leaderboard;
pub mod projects;
pub mod skills;
pub mod tasks;
pub mod users;
