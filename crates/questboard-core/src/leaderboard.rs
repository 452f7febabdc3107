use crate::error::{QuestError, Result};
use crate::store::{DocumentReader, Store};
use crate::user::User;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub name: String,
    pub points: u64,
    pub earned_xp: u64,
    pub level: u32,
    pub badges: usize,
}

/// Top `limit` users by points, then XP, then name.
pub fn leaderboard(store: &Store, limit: usize) -> Result<Vec<LeaderboardEntry>> {
    let mut users: Vec<User> = store.read(|tx| tx.list())?;
    users.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.earned_xp.cmp(&a.earned_xp))
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(users
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, u)| LeaderboardEntry {
            rank: i + 1,
            user_id: u.id,
            name: u.name,
            points: u.points,
            earned_xp: u.earned_xp,
            level: u.level,
            badges: u.badges.len(),
        })
        .collect())
}

/// Atomically add spendable points to a user. XP is unaffected.
pub fn add_points(store: &Store, user_id: &str, points: u64) -> Result<User> {
    if points == 0 {
        return Err(QuestError::Validation("points must be positive".into()));
    }
    store.write(|tx| {
        let mut user: User = tx.load(user_id)?;
        user.credit_points(points);
        tx.put(&user)?;
        tracing::info!(user = %user_id, points, "added points");
        Ok(user)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::register_user;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn ranks_by_points_and_limits() {
        let (_dir, store) = open_tmp();
        let a = register_user(&store, "Ada", "ada@example.com").unwrap();
        let b = register_user(&store, "Bob", "bob@example.com").unwrap();
        let c = register_user(&store, "Cy", "cy@example.com").unwrap();
        add_points(&store, &b.id, 30).unwrap();
        add_points(&store, &c.id, 10).unwrap();
        add_points(&store, &a.id, 10).unwrap();

        let board = leaderboard(&store, 2).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, b.id);
        assert_eq!(board[0].rank, 1);
        // Tie on points and XP falls back to name.
        assert_eq!(board[1].name, "Ada");
    }

    #[test]
    fn add_points_leaves_xp_alone() {
        let (_dir, store) = open_tmp();
        let a = register_user(&store, "Ada", "ada@example.com").unwrap();
        let a = add_points(&store, &a.id, 25).unwrap();
        assert_eq!(a.points, 25);
        assert_eq!(a.earned_xp, 0);
        assert_eq!(a.level, 1);
    }

    #[test]
    fn add_points_validation() {
        let (_dir, store) = open_tmp();
        let a = register_user(&store, "Ada", "ada@example.com").unwrap();
        assert!(matches!(
            add_points(&store, &a.id, 0),
            Err(QuestError::Validation(_))
        ));
        assert!(matches!(
            add_points(&store, "ghost", 5),
            Err(QuestError::UserNotFound(_))
        ));
    }
}
