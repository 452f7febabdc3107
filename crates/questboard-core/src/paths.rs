use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const QUESTBOARD_DIR: &str = ".questboard";
pub const CONFIG_FILE: &str = ".questboard/config.yaml";
pub const DB_FILE: &str = ".questboard/questboard.db";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn questboard_dir(root: &Path) -> PathBuf {
    root.join(QUESTBOARD_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn db_path(root: &Path) -> PathBuf {
    root.join(DB_FILE)
}

pub fn is_initialized(root: &Path) -> bool {
    config_path(root).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/srv/team");
        assert_eq!(config_path(root), PathBuf::from("/srv/team/.questboard/config.yaml"));
        assert_eq!(db_path(root), PathBuf::from("/srv/team/.questboard/questboard.db"));
        assert_eq!(questboard_dir(root), PathBuf::from("/srv/team/.questboard"));
    }
}
