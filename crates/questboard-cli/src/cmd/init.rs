use anyhow::Context;
use questboard_core::{config::Config, io, paths, Store};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let project_name = match name {
        Some(n) => n.to_string(),
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "questboard".to_string()),
    };

    println!("Initializing questboard in: {}", root.display());

    let dir = paths::questboard_dir(root);
    io::ensure_directory(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    if paths::is_initialized(root) {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        Config::new(&project_name)
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    let db = paths::db_path(root);
    let existed = db.exists();
    Store::open(&db).context("failed to create database")?;
    if existed {
        println!("  exists:  {}", paths::DB_FILE);
    } else {
        println!("  created: {}", paths::DB_FILE);
    }

    println!("\nNext: `questboard skill seed` to install the default skill tree.");
    Ok(())
}
