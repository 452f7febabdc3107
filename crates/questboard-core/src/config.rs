use crate::error::{QuestError, Result};
use crate::paths;
use crate::unlock::UnlockPolicy;
use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest real-world UTC offset, in minutes.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// GamificationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamificationConfig {
    /// Offset used for time-of-day perks and same-day streaks.
    /// The host's local offset when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
    #[serde(default = "default_enforce_dependencies")]
    pub enforce_skill_dependencies: bool,
}

fn default_enforce_dependencies() -> bool {
    true
}

impl Default for GamificationConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: None,
            enforce_skill_dependencies: default_enforce_dependencies(),
        }
    }
}

impl GamificationConfig {
    pub fn offset(&self) -> FixedOffset {
        match self.utc_offset_minutes {
            Some(minutes) if minutes.abs() <= MAX_OFFSET_MINUTES => {
                FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
            }
            Some(_) => Utc.fix(),
            None => *Local::now().offset(),
        }
    }

    /// Current instant in the configured offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset())
    }

    pub fn unlock_policy(&self) -> UnlockPolicy {
        UnlockPolicy {
            enforce_dependencies: self.enforce_skill_dependencies,
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gamification: GamificationConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            server: ServerConfig::default(),
            gamification: GamificationConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(QuestError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::replace_file(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.project.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "project.name is empty".to_string(),
            });
        }

        if let Some(minutes) = self.gamification.utc_offset_minutes {
            if minutes.abs() > MAX_OFFSET_MINUTES {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!(
                        "gamification.utc_offset_minutes {minutes} is outside ±{MAX_OFFSET_MINUTES}; UTC will be used"
                    ),
                });
            }
        }

        if self.server.port == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "server.port is 0; an ephemeral port will be chosen".to_string(),
            });
        }

        if !self.gamification.enforce_skill_dependencies {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "skill dependencies are not enforced on unlock".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("apollo");
        cfg.gamification.utc_offset_minutes = Some(120);
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.project.name, "apollo");
        assert_eq!(loaded.server.port, 4000);
        assert_eq!(loaded.gamification.utc_offset_minutes, Some(120));
        assert!(loaded.gamification.enforce_skill_dependencies);
    }

    #[test]
    fn load_without_config_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(QuestError::NotInitialized)
        ));
    }

    #[test]
    fn minimal_yaml_gets_defaults() {
        let cfg: Config = serde_yaml::from_str("project:\n  name: tiny\n").unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(cfg.gamification.utc_offset_minutes.is_none());
        assert!(cfg.gamification.unlock_policy().enforce_dependencies);
    }

    #[test]
    fn configured_offset_is_used() {
        let g = GamificationConfig {
            utc_offset_minutes: Some(-300),
            enforce_skill_dependencies: true,
        };
        assert_eq!(g.offset().local_minus_utc(), -300 * 60);
        assert_eq!(g.now().offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn validate_flags_bad_offset() {
        let mut cfg = Config::new("apollo");
        assert!(cfg.validate().is_empty());
        cfg.gamification.utc_offset_minutes = Some(20 * 60);
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Error);
        assert_eq!(cfg.gamification.offset().local_minus_utc(), 0);
    }
}
