use serde::Deserialize;
use std::path::Path;

use crate::panel::{PanelTree, SplitDirection, DEFAULT_SIZE_TOLERANCE};
use crate::template::{self, PanelTemplate, TemplateError};

const VALID_DIRECTIONS: &[&str] = &["horizontal", "vertical"];

const DEFAULT_CONFIG: &str = r#"# dockspace configuration

[workspace]
# Axis of the root split: "horizontal" or "vertical".
root_direction = "horizontal"
# Allowed drift when checking that children's shares sum to one.
size_tolerance = 1e-9

# Initial panels, attached to the root in order. Each entry is a
# "leaf", "split" or "tabs"; "percent" pins a share of the parent.
#
# [[layout.children]]
# type = "leaf"
# title = "Files"
# percent = 0.2
#
# [[layout.children]]
# type = "tabs"
# children = [
#     { type = "leaf", title = "main.rs" },
#     { type = "leaf", title = "Terminal", content = "shell" },
# ]
"#;

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub layout: LayoutConfig,
}

/// Workspace root settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceConfig {
    pub root_direction: SplitDirection,
    pub size_tolerance: f64,
}

/// Initial layout under the root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutConfig {
    pub children: Vec<PanelTemplate>,
}

/// Errors that can occur during config loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("validation error: {0}")]
    Validation(String),
}

// ── Serde intermediate structs (unknown keys are ignored) ───────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    workspace: RawWorkspaceConfig,
    layout: RawLayoutConfig,
}

#[derive(Deserialize)]
#[serde(default)]
struct RawWorkspaceConfig {
    root_direction: String,
    size_tolerance: f64,
}

impl Default for RawWorkspaceConfig {
    fn default() -> Self {
        Self {
            root_direction: "horizontal".to_string(),
            size_tolerance: DEFAULT_SIZE_TOLERANCE,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawLayoutConfig {
    children: Vec<PanelTemplate>,
}

// ── Default impls ───────────────────────────────────────────────────────

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root_direction: SplitDirection::Horizontal,
            size_tolerance: DEFAULT_SIZE_TOLERANCE,
        }
    }
}

// ── Config implementation ───────────────────────────────────────────────

impl Config {
    /// Load config from a TOML file path. Returns defaults if file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Parse a TOML string into a Config.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let root_direction = match raw.workspace.root_direction.as_str() {
            "horizontal" => SplitDirection::Horizontal,
            "vertical" => SplitDirection::Vertical,
            other => {
                return Err(ConfigError::Validation(format!(
                    "unknown root direction '{other}', valid directions: {}",
                    VALID_DIRECTIONS.join(", ")
                )))
            }
        };

        let config = Self {
            workspace: WorkspaceConfig {
                root_direction,
                size_tolerance: raw.workspace.size_tolerance,
            },
            layout: LayoutConfig {
                children: raw.layout.children,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the config, returning an error if any values are out of range
    /// or the layout cannot be built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.workspace.size_tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 || tolerance >= 1.0 {
            return Err(ConfigError::Validation(format!(
                "size_tolerance must be in (0, 1), got {tolerance}"
            )));
        }

        self.build_tree()
            .map_err(|e| ConfigError::Validation(format!("layout: {e}")))?;
        Ok(())
    }

    /// Build the initial workspace tree described by this config.
    pub fn build_tree(&self) -> Result<PanelTree, TemplateError> {
        template::build_tree(
            self.workspace.root_direction,
            &self.layout.children,
            self.workspace.size_tolerance,
        )
    }

    /// The commented default configuration file.
    pub fn print_default() -> &'static str {
        DEFAULT_CONFIG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // ── Default tests ───────────────────────────────────────────────

    #[test]
    fn default_root_direction() {
        let config = Config::default();
        assert_eq!(config.workspace.root_direction, SplitDirection::Horizontal);
    }

    #[test]
    fn default_size_tolerance() {
        let config = Config::default();
        assert_eq!(config.workspace.size_tolerance, 1e-9);
    }

    #[test]
    fn default_layout_empty() {
        let config = Config::default();
        assert!(config.layout.children.is_empty());
    }

    #[test]
    fn print_default_parses_to_defaults() {
        let config = Config::from_toml(Config::print_default()).unwrap();
        assert_eq!(config, Config::default());
    }

    // ── TOML parsing tests ──────────────────────────────────────────

    #[test]
    fn parse_complete_toml() {
        let toml = r#"
[workspace]
root_direction = "vertical"
size_tolerance = 0.001

[[layout.children]]
type = "leaf"
title = "Files"
content = "explorer"
percent = 0.25

[[layout.children]]
type = "tabs"
active = 1
children = [
    { type = "leaf", title = "main.rs" },
    { type = "leaf", title = "lib.rs" },
]
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.workspace.root_direction, SplitDirection::Vertical);
        assert_eq!(config.workspace.size_tolerance, 0.001);
        assert_eq!(config.layout.children.len(), 2);
        assert_eq!(
            config.layout.children[0],
            PanelTemplate::Leaf {
                title: "Files".to_string(),
                content: Some("explorer".to_string()),
                percent: Some(0.25),
            }
        );
        assert!(matches!(
            &config.layout.children[1],
            PanelTemplate::Tabs { active: Some(1), children, .. } if children.len() == 2
        ));
    }

    #[test]
    fn parse_nested_split() {
        let toml = r#"
[[layout.children]]
type = "split"
direction = "vertical"
children = [
    { type = "leaf", title = "top" },
    { type = "leaf", title = "bottom", percent = 0.4 },
]
"#;
        let config = Config::from_toml(toml).unwrap();
        let tree = config.build_tree().unwrap();
        assert_eq!(tree.len(), 4);
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn parse_empty_toml_uses_all_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parse_unknown_keys_ignored() {
        let toml = r#"
[workspace]
root_direction = "horizontal"
unknown_key = "value"

[unknown_section]
foo = "bar"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.workspace.root_direction, SplitDirection::Horizontal);
    }

    #[test]
    fn parse_malformed_toml() {
        let result = Config::from_toml("[workspace\nroot_direction = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    // ── Validation tests ────────────────────────────────────────────

    #[test]
    fn invalid_root_direction() {
        let toml = r#"
[workspace]
root_direction = "diagonal"
"#;
        let result = Config::from_toml(toml);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn invalid_zero_tolerance() {
        let toml = r#"
[workspace]
size_tolerance = 0.0
"#;
        let result = Config::from_toml(toml);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_large_tolerance() {
        let toml = r#"
[workspace]
size_tolerance = 1.5
"#;
        let result = Config::from_toml(toml);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_layout_is_rejected() {
        let toml = r#"
[[layout.children]]
type = "tabs"
children = [{ type = "split" }]
"#;
        let err = Config::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("tabs layout"));
    }

    #[test]
    fn invalid_layout_type() {
        let toml = r#"
[[layout.children]]
type = "grid"
"#;
        let result = Config::from_toml(toml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    // ── File loading tests ──────────────────────────────────────────

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dockspace.toml");
        {
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(b"[workspace]\nroot_direction = \"vertical\"\n")
                .unwrap();
        }
        let config = Config::load(&path).unwrap();
        assert_eq!(config.workspace.root_direction, SplitDirection::Vertical);
        assert_eq!(config.workspace.size_tolerance, DEFAULT_SIZE_TOLERANCE);
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path());
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    // ── ConfigError display test ────────────────────────────────────

    #[test]
    fn config_error_display() {
        let err = ConfigError::Validation("size_tolerance must be in (0, 1)".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("size_tolerance must be in (0, 1)"));
    }
}
