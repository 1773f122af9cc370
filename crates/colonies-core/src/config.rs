//! Configuration loading and typed config structures for a colony.
//!
//! The configuration lives in a YAML file (`colonies.yaml` by default).
//! Every field is optional; anything left out falls back to the defaults
//! below, so an empty file is a valid configuration.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level colony configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ColonyConfig {
    /// World generation and run length.
    #[serde(default)]
    pub world: WorldConfig,

    /// Lumberjack behaviour.
    #[serde(default)]
    pub lumberjack: LumberjackConfig,

    /// Pathfinding limits.
    #[serde(default)]
    pub pathing: PathingConfig,

    /// Inventory sizes.
    #[serde(default)]
    pub inventory: InventoryConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ColonyConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Colony name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed for demo world generation.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of ticks the engine runs.
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    /// Half-extent of the generated demo world, in blocks.
    #[serde(default = "default_world_size")]
    pub size: i32,

    /// Number of trees planted in the demo world.
    #[serde(default = "default_tree_count")]
    pub tree_count: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            ticks: default_ticks(),
            size: default_world_size(),
            tree_count: default_tree_count(),
        }
    }
}

/// Lumberjack configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LumberjackConfig {
    /// Horizontal search radius around the hut.
    #[serde(default = "default_search_radius")]
    pub search_radius: i32,

    /// Log limit for a single tree.
    #[serde(default = "default_max_logs")]
    pub max_logs: usize,

    /// Leaf limit for a single tree.
    #[serde(default = "default_max_leaves")]
    pub max_leaves: usize,

    /// Logs carried before walking back to the hut.
    #[serde(default = "default_deposit_threshold")]
    pub deposit_threshold: u32,

    /// Whether stumps are replanted with saplings.
    #[serde(default = "default_true")]
    pub replant: bool,
}

impl Default for LumberjackConfig {
    fn default() -> Self {
        Self {
            search_radius: default_search_radius(),
            max_logs: default_max_logs(),
            max_leaves: default_max_leaves(),
            deposit_threshold: default_deposit_threshold(),
            replant: true,
        }
    }
}

/// Pathfinding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathingConfig {
    /// Nodes expanded before a search is cancelled.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Highest single drop a citizen takes.
    #[serde(default = "default_max_drop_height")]
    pub max_drop_height: u32,
}

impl Default for PathingConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            max_drop_height: default_max_drop_height(),
        }
    }
}

/// Inventory configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InventoryConfig {
    /// Slots in a citizen's inventory.
    #[serde(default = "default_citizen_slots")]
    pub citizen_slots: usize,

    /// Slots in a hut's inventory.
    #[serde(default = "default_hut_slots")]
    pub hut_slots: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            citizen_slots: default_citizen_slots(),
            hut_slots: default_hut_slots(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter (trace, debug, info, warn, error) when `RUST_LOG` is
    /// unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "New Colony".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_ticks() -> u64 {
    600
}

const fn default_world_size() -> i32 {
    24
}

const fn default_tree_count() -> u32 {
    8
}

const fn default_search_radius() -> i32 {
    20
}

const fn default_max_logs() -> usize {
    128
}

const fn default_max_leaves() -> usize {
    512
}

const fn default_deposit_threshold() -> u32 {
    16
}

const fn default_max_nodes() -> usize {
    4096
}

const fn default_max_drop_height() -> u32 {
    3
}

const fn default_citizen_slots() -> usize {
    9
}

const fn default_hut_slots() -> usize {
    27
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ColonyConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.lumberjack.deposit_threshold, 16);
        assert!(config.lumberjack.replant);
        assert_eq!(config.pathing.max_nodes, 4096);
        assert_eq!(config.inventory.hut_slots, 27);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Pinewood"
  seed: 7
  ticks: 200
  size: 16
  tree_count: 3

lumberjack:
  search_radius: 12
  max_logs: 64
  max_leaves: 100
  deposit_threshold: 8
  replant: false

pathing:
  max_nodes: 1000
  max_drop_height: 2

inventory:
  citizen_slots: 4
  hut_slots: 9

logging:
  level: "debug"
"#;

        let config = ColonyConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.name, "Pinewood");
        assert_eq!(config.world.ticks, 200);
        assert_eq!(config.world.tree_count, 3);
        assert_eq!(config.lumberjack.search_radius, 12);
        assert!(!config.lumberjack.replant);
        assert_eq!(config.pathing.max_drop_height, 2);
        assert_eq!(config.inventory.citizen_slots, 4);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = ColonyConfig::parse("world:\n  seed: 9\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Seed is overridden
        assert_eq!(config.world.seed, 9);
        // Everything else uses defaults
        assert_eq!(config.world.ticks, 600);
        assert_eq!(config.lumberjack.max_logs, 128);
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(ColonyConfig::parse("").ok(), Some(ColonyConfig::default()));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            ColonyConfig::parse("world: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("does-not-exist.yaml");
        assert!(matches!(
            ColonyConfig::from_file(&path),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("colonies.yaml");
        if path.exists() {
            let config = ColonyConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
