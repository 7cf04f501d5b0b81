use serde::{Deserialize, Serialize};

/// Main configuration structure for procopts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Search engine process configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Search engine process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchConfig {
    /// Main JVM options, whitespace separated
    #[serde(default = "default_java_opts")]
    pub java_opts: String,

    /// Extra JVM options appended after `java_opts`, whitespace separated
    #[serde(default)]
    pub java_additional_opts: String,

    /// Where the generated `jvm.options` file is written
    #[serde(default = "default_jvm_options_path")]
    pub jvm_options_path: String,
}

fn default_java_opts() -> String {
    "-Xms512m -Xmx512m -XX:+HeapDumpOnOutOfMemoryError".to_string()
}

fn default_jvm_options_path() -> String {
    ".procopts/es/jvm.options".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            java_opts: default_java_opts(),
            java_additional_opts: String::new(),
            jvm_options_path: default_jvm_options_path(),
        }
    }
}

impl SearchConfig {
    /// User-configured options in the order they should be merged.
    pub fn user_options(&self) -> impl Iterator<Item = &str> + '_ {
        self.java_opts
            .split_whitespace()
            .chain(self.java_additional_opts.split_whitespace())
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".procopts/procopts.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for log files (if unset, logs only go to stderr)
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
