//! procopts - managed process option resolution
//!
//! Assembles the command-line/JVM options of a managed subprocess from a
//! fixed set of mandatory options plus configured additions, and writes the
//! resolved list to the flag file the process reads at startup. Also hosts
//! the issue-change store used alongside it.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): option keys and merge rules, issue change models, ports
//! - **Service Layer** (`services`): option file rendering, process option profiles
//! - **Application Layer** (`application`): start-attempt preparation
//! - **Adapters** (`adapters`): SQLite issue-change repository
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```
//! use procopts::domain::models::OptionSet;
//!
//! let mut options = OptionSet::new(["-Xss1m", "-Dfile.encoding=UTF-8"]).unwrap();
//! options.add("-Dfile.encoding=ISO-8859-1").unwrap();
//! assert_eq!(options.get_all(), ["-Xss1m", "-Dfile.encoding=ISO-8859-1"]);
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{PreparedLaunch, SearchLaunchPreparer};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    AddOutcome, Config, FieldDiffs, IssueChange, IssueComment, MandatoryOption, OptionEntry,
    OptionKey, OptionSet, OverridePolicy,
};
pub use domain::ports::IssueChangeRepository;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{OptionsFileWriter, SearchJvmOptions};
