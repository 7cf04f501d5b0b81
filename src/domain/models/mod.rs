pub mod config;
pub mod issue_change;
pub mod option_entry;
pub mod option_set;

pub use config::{Config, DatabaseConfig, LoggingConfig, SearchConfig};
pub use issue_change::{ChangeType, Diff, FieldDiffs, IssueChange, IssueComment};
pub use option_entry::{OptionEntry, OptionKey};
pub use option_set::{AddOutcome, MandatoryOption, OptionSet, OverridePolicy};
