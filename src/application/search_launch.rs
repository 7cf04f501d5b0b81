//! Search engine start-attempt preparation.
//!
//! Every (re)start of the search engine builds a fresh option set from the
//! mandatory profile plus the configured options and regenerates the
//! `jvm.options` file the process reads at startup. Any failure aborts the
//! attempt; retrying is the supervisor's call.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::domain::models::{AddOutcome, SearchConfig};
use crate::services::SearchJvmOptions;

/// Outcome of a successful preparation.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedLaunch {
    /// Where the options file was written
    pub jvm_options_path: PathBuf,
    /// Options in file order
    pub options: Vec<String>,
    /// Mandatory defaults that configuration replaced, as `old -> new`
    pub overridden_defaults: Vec<String>,
}

/// Builds and writes the search engine's JVM options for one start attempt.
pub struct SearchLaunchPreparer {
    config: SearchConfig,
}

impl SearchLaunchPreparer {
    /// Preparer for the given search settings.
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Merge configured options, then `extra_options`, onto the mandatory profile.
    pub fn resolve(&self, extra_options: &[String]) -> Result<(SearchJvmOptions, Vec<String>)> {
        let mut options = SearchJvmOptions::new().context("Search engine option profile is invalid")?;
        let mut overridden = Vec::new();

        let configured = self.config.user_options().map(str::to_string);
        for raw in configured.chain(extra_options.iter().cloned()) {
            let outcome = options
                .add(&raw)
                .with_context(|| format!("Rejected search engine JVM option '{raw}'"))?;
            if let AddOutcome::OverrodeMandatory { previous } = outcome {
                overridden.push(format!("{previous} -> {}", raw.trim()));
            }
        }

        Ok((options, overridden))
    }

    /// Resolve and write to the configured `jvm_options_path`.
    pub fn prepare(&self, extra_options: &[String]) -> Result<PreparedLaunch> {
        let path = PathBuf::from(&self.config.jvm_options_path);
        self.prepare_at(&path, extra_options)
    }

    /// Resolve and write to `path`.
    pub fn prepare_at(&self, path: &Path, extra_options: &[String]) -> Result<PreparedLaunch> {
        let (options, overridden_defaults) = self.resolve(extra_options)?;
        options
            .write_to_file(path)
            .context("Cannot start search engine: JVM options file was not written")?;

        info!(
            path = %path.display(),
            options = options.len(),
            overridden = overridden_defaults.len(),
            "prepared search engine launch"
        );

        Ok(PreparedLaunch {
            jvm_options_path: path.to_path_buf(),
            options: options.get_all(),
            overridden_defaults,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{SEARCH_JVM_OPTIONS_HEADER, SEARCH_MANDATORY_OPTIONS};

    fn config(java_opts: &str, additional: &str) -> SearchConfig {
        SearchConfig {
            java_opts: java_opts.to_string(),
            java_additional_opts: additional.to_string(),
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_resolve_appends_configured_options() {
        let preparer = SearchLaunchPreparer::new(config("-Xmx1g -Xms1g", "-Dfoo=bar"));
        let (options, overridden) = preparer.resolve(&[]).unwrap();

        let all = options.get_all();
        assert_eq!(all.len(), SEARCH_MANDATORY_OPTIONS.len() + 3);
        assert_eq!(&all[SEARCH_MANDATORY_OPTIONS.len()..], ["-Xmx1g", "-Xms1g", "-Dfoo=bar"]);
        assert!(overridden.is_empty());
    }

    #[test]
    fn test_additional_options_win_over_java_opts() {
        let preparer = SearchLaunchPreparer::new(config("-Xmx1g -Xms1g", "-Xmx2g"));
        let (options, _) = preparer.resolve(&[]).unwrap();

        let all = options.get_all();
        assert_eq!(&all[SEARCH_MANDATORY_OPTIONS.len()..], ["-Xmx2g", "-Xms1g"]);
    }

    #[test]
    fn test_overridden_defaults_are_reported() {
        let preparer = SearchLaunchPreparer::new(config("-Xmx1g", "-Dfile.encoding=ISO-8859-1"));
        let (options, overridden) = preparer.resolve(&["-Xss2m".to_string()]).unwrap();

        assert_eq!(
            overridden,
            vec![
                "-Dfile.encoding=UTF-8 -> -Dfile.encoding=ISO-8859-1".to_string(),
                "-Xss1m -> -Xss2m".to_string(),
            ]
        );
        assert!(options.get_all().contains(&"-Dfile.encoding=ISO-8859-1".to_string()));
    }

    #[test]
    fn test_locked_option_aborts_resolution() {
        let preparer = SearchLaunchPreparer::new(config("-Djna.nosys=false", ""));
        let err = preparer.resolve(&[]).unwrap_err();
        assert!(err.to_string().contains("-Djna.nosys=false"));
    }

    #[test]
    fn test_prepare_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("es").join("jvm.options");
        let preparer = SearchLaunchPreparer::new(config("-Xmx1g", ""));

        let prepared = preparer.prepare_at(&path, &[]).unwrap();
        assert_eq!(prepared.jvm_options_path, path);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(SEARCH_JVM_OPTIONS_HEADER));
        assert!(content.ends_with("\n-Xmx1g"));
        assert_eq!(
            content.lines().filter(|l| l.starts_with('-')).count(),
            prepared.options.len()
        );
    }

    #[test]
    fn test_prepare_fails_without_writing_on_invalid_option() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jvm.options");
        let preparer = SearchLaunchPreparer::new(config("-Xmx1g", ""));

        assert!(preparer.prepare_at(&path, &["Xmx2g".to_string()]).is_err());
        assert!(!path.exists());
    }
}
