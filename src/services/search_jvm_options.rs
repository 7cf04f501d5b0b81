//! JVM options of the managed search engine process.

use std::ops::{Deref, DerefMut};
use std::path::Path;

use crate::domain::errors::DomainResult;
use crate::domain::models::{MandatoryOption, OptionSet};
use crate::services::options_file::OptionsFileWriter;

/// Options the search engine is always started with, in file order.
///
/// Native-library and I/O safety flags are locked; everything else can be
/// tuned from configuration.
pub const SEARCH_MANDATORY_OPTIONS: [MandatoryOption; 16] = [
    MandatoryOption::overridable("-XX:+UseConcMarkSweepGC"),
    MandatoryOption::overridable("-XX:CMSInitiatingOccupancyFraction=75"),
    MandatoryOption::overridable("-XX:+UseCMSInitiatingOccupancyOnly"),
    MandatoryOption::overridable("-XX:+AlwaysPreTouch"),
    MandatoryOption::overridable("-server"),
    MandatoryOption::overridable("-Xss1m"),
    MandatoryOption::overridable("-Djava.awt.headless=true"),
    MandatoryOption::overridable("-Dfile.encoding=UTF-8"),
    MandatoryOption::locked("-Djna.nosys=true"),
    MandatoryOption::locked("-Djdk.io.permissionsUseCanonicalPath=true"),
    MandatoryOption::locked("-Dio.netty.noUnsafe=true"),
    MandatoryOption::overridable("-Dio.netty.noKeySetOptimization=true"),
    MandatoryOption::overridable("-Dio.netty.recycler.maxCapacityPerThread=0"),
    MandatoryOption::overridable("-Dlog4j.shutdownHookEnabled=false"),
    MandatoryOption::overridable("-Dlog4j2.disable.jmx=true"),
    MandatoryOption::overridable("-Dlog4j.skipJansi=true"),
];

/// Comment block at the top of the generated `jvm.options`.
pub const SEARCH_JVM_OPTIONS_HEADER: &str = "\
# This file has been automatically generated during startup.
# Please use search.java_opts in the configuration to specify jvm options for the search engine
#
# DO NOT EDIT THIS FILE
#
";

/// Option set seeded with [`SEARCH_MANDATORY_OPTIONS`].
///
/// Derefs to [`OptionSet`] for merging user options.
#[derive(Debug, Clone)]
pub struct SearchJvmOptions {
    options: OptionSet,
}

impl SearchJvmOptions {
    /// Fresh set holding only the mandatory options.
    pub fn new() -> DomainResult<Self> {
        Ok(Self {
            options: OptionSet::new(SEARCH_MANDATORY_OPTIONS)?,
        })
    }

    /// Writer carrying the search engine file header.
    pub fn writer() -> OptionsFileWriter {
        OptionsFileWriter::new(SEARCH_JVM_OPTIONS_HEADER)
    }

    pub fn render(&self) -> String {
        Self::writer().render_to_string(&self.options)
    }

    /// Render and atomically replace the file at `path`.
    pub fn write_to_file(&self, path: &Path) -> DomainResult<()> {
        Self::writer().write(path, &self.options)
    }

    pub fn into_inner(self) -> OptionSet {
        self.options
    }
}

impl Deref for SearchJvmOptions {
    type Target = OptionSet;

    fn deref(&self) -> &Self::Target {
        &self.options
    }
}

impl DerefMut for SearchJvmOptions {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.options
    }
}
