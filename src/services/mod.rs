pub mod options_file;
pub mod search_jvm_options;

pub use options_file::OptionsFileWriter;
pub use search_jvm_options::{SearchJvmOptions, SEARCH_JVM_OPTIONS_HEADER, SEARCH_MANDATORY_OPTIONS};
