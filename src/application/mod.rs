pub mod search_launch;

pub use search_launch::{PreparedLaunch, SearchLaunchPreparer};
