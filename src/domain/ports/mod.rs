//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that infrastructure adapters must implement:
//! - IssueChangeRepository: persistence for issue comments and changelogs

pub mod issue_change_repository;

pub use issue_change_repository::IssueChangeRepository;
