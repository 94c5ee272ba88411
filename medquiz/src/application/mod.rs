// src/application/mod.rs
pub mod catalog;
pub mod directory_scanner;
pub mod structure_generator;
pub mod study_tracker;
pub mod topic_loader;

pub use catalog::{CatalogBuilder, TopicFilter};
pub use directory_scanner::{ContentRepository, DirectoryScanner};
pub use structure_generator::{GenerationReport, StructureGenerator};
pub use study_tracker::{KeyValueStore, StudyTracker};
pub use topic_loader::{TopicLoader, TopicLocator};
