// src/infrastructure/mod.rs
pub mod config;
pub mod fingerprint;
pub mod fs_content;
pub mod index_file;
pub mod json_store;
pub mod watcher;

pub use config::Config;
pub use fs_content::FsContentRepository;
pub use json_store::JsonFileStore;
pub use watcher::{StructureWatcher, WatcherHandle};
