// src/constants.rs
//
// Application-wide constants. Each one names the place it is used.

/// Directory under the public root that holds the Module/Subject/Topic tree.
///
/// Also the URL prefix under which topic content is served.
///
/// Used in: `infrastructure/config.rs`, `application/topic_loader.rs`, `domain/content.rs`
pub const MODULES_DIR: &str = "Modules";

/// Per-topic metadata file inside every topic folder.
///
/// Used in: `infrastructure/fs_content.rs`
pub const TOPIC_INFO_FILE: &str = "info.json";

/// Default name of the flattened structure index written next to `Modules/`.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_INDEX_FILE: &str = "mst.json";

/// Quiet period after the last detected change before the index is rebuilt.
///
/// Several editors write a file in bursts (temp file, rename, chmod). Waiting for
/// the tree to settle collapses the burst into one regeneration.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Interval between two fingerprints of the content tree.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_POLL_MS: u64 = 250;

/// Default HTTP port of `medquiz serve`.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_PORT: u16 = 3000;

/// Storage key for the finished study sessions, newest first.
///
/// Used in: `application/study_tracker.rs`
pub const SESSIONS_KEY: &str = "studySessions";

/// Storage key for the in-flight study timer.
///
/// Used in: `application/study_tracker.rs`
pub const TIMER_KEY: &str = "studyTimerState";

/// Score percentage at or above which a quiz result counts as outstanding.
///
/// Used in: `domain/quiz.rs`
pub const OUTSTANDING_PERCENT: u32 = 80;

/// Score percentage at or above which a quiz result counts as good.
///
/// Used in: `domain/quiz.rs`
pub const GOOD_PERCENT: u32 = 60;
