pub mod config;
pub mod confirm;
pub mod engine;
pub mod error;
pub mod progress;
pub mod report;
pub mod rules;
pub mod scan;
pub mod tagging;
pub mod type_map;
pub mod xnat;

pub use config::AppConfig;
pub use confirm::{AutoConfirm, ConfirmGate};
pub use engine::{apply_note_plan, SessionEngine, SessionTags};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use rules::RuleTable;
pub use scan::{Quality, ScanRecord};
pub use tagging::Verdict;
