//! Display formatting for terminal output
//!
//! Formats merge results, saved credentials and the secure history as plain
//! text tables and detail views.

pub mod credentials;
pub mod history;
pub mod merge;

pub use credentials::format_saved_credentials;
pub use history::{format_history_list, format_record_details};
pub use merge::{format_merge_report, format_persist_summary};
