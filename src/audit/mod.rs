//! Secure audit history for oauth-automator
//!
//! Every created credential set can be recorded in an encrypted, append-only
//! history file, one file per provider.
//!
//! # Architecture
//!
//! - `AuditRecord`: timestamp, app name, environment and the credentials.
//! - `AuditLog`: seals records with AES-256-GCM and appends them one per line;
//!   `list` yields secret-free summaries, `reveal` the full record on request.
//!
//! # Example
//!
//! ```rust,ignore
//! use oauth_automator::audit::{AuditLog, AuditRecord, Environment};
//! use oauth_automator::crypto::load_or_create_key;
//!
//! let key = load_or_create_key(&paths.key_file())?;
//! let log = AuditLog::new(paths.history_file(Provider::GitHub));
//!
//! log.append(&AuditRecord::new("acme", Environment::Dev, id, secret), &key)?;
//! for summary in log.list(&key)?.records {
//!     println!("[{}] {}", summary.index, summary.app_name);
//! }
//! let full = log.reveal(&key, 1)?;
//! ```

mod logger;
mod record;

pub use logger::AuditLog;
pub use record::{AuditRecord, Environment, HistoryListing, RecordSummary, SkippedRecord};
