//! `.env` file handling
//!
//! A line-preserving document model and the pure merge decision function used
//! to write generated credentials without clobbering existing values.
//!
//! # Example
//!
//! ```rust
//! use oauth_automator::envfile::{merge, ConflictPolicy, EnvEntry, MergeRequest};
//!
//! let request = MergeRequest::new(
//!     vec![EnvEntry::new("GITHUB_CLIENT_ID", "abc")],
//!     ConflictPolicy::Archive,
//! );
//! let outcome = merge("GITHUB_CLIENT_ID=old123\n", &request).unwrap();
//! assert_eq!(
//!     outcome.contents,
//!     "# OLD_GITHUB_CLIENT_ID=old123\nGITHUB_CLIENT_ID=abc\n"
//! );
//! ```

mod document;
mod merge;

pub use document::{EnvDocument, EnvEntry, EnvLine, LineKind, ARCHIVE_MARKER};
pub use merge::{
    conflicts, generated_key, merge, ConflictPolicy, MergeOutcome, MergeReport, MergeRequest,
    GENERATED_PREFIX,
};
