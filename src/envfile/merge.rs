//! Conflict-aware merging of new entries into an env file
//!
//! [`merge`] is a pure function from (existing contents, request) to new
//! contents plus a report. It never performs I/O and never prompts; callers
//! that want to ask the user which policy to apply use [`conflicts`] first.

use std::collections::HashSet;

use clap::ValueEnum;

use crate::error::{AutomatorError, AutomatorResult};

use super::document::{EnvDocument, EnvEntry};

/// Marker prepended to keys renamed by the prefix policy
pub const GENERATED_PREFIX: &str = "GENERATED";

/// How to resolve a new entry whose key already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConflictPolicy {
    /// Comment out the old line as `# OLD_<line>` and write the new key normally
    Archive,
    /// Keep the old line and write the new entry as `GENERATED[_N]_<key>`
    #[default]
    Prefix,
}

/// A set of entries to merge and how to treat collisions
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub entries: Vec<EnvEntry>,
    pub policy: ConflictPolicy,
    /// Forced prefix applied to every key before conflict detection (e.g. `PROD`)
    pub key_prefix: Option<String>,
    /// Comment written above the appended block
    pub header: Option<String>,
}

impl MergeRequest {
    pub fn new(entries: Vec<EnvEntry>, policy: ConflictPolicy) -> Self {
        Self {
            entries,
            policy,
            key_prefix: None,
            header: None,
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.key_prefix = Some(prefix.trim_end_matches('_').to_string()).filter(|p| !p.is_empty());
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Entries with the forced prefix applied, validated
    fn resolved_entries(&self) -> AutomatorResult<Vec<EnvEntry>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let key = match &self.key_prefix {
                Some(prefix) => format!("{}_{}", prefix, entry.key),
                None => entry.key.clone(),
            };
            EnvEntry::validate_key(&key)?;
            if !seen.insert(key.clone()) {
                return Err(AutomatorError::Validation(format!(
                    "Key '{}' appears more than once in the same merge",
                    key
                )));
            }
            resolved.push(EnvEntry::new(key, entry.value.clone()));
        }

        Ok(resolved)
    }
}

/// What a merge did to each key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Keys written, under their final names, in write order
    pub appended: Vec<String>,
    /// Keys whose previous active lines were commented out
    pub archived: Vec<String>,
    /// `(requested key, written key)` for entries renamed to avoid a collision
    pub renamed: Vec<(String, String)>,
}

impl MergeReport {
    pub fn had_conflicts(&self) -> bool {
        !self.archived.is_empty() || !self.renamed.is_empty()
    }

    /// Final key written for a requested key
    pub fn written_key<'a>(&'a self, requested: &'a str) -> &'a str {
        self.renamed
            .iter()
            .find(|(from, _)| from == requested)
            .map(|(_, to)| to.as_str())
            .unwrap_or(requested)
    }
}

/// Result of a merge: the full new file contents and the report
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub contents: String,
    pub report: MergeReport,
}

/// Key name for generation `n` of the prefix policy
///
/// Generation 1 is `GENERATED_<key>`, later ones `GENERATED_<n>_<key>`.
pub fn generated_key(generation: usize, key: &str) -> String {
    if generation <= 1 {
        format!("{}_{}", GENERATED_PREFIX, key)
    } else {
        format!("{}_{}_{}", GENERATED_PREFIX, generation, key)
    }
}

/// Keys of the request that already exist as active entries
pub fn conflicts(existing: &str, request: &MergeRequest) -> AutomatorResult<Vec<String>> {
    let doc = EnvDocument::parse(existing);
    Ok(request
        .resolved_entries()?
        .into_iter()
        .map(|e| e.key)
        .filter(|key| doc.contains_key(key))
        .collect())
}

/// Merge the request into `existing`, resolving collisions by policy
pub fn merge(existing: &str, request: &MergeRequest) -> AutomatorResult<MergeOutcome> {
    let mut doc = EnvDocument::parse(existing);
    let entries = request.resolved_entries()?;
    let mut report = MergeReport::default();

    if entries.is_empty() {
        return Ok(MergeOutcome {
            contents: doc.render(),
            report,
        });
    }

    let colliding: Vec<&str> = entries
        .iter()
        .map(|e| e.key.as_str())
        .filter(|key| doc.contains_key(key))
        .collect();

    let mut to_write = entries.clone();
    if !colliding.is_empty() {
        match request.policy {
            ConflictPolicy::Archive => {
                for key in &colliding {
                    doc.archive(key);
                    report.archived.push(key.to_string());
                }
            }
            ConflictPolicy::Prefix => {
                let requested: HashSet<&str> = entries.iter().map(|e| e.key.as_str()).collect();
                let generation = next_generation(&doc, &colliding, &requested);
                for entry in to_write.iter_mut() {
                    if colliding.contains(&entry.key.as_str()) {
                        let renamed = generated_key(generation, &entry.key);
                        report.renamed.push((entry.key.clone(), renamed.clone()));
                        entry.key = renamed;
                    }
                }
            }
        }
    }

    if let Some(header) = &request.header {
        doc.push_separator();
        doc.push_comment(header);
    }
    for entry in &to_write {
        doc.push_entry(entry);
        report.appended.push(entry.key.clone());
    }

    Ok(MergeOutcome {
        contents: doc.render(),
        report,
    })
}

/// First generation free for every colliding key
///
/// One generation is shared by the whole request so related keys (a client id
/// and its secret) keep matching prefixes.
fn next_generation(doc: &EnvDocument, colliding: &[&str], requested: &HashSet<&str>) -> usize {
    (1..)
        .find(|&generation| {
            colliding.iter().all(|key| {
                let candidate = generated_key(generation, key);
                !doc.contains_key(&candidate) && !requested.contains(candidate.as_str())
            })
        })
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(pairs: &[(&str, &str)], policy: ConflictPolicy) -> MergeRequest {
        MergeRequest::new(
            pairs.iter().map(|(k, v)| EnvEntry::new(*k, *v)).collect(),
            policy,
        )
    }

    #[test]
    fn test_no_collision_appends_in_order() {
        let existing = "# settings\nOAUTH_APP_NAME=acme\n\nDATABASE_URL=postgres://db\n";
        let req = request(
            &[("GITHUB_CLIENT_ID", "abc"), ("GITHUB_CLIENT_SECRET", "def")],
            ConflictPolicy::Prefix,
        );

        let outcome = merge(existing, &req).unwrap();

        assert_eq!(
            outcome.contents,
            format!("{}GITHUB_CLIENT_ID=abc\nGITHUB_CLIENT_SECRET=def\n", existing)
        );
        assert!(!outcome.report.had_conflicts());
        assert_eq!(
            outcome.report.appended,
            vec!["GITHUB_CLIENT_ID", "GITHUB_CLIENT_SECRET"]
        );
    }

    #[test]
    fn test_merge_into_empty_file() {
        let outcome = merge("", &request(&[("A_KEY", "1")], ConflictPolicy::Archive)).unwrap();
        assert_eq!(outcome.contents, "A_KEY=1\n");
    }

    #[test]
    fn test_archive_scenario() {
        let req = request(&[("GITHUB_CLIENT_ID", "abc")], ConflictPolicy::Archive);
        let outcome = merge("GITHUB_CLIENT_ID=old123\n", &req).unwrap();

        assert_eq!(
            outcome.contents,
            "# OLD_GITHUB_CLIENT_ID=old123\nGITHUB_CLIENT_ID=abc\n"
        );
        assert_eq!(outcome.report.archived, vec!["GITHUB_CLIENT_ID"]);
        assert!(outcome.report.renamed.is_empty());
    }

    #[test]
    fn test_archive_preserves_unrelated_lines() {
        let existing = "FOO=1\nGITHUB_CLIENT_ID=old\n# note\nBAR=2\n";
        let req = request(&[("GITHUB_CLIENT_ID", "new")], ConflictPolicy::Archive);
        let outcome = merge(existing, &req).unwrap();

        assert_eq!(
            outcome.contents,
            "FOO=1\n# OLD_GITHUB_CLIENT_ID=old\n# note\nBAR=2\nGITHUB_CLIENT_ID=new\n"
        );
    }

    #[test]
    fn test_prefix_keeps_old_value() {
        let req = request(&[("GITHUB_CLIENT_ID", "abc")], ConflictPolicy::Prefix);
        let outcome = merge("GITHUB_CLIENT_ID=old123\n", &req).unwrap();

        assert_eq!(
            outcome.contents,
            "GITHUB_CLIENT_ID=old123\nGENERATED_GITHUB_CLIENT_ID=abc\n"
        );
        assert_eq!(
            outcome.report.renamed,
            vec![(
                "GITHUB_CLIENT_ID".to_string(),
                "GENERATED_GITHUB_CLIENT_ID".to_string()
            )]
        );
        assert_eq!(
            outcome.report.written_key("GITHUB_CLIENT_ID"),
            "GENERATED_GITHUB_CLIENT_ID"
        );
    }

    #[test]
    fn test_repeated_prefix_merges_increment() {
        let req = request(&[("GITHUB_CLIENT_ID", "same")], ConflictPolicy::Prefix);
        let mut contents = "GITHUB_CLIENT_ID=original\n".to_string();

        let mut written = Vec::new();
        for _ in 0..4 {
            let outcome = merge(&contents, &req).unwrap();
            written.push(outcome.report.appended[0].clone());
            contents = outcome.contents;
        }

        assert_eq!(
            written,
            vec![
                "GENERATED_GITHUB_CLIENT_ID",
                "GENERATED_2_GITHUB_CLIENT_ID",
                "GENERATED_3_GITHUB_CLIENT_ID",
                "GENERATED_4_GITHUB_CLIENT_ID",
            ]
        );
        assert!(contents.starts_with("GITHUB_CLIENT_ID=original\n"));
        let doc = EnvDocument::parse(&contents);
        let keys: Vec<_> = doc.entries().map(|(k, _)| k).collect();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
    }

    #[test]
    fn test_pair_shares_generation() {
        let existing = "GITHUB_CLIENT_ID=a\nGITHUB_CLIENT_SECRET=b\nGENERATED_GITHUB_CLIENT_ID=c\nGENERATED_GITHUB_CLIENT_SECRET=d\n";
        let req = request(
            &[("GITHUB_CLIENT_ID", "e"), ("GITHUB_CLIENT_SECRET", "f")],
            ConflictPolicy::Prefix,
        );
        let outcome = merge(existing, &req).unwrap();

        assert!(outcome
            .contents
            .ends_with("GENERATED_2_GITHUB_CLIENT_ID=e\nGENERATED_2_GITHUB_CLIENT_SECRET=f\n"));
    }

    #[test]
    fn test_archived_generated_keys_do_not_count() {
        let existing = "GITHUB_CLIENT_ID=a\n# OLD_GENERATED_GITHUB_CLIENT_ID=b\n";
        let req = request(&[("GITHUB_CLIENT_ID", "c")], ConflictPolicy::Prefix);
        let outcome = merge(existing, &req).unwrap();
        assert_eq!(outcome.report.appended, vec!["GENERATED_GITHUB_CLIENT_ID"]);
    }

    #[test]
    fn test_forced_key_prefix() {
        let req = request(&[("GITHUB_CLIENT_ID", "prod-id")], ConflictPolicy::Prefix)
            .with_key_prefix("PROD_");
        let outcome = merge("GITHUB_CLIENT_ID=dev-id\n", &req).unwrap();

        assert_eq!(
            outcome.contents,
            "GITHUB_CLIENT_ID=dev-id\nPROD_GITHUB_CLIENT_ID=prod-id\n"
        );
        assert!(!outcome.report.had_conflicts());
    }

    #[test]
    fn test_header_block() {
        let req = request(&[("GITHUB_CLIENT_ID", "abc")], ConflictPolicy::Prefix)
            .with_header("# GitHub OAuth Credentials (acme)");
        let outcome = merge("FOO=1\n", &req).unwrap();
        assert_eq!(
            outcome.contents,
            "FOO=1\n\n# GitHub OAuth Credentials (acme)\nGITHUB_CLIENT_ID=abc\n"
        );

        let outcome = merge("", &req).unwrap();
        assert_eq!(
            outcome.contents,
            "# GitHub OAuth Credentials (acme)\nGITHUB_CLIENT_ID=abc\n"
        );
    }

    #[test]
    fn test_conflicts_reports_colliding_keys() {
        let req = request(
            &[("GITHUB_CLIENT_ID", "x"), ("GITHUB_CLIENT_SECRET", "y")],
            ConflictPolicy::Prefix,
        );
        let found = conflicts("GITHUB_CLIENT_SECRET=old\n", &req).unwrap();
        assert_eq!(found, vec!["GITHUB_CLIENT_SECRET"]);
        assert!(conflicts("", &req).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_and_duplicate_keys_rejected() {
        let bad = request(&[("lower_case", "x")], ConflictPolicy::Prefix);
        assert!(merge("", &bad).is_err());

        let dup = request(&[("A_KEY", "1"), ("A_KEY", "2")], ConflictPolicy::Prefix);
        assert!(merge("", &dup).is_err());
    }

    #[test]
    fn test_empty_request_leaves_file_untouched() {
        let existing = "A=1\n# no trailing newline";
        let outcome = merge(existing, &request(&[], ConflictPolicy::Archive)).unwrap();
        assert_eq!(outcome.contents, existing);
    }
}
