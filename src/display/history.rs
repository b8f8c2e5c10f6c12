//! Secure history display formatting
//!
//! The list view never shows client secrets; only the detail view for a
//! single revealed record does.

use crate::audit::{AuditRecord, HistoryListing};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a history listing as a table, followed by any skipped records
pub fn format_history_list(listing: &HistoryListing) -> String {
    if listing.is_empty() {
        return "No apps logged yet.".to_string();
    }

    let mut output = String::new();

    if !listing.records.is_empty() {
        let records = &listing.records;

        let index_width = records
            .iter()
            .map(|r| r.index.to_string().len() + 2)
            .max()
            .unwrap_or(3)
            .max(3);

        let name_width = records
            .iter()
            .map(|r| r.app_name.len())
            .max()
            .unwrap_or(3)
            .max(3);

        output.push_str(&format!(
            "{:<index_width$}  {:<19}  {:<4}  {:<name_width$}  {}\n",
            "#",
            "Created (UTC)",
            "Env",
            "App",
            "Client ID",
            index_width = index_width,
            name_width = name_width,
        ));

        output.push_str(&format!(
            "{:-<index_width$}  {:-<19}  {:-<4}  {:-<name_width$}  {:-<12}\n",
            "",
            "",
            "",
            "",
            "",
            index_width = index_width,
            name_width = name_width,
        ));

        for record in records {
            output.push_str(&format!(
                "{:<index_width$}  {:<19}  {:<4}  {:<name_width$}  {}\n",
                format!("[{}]", record.index),
                record.timestamp.format(TIME_FORMAT).to_string(),
                record.environment.to_string(),
                record.app_name,
                record.client_id,
                index_width = index_width,
                name_width = name_width,
            ));
        }
    }

    if !listing.skipped.is_empty() {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&format!(
            "{} record(s) could not be read:\n",
            listing.skipped.len()
        ));
        for skipped in &listing.skipped {
            output.push_str(&format!("  [{}] {}\n", skipped.position, skipped.reason));
        }
    }

    output
}

/// Format one revealed record, secret included
pub fn format_record_details(index: usize, record: &AuditRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Record [{}]: {}\n", index, record.app_name));
    output.push_str(&format!(
        "  Created:        {}\n",
        record.timestamp.format(TIME_FORMAT)
    ));
    output.push_str(&format!("  Environment:    {}\n", record.environment));
    if let Some(homepage) = &record.homepage {
        output.push_str(&format!("  Homepage:       {}\n", homepage));
    }
    output.push_str(&format!("  Client ID:      {}\n", record.client_id));
    output.push_str(&format!(
        "  Client Secret:  {}\n",
        record.client_secret.as_str()
    ));

    output
}
