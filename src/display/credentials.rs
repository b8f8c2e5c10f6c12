//! Saved credential display formatting

use std::path::Path;

use crate::models::Provider;
use crate::storage::SavedCredential;

/// Format the credential pairs found in an env file, secrets masked
pub fn format_saved_credentials(
    path: &Path,
    provider: Provider,
    saved: &[SavedCredential],
) -> String {
    if saved.is_empty() {
        return format!("No {} credentials found in {}.", provider, path.display());
    }

    let labels: Vec<String> = saved
        .iter()
        .map(|s| {
            if s.prefix.is_empty() {
                "(active)".to_string()
            } else {
                s.prefix.trim_end_matches('_').to_string()
            }
        })
        .collect();

    let label_width = labels.iter().map(|l| l.len()).max().unwrap_or(6).max(6);
    let id_width = saved
        .iter()
        .map(|s| s.client_id.len())
        .max()
        .unwrap_or(9)
        .max(9);

    let mut output = String::new();
    output.push_str(&format!("{} credentials in {}\n", provider, path.display()));

    output.push_str(&format!(
        "{:<label_width$}  {:<id_width$}  {}\n",
        "Prefix",
        "Client ID",
        "Client Secret",
        label_width = label_width,
        id_width = id_width,
    ));
    output.push_str(&format!(
        "{:-<label_width$}  {:-<id_width$}  {:-<13}\n",
        "",
        "",
        "",
        label_width = label_width,
        id_width = id_width,
    ));

    for (label, credential) in labels.iter().zip(saved) {
        output.push_str(&format!(
            "{:<label_width$}  {:<id_width$}  {}\n",
            label,
            credential.client_id,
            credential.client_secret.masked(),
            label_width = label_width,
            id_width = id_width,
        ));
    }

    output
}
