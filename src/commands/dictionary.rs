// Dictionary commands for CRUD, import and export over StorageSync

use serde_json::Value;
use std::fs;
use std::path::Path;

use super::to_user_error;
use crate::dictionary::ShortcutEntry;
use crate::storage::StorageSync;

/// One listing line: `token → replacement [label]`
pub fn format_entry(entry: &ShortcutEntry) -> String {
    let replacement = entry.replacement.replace('\n', "\\n");
    match &entry.label {
        Some(label) => format!("{} → {} [{}]", entry.token, replacement, label),
        None => format!("{} → {}", entry.token, replacement),
    }
}

/// List all shortcuts
pub async fn list_shortcuts(sync: &StorageSync) -> String {
    let entries = sync.entries().await;
    if entries.is_empty() {
        return "No shortcuts defined".to_string();
    }
    entries
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Add or update a shortcut
pub async fn add_shortcut(
    sync: &StorageSync,
    token: &str,
    replacement: &str,
    label: Option<&str>,
) -> Result<String, String> {
    let entry = sync
        .save(token, replacement, label)
        .await
        .map_err(to_user_error)?;
    Ok(format!("Saved {}", format_entry(&entry)))
}

/// Delete a shortcut
pub async fn remove_shortcut(sync: &StorageSync, token: &str) -> Result<String, String> {
    sync.remove(token).await.map_err(to_user_error)?;
    Ok(format!("Removed {}", token))
}

/// Export as pretty JSON, to `file` when given or as the returned text
pub async fn export_shortcuts(sync: &StorageSync, file: Option<&Path>) -> Result<String, String> {
    let data = sync.export_data().await;
    let content = serde_json::to_string_pretty(&Value::Object(data))
        .map_err(|e| format!("Failed to encode shortcuts: {}", e))?;

    match file {
        Some(path) => {
            fs::write(path, content)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            Ok(format!("Exported to {}", path.display()))
        }
        None => Ok(content),
    }
}

/// Import an exported JSON object
pub async fn import_shortcuts(sync: &StorageSync, file: &Path) -> Result<String, String> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid JSON in {}: {}", file.display(), e))?;
    let Value::Object(bulk) = value else {
        return Err("Import file must contain a JSON object".to_string());
    };

    let report = sync.import_data(&bulk).await.map_err(to_user_error)?;

    let mut lines = vec![format!("Imported {} shortcuts", report.imported)];
    for skip in &report.skipped {
        lines.push(format!("Skipped {}: {}", skip.key, skip.reason));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
#[path = "dictionary_test.rs"]
mod tests;
