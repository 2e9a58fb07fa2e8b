use crate::error::StoreError;

const SAVE_SUFFIXES: [&str; 2] = [".sl2", ".sl2.bak"];
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

// Save file: `<stem>.sl2` or `<stem>.sl2.bak`, any case, non-empty stem,
// no whitespace anywhere in the name.
pub fn is_save_file(file_name: &str) -> bool {
    if file_name.chars().any(char::is_whitespace) {
        return false;
    }
    let lower = file_name.to_ascii_lowercase();
    SAVE_SUFFIXES
        .iter()
        .any(|suffix| lower.len() > suffix.len() && lower.ends_with(suffix))
}

/// Rejects names that are not a single legal folder name on every host
/// the saves can come from. Keeps snapshots inside their game folder.
pub fn validate_snapshot_name(name: &str) -> Result<(), StoreError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.chars().any(|c| c.is_control() || RESERVED.contains(&c))
        || name.ends_with('.')
        || name.ends_with(' ');
    if bad {
        Err(StoreError::InvalidSnapshotName(name.to_string()))
    } else {
        Ok(())
    }
}

// Name used when the caller does not pick one, e.g. backup_20250922-120000
pub fn default_snapshot_name() -> String {
    format!("backup_{}", chrono::Local::now().format("%Y%m%d-%H%M%S"))
}
