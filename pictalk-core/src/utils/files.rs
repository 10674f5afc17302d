//! Filename handling and upload-folder housekeeping.

use std::path::Path;
use std::time::SystemTime;

use chrono::Local;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

pub const DEFAULT_UPLOAD_RETENTION_DAYS: u64 = 7;

/// True when `filename` has an extension (text after the last `.`) found in
/// `allowed`, compared case-insensitively.
pub fn allowed_file<S: AsRef<str>>(filename: &str, allowed: &[S]) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_lowercase();
            allowed.iter().any(|a| a.as_ref().eq_ignore_ascii_case(&ext))
        }
        None => false,
    }
}

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// Compatibility-decomposes the name and drops what is still non-ASCII
/// (so accents fold to their base letter), path separators become spaces, runs of
/// whitespace collapse to `_`, anything outside `[A-Za-z0-9_.-]` is removed and
/// leading/trailing `.` and `_` are stripped. May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned = match Regex::new(r"[^A-Za-z0-9_.-]") {
        Ok(re) => re.replace_all(&joined, "").into_owned(),
        Err(_) => joined,
    };

    cleaned.trim_matches(|c: char| c == '.' || c == '_').to_string()
}

/// `{timestamp}_{8 hex chars}.{ext}`; the extension defaults to `jpg`.
pub fn generate_unique_filename(original_filename: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let simple = Uuid::new_v4().simple().to_string();
    let ext = original_filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_else(|| "jpg".to_string());
    format!("{}_{}.{}", timestamp, &simple[..8], ext)
}

pub fn format_file_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} TB", size)
}

/// Delete regular files in `upload_folder` older than `days` whole days.
/// Returns the number of files removed, or 0 if the folder can't be read.
pub fn clean_old_uploads(upload_folder: &Path, days: u64) -> usize {
    let entries = match std::fs::read_dir(upload_folder) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Error cleaning old uploads in {}: {}", upload_folder.display(), e);
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut deleted = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        let modified = match entry.metadata() {
            Ok(meta) if meta.is_file() => meta.modified(),
            _ => continue,
        };
        let age_days = match modified.map(|m| now.duration_since(m)) {
            Ok(Ok(age)) => age.as_secs() / 86_400,
            _ => continue,
        };

        if age_days > days {
            match std::fs::remove_file(&path) {
                Ok(()) => deleted += 1,
                Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }

    if deleted > 0 {
        tracing::info!("Removed {} uploads older than {} days", deleted, days);
    }
    deleted
}

pub fn create_required_directories<P: AsRef<Path>>(directories: &[P]) -> std::io::Result<()> {
    for dir in directories {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        tracing::debug!("Directory '{}' ready", dir.display());
    }
    Ok(())
}
