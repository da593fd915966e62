//! Locate the installed Illustrator application on macOS.

use std::path::PathBuf;

/// Addressed when no install can be discovered; `osascript` will report
/// its own error if the application is genuinely missing.
pub const DEFAULT_APP_NAME: &str = "Adobe Illustrator 2023";

/// Name of the newest `Adobe Illustrator *` folder under /Applications.
///
/// Adobe installs one versioned folder per release; the lexicographically
/// last one carries the highest year.
pub fn find_app_name() -> String {
    illustrator_folders()
        .pop()
        .unwrap_or_else(|| DEFAULT_APP_NAME.to_string())
}

/// Install directories for the integration installer, newest first.
pub fn install_paths() -> Vec<PathBuf> {
    let mut folders = illustrator_folders();
    folders.reverse();
    folders
        .into_iter()
        .map(|name| PathBuf::from("/Applications").join(name))
        .collect()
}

fn illustrator_folders() -> Vec<String> {
    let mut folders: Vec<String> = match std::fs::read_dir("/Applications") {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with("Adobe Illustrator"))
            .collect(),
        Err(err) => {
            log::warn!("could not scan /Applications: {}", err);
            Vec::new()
        }
    };
    folders.sort();
    folders
}
