//! Menu-extension installer.
//!
//! Illustrator's UI integration is a CEP-style panel: a directory of
//! script files copied into the application's extension folder, with
//! placeholder tokens in the copied files rewritten to the host's install
//! locations. Removal deletes the panel directory again.
//!
//! The copy-and-substitute core is platform-neutral; only the discovery
//! of installed Illustrator directories (registry vs. /Applications) and
//! the extension debug-mode flag are platform-specific.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Directory name of the installed panel inside the extension folder.
pub const PANEL_DIR_NAME: &str = "bridge.panel";

/// Subdirectory holding the per-button command scripts.
pub const COMMANDS_DIR_NAME: &str = "buttoncmds";

/// Token in panel sources replaced with the installed commands directory.
pub const COMMANDS_DIR_TOKEN: &str = "CMDSDIR";

/// Errors from installing or removing the panel.
#[derive(Debug, Error)]
pub enum InstallError {
    /// Target application directory does not exist
    #[error("Invalid Adobe Illustrator path: {0}. The path doesn't exist.")]
    InvalidTarget(String),

    /// Panel resource directory does not exist
    #[error("Missing panel resources: {0}")]
    MissingResources(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Copies the panel resources into an Illustrator install and rewrites
/// placeholder tokens.
pub struct IntegrationInstaller {
    resources: PathBuf,
    tokens: Vec<(String, String)>,
}

impl IntegrationInstaller {
    /// `resources` is the panel template directory; `tokens` are
    /// NAME -> value pairs substituted into every copied text file.
    pub fn new(resources: PathBuf, tokens: Vec<(String, String)>) -> Self {
        IntegrationInstaller { resources, tokens }
    }

    /// Install the panel into `install_dir`, replacing any previous
    /// install. Returns the installed panel directory.
    pub fn install(&self, install_dir: &Path) -> Result<PathBuf, InstallError> {
        if !install_dir.exists() {
            return Err(InstallError::InvalidTarget(
                install_dir.display().to_string(),
            ));
        }
        if !self.resources.exists() {
            return Err(InstallError::MissingResources(
                self.resources.display().to_string(),
            ));
        }

        let target = install_dir.join(PANEL_DIR_NAME);
        if target.exists() {
            std::fs::remove_dir_all(&target)?;
        }
        copy_tree(&self.resources, &target)?;

        // The panel needs the absolute location of its command scripts,
        // which only exists after the copy.
        let commands_dir = target.join(COMMANDS_DIR_NAME);
        let mut tokens = self.tokens.clone();
        tokens.push((
            COMMANDS_DIR_TOKEN.to_string(),
            commands_dir.to_string_lossy().replace('\\', "/"),
        ));

        substitute_tree(&target, &tokens)?;

        #[cfg(target_os = "windows")]
        crate::platform::windows::registry::enable_extension_debug_mode();

        log::info!("installed panel into {}", target.display());
        Ok(target)
    }

    /// Remove a previously installed panel. Returns whether anything was
    /// removed.
    pub fn remove(&self, install_dir: &Path) -> Result<bool, InstallError> {
        let target = install_dir.join(PANEL_DIR_NAME);
        if !target.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&target)?;
        log::info!("removed panel from {}", target.display());
        Ok(true)
    }
}

/// Illustrator install directories on this machine, newest version first.
pub fn installed_application_dirs() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        crate::platform::windows::registry::install_paths()
    }

    #[cfg(target_os = "macos")]
    {
        crate::platform::macos::discovery::install_paths()
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        Vec::new()
    }
}

/// Recursively copy a directory.
fn copy_tree(src: &Path, dst: &Path) -> Result<(), InstallError> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            std::fs::copy(&from, &to)?;
        }
    }
    Ok(())
}

/// Rewrite tokens in every text file under `dir`. Files that are not
/// valid UTF-8 (icons, binaries) are left untouched.
fn substitute_tree(dir: &Path, tokens: &[(String, String)]) -> Result<(), InstallError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            substitute_tree(&path, tokens)?;
            continue;
        }
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let rewritten = substitute_tokens(&content, tokens);
        if rewritten != content {
            std::fs::write(&path, rewritten)?;
        }
    }
    Ok(())
}

/// Replace each `NAME` token with its value.
pub fn substitute_tokens(content: &str, tokens: &[(String, String)]) -> String {
    let mut result = content.to_string();
    for (name, value) in tokens {
        result = result.replace(name.as_str(), value.as_str());
    }
    result
}
