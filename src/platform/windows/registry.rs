//! Registry reads backing dispatch discovery and the installer.
//!
//! Every function here treats registry errors as "nothing found": probing
//! a machine without Illustrator must degrade to an empty result, not an
//! error, because the locator retries and the caller surfaces its own
//! connection-failure message.

use std::path::PathBuf;

use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WOW64_64KEY};
use winreg::RegKey;

const CLASSES_BASE: &str = "SOFTWARE\\Classes";
const ADOBE_ILLUSTRATOR_BASE: &str = "SOFTWARE\\Adobe\\Adobe Illustrator";
const ADOBE_USER_BASE: &str = "SOFTWARE\\Adobe";

/// Registered Illustrator automation class names.
///
/// Returns the default ProgID when its key exists, plus every versioned
/// `Illustrator.Application.*` key found under `HKLM\SOFTWARE\Classes`.
/// The scan covers the whole namespace; registry enumeration order is not
/// sorted, so stopping early would drop versions.
pub fn automation_class_names() -> Vec<String> {
    let mut names = Vec::new();
    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);

    let default_key = format!("{}\\{}", CLASSES_BASE, crate::dispatch::DEFAULT_PROG_ID);
    if hklm
        .open_subkey_with_flags(&default_key, KEY_READ | KEY_WOW64_64KEY)
        .is_ok()
    {
        names.push(crate::dispatch::DEFAULT_PROG_ID.to_string());
    }

    let classes = match hklm.open_subkey_with_flags(CLASSES_BASE, KEY_READ | KEY_WOW64_64KEY) {
        Ok(key) => key,
        Err(err) => {
            log::warn!("could not open {}: {}", CLASSES_BASE, err);
            return names;
        }
    };

    for key_name in classes.enum_keys().filter_map(|k| k.ok()) {
        if key_name.starts_with(crate::dispatch::VERSIONED_PREFIX) {
            names.push(key_name);
        }
    }

    names
}

/// Illustrator install directories recorded by the installer, newest
/// version first.
///
/// Reads `HKLM\SOFTWARE\Adobe\Adobe Illustrator\<version>\InstallPath` and
/// strips the trailing "Support Files" component the installer appends.
pub fn install_paths() -> Vec<PathBuf> {
    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let base = match hklm.open_subkey_with_flags(ADOBE_ILLUSTRATOR_BASE, KEY_READ | KEY_WOW64_64KEY)
    {
        Ok(key) => key,
        Err(_) => return Vec::new(),
    };

    let mut versions: Vec<String> = base.enum_keys().filter_map(|k| k.ok()).collect();
    versions.sort_by(|a, b| {
        let pa: f64 = a.parse().unwrap_or(0.0);
        let pb: f64 = b.parse().unwrap_or(0.0);
        pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut paths = Vec::new();
    for version in versions {
        let version_key =
            match base.open_subkey_with_flags(&version, KEY_READ | KEY_WOW64_64KEY) {
                Ok(key) => key,
                Err(_) => continue,
            };
        let install_path: String = match version_key.get_value("InstallPath") {
            Ok(value) => value,
            Err(_) => continue,
        };
        let trimmed = install_path
            .trim_end_matches('\\')
            .trim_end_matches("Support Files")
            .trim_end_matches('\\')
            .to_string();
        paths.push(PathBuf::from(trimmed));
    }

    paths
}

/// Turn on the extension debug-mode flag for every installed CSXS runtime
/// so unsigned panels load.
///
/// Sets `PlayerDebugMode = "1"` under each `HKCU\SOFTWARE\Adobe\CSXS.*`
/// key. Failures on individual keys are logged and skipped.
pub fn enable_extension_debug_mode() {
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let adobe = match hkcu.open_subkey(ADOBE_USER_BASE) {
        Ok(key) => key,
        Err(err) => {
            log::warn!("could not open {}: {}", ADOBE_USER_BASE, err);
            return;
        }
    };

    for key_name in adobe.enum_keys().filter_map(|k| k.ok()) {
        if !key_name.starts_with("CSXS.") {
            continue;
        }
        let path = format!("{}\\{}", ADOBE_USER_BASE, key_name);
        match hkcu.create_subkey(&path) {
            Ok((key, _)) => {
                if let Err(err) = key.set_value("PlayerDebugMode", &"1") {
                    log::warn!("could not set PlayerDebugMode on {}: {}", path, err);
                } else {
                    log::debug!("enabled PlayerDebugMode on {}", path);
                }
            }
            Err(err) => log::warn!("could not open {}: {}", path, err),
        }
    }
}
