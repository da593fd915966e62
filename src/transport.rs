//! Transport abstraction over the two ways a command reaches Illustrator.
//!
//! On Windows commands travel over COM automation (late-bound property and
//! method access); on macOS they are rendered into AppleScript and executed
//! through `osascript`. Both variants implement [`IllustratorTransport`]
//! with identical external behavior; callers never branch on the platform.
//!
//! Every call is synchronous and blocks until Illustrator responds. A
//! handle is owned by exactly one [`DocumentSession`](crate::session::DocumentSession)
//! and is never shared across threads; no operation is re-entrant against a
//! second in-flight command on the same handle.

use std::path::{Path, PathBuf};

use crate::export::ExportSpec;
use crate::types::{BridgeError, ConnectionInfo};

/// Uniform command surface over a connected Illustrator instance.
pub trait IllustratorTransport {
    /// Filesystem path of the active document, `None` for a document that
    /// has never been saved.
    fn document_path(&self) -> Result<Option<PathBuf>, BridgeError>;

    /// Name of the active document, `None` when no document is open. Also
    /// serves as the liveness probe after connecting.
    fn active_document_name(&self) -> Result<Option<String>, BridgeError>;

    /// Save the active document to `path` in Illustrator's native format.
    fn save_as(&self, path: &Path) -> Result<(), BridgeError>;

    /// Open the scene file at `path`.
    fn open(&self, path: &Path) -> Result<(), BridgeError>;

    /// Export the active document to `path` using a resolved export row.
    fn export(&self, path: &Path, spec: &ExportSpec) -> Result<(), BridgeError>;

    /// Application version string.
    fn version(&self) -> Result<String, BridgeError>;

    /// Endpoint metadata for status output.
    fn connection_info(&self) -> ConnectionInfo;
}

/// Swap a path's extension for a format override like ".png".
///
/// "foo.ai" + ".png" -> "foo.png". The override may be given with or
/// without the leading dot.
pub fn replace_extension(path: &Path, format_override: &str) -> PathBuf {
    path.with_extension(format_override.trim_start_matches('.'))
}

/// Strip exactly one trailing line terminator from script output.
///
/// `osascript` terminates its result with a single newline; anything
/// beyond that belongs to the result itself and is preserved.
pub fn strip_line_terminator(output: &str) -> &str {
    let without_lf = output.strip_suffix('\n').unwrap_or(output);
    without_lf.strip_suffix('\r').unwrap_or(without_lf)
}

/// Escape a string for interpolation into a double-quoted AppleScript
/// literal.
pub fn escape_script_text(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
