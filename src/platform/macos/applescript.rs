//! AppleScript transport.
//!
//! Commands are rendered into AppleScript and piped to `osascript` over
//! stdin; the exit status signals success, stdout carries the single-line
//! result (one trailing line terminator stripped), and stderr carries the
//! error text surfaced to the user unchanged.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::export::ExportSpec;
use crate::transport::{escape_script_text, strip_line_terminator, IllustratorTransport};
use crate::types::{BridgeError, ConnectionInfo};

/// Run a script through `osascript` and return its textual result.
pub fn run_osascript(script: &str) -> Result<String, BridgeError> {
    let mut child = Command::new("osascript")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| BridgeError::TransportFailure(format!("Failed to run osascript: {}", e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(script.as_bytes())
            .map_err(|e| BridgeError::TransportFailure(format!("Failed to send script: {}", e)))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| BridgeError::TransportFailure(format!("Failed to run osascript: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BridgeError::TransportFailure(stderr.trim().to_string()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(strip_line_terminator(&stdout).to_string())
}

/// Transport addressing Illustrator by application name through the
/// script channel.
pub struct AppleScriptTransport {
    app_name: String,
}

impl AppleScriptTransport {
    /// Bring the application to the foreground and bind to it.
    pub fn activate(app_name: String) -> Result<Self, BridgeError> {
        let script = format!(
            r#"
            tell application "{}"
                activate
            end tell
            "#,
            escape_script_text(&app_name)
        );
        run_osascript(&script)?;
        Ok(AppleScriptTransport { app_name })
    }

    fn tell(&self, body: &str) -> Result<String, BridgeError> {
        let script = format!(
            "tell application \"{}\"\n{}\nend tell\n",
            escape_script_text(&self.app_name),
            body
        );
        run_osascript(&script)
    }
}

impl IllustratorTransport for AppleScriptTransport {
    fn document_path(&self) -> Result<Option<PathBuf>, BridgeError> {
        let result = self.tell(
            r#"
            set fpath to file path of current document
            if fpath is missing value then
                return ""
            else
                return POSIX path of fpath
            end if
            "#,
        )?;
        if result.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PathBuf::from(result)))
        }
    }

    fn active_document_name(&self) -> Result<Option<String>, BridgeError> {
        let result = self.tell(
            r#"
            if (count of documents) > 0 then
                return name of current document
            else
                return ""
            end if
            "#,
        )?;
        if result.is_empty() {
            Ok(None)
        } else {
            Ok(Some(result))
        }
    }

    fn save_as(&self, path: &Path) -> Result<(), BridgeError> {
        let body = format!(
            r#"save current document in POSIX file "{}" as Illustrator"#,
            escape_script_text(&path.to_string_lossy())
        );
        self.tell(&body)?;
        Ok(())
    }

    fn open(&self, path: &Path) -> Result<(), BridgeError> {
        let body = format!(
            r#"open POSIX file "{}""#,
            escape_script_text(&path.to_string_lossy())
        );
        self.tell(&body)?;
        Ok(())
    }

    fn export(&self, path: &Path, spec: &ExportSpec) -> Result<(), BridgeError> {
        let body = format!(
            r#"export current document to POSIX file "{}" as {} with options {{{}}}"#,
            escape_script_text(&path.to_string_lossy()),
            spec.format.applescript_type(),
            spec.applescript_options()
        );
        self.tell(&body)?;
        Ok(())
    }

    fn version(&self) -> Result<String, BridgeError> {
        self.tell("return application version")
    }

    fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo::new(&self.app_name, None, "applescript")
    }
}
