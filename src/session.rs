//! Document session: the single owned connection to Illustrator.
//!
//! A [`DocumentSession`] is created once per process by [`DocumentSession::connect`]
//! and passed to every operation; there is no ambient global handle. The
//! lifecycle is absent -> connecting -> connected, and the handle lives
//! until the process exits.
//!
//! The session is also the operation boundary of the error design: every
//! fallible operation catches the underlying [`BridgeError`], surfaces a
//! user-facing message through [`Notify`], and returns a boolean or an
//! empty sentinel. Errors never escape to the host as panics.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::export;
use crate::transport::{replace_extension, IllustratorTransport};
use crate::types::{BridgeError, ConnectionInfo};

/// Sink for user-facing failure messages.
///
/// The hosting pipeline typically routes these into a modal dialog; the
/// bundled [`LogNotifier`] writes them to the error log instead.
pub trait Notify {
    fn popup(&self, message: &str);
}

/// Default notifier: user-facing messages go to the error log.
pub struct LogNotifier;

impl Notify for LogNotifier {
    fn popup(&self, message: &str) {
        log::error!("{}", message);
    }
}

/// The one live connection to Illustrator.
///
/// Owns the transport handle exclusively. Not shared across threads; all
/// operations block the calling thread until Illustrator responds.
pub struct DocumentSession {
    transport: Box<dyn IllustratorTransport>,
    scene_formats: Vec<String>,
    notifier: Box<dyn Notify>,
}

impl DocumentSession {
    /// Connect to a running (or launchable) Illustrator instance.
    ///
    /// On Windows this runs the dispatch-locator retry loop: candidates
    /// that fail to bind are added to a rejection set and discovery runs
    /// again without them. When no candidate remains the startup sequence
    /// aborts with a user-facing message and no partial state.
    pub fn connect(config: &Config, notifier: Box<dyn Notify>) -> Result<Self, BridgeError> {
        match connect_transport(config) {
            Ok(transport) => Ok(DocumentSession {
                transport,
                scene_formats: config.scene.formats.clone(),
                notifier,
            }),
            Err(err) => {
                notifier.popup("Could not connect to Illustrator.");
                Err(err)
            }
        }
    }

    /// Build a session around an existing transport. Hosts embedding a
    /// custom transport (and the test suite) enter here.
    pub fn with_transport(
        transport: Box<dyn IllustratorTransport>,
        scene_formats: Vec<String>,
        notifier: Box<dyn Notify>,
    ) -> Self {
        DocumentSession {
            transport,
            scene_formats,
            notifier,
        }
    }

    /// Path of the active document, or "" when there is no document, the
    /// document is unsaved, or the query fails. Never panics.
    pub fn current_document_path(&self) -> String {
        match self.transport.document_path() {
            Ok(Some(path)) => path.to_string_lossy().into_owned(),
            Ok(None) => String::new(),
            Err(err) => {
                log::warn!("could not read current document path: {}", err);
                String::new()
            }
        }
    }

    /// File name (no directory) of the active document, or "".
    pub fn current_document_name(&self) -> String {
        let path = self.current_document_path();
        if path.is_empty() {
            return path;
        }
        Path::new(&path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension of the active document, falling back to the first
    /// host-supplied scene format.
    pub fn scene_extension(&self) -> Option<String> {
        let current = self.current_document_path();
        if !current.is_empty() {
            if let Some(ext) = Path::new(&current).extension() {
                return Some(format!(".{}", ext.to_string_lossy()));
            }
        }
        self.scene_formats.first().cloned()
    }

    /// Save the active document to `path`.
    ///
    /// A `format_override` like ".png" replaces the path's extension
    /// before dispatch. Requires an active document; failures surface a
    /// message and return false.
    pub fn save_as(&self, path: &Path, format_override: Option<&str>) -> bool {
        match self.transport.active_document_name() {
            Ok(Some(_)) => {}
            Ok(None) => {
                self.notifier
                    .popup("There is no active document in Illustrator.");
                return false;
            }
            Err(err) => {
                log::warn!("active-document probe failed: {}", err);
                self.notifier
                    .popup("There is no active document in Illustrator.");
                return false;
            }
        }

        let target = match format_override {
            Some(fmt) => replace_extension(path, fmt),
            None => path.to_path_buf(),
        };

        match self.transport.save_as(&target) {
            Ok(()) => true,
            Err(err) => {
                self.notifier
                    .popup(&format!("Failed to save the document: {}", err));
                false
            }
        }
    }

    /// Open the scene file at `path`.
    ///
    /// Paths whose extension is outside the host's scene-format list are
    /// refused unless `force` is set.
    pub fn open(&self, path: &Path, force: bool) -> bool {
        if !force {
            let ext = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            let supported = self
                .scene_formats
                .iter()
                .any(|fmt| fmt.eq_ignore_ascii_case(&ext));
            if !supported {
                log::debug!(
                    "refusing to open {}: '{}' is not a scene format",
                    path.display(),
                    ext
                );
                return false;
            }
        }

        match self.transport.open(path) {
            Ok(()) => true,
            Err(err) => {
                self.notifier
                    .popup(&format!("Failed to open {}: {}", path.display(), err));
                false
            }
        }
    }

    /// Export the active document to `path`.
    ///
    /// The export table is consulted first; unsupported extensions fail
    /// without touching the transport. Success means the output file
    /// exists on disk after the call returns.
    pub fn export_image(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();

        let spec = match export::resolve(&ext) {
            Ok(spec) => spec,
            Err(err) => {
                self.notifier.popup(&err.to_string());
                return false;
            }
        };

        if let Err(err) = self.transport.export(path, &spec) {
            self.notifier
                .popup(&format!("Failed to export the image: {}", err));
            return false;
        }

        if path.exists() {
            true
        } else {
            self.notifier.popup(&format!(
                "Unknown error. Image file doesn't exist:\n\n{}",
                path.display()
            ));
            false
        }
    }

    /// Export a temporary JPEG of the active document and return its
    /// path. The caller owns (and deletes) the file.
    pub fn capture_thumbnail(&self) -> Option<PathBuf> {
        let path = std::env::temp_dir().join(format!(
            "illustrator_thumbnail_{}.jpg",
            std::process::id()
        ));
        if self.export_image(&path) {
            Some(path)
        } else {
            None
        }
    }

    /// Application version, or "" when the read fails.
    pub fn app_version(&self) -> String {
        match self.transport.version() {
            Ok(version) => version,
            Err(err) => {
                log::warn!("could not read application version: {}", err);
                String::new()
            }
        }
    }

    /// Metadata about the endpoint this session is bound to.
    pub fn connection_info(&self) -> ConnectionInfo {
        self.transport.connection_info()
    }

    /// Scene formats supplied by the host.
    pub fn scene_formats(&self) -> &[String] {
        &self.scene_formats
    }
}

#[cfg(target_os = "windows")]
fn connect_transport(config: &Config) -> Result<Box<dyn IllustratorTransport>, BridgeError> {
    use crate::dispatch;
    use crate::platform::windows::com::ComTransport;
    use std::collections::HashSet;

    let mut rejected: HashSet<String> = HashSet::new();
    loop {
        let candidate = dispatch::env_override()
            .or_else(|| config.connection.dispatch_name.clone())
            .or_else(|| dispatch::resolve(&rejected));

        let Some(name) = candidate else {
            return Err(BridgeError::DiscoveryExhausted(
                "no automation endpoint for Illustrator is registered".to_string(),
            ));
        };

        // A forced identifier comes back unchanged on every pass; seeing a
        // rejected name again means the candidate set is spent.
        if rejected.contains(&name) {
            return Err(BridgeError::DiscoveryExhausted(format!(
                "every candidate endpoint failed (last: {})",
                name
            )));
        }

        match ComTransport::connect(&name) {
            Ok(transport) => {
                log::debug!("Using {}", name);
                return Ok(Box::new(transport));
            }
            Err(err) => {
                log::warn!("dispatch candidate {} rejected: {}", name, err);
                rejected.insert(name);
            }
        }
    }
}

#[cfg(target_os = "macos")]
fn connect_transport(config: &Config) -> Result<Box<dyn IllustratorTransport>, BridgeError> {
    use crate::platform::macos::{discovery, AppleScriptTransport};

    let app_name = config
        .connection
        .app_name
        .clone()
        .unwrap_or_else(discovery::find_app_name);
    let transport = AppleScriptTransport::activate(app_name)?;
    Ok(Box::new(transport))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn connect_transport(_config: &Config) -> Result<Box<dyn IllustratorTransport>, BridgeError> {
    Err(BridgeError::TransportFailure(
        "Unsupported platform".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportSpec;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Scripted transport: answers from canned state and records every
    /// call that reaches it.
    struct MockTransport {
        document: Option<(String, Option<PathBuf>)>,
        fail_document_path: bool,
        fail_save: bool,
        write_on_export: bool,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl MockTransport {
        fn new(calls: Rc<RefCell<Vec<String>>>) -> Self {
            MockTransport {
                document: Some((
                    "shot_010.ai".to_string(),
                    Some(PathBuf::from("/scenes/shot_010.ai")),
                )),
                fail_document_path: false,
                fail_save: false,
                write_on_export: true,
                calls,
            }
        }
    }

    impl IllustratorTransport for MockTransport {
        fn document_path(&self) -> Result<Option<PathBuf>, BridgeError> {
            if self.fail_document_path {
                return Err(BridgeError::TransportFailure("boom".to_string()));
            }
            Ok(self.document.as_ref().and_then(|(_, path)| path.clone()))
        }

        fn active_document_name(&self) -> Result<Option<String>, BridgeError> {
            Ok(self.document.as_ref().map(|(name, _)| name.clone()))
        }

        fn save_as(&self, path: &Path) -> Result<(), BridgeError> {
            self.calls
                .borrow_mut()
                .push(format!("save_as {}", path.display()));
            if self.fail_save {
                Err(BridgeError::TransportFailure("disk full".to_string()))
            } else {
                Ok(())
            }
        }

        fn open(&self, path: &Path) -> Result<(), BridgeError> {
            self.calls
                .borrow_mut()
                .push(format!("open {}", path.display()));
            Ok(())
        }

        fn export(&self, path: &Path, spec: &ExportSpec) -> Result<(), BridgeError> {
            self.calls
                .borrow_mut()
                .push(format!("export {} {:?}", path.display(), spec.format));
            if self.write_on_export {
                std::fs::write(path, b"image").map_err(|e| {
                    BridgeError::TransportFailure(e.to_string())
                })?;
            }
            Ok(())
        }

        fn version(&self) -> Result<String, BridgeError> {
            Ok("28.0.0".to_string())
        }

        fn connection_info(&self) -> ConnectionInfo {
            ConnectionInfo::new("mock", None, "mock")
        }
    }

    struct CollectingNotifier {
        messages: Rc<RefCell<Vec<String>>>,
    }

    impl Notify for CollectingNotifier {
        fn popup(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }

    struct Harness {
        session: DocumentSession,
        calls: Rc<RefCell<Vec<String>>>,
        messages: Rc<RefCell<Vec<String>>>,
    }

    fn harness(tweak: impl FnOnce(&mut MockTransport)) -> Harness {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let messages = Rc::new(RefCell::new(Vec::new()));
        let mut transport = MockTransport::new(calls.clone());
        tweak(&mut transport);
        let session = DocumentSession::with_transport(
            Box::new(transport),
            vec![".ai".to_string(), ".ait".to_string()],
            Box::new(CollectingNotifier {
                messages: messages.clone(),
            }),
        );
        Harness {
            session,
            calls,
            messages,
        }
    }

    #[test]
    fn test_current_document_path() {
        let h = harness(|_| {});
        assert_eq!(h.session.current_document_path(), "/scenes/shot_010.ai");
        assert_eq!(h.session.current_document_name(), "shot_010.ai");
    }

    #[test]
    fn test_current_document_path_is_empty_without_document() {
        let h = harness(|t| t.document = None);
        assert_eq!(h.session.current_document_path(), "");
        assert_eq!(h.session.current_document_name(), "");
    }

    #[test]
    fn test_current_document_path_is_empty_on_transport_error() {
        let h = harness(|t| t.fail_document_path = true);
        assert_eq!(h.session.current_document_path(), "");
        // errors are logged, not surfaced as popups
        assert!(h.messages.borrow().is_empty());
    }

    #[test]
    fn test_scene_extension_prefers_current_document() {
        let h = harness(|_| {});
        assert_eq!(h.session.scene_extension().as_deref(), Some(".ai"));

        let unsaved = harness(|t| t.document = Some(("Untitled-1".to_string(), None)));
        assert_eq!(unsaved.session.scene_extension().as_deref(), Some(".ai"));
    }

    #[test]
    fn test_save_as_applies_format_override() {
        let h = harness(|_| {});
        assert!(h.session.save_as(Path::new("/out/foo.ai"), Some(".png")));
        assert_eq!(h.calls.borrow().as_slice(), ["save_as /out/foo.png"]);
    }

    #[test]
    fn test_save_as_without_override_keeps_path() {
        let h = harness(|_| {});
        assert!(h.session.save_as(Path::new("/out/foo.ai"), None));
        assert_eq!(h.calls.borrow().as_slice(), ["save_as /out/foo.ai"]);
    }

    #[test]
    fn test_save_as_requires_active_document() {
        let h = harness(|t| t.document = None);
        assert!(!h.session.save_as(Path::new("/out/foo.ai"), None));
        assert!(h.calls.borrow().is_empty(), "save must not reach the transport");
        assert_eq!(
            h.messages.borrow().as_slice(),
            ["There is no active document in Illustrator."]
        );
    }

    #[test]
    fn test_save_as_surfaces_transport_failure() {
        let h = harness(|t| t.fail_save = true);
        assert!(!h.session.save_as(Path::new("/out/foo.ai"), None));
        let messages = h.messages.borrow();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Failed to save the document:"));
    }

    #[test]
    fn test_open_rejects_foreign_extension() {
        let h = harness(|_| {});
        assert!(!h.session.open(Path::new("/scenes/shot.psd"), false));
        assert!(h.calls.borrow().is_empty());
    }

    #[test]
    fn test_open_force_overrides_format_check() {
        let h = harness(|_| {});
        assert!(h.session.open(Path::new("/scenes/shot.psd"), true));
        assert_eq!(h.calls.borrow().as_slice(), ["open /scenes/shot.psd"]);
    }

    #[test]
    fn test_open_accepts_scene_formats_case_insensitively() {
        let h = harness(|_| {});
        assert!(h.session.open(Path::new("/scenes/shot.AI"), false));
    }

    #[test]
    fn test_export_unsupported_extension_never_reaches_transport() {
        let h = harness(|_| {});
        assert!(!h.session.export_image(Path::new("/out/frame.bmp")));
        assert!(h.calls.borrow().is_empty());
        assert_eq!(
            h.messages.borrow().as_slice(),
            ["Unsupported export format: .bmp"]
        );
    }

    #[test]
    fn test_export_succeeds_when_output_exists() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frame.png");

        let h = harness(|_| {});
        assert!(h.session.export_image(&out));
        assert!(out.exists());
        assert_eq!(
            h.calls.borrow().as_slice(),
            [format!("export {} Png24", out.display())]
        );
    }

    #[test]
    fn test_export_fails_when_output_missing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frame.png");

        let h = harness(|t| t.write_on_export = false);
        assert!(!h.session.export_image(&out));
        let messages = h.messages.borrow();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("doesn't exist"));
    }

    #[test]
    fn test_capture_thumbnail_returns_temp_jpeg() {
        let h = harness(|_| {});
        let path = h.session.capture_thumbnail().expect("thumbnail export");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));
        assert!(path.exists());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_app_version() {
        let h = harness(|_| {});
        assert_eq!(h.session.app_version(), "28.0.0");
    }
}
