//! Platform-specific transports.
//!
//! Windows drives Illustrator over COM automation; macOS over an
//! AppleScript execution channel. Each module is only compiled on its own
//! platform; everything platform-neutral (candidate selection, the export
//! table, session semantics) lives outside this tree so it builds and
//! tests everywhere.

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;
