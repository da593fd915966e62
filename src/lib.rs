//! Illustrator Bridge - drive a running Adobe Illustrator instance from
//! pipeline tools.
//!
//! This crate connects to Illustrator through whichever automation channel
//! the platform offers - COM on Windows, AppleScript on macOS - and
//! exposes one uniform command surface: query the active document, save,
//! open, export rasters/vectors, and read the application version. It also
//! installs the menu-extension panel that puts pipeline commands into
//! Illustrator's UI.
//!
//! # Quick Start
//!
//! ```no_run
//! use illustrator_bridge::{Config, DocumentSession, LogNotifier};
//! use std::path::Path;
//!
//! let config = Config::default();
//! match DocumentSession::connect(&config, Box::new(LogNotifier)) {
//!     Ok(session) => {
//!         println!("Illustrator {}", session.app_version());
//!         session.export_image(Path::new("/renders/shot_010.png"));
//!     }
//!     Err(e) => eprintln!("Connection failed: {}", e),
//! }
//! ```
//!
//! # Modules
//!
//! - [`session`]: The owned connection and its operation boundary
//! - [`transport`]: The command surface both platform channels implement
//! - [`dispatch`]: Automation-endpoint discovery and version selection
//! - [`export`]: Extension -> export format/options table
//! - [`integration`]: Menu-extension panel installer
//! - [`config`]: TOML configuration with runtime defaults
//! - [`platform`]: COM and AppleScript channels - only compiled on their
//!   own platform
//!
//! On platforms with no automation channel, [`DocumentSession::connect`]
//! returns an error instead of a session.

pub mod config;
pub mod dispatch;
pub mod export;
pub mod integration;
pub mod platform;
pub mod session;
pub mod transport;
pub mod types;

pub use config::Config;
pub use export::{ExportFormat, ExportSpec, OptionValue};
pub use integration::{IntegrationInstaller, InstallError};
pub use session::{DocumentSession, LogNotifier, Notify};
pub use transport::IllustratorTransport;
pub use types::{scene_file_filter, BridgeError, ConnectionInfo};
