//! CLI entry point for the Illustrator bridge.
//!
//! This binary gives pipeline scripts command-line access to a running
//! Illustrator instance.
//!
//! # Usage
//!
//! ```bash
//! # Connect and print endpoint + version
//! ai-bridge --connect
//!
//! # Path of the active document
//! ai-bridge --doc-path
//!
//! # Save the active document, optionally forcing a format
//! ai-bridge --save /scenes/shot_010.ai
//! ai-bridge --save /scenes/shot_010.ai .png
//!
//! # Export the active document
//! ai-bridge --export /renders/shot_010_v001.png
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use illustrator_bridge::integration::IntegrationInstaller;
use illustrator_bridge::{export, Config, DocumentSession, LogNotifier};

/// CLI command to execute
#[derive(Debug, Clone, PartialEq)]
enum Command {
    /// Connect and print connection metadata
    Connect,
    /// Print the path of the active document
    DocPath,
    /// Save the active document, with an optional format override
    Save(PathBuf, Option<String>),
    /// Open a scene file; the flag forces non-scene formats through
    Open(PathBuf, bool),
    /// Export the active document
    Export(PathBuf),
    /// Export a temporary thumbnail and print its path
    Thumbnail,
    /// List supported export extensions
    Formats,
    /// Discovered Illustrator install directories
    LocateApps,
    /// Install the menu panel from a resource dir, optionally into a
    /// specific install dir
    Install(PathBuf, Option<PathBuf>),
    /// Remove the menu panel from an install dir
    Uninstall(PathBuf),
    /// Show help message
    Help,
}

/// Parse command line arguments and return the command to execute
fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        return Ok(Command::Help);
    }

    match args[1].as_str() {
        "--connect" | "-c" => Ok(Command::Connect),
        "--doc-path" | "-p" => Ok(Command::DocPath),
        "--save" | "-s" => {
            if args.len() < 3 {
                return Err("--save requires a target path (e.g. --save /scenes/shot.ai [.png])".into());
            }
            Ok(Command::Save(
                PathBuf::from(&args[2]),
                args.get(3).cloned(),
            ))
        }
        "--open" | "-o" => {
            if args.len() < 3 {
                return Err("--open requires a scene path (e.g. --open /scenes/shot.ai [--force])".into());
            }
            let force = args.get(3).map(|a| a == "--force").unwrap_or(false);
            Ok(Command::Open(PathBuf::from(&args[2]), force))
        }
        "--export" | "-e" => {
            if args.len() < 3 {
                return Err("--export requires an output path (e.g. --export /renders/out.png)".into());
            }
            Ok(Command::Export(PathBuf::from(&args[2])))
        }
        "--thumbnail" | "-t" => Ok(Command::Thumbnail),
        "--formats" | "-f" => Ok(Command::Formats),
        "--locate-apps" => Ok(Command::LocateApps),
        "--install" => {
            if args.len() < 3 {
                return Err("--install requires the panel resource dir (e.g. --install ./panel [install dir])".into());
            }
            Ok(Command::Install(
                PathBuf::from(&args[2]),
                args.get(3).map(PathBuf::from),
            ))
        }
        "--uninstall" => {
            if args.len() < 3 {
                return Err("--uninstall requires the Illustrator install dir".into());
            }
            Ok(Command::Uninstall(PathBuf::from(&args[2])))
        }
        "--help" | "-h" => Ok(Command::Help),
        arg => Err(format!("Unknown argument: {}", arg)),
    }
}

/// Print help message to stdout
fn print_help() {
    println!("ai-bridge - Drive a running Adobe Illustrator instance from pipeline tools");
    println!();
    println!("USAGE:");
    println!("    ai-bridge [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --connect                  Connect and print endpoint + version");
    println!("    -p, --doc-path                 Print the path of the active document");
    println!("    -s, --save <PATH> [EXT]        Save the active document, optionally as EXT");
    println!("    -o, --open <PATH> [--force]    Open a scene file");
    println!("    -e, --export <PATH>            Export the active document");
    println!("    -t, --thumbnail                Export a temporary thumbnail, print its path");
    println!("    -f, --formats                  List supported export extensions");
    println!("        --locate-apps              Print discovered Illustrator install dirs");
    println!("        --install <RES> [DIR]      Install the menu panel");
    println!("        --uninstall <DIR>          Remove the menu panel");
    println!("    -h, --help                     Print this help message");
    println!();
    println!("OUTPUT:");
    println!("    Results are JSON formatted to stdout.");
    println!("    Errors are written to stderr.");
}

fn load_config() -> Config {
    match Config::default_path() {
        Some(path) => Config::load_or_default(&path),
        None => Config::default(),
    }
}

fn connect_session(config: &Config) -> Result<DocumentSession, i32> {
    match DocumentSession::connect(config, Box::new(LogNotifier)) {
        Ok(session) => Ok(session),
        Err(e) => {
            eprintln!("Connection failed: {}", e);
            Err(1)
        }
    }
}

fn handle_connect(config: &Config) -> i32 {
    let session = match connect_session(config) {
        Ok(session) => session,
        Err(code) => return code,
    };

    let info = session.connection_info();
    let output = serde_json::json!({
        "connected": true,
        "endpoint": info.endpoint,
        "transport": info.transport,
        "version": session.app_version(),
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap());
    0
}

fn handle_doc_path(config: &Config) -> i32 {
    let session = match connect_session(config) {
        Ok(session) => session,
        Err(code) => return code,
    };

    let path = session.current_document_path();
    let output = serde_json::json!({
        "path": path,
        "has_document": !path.is_empty(),
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap());
    0
}

fn handle_save(config: &Config, path: &Path, format_override: Option<&str>) -> i32 {
    let session = match connect_session(config) {
        Ok(session) => session,
        Err(code) => return code,
    };

    if session.save_as(path, format_override) {
        println!(
            "{}",
            serde_json::json!({ "saved": true, "path": path.display().to_string() })
        );
        0
    } else {
        eprintln!("Save failed: {}", path.display());
        1
    }
}

fn handle_open(config: &Config, path: &Path, force: bool) -> i32 {
    let session = match connect_session(config) {
        Ok(session) => session,
        Err(code) => return code,
    };

    if session.open(path, force) {
        println!(
            "{}",
            serde_json::json!({ "opened": true, "path": path.display().to_string() })
        );
        0
    } else {
        eprintln!(
            "Open failed: {} (scene formats: {})",
            path.display(),
            session.scene_formats().join(" ")
        );
        1
    }
}

fn handle_export(config: &Config, path: &Path) -> i32 {
    let session = match connect_session(config) {
        Ok(session) => session,
        Err(code) => return code,
    };

    if session.export_image(path) {
        println!(
            "{}",
            serde_json::json!({ "exported": true, "path": path.display().to_string() })
        );
        0
    } else {
        eprintln!("Export failed: {}", path.display());
        1
    }
}

fn handle_thumbnail(config: &Config) -> i32 {
    let session = match connect_session(config) {
        Ok(session) => session,
        Err(code) => return code,
    };

    match session.capture_thumbnail() {
        Some(path) => {
            println!(
                "{}",
                serde_json::json!({ "thumbnail": path.display().to_string() })
            );
            0
        }
        None => {
            eprintln!("Thumbnail export failed");
            1
        }
    }
}

fn handle_formats() -> i32 {
    let output = serde_json::json!({
        "extensions": export::supported_extensions(),
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap());
    0
}

fn handle_locate_apps() -> i32 {
    let dirs: Vec<String> = illustrator_bridge::integration::installed_application_dirs()
        .into_iter()
        .map(|p| p.display().to_string())
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "install_dirs": dirs })).unwrap()
    );
    0
}

fn handle_install(resources: &Path, install_dir: Option<PathBuf>) -> i32 {
    let install_dir = match install_dir
        .or_else(|| illustrator_bridge::integration::installed_application_dirs().into_iter().next())
    {
        Some(dir) => dir,
        None => {
            eprintln!("No Illustrator install found; pass the install dir explicitly.");
            return 1;
        }
    };

    let installer = IntegrationInstaller::new(resources.to_path_buf(), default_tokens());
    match installer.install(&install_dir) {
        Ok(target) => {
            println!(
                "{}",
                serde_json::json!({ "installed": true, "panel": target.display().to_string() })
            );
            0
        }
        Err(e) => {
            eprintln!("Install failed: {}", e);
            1
        }
    }
}

fn handle_uninstall(install_dir: &Path) -> i32 {
    let installer = IntegrationInstaller::new(PathBuf::new(), Vec::new());
    match installer.remove(install_dir) {
        Ok(removed) => {
            println!("{}", serde_json::json!({ "removed": removed }));
            0
        }
        Err(e) => {
            eprintln!("Uninstall failed: {}", e);
            1
        }
    }
}

/// Tokens rewritten inside the installed panel sources.
fn default_tokens() -> Vec<(String, String)> {
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .unwrap_or_default();
    vec![(
        "BRIDGEROOT".to_string(),
        exe_dir.to_string_lossy().replace('\\', "/"),
    )]
}

fn main() {
    env_logger::init();

    log::debug!("ai-bridge starting");

    let command = match parse_args() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information.");
            process::exit(1);
        }
    };

    log::debug!("Executing command: {:?}", command);

    let config = load_config();

    let exit_code = match command {
        Command::Connect => handle_connect(&config),
        Command::DocPath => handle_doc_path(&config),
        Command::Save(path, ext) => handle_save(&config, &path, ext.as_deref()),
        Command::Open(path, force) => handle_open(&config, &path, force),
        Command::Export(path) => handle_export(&config, &path),
        Command::Thumbnail => handle_thumbnail(&config),
        Command::Formats => handle_formats(),
        Command::LocateApps => handle_locate_apps(),
        Command::Install(resources, dir) => handle_install(&resources, dir),
        Command::Uninstall(dir) => handle_uninstall(&dir),
        Command::Help => {
            print_help();
            0
        }
    };

    log::debug!("Exiting with code: {}", exit_code);

    process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_equality() {
        assert_eq!(Command::Connect, Command::Connect);
        assert_eq!(
            Command::Save(PathBuf::from("a.ai"), Some(".png".to_string())),
            Command::Save(PathBuf::from("a.ai"), Some(".png".to_string())),
        );
        assert_ne!(Command::Formats, Command::Help);
    }
}
