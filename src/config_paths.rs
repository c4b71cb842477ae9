//! Where the options file and logs live
//!
//! - Unix/macOS: `$XDG_CONFIG_HOME/format-on-save/` or `~/.config/format-on-save/`
//! - Windows: `%APPDATA%\format-on-save\`

use std::path::PathBuf;

const APP_DIR: &str = "format-on-save";

/// Base directory for the options file and logs
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let base = std::env::var_os("APPDATA").map(PathBuf::from);

    #[cfg(not(target_os = "windows"))]
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

    base.map(|base| base.join(APP_DIR))
}

/// Default options file
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// Create the log directory if needed and return it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = config_dir()
        .ok_or_else(|| "No config directory available".to_string())?
        .join("logs");
    std::fs::create_dir_all(&logs)
        .map_err(|e| format!("Failed to create directory {}: {}", logs.display(), e))?;
    Ok(logs)
}
