// Configuration module: run parameters with built-in defaults, overridable
// through `DRIVEUP_*` environment variables so nothing has to be recompiled
// to point the tool at another folder or destination.

use std::path::PathBuf;

use crate::auth::FileTokenStore;

/// Folder uploaded when `DRIVEUP_SOURCE_DIR` is not set.
pub const DEFAULT_SOURCE_DIR: &str = "24001602015_24001602028";

/// Destination Drive folder used when `DRIVEUP_DEST_FOLDER_ID` is not set.
pub const DEFAULT_DEST_FOLDER_ID: &str = "1BC_X8SxU-Xw8OL7x4-bGeb7YjptE7Xkm";

/// Google API endpoint. Overridable mostly for pointing the client at a
/// stand-in server.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com";

/// OAuth client file exported from the developer console.
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";

/// Everything a run needs to know.
#[derive(Debug, Clone)]
pub struct Config {
    /// Local directory tree to upload.
    pub source_dir: PathBuf,
    /// Id of the Drive folder the new top-level folder is created under.
    pub dest_folder_id: String,
    /// Base URL for Drive API calls, without a trailing slash.
    pub api_base_url: String,
    /// Path to the OAuth client secrets file.
    pub credentials_path: PathBuf,
    /// Path to the cached token file.
    pub token_path: PathBuf,
}

impl Config {
    /// Read the configuration from `DRIVEUP_*` environment variables,
    /// falling back to the built-in defaults.
    pub fn from_env() -> Self {
        let source_dir =
            std::env::var("DRIVEUP_SOURCE_DIR").unwrap_or_else(|_| DEFAULT_SOURCE_DIR.into());
        let dest_folder_id = std::env::var("DRIVEUP_DEST_FOLDER_ID")
            .unwrap_or_else(|_| DEFAULT_DEST_FOLDER_ID.into());
        let api_base_url =
            std::env::var("DRIVEUP_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());
        let credentials_path = std::env::var("DRIVEUP_CREDENTIALS")
            .unwrap_or_else(|_| DEFAULT_CREDENTIALS_PATH.into());
        let token_path = std::env::var("DRIVEUP_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| FileTokenStore::default_path());
        Config {
            source_dir: PathBuf::from(source_dir),
            dest_folder_id,
            api_base_url,
            credentials_path: PathBuf::from(credentials_path),
            token_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the process-global environment is only touched from
    // one place.
    #[test]
    fn env_overrides_and_defaults() {
        for var in [
            "DRIVEUP_SOURCE_DIR",
            "DRIVEUP_DEST_FOLDER_ID",
            "DRIVEUP_API_BASE_URL",
            "DRIVEUP_CREDENTIALS",
            "DRIVEUP_TOKEN_FILE",
        ] {
            std::env::remove_var(var);
        }

        let config = Config::from_env();
        assert_eq!(config.source_dir, PathBuf::from(DEFAULT_SOURCE_DIR));
        assert_eq!(config.dest_folder_id, DEFAULT_DEST_FOLDER_ID);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(
            config.credentials_path,
            PathBuf::from(DEFAULT_CREDENTIALS_PATH)
        );

        std::env::set_var("DRIVEUP_SOURCE_DIR", "/tmp/tree");
        std::env::set_var("DRIVEUP_DEST_FOLDER_ID", "dest42");
        std::env::set_var("DRIVEUP_API_BASE_URL", "http://localhost:9999");

        let config = Config::from_env();
        assert_eq!(config.source_dir, PathBuf::from("/tmp/tree"));
        assert_eq!(config.dest_folder_id, "dest42");
        assert_eq!(config.api_base_url, "http://localhost:9999");

        for var in [
            "DRIVEUP_SOURCE_DIR",
            "DRIVEUP_DEST_FOLDER_ID",
            "DRIVEUP_API_BASE_URL",
        ] {
            std::env::remove_var(var);
        }
    }
}
