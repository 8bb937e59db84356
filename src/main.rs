// Entrypoint for the CLI application.
// - Keeps `main` small: read config, obtain an access token, build the
//   Drive client and hand everything to the uploader.
// - Returns `anyhow::Result` so any failure prints its error chain and
//   the process exits with a non-zero status.

use anyhow::bail;

use driveup_cli::api::DriveClient;
use driveup_cli::auth::{load_client_secrets, obtain_access_token, FileTokenStore};
use driveup_cli::config::Config;
use driveup_cli::upload::Uploader;

fn main() -> anyhow::Result<()> {
    // Settings come from DRIVEUP_* environment variables, with defaults
    // baked in. See `config::Config::from_env`.
    let config = Config::from_env();

    // Refuse before touching the network for a token.
    if !config.source_dir.is_dir() {
        bail!("source folder not found: {}", config.source_dir.display());
    }

    println!(
        "Uploading folder '{}' to Google Drive...",
        config.source_dir.display()
    );
    println!("Destination folder id: {}\n", config.dest_folder_id);

    let secrets = load_client_secrets(&config.credentials_path)?;
    let store = FileTokenStore::new(config.token_path.clone());
    let token = obtain_access_token(&secrets, &store)?;

    let drive = DriveClient::new(&config.api_base_url, token)?;
    let summary =
        Uploader::new(&drive).upload_tree(&config.source_dir, &config.dest_folder_id)?;

    println!(
        "Folder link: https://drive.google.com/drive/folders/{}",
        summary.folder_id
    );
    Ok(())
}
