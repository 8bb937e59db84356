// Credential module: obtains a valid OAuth access token for the Drive API.
// The usual installed-app ladder: use the cached token file if still valid,
// silently refresh it when expired, and fall back to a one-time interactive
// browser authorization when there is nothing to refresh.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use dialoguer::Input;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// OAuth scope: per-file access to files created or opened by this app.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// Redirect target for the installed-app flow. The browser will fail to
/// load it; the user copies the `code` parameter out of the address bar.
const REDIRECT_URI: &str = "http://localhost";

/// Refresh this long before the nominal expiry so a token does not lapse
/// mid-upload.
const EXPIRY_SLACK_SECS: i64 = 60;

/// OAuth client identity, read from the JSON file the developer console
/// exports for a desktop application.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".into()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

/// On-disk layout of the exported file: `{"installed": { ... }}`.
#[derive(Deserialize)]
struct SecretsFile {
    installed: ClientSecrets,
}

/// Load the OAuth client file, with setup instructions when it is missing.
pub fn load_client_secrets(path: &Path) -> Result<ClientSecrets> {
    if !path.exists() {
        bail!(
            "OAuth client file not found: {}\n\
             To create one:\n\
             1. Go to https://console.cloud.google.com/\n\
             2. Create a new project or select an existing one\n\
             3. Enable the Google Drive API\n\
             4. Create OAuth 2.0 credentials (Desktop app)\n\
             5. Download the JSON and save it as {}",
            path.display(),
            path.display()
        );
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed: SecretsFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(parsed.installed)
}

/// Cached OAuth tokens, persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Whether the access token needs refreshing. A token with no recorded
    /// expiry is treated as expired.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Utc::now() + Duration::seconds(EXPIRY_SLACK_SECS) >= at,
            None => true,
        }
    }
}

/// Storage for the cached token. The uploader never touches this directly;
/// swapping the file for another backend only changes what is passed to
/// `obtain_access_token`.
pub trait CredentialStore {
    fn load(&self) -> Result<Option<StoredToken>>;
    fn save(&self, token: &StoredToken) -> Result<()>;
}

/// Token cache in a JSON file, by default in the user's home directory.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        FileTokenStore { path }
    }

    /// Default cache location in the user's home directory.
    pub fn default_path() -> PathBuf {
        let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        dir.join(".driveup_token.json")
    }
}

impl CredentialStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredToken>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let token = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(Some(token))
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        let text = serde_json::to_string_pretty(token)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

/// Token endpoint response, shared by the refresh and the code exchange.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Build the token to cache. A refresh response usually omits the refresh
/// token, so the previous one is carried over.
fn token_to_store(response: TokenResponse, previous_refresh: Option<String>) -> StoredToken {
    StoredToken {
        access_token: response.access_token,
        refresh_token: response.refresh_token.or(previous_refresh),
        expires_at: response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs)),
    }
}

/// Get a valid access token: cached if still valid, refreshed if possible,
/// otherwise via a one-time interactive authorization. Refreshed and newly
/// issued tokens are persisted through the store before returning.
pub fn obtain_access_token(
    secrets: &ClientSecrets,
    store: &impl CredentialStore,
) -> Result<String> {
    // A cache we cannot read is the same as no cache.
    let cached = store.load().unwrap_or(None);

    if let Some(token) = cached {
        if !token.is_expired() {
            return Ok(token.access_token);
        }
        if let Some(refresh) = token.refresh_token.clone() {
            let response = refresh_access_token(secrets, &refresh)?;
            let stored = token_to_store(response, Some(refresh));
            store.save(&stored)?;
            return Ok(stored.access_token);
        }
    }

    let stored = authorize_interactively(secrets)?;
    store.save(&stored)?;
    Ok(stored.access_token)
}

/// Authorization URL for the consent screen. `access_type=offline` asks for
/// a refresh token alongside the access token.
fn authorization_url(secrets: &ClientSecrets) -> Result<String> {
    let url = reqwest::Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("response_type", "code"),
            ("scope", DRIVE_SCOPE),
            ("access_type", "offline"),
        ],
    )
    .with_context(|| format!("Invalid auth_uri: {}", secrets.auth_uri))?;
    Ok(url.to_string())
}

/// Walk the user through the browser authorization, then exchange the
/// pasted code for tokens.
fn authorize_interactively(secrets: &ClientSecrets) -> Result<StoredToken> {
    let url = authorization_url(secrets)?;
    println!("Open this link in your browser and authorize access:");
    println!("{}", url);
    println!("After approving, copy the 'code' parameter from the address bar.");
    let code: String = Input::new()
        .with_prompt("Authorization code")
        .interact_text()?;
    let response = exchange_code(secrets, code.trim())?;
    Ok(token_to_store(response, None))
}

fn refresh_access_token(secrets: &ClientSecrets, refresh_token: &str) -> Result<TokenResponse> {
    let params = [
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];
    post_token_request(&secrets.token_uri, &params, "Token refresh")
}

fn exchange_code(secrets: &ClientSecrets, code: &str) -> Result<TokenResponse> {
    let params = [
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", REDIRECT_URI),
    ];
    post_token_request(&secrets.token_uri, &params, "Code exchange")
}

fn post_token_request(
    token_uri: &str,
    params: &[(&str, &str)],
    op: &str,
) -> Result<TokenResponse> {
    let client = Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let res = client
        .post(token_uri)
        .form(params)
        .send()
        .with_context(|| format!("{} request failed to send", op))?;
    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().unwrap_or_else(|_| "".into());
        bail!("{} failed: {} - {}", op, status, txt);
    }
    res.json().context("Parsing token response json")
}
