// Drive API client module: a small blocking HTTP client for the handful of
// Drive v3 calls the uploader needs (folder lookup, folder create, file
// upload). It is intentionally synchronous; every call blocks until the
// service answers.

use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use serde::{Deserialize, Serialize};

use crate::remote::{RemoteError, RemoteFolder, RemoteStore};

/// MIME type Drive uses to mark an entry as a folder.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Client holding a reqwest blocking client, the API base URL and the
/// bearer token for authenticated calls.
pub struct DriveClient {
    client: Client,
    base_url: String,
    token: String,
}

/// Metadata body for `files.create`. Folders carry the folder MIME type;
/// plain files leave it unset and let the service decide.
#[derive(Serialize)]
struct FileMetadata<'a> {
    name: &'a str,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    parents: Vec<&'a str>,
}

/// Slice of a Drive file resource we care about.
#[derive(Deserialize)]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
}

/// Response shape of `files.list`.
#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

impl DriveClient {
    /// Create a client for the given API base URL (no trailing slash) and
    /// OAuth access token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, RemoteError> {
        let client = Client::builder().build()?;
        Ok(DriveClient {
            client,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Escape a value for interpolation into a Drive search query. Drive uses
/// single-quoted strings with backslash escapes.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Search query matching a non-trashed child folder by name.
fn child_folder_query(parent_id: &str, name: &str) -> String {
    format!(
        "name='{}' and '{}' in parents and mimeType='{}' and trashed=false",
        escape_query_value(name),
        escape_query_value(parent_id),
        FOLDER_MIME_TYPE
    )
}

/// Turn a non-success response into an `Api` error carrying the status and
/// whatever body text the service returned.
fn check(op: &'static str, res: Response) -> Result<Response, RemoteError> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status();
    let body = res.text().unwrap_or_else(|_| "".into());
    Err(RemoteError::Api { op, status, body })
}

impl RemoteStore for DriveClient {
    fn find_child_folder(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<Option<RemoteFolder>, RemoteError> {
        let res = self
            .client
            .get(self.url("/drive/v3/files"))
            .bearer_auth(&self.token)
            .query(&[
                ("q", child_folder_query(parent_id, name).as_str()),
                ("fields", "files(id, name)"),
            ])
            .send()?;
        let res = check("folder lookup", res)?;
        let list: FileList = res.json()?;
        Ok(list
            .files
            .into_iter()
            .next()
            .map(|f| RemoteFolder { id: f.id, name: f.name }))
    }

    fn create_folder(&self, parent_id: &str, name: &str) -> Result<RemoteFolder, RemoteError> {
        let metadata = FileMetadata {
            name,
            mime_type: Some(FOLDER_MIME_TYPE),
            parents: vec![parent_id],
        };
        let res = self
            .client
            .post(self.url("/drive/v3/files"))
            .bearer_auth(&self.token)
            .query(&[("fields", "id")])
            .json(&metadata)
            .send()?;
        let res = check("folder create", res)?;
        let created: DriveFile = res.json()?;
        Ok(RemoteFolder {
            id: created.id,
            name: name.to_string(),
        })
    }

    fn create_file(
        &self,
        parent_id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<String, RemoteError> {
        // Two-step resumable upload: POST the metadata to open a session,
        // then PUT the bytes to the session URI from the Location header.
        let metadata = FileMetadata {
            name,
            mime_type: None,
            parents: vec![parent_id],
        };
        let res = self
            .client
            .post(self.url("/upload/drive/v3/files"))
            .bearer_auth(&self.token)
            .query(&[("uploadType", "resumable"), ("fields", "id")])
            .json(&metadata)
            .send()?;
        let res = check("upload start", res)?;
        let session_uri = res
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .ok_or(RemoteError::Malformed {
                op: "upload start",
                field: "Location header",
            })?;

        let res = self
            .client
            .put(&session_uri)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content.to_vec())
            .send()?;
        let res = check("upload", res)?;
        let uploaded: DriveFile = res.json()?;
        Ok(uploaded.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape_query_value("plain"), "plain");
        assert_eq!(escape_query_value("it's"), "it\\'s");
        assert_eq!(escape_query_value("a\\b"), "a\\\\b");
        assert_eq!(escape_query_value("'"), "\\'");
    }

    #[test]
    fn builds_child_folder_query() {
        let q = child_folder_query("abc123", "reports");
        assert_eq!(
            q,
            "name='reports' and 'abc123' in parents and \
             mimeType='application/vnd.google-apps.folder' and trashed=false"
        );
    }

    #[test]
    fn query_embeds_escaped_name() {
        let q = child_folder_query("abc123", "bob's files");
        assert!(q.starts_with("name='bob\\'s files' and"));
    }

    #[test]
    fn folder_metadata_serializes_mime_type() {
        let metadata = FileMetadata {
            name: "sub",
            mime_type: Some(FOLDER_MIME_TYPE),
            parents: vec!["root1"],
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["name"], "sub");
        assert_eq!(json["mimeType"], FOLDER_MIME_TYPE);
        assert_eq!(json["parents"][0], "root1");
    }

    #[test]
    fn file_metadata_omits_mime_type() {
        let metadata = FileMetadata {
            name: "a.txt",
            mime_type: None,
            parents: vec!["f1"],
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert!(json.get("mimeType").is_none());
    }
}
