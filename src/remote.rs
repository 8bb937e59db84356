// Remote service contract: the three operations the uploader needs from a
// Drive-like storage backend, behind a trait so tests can swap in an
// in-memory fake instead of a live service.

use reqwest::StatusCode;
use thiserror::Error;

/// A folder that exists on the remote side. The id is an opaque identifier
/// assigned by the service; the name is only used for lookup and display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFolder {
    pub id: String,
    pub name: String,
}

/// Failure talking to the remote service. Any variant aborts the run; there
/// is no retry layer.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never produced a usable response (connection, TLS, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{op} failed: {status} - {body}")]
    Api {
        op: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The service answered with success but the response was missing a
    /// field we need (e.g. the resumable session URI).
    #[error("{op} response missing {field}")]
    Malformed {
        op: &'static str,
        field: &'static str,
    },
}

/// Minimal storage backend surface used by `Uploader`.
pub trait RemoteStore {
    /// Look up an existing, non-trashed child folder with the given name
    /// under `parent_id`. Returns the first match, if any.
    fn find_child_folder(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<Option<RemoteFolder>, RemoteError>;

    /// Create a new folder named `name` under `parent_id`.
    fn create_folder(&self, parent_id: &str, name: &str) -> Result<RemoteFolder, RemoteError>;

    /// Create a new file named `name` under `parent_id` with the given byte
    /// content. Returns the new file's id. No existence check is performed;
    /// calling this twice creates two files.
    fn create_file(
        &self,
        parent_id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<String, RemoteError>;
}
