// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) wires these modules together into the upload flow.
//
// Module responsibilities:
// - `config`: Runtime settings read from environment variables, with
//   the defaults baked in.
// - `auth`: OAuth client secrets, the token cache on disk, and the
//   interactive / refresh flows that produce an access token.
// - `remote`: The `RemoteStore` trait describing the three calls the
//   uploader needs, plus the shared error type.
// - `api`: The Google Drive implementation of `RemoteStore` over HTTP.
// - `upload`: Walks a local directory tree and mirrors it through any
//   `RemoteStore`.
//
// Keeping the uploader behind the `remote` trait makes it easy to test
// the tree logic against an in-memory backend instead of real HTTP.
pub mod api;
pub mod auth;
pub mod config;
pub mod remote;
pub mod upload;
