// Uploader module: mirrors a local directory tree into a remote folder.
// The top-level folder is always created fresh; subfolders are created
// lazily the first time a contained file needs them; hidden entries are
// skipped entirely.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::remote::{RemoteError, RemoteStore};

/// Errors the uploader can produce.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The source directory does not exist. Checked before any remote call.
    #[error("source folder not found: {0}")]
    SourceNotFound(PathBuf),

    /// The source path has no final component to name the remote folder
    /// after (e.g. `/`).
    #[error("source folder has no usable name: {0}")]
    UnnamedSource(PathBuf),

    /// The remote service rejected or failed a call; the run stops here.
    #[error("remote service error: {0}")]
    Remote(#[from] RemoteError),

    /// A file that was enumerated could not be read back.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct UploadSummary {
    /// Id of the newly created top-level remote folder.
    pub folder_id: String,
    /// Number of files uploaded.
    pub files_uploaded: usize,
}

/// Recursive tree uploader over any `RemoteStore`.
pub struct Uploader<'a, R: RemoteStore> {
    remote: &'a R,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

impl<'a, R: RemoteStore> Uploader<'a, R> {
    pub fn new(remote: &'a R) -> Self {
        Uploader { remote }
    }

    /// Upload the tree rooted at `source` into a new remote folder under
    /// `dest_parent_id`, printing a progress line per file and a final
    /// count.
    ///
    /// The top-level folder is named after `source`'s base name and is
    /// created unconditionally, so re-running the same upload produces a
    /// second folder next to the first; only subfolders are looked up by
    /// name before creation. The first remote failure aborts the run;
    /// files uploaded before that point stay where they are.
    pub fn upload_tree(
        &self,
        source: &Path,
        dest_parent_id: &str,
    ) -> Result<UploadSummary, UploadError> {
        if !source.is_dir() {
            return Err(UploadError::SourceNotFound(source.to_path_buf()));
        }
        let folder_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| UploadError::UnnamedSource(source.to_path_buf()))?;

        let top = self.remote.create_folder(dest_parent_id, &folder_name)?;
        println!("Created remote folder '{}' (id: {})", top.name, top.id);

        // Folder ids resolved so far, keyed by directory path relative to
        // `source`. Lives and dies with this run.
        let mut folders: HashMap<PathBuf, String> = HashMap::new();

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());

        let mut files_uploaded = 0usize;
        // The depth guard keeps a hidden-named root uploadable; only
        // hidden entries inside the tree are pruned.
        let walker = WalkDir::new(source)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(source).unwrap_or(entry.path());
            let parent_rel = rel.parent().unwrap_or_else(|| Path::new(""));
            spinner.set_message(format!("Uploading {}", rel.display()));

            let parent_id = self.resolve_folder(&mut folders, parent_rel, &top.id)?;
            let content = fs::read(entry.path()).map_err(|source| UploadError::ReadFile {
                path: entry.path().to_path_buf(),
                source,
            })?;
            let file_name = entry.file_name().to_string_lossy();
            self.remote.create_file(&parent_id, &file_name, &content)?;
            files_uploaded += 1;
            spinner.println(format!("  uploaded {}", rel.display()));
        }
        spinner.finish_and_clear();
        println!("Uploaded {} files.", files_uploaded);

        Ok(UploadSummary {
            folder_id: top.id,
            files_uploaded,
        })
    }

    /// Resolve the remote folder for a directory path relative to the
    /// source root, walking segments from the root downward and creating
    /// missing folders on the way. Each distinct prefix costs at most one
    /// lookup-or-create round trip per run; after that the cached id is
    /// reused. The empty path resolves to `root_id` without any call.
    fn resolve_folder(
        &self,
        cache: &mut HashMap<PathBuf, String>,
        rel_dir: &Path,
        root_id: &str,
    ) -> Result<String, RemoteError> {
        let mut parent_id = root_id.to_string();
        let mut prefix = PathBuf::new();
        for component in rel_dir.components() {
            prefix.push(component);
            if let Some(id) = cache.get(&prefix) {
                parent_id = id.clone();
                continue;
            }
            let name = component.as_os_str().to_string_lossy();
            let folder = match self.remote.find_child_folder(&parent_id, &name)? {
                Some(existing) => existing,
                None => self.remote.create_folder(&parent_id, &name)?,
            };
            cache.insert(prefix.clone(), folder.id.clone());
            parent_id = folder.id;
        }
        Ok(parent_id)
    }
}
