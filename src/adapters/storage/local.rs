use crate::core::{ObjectLocation, Storage};
use crate::utils::error::{IngestError, Result};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

const PARTIAL_PREFIX: &str = ".partial-";

/// Object store rooted at a local directory. Keys map to relative paths.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !is_plain {
            return Err(IngestError::storage(key, "key must be a relative path without '..'"));
        }
        Ok(self.base_path.join(relative))
    }
}

fn write_new_file(path: &Path, data: &[u8]) -> io::Result<()> {
    stage_and_link(path, |staged| staged.write_all(data))
}

/// Stages the object in a temp file beside `path`, then links it into place
/// only if nothing exists there yet. The temp file is removed on any failure.
fn stage_and_link<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut std::fs::File) -> io::Result<()>,
{
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "key has no parent"))?;
    std::fs::create_dir_all(parent)?;

    let mut staged = tempfile::Builder::new()
        .prefix(PARTIAL_PREFIX)
        .tempfile_in(parent)?;
    fill(staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    // Dropping the returned `PersistError` drops its temp file with it.
    staged.persist_noclobber(path).map_err(|e| e.error)?;
    Ok(())
}

fn collect_files(base: &Path, dir: &Path, out: &mut Vec<String>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(base, &path, out)?;
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(PARTIAL_PREFIX) {
            continue;
        }
        if let Ok(relative) = path.strip_prefix(base) {
            let key: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            out.push(key.join("/"));
        }
    }
    Ok(())
}

impl Storage for LocalStorage {
    async fn create_object(&self, key: &str, data: &[u8]) -> Result<ObjectLocation> {
        let full_path = self.resolve(key)?;
        let target = full_path.clone();
        let data = data.to_vec();

        let written = tokio::task::spawn_blocking(move || write_new_file(&target, &data))
            .await
            .map_err(|e| IngestError::storage(key, e))?;

        match written {
            Ok(()) => Ok(ObjectLocation {
                key: key.to_string(),
                uri: full_path.display().to_string(),
            }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(IngestError::PathCollision {
                key: key.to_string(),
            }),
            Err(e) => Err(IngestError::storage(key, e)),
        }
    }

    async fn read_object(&self, key: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(key)?;
        tokio::fs::read(full_path)
            .await
            .map_err(|e| IngestError::storage(key, e))
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        // Walk the deepest directory named by the prefix, then filter on the full prefix.
        let dir_part = match prefix.rfind('/') {
            Some(idx) => &prefix[..idx],
            None => "",
        };
        let start = if dir_part.is_empty() {
            self.base_path.clone()
        } else {
            self.resolve(dir_part)?
        };
        let base = self.base_path.clone();

        let listed = tokio::task::spawn_blocking(move || {
            let mut keys = Vec::new();
            match collect_files(&base, &start, &mut keys) {
                Ok(()) => Ok(keys),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(|e| IngestError::storage(prefix, e))?;

        let mut keys: Vec<String> = listed
            .map_err(|e| IngestError::storage(prefix, e))?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect();
        keys.sort();
        Ok(keys)
    }
}
