//! Filesystem object storage.
//!
//! Objects are addressed by keys such as `documents/<provider>/<id>.pdf`;
//! the first segment names the bucket. Keys are resolved below the storage
//! root and may not escape it.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

pub const DOCUMENTS_BUCKET: &str = "documents";

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Key under which an uploaded document's bytes are kept.
    pub fn document_key(provider_id: &str, document_id: &str) -> String {
        format!("{}/{}/{}.pdf", DOCUMENTS_BUCKET, provider_id, document_id)
    }

    pub fn resolve(&self, key: &str) -> io::Result<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid object key '{}'", key),
            ));
        }
        Ok(self.root.join(relative))
    }

    /// Creates (or truncates) the object, making parent directories as needed.
    pub fn create(&self, key: &str) -> io::Result<File> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        File::create(path)
    }

    pub fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(key)?)
    }

    pub fn delete(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.resolve(key)?) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn write_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let key = Storage::document_key("prov", "doc");
        assert_eq!(key, "documents/prov/doc.pdf");

        storage.create(&key).unwrap().write_all(b"%PDF-1.4").unwrap();
        assert_eq!(storage.read(&key).unwrap(), b"%PDF-1.4");

        storage.delete(&key).unwrap();
        storage.delete(&key).unwrap();
        assert!(storage.read(&key).is_err());
    }

    #[test]
    fn keys_cannot_escape_the_root() {
        let storage = Storage::new("/tmp/medcode-storage");
        assert!(storage.resolve("../etc/passwd").is_err());
        assert!(storage.resolve("/etc/passwd").is_err());
        assert!(storage.resolve("./documents/x.pdf").is_err());
        assert!(storage.resolve("").is_err());
        assert!(storage.resolve("documents/a/b.pdf").is_ok());
    }
}
