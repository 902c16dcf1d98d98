use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

const DIGITAL_BOOK_FILE: &str = "digital-book.pdf";
const PDF_MAGIC: &[u8] = b"%PDF";

/// Filesystem layout for book assets: `<root>/books/<book_id>/digital-book.pdf`.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn digital_book_path(&self, book_id: Uuid) -> PathBuf {
        self.root
            .join("books")
            .join(book_id.to_string())
            .join(DIGITAL_BOOK_FILE)
    }

    pub async fn has_digital_book(&self, book_id: Uuid) -> bool {
        fs::try_exists(self.digital_book_path(book_id))
            .await
            .unwrap_or(false)
    }

    /// Reads the whole file, `None` when it is missing.
    pub async fn read_digital_book(&self, book_id: Uuid) -> std::io::Result<Option<Vec<u8>>> {
        match fs::read(self.digital_book_path(book_id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Writes (or replaces) the digital file for a book.
    pub async fn store_digital_book(&self, book_id: Uuid, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.digital_book_path(book_id);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        fs::write(&path, bytes).await?;
        Ok(path)
    }

    pub async fn remove_digital_book(&self, book_id: Uuid) -> std::io::Result<()> {
        match fs::remove_file(self.digital_book_path(book_id)).await {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_keyed_by_book_id() {
        let store = AssetStore::new("/srv/storage");
        let id = Uuid::parse_str("7b0e6f2c-3f57-4a53-9a70-0f4b3c1d2e10").unwrap();
        assert_eq!(
            store.digital_book_path(id),
            PathBuf::from("/srv/storage/books/7b0e6f2c-3f57-4a53-9a70-0f4b3c1d2e10/digital-book.pdf")
        );
    }

    #[tokio::test]
    async fn store_read_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        let id = Uuid::new_v4();

        assert!(!store.has_digital_book(id).await);
        assert_eq!(store.read_digital_book(id).await.unwrap(), None);

        store.store_digital_book(id, b"%PDF-1.7 body").await.unwrap();
        assert!(store.has_digital_book(id).await);
        assert_eq!(
            store.read_digital_book(id).await.unwrap().as_deref(),
            Some(&b"%PDF-1.7 body"[..])
        );

        store.remove_digital_book(id).await.unwrap();
        assert!(!store.has_digital_book(id).await);
        // removing twice is fine
        store.remove_digital_book(id).await.unwrap();
    }

    #[test]
    fn pdf_magic() {
        assert!(looks_like_pdf(b"%PDF-1.4\n"));
        assert!(!looks_like_pdf(b"PK\x03\x04"));
        assert!(!looks_like_pdf(b""));
    }
}
