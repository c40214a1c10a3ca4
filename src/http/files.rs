//! Static file lookup under the document root.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::FilesConfig;
use crate::http::content_type::content_type_for;

/// Result of looking up a request path.
#[derive(Debug, PartialEq, Eq)]
pub enum FileLookup {
    Found {
        contents: Vec<u8>,
        content_type: &'static str,
    },
    NotFound,
}

/// Directory request paths are resolved against.
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    root: PathBuf,
    index_file: String,
}

impl DocumentRoot {
    pub fn new(root: impl Into<PathBuf>, index_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index_file: index_file.into(),
        }
    }

    pub fn from_config(config: &FilesConfig) -> Self {
        Self::new(config.document_root.clone(), config.index_file.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path to a filesystem path.
    ///
    /// `/` becomes the index file and the query string is dropped. Returns
    /// `None` for paths that would leave the root.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let path = request_path.split('?').next().unwrap_or_default();
        let path = if path == "/" {
            self.index_file.as_str()
        } else {
            path
        };

        let mut resolved = self.root.clone();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => return None,
                s if s.contains('\\') => return None,
                s => resolved.push(s),
            }
        }
        Some(resolved)
    }

    /// Read the file behind `request_path` if it is a regular file.
    pub async fn load(&self, request_path: &str) -> io::Result<FileLookup> {
        let Some(path) = self.resolve(request_path) else {
            return Ok(FileLookup::NotFound);
        };

        // Any stat failure (missing, ENOTDIR, ENAMETOOLONG, ...) means there
        // is no regular file at this path.
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(FileLookup::NotFound),
            Err(e) => {
                tracing::trace!(path = %path.display(), error = %e, "No regular file at path");
                return Ok(FileLookup::NotFound);
            }
        }

        let contents = tokio::fs::read(&path).await?;
        Ok(FileLookup::Found {
            contents,
            content_type: content_type_for(&path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("admission-httpd-files-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(dir.join("sub")).unwrap();
        std::fs::write(dir.join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(dir.join("sub").join("a.txt"), "alpha").unwrap();
        dir
    }

    #[test]
    fn resolves_root_to_index() {
        let root = DocumentRoot::new("/srv", "index.html");
        assert_eq!(root.resolve("/"), Some(PathBuf::from("/srv/index.html")));
        assert_eq!(root.resolve("/a/b.png"), Some(PathBuf::from("/srv/a/b.png")));
        assert_eq!(root.resolve("/a.txt?x=1"), Some(PathBuf::from("/srv/a.txt")));
    }

    #[test]
    fn refuses_traversal() {
        let root = DocumentRoot::new("/srv", "index.html");
        assert_eq!(root.resolve("/../etc/passwd"), None);
        assert_eq!(root.resolve("/a/../../x"), None);
    }

    #[tokio::test]
    async fn loads_existing_files() {
        let root = DocumentRoot::new(temp_root(), "index.html");

        assert_eq!(
            root.load("/").await.unwrap(),
            FileLookup::Found {
                contents: b"<h1>home</h1>".to_vec(),
                content_type: "text/html",
            }
        );
        assert_eq!(
            root.load("/sub/a.txt").await.unwrap(),
            FileLookup::Found {
                contents: b"alpha".to_vec(),
                content_type: "text/plain",
            }
        );
    }

    #[tokio::test]
    async fn missing_files_and_directories_are_not_found() {
        let root = DocumentRoot::new(temp_root(), "index.html");
        assert_eq!(root.load("/missing.png").await.unwrap(), FileLookup::NotFound);
        assert_eq!(root.load("/sub").await.unwrap(), FileLookup::NotFound);
        assert_eq!(root.load("/../index.html").await.unwrap(), FileLookup::NotFound);
    }

    #[tokio::test]
    async fn file_used_as_directory_is_not_found() {
        let root = DocumentRoot::new(temp_root(), "index.html");
        assert_eq!(root.load("/index.html/extra").await.unwrap(), FileLookup::NotFound);
        assert_eq!(root.load("/sub/a.txt/b.txt").await.unwrap(), FileLookup::NotFound);
    }

    #[tokio::test]
    async fn overlong_segment_is_not_found() {
        let root = DocumentRoot::new(temp_root(), "index.html");
        let path = format!("/{}.html", "a".repeat(400));
        assert_eq!(root.load(&path).await.unwrap(), FileLookup::NotFound);
    }
}
