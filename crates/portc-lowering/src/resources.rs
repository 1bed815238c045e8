//! `BinaryResource` lookup.

use std::path::{Path, PathBuf};

use portc_core::{ResourceError, Span};

/// Finds resource files in an ordered list of search directories.
#[derive(Debug, Clone, Default)]
pub struct ResourceLoader {
    search_dirs: Vec<PathBuf>,
}

impl ResourceLoader {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// The file `path` names: the first search directory that contains it.
    /// Without search directories the path is taken as given.
    pub fn find(&self, path: &str, span: Span) -> Result<PathBuf, ResourceError> {
        let found = if self.search_dirs.is_empty() {
            Some(PathBuf::from(path)).filter(|p| p.is_file())
        } else {
            self.search_dirs
                .iter()
                .map(|dir| dir.join(path))
                .find(|candidate| candidate.is_file())
        };
        found.ok_or_else(|| ResourceError::NotFound {
            path: path.to_string(),
            span,
        })
    }

    pub fn read(&self, path: &str, span: Span) -> Result<Vec<u8>, ResourceError> {
        let file = self.find(path, span)?;
        tracing::debug!(resource = path, file = %file.display(), "loading resource");
        read_file(&file, path, span)
    }
}

fn read_file(file: &Path, path: &str, span: Span) -> Result<Vec<u8>, ResourceError> {
    std::fs::read(file).map_err(|e| ResourceError::Unreadable {
        path: path.to_string(),
        message: e.to_string(),
        span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dir_with(name: &str, contents: &[u8]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(name), contents).unwrap();
        dir
    }

    #[test]
    fn first_directory_wins() {
        let dir1 = dir_with("x.bin", &[1, 2, 3]);
        let dir2 = dir_with("x.bin", &[9]);
        let loader = ResourceLoader::new(vec![dir1.path().to_path_buf(), dir2.path().to_path_buf()]);
        assert_eq!(loader.read("x.bin", Span::default()).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn later_directory_is_searched() {
        let empty = tempfile::tempdir().unwrap();
        let dir2 = dir_with("x.bin", &[7, 8]);
        let loader = ResourceLoader::new(vec![empty.path().to_path_buf(), dir2.path().to_path_buf()]);
        assert_eq!(loader.read("x.bin", Span::default()).unwrap(), vec![7, 8]);
    }

    #[test]
    fn missing_everywhere() {
        let dir1 = tempfile::tempdir().unwrap();
        let dir2 = tempfile::tempdir().unwrap();
        let loader = ResourceLoader::new(vec![dir1.path().to_path_buf(), dir2.path().to_path_buf()]);
        let span = Span::new(4, 2, 6);
        assert_eq!(
            loader.read("x.bin", span),
            Err(ResourceError::NotFound {
                path: "x.bin".into(),
                span,
            })
        );
    }

    #[test]
    fn directories_are_not_resources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("x.bin")).unwrap();
        let loader = ResourceLoader::new(vec![dir.path().to_path_buf()]);
        assert!(loader.find("x.bin", Span::default()).is_err());
    }
}
