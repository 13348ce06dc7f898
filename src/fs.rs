use std::{collections::BTreeMap, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("No file {file} in directory {dir}")]
    NotFound { dir: u32, file: u32 },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The game's packed file system, addressed by `(directory, file)` indices.
///
/// Decoding and re-packing the real archive is the caller's business; patch code only needs
/// to read a file and to store one.
pub trait PackedFileSystem {
    fn read(&self, dir: u32, file: u32) -> Result<Vec<u8>, FsError>;
    fn write(&mut self, dir: u32, file: u32, bytes: &[u8]) -> Result<(), FsError>;
}

/// A file system held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: BTreeMap<(u32, u32), Vec<u8>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl PackedFileSystem for MemoryFileSystem {
    fn read(&self, dir: u32, file: u32) -> Result<Vec<u8>, FsError> {
        self.files
            .get(&(dir, file))
            .cloned()
            .ok_or(FsError::NotFound { dir, file })
    }

    fn write(&mut self, dir: u32, file: u32, bytes: &[u8]) -> Result<(), FsError> {
        self.files.insert((dir, file), bytes.to_vec());
        Ok(())
    }
}

/// An unpacked file system on disk, one file per entry at `<root>/<dir>/<file>.bin`.
#[derive(Debug, Clone)]
pub struct DirectoryFileSystem {
    root: PathBuf,
}

impl DirectoryFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, dir: u32, file: u32) -> PathBuf {
        self.root.join(dir.to_string()).join(format!("{}.bin", file))
    }
}

impl PackedFileSystem for DirectoryFileSystem {
    #[tracing::instrument]
    fn read(&self, dir: u32, file: u32) -> Result<Vec<u8>, FsError> {
        let path = self.path(dir, file);
        std::fs::read(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound { dir, file },
            _ => FsError::Io { path, source },
        })
    }

    #[tracing::instrument(skip(bytes))]
    fn write(&mut self, dir: u32, file: u32, bytes: &[u8]) -> Result<(), FsError> {
        let path = self.path(dir, file);
        let io = |source| FsError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io)?;
        }
        std::fs::write(&path, bytes).map_err(io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_memory_file_system() -> Result<(), FsError> {
        let mut fs = MemoryFileSystem::new();
        assert!(matches!(
            fs.read(9, 1),
            Err(FsError::NotFound { dir: 9, file: 1 })
        ));

        fs.write(9, 1, &[1, 2, 3])?;
        fs.write(9, 1, &[4])?;
        assert_eq!(fs.read(9, 1)?, vec![4]);
        assert_eq!(fs.len(), 1);
        Ok(())
    }

    #[test]
    fn test_directory_file_system() -> Result<(), FsError> {
        let root = std::env::temp_dir().join(format!("boardpatch-fs-{}", std::process::id()));
        let mut fs = DirectoryFileSystem::new(&root);

        fs.write(3, 7, &[0xDE, 0xAD])?;
        assert_eq!(fs.read(3, 7)?, vec![0xDE, 0xAD]);
        assert!(root.join("3").join("7.bin").exists());
        assert!(matches!(fs.read(3, 8), Err(FsError::NotFound { .. })));

        let _ = std::fs::remove_dir_all(&root);
        Ok(())
    }
}
