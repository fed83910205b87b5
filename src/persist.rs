//! Rotation persistence hooks.
//!
//! The engine never touches these. The host saves at interaction boundaries
//! (e.g. after a selection) and restores through [`Carousel::reset`](crate::carousel::Carousel::reset).

use crate::carousel::is_valid_rotation;
use crate::error::PersistError;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

pub trait RotationStore {
    fn save(&self, rotation: f64) -> Result<(), PersistError>;

    /// Returns `None` when nothing usable was stored.
    fn load(&self) -> Option<f64>;
}

#[derive(Debug)]
pub struct FileRotationStore {
    path: PathBuf,
}

impl FileRotationStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Stores the rotation under `$XDG_STATE_HOME/album-carousel/rotation`.
    pub fn in_state_dir() -> Result<Self, PersistError> {
        let path = xdg::BaseDirectories::with_prefix("album-carousel")
            .place_state_file("rotation")
            .map_err(PersistError::StateDir)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RotationStore for FileRotationStore {
    fn save(&self, rotation: f64) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            fs_err::create_dir_all(parent)?;
        }
        fs_err::write(&self.path, rotation.to_string())?;
        Ok(())
    }

    fn load(&self) -> Option<f64> {
        let raw = fs_err::read_to_string(&self.path).ok()?;
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<f64>() {
            Ok(r) if is_valid_rotation(r) => Some(r),
            _ => {
                log::warn!(
                    "Ignoring unreadable rotation {:?} in {}",
                    raw,
                    self.path.display()
                );
                None
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryRotationStore {
    slot: Mutex<Option<f64>>,
}

impl RotationStore for MemoryRotationStore {
    fn save(&self, rotation: f64) -> Result<(), PersistError> {
        *self.slot.lock() = Some(rotation);
        Ok(())
    }

    fn load(&self) -> Option<f64> {
        *self.slot.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_restores_saved_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRotationStore::new(dir.path().join("nested").join("rotation"));

        assert_eq!(store.load(), None);
        store.save(-42.5).unwrap();
        assert_eq!(store.load(), Some(-42.5));
    }

    #[test]
    fn test_file_store_ignores_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotation");

        fs_err::write(&path, "not a number").unwrap();
        assert_eq!(FileRotationStore::new(&path).load(), None);

        fs_err::write(&path, "NaN").unwrap();
        assert_eq!(FileRotationStore::new(&path).load(), None);

        fs_err::write(&path, "1e20").unwrap();
        assert_eq!(FileRotationStore::new(&path).load(), None);

        fs_err::write(&path, "  \n").unwrap();
        assert_eq!(FileRotationStore::new(&path).load(), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryRotationStore::default();
        assert_eq!(store.load(), None);
        store.save(16.0).unwrap();
        assert_eq!(store.load(), Some(16.0));
    }
}
