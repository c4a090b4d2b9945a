//! JSON file adapter for the handle store port.

use crate::notification::{
    domain::MessageHandles,
    ports::{HandleStore, HandleStoreError, HandleStoreResult},
};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;

/// Stores [`MessageHandles`] as a small JSON document.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// record, so a crash mid-write never leaves a truncated file behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileHandleStore {
    directory: Utf8PathBuf,
    file_name: String,
}

impl JsonFileHandleStore {
    /// Creates a store backed by the file at `path`.
    ///
    /// Relative paths resolve against the working directory.
    #[must_use]
    pub fn new(path: impl AsRef<Utf8Path>) -> Self {
        let full_path = path.as_ref();
        let directory = match full_path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent.to_owned(),
            _ => Utf8PathBuf::from("."),
        };
        let file_name = full_path.file_name().unwrap_or("message_ids.json").to_owned();
        Self {
            directory,
            file_name,
        }
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> Utf8PathBuf {
        self.directory.join(&self.file_name)
    }

    fn open_directory(&self) -> io::Result<Dir> {
        Dir::open_ambient_dir(&self.directory, ambient_authority())
    }

    fn temporary_name(&self) -> String {
        format!("{}.tmp", self.file_name)
    }
}

impl HandleStore for JsonFileHandleStore {
    fn load(&self) -> HandleStoreResult<MessageHandles> {
        let directory = match self.open_directory() {
            Ok(directory) => directory,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(MessageHandles::new());
            }
            Err(err) => return Err(err.into()),
        };

        let raw = match directory.read_to_string(&self.file_name) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(MessageHandles::new());
            }
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&raw).map_err(|err| HandleStoreError::Corrupt(err.to_string()))
    }

    fn save(&self, handles: &MessageHandles) -> HandleStoreResult<()> {
        let encoded = serde_json::to_vec_pretty(handles)
            .map_err(|err| HandleStoreError::Corrupt(err.to_string()))?;
        let directory = self.open_directory()?;
        let temporary = self.temporary_name();
        directory.write(&temporary, encoded)?;
        directory.rename(&temporary, &directory, &self.file_name)?;
        Ok(())
    }
}
