use crate::edit::atomic_write;
use crate::source::errors::SourceError;
use similar::TextDiff;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// How a [`SourceUnit`] persists writes. Chosen once, at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Keep original and current content in memory; disk is only touched by
    /// [`SourceUnit::save`].
    #[default]
    InMemory,
    /// Read from and write to disk on every access. No original snapshot is
    /// kept, so no diff is available.
    WriteThrough,
}

#[derive(Debug, Clone)]
enum Storage {
    InMemory { original: String, current: String },
    WriteThrough,
}

/// One source file with its original and current content.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    path: PathBuf,
    storage: Storage,
}

impl SourceUnit {
    pub fn load(path: impl Into<PathBuf>, mode: WriteMode) -> Result<Self, SourceError> {
        let path = path.into();
        let storage = match mode {
            WriteMode::InMemory => {
                let original = read_file(&path)?;
                Storage::InMemory {
                    current: original.clone(),
                    original,
                }
            }
            WriteMode::WriteThrough => Storage::WriteThrough,
        };
        Ok(Self { path, storage })
    }

    /// Build an in-memory unit from text, without touching the filesystem.
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let original = text.into();
        Self {
            path: path.into(),
            storage: Storage::InMemory {
                current: original.clone(),
                original,
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> WriteMode {
        match self.storage {
            Storage::InMemory { .. } => WriteMode::InMemory,
            Storage::WriteThrough => WriteMode::WriteThrough,
        }
    }

    /// Current content.
    pub fn read(&self) -> Result<Cow<'_, str>, SourceError> {
        match &self.storage {
            Storage::InMemory { current, .. } => Ok(Cow::Borrowed(current)),
            Storage::WriteThrough => read_file(&self.path).map(Cow::Owned),
        }
    }

    /// Content as loaded. Never changes after load.
    pub fn original(&self) -> Result<&str, SourceError> {
        match &self.storage {
            Storage::InMemory { original, .. } => Ok(original),
            Storage::WriteThrough => Err(SourceError::NotInMemory {
                path: self.path.clone(),
            }),
        }
    }

    /// Replace the current content wholesale.
    pub fn write(&mut self, content: String) -> Result<(), SourceError> {
        match &mut self.storage {
            Storage::InMemory { current, .. } => {
                *current = content;
                Ok(())
            }
            Storage::WriteThrough => {
                atomic_write(&self.path, content.as_bytes()).map_err(|source| {
                    SourceError::Write {
                        path: self.path.clone(),
                        source,
                    }
                })
            }
        }
    }

    pub fn is_modified(&self) -> bool {
        match &self.storage {
            Storage::InMemory { original, current } => original != current,
            Storage::WriteThrough => false,
        }
    }

    /// Unified diff between original and current content; empty if unchanged.
    pub fn diff(&self) -> Result<String, SourceError> {
        let Storage::InMemory { original, current } = &self.storage else {
            return Err(SourceError::NotInMemory {
                path: self.path.clone(),
            });
        };

        if original == current {
            return Ok(String::new());
        }

        let name = self.path.display().to_string();
        Ok(TextDiff::from_lines(original.as_str(), current.as_str())
            .unified_diff()
            .context_radius(3)
            .header(&name, &name)
            .to_string())
    }

    /// Write modified in-memory content to disk. Returns whether a write happened.
    pub fn save(&self) -> Result<bool, SourceError> {
        match &self.storage {
            Storage::InMemory { original, current } if original != current => {
                atomic_write(&self.path, current.as_bytes()).map_err(|source| {
                    SourceError::Write {
                        path: self.path.clone(),
                        source,
                    }
                })?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn read_file(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })
}
