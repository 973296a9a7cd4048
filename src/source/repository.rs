use crate::config::SourceSettings;
use crate::source::errors::SourceError;
use crate::source::unit::{SourceUnit, WriteMode};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The ordered collection of source units discovered in one directory.
///
/// The set of files is fixed at construction; only their content changes.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    units: Vec<SourceUnit>,
}

impl Repository {
    /// Discover and load every recognized source file under `root`.
    pub fn open(
        root: impl AsRef<Path>,
        mode: WriteMode,
        settings: &SourceSettings,
    ) -> Result<Self, SourceError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(SourceError::MissingDirectory(root.to_path_buf()));
        }
        let root = root.canonicalize().map_err(|source| SourceError::Read {
            path: root.to_path_buf(),
            source,
        })?;

        let mut walker = WalkDir::new(&root).min_depth(1);
        if !settings.recursive {
            walker = walker.max_depth(1);
        }

        let mut paths = Vec::new();
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && is_source(entry.path(), &settings.extensions) {
                paths.push(entry.into_path());
            }
        }
        paths.sort();

        let units = paths
            .into_iter()
            .map(|path| SourceUnit::load(path, mode))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { root, units })
    }

    /// Build a repository from already-loaded units, keeping their order.
    pub fn from_units(root: impl Into<PathBuf>, units: Vec<SourceUnit>) -> Self {
        Self {
            root: root.into(),
            units,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> Option<&SourceUnit> {
        self.units.get(index)
    }

    pub fn unit_mut(&mut self, index: usize) -> Option<&mut SourceUnit> {
        self.units.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Concatenated unified diff of every modified unit.
    pub fn diff(&self) -> Result<String, SourceError> {
        let mut out = String::new();
        for unit in &self.units {
            out.push_str(&unit.diff()?);
        }
        Ok(out)
    }

    /// Paths of units whose content differs from what was loaded.
    pub fn modified(&self) -> Vec<&Path> {
        self.units
            .iter()
            .filter(|unit| unit.is_modified())
            .map(SourceUnit::path)
            .collect()
    }

    /// Write every modified unit to disk. Returns the number of files written.
    pub fn save(&self) -> Result<usize, SourceError> {
        let mut written = 0;
        for unit in &self.units {
            if unit.save()? {
                written += 1;
            }
        }
        Ok(written)
    }
}

fn is_source(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known == ext))
}
