use std::{fs, io, path::{Path, PathBuf}};

use log::{debug, warn};

use located_error::prelude::*;

/// Keeps track of the per-chromosome filesets written during a run, so that they can all be removed once
/// every chromosome has been processed.
///
/// Only files named `<prefix>.<ext>` are considered, where `<prefix>` is a recorded output prefix. i.e. for
/// the prefix `data/1KG_2`: `data/1KG_2.bed`, `data/1KG_2.log`, `data/1KG_2.nosex`... but never `data/1KG_21.bed`
#[derive(Debug, Default)]
pub struct IntermediateFiles {
    prefixes: Vec<PathBuf>,
}

impl IntermediateFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, prefix: impl Into<PathBuf>) {
        self.prefixes.push(prefix.into());
    }

    pub fn prefixes(&self) -> &[PathBuf] {
        &self.prefixes
    }

    /// List every file currently on disk that belongs to a recorded prefix.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for prefix in &self.prefixes {
            files.extend(Self::files_of(prefix).with_loc(|| format!("While searching for the files of {}", prefix.display()))?);
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn files_of(prefix: &Path) -> io::Result<Vec<PathBuf>> {
        let Some(stem) = prefix.file_name().and_then(|name| name.to_str()) else {
            return Ok(Vec::new())
        };
        let dir = match prefix.parent() {
            Some(parent) if ! parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if ! dir.is_dir() {
            return Ok(Vec::new())
        }

        let pattern = format!("{stem}.");
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let matches = name.to_str().is_some_and(|name| name.starts_with(&pattern));
            if matches && entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        Ok(files)
    }

    /// Remove every intermediate file. Files that already vanished are skipped.
    /// Returns the number of removed files.
    pub fn remove_all(&self) -> Result<usize> {
        let mut removed = 0;
        for file in self.files()? {
            match fs::remove_file(&file) {
                Ok(()) => {
                    debug!("Removed {}", file.display());
                    removed += 1;
                },
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("{} vanished before it could be removed", file.display());
                },
                Err(e) => return Err(e).with_loc(|| format!("Failed to remove intermediate file {}", file.display())),
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
    }

    #[test]
    fn only_recorded_prefixes_are_removed() {
        let tmpdir = tempfile::tempdir().unwrap();
        let dir = tmpdir.path();
        touch(dir, &[
            "1KG.bed", "1KG.bim", "1KG.fam",
            "1KG_2.bed", "1KG_2.bim", "1KG_2.fam", "1KG_2.log", "1KG_2.nosex",
            "1KG_21.bed", "1KG_2extra.txt",
        ]);

        let mut intermediates = IntermediateFiles::new();
        intermediates.push(dir.join("1KG_2"));
        assert_eq!(intermediates.files().unwrap().len(), 5);
        assert_eq!(intermediates.remove_all().unwrap(), 5);

        let mut remaining: Vec<String> = fs::read_dir(dir).unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        remaining.sort();
        assert_eq!(remaining, vec!["1KG.bed", "1KG.bim", "1KG.fam", "1KG_21.bed", "1KG_2extra.txt"]);
    }

    #[test]
    fn missing_files_are_not_an_error() {
        let tmpdir = tempfile::tempdir().unwrap();
        let mut intermediates = IntermediateFiles::new();
        intermediates.push(tmpdir.path().join("1KG_1"));
        intermediates.push(tmpdir.path().join("missing-dir/1KG_2"));
        assert!(intermediates.files().unwrap().is_empty());
        assert_eq!(intermediates.remove_all().unwrap(), 0);
    }

    #[test]
    fn duplicated_prefixes() {
        let tmpdir = tempfile::tempdir().unwrap();
        touch(tmpdir.path(), &["1KG_3.bed", "1KG_3.log"]);
        let mut intermediates = IntermediateFiles::new();
        intermediates.push(tmpdir.path().join("1KG_3"));
        intermediates.push(tmpdir.path().join("1KG_3"));
        assert_eq!(intermediates.prefixes().len(), 2);
        assert_eq!(intermediates.remove_all().unwrap(), 2);
    }
}
