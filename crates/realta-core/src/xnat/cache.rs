use super::{Experiment, ScanSource};
use crate::error::Error;
use crate::scan::ScanRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Serves scan listings from `<dir>/<experiment id>.json`, fetching from the
/// inner source and writing the file on a miss.
///
/// Keyed by accession id: session labels repeat across projects.
pub struct CachedSource<S> {
    inner: S,
    dir: PathBuf,
}

impl<S: ScanSource> CachedSource<S> {
    pub fn new(inner: S, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
        }
    }

    pub fn cache_file(&self, experiment: &Experiment) -> PathBuf {
        let name: String = experiment
            .id
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl<S: ScanSource> ScanSource for CachedSource<S> {
    fn experiments(
        &self,
        label: Option<&str>,
        project: Option<&str>,
    ) -> Result<Vec<Experiment>, Error> {
        self.inner.experiments(label, project)
    }

    fn scans(&self, experiment: &Experiment) -> Result<Vec<ScanRecord>, Error> {
        let cache_file = self.cache_file(experiment);
        if cache_file.exists() {
            info!("cache hit {}", cache_file.display());
            let text = fs::read_to_string(&cache_file)?;
            return Ok(serde_json::from_str(&text)?);
        }

        info!("cache miss {}", cache_file.display());
        let scans = self.inner.scans(experiment)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&cache_file, serde_json::to_string_pretty(&scans)?)?;
        debug!("cached {} scans in {}", scans.len(), cache_file.display());
        Ok(scans)
    }
}

/// Remove every cached listing in `dir`. Returns the number of files removed.
pub fn clear_cache(dir: &Path) -> io::Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    info!("Removed {} cached listings from {}", removed, dir.display());
    Ok(removed)
}
