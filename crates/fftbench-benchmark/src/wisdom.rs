//! Persisted engine wisdom, one file per engine, precision and host.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fftbench_core::Precision;

/// Directory holding wisdom files.
///
/// # Example
///
/// ```
/// use fftbench_benchmark::WisdomStore;
/// use fftbench_core::Precision;
///
/// let store = WisdomStore::new("/var/tmp/wisdom").with_host("bench-01");
/// assert_eq!(
///     store.path_for("RustFFT", Precision::Double),
///     std::path::Path::new("/var/tmp/wisdom/RustFFT-double-bench-01.wisdom"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WisdomStore {
    dir: PathBuf,
    host: String,
}

impl WisdomStore {
    /// Store in `dir`, keyed by the current host name.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            host: sanitize(&host_name()),
        }
    }

    /// Store in the default location under the system temp directory.
    pub fn default_location() -> Self {
        Self::new(std::env::temp_dir().join("fftbench-wisdom"))
    }

    /// Overrides the host part of file names.
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = sanitize(host);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// File holding wisdom for `engine` at `precision` on this host.
    pub fn path_for(&self, engine: &str, precision: Precision) -> PathBuf {
        self.dir.join(format!(
            "{}-{}-{}.wisdom",
            sanitize(engine),
            precision,
            self.host
        ))
    }

    /// Reads stored wisdom. A missing file is `Ok(None)`.
    pub fn load(&self, engine: &str, precision: Precision) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(engine, precision)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes wisdom, creating the directory if needed. Returns the path.
    pub fn save(&self, engine: &str, precision: Precision, wisdom: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(engine, precision);
        fs::write(&path, wisdom)?;
        Ok(path)
    }
}

fn host_name() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .chain(fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "localhost".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = WisdomStore::new(dir.path());
        assert!(store.load("RustFFT", Precision::Single).unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = WisdomStore::new(dir.path().join("nested")).with_host("box");
        let path = store.save("RustFFT", Precision::Double, "{}").unwrap();
        assert!(path.ends_with("RustFFT-double-box.wisdom"));
        assert_eq!(
            store.load("RustFFT", Precision::Double).unwrap().as_deref(),
            Some("{}")
        );
        assert!(store.load("RustFFT", Precision::Single).unwrap().is_none());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("my host/01"), "my_host_01");
        assert_eq!(sanitize(""), "localhost");
        assert!(!WisdomStore::new("/tmp").host().is_empty());
    }
}
