//! Loading and saving the URL-to-metadata cache. The cache is a single JSON
//! object on disk: top-level keys are image URLs, values are either the
//! seven-field metadata object or `{}` for a processed-but-failed URL. It is
//! read once at the start of a run and written once at the end; concurrent
//! writers are not supported.

use crate::record::CacheEntry;
use log::warn;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The in-memory cache. A `BTreeMap` keeps the serialized key order stable
/// across runs, which keeps diffs of the cache file readable.
pub type Cache = BTreeMap<String, CacheEntry>;

/// Reads and writes the cache at a fixed path.
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new<P: Into<PathBuf>>(path: P) -> Store {
        Store { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted cache. A missing file, unreadable file, or
    /// unparseable contents all yield an empty cache: the worst outcome of a
    /// lost cache is redundant re-fetching, so nothing here is fatal.
    pub fn load(&self) -> Cache {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(
                        "could not read cache file '{}': {}; starting empty",
                        self.path.display(),
                        err
                    );
                }
                return Cache::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(cache) => cache,
            Err(err) => {
                warn!(
                    "discarding unparseable cache file '{}': {}",
                    self.path.display(),
                    err
                );
                Cache::new()
            }
        }
    }

    /// Serializes the full cache and writes it out, creating the containing
    /// directory if needed. Unlike [`Store::load`], failures here propagate:
    /// silently losing a freshly built cache would force every image to be
    /// re-fetched on the next run.
    ///
    /// The JSON is pretty-printed and non-ASCII characters are written
    /// literally, so subject names and lens strings stay readable in the
    /// file.
    pub fn save(&self, cache: &Cache) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|err| Error::CreateDir {
                path: dir.to_owned(),
                err,
            })?;
        }
        let contents = serde_json::to_string_pretty(cache)?;
        fs::write(&self.path, contents).map_err(|err| Error::Write {
            path: self.path.clone(),
            err,
        })
    }
}

/// The result of a fallible cache-store operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error while persisting the cache.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems creating the cache directory.
    CreateDir { path: PathBuf, err: io::Error },

    /// Returned for I/O problems writing the cache file.
    Write { path: PathBuf, err: io::Error },

    /// Returned for errors serializing the cache to JSON.
    Serialize(serde_json::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::CreateDir { path, err } => {
                write!(f, "Creating cache directory '{}': {}", path.display(), err)
            }
            Error::Write { path, err } => {
                write!(f, "Writing cache file '{}': {}", path.display(), err)
            }
            Error::Serialize(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::CreateDir { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
            Error::Serialize(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    /// Converts [`serde_json::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator for serialization.
    fn from(err: serde_json::Error) -> Error {
        Error::Serialize(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::Record;

    fn sample_cache() -> Cache {
        let mut cache = Cache::new();
        cache.insert(
            "https://img.example.org/amanita/1.jpg".to_owned(),
            CacheEntry::Metadata(Record {
                model: "EOS 90D".to_owned(),
                lens: "EF100mm f/2.8L Macro IS".to_owned(),
                iso: "400".to_owned(),
                aperture: "f/2.8".to_owned(),
                exposure: "1/200".to_owned(),
                focal: "100mm".to_owned(),
                date: "2023/07/15".to_owned(),
            }),
        );
        cache.insert(
            "https://img.example.org/amanita/2.jpg".to_owned(),
            CacheEntry::Empty {},
        );
        cache
    }

    #[test]
    fn test_load_missing_file_yields_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("no-such-cache.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_invalid_json_yields_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exif-cache.json");
        fs::write(&path, "{ not json ").unwrap();
        let store = Store::new(&path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips_both_entry_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("exif-cache.json"));
        let cache = sample_cache();
        store.save(&cache).unwrap();
        assert_eq!(store.load(), cache);
    }

    #[test]
    fn test_save_creates_containing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("cache").join("exif-cache.json"));
        store.save(&sample_cache()).unwrap();
        assert_eq!(store.load(), sample_cache());
    }

    #[test]
    fn test_save_keeps_non_ascii_literal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exif-cache.json");
        let mut cache = Cache::new();
        cache.insert(
            "https://img.example.org/タマゴタケ.jpg".to_owned(),
            CacheEntry::Empty {},
        );
        Store::new(&path).save(&cache).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("タマゴタケ"));
        assert!(!contents.contains("\\u"));
    }

    #[test]
    fn test_save_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        // A path whose parent is a regular file cannot be created.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = Store::new(blocker.join("exif-cache.json"));
        assert!(store.save(&sample_cache()).is_err());
    }
}
