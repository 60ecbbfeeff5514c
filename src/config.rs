use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The project file name searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "exifstash.yaml";

#[derive(Deserialize)]
struct EntriesFile(PathBuf);
impl Default for EntriesFile {
    fn default() -> Self {
        EntriesFile(PathBuf::from("entries.json"))
    }
}

#[derive(Deserialize)]
struct CacheFile(PathBuf);
impl Default for CacheFile {
    fn default() -> Self {
        CacheFile(PathBuf::from("cache/exif-cache.json"))
    }
}

#[derive(Deserialize)]
struct TimeoutSecs(u64);
impl Default for TimeoutSecs {
    fn default() -> Self {
        TimeoutSecs(15)
    }
}

#[derive(Deserialize)]
struct VendorPrefixes(Vec<String>);
impl Default for VendorPrefixes {
    fn default() -> Self {
        VendorPrefixes(vec![String::from("Canon")])
    }
}

/// The shape of `exifstash.yaml`. Every key is optional; relative paths are
/// resolved against the project file's directory.
#[derive(Deserialize)]
struct Project {
    #[serde(default)]
    entries_file: EntriesFile,

    #[serde(default)]
    cache_file: CacheFile,

    #[serde(default)]
    timeout_secs: TimeoutSecs,

    #[serde(default)]
    vendor_prefixes: VendorPrefixes,
}

/// Fully resolved configuration for one run. The pipeline takes this by
/// reference rather than consulting any global state, so tests can point it
/// at temporary paths.
pub struct Config {
    /// The scraped-entries hand-off file.
    pub entries_file: PathBuf,

    /// Where the URL-to-metadata cache lives.
    pub cache_file: PathBuf,

    /// Overall bound on each image fetch.
    pub timeout: Duration,

    /// Vendor names stripped from the front of camera model strings.
    pub vendor_prefixes: Vec<String>,
}

impl Config {
    /// Searches `dir` and its parent directories for [`PROJECT_FILE`] and
    /// loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let start = dir
            .canonicalize()
            .map_err(|e| anyhow!("Resolving project directory '{}': {}", dir.display(), e))?;

        let mut current = Some(start.as_path());
        while let Some(dir) = current {
            let path = dir.join(PROJECT_FILE);
            if path.exists() {
                return Config::from_project_file(&path)
                    .map_err(|e| anyhow!("Loading configuration: {:?}", e));
            }
            current = dir.parent();
        }

        Err(anyhow!(
            "Could not find `{}` in '{}' or any parent directory",
            PROJECT_FILE,
            start.display()
        ))
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Opening project file '{}': {}", path.display(), e))?;
        let project: Project = serde_yaml::from_reader(file)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config {
                entries_file: project_root.join(project.entries_file.0),
                cache_file: project_root.join(project.cache_file.0),
                timeout: Duration::from_secs(project.timeout_secs.0),
                vendor_prefixes: project.vendor_prefixes.0,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_from_project_file_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, "{}").unwrap();

        let config = Config::from_project_file(&path).unwrap();
        assert_eq!(config.entries_file, dir.path().join("entries.json"));
        assert_eq!(config.cache_file, dir.path().join("cache/exif-cache.json"));
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.vendor_prefixes, vec!["Canon".to_owned()]);
    }

    #[test]
    fn test_from_project_file_reads_explicit_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILE);
        fs::write(
            &path,
            "entries_file: scraped/entries.json\n\
             cache_file: state/exif.json\n\
             timeout_secs: 5\n\
             vendor_prefixes: [Canon, RICOH]\n",
        )
        .unwrap();

        let config = Config::from_project_file(&path).unwrap();
        assert_eq!(config.entries_file, dir.path().join("scraped/entries.json"));
        assert_eq!(config.cache_file, dir.path().join("state/exif.json"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(
            config.vendor_prefixes,
            vec!["Canon".to_owned(), "RICOH".to_owned()]
        );
    }

    #[test]
    fn test_from_directory_searches_parents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_FILE), "{}").unwrap();
        let nested = dir.path().join("posts").join("2023");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::from_directory(&nested).unwrap();
        assert_eq!(
            config.cache_file.file_name().unwrap().to_str().unwrap(),
            "exif-cache.json"
        );
    }
}
