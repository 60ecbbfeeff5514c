//! The hand-off format between the scraping step and this tool: a JSON array
//! of `{"alt": subject, "src": image URL}` objects. The subject is only
//! carried through for reporting; grouping images under their subjects is
//! the page generator's job, not ours.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// One scraped image reference.
#[derive(Clone, Debug, Deserialize)]
pub struct Entry {
    /// The caption text the image was posted under.
    #[serde(rename = "alt")]
    pub subject: String,

    /// The image URL. Kept verbatim; it is also the cache key, so it must
    /// never be normalized or re-encoded.
    #[serde(rename = "src")]
    pub url: String,
}

/// Parses the entries hand-off file.
pub fn parse_entries(path: &Path) -> Result<Vec<Entry>> {
    let file = File::open(path).map_err(|err| Error::Open {
        path: path.to_owned(),
        err,
    })?;
    serde_json::from_reader(io::BufReader::new(file)).map_err(Error::Parse)
}

/// Counts the distinct subjects across `entries`, for run summaries.
pub fn distinct_subjects(entries: &[Entry]) -> usize {
    entries
        .iter()
        .map(|e| e.subject.as_str())
        .collect::<BTreeSet<&str>>()
        .len()
}

/// The result of a fallible entries-parsing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading the entries file.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems opening the entries file.
    Open { path: PathBuf, err: io::Error },

    /// Returned when the entries file is not a valid JSON entry list.
    Parse(serde_json::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening entries file '{}': {}", path.display(), err)
            }
            Error::Parse(err) => write!(f, "Parsing entries file: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        fs::write(
            &path,
            r#"[
                {"alt": "タマゴタケ", "src": "https://img.example.org/1.jpg"},
                {"alt": "ベニテングタケ", "src": "https://img.example.org/2.jpg"},
                {"alt": "タマゴタケ", "src": "https://img.example.org/3.jpg"}
            ]"#,
        )
        .unwrap();

        let entries = parse_entries(&path).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].subject, "タマゴタケ");
        assert_eq!(entries[0].url, "https://img.example.org/1.jpg");
        assert_eq!(distinct_subjects(&entries), 2);
    }

    #[test]
    fn test_parse_entries_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_entries(&dir.path().join("entries.json")).unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
    }

    #[test]
    fn test_parse_entries_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        fs::write(&path, r#"{"alt": "not a list"}"#).unwrap();
        assert!(matches!(
            parse_entries(&path).unwrap_err(),
            Error::Parse(_)
        ));
    }
}
