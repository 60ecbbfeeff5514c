//! Exports the [`refresh_cache`] function which stitches together the
//! high-level steps of one enrichment run: parsing the scraped entries
//! ([`crate::entry`]), loading the persisted cache, fetching and extracting
//! metadata for unseen URLs ([`crate::fetch`]), and persisting the merged
//! result ([`crate::cache`]).
//!
//! Per-URL failures never surface here; they are recorded as empty cache
//! entries by the fetcher. What does surface is anything that would make the
//! run pointless or lossy: an unreadable entries file, or a cache that
//! cannot be written back.

use crate::cache::{Error as CacheError, Store};
use crate::config::Config;
use crate::entry::{distinct_subjects, parse_entries, Error as EntriesError};
use crate::extract::Extractor;
use crate::fetch::Fetcher;
use log::info;
use std::fmt;

/// Runs one full enrichment pass from a [`Config`] object. This calls into
/// [`parse_entries`], [`Fetcher::build_cache`], and [`Store::save`] which do
/// the heavy lifting.
pub fn refresh_cache(config: &Config) -> Result<()> {
    let entries = parse_entries(&config.entries_file)?;
    info!(
        "loaded {} entries covering {} subjects from '{}'",
        entries.len(),
        distinct_subjects(&entries),
        config.entries_file.display()
    );

    let store = Store::new(&config.cache_file);
    let cache = store.load();
    let known = cache.len();

    let extractor = Extractor::new(&config.vendor_prefixes);
    let fetcher = Fetcher::new(config.timeout, extractor);
    let cache = fetcher.build_cache(&entries, cache);

    info!(
        "fetched {} new images; cache now covers {}",
        cache.len() - known,
        cache.len()
    );
    store.save(&cache)?;
    Ok(())
}

/// The result of a fallible enrichment run.
type Result<T> = std::result::Result<T, Error>;

/// The error type for an enrichment run.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors reading the scraped entries.
    Entries(EntriesError),

    /// Returned for errors persisting the cache.
    Cache(CacheError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Entries(err) => err.fmt(f),
            Error::Cache(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Entries(err) => Some(err),
            Error::Cache(err) => Some(err),
        }
    }
}

impl From<EntriesError> for Error {
    /// Converts [`EntriesError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: EntriesError) -> Error {
        Error::Entries(err)
    }
}

impl From<CacheError> for Error {
    /// Converts [`CacheError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: CacheError) -> Error {
        Error::Cache(err)
    }
}
