//! The fetch-and-cache orchestrator: given scraped entries and the cache
//! from the previous run, fetch every URL the cache has not seen, run the
//! extractor over each response body, and record the result (populated or
//! empty) under the URL.
//!
//! Fetching is deliberately sequential and blocking. A run covers a few
//! hundred images at most and is dominated by network latency, and hammering
//! a third-party image host with parallel requests would be poor
//! citizenship. Every request carries the configured timeout, so no URL can
//! hang the batch.
//!
//! Failures never abort the run. A URL that times out, returns a non-2xx
//! status, or serves bytes without readable metadata is recorded as an empty
//! entry and the loop moves on; because the key is then present in the
//! cache, the URL is not retried until someone deletes the cache file.

use crate::cache::Cache;
use crate::entry::Entry;
use crate::extract::Extractor;
use crate::record::{CacheEntry, Record};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::io::Read;
use std::time::Duration;

/// Fetches unseen image URLs and merges extraction results into the cache.
pub struct Fetcher<'a> {
    agent: ureq::Agent,
    extractor: Extractor<'a>,
}

impl<'a> Fetcher<'a> {
    /// Creates a fetcher whose requests are bounded by `timeout` overall.
    pub fn new(timeout: Duration, extractor: Extractor<'a>) -> Fetcher<'a> {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Fetcher { agent, extractor }
    }

    /// Processes every URL in `entries` that is not already a key in
    /// `cache`, in sorted order for reproducible logs, and returns the
    /// merged cache. Membership alone decides what is fetched: a cached
    /// empty entry counts as processed and is never retried here.
    ///
    /// Afterwards every URL in `entries` is a key in the returned cache.
    pub fn build_cache(&self, entries: &[Entry], mut cache: Cache) -> Cache {
        let unseen: BTreeSet<&str> = entries
            .iter()
            .map(|e| e.url.as_str())
            .filter(|url| !cache.contains_key(*url))
            .collect();

        for url in unseen {
            info!("fetching metadata for {}", url);
            let outcome = self.fetch_one(url);
            match &outcome {
                Outcome::Metadata(record) => {
                    debug!("extracted metadata from {}: {:?}", url, record)
                }
                Outcome::NoMetadata => debug!("no readable metadata in {}", url),
                Outcome::Status(code) => {
                    warn!("{} answered HTTP {}; recording empty entry", url, code)
                }
                Outcome::Transport(err) => {
                    warn!("fetching {} failed: {}; recording empty entry", url, err)
                }
            }
            cache.insert(url.to_owned(), outcome.into_entry());
        }

        cache
    }

    /// Fetches a single URL and classifies what happened. Redirects are
    /// followed; the body is read fully before extraction.
    pub fn fetch_one(&self, url: &str) -> Outcome {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Outcome::Status(code),
            Err(ureq::Error::Transport(err)) => return Outcome::Transport(err.to_string()),
        };

        let mut body = Vec::new();
        if let Err(err) = response.into_reader().read_to_end(&mut body) {
            return Outcome::Transport(err.to_string());
        }

        match self.extractor.extract(&body) {
            Some(record) => Outcome::Metadata(record),
            None => Outcome::NoMetadata,
        }
    }
}

/// What happened to one URL. Only [`Outcome::Metadata`] produces a populated
/// cache entry; the other variants all collapse to the empty entry on disk,
/// but stay distinct here so logs and tests can tell a network failure from
/// an image without metadata.
#[derive(Debug)]
pub enum Outcome {
    /// The body was fetched and carried extractable metadata.
    Metadata(Record),

    /// The body was fetched but no metadata segment could be read.
    NoMetadata,

    /// The server answered with a non-2xx status.
    Status(u16),

    /// The request failed below HTTP: timeout, refused connection, DNS,
    /// or an interrupted body read.
    Transport(String),
}

impl Outcome {
    /// Converts the outcome into what the cache stores for the URL.
    pub fn into_entry(self) -> CacheEntry {
        match self {
            Outcome::Metadata(record) => CacheEntry::Metadata(record),
            Outcome::NoMetadata | Outcome::Status(_) | Outcome::Transport(_) => {
                CacheEntry::Empty {}
            }
        }
    }
}
