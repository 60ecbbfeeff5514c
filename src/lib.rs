//! The library code for the `exifstash` gallery-metadata tool. The
//! architecture can be generally broken down into three distinct steps:
//!
//! 1. Parsing the scraped image entries from the hand-off file
//!    ([`crate::entry`])
//! 2. Fetching each image the cache has not seen and extracting its camera
//!    metadata ([`crate::fetch`], [`crate::extract`])
//! 3. Persisting the merged URL-to-metadata cache ([`crate::cache`])
//!
//! Of the three, the second step is the more involved. The fetcher walks the
//! distinct unseen URLs in sorted order, pulls each image once over blocking
//! HTTP, and hands the bytes to the extractor, which normalizes whatever
//! EXIF it finds into the display-ready fields the page generator drops into
//! captions. Nothing in that loop is allowed to fail the batch: bad images,
//! dead URLs, and timeouts all become empty cache entries.
//!
//! The cache file distinguishes "never processed" (key absent) from
//! "processed, nothing found" (key mapped to `{}`). Consumers rely on that
//! distinction, and so does the fetcher itself: key membership is the only
//! thing that decides whether a URL is fetched, so failed URLs are retried
//! only when the cache file is deleted, not on every run.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod cache;
pub mod config;
pub mod entry;
pub mod extract;
pub mod fetch;
pub mod record;
