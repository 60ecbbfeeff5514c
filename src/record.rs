//! Defines the [`Record`] type, the normalized camera metadata for a single
//! image, and the [`CacheEntry`] type, which is what the on-disk cache
//! actually stores per URL. The distinction matters to consumers: a URL that
//! is missing from the cache has never been processed, while a URL mapped to
//! an empty entry has been processed and yielded nothing. Page generators
//! must not conflate the two.

use serde::{Deserialize, Serialize};

/// Display-ready camera metadata extracted from one image. Every field is a
/// string and an empty string means "not present"; a [`Record`] always
/// carries all seven fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Camera model with the vendor prefix stripped (e.g. `EOS 90D`).
    pub model: String,

    /// Lens model, cleaned and truncated after a stabilization suffix.
    pub lens: String,

    /// ISO speed rating (e.g. `400`).
    pub iso: String,

    /// Aperture formatted as `f/2.8`. Serialized under the key `f`, which is
    /// what the page templates look up.
    #[serde(rename = "f")]
    pub aperture: String,

    /// Shutter speed in conventional `1/200` notation, never decimalized.
    pub exposure: String,

    /// Focal length formatted as `50mm` or `49.8mm`.
    pub focal: String,

    /// Capture date formatted as `YYYY/MM/DD`.
    pub date: String,
}

/// One value of the URL-keyed cache. Serialized untagged so a populated
/// entry is a plain seven-key object and a failed one is the empty object
/// `{}`, matching what the page generator reads.
///
/// Deserialization relies on [`Record`] requiring all seven keys: `{}`
/// cannot parse as a [`Record`], so it falls through to [`CacheEntry::Empty`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheEntry {
    /// Metadata was extracted for this URL.
    Metadata(Record),

    /// The URL was processed but produced no metadata, whether because the
    /// fetch failed or because the bytes carried no readable EXIF segment.
    /// Never retried within a run; a later run sees the key and skips it.
    Empty {},
}

impl CacheEntry {
    /// Returns the record for a populated entry.
    pub fn record(&self) -> Option<&Record> {
        match self {
            CacheEntry::Metadata(record) => Some(record),
            CacheEntry::Empty {} => None,
        }
    }

    /// True for processed-but-empty entries.
    pub fn is_empty(&self) -> bool {
        matches!(self, CacheEntry::Empty {})
    }
}

impl From<Option<Record>> for CacheEntry {
    /// Converts an extraction result into its cache representation.
    fn from(record: Option<Record>) -> CacheEntry {
        match record {
            Some(record) => CacheEntry::Metadata(record),
            None => CacheEntry::Empty {},
        }
    }
}
