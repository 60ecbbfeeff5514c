//! Pure extraction of display-ready camera metadata from raw image bytes.
//!
//! The extractor never fails: any input that cannot be parsed (truncated
//! files, non-images, images without an EXIF segment) produces `None`, which
//! the cache records as a processed-but-empty entry. A single bad image must
//! never abort a batch run, so no error ever escapes this module.
//!
//! The normalization rules here exist to make the fields drop straight into
//! gallery captions: apertures become `f/2.8`, shutter speeds stay in
//! `1/200` notation, focal lengths within 0.1 of a whole number lose their
//! `.0`, and capture timestamps collapse to `YYYY/MM/DD`.

use crate::record::Record;
use exif::{Exif, In, Tag, Value};
use std::io::Cursor;

/// Extracts [`Record`]s from image bytes. Holds the list of vendor names
/// whose prefix is stripped from camera model strings.
pub struct Extractor<'a> {
    vendor_prefixes: &'a [String],
}

impl<'a> Extractor<'a> {
    pub fn new(vendor_prefixes: &'a [String]) -> Extractor<'a> {
        Extractor { vendor_prefixes }
    }

    /// Parses the embedded metadata out of `bytes` and normalizes it into a
    /// [`Record`]. Returns `None` when no metadata segment can be read at
    /// all; a readable segment with missing fields yields a [`Record`] whose
    /// absent fields are empty strings.
    pub fn extract(&self, bytes: &[u8]) -> Option<Record> {
        let exif = exif::Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .ok()?;

        Some(Record {
            model: self.normalize_model(string_field(&exif, Tag::Model)),
            lens: truncate_lens(string_field(&exif, Tag::LensModel)),
            iso: uint_field(&exif, Tag::PhotographicSensitivity),
            aperture: aperture(&exif),
            exposure: exposure(&exif),
            focal: focal_length(&exif),
            date: capture_date(&exif),
        })
    }

    /// Strips a known vendor prefix (vendor name plus one space) from the
    /// front of a model string. Unrecognized vendors are left untouched;
    /// this is a display convention, not a semantic requirement.
    fn normalize_model(&self, model: String) -> String {
        for vendor in self.vendor_prefixes {
            let prefix = format!("{} ", vendor);
            if let Some(rest) = model.strip_prefix(&prefix) {
                return rest.to_owned();
            }
        }
        model
    }
}

/// Cleans a textual EXIF value: drops NUL bytes and U+FFFD mojibake markers,
/// then trims surrounding whitespace. Applied to every string field before
/// any further normalization.
fn clean(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '\u{0}' && *c != '\u{fffd}')
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Truncates a lens name right after the first `IS` occurrence, dropping the
/// vendor's stabilization-variant suffix (`... Macro IS USM` becomes
/// `... Macro IS`). This is a substring match, not a structured parse: a
/// lens name containing `IS` inside an unrelated word would be cut short.
fn truncate_lens(lens: String) -> String {
    const STABILIZER: &str = "IS";
    match lens.find(STABILIZER) {
        Some(i) => lens[..i + STABILIZER.len()].to_owned(),
        None => lens,
    }
}

/// Reads a string-valued field. ASCII values are decoded lossily (the
/// replacement characters this can introduce are stripped by [`clean`]);
/// anything else falls back to the library's display form.
fn string_field(exif: &Exif, tag: Tag) -> String {
    match exif.get_field(tag, In::PRIMARY) {
        Some(field) => match &field.value {
            Value::Ascii(lines) if !lines.is_empty() => {
                clean(&String::from_utf8_lossy(&lines[0]))
            }
            _ => {
                let display = field.display_value().to_string();
                clean(display.trim_matches('"'))
            }
        },
        None => String::new(),
    }
}

/// Reads an integer-valued field, taking the first element when the source
/// stores a list (ISO speed ratings are commonly a list of one).
fn uint_field(exif: &Exif, tag: Tag) -> String {
    match exif.get_field(tag, In::PRIMARY) {
        Some(field) => match field.value.get_uint(0) {
            Some(value) => value.to_string(),
            None => String::new(),
        },
        None => String::new(),
    }
}

/// Converts the first rational of a field to a float. Zero denominators are
/// treated as unavailable rather than dividing.
fn rational_field(exif: &Exif, tag: Tag) -> Option<f64> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(rationals) => rationals
            .first()
            .filter(|r| r.denom != 0)
            .map(|r| r.to_f64()),
        _ => None,
    }
}

fn aperture(exif: &Exif) -> String {
    match rational_field(exif, Tag::FNumber) {
        Some(f) if f > 0.0 => format!("f/{:.1}", f),
        _ => String::new(),
    }
}

/// Keeps the shutter speed as the literal `numerator/denominator` string to
/// match conventional notation. A bare number falls back to its string form.
fn exposure(exif: &Exif) -> String {
    match exif.get_field(Tag::ExposureTime, In::PRIMARY) {
        Some(field) => match &field.value {
            Value::Rational(rationals) => match rationals.first() {
                Some(r) if r.denom != 0 => format!("{}/{}", r.num, r.denom),
                _ => String::new(),
            },
            other => match other.get_uint(0) {
                Some(value) => value.to_string(),
                None => String::new(),
            },
        },
        None => String::new(),
    }
}

/// Formats the focal length as `50mm` when within 0.1 of a whole number and
/// as `49.8mm` otherwise. The tolerance avoids captions like `50.0mm` while
/// keeping genuinely fractional focal lengths precise.
fn focal_length(exif: &Exif) -> String {
    match rational_field(exif, Tag::FocalLength) {
        Some(f) if f > 0.0 => {
            if (f - f.round()).abs() < 0.1 {
                format!("{}mm", f.round() as i64)
            } else {
                format!("{:.1}mm", f)
            }
        }
        _ => String::new(),
    }
}

/// Reduces the capture timestamp (`2023:07:15 14:30:00`) to a
/// slash-separated date (`2023/07/15`) by discarding everything after the
/// first space and swapping the date separators.
fn capture_date(exif: &Exif) -> String {
    let stamp = string_field(exif, Tag::DateTimeOriginal);
    match stamp.split(' ').next() {
        Some(date) if !date.is_empty() => date.replace(':', "/"),
        _ => String::new(),
    }
}
