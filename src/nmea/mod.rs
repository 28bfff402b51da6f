//! NMEA 0183 sentence handling: tags, framing, payload decoding and the
//! streaming line buffer.

use core::fmt;

pub mod buffer;
pub mod frame;
pub mod parse;

/// Five-character sentence identifier: two-letter constellation prefix
/// (`GP`, `GN`, `GL`, `GA`) plus three-letter sentence code.
///
/// Arbitrary tags are representable; the fix-state store and poll targets
/// are not restricted to the tags this crate knows how to decode.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tag(pub [u8; 5]);

impl Tag {
    pub const fn new(bytes: [u8; 5]) -> Self {
        Self(bytes)
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or("?????")
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical (GPS-prefixed) tags for the sentences the driver understands.
pub mod tags {
    use super::Tag;

    pub const GPGGA: Tag = Tag(*b"GPGGA");
    pub const GPVTG: Tag = Tag(*b"GPVTG");
    pub const GPRMC: Tag = Tag(*b"GPRMC");
    pub const GPGSV: Tag = Tag(*b"GPGSV");
    pub const GPGSA: Tag = Tag(*b"GPGSA");
    pub const GPGLL: Tag = Tag(*b"GPGLL");
}

/// Constellation-variant tags that share a field layout with a canonical
/// decoder. Static table, populated once; the original system derived this
/// aliasing by reflecting over its own attributes.
const SYNONYMS: &[(Tag, Tag)] = &[
    (Tag(*b"GNGGA"), tags::GPGGA),
    (Tag(*b"GLGGA"), tags::GPGGA),
    (Tag(*b"GAGGA"), tags::GPGGA),
    (Tag(*b"GNVTG"), tags::GPVTG),
    (Tag(*b"GLVTG"), tags::GPVTG),
    (Tag(*b"GAVTG"), tags::GPVTG),
    (Tag(*b"GNRMC"), tags::GPRMC),
    (Tag(*b"GLRMC"), tags::GPRMC),
    (Tag(*b"GARMC"), tags::GPRMC),
    (Tag(*b"GNGSV"), tags::GPGSV),
    (Tag(*b"GLGSV"), tags::GPGSV),
    (Tag(*b"GAGSV"), tags::GPGSV),
    (Tag(*b"GNGSA"), tags::GPGSA),
    (Tag(*b"GLGSA"), tags::GPGSA),
    (Tag(*b"GAGSA"), tags::GPGSA),
    (Tag(*b"GNGLL"), tags::GPGLL),
    (Tag(*b"GLGLL"), tags::GPGLL),
    (Tag(*b"GAGLL"), tags::GPGLL),
];

/// Resolve a tag to the canonical tag whose decoder handles it.
///
/// Tags with no synonym entry map to themselves, known or not.
pub fn canonical(tag: Tag) -> Tag {
    SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == tag)
        .map(|&(_, canon)| canon)
        .unwrap_or(tag)
}
