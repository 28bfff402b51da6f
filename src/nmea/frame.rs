//! Frame scanner: recognizes one NMEA sentence in a line of bytes and
//! validates its checksum.

use tinyvec::ArrayVec;

use super::{parse, Tag};

/// Longest sentence the scanner will keep. NMEA 0183 caps sentences at 82
/// bytes; the slack absorbs receivers that run a little long.
pub const MAX_SENTENCE: usize = 96;

/// One scanned sentence: `$TTTTT<payload>*HH\r`.
///
/// The frame is kept even when the checksum fails or the tag has no
/// decoder, so callers can observe integrity; whether it is merged into
/// fix state is the poll loop's decision.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Frame {
    /// Raw sentence bytes, `$` through `\r` inclusive.
    pub raw: ArrayVec<[u8; MAX_SENTENCE]>,
    /// Sentence tag as received (constellation prefix preserved).
    pub tag: Tag,
    /// Checksum declared after the `*`.
    pub declared_checksum: u8,
    /// XOR fold of the bytes between `$` and `*`.
    pub computed_checksum: u8,
    /// `declared_checksum == computed_checksum`.
    pub integrity: bool,
    /// Decoded payload; `None` for unknown tags.
    pub data: Option<parse::SentenceData>,
}

impl Frame {
    /// Payload text between the tag and the `*`, leading comma included.
    pub fn payload(&self) -> &str {
        let star = self
            .raw
            .iter()
            .position(|&b| b == b'*')
            .unwrap_or(self.raw.len());
        self.raw
            .get(6..star)
            .and_then(|p| core::str::from_utf8(p).ok())
            .unwrap_or("")
    }
}

/// XOR fold over `bytes`, the NMEA checksum.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Find the first well-formed frame in `line`.
///
/// The pattern is `$`, five tag bytes (ASCII uppercase or digits), the
/// payload, `*`, two hex digits and the `\r` terminator, with exactly one
/// `*` after the `$`. Anything else is a framing miss and yields `None`;
/// receivers emit other line formats and those are skipped silently. A
/// candidate without its trailing terminator is also `None` so the caller
/// keeps the bytes and waits for more.
pub fn scan(line: &[u8]) -> Option<Frame> {
    let start = line.iter().position(|&b| b == b'$')?;
    let rest = &line[start..];
    // "$" + tag + "*" + 2 hex + "\r"
    if rest.len() < 10 || rest.len() > MAX_SENTENCE {
        return None;
    }
    let tag_bytes = &rest[1..6];
    if !tag_bytes
        .iter()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    {
        return None;
    }
    let star = rest.iter().position(|&b| b == b'*')?;
    if star < 6 || rest[star + 1..].contains(&b'*') {
        return None;
    }
    let declared = hex_pair(rest.get(star + 1..star + 3)?)?;
    if rest.get(star + 3) != Some(&b'\r') {
        return None;
    }
    let end = star + 4;

    let computed = checksum(&rest[1..star]);
    let tag = Tag(tag_bytes.try_into().ok()?);
    let mut raw = ArrayVec::new();
    raw.extend_from_slice(&rest[..end]);

    let data = core::str::from_utf8(&rest[6..star])
        .ok()
        .and_then(|payload| parse::decode(tag, payload));

    Some(Frame {
        raw,
        tag,
        declared_checksum: declared,
        computed_checksum: computed,
        integrity: declared == computed,
        data,
    })
}

fn hex_pair(bytes: &[u8]) -> Option<u8> {
    let hi = char::from(*bytes.first()?).to_digit(16)?;
    let lo = char::from(*bytes.get(1)?).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}
