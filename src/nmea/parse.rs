//! Payload decoders for the understood sentence kinds.
//!
//! Each decoder is a pure function from the comma-separated payload text to
//! a [`SentenceData`] variant, addressed by its canonical tag through
//! [`decode`]. Individual fields that fail to parse become `None`; they
//! never fail the sentence as a whole.

use chrono::{NaiveDate, NaiveTime};
use tinyvec::ArrayVec;

use super::{canonical, tags, Tag};

/// Upper bound on payload fields: GSV tops out at 3 header fields plus
/// four groups of four.
const MAX_FIELDS: usize = 24;

/// Decoded payload, one variant per sentence kind the driver understands.
///
/// `Gsa` and `Gll` are deliberately empty: those sentences are recognized
/// and checksum-validated so they can satisfy poll targets, but nothing
/// downstream consumes their fields.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SentenceData {
    Gga(GgaData),
    Vtg(VtgData),
    Rmc(RmcData),
    Gsv(GsvData),
    Gsa,
    Gll,
}

/// Essential fix data (`GGA`): 3D position and fix quality.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct GgaData {
    /// UTC time of fix.
    pub time: Option<NaiveTime>,
    /// Latitude in decimal degrees, negative south.
    pub lat: Option<f64>,
    /// Longitude in decimal degrees, negative west.
    pub lon: Option<f64>,
    /// Fix quality, 0 = invalid.
    pub fix: Option<u8>,
    /// Satellites being tracked.
    pub sat: Option<u8>,
    /// Horizontal dilution of precision.
    pub hdop: Option<f32>,
    /// Altitude above mean sea level.
    pub height: Option<f32>,
    /// Altitude unit letter as received (`M`).
    pub units: Option<char>,
    /// Height of geoid above the WGS84 ellipsoid.
    pub hog: Option<f32>,
}

/// Track made good and ground speed (`VTG`).
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct VtgData {
    /// True track, degrees.
    pub track: Option<f32>,
    /// Magnetic track, degrees.
    pub magnetic: Option<f32>,
    /// Ground speed in km/h, taken from the km/h field of the sentence.
    pub speed: Option<f32>,
}

/// Recommended minimum position, velocity and time (`RMC`).
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct RmcData {
    /// UTC time of fix.
    pub time: Option<NaiveTime>,
    /// `A` = active, `V` = void.
    pub status: Option<char>,
    /// Latitude in decimal degrees, negative south.
    pub lat: Option<f64>,
    /// Longitude in decimal degrees, negative west.
    pub lon: Option<f64>,
    /// Ground speed in km/h, converted from the knots field.
    pub speed: Option<f32>,
    /// Track made good, degrees.
    pub track: Option<f32>,
    /// Calendar date; two-digit years land in 20xx.
    pub date: Option<NaiveDate>,
    /// Magnetic variation, degrees.
    pub variation: Option<f32>,
    /// Variation direction letter (`E`/`W`).
    pub variation_dir: Option<char>,
}

/// Satellites in view (`GSV`), one sentence of a multi-sentence cycle.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct GsvData {
    /// Total satellites in view according to the receiver.
    pub in_view: Option<u8>,
    /// The up-to-four satellite records carried by this sentence.
    pub satellites: ArrayVec<[SatelliteInfo; 4]>,
}

/// Last-seen state of one satellite, keyed by PRN in the satellite table.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SatelliteInfo {
    /// Pseudo-random-noise identifier.
    pub prn: u16,
    /// Elevation, degrees.
    pub elevation: Option<f32>,
    /// Azimuth, degrees from true north.
    pub azimuth: Option<f32>,
    /// Signal-to-noise ratio, dB.
    pub snr: Option<f32>,
    /// Tag of the sentence that reported this record, for provenance
    /// across constellation variants.
    pub source: Tag,
}

/// Decode a payload by tag. `source` is the tag as received; decoding is
/// dispatched on its canonical form. Unknown tags yield `None`.
pub fn decode(source: Tag, payload: &str) -> Option<SentenceData> {
    match canonical(source) {
        tags::GPGGA => Some(gga(payload)),
        tags::GPVTG => Some(vtg(payload)),
        tags::GPRMC => Some(rmc(payload)),
        tags::GPGSV => Some(gsv(payload, source)),
        tags::GPGSA => Some(SentenceData::Gsa),
        tags::GPGLL => Some(SentenceData::Gll),
        _ => None,
    }
}

/// Convert an NMEA `ddmm.mmmm` coordinate to decimal degrees.
///
/// Whole degrees are `value / 100` truncated; the remainder is minutes,
/// divided by 60. Southern and western hemispheres negate the result (one
/// historical variant of the source squared the value here instead; the
/// sign flip is the intended behavior and the tests pin it).
pub fn convert_coords(raw: &str, hemisphere: &str) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    let degrees = (value / 100.0) as u64 as f64 + (value % 100.0) / 60.0;
    Some(match hemisphere {
        "S" | "W" => -degrees,
        _ => degrees,
    })
}

fn split_fields(payload: &str) -> ArrayVec<[&str; MAX_FIELDS]> {
    let mut out = ArrayVec::new();
    // The payload keeps its leading comma (everything between tag and '*'),
    // so the first split element is empty and skipped.
    for f in payload.split(',').skip(1) {
        if out.try_push(f).is_some() {
            break;
        }
    }
    out
}

fn field<'a>(fields: &[&'a str], i: usize) -> &'a str {
    fields.get(i).copied().unwrap_or("")
}

/// `hhmmss[.sss]` time of day.
fn time_of_day(s: &str) -> Option<NaiveTime> {
    if s.len() < 6 || !s.is_ascii() {
        return None;
    }
    let h: u32 = s[0..2].parse().ok()?;
    let m: u32 = s[2..4].parse().ok()?;
    let sec: f64 = s[4..].parse().ok()?;
    let whole = sec as u32;
    let milli = ((sec - whole as f64) * 1000.0) as u32;
    NaiveTime::from_hms_milli_opt(h, m, whole, milli)
}

/// `ddmmyy` calendar date, year mapped into 20xx.
fn calendar_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 6 || !s.is_ascii() {
        return None;
    }
    let d: u32 = s[0..2].parse().ok()?;
    let m: u32 = s[2..4].parse().ok()?;
    let y: i32 = s[4..6].parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + y, m, d)
}

/// `$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47`
///
/// Fields: time, lat, N/S, lon, E/W, fix quality, satellites tracked,
/// HDOP, altitude, unit, geoid height, unit, DGPS age, DGPS station.
fn gga(payload: &str) -> SentenceData {
    let f = split_fields(payload);
    SentenceData::Gga(GgaData {
        time: time_of_day(field(&f, 0)),
        lat: convert_coords(field(&f, 1), field(&f, 2)),
        lon: convert_coords(field(&f, 3), field(&f, 4)),
        fix: field(&f, 5).parse().ok(),
        sat: field(&f, 6).parse().ok(),
        hdop: field(&f, 7).parse().ok(),
        height: field(&f, 8).parse().ok(),
        units: field(&f, 9).chars().next(),
        hog: field(&f, 10).parse().ok(),
    })
}

/// `$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K*48`
///
/// Speed is read from field 6, the km/h position, not the knots field.
fn vtg(payload: &str) -> SentenceData {
    let f = split_fields(payload);
    SentenceData::Vtg(VtgData {
        track: field(&f, 0).parse().ok(),
        magnetic: field(&f, 2).parse().ok(),
        speed: field(&f, 6).parse().ok(),
    })
}

/// `$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A`
///
/// Speed arrives in knots and is converted to km/h.
fn rmc(payload: &str) -> SentenceData {
    let f = split_fields(payload);
    SentenceData::Rmc(RmcData {
        time: time_of_day(field(&f, 0)),
        status: field(&f, 1).chars().next(),
        lat: convert_coords(field(&f, 2), field(&f, 3)),
        lon: convert_coords(field(&f, 4), field(&f, 5)),
        speed: field(&f, 6).parse::<f32>().ok().map(|knots| knots * 1.852),
        track: field(&f, 7).parse().ok(),
        date: calendar_date(field(&f, 8)),
        variation: field(&f, 9).parse().ok(),
        variation_dir: field(&f, 10).chars().next(),
    })
}

/// `$GPGSV,3,1,11,03,03,111,00,04,15,270,00,06,01,010,00,13,06,292,00*74`
///
/// Three header fields (sentence count, sentence number, satellites in
/// view) followed by four fields per satellite. The group count comes from
/// the payload length, not a constant: receivers emit 0 to 4 groups and
/// may cut the final one short. Records with an empty id are dropped.
fn gsv(payload: &str, source: Tag) -> SentenceData {
    let f = split_fields(payload);
    let groups = f.len().saturating_sub(3) / 4;
    let mut satellites = ArrayVec::new();
    for i in 0..groups {
        let base = 3 + 4 * i;
        // Covers both the empty-id case and outright garbage.
        let Ok(prn) = field(&f, base).parse::<u16>() else {
            continue;
        };
        let _ = satellites.try_push(SatelliteInfo {
            prn,
            elevation: field(&f, base + 1).parse().ok(),
            azimuth: field(&f, base + 2).parse().ok(),
            snr: field(&f, base + 3).parse().ok(),
            source,
        });
    }
    SentenceData::Gsv(GsvData {
        in_view: field(&f, 2).parse().ok(),
        satellites,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn convert_coords_matches_reference_value() {
        let lat = convert_coords("4807.038", "N").unwrap();
        assert_relative_eq!(lat, 48.0 + 7.038 / 60.0, epsilon = 1e-9);
        assert_relative_eq!(lat, 48.1173, epsilon = 1e-4);
    }

    #[test]
    fn convert_coords_negates_southern_and_western_hemispheres() {
        // Negation, not the squaring a historical variant applied.
        let south = convert_coords("1", "S").unwrap();
        assert!(south < 0.0);
        assert_relative_eq!(south, -(1.0 / 60.0), epsilon = 1e-9);
        assert_relative_eq!(
            convert_coords("4807.038", "S").unwrap(),
            -48.1173,
            epsilon = 1e-4
        );
        assert!(convert_coords("01131.000", "W").unwrap() < 0.0);
    }

    #[test]
    fn convert_coords_absent_input_is_none() {
        assert_eq!(convert_coords("", "N"), None);
        assert_eq!(convert_coords("not-a-number", "N"), None);
    }

    #[test]
    fn gga_decodes_reference_sentence() {
        let data = decode(tags::GPGGA, ",123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,");
        let SentenceData::Gga(gga) = data.unwrap() else {
            panic!("expected GGA");
        };
        assert_eq!(gga.time, NaiveTime::from_hms_opt(12, 35, 19));
        assert_relative_eq!(gga.lat.unwrap(), 48.1173, epsilon = 1e-4);
        assert_relative_eq!(gga.lon.unwrap(), 11.5167, epsilon = 1e-4);
        assert_eq!(gga.fix, Some(1));
        assert_eq!(gga.sat, Some(8));
        assert_eq!(gga.hdop, Some(0.9));
        assert_eq!(gga.height, Some(545.4));
        assert_eq!(gga.units, Some('M'));
        assert_eq!(gga.hog, Some(46.9));
    }

    #[test]
    fn gga_malformed_field_stays_local() {
        // Broken HDOP must not take out its siblings.
        let data = decode(tags::GPGGA, ",123519,4807.038,N,01131.000,E,1,08,junk,545.4,M,46.9,M,,");
        let SentenceData::Gga(gga) = data.unwrap() else {
            panic!("expected GGA");
        };
        assert_eq!(gga.hdop, None);
        assert_eq!(gga.sat, Some(8));
        assert_eq!(gga.height, Some(545.4));
        assert!(gga.lon.is_some());
    }

    #[test]
    fn gga_empty_payload_decodes_to_all_absent() {
        let data = decode(tags::GPGGA, ",,,,,,,,,,,,,");
        let SentenceData::Gga(gga) = data.unwrap() else {
            panic!("expected GGA");
        };
        assert_eq!(gga, GgaData::default());
    }

    #[test]
    fn vtg_takes_speed_from_the_kmh_field() {
        let data = decode(tags::GPVTG, ",054.7,T,034.4,M,005.5,N,010.2,K");
        let SentenceData::Vtg(vtg) = data.unwrap() else {
            panic!("expected VTG");
        };
        assert_eq!(vtg.track, Some(54.7));
        assert_eq!(vtg.magnetic, Some(34.4));
        // Field 6 (10.2 km/h), not field 4 (5.5 knots).
        assert_eq!(vtg.speed, Some(10.2));
    }

    #[test]
    fn rmc_decodes_date_and_converts_knots() {
        let data = decode(
            tags::GPRMC,
            ",123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W",
        );
        let SentenceData::Rmc(rmc) = data.unwrap() else {
            panic!("expected RMC");
        };
        assert_eq!(rmc.status, Some('A'));
        assert_eq!(rmc.time, NaiveTime::from_hms_opt(12, 35, 19));
        assert_eq!(rmc.date, NaiveDate::from_ymd_opt(2094, 3, 23));
        assert_relative_eq!(rmc.speed.unwrap(), 22.4 * 1.852, epsilon = 1e-4);
        assert_eq!(rmc.track, Some(84.4));
        assert_eq!(rmc.variation, Some(3.1));
        assert_eq!(rmc.variation_dir, Some('W'));
        assert_relative_eq!(rmc.lat.unwrap(), 48.1173, epsilon = 1e-4);
    }

    #[test]
    fn gsv_count_comes_from_field_count() {
        // Two full groups: 3 header fields + 8.
        let data = decode(tags::GPGSV, ",3,1,11,03,03,111,00,04,15,270,00");
        let SentenceData::Gsv(gsv) = data.unwrap() else {
            panic!("expected GSV");
        };
        assert_eq!(gsv.in_view, Some(11));
        assert_eq!(gsv.satellites.len(), 2);
        assert_eq!(gsv.satellites[0].prn, 3);
        assert_eq!(gsv.satellites[0].azimuth, Some(111.0));
        assert_eq!(gsv.satellites[1].prn, 4);
        assert_eq!(gsv.satellites[1].source, tags::GPGSV);
    }

    #[test]
    fn gsv_empty_id_is_dropped() {
        let data = decode(tags::GPGSV, ",3,1,11,03,03,111,00,,15,270,00");
        let SentenceData::Gsv(gsv) = data.unwrap() else {
            panic!("expected GSV");
        };
        assert_eq!(gsv.satellites.len(), 1);
        assert_eq!(gsv.satellites[0].prn, 3);
    }

    #[test]
    fn gsv_tolerates_a_partial_final_group() {
        // 3 header fields + 4 + 2: the cut group doesn't count.
        let data = decode(tags::GPGSV, ",3,3,11,22,42,067,42,24,12");
        let SentenceData::Gsv(gsv) = data.unwrap() else {
            panic!("expected GSV");
        };
        assert_eq!(gsv.satellites.len(), 1);
        assert_eq!(gsv.satellites[0].prn, 22);
    }

    #[test]
    fn gsv_keeps_source_tag_for_provenance() {
        let glonass = Tag(*b"GLGSV");
        let data = decode(glonass, ",1,1,01,70,30,180,25");
        let SentenceData::Gsv(gsv) = data.unwrap() else {
            panic!("expected GSV");
        };
        assert_eq!(gsv.satellites[0].source, glonass);
    }

    #[test]
    fn gsa_and_gll_acknowledge_without_fields() {
        assert_eq!(
            decode(tags::GPGSA, ",A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1"),
            Some(SentenceData::Gsa)
        );
        assert_eq!(
            decode(tags::GPGLL, ",4916.45,N,12311.12,W,225444,A"),
            Some(SentenceData::Gll)
        );
    }

    #[test]
    fn unknown_tag_decodes_to_none() {
        assert_eq!(decode(Tag(*b"GPZDA"), ",201530.00,04,07,2002,00,00"), None);
    }

    #[test]
    fn time_of_day_carries_fractional_seconds() {
        assert_eq!(
            time_of_day("123519.50"),
            NaiveTime::from_hms_milli_opt(12, 35, 19, 500)
        );
        assert_eq!(time_of_day("1235"), None);
        assert_eq!(time_of_day("badhms"), None);
    }
}
