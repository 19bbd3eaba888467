//! Conversion between SRT timestamps (`HH:MM:SS,mmm`) and ASS timestamps
//! (`H:MM:SS.CC`) through an integer centisecond value.

use crate::error::{Result, SubburnError};

const CS_PER_SECOND: u64 = 100;
const CS_PER_MINUTE: u64 = 60 * CS_PER_SECOND;
const CS_PER_HOUR: u64 = 60 * CS_PER_MINUTE;

/// Parse an SRT timestamp into centiseconds, rounding half up from milliseconds.
///
/// Hours may have any number of digits; minutes and seconds take exactly two
/// and milliseconds exactly three.
pub fn parse_to_centiseconds(text: &str) -> Result<u64> {
    let malformed = || SubburnError::MalformedTimestamp(text.to_string());

    let (clock, millis) = text.split_once(',').ok_or_else(malformed)?;
    let mut fields = clock.split(':');
    let (hours, minutes, seconds) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(h), Some(m), Some(s), None) => (h, m, s),
        _ => return Err(malformed()),
    };

    let hours = digits(hours, None).ok_or_else(malformed)?;
    let minutes = digits(minutes, Some(2)).ok_or_else(malformed)?;
    let seconds = digits(seconds, Some(2)).ok_or_else(malformed)?;
    let millis = digits(millis, Some(3)).ok_or_else(malformed)?;

    let total_millis = hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
        .ok_or_else(malformed)?;

    Ok(total_millis / 10 + u64::from(total_millis % 10 >= 5))
}

/// Format centiseconds as an ASS timestamp. Hours are not padded or bounded.
pub fn format_from_centiseconds(value: u64) -> String {
    let hours = value / CS_PER_HOUR;
    let minutes = (value % CS_PER_HOUR) / CS_PER_MINUTE;
    let seconds = (value % CS_PER_MINUTE) / CS_PER_SECOND;
    let centis = value % CS_PER_SECOND;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}

/// Convert an SRT timestamp straight to its ASS form
pub fn srt_to_ass_time(text: &str) -> Result<String> {
    parse_to_centiseconds(text).map(format_from_centiseconds)
}

fn digits(field: &str, width: Option<usize>) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if width.is_some_and(|w| field.len() != w) {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_to_centiseconds() {
        assert_eq!(parse_to_centiseconds("01:02:03,450").unwrap(), 370245);
        assert_eq!(parse_to_centiseconds("00:00:00,000").unwrap(), 0);
        assert_eq!(parse_to_centiseconds("123:00:00,000").unwrap(), 123 * CS_PER_HOUR);
    }

    #[test]
    fn test_parse_rounds_half_up() {
        assert_eq!(parse_to_centiseconds("00:00:00,004").unwrap(), 0);
        assert_eq!(parse_to_centiseconds("00:00:00,005").unwrap(), 1);
        assert_eq!(parse_to_centiseconds("00:00:00,015").unwrap(), 2);
        assert_eq!(parse_to_centiseconds("00:00:01,999").unwrap(), 200);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "00:00:00.000",
            "00:00,000",
            "00:00:00:00,000",
            "aa:00:00,000",
            "00:0:00,000",
            "00:00:00,00",
            "00:00:00,0000",
            ":00:00,000",
            "",
        ] {
            match parse_to_centiseconds(bad) {
                Err(SubburnError::MalformedTimestamp(text)) => assert_eq!(text, bad),
                other => panic!("expected MalformedTimestamp for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_format_from_centiseconds() {
        assert_eq!(format_from_centiseconds(370245), "1:02:03.45");
        assert_eq!(format_from_centiseconds(0), "0:00:00.00");
        assert_eq!(format_from_centiseconds(5999), "0:00:59.99");
        assert_eq!(format_from_centiseconds(100 * CS_PER_HOUR + 1), "100:00:00.01");
    }

    #[test]
    fn test_srt_to_ass_time() {
        assert_eq!(srt_to_ass_time("00:01:05,123").unwrap(), "0:01:05.12");
        assert_eq!(srt_to_ass_time("00:01:05,125").unwrap(), "0:01:05.13");
    }
}
