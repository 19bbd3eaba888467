use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// One timed caption unit as written in an SRT file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleBlock {
    /// Sequence number as written in the source, never renumbered
    pub index: u32,
    /// Start timestamp in SRT form (`HH:MM:SS,mmm`)
    pub start: String,
    /// End timestamp in SRT form (`HH:MM:SS,mmm`)
    pub end: String,
    /// Display lines, never empty for a parsed block
    pub lines: Vec<String>,
}

/// Parse SRT text into blocks in file order.
///
/// The parser never fails: stray lines are skipped until the next
/// digits-only index line, and a block whose timing line lacks `-->` or
/// which carries no text is dropped.
pub fn parse_srt(content: &str) -> Vec<SubtitleBlock> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let lines: Vec<&str> = content.lines().map(|l| l.trim_end_matches('\r')).collect();

    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let index_line = lines[i].trim();
        i += 1;

        if index_line.is_empty() {
            continue;
        }
        let index = match parse_index(index_line) {
            Some(index) => index,
            None => {
                debug!("Skipping stray SRT line {}: {:?}", i, index_line);
                continue;
            }
        };

        let Some(timing) = lines.get(i).map(|l| l.trim()) else {
            break;
        };
        i += 1;

        let Some((start, end)) = timing.split_once("-->") else {
            debug!("Discarding block {}: timing line {:?} has no arrow", index, timing);
            continue;
        };

        let mut text = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            text.push(lines[i].to_string());
            i += 1;
        }

        if text.is_empty() {
            debug!("Discarding block {}: no text lines", index);
            continue;
        }

        blocks.push(SubtitleBlock {
            index,
            start: start.trim().to_string(),
            end: end.trim().to_string(),
            lines: text,
        });
    }

    blocks
}

/// Serialize blocks as SRT with CRLF line endings
pub fn serialize_srt(blocks: &[SubtitleBlock]) -> String {
    let mut parts: Vec<String> = Vec::new();
    for block in blocks {
        parts.push(block.index.to_string());
        parts.push(format!("{} --> {}", block.start, block.end));
        parts.extend(block.lines.iter().cloned());
        parts.push(String::new());
    }

    let mut content = parts.join("\r\n");
    if !content.ends_with("\r\n") {
        content.push_str("\r\n");
    }
    content
}

/// Read and parse an SRT file
pub fn read_srt<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleBlock>> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(parse_srt(&content))
}

/// Serialize blocks into an SRT file
pub fn write_srt<P: AsRef<Path>>(blocks: &[SubtitleBlock], path: P) -> Result<()> {
    fs::write(path.as_ref(), serialize_srt(blocks))?;
    Ok(())
}

fn parse_index(line: &str) -> Option<u32> {
    if line.bytes().all(|b| b.is_ascii_digit()) {
        line.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(index: u32, start: &str, end: &str, lines: &[&str]) -> SubtitleBlock {
        SubtitleBlock {
            index,
            start: start.to_string(),
            end: end.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_basic() {
        let srt = "1\n00:00:01,000 --> 00:00:02,500\nHello there\n\n2\n00:00:03,000 --> 00:00:04,000\nTwo\nlines\n";
        let blocks = parse_srt(srt);
        assert_eq!(
            blocks,
            vec![
                block(1, "00:00:01,000", "00:00:02,500", &["Hello there"]),
                block(2, "00:00:03,000", "00:00:04,000", &["Two", "lines"]),
            ]
        );
    }

    #[test]
    fn test_parse_crlf_and_bom() {
        let srt = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nHi\r\n\r\n";
        let blocks = parse_srt(srt);
        assert_eq!(blocks, vec![block(1, "00:00:01,000", "00:00:02,000", &["Hi"])]);
    }

    #[test]
    fn test_parse_skips_noise_and_resyncs() {
        let srt = "garbage\n\n7\nno arrow here\norphan text\n\n3\n00:00:05,000-->00:00:06,000\nKept\n\n\n\n1\n00:00:00,000 --> 00:00:01,000\nEarlier\n";
        let blocks = parse_srt(srt);
        assert_eq!(
            blocks,
            vec![
                block(3, "00:00:05,000", "00:00:06,000", &["Kept"]),
                block(1, "00:00:00,000", "00:00:01,000", &["Earlier"]),
            ]
        );
    }

    #[test]
    fn test_parse_drops_block_without_text() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:02,000 --> 00:00:03,000\nText\n";
        let blocks = parse_srt(srt);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].index, 2);
    }

    #[test]
    fn test_parse_truncated_input() {
        assert!(parse_srt("").is_empty());
        assert!(parse_srt("5").is_empty());
        assert!(parse_srt("5\n00:00:01,000 --> 00:00:02,000").is_empty());
    }

    #[test]
    fn test_serialize() {
        let blocks = vec![
            block(1, "00:00:01,000", "00:00:02,000", &["A"]),
            block(2, "00:00:03,000", "00:00:04,000", &["B", "C"]),
        ];
        assert_eq!(
            serialize_srt(&blocks),
            "1\r\n00:00:01,000 --> 00:00:02,000\r\nA\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nB\r\nC\r\n"
        );
        assert_eq!(serialize_srt(&[]), "\r\n");
    }

    #[test]
    fn test_content_round_trip() {
        let srt = "10\n00:00:01,000 --> 00:00:02,000\n  indented line\nsecond\n\n\n4\n00:01:00,000 --> 00:01:02,000\n{\\i1}tagged{\\i0}\n";
        let blocks = parse_srt(srt);
        assert_eq!(parse_srt(&serialize_srt(&blocks)), blocks);
    }
}
