//! Rule-based emoji annotation of transcript blocks.
//!
//! A trigger table is an ordered list of case-insensitive patterns, each
//! mapped to one glyph. For every block only the last line is inspected and
//! the first matching rule wins.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SubburnError};
use crate::subtitle::{read_srt, write_srt, SubtitleBlock};

/// Marker inserted before the extension of an annotated transcript
pub const EMOJI_MARKER: &str = "_emoji";

/// Uncompiled trigger as it appears in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRule {
    /// Regular expression, matched case-insensitively
    pub pattern: String,
    pub emoji: String,
}

impl TriggerRule {
    pub fn new(pattern: &str, emoji: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            emoji: emoji.to_string(),
        }
    }

    pub fn defaults() -> Vec<TriggerRule> {
        vec![
            Self::new(r"\b(?:thanks|thank you)\b", "🙏"),
            Self::new(r"\b(?:yes|yeah|yep)\b", "✅"),
            Self::new(r"\b(?:no|nah|nope)\b", "❌"),
            Self::new(r"\b(?:money|million|invoice|paid)\b", "💰"),
            Self::new(r"\b(?:idea|think|brainstorm)\b", "💡"),
            Self::new(r"\b(?:wow|amazing|incredible)\b", "🤯"),
            Self::new(r"\b(?:joke|funny|laugh)\b", "😂"),
            Self::new(r"\b(?:win|success|victory)\b", "🏆"),
            Self::new(r"100", "💯"),
        ]
    }
}

#[derive(Debug, Clone)]
struct Trigger {
    pattern: Regex,
    emoji: String,
}

/// Compiled, ordered trigger table
#[derive(Debug, Clone)]
pub struct EmojiTriggers {
    triggers: Vec<Trigger>,
    glyphs: Vec<String>,
}

static DEFAULT_TRIGGERS: Lazy<EmojiTriggers> = Lazy::new(|| {
    EmojiTriggers::from_rules(&TriggerRule::defaults()).expect("default emoji triggers compile")
});

impl EmojiTriggers {
    pub fn from_rules(rules: &[TriggerRule]) -> Result<Self> {
        let mut triggers = Vec::with_capacity(rules.len());
        for rule in rules {
            let pattern = RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    SubburnError::Config(format!("Invalid emoji trigger {:?}: {}", rule.pattern, e))
                })?;
            triggers.push(Trigger {
                pattern,
                emoji: rule.emoji.clone(),
            });
        }
        let glyphs = triggers.iter().map(|t| t.emoji.clone()).collect();
        Ok(Self { triggers, glyphs })
    }

    /// The built-in table
    pub fn builtin() -> &'static EmojiTriggers {
        &DEFAULT_TRIGGERS
    }

    /// Glyphs in table order, used to split emoji back out of display text
    pub fn glyphs(&self) -> &[String] {
        &self.glyphs
    }

    /// Glyph of the first rule matching `line`
    pub fn first_match(&self, line: &str) -> Option<&str> {
        self.triggers
            .iter()
            .find(|t| t.pattern.is_match(line))
            .map(|t| t.emoji.as_str())
    }
}

/// Annotate the last line of each block in place. Returns the number of
/// blocks that changed.
pub fn annotate_blocks(blocks: &mut [SubtitleBlock], triggers: &EmojiTriggers) -> usize {
    let mut changed = 0;
    for block in blocks.iter_mut() {
        let Some(last) = block.lines.last_mut() else {
            continue;
        };
        let Some(emoji) = triggers.first_match(last) else {
            continue;
        };
        if last.contains(emoji) {
            continue;
        }
        debug!("Block {}: appending {}", block.index, emoji);
        last.push(' ');
        last.push_str(emoji);
        changed += 1;
    }
    changed
}

/// Path of the annotated copy: `<stem>_emoji<.ext>` beside the original
pub fn emoji_output_path(srt: &Path) -> PathBuf {
    let stem = srt
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match srt.extension() {
        Some(ext) => format!("{}{}.{}", stem, EMOJI_MARKER, ext.to_string_lossy()),
        None => format!("{}{}", stem, EMOJI_MARKER),
    };
    srt.with_file_name(file_name)
}

/// Annotate an SRT file.
///
/// Returns `srt` itself when disabled or when no block changed. Otherwise the
/// annotated transcript is written to [`emoji_output_path`] and that path is
/// returned; the original file is left untouched.
pub fn inject_emojis(srt: &Path, enable: bool, triggers: &EmojiTriggers) -> Result<PathBuf> {
    if !enable {
        return Ok(srt.to_path_buf());
    }

    let mut blocks = read_srt(srt)?;
    let changed = annotate_blocks(&mut blocks, triggers);
    if changed == 0 {
        info!("No emoji triggers fired for {}", srt.display());
        return Ok(srt.to_path_buf());
    }

    let output = emoji_output_path(srt);
    write_srt(&blocks, &output)?;
    info!("Injected {} emojis into {}", changed, output.display());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(lines: &[&str]) -> SubtitleBlock {
        SubtitleBlock {
            index: 1,
            start: "00:00:00,000".to_string(),
            end: "00:00:01,000".to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_first_match_wins_in_table_order() {
        let triggers = EmojiTriggers::from_rules(&[
            TriggerRule::new(r"\b(?:yes|yeah)\b", "✅"),
            TriggerRule::new(r"\b(?:wow|amazing)\b", "🤯"),
            TriggerRule::new(r"\b(?:win|success)\b", "🏆"),
        ])
        .unwrap();
        let mut blocks = vec![block(&["That's amazing, we won!"])];
        assert_eq!(annotate_blocks(&mut blocks, &triggers), 1);
        assert_eq!(blocks[0].lines[0], "That's amazing, we won! 🤯");

        let mut blocks = vec![block(&["Amazing win"])];
        annotate_blocks(&mut blocks, &triggers);
        assert_eq!(blocks[0].lines[0], "Amazing win 🤯");
    }

    #[test]
    fn test_case_insensitive_word_boundaries() {
        let triggers = EmojiTriggers::builtin();
        assert_eq!(triggers.first_match("THANK YOU so much"), Some("🙏"));
        assert_eq!(triggers.first_match("nobody knows"), None);
        assert_eq!(triggers.first_match("a 1000 times"), Some("💯"));
    }

    #[test]
    fn test_only_last_line_inspected() {
        let mut blocks = vec![block(&["yes indeed", "and then"])];
        assert_eq!(annotate_blocks(&mut blocks, EmojiTriggers::builtin()), 0);
        assert_eq!(blocks[0].lines, vec!["yes indeed", "and then"]);
    }

    #[test]
    fn test_glyph_already_present_stops_evaluation() {
        let mut blocks = vec![block(&["yes ✅ and money"])];
        assert_eq!(annotate_blocks(&mut blocks, EmojiTriggers::builtin()), 0);
        assert_eq!(blocks[0].lines[0], "yes ✅ and money");
    }

    #[test]
    fn test_emoji_output_path() {
        assert_eq!(
            emoji_output_path(Path::new("/clips/talk.srt")),
            PathBuf::from("/clips/talk_emoji.srt")
        );
        assert_eq!(emoji_output_path(Path::new("talk")), PathBuf::from("talk_emoji"));
    }

    #[test]
    fn test_glyphs_in_table_order() {
        let glyphs = EmojiTriggers::builtin().glyphs();
        assert_eq!(glyphs.first().map(String::as_str), Some("🙏"));
        assert_eq!(glyphs.last().map(String::as_str), Some("💯"));
    }
}
