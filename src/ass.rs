//! Advanced SubStation Alpha synthesis from parsed SRT blocks.

use std::path::Path;
use tracing::info;

use crate::config::StyleConfig;
use crate::error::{Result, SubburnError};
use crate::subtitle::SubtitleBlock;
use crate::timestamp::srt_to_ass_time;

/// Name of the single style every dialogue line refers to
pub const STYLE_NAME: &str = "Default";

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";
const EVENT_FORMAT: &str = "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

const LINE_BREAK: &str = "\\N";
const HARD_SPACE: &str = "\\h";

/// Escape the characters ASS treats as override syntax
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '{' => escaped.push_str("\\{"),
            '}' => escaped.push_str("\\}"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Split a known trailing glyph (and one space before it) off a line.
///
/// Glyphs are tried in table order against the line with trailing
/// whitespace removed. Without a match the line comes back unchanged.
pub fn split_trailing_emoji<'a, 'g>(line: &'a str, glyphs: &'g [String]) -> (&'a str, Option<&'g str>) {
    let trimmed = line.trim_end();
    for glyph in glyphs {
        if let Some(prose) = trimmed.strip_suffix(glyph.as_str()) {
            let prose = prose.strip_suffix(' ').unwrap_or(prose);
            return (prose, Some(glyph.as_str()));
        }
    }
    (line, None)
}

/// Render one block's lines as dialogue text
pub fn format_event_text(lines: &[String], style: &StyleConfig, glyphs: &[String]) -> String {
    lines
        .iter()
        .map(|line| format_line(line, style, glyphs))
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

fn format_line(line: &str, style: &StyleConfig, glyphs: &[String]) -> String {
    let (prose, emoji) = split_trailing_emoji(line, glyphs);
    let mut text = escape(prose);

    let Some(emoji) = emoji else {
        return text;
    };

    if !text.is_empty() && !text.ends_with(' ') {
        text.push_str(HARD_SPACE);
    }
    match &style.emoji_font {
        Some(font) => {
            text.push_str(&format!("{{\\fn{}}}{}{{\\r}}", escape(font), escape(emoji)));
        }
        None => text.push_str(&escape(emoji)),
    }
    text
}

/// Builds ASS documents for one style and glyph table
pub struct AssSynthesizer<'a> {
    style: &'a StyleConfig,
    glyphs: &'a [String],
}

impl<'a> AssSynthesizer<'a> {
    pub fn new(style: &'a StyleConfig, glyphs: &'a [String]) -> Self {
        Self { style, glyphs }
    }

    /// Render the document. `canvas` overrides the style's play resolution.
    ///
    /// `source` only names the transcript in the `EmptyTranscript` error.
    pub fn render(
        &self,
        blocks: &[SubtitleBlock],
        canvas: Option<(u32, u32)>,
        source: &Path,
    ) -> Result<String> {
        if blocks.is_empty() {
            return Err(SubburnError::EmptyTranscript(source.to_path_buf()));
        }

        let resized;
        let style = match canvas {
            Some((width, height)) => {
                resized = self.style.with_canvas(width, height);
                &resized
            }
            None => self.style,
        };

        let mut out: Vec<String> = vec![
            "[Script Info]".to_string(),
            "ScriptType: v4.00+".to_string(),
            "WrapStyle: 0".to_string(),
            "ScaledBorderAndShadow: yes".to_string(),
            "YCbCr Matrix: TV.709".to_string(),
            format!("PlayResX: {}", style.play_res_x),
            format!("PlayResY: {}", style.play_res_y),
            String::new(),
            "[V4+ Styles]".to_string(),
            STYLE_FORMAT.to_string(),
            style_line(style),
            String::new(),
            "[Events]".to_string(),
            EVENT_FORMAT.to_string(),
        ];

        for block in blocks {
            let start = srt_to_ass_time(&block.start)?;
            let end = srt_to_ass_time(&block.end)?;
            let text = format_event_text(&block.lines, style, self.glyphs);
            out.push(format!(
                "Dialogue: 0,{},{},{},,0,0,0,,{}",
                start, end, STYLE_NAME, text
            ));
        }

        let mut document = out.join("\n");
        document.push('\n');
        Ok(document)
    }

    /// Render and write the document to `output`
    pub fn write(
        &self,
        blocks: &[SubtitleBlock],
        canvas: Option<(u32, u32)>,
        source: &Path,
        output: &Path,
    ) -> Result<()> {
        let document = self.render(blocks, canvas, source)?;
        std::fs::write(output, document)?;
        info!("Wrote ASS subtitles to {}", output.display());
        Ok(())
    }
}

fn style_line(style: &StyleConfig) -> String {
    format!(
        "Style: {},{},{},{},{},{},{},0,0,0,0,100,100,0,0,1,{},{},{},{},{},{},1",
        STYLE_NAME,
        style.font_name,
        style.font_size,
        style.primary_colour,
        style.secondary_colour,
        style.outline_colour,
        style.back_colour,
        style.outline,
        style.shadow,
        style.alignment,
        style.margin_l,
        style.margin_r,
        style.margin_v,
    )
}
