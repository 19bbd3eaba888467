use assert_fs::prelude::*;

use subburn::ass::AssSynthesizer;
use subburn::config::{Config, StyleConfig};
use subburn::emoji::{inject_emojis, EmojiTriggers, TriggerRule};
use subburn::subtitle::{read_srt, serialize_srt, write_srt};
use subburn::workflow::Workflow;

const PLAIN: &str = "1\r\n00:00:01,000 --> 00:00:02,000\r\nHello everyone\r\n\r\n2\r\n00:00:02,500 --> 00:00:04,250\r\nLet's get started\r\n";
const TRIGGERING: &str = "1\n00:00:01,000 --> 00:00:02,000\nWe made a million\n\n2\n00:00:02,000 --> 00:00:03,000\nno triggers\nthat was a great victory\n";

#[test]
fn annotator_returns_input_when_nothing_matches() {
    let dir = assert_fs::TempDir::new().unwrap();
    let srt = dir.child("talk.srt");
    srt.write_str(PLAIN).unwrap();

    let output = inject_emojis(srt.path(), true, EmojiTriggers::builtin()).unwrap();
    assert_eq!(output, srt.path());
    assert!(!dir.child("talk_emoji.srt").path().exists());
}

#[test]
fn annotator_disabled_writes_nothing() {
    let dir = assert_fs::TempDir::new().unwrap();
    let srt = dir.child("talk.srt");
    srt.write_str(TRIGGERING).unwrap();

    let output = inject_emojis(srt.path(), false, EmojiTriggers::builtin()).unwrap();
    assert_eq!(output, srt.path());
    assert!(!dir.child("talk_emoji.srt").path().exists());
}

#[test]
fn annotator_writes_sibling_and_is_idempotent() {
    let dir = assert_fs::TempDir::new().unwrap();
    let srt = dir.child("talk.srt");
    srt.write_str(TRIGGERING).unwrap();

    let annotated = inject_emojis(srt.path(), true, EmojiTriggers::builtin()).unwrap();
    assert_eq!(annotated, dir.child("talk_emoji.srt").path());
    srt.assert(TRIGGERING);

    let blocks = read_srt(&annotated).unwrap();
    assert_eq!(blocks[0].lines, vec!["We made a million 💰"]);
    assert_eq!(blocks[1].lines, vec!["no triggers", "that was a great victory 🏆"]);

    let again = inject_emojis(&annotated, true, EmojiTriggers::builtin()).unwrap();
    assert_eq!(again, annotated);
    assert!(!dir.child("talk_emoji_emoji.srt").path().exists());
}

#[test]
fn custom_trigger_order_decides_glyph() {
    let dir = assert_fs::TempDir::new().unwrap();
    let srt = dir.child("win.srt");
    srt.write_str("1\n00:00:00,000 --> 00:00:01,000\nThat's amazing, we won!\n").unwrap();

    let triggers = EmojiTriggers::from_rules(&[
        TriggerRule::new(r"\b(?:yes|yeah)\b", "✅"),
        TriggerRule::new(r"\b(?:wow|amazing)\b", "🤯"),
        TriggerRule::new(r"\b(?:win|won|success)\b", "🏆"),
    ])
    .unwrap();
    let annotated = inject_emojis(srt.path(), true, &triggers).unwrap();
    let blocks = read_srt(annotated).unwrap();
    assert_eq!(blocks[0].lines, vec!["That's amazing, we won! 🤯"]);
}

#[test]
fn srt_file_round_trip_preserves_content() {
    let dir = assert_fs::TempDir::new().unwrap();
    let original = dir.child("in.srt");
    original
        .write_str("3\n00:00:01,000 --> 00:00:02,000\nA\nB\n\n\n1\n00:00:00,000 --> 00:00:00,500\nC\n")
        .unwrap();

    let blocks = read_srt(original.path()).unwrap();
    let copy = dir.child("out.srt");
    write_srt(&blocks, copy.path()).unwrap();

    assert_eq!(read_srt(copy.path()).unwrap(), blocks);
    copy.assert(serialize_srt(&blocks).as_str());
}

#[test]
fn two_blocks_to_landscape_ass() {
    let dir = assert_fs::TempDir::new().unwrap();
    let srt = dir.child("clip.srt");
    srt.write_str(PLAIN).unwrap();
    let ass = dir.child("clip.ass");

    let style = StyleConfig::default();
    let blocks = read_srt(srt.path()).unwrap();
    AssSynthesizer::new(&style, EmojiTriggers::builtin().glyphs())
        .write(&blocks, Some((1920, 1080)), srt.path(), ass.path())
        .unwrap();

    let content = std::fs::read_to_string(ass.path()).unwrap();
    assert!(content.starts_with("[Script Info]\n"));
    assert!(content.contains("PlayResX: 1920\n"));
    assert!(content.contains("PlayResY: 1080\n"));
    let dialogues: Vec<&str> = content.lines().filter(|l| l.starts_with("Dialogue:")).collect();
    assert_eq!(
        dialogues,
        vec![
            "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello everyone",
            "Dialogue: 0,0:00:02.50,0:00:04.25,Default,,0,0,0,,Let's get started",
        ]
    );
}

#[test]
fn workflow_synthesize_rejects_empty_transcript() {
    let dir = assert_fs::TempDir::new().unwrap();
    let srt = dir.child("empty.srt");
    srt.write_str("\r\n").unwrap();

    let mut config = Config::default();
    config.media.project_root = Some(dir.path().to_path_buf());
    let workflow = Workflow::new(config).unwrap();

    let err = workflow
        .synthesize(srt.path(), &dir.path().join("empty.ass"), None)
        .unwrap_err();
    assert!(err.to_string().contains("No subtitle entries"));
    assert!(!dir.child("empty.ass").path().exists());
}
