use ocular::text::{
    add_line_frame, add_regex_frame, add_sentence_frame, add_token_frame, add_word_frame, graphemes,
    text_registry,
};
use ocular::Registry;
use regex::Regex;
use serde_json::json;
use std::error::Error;
use std::io::Write;
use std::process::Command;

mod common;
use common::view_json;

const TEXT: &str = "Hello, world. Bye now.\nSecond line!";

fn loaded(text: &str) -> Result<Registry<String>, Box<dyn Error>> {
    let mut reg = text_registry("chars", text)?;
    add_word_frame(&mut reg, "words", "chars")?;
    add_token_frame(&mut reg, "tokens", "chars")?;
    add_sentence_frame(&mut reg, "sents", "chars")?;
    add_line_frame(&mut reg, "lines", "chars")?;
    Ok(reg)
}

#[test]
fn standard_text_frames() -> Result<(), Box<dyn Error>> {
    let reg = loaded(TEXT)?;
    assert_eq!(
        view_json(&reg, "words/chars")?,
        json!(["Hello", "world", "Bye", "now", "Second", "line"])
    );
    assert_eq!(
        view_json(&reg, "tokens/chars")?,
        json!(["Hello,", "world.", "Bye", "now.", "Second", "line!"])
    );
    assert_eq!(
        view_json(&reg, "sents/chars")?,
        json!(["Hello, world.", "Bye now.", "Second line!"])
    );
    assert_eq!(
        view_json(&reg, "lines/chars")?,
        json!(["Hello, world. Bye now.", "Second line!"])
    );
    Ok(())
}

#[test]
fn frames_nest_by_position() -> Result<(), Box<dyn Error>> {
    let reg = loaded(TEXT)?;
    assert_eq!(
        view_json(&reg, "lines.sents.words/chars")?,
        json!([[["Hello", "world"], ["Bye", "now"]], [["Second", "line"]]])
    );
    assert_eq!(
        view_json(&reg, "sents.tokens/chars")?,
        json!([["Hello,", "world."], ["Bye", "now."], ["Second", "line!"]])
    );
    Ok(())
}

#[test]
fn regex_frames() -> Result<(), Box<dyn Error>> {
    let mut reg = text_registry("chars", "a1 22 b333")?;
    add_regex_frame(&mut reg, "nums", "chars", &Regex::new(r"\d+")?)?;
    add_regex_frame(&mut reg, "maybe", "chars", &Regex::new(r"x*")?)?;
    assert_eq!(view_json(&reg, "nums/chars")?, json!(["1", "22", "333"]));
    assert_eq!(reg.frame("maybe").map(|f| f.len()), Some(0));
    Ok(())
}

#[test]
fn text_frames_over_derived_arrays() -> Result<(), Box<dyn Error>> {
    let mut reg = loaded(TEXT)?;
    let upper: Vec<String> = graphemes(&TEXT.to_uppercase());
    reg.new_array("upper", "chars", upper)?;
    add_word_frame(&mut reg, "upper_words", "upper")?;
    assert_eq!(view_json(&reg, "upper_words/chars")?.as_array().map(Vec::len), Some(6));
    assert_eq!(view_json(&reg, "sents.upper_words/upper")?[2], json!(["SECOND", "LINE"]));
    Ok(())
}

#[test]
fn regex_matches_inside_one_grapheme_share_a_cell() -> Result<(), Box<dyn Error>> {
    let mut reg = text_registry("chars", "e\u{301}x")?;
    add_regex_frame(&mut reg, "any", "chars", &Regex::new(".")?)?;
    assert_eq!(reg.frame("any").map(|f| f.len()), Some(2));
    assert_eq!(view_json(&reg, "any/chars")?, json!(["e\u{301}", "x"]));
    Ok(())
}

#[test]
fn words_over_multi_word_values() -> Result<(), Box<dyn Error>> {
    let mut reg = text_registry("chars", "Hi. Yo! ef")?;
    reg.new_frame("parts", "chars", [0..7, 8..10])?;
    reg.new_array("part_text", "parts", vec!["Hi. Yo!".to_string(), "ef".to_string()])?;
    add_word_frame(&mut reg, "w", "part_text")?;
    add_sentence_frame(&mut reg, "s", "part_text")?;

    assert_eq!(reg.parent_of("w"), Some("parts"));
    assert_eq!(view_json(&reg, "w/part_text")?, json!(["Hi. Yo!", "ef"]));
    assert_eq!(view_json(&reg, "w/chars")?, json!(["Hi. Yo!", "ef"]));
    assert!(reg.frame("s").is_some_and(|f| !f.is_empty()));
    Ok(())
}

#[test]
fn graphemes_are_the_unit() -> Result<(), Box<dyn Error>> {
    assert_eq!(graphemes("e\u{301}x"), vec!["e\u{301}".to_string(), "x".to_string()]);
    let mut reg = text_registry("chars", "cafe\u{301} bar")?;
    add_word_frame(&mut reg, "words", "chars")?;
    assert_eq!(reg.frame("chars").map(|f| f.len()), Some(8));
    assert_eq!(view_json(&reg, "words.chars")?[0], json!(["c", "a", "f", "e\u{301}"]));
    Ok(())
}

#[test]
fn empty_text() -> Result<(), Box<dyn Error>> {
    let reg = loaded("")?;
    for key in ["chars", "words", "tokens", "sents", "lines"] {
        assert_eq!(reg.frame(key).map(|f| f.len()), Some(0), "{}", key);
    }
    assert_eq!(view_json(&reg, "lines.words/chars")?, json!([]));
    Ok(())
}

#[test]
fn cli_views_a_file() -> Result<(), Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(TEXT.as_bytes())?;
    let path = file.path().to_str().ok_or("non utf-8 temp path")?;

    let out = Command::new(env!("CARGO_BIN_EXE_ocular"))
        .args(["view", "--json", "-i", path, "lines.words/chars"])
        .output()?;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let lines: Vec<serde_json::Value> = String::from_utf8(out.stdout)?
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(
        lines,
        vec![json!(["Hello", "world", "Bye", "now"]), json!(["Second", "line"])]
    );

    let out = Command::new(env!("CARGO_BIN_EXE_ocular"))
        .args(["view", "-i", path, "nope/chars"])
        .output()?;
    assert!(!out.status.success());
    Ok(())
}

#[test]
fn cli_dumps_frames() -> Result<(), Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(b"ab cd")?;
    let path = file.path().to_str().ok_or("non utf-8 temp path")?;

    let out = Command::new(env!("CARGO_BIN_EXE_ocular"))
        .args(["frames", "-i", path, "words"])
        .output()?;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let frame: serde_json::Value = serde_json::from_slice(&out.stdout)?;
    assert_eq!(frame["key"], json!("words"));
    assert_eq!(frame["parent"], json!("chars"));
    assert_eq!(frame["cells"], json!([[{"lo": 0, "hi": 2}], [{"lo": 3, "hi": 5}]]));
    Ok(())
}

#[test]
fn cli_base_key_must_not_clash_with_standard_frames() -> Result<(), Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(b"ab cd")?;
    let path = file.path().to_str().ok_or("non utf-8 temp path")?;

    for base in ["words", "tokens", "sents", "lines"] {
        let out = Command::new(env!("CARGO_BIN_EXE_ocular"))
            .args(["view", "-i", path, "-b", base, "words/chars"])
            .output()?;
        assert!(!out.status.success(), "base {} was accepted", base);
        assert!(String::from_utf8_lossy(&out.stderr).contains("standard frame"));
    }

    let out = Command::new(env!("CARGO_BIN_EXE_ocular"))
        .args(["view", "--json", "-i", path, "-b", "glyphs", "words/glyphs"])
        .output()?;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8(out.stdout)?, "\"ab\"\n\"cd\"\n");
    Ok(())
}
