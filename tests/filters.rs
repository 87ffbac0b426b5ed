use ocular::{Node, OcularError};
use serde_json::json;
use std::error::Error;

mod common;
use common::{chars_and_words, view_json};

fn is_lower(n: &Node<'_, String>) -> bool {
    n.value()
        .is_some_and(|v| v.chars().all(char::is_lowercase))
}

fn starts_upper(n: &Node<'_, String>) -> bool {
    n.value()
        .and_then(|v| v.chars().next())
        .is_some_and(char::is_uppercase)
}

#[test]
fn filter_selects_view_items() -> Result<(), Box<dyn Error>> {
    let mut reg = chars_and_words("ab Cd ef")?;
    reg.new_frame_filter("lower_words", "words/chars", is_lower, false)?;
    reg.new_frame_filter("caps", "words/chars", starts_upper, false)?;

    assert_eq!(view_json(&reg, "lower_words/chars")?, json!(["ab", "ef"]));
    let lower = reg.frame("lower_words").ok_or("missing lower_words")?;
    assert_eq!(lower.parent(), Some("words"));
    assert_eq!(lower.len(), 2);

    let caps = reg.frame("caps").ok_or("missing caps")?;
    let spans: Vec<(usize, usize)> = caps.cells()[0].spans().iter().map(|s| (s.lo, s.hi)).collect();
    assert_eq!(spans, vec![(3, 5)]);
    assert_eq!(view_json(&reg, "caps/chars")?, json!(["Cd"]));
    Ok(())
}

#[test]
fn merged_filter_joins_runs() -> Result<(), Box<dyn Error>> {
    let mut reg = chars_and_words("ab cd Ef")?;
    reg.new_frame_filter("low", "words/chars", is_lower, true)?;
    reg.new_frame_filter("low_each", "words/chars", is_lower, false)?;

    assert_eq!(reg.frame("low").map(|f| f.len()), Some(1));
    assert_eq!(reg.frame("low_each").map(|f| f.len()), Some(2));
    assert_eq!(view_json(&reg, "low.chars")?, json!([["a", "b", "c", "d"]]));
    assert_eq!(view_json(&reg, "low.words/chars")?, json!([["ab", "cd"]]));
    Ok(())
}

#[test]
fn filter_over_plural_items() -> Result<(), Box<dyn Error>> {
    let mut reg = chars_and_words("a bc def gh")?;
    reg.new_frame_filter("pairs", "words.chars", |n| n.items().is_some_and(|i| i.len() == 2), false)?;
    assert_eq!(view_json(&reg, "pairs/chars")?, json!(["bc", "gh"]));
    Ok(())
}

#[test]
fn filter_on_bare_array_uses_its_viewpoint() -> Result<(), Box<dyn Error>> {
    let mut reg = chars_and_words("ab cd")?;
    reg.new_array("tags", "words", vec!["keep".to_string(), "drop".to_string()])?;
    reg.new_frame_filter("kept", "tags", |n| n.value().is_some_and(|v| v == "keep"), false)?;
    assert_eq!(reg.parent_of("kept"), Some("words"));
    assert_eq!(view_json(&reg, "kept/chars")?, json!(["ab"]));
    Ok(())
}

#[test]
fn filter_selecting_nothing_gives_an_empty_frame() -> Result<(), Box<dyn Error>> {
    let mut reg = chars_and_words("ab cd")?;
    reg.new_frame_filter("none", "chars", |_| false, true)?;
    assert_eq!(reg.frame("none").map(|f| f.is_empty()), Some(true));
    assert_eq!(view_json(&reg, "none.chars")?, json!([]));
    Ok(())
}

#[test]
fn filter_errors() -> Result<(), Box<dyn Error>> {
    let mut reg = chars_and_words("ab cd")?;
    assert_eq!(
        reg.new_frame_filter("words", "chars", |_| true, false),
        Err(OcularError::DuplicateKey("words".into()))
    );
    assert_eq!(
        reg.new_frame_filter("x", "words/nope", |_| true, false),
        Err(OcularError::UnknownArray("nope".into()))
    );
    assert!(matches!(
        reg.new_frame_filter("x", "words chars", |_| true, false),
        Err(OcularError::ScopeSyntax { .. })
    ));
    reg.new_frame("mixed", "chars", vec![vec![0..1, 3..4]])?;
    assert!(matches!(
        reg.new_frame_filter("x", "mixed/chars", |_| true, false),
        Err(OcularError::SingularityViolation { .. })
    ));
    assert!(reg.frame("x").is_none());
    Ok(())
}
