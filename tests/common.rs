#![allow(dead_code)]

use ocular::{Node, OcularError, Registry, Result};
use serde_json::Value;

/// Render view items as JSON for compact comparisons.
pub fn to_json(nodes: &[Node<'_, String>]) -> Value {
    serde_json::to_value(nodes).expect("view items serialize")
}

/// Collect a view expression and render it as JSON.
pub fn view_json(reg: &Registry<String>, expr: &str) -> Result<Value> {
    let nodes = reg.view_all(expr)?;
    Ok(to_json(&nodes))
}

/// Text registry over `text` with base `chars` and an alphabetic `words` frame.
pub fn chars_and_words(text: &str) -> std::result::Result<Registry<String>, OcularError> {
    let mut reg = ocular::text::text_registry("chars", text)?;
    reg.new_frame_filter("words", "chars", |n| is_alpha(n), true)?;
    Ok(reg)
}

pub fn is_alpha(n: &Node<'_, String>) -> bool {
    n.value()
        .is_some_and(|v| !v.is_empty() && v.chars().all(char::is_alphabetic))
}
