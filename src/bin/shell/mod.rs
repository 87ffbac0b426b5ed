// Interactive shell over a text registry: view scope expressions, inspect
// frames and derive new frames by filtering views.
// Commands: view, json, frames, arrays, frame, filter, help, exit/quit

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    validate::Validator,
    Context, Editor, Helper,
};
use std::cell::RefCell;
use std::rc::Rc;

use ocular::{Node, Registry};
use regex::Regex;

/// Help text for interactive shell commands.
const HELP_TEXT: &str = "\
Available commands:
  view <expr>                         print a scope expression as a labelled tree
  json <expr>                         print a scope expression, one JSON item per line
  frames                              list frames with their viewpoint and cell count
  arrays                              list arrays with their viewpoint
  frame <key>                         print the true cells of a frame
  filter [-m] <key> <scope> <regex>   register a frame of the scope's items matching regex
    -m       merge runs of adjacent matches into one cell
  help                                show this help
  exit, quit                          exit shell

Scope expressions: `lines.words/chars` ('.' plural, '/' singular),
`lines<` sets a prefix, `>chars` a suffix, `#` repeats the suffix,
`( ... )` groups scopes that are viewed side by side.
";

/// Print every item of a view; returns the number of top-level items.
pub fn print_view(
    reg: &Registry<String>,
    expr: &str,
    json: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut printed = 0usize;
    for (i, node) in reg.view(expr)?.enumerate() {
        let node = node?;
        if json {
            println!("{}", serde_json::to_string(&node)?);
        } else {
            let mut path = vec![i];
            print_node(&mut path, &node);
        }
        printed += 1;
    }
    Ok(printed)
}

fn print_node(path: &mut Vec<usize>, node: &Node<'_, String>) {
    match node {
        Node::Value(v) => {
            let label: Vec<String> = path.iter().map(usize::to_string).collect();
            println!("\x1b[90m{}\x1b[0m : {:?}", label.join("."), v.as_str());
        }
        Node::Seq(items) => {
            for (i, item) in items.iter().enumerate() {
                path.push(i);
                print_node(path, item);
                path.pop();
            }
        }
    }
}

/// Concatenated leaves of an item, as matched by `filter`.
fn node_text(node: &Node<'_, String>) -> String {
    node.leaves().into_iter().map(String::as_str).collect()
}

/// Byte offset where the key or command being typed at the end of `before` starts.
fn word_start(before: &str) -> usize {
    before
        .char_indices()
        .rfind(|&(_, c)| c.is_whitespace() || "./()<>".contains(c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0)
}

struct ShellState {
    reg: Registry<String>,
}

struct ShellHelper {
    state: Rc<RefCell<ShellState>>,
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let before = &line[..pos];
        let start = word_start(before);
        let word = &before[start..];
        let mut candidates = Vec::new();
        if before[..start].trim().is_empty() {
            let cmds = ["view", "json", "frames", "arrays", "frame", "filter", "help", "exit", "quit"];
            for &cmd in &cmds {
                if cmd.starts_with(word) {
                    candidates.push(Pair {
                        display: cmd.to_string(),
                        replacement: format!("{} ", cmd),
                    });
                }
            }
            return Ok((start, candidates));
        }
        let state = self.state.borrow();
        let mut keys: Vec<&str> = state.reg.frame_keys();
        keys.extend(state.reg.array_keys());
        keys.sort_unstable();
        keys.dedup();
        for key in keys {
            if key.starts_with(word) {
                candidates.push(Pair {
                    display: key.to_string(),
                    replacement: key.to_string(),
                });
            }
        }
        Ok((start, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

/// Process one shell command; returns true to exit the shell.
fn handle_cmd(state: &Rc<RefCell<ShellState>>, raw: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let line = raw.trim();
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };
    match cmd {
        "" => {}
        "view" | "json" => {
            if rest.is_empty() {
                println!("Usage: {} <expr>", cmd);
                return Ok(false);
            }
            let state_ref = state.borrow();
            match print_view(&state_ref.reg, rest, cmd == "json") {
                Ok(printed) => println!("\n{} {}", printed, if printed == 1 { "item" } else { "items" }),
                Err(e) => println!("Error viewing {}: {}", rest, e),
            }
        }
        "frames" => {
            let state_ref = state.borrow();
            for key in state_ref.reg.frame_keys() {
                if let Some(frame) = state_ref.reg.frame(key) {
                    println!(
                        "{:<16} {:<16} {} cells",
                        key,
                        frame.parent().unwrap_or("-"),
                        frame.len()
                    );
                }
            }
        }
        "arrays" => {
            let state_ref = state.borrow();
            for key in state_ref.reg.array_keys() {
                if let Some(array) = state_ref.reg.array(key) {
                    println!("{:<16} {:<16} {} values", key, array.viewpoint(), array.len());
                }
            }
        }
        "frame" => {
            let state_ref = state.borrow();
            match state_ref.reg.frame(rest) {
                Some(frame) => {
                    for (i, cell) in frame.cells().iter().enumerate() {
                        println!("{:>6}  {}", i, cell);
                    }
                }
                None => println!("Unknown frame: {}", rest),
            }
        }
        "filter" => {
            let mut parts: Vec<&str> = rest.split_whitespace().collect();
            let merge = parts.first() == Some(&"-m");
            if merge {
                parts.remove(0);
            }
            let (key, scope, pattern) = match parts.as_slice() {
                [key, scope, pattern] => (*key, *scope, *pattern),
                _ => {
                    println!("Usage: filter [-m] <key> <scope> <regex>");
                    return Ok(false);
                }
            };
            let re = match Regex::new(pattern) {
                Ok(re) => re,
                Err(e) => {
                    println!("Invalid regex {}: {}", pattern, e);
                    return Ok(false);
                }
            };
            let mut state_mut = state.borrow_mut();
            let result = state_mut
                .reg
                .new_frame_filter(key, scope, |n| re.is_match(&node_text(n)), merge);
            match result {
                Ok(()) => {
                    let cells = state_mut.reg.frame(key).map(|f| f.len()).unwrap_or(0);
                    println!("Registered frame {} with {} cells", key, cells);
                }
                Err(e) => println!("Error filtering {}: {}", scope, e),
            }
        }
        "help" => println!("{}", HELP_TEXT),
        "exit" | "quit" => return Ok(true),
        _ => println!("Unknown command: {}", cmd),
    }
    Ok(false)
}

pub fn run_shell(reg: Registry<String>) -> Result<(), Box<dyn std::error::Error>> {
    let state = Rc::new(RefCell::new(ShellState { reg }));
    let helper = ShellHelper {
        state: Rc::clone(&state),
    };
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    let frames = state.borrow().reg.frame_keys().len();
    println!("Registry contains {} frames", frames);
    println!("{}", HELP_TEXT);

    loop {
        match rl.readline("ocular> ") {
            Ok(line) => {
                let raw = line.trim();
                if raw.is_empty() {
                    continue;
                }
                rl.add_history_entry(raw);
                if handle_cmd(&state, raw)? {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

/// Execute shell commands non-interactively; `;` separates commands.
pub fn run_shell_commands(
    reg: Registry<String>,
    commands: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Rc::new(RefCell::new(ShellState { reg }));
    let line = commands.join(" ");
    for cmd in line.split(';') {
        println!("> {}", cmd.trim());
        if handle_cmd(&state, cmd)? {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::word_start;

    #[test]
    fn completion_starts_after_the_last_delimiter() {
        assert_eq!(word_start("vi"), 0);
        assert_eq!(word_start("view lines.wo"), 11);
        assert_eq!(word_start("view (words/ch"), 12);
        let wide = "view\u{3000}wo";
        assert_eq!(&wide[word_start(wide)..], "wo");
        let trailing = "view lines\u{3000}";
        assert_eq!(word_start(trailing), trailing.len());
    }
}
