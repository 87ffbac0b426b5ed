//! Scopes and the scope expression language.
//!
//! A scope names a chain of frames ending at an array, e.g. `lines.words/chars`:
//! segments run from the coarsest frame on the left to the array on the right,
//! and the delimiter between two segments picks the join for that adjacency
//! (`/` singular, `.` plural).
//!
//! An expression is a whitespace separated list of tokens:
//!
//! * `name.name/name`: a scope, with the current prefix and suffix applied;
//! * `( ... )`: a nested expression, viewed in lockstep as one item;
//! * `seg<`: set the prefix for the following tokens (`seg/<` joins singular);
//! * `>seg`: set the suffix for the following tokens (`>.seg` joins plural);
//! * `#`: the current suffix on its own.
//!
//! `<` and `>` on their own clear the prefix and suffix.
//!
//! Keys are made of letters, digits, `_` and `-`; any other character in a
//! segment is a syntax error.

use std::fmt;
use std::str::FromStr;

use crate::error::{OcularError, Result};

/// Characters with a meaning in the expression grammar.
pub const RESERVED: &[char] = &['.', '/', '(', ')', '<', '>', '#'];

/// Whether `c` may appear in a frame or array key.
pub fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Whether `key` can name a frame or array.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(is_key_char)
}

/// How the cells of an outer frame take up the values beneath them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Join {
    /// Each outer cell must resolve to exactly one value.
    Singular,
    /// Each outer cell resolves to a sequence of values.
    Plural,
}

impl Join {
    pub fn delimiter(self) -> char {
        match self {
            Join::Singular => '/',
            Join::Plural => '.',
        }
    }

    pub fn from_delimiter(c: char) -> Option<Self> {
        match c {
            '/' => Some(Join::Singular),
            '.' => Some(Join::Plural),
            _ => None,
        }
    }
}

/// A chain of frames, outermost first, ending at an array.
///
/// `joins[i]` is the join between `frames[i]` and the next frame (or the
/// array, for the last frame).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    frames: Vec<String>,
    joins: Vec<Join>,
    array: String,
}

impl Scope {
    pub fn new<F, S>(frames: F, joins: Vec<Join>, array: &str) -> Result<Self>
    where
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let frames: Vec<String> = frames.into_iter().map(Into::into).collect();
        let scope = Scope {
            frames,
            joins,
            array: array.to_string(),
        };
        if scope.joins.len() != scope.frames.len() {
            return Err(OcularError::syntax(
                &scope.to_string(),
                format!(
                    "{} frames need {} joins, got {}",
                    scope.frames.len(),
                    scope.frames.len(),
                    scope.joins.len()
                ),
            ));
        }
        for key in scope.frames.iter().chain(std::iter::once(&scope.array)) {
            if !is_valid_key(key) {
                return Err(OcularError::InvalidKey(key.clone()));
            }
        }
        Ok(scope)
    }

    /// Scope naming an array on its own.
    pub fn array_only(array: &str) -> Result<Self> {
        Scope::new(Vec::<String>::new(), Vec::new(), array)
    }

    /// Parse a single scope such as `sents.words/chars`.
    pub fn parse(src: &str) -> Result<Self> {
        let mut frames = Vec::new();
        let mut joins = Vec::new();
        let mut start = 0;
        for (i, c) in src.char_indices() {
            if let Some(join) = Join::from_delimiter(c) {
                frames.push(segment(src, &src[start..i])?.to_string());
                joins.push(join);
                start = i + c.len_utf8();
            }
        }
        let array = segment(src, &src[start..])?;
        Scope::new(frames, joins, array)
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn array(&self) -> &str {
        &self.array
    }

    /// The frame whose cells index this scope's output: the outermost frame,
    /// or `None` when the scope names only an array.
    pub fn outer_frame(&self) -> Option<&str> {
        self.frames.first().map(String::as_str)
    }
}

fn segment<'s>(expr: &str, seg: &'s str) -> Result<&'s str> {
    if seg.is_empty() {
        return Err(OcularError::syntax(expr, "empty segment"));
    }
    if let Some(c) = seg
        .chars()
        .find(|&c| !is_key_char(c))
    {
        return Err(OcularError::syntax(expr, format!("unexpected character '{}'", c)));
    }
    Ok(seg)
}

impl FromStr for Scope {
    type Err = OcularError;

    fn from_str(s: &str) -> Result<Self> {
        Scope::parse(s)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (frame, join) in self.frames.iter().zip(&self.joins) {
            write!(f, "{}{}", frame, join.delimiter())?;
        }
        f.write_str(&self.array)
    }
}

/// One item of a parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Scope(Scope),
    /// A parenthesized sub-expression.
    Group(Vec<Term>),
}

/// A parsed scope expression: one or more terms viewed in lockstep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeExpr {
    terms: Vec<Term>,
}

impl ScopeExpr {
    pub fn parse(src: &str) -> Result<Self> {
        let terms = parse_terms(src, src, &Affixes::default())?;
        if terms.is_empty() {
            return Err(OcularError::syntax(src, "no scopes given"));
        }
        Ok(ScopeExpr { terms })
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// All scopes of the expression, groups flattened, in source order.
    pub fn scopes(&self) -> Vec<&Scope> {
        fn walk<'t>(terms: &'t [Term], out: &mut Vec<&'t Scope>) {
            for term in terms {
                match term {
                    Term::Scope(s) => out.push(s),
                    Term::Group(inner) => walk(inner, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.terms, &mut out);
        out
    }

    /// The single scope of a one-scope expression.
    pub fn single(&self) -> Option<&Scope> {
        match self.terms.as_slice() {
            [Term::Scope(s)] => Some(s),
            _ => None,
        }
    }
}

impl From<Scope> for ScopeExpr {
    fn from(scope: Scope) -> Self {
        ScopeExpr {
            terms: vec![Term::Scope(scope)],
        }
    }
}

impl FromStr for ScopeExpr {
    type Err = OcularError;

    fn from_str(s: &str) -> Result<Self> {
        ScopeExpr::parse(s)
    }
}

/// Prefix and suffix segments currently in force, with the join each one
/// makes with the token it is attached to.
#[derive(Debug, Clone, Default)]
struct Affixes {
    prefix: Option<(String, Join)>,
    suffix: Option<(Join, String)>,
}

impl Affixes {
    fn apply(&self, body: &str) -> String {
        let mut out = String::new();
        if let Some((p, join)) = &self.prefix {
            out.push_str(p);
            out.push(join.delimiter());
        }
        out.push_str(body);
        if let Some((join, s)) = &self.suffix {
            out.push(join.delimiter());
            out.push_str(s);
        }
        out
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'s> {
    Word(&'s str),
    Group(&'s str),
}

fn tokenize<'s>(expr: &str, src: &'s str) -> Result<Vec<Token<'s>>> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();
    while let Some(&(i, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        match c {
            '(' => {
                chars.next();
                let mut depth = 1usize;
                let mut end = None;
                for (j, d) in chars.by_ref() {
                    match d {
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                end = Some(j);
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                let end = end.ok_or_else(|| OcularError::syntax(expr, "unbalanced '('"))?;
                if let Some(&(_, next)) = chars.peek() {
                    if !next.is_whitespace() {
                        return Err(OcularError::syntax(
                            expr,
                            format!("unexpected '{}' after ')'", next),
                        ));
                    }
                }
                tokens.push(Token::Group(&src[i + 1..end]));
            }
            ')' => return Err(OcularError::syntax(expr, "unbalanced ')'")),
            _ => {
                let mut end = src.len();
                while let Some(&(j, d)) = chars.peek() {
                    if d.is_whitespace() {
                        end = j;
                        break;
                    }
                    if d == '(' || d == ')' {
                        return Err(OcularError::syntax(
                            expr,
                            format!("unexpected '{}' inside a token", d),
                        ));
                    }
                    chars.next();
                }
                tokens.push(Token::Word(&src[i..end]));
            }
        }
    }
    Ok(tokens)
}

fn parse_terms(expr: &str, src: &str, inherited: &Affixes) -> Result<Vec<Term>> {
    let mut affixes = inherited.clone();
    let mut terms = Vec::new();
    for token in tokenize(expr, src)? {
        match token {
            Token::Group(inner) => {
                let group = parse_terms(expr, inner, &affixes)?;
                if group.is_empty() {
                    return Err(OcularError::syntax(expr, "empty group"));
                }
                terms.push(Term::Group(group));
            }
            Token::Word("#") => {
                let (_, suffix) = affixes
                    .suffix
                    .as_ref()
                    .ok_or_else(|| OcularError::syntax(expr, "'#' used with no suffix set"))?;
                let body = match &affixes.prefix {
                    Some((p, join)) => format!("{}{}{}", p, join.delimiter(), suffix),
                    None => suffix.clone(),
                };
                terms.push(Term::Scope(Scope::parse(&body).map_err(|e| rebase(expr, e))?));
            }
            Token::Word(w) if w.ends_with('<') => {
                affixes.prefix = parse_prefix(expr, &w[..w.len() - 1])?;
            }
            Token::Word(w) if w.starts_with('>') => {
                affixes.suffix = parse_suffix(expr, &w[1..])?;
            }
            Token::Word(w) => {
                let full = affixes.apply(w);
                terms.push(Term::Scope(Scope::parse(&full).map_err(|e| rebase(expr, e))?));
            }
        }
    }
    Ok(terms)
}

fn parse_prefix(expr: &str, body: &str) -> Result<Option<(String, Join)>> {
    if body.is_empty() {
        return Ok(None);
    }
    let (body, join) = match body.chars().last().and_then(Join::from_delimiter) {
        Some(join) => (&body[..body.len() - 1], join),
        None => (body, Join::Plural),
    };
    Scope::parse(body).map_err(|e| rebase(expr, e))?;
    Ok(Some((body.to_string(), join)))
}

fn parse_suffix(expr: &str, body: &str) -> Result<Option<(Join, String)>> {
    if body.is_empty() {
        return Ok(None);
    }
    let (join, body) = match body.chars().next().and_then(Join::from_delimiter) {
        Some(join) => (join, &body[1..]),
        None => (Join::Singular, body),
    };
    Scope::parse(body).map_err(|e| rebase(expr, e))?;
    Ok(Some((join, body.to_string())))
}

/// Report syntax errors against the whole expression rather than the
/// expanded token.
fn rebase(expr: &str, err: OcularError) -> OcularError {
    match err {
        OcularError::ScopeSyntax { reason, .. } => OcularError::syntax(expr, reason),
        other => other,
    }
}
