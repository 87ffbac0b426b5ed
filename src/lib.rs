//! Hierarchical frames over an immutable base sequence, with lazy nested
//! views of any array through any chain of frames.
//!
//! ```
//! use ocular::text::{add_word_frame, text_registry};
//!
//! let mut reg = text_registry("chars", "ab cd").unwrap();
//! add_word_frame(&mut reg, "words", "chars").unwrap();
//! let words: Vec<String> = reg
//!     .view("words/chars")
//!     .unwrap()
//!     .map(|n| n.unwrap().value().unwrap().clone())
//!     .collect();
//! assert_eq!(words, ["ab", "cd"]);
//! ```

mod array;
mod error;
mod frame;
mod registry;
pub mod scope;
mod span;
pub mod text;
mod view;

pub use array::{concat, Array, Combiner};
pub use error::{OcularError, Result};
pub use frame::Frame;
pub use registry::{Registry, DEFAULT_BASE_KEY};
pub use scope::{Join, Scope, ScopeExpr, Term};
pub use span::{Cell, RelCell, Span, Spans};
pub use view::{Node, View};
