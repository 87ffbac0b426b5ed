//! Lazy projection of arrays through chains of frames.
//!
//! A view is a pipeline of levels, innermost first. Each level walks the
//! cells of its outer frame once, pulling from the level below only as far
//! as the current cell needs, so pulling one item from a view does exactly
//! the inner work required to build it.

mod cursor;
mod level;
mod node;
mod zip;

pub use node::Node;

use crate::error::{OcularError, Result};
use crate::registry::Registry;
use crate::scope::{Scope, ScopeExpr, Term};

use level::Level;
use zip::Zip;

/// Boxed stream of view items; every level consumes and produces one.
pub(crate) type NodeStream<'a, V> = Box<dyn Iterator<Item = Result<Node<'a, V>>> + 'a>;

/// Single-pass lazy sequence produced by [`Registry::view`].
///
/// Iteration stops after the first error. Re-iterating requires a new view.
pub struct View<'a, V: Clone> {
    stream: NodeStream<'a, V>,
}

impl<'a, V: Clone> View<'a, V> {
    fn new(stream: NodeStream<'a, V>) -> Self {
        View { stream }
    }

    /// Drain the view, stopping at the first error.
    pub fn try_collect(self) -> Result<Vec<Node<'a, V>>> {
        self.collect()
    }
}

impl<'a, V: Clone> Iterator for View<'a, V> {
    type Item = Result<Node<'a, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

/// Build the level pipeline for one scope.
pub(crate) fn project<'a, V: Clone + 'a>(
    registry: &'a Registry<V>,
    scope: &Scope,
) -> Result<View<'a, V>> {
    let array = registry
        .array(scope.array())
        .ok_or_else(|| OcularError::UnknownArray(scope.array().to_string()))?;
    let leaf_frame = registry
        .frame(array.viewpoint())
        .ok_or_else(|| OcularError::UnknownFrame(array.viewpoint().to_string()))?;

    let mut frames = Vec::with_capacity(scope.frames().len());
    for key in scope.frames() {
        let frame = registry
            .frame(key)
            .ok_or_else(|| OcularError::UnknownFrame(key.clone()))?;
        if frame.base_key() != leaf_frame.base_key() {
            return Err(OcularError::UnrelatedFrames {
                outer: frame.key().to_string(),
                inner: leaf_frame.key().to_string(),
            });
        }
        frames.push(frame);
    }

    tracing::trace!(scope = %scope, levels = frames.len(), "building view");

    let mut stream: NodeStream<'a, V> =
        Box::new(array.values().iter().map(|v| -> Result<Node<'a, V>> { Ok(Node::borrowed(v)) }));
    let mut inner = leaf_frame.cells();
    for (depth, (&frame, &join)) in frames.iter().zip(scope.joins()).enumerate().rev() {
        let innermost = depth + 1 == frames.len();
        let combiner = if innermost { array.combiner() } else { None };
        stream = Box::new(Level::new(frame, inner, join, combiner, stream));
        inner = frame.cells();
    }
    Ok(View::new(stream))
}

/// Build a view for a parsed scope expression.
pub(crate) fn project_expr<'a, V: Clone + 'a>(
    registry: &'a Registry<V>,
    expr: &ScopeExpr,
) -> Result<View<'a, V>> {
    Ok(View::new(terms_stream(registry, expr.terms())?))
}

fn terms_stream<'a, V: Clone + 'a>(
    registry: &'a Registry<V>,
    terms: &[Term],
) -> Result<NodeStream<'a, V>> {
    let mut streams = Vec::with_capacity(terms.len());
    for term in terms {
        let stream = match term {
            Term::Scope(scope) => project(registry, scope)?.stream,
            Term::Group(inner) => terms_stream(registry, inner)?,
        };
        streams.push(stream);
    }
    if streams.len() == 1 {
        if let Some(stream) = streams.pop() {
            return Ok(stream);
        }
    }
    Ok(Box::new(Zip::new(streams)))
}
