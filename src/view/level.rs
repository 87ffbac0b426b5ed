use crate::array::Combiner;
use crate::error::{OcularError, Result};
use crate::frame::Frame;
use crate::scope::Join;
use crate::span::Cell;

use super::cursor::Cursor;
use super::node::Node;
use super::NodeStream;

/// One projection level: groups the nodes of an inner frame's cells into
/// the cells of an outer frame with a single forward merge-scan.
pub(crate) struct Level<'a, V: Clone> {
    /// Frame whose cells are produced by this level.
    outer: &'a Frame,
    /// True cells of the frame the input stream is aligned with.
    inner: &'a [Cell],
    join: Join,
    /// Set only on the level directly above the leaf array.
    combiner: Option<&'a Combiner<V>>,
    input: Cursor<'a, V>,
    /// Next unconsumed inner cell.
    idx: usize,
    /// Next outer cell to produce.
    next_cell: usize,
    failed: bool,
}

impl<'a, V: Clone> Level<'a, V> {
    pub(crate) fn new(
        outer: &'a Frame,
        inner: &'a [Cell],
        join: Join,
        combiner: Option<&'a Combiner<V>>,
        input: NodeStream<'a, V>,
    ) -> Self {
        Level {
            outer,
            inner,
            join,
            combiner,
            input: Cursor::new(input),
            idx: 0,
            next_cell: 0,
            failed: false,
        }
    }

    fn gather(&mut self, ci: usize) -> Result<Node<'a, V>> {
        let outer = self.outer;
        let inner = self.inner;
        let cell = &outer.cells()[ci];
        let mut visible: Vec<Node<'a, V>> = Vec::new();

        for span in cell.spans() {
            let mut section: Vec<Node<'a, V>> = Vec::new();

            // inner cells ending at or before this span belong to no output
            while self.idx < inner.len() && inner[self.idx].hi() <= span.lo {
                self.idx += 1;
                self.input.advance()?;
            }

            while self.idx < inner.len() {
                let g = &inner[self.idx];
                if g.lo() >= span.hi {
                    break;
                }
                if g.hi() > span.hi {
                    // straddles into the next span; leave it for the next reader
                    if let Some(node) = self.input.peek()? {
                        section.push(node.clone());
                    }
                    break;
                }
                match self.input.advance()? {
                    Some(node) => section.push(node),
                    None => break,
                }
                self.idx += 1;
            }

            match self.combiner {
                Some(combine) if self.join == Join::Singular => {
                    if let Some(node) = merge(combine, section) {
                        visible.push(node);
                    }
                }
                _ => visible.extend(section),
            }
        }

        match self.join {
            Join::Plural => Ok(Node::Seq(visible)),
            Join::Singular => {
                let count = visible.len();
                match visible.pop() {
                    Some(node) if count == 1 => Ok(node),
                    _ => {
                        tracing::trace!(frame = outer.key(), cell = ci, count, "singular join failed");
                        Err(OcularError::SingularityViolation {
                            frame: outer.key().to_string(),
                            cell: ci,
                            count,
                        })
                    }
                }
            }
        }
    }
}

/// Reduce a section of leaf nodes to one node; a lone node passes through untouched.
fn merge<'a, V: Clone>(combine: &Combiner<V>, mut section: Vec<Node<'a, V>>) -> Option<Node<'a, V>> {
    if section.len() <= 1 {
        return section.pop();
    }
    let parts: Vec<&V> = section.iter().filter_map(Node::value).collect();
    Some(Node::owned(combine(parts.as_slice())))
}

impl<'a, V: Clone> Iterator for Level<'a, V> {
    type Item = Result<Node<'a, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_cell >= self.outer.len() {
            return None;
        }
        let ci = self.next_cell;
        self.next_cell += 1;
        match self.gather(ci) {
            Ok(node) => Some(Ok(node)),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let left = self.outer.len() - self.next_cell;
        (0, Some(left))
    }
}
