use crate::error::Result;

use super::node::Node;
use super::NodeStream;

/// Advances several views in lockstep, yielding one sequence per step.
pub(crate) struct Zip<'a, V: Clone> {
    streams: Vec<NodeStream<'a, V>>,
    done: bool,
}

impl<'a, V: Clone> Zip<'a, V> {
    pub(crate) fn new(streams: Vec<NodeStream<'a, V>>) -> Self {
        Zip {
            streams,
            done: false,
        }
    }
}

impl<'a, V: Clone> Iterator for Zip<'a, V> {
    type Item = Result<Node<'a, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.streams.is_empty() {
            return None;
        }
        let mut row = Vec::with_capacity(self.streams.len());
        for stream in self.streams.iter_mut() {
            match stream.next() {
                Some(Ok(node)) => row.push(node),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
        Some(Ok(Node::Seq(row)))
    }
}
