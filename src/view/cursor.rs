use crate::error::Result;

use super::node::Node;
use super::NodeStream;

/// Forward-only reader over a node stream with a one-slot lookahead buffer.
///
/// A node obtained through [`Cursor::peek`] stays in the slot and is handed
/// out again by the next `peek` or `advance`.
pub(crate) struct Cursor<'a, V: Clone> {
    input: NodeStream<'a, V>,
    slot: Option<Node<'a, V>>,
}

impl<'a, V: Clone> Cursor<'a, V> {
    pub(crate) fn new(input: NodeStream<'a, V>) -> Self {
        Cursor { input, slot: None }
    }

    fn fill(&mut self) -> Result<()> {
        if self.slot.is_none() {
            if let Some(item) = self.input.next() {
                self.slot = Some(item?);
            }
        }
        Ok(())
    }

    /// Consume the next node.
    pub(crate) fn advance(&mut self) -> Result<Option<Node<'a, V>>> {
        self.fill()?;
        Ok(self.slot.take())
    }

    /// Look at the next node without consuming it.
    pub(crate) fn peek(&mut self) -> Result<Option<&Node<'a, V>>> {
        self.fill()?;
        Ok(self.slot.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcularError;

    fn stream(values: &[String]) -> NodeStream<'_, String> {
        Box::new(values.iter().map(|v| Ok::<_, OcularError>(Node::borrowed(v))))
    }

    #[test]
    fn peeked_node_is_offered_again() {
        let values: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let mut cursor = Cursor::new(stream(&values));
        assert_eq!(cursor.peek().unwrap().and_then(Node::value), Some(&values[0]));
        assert_eq!(cursor.peek().unwrap().and_then(Node::value), Some(&values[0]));
        assert_eq!(cursor.advance().unwrap().as_ref().and_then(Node::value), Some(&values[0]));
        assert_eq!(cursor.advance().unwrap().as_ref().and_then(Node::value), Some(&values[1]));
        assert!(cursor.advance().unwrap().is_none());
        assert!(cursor.peek().unwrap().is_none());
    }

    #[test]
    fn stream_errors_surface_on_read() {
        let input: NodeStream<'static, String> =
            Box::new(std::iter::once(Err(OcularError::UnknownFrame("x".into()))));
        let mut cursor = Cursor::new(input);
        assert_eq!(cursor.peek().unwrap_err(), OcularError::UnknownFrame("x".into()));
    }
}
