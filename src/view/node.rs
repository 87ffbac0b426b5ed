use std::borrow::Cow;

use serde::ser::{Serialize, SerializeSeq, Serializer};

/// One item produced by a view.
///
/// Leaf values are borrowed from the backing array unless a combiner had to
/// build a new value; plural joins nest items into sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a, V: Clone> {
    Value(Cow<'a, V>),
    Seq(Vec<Node<'a, V>>),
}

impl<'a, V: Clone> Node<'a, V> {
    pub fn borrowed(value: &'a V) -> Self {
        Node::Value(Cow::Borrowed(value))
    }

    pub fn owned(value: V) -> Self {
        Node::Value(Cow::Owned(value))
    }

    /// The leaf value, if this node is one.
    pub fn value(&self) -> Option<&V> {
        match self {
            Node::Value(v) => Some(&**v),
            Node::Seq(_) => None,
        }
    }

    /// The nested items, if this node is a sequence.
    pub fn items(&self) -> Option<&[Node<'a, V>]> {
        match self {
            Node::Value(_) => None,
            Node::Seq(items) => Some(items),
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Node::Value(_))
    }

    /// Number of leaf values under this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Value(_) => 1,
            Node::Seq(items) => items.iter().map(Node::leaf_count).sum(),
        }
    }

    /// All leaf values in order, depth first.
    pub fn leaves(&self) -> Vec<&V> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'n>(&'n self, out: &mut Vec<&'n V>) {
        match self {
            Node::Value(v) => out.push(&**v),
            Node::Seq(items) => {
                for item in items {
                    item.collect_leaves(out);
                }
            }
        }
    }

    /// Detach from the backing arrays by cloning any borrowed leaves.
    pub fn into_owned(self) -> Node<'static, V> {
        match self {
            Node::Value(v) => Node::Value(Cow::Owned(v.into_owned())),
            Node::Seq(items) => Node::Seq(items.into_iter().map(Node::into_owned).collect()),
        }
    }
}

impl<V: Clone + Serialize> Serialize for Node<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Value(v) => (**v).serialize(serializer),
            Node::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
