use std::fmt;
use std::sync::Arc;

/// Associative reducer merging a non-empty run of values into one value.
pub type Combiner<V> = Arc<dyn Fn(&[&V]) -> V + Send + Sync>;

/// Combiner joining text values end to end.
pub fn concat() -> Combiner<String> {
    Arc::new(|parts: &[&String]| {
        let mut out = String::with_capacity(parts.iter().map(|p| p.len()).sum());
        for p in parts {
            out.push_str(p);
        }
        out
    })
}

/// Values aligned 1:1 with the cells of a viewpoint frame.
pub struct Array<V> {
    key: String,
    viewpoint: String,
    values: Vec<V>,
    combiner: Option<Combiner<V>>,
}

impl<V> Array<V> {
    pub(crate) fn new(
        key: &str,
        viewpoint: &str,
        values: Vec<V>,
        combiner: Option<Combiner<V>>,
    ) -> Self {
        Array {
            key: key.to_string(),
            viewpoint: viewpoint.to_string(),
            values,
            combiner,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key of the frame whose cells this array's values belong to.
    pub fn viewpoint(&self) -> &str {
        &self.viewpoint
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn combiner(&self) -> Option<&Combiner<V>> {
        self.combiner.as_ref()
    }

    /// Whether runs of this array's values can be merged into one value.
    pub fn is_mergeable(&self) -> bool {
        self.combiner.is_some()
    }
}

impl<V: fmt::Debug> fmt::Debug for Array<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("key", &self.key)
            .field("viewpoint", &self.viewpoint)
            .field("len", &self.values.len())
            .field("mergeable", &self.combiner.is_some())
            .finish()
    }
}
