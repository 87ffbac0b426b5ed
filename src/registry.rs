//! The registry owning every frame and array of one engine instance.

use rustc_hash::FxHashMap;

use crate::array::{Array, Combiner};
use crate::error::{OcularError, Result};
use crate::frame::Frame;
use crate::scope::{is_valid_key, Join, Scope, ScopeExpr};
use crate::span::{RelCell, Span};
use crate::view::{self, Node, View};

/// Key used for the base frame and array when the caller has no preference.
pub const DEFAULT_BASE_KEY: &str = "base";

/// Append-only store of frames and arrays, keyed by name.
///
/// Frames and arrays live in separate namespaces; a base sequence registers
/// one of each under the same key. Nothing is ever mutated or removed once
/// registered, so views can borrow freely from the registry.
pub struct Registry<V> {
    frames: FxHashMap<String, Frame>,
    arrays: FxHashMap<String, Array<V>>,
    default_combiner: Option<Combiner<V>>,
}

impl<V: Clone> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Registry<V> {
    /// Empty registry; arrays get no combiner unless one is passed explicitly.
    pub fn new() -> Self {
        Registry {
            frames: FxHashMap::default(),
            arrays: FxHashMap::default(),
            default_combiner: None,
        }
    }

    /// Empty registry attaching `combiner` to every array registered without
    /// an explicit one.
    pub fn with_combiner(combiner: Combiner<V>) -> Self {
        Registry {
            default_combiner: Some(combiner),
            ..Self::new()
        }
    }

    /// Register a base sequence: a frame with one single-point cell per value
    /// and an array holding the values, both under `key`.
    pub fn register_base(&mut self, key: &str, values: impl Into<Vec<V>>) -> Result<()> {
        check_key(key)?;
        if self.frames.contains_key(key) || self.arrays.contains_key(key) {
            return Err(OcularError::DuplicateKey(key.to_string()));
        }
        let values = values.into();
        let frame = Frame::base(key, values.len());
        let array = Array::new(key, key, values, self.default_combiner.clone());
        tracing::debug!(key, len = frame.len(), "registered base sequence");
        self.frames.insert(key.to_string(), frame);
        self.arrays.insert(key.to_string(), array);
        Ok(())
    }

    /// Register a frame whose cells are spans over `viewpoint`'s cell indices.
    ///
    /// Each relative cell expands to the true spans of the viewpoint cells it
    /// names, with touching spans fused.
    pub fn new_frame<I, C>(&mut self, key: &str, viewpoint: &str, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = C>,
        C: Into<RelCell>,
    {
        check_key(key)?;
        if self.frames.contains_key(key) {
            return Err(OcularError::DuplicateKey(key.to_string()));
        }
        self.lineage(viewpoint)?;
        let vp = self
            .frames
            .get(viewpoint)
            .ok_or_else(|| OcularError::UnknownFrame(viewpoint.to_string()))?;
        let relative: Vec<RelCell> = cells.into_iter().map(Into::into).collect();
        let frame = Frame::derive(key, vp, relative)?;
        tracing::debug!(key, viewpoint, cells = frame.len(), "registered frame");
        self.frames.insert(key.to_string(), frame);
        Ok(())
    }

    /// Register an array on `viewpoint` with the registry's default combiner.
    pub fn new_array(&mut self, key: &str, viewpoint: &str, values: impl Into<Vec<V>>) -> Result<()> {
        let combiner = self.default_combiner.clone();
        self.new_array_with(key, viewpoint, values, combiner)
    }

    /// Register an array on `viewpoint` with an explicit combiner (or none).
    pub fn new_array_with(
        &mut self,
        key: &str,
        viewpoint: &str,
        values: impl Into<Vec<V>>,
        combiner: Option<Combiner<V>>,
    ) -> Result<()> {
        check_key(key)?;
        if self.arrays.contains_key(key) {
            return Err(OcularError::DuplicateKey(key.to_string()));
        }
        let frame = self
            .frames
            .get(viewpoint)
            .ok_or_else(|| OcularError::UnknownFrame(viewpoint.to_string()))?;
        let values = values.into();
        if values.len() != frame.len() {
            return Err(OcularError::CardinalityMismatch {
                key: key.to_string(),
                expected: frame.len(),
                actual: values.len(),
            });
        }
        tracing::debug!(key, viewpoint, len = values.len(), mergeable = combiner.is_some(), "registered array");
        self.arrays
            .insert(key.to_string(), Array::new(key, viewpoint, values, combiner));
        Ok(())
    }

    /// Register a frame selecting the items of a view that satisfy `pred`.
    ///
    /// Item `e` of the view becomes relative cell `[e, e+1)` of the scope's
    /// outer frame (or of the array's viewpoint when the scope names no
    /// frame). With `merge`, runs of consecutive selected items become one cell.
    pub fn new_frame_filter<F>(&mut self, key: &str, scope: &str, pred: F, merge: bool) -> Result<()>
    where
        F: FnMut(&Node<'_, V>) -> bool,
    {
        let scope = Scope::parse(scope)?;
        self.new_frame_filter_scope(key, &scope, pred, merge)
    }

    /// [`Registry::new_frame_filter`] for an already parsed scope.
    pub fn new_frame_filter_scope<F>(
        &mut self,
        key: &str,
        scope: &Scope,
        mut pred: F,
        merge: bool,
    ) -> Result<()>
    where
        F: FnMut(&Node<'_, V>) -> bool,
    {
        check_key(key)?;
        if self.frames.contains_key(key) {
            return Err(OcularError::DuplicateKey(key.to_string()));
        }
        let viewpoint = self.viewpoint_of_scope(scope)?;

        let mut cells: Vec<Span> = Vec::new();
        for (e, item) in view::project(self, scope)?.enumerate() {
            let item = item?;
            if !pred(&item) {
                continue;
            }
            match cells.last_mut() {
                Some(last) if merge && last.hi == e => last.hi = e + 1,
                _ => cells.push(Span::new(e, e + 1)),
            }
        }
        tracing::debug!(key, scope = %scope, selected = cells.len(), "filtered frame");
        self.new_frame(key, &viewpoint, cells)
    }

    /// Frame whose cell indices line up with a scope's output positions.
    pub fn viewpoint_of_scope(&self, scope: &Scope) -> Result<String> {
        match scope.outer_frame() {
            Some(frame) => Ok(frame.to_string()),
            None => self.viewpoint_of_array(scope.array()).map(str::to_string),
        }
    }

    pub fn viewpoint_of_array(&self, key: &str) -> Result<&str> {
        self.arrays
            .get(key)
            .map(Array::viewpoint)
            .ok_or_else(|| OcularError::UnknownArray(key.to_string()))
    }

    /// Lazily view a scope expression such as `lines.words/chars`.
    pub fn view(&self, expr: &str) -> Result<View<'_, V>> {
        let expr = ScopeExpr::parse(expr)?;
        self.view_expr(&expr)
    }

    /// Lazily view a parsed expression.
    pub fn view_expr(&self, expr: &ScopeExpr) -> Result<View<'_, V>> {
        view::project_expr(self, expr)
    }

    /// Lazily view a single scope.
    pub fn view_scope(&self, scope: &Scope) -> Result<View<'_, V>> {
        view::project(self, scope)
    }

    /// Project `array` through `frames` (outermost first) with one join per frame.
    pub fn project(&self, frames: &[&str], joins: &[Join], array: &str) -> Result<View<'_, V>> {
        let scope = Scope::new(frames.iter().copied(), joins.to_vec(), array)?;
        view::project(self, &scope)
    }

    /// Eagerly collect a view, failing on the first error.
    pub fn view_all(&self, expr: &str) -> Result<Vec<Node<'_, V>>> {
        self.view(expr)?.try_collect()
    }

    pub fn frame(&self, key: &str) -> Option<&Frame> {
        self.frames.get(key)
    }

    pub fn array(&self, key: &str) -> Option<&Array<V>> {
        self.arrays.get(key)
    }

    pub fn parent_of(&self, key: &str) -> Option<&str> {
        self.frames.get(key).and_then(Frame::parent)
    }

    pub fn depth_of(&self, key: &str) -> Option<usize> {
        self.frames.get(key).map(Frame::depth)
    }

    /// Frame keys from `key` up to and including its base.
    pub fn lineage(&self, key: &str) -> Result<Vec<&str>> {
        let mut chain = Vec::new();
        let mut current = self
            .frames
            .get(key)
            .ok_or_else(|| OcularError::UnknownFrame(key.to_string()))?;
        loop {
            chain.push(current.key());
            if chain.len() > self.frames.len() {
                return Err(OcularError::CyclicFrame(key.to_string()));
            }
            match current.parent() {
                None => return Ok(chain),
                Some(parent) => {
                    current = self
                        .frames
                        .get(parent)
                        .ok_or_else(|| OcularError::CyclicFrame(key.to_string()))?;
                }
            }
        }
    }

    /// Registered frame keys, sorted.
    pub fn frame_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.frames.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Registered array keys, sorted.
    pub fn array_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.arrays.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

fn check_key(key: &str) -> Result<()> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(OcularError::InvalidKey(key.to_string()))
    }
}
