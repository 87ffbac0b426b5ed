//! Frames: named ordered sets of cells, and their resolution against a viewpoint.

use serde::Serialize;

use crate::error::{OcularError, Result};
use crate::span::{Cell, PushError, RelCell};

/// A named coordinate system over some base sequence.
///
/// `cells` are the frame's true cells, expressed in the coordinate space of
/// the base sequence it descends from. `relative` keeps the description the
/// frame was registered with (spans over its viewpoint's cell indices).
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    key: String,
    parent: Option<String>,
    base: String,
    depth: usize,
    #[serde(skip)]
    relative: Vec<RelCell>,
    cells: Vec<Cell>,
}

impl Frame {
    /// The root frame of a base sequence: one single-point cell per element.
    pub(crate) fn base(key: &str, len: usize) -> Self {
        Frame {
            key: key.to_string(),
            parent: None,
            base: key.to_string(),
            depth: 0,
            relative: Vec::new(),
            cells: (0..len).map(|i| Cell::single(i, i + 1)).collect(),
        }
    }

    /// Resolve `relative` against `viewpoint` and build the child frame.
    pub(crate) fn derive(key: &str, viewpoint: &Frame, relative: Vec<RelCell>) -> Result<Self> {
        let cells = resolve(key, viewpoint, &relative)?;
        Ok(Frame {
            key: key.to_string(),
            parent: Some(viewpoint.key.clone()),
            base: viewpoint.base.clone(),
            depth: viewpoint.depth + 1,
            relative,
            cells,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key of the viewpoint this frame was registered against; `None` for a base frame.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Key of the base frame this frame ultimately descends from.
    pub fn base_key(&self) -> &str {
        &self.base
    }

    /// Generations between this frame and its base.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_base(&self) -> bool {
        self.parent.is_none()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn relative_cells(&self) -> &[RelCell] {
        &self.relative
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Expand each relative cell into the viewpoint's true spans and merge
/// touching neighbours in a single left-to-right pass.
fn resolve(key: &str, viewpoint: &Frame, relative: &[RelCell]) -> Result<Vec<Cell>> {
    let vp_cells = viewpoint.cells();
    let mut cells: Vec<Cell> = Vec::with_capacity(relative.len());
    for (ci, rel) in relative.iter().enumerate() {
        let empty = || OcularError::EmptyCell {
            key: key.to_string(),
            cell: ci,
        };
        let overlap = || OcularError::OverlappingCells {
            key: key.to_string(),
            cell: ci,
        };

        let mut cell = Cell::empty();
        for span in rel.spans() {
            if span.is_empty() || span.hi > vp_cells.len() {
                return Err(empty());
            }
            for vp_cell in &vp_cells[span.lo..span.hi] {
                for &s in vp_cell.spans() {
                    cell.push_merge(s).map_err(|e| match e {
                        PushError::Degenerate => empty(),
                        PushError::Overlap => overlap(),
                    })?;
                }
            }
        }
        if cell.is_empty() {
            return Err(empty());
        }
        if let Some(prev) = cells.last() {
            if cell.lo() < prev.hi() {
                return Err(overlap());
            }
        }
        cells.push(cell);
    }
    Ok(cells)
}
