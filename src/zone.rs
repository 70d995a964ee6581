//! Drop zones - what releasing the dragged pane at a given cell would do

use crate::config::{FOOTER_H, PANE_EDGE_FRAC, SCREEN_EDGE_H, SCREEN_EDGE_W};
use crate::geometry::{pane_at, Scaler};
use crate::pane::{Pane, PaneId};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub fn name(&self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bot",
        }
    }
}

/// Rearrangement performed on drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Exchange the contents of two panes
    Swap,
    /// New full-height column / full-width row at the edge of the whole layout
    Screen(Edge),
    /// Split the target pane at one of its edges
    Pane(Edge),
}

impl ActionKind {
    #[cfg(test)]
    pub const ALL: [ActionKind; 9] = [
        ActionKind::Swap,
        ActionKind::Screen(Edge::Left),
        ActionKind::Screen(Edge::Right),
        ActionKind::Screen(Edge::Top),
        ActionKind::Screen(Edge::Bottom),
        ActionKind::Pane(Edge::Left),
        ActionKind::Pane(Edge::Right),
        ActionKind::Pane(Edge::Top),
        ActionKind::Pane(Edge::Bottom),
    ];
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Swap => f.write_str("swap"),
            ActionKind::Screen(e) => write!(f, "screen_{}", e.name()),
            ActionKind::Pane(e) => write!(f, "pane_{}", e.name()),
        }
    }
}

/// Where the dragged pane would land. `target` is always set for
/// `Swap` and `Pane(_)`, never for `Screen(_)`, and never the drag source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropCandidate {
    pub kind: ActionKind,
    pub target: Option<PaneId>,
}

impl DropCandidate {
    fn screen(edge: Edge) -> Self {
        Self { kind: ActionKind::Screen(edge), target: None }
    }

    fn on(kind: ActionKind, pane: &Pane) -> Self {
        Self { kind, target: Some(pane.id.clone()) }
    }
}

/// Human-readable label and icon for an action kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionInfo {
    pub label: &'static str,
    pub icon: char,
}

/// Lookup table from action kind to its label and icon
#[derive(Debug, Clone)]
pub struct Legend {
    entries: Vec<(ActionKind, ActionInfo)>,
}

impl Legend {
    pub fn new(entries: Vec<(ActionKind, ActionInfo)>) -> Self {
        Self { entries }
    }

    pub fn info(&self, kind: ActionKind) -> Option<ActionInfo> {
        self.entries.iter().find(|(k, _)| *k == kind).map(|(_, i)| *i)
    }

    /// `"<icon> <label>"`, falling back to the kind's name
    pub fn describe(&self, kind: ActionKind) -> String {
        match self.info(kind) {
            Some(info) => format!("{} {}", info.icon, info.label),
            None => kind.to_string(),
        }
    }
}

impl Default for Legend {
    fn default() -> Self {
        let e = |kind, label, icon| (kind, ActionInfo { label, icon });
        Self::new(vec![
            e(ActionKind::Swap, "swap", '⇄'),
            e(ActionKind::Screen(Edge::Left), "new left col", '◀'),
            e(ActionKind::Screen(Edge::Right), "new right col", '▶'),
            e(ActionKind::Screen(Edge::Top), "new top row", '▲'),
            e(ActionKind::Screen(Edge::Bottom), "new bottom row", '▼'),
            e(ActionKind::Pane(Edge::Left), "split left", '╞'),
            e(ActionKind::Pane(Edge::Right), "split right", '╡'),
            e(ActionKind::Pane(Edge::Top), "split above", '╥'),
            e(ActionKind::Pane(Edge::Bottom), "split below", '╨'),
        ])
    }
}

/// Screen-edge strip under `(x, y)`, if any. Checked left, right, top, bottom.
pub fn screen_edge_at(x: i32, y: i32, scaler: &Scaler) -> Option<Edge> {
    let Scaler { surface, .. } = scaler;
    if x < SCREEN_EDGE_W {
        Some(Edge::Left)
    } else if x >= surface.width - SCREEN_EDGE_W {
        Some(Edge::Right)
    } else if y < SCREEN_EDGE_H {
        Some(Edge::Top)
    } else if y >= surface.height - FOOTER_H - SCREEN_EDGE_H {
        Some(Edge::Bottom)
    } else {
        None
    }
}

/// Classify a pointer position during a drag of `source`.
/// Screen edges outrank everything inside the panes.
pub fn classify(
    x: i32,
    y: i32,
    source: Option<&PaneId>,
    panes: &[Pane],
    scaler: &Scaler,
) -> Option<DropCandidate> {
    let source = source?;

    if let Some(edge) = screen_edge_at(x, y, scaler) {
        return Some(DropCandidate::screen(edge));
    }

    let pane = pane_at(panes, scaler, x, y, Some(source))?;
    let r = scaler.rect(pane);
    let rx = f64::from(x - r.x) / f64::from((r.width - 1).max(1));
    let ry = f64::from(y - r.y) / f64::from((r.height - 1).max(1));

    let kind = if rx < PANE_EDGE_FRAC {
        ActionKind::Pane(Edge::Left)
    } else if rx > 1.0 - PANE_EDGE_FRAC {
        ActionKind::Pane(Edge::Right)
    } else if ry < PANE_EDGE_FRAC {
        ActionKind::Pane(Edge::Top)
    } else if ry > 1.0 - PANE_EDGE_FRAC {
        ActionKind::Pane(Edge::Bottom)
    } else {
        ActionKind::Swap
    };
    Some(DropCandidate::on(kind, pane))
}
