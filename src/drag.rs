//! The pane map - drag gesture state machine over a pane snapshot

use crate::geometry::{pane_at, Scaler, Size};
use crate::pane::{Pane, PaneId, Snapshot};
use crate::render::{Canvas, Compositor, Scene};
use crate::tmux::{Action, Multiplexer, TmuxError};
use crate::zone::{classify, ActionKind, DropCandidate};
use std::mem;

/// A drag in flight
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Pane being dragged
    pub source: Pane,
    /// Pointer position in screen cells
    pub x: i32,
    pub y: i32,
    /// What releasing here would do, recomputed on every move
    pub drop: Option<DropCandidate>,
}

/// Hovering and dragging are mutually exclusive
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle { hover: Option<PaneId> },
    Dragging(DragSession),
}

impl DragState {
    pub fn idle() -> Self {
        DragState::Idle { hover: None }
    }
}

/// Result of releasing a drag over a drop zone
#[derive(Debug)]
pub struct DropReport {
    pub kind: ActionKind,
    /// What was sent to the multiplexer; `None` when the drop had nothing to act on
    pub action: Option<Action>,
    pub error: Option<TmuxError>,
}

/// Turn a drop candidate into a concrete action. Screen-edge drops borrow the
/// first other pane as anchor and resolve to nothing when there is none.
pub fn resolve(drop: &DropCandidate, source: &Pane, snapshot: &Snapshot) -> Option<Action> {
    let target = match drop.kind {
        ActionKind::Screen(_) => snapshot.anchor_for(&source.id)?.id.clone(),
        ActionKind::Swap | ActionKind::Pane(_) => drop.target.clone()?,
    };
    Some(Action { kind: drop.kind, source: source.id.clone(), target })
}

/// Schematic of a tmux window that panes can be dragged around on.
/// The composed canvas is cached until something it depends on changes.
pub struct PaneMap {
    snapshot: Snapshot,
    surface: Size,
    state: DragState,
    compositor: Compositor,
    canvas: Option<Canvas>,
}

impl PaneMap {
    pub fn new(snapshot: Snapshot, surface: Size, compositor: Compositor) -> Self {
        Self {
            snapshot,
            surface,
            state: DragState::idle(),
            compositor,
            canvas: None,
        }
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[cfg(test)]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn scaler(&self) -> Scaler {
        Scaler::new(self.surface, self.snapshot.extent)
    }

    /// Drop the cached canvas
    pub fn invalidate(&mut self) {
        self.canvas = None;
    }

    /// Whether the next `canvas()` call will compose a new frame
    pub fn is_dirty(&self) -> bool {
        self.canvas.is_none()
    }

    /// Current frame, composed on demand
    pub fn canvas(&mut self) -> &Canvas {
        let Self { snapshot, surface, state, compositor, canvas } = self;
        canvas.get_or_insert_with(|| {
            compositor.compose(&Scene {
                panes: &snapshot.panes,
                scaler: Scaler::new(*surface, snapshot.extent),
                state,
            })
        })
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.surface = Size::new(width, height);
        self.invalidate();
    }

    /// Swap in a fresh snapshot. Any drag or hover refers to the old panes and is dropped.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        self.state = DragState::idle();
        self.invalidate();
    }

    pub fn reload<M: Multiplexer + ?Sized>(&mut self, mux: &mut M) -> Result<(), TmuxError> {
        let snapshot = mux.snapshot()?;
        log::debug!("reloaded {} panes", snapshot.panes.len());
        self.replace_snapshot(snapshot);
        Ok(())
    }

    /// Start dragging the pane under the pointer. Returns true if a drag started.
    pub fn pointer_down(&mut self, x: i32, y: i32) -> bool {
        if matches!(self.state, DragState::Dragging(_)) {
            return false;
        }
        let Some(pane) = pane_at(&self.snapshot.panes, &self.scaler(), x, y, None) else {
            return false;
        };

        log::debug!("drag start: {} at ({}, {})", pane.id, x, y);
        self.state = DragState::Dragging(DragSession { source: pane.clone(), x, y, drop: None });
        self.invalidate();
        true
    }

    /// Follow the pointer. Returns true if the frame changed.
    pub fn pointer_move(&mut self, x: i32, y: i32) -> bool {
        let scaler = self.scaler();
        match &mut self.state {
            DragState::Dragging(session) => {
                let drop = classify(x, y, Some(&session.source.id), &self.snapshot.panes, &scaler);
                if drop != session.drop {
                    log::debug!("drop candidate: {:?}", drop.as_ref().map(|d| d.kind.to_string()));
                }
                session.x = x;
                session.y = y;
                session.drop = drop;
                self.canvas = None;
                true
            }
            DragState::Idle { hover } => {
                let now = pane_at(&self.snapshot.panes, &scaler, x, y, None).map(|p| p.id.clone());
                if now == *hover {
                    return false;
                }
                *hover = now;
                self.canvas = None;
                true
            }
        }
    }

    /// Pointer left the surface. Returns true if the frame changed.
    pub fn pointer_leave(&mut self) -> bool {
        match &mut self.state {
            DragState::Idle { hover } if hover.is_some() => {
                *hover = None;
                self.canvas = None;
                true
            }
            _ => false,
        }
    }

    /// Finish a drag. Dispatches the action for the release point, if any, and
    /// reloads the snapshot whenever a drop zone was hit, even when the
    /// action failed. Only a failed reload is an error.
    pub fn pointer_up<M: Multiplexer + ?Sized>(
        &mut self,
        x: i32,
        y: i32,
        mux: &mut M,
    ) -> Result<Option<DropReport>, TmuxError> {
        let session = match mem::replace(&mut self.state, DragState::idle()) {
            DragState::Dragging(session) => session,
            idle => {
                self.state = idle;
                return Ok(None);
            }
        };
        self.invalidate();

        let scaler = self.scaler();
        let Some(drop) = classify(x, y, Some(&session.source.id), &self.snapshot.panes, &scaler) else {
            log::debug!("drag of {} released outside any drop zone", session.source.id);
            return Ok(None);
        };

        let action = resolve(&drop, &session.source, &self.snapshot);
        let error = match &action {
            Some(action) => {
                log::info!("{} {} -> {}", action.kind, action.source, action.target);
                mux.execute(action).err()
            }
            None => {
                log::debug!("{} skipped: no other pane to anchor on", drop.kind);
                None
            }
        };
        if let Some(e) = &error {
            log::warn!("{} failed: {}", drop.kind, e);
        }

        self.reload(mux)?;
        Ok(Some(DropReport { kind: drop.kind, action, error }))
    }
}
