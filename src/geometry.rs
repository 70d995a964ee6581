//! Scaling between tmux cell units and the schematic drawn on screen

use crate::config::{MIN_PANE_H, MIN_PANE_W};
use crate::pane::{Pane, PaneId, WindowExtent};

/// Size of the rendering surface in terminal cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Rectangle in screen cells. May extend past the surface (the drag ghost does).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Half-open containment: `[x, x+w) × [y, y+h)`
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Maps logical pane geometry onto a surface, keeping a one cell margin on
/// every side. Pure: the same inputs always give the same rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scaler {
    pub surface: Size,
    pub extent: WindowExtent,
}

impl Scaler {
    pub fn new(surface: Size, extent: WindowExtent) -> Self {
        Self { surface, extent }
    }

    fn scale(value: u32, usable: i32, total: u32) -> i32 {
        let ratio = f64::from(value) * f64::from(usable) / f64::from(total.max(1));
        ratio.round_ties_even() as i32
    }

    pub fn x(&self, logical_x: u32) -> i32 {
        Self::scale(logical_x, self.surface.width - 2, self.extent.width) + 1
    }

    pub fn y(&self, logical_y: u32) -> i32 {
        Self::scale(logical_y, self.surface.height - 2, self.extent.height) + 1
    }

    pub fn w(&self, logical_w: u32) -> i32 {
        Self::scale(logical_w, self.surface.width - 2, self.extent.width).max(MIN_PANE_W)
    }

    pub fn h(&self, logical_h: u32) -> i32 {
        Self::scale(logical_h, self.surface.height - 2, self.extent.height).max(MIN_PANE_H)
    }

    /// Scaled box of a pane
    pub fn rect(&self, pane: &Pane) -> ScreenRect {
        ScreenRect::new(
            self.x(pane.rect.x),
            self.y(pane.rect.y),
            self.w(pane.rect.width),
            self.h(pane.rect.height),
        )
    }
}

/// First pane, in snapshot order, whose scaled box contains `(x, y)`.
/// Overlaps from rounding resolve to the earlier pane.
pub fn pane_at<'a>(
    panes: &'a [Pane],
    scaler: &Scaler,
    x: i32,
    y: i32,
    skip: Option<&PaneId>,
) -> Option<&'a Pane> {
    panes
        .iter()
        .filter(|p| Some(&p.id) != skip)
        .find(|p| scaler.rect(p).contains(x, y))
}
