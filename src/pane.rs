//! Pane snapshot - the panes of one tmux window and the window's extent

use crate::config::TITLE_MAX;
use std::fmt;

/// tmux pane identifier (`%3`), unique within a window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaneId(pub String);

impl PaneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rectangle in tmux cell units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// A single pane as reported by tmux
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    pub id: PaneId,
    pub rect: Rect,
    pub title: String,
    pub active: bool,
}

impl Pane {
    /// Create a pane, truncating the title and falling back to the id when it is empty
    pub fn new(id: &str, rect: Rect, title: &str, active: bool) -> Self {
        let title = if title.is_empty() { id } else { title };
        Self {
            id: PaneId(id.to_string()),
            rect,
            title: title.chars().take(TITLE_MAX).collect(),
            active,
        }
    }

    /// Label drawn in the pane's top border
    pub fn label(&self) -> String {
        format!("{} {}", self.id, self.title)
    }
}

/// Logical size of the tmux window, the denominator for scaling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowExtent {
    pub width: u32,
    pub height: u32,
}

impl WindowExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Every pane of the window plus its extent. Replaced wholesale on reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub panes: Vec<Pane>,
    pub extent: WindowExtent,
}

impl Snapshot {
    pub fn new(panes: Vec<Pane>, extent: WindowExtent) -> Self {
        Self { panes, extent }
    }

    /// First pane that is not `id`, used as a layout anchor
    pub fn anchor_for(&self, id: &PaneId) -> Option<&Pane> {
        self.panes.iter().find(|p| &p.id != id)
    }
}

/// Parse `#{window_width} #{window_height}`
pub fn parse_extent(line: &str) -> Option<WindowExtent> {
    let mut parts = line.split_whitespace();
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    Some(WindowExtent::new(width, height))
}

/// Parse one tab-separated `list-panes` line:
/// id, left, top, width, height, title, active
pub fn parse_pane_line(line: &str) -> Option<Pane> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 7 {
        return None;
    }
    let num = |i: usize| fields[i].trim().parse::<u32>().ok();
    let rect = Rect::new(num(1)?, num(2)?, num(3)?, num(4)?);
    Some(Pane::new(fields[0], rect, fields[5], fields[6].trim() == "1"))
}

/// Parse a whole `list-panes` listing, skipping lines that do not parse
pub fn parse_pane_list(listing: &str) -> Vec<Pane> {
    listing
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|line| {
            let pane = parse_pane_line(line);
            if pane.is_none() {
                log::warn!("skipping unparsable pane line: {:?}", line);
            }
            pane
        })
        .collect()
}
