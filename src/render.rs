//! Rendering - per-frame canvas composition and differential output

use crate::config::{FOOTER_H, SCREEN_EDGE_H, SCREEN_EDGE_W};
use crate::drag::{DragSession, DragState};
use crate::geometry::{ScreenRect, Scaler, Size};
use crate::pane::Pane;
use crate::zone::{ActionKind, Edge, Legend};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
};
use std::io::{self, Write};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const BOX_TL: char = '╭';
const BOX_TR: char = '╮';
const BOX_BL: char = '╰';
const BOX_BR: char = '╯';
const BOX_H: char = '─';
const BOX_V: char = '│';

/// Leading glyph of the drag ghost's label
const GHOST_MARK: char = '⠧';

/// Right half of a double-width glyph. Never written to the terminal.
const WIDE_TAIL: char = '\0';

/// Text attributes as bitflags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attrs(u8);

impl Attrs {
    pub const BOLD: u8 = 1 << 0;

    pub fn has(&self, attr: u8) -> bool {
        self.0 & attr != 0
    }

    pub fn set(&mut self, attr: u8) {
        self.0 |= attr;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attrs: Attrs,
}

impl Style {
    pub const fn fg(color: Color) -> Self {
        Self { fg: Some(color), bg: None, attrs: Attrs(0) }
    }

    pub const fn on(fg: Color, bg: Color) -> Self {
        Self { fg: Some(fg), bg: Some(bg), attrs: Attrs(0) }
    }

    pub fn bold(mut self) -> Self {
        self.attrs.set(Attrs::BOLD);
        self
    }
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

/// A cell of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    pub fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(' ', Style::default())
    }
}

/// One complete frame. Built fresh by the compositor and never patched afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    size: Size,
    cells: Vec<Cell>,
}

impl Canvas {
    fn blank(size: Size) -> Self {
        let len = (size.width.max(0) as usize) * (size.height.max(0) as usize);
        Self { size, cells: vec![Cell::default(); len] }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some((y as usize) * (self.size.width as usize) + (x as usize))
    }

    /// Break up a wide glyph covering `(x, y)`, blanking its other half
    fn split_wide(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if self.cells[idx].ch == WIDE_TAIL {
            if let Some(head) = self.index(x - 1, y) {
                self.cells[head].ch = ' ';
            }
        } else if let Some(tail) = self.index(x + 1, y) {
            if self.cells[tail].ch == WIDE_TAIL {
                self.cells[tail].ch = ' ';
            }
        }
    }

    /// Write a cell, silently clipping anything off the surface
    fn put(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some(idx) = self.index(x, y) {
            self.split_wide(x, y);
            self.cells[idx] = cell;
        }
    }

    /// Write a double-width glyph over two cells. One cut by the surface edge
    /// leaves blanks instead.
    fn put_wide(&mut self, x: i32, y: i32, ch: char, style: Style) {
        let (Some(head), Some(tail)) = (self.index(x, y), self.index(x + 1, y)) else {
            self.put(x, y, Cell::new(' ', style));
            self.put(x + 1, y, Cell::new(' ', style));
            return;
        };
        self.split_wide(x, y);
        self.split_wide(x + 1, y);
        self.cells[head] = Cell::new(ch, style);
        self.cells[tail] = Cell::new(WIDE_TAIL, style);
    }

    /// Write `text` from `(x, y)` by display width. Zero-width and control
    /// characters are dropped. Returns the columns taken.
    fn put_str(&mut self, x: i32, y: i32, text: &str, style: Style) -> i32 {
        let mut col = x;
        for ch in text.chars() {
            match ch.width() {
                Some(1) => {
                    self.put(col, y, Cell::new(ch, style));
                    col += 1;
                }
                Some(2) => {
                    self.put_wide(col, y, ch, style);
                    col += 2;
                }
                _ => {}
            }
        }
        col - x
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Characters of row `y`, for inspection
    #[cfg(test)]
    pub fn row_text(&self, y: i32) -> String {
        (0..self.size.width)
            .filter_map(|x| self.get(x, y))
            .map(|c| c.ch)
            .filter(|&ch| ch != WIDE_TAIL)
            .collect()
    }
}

/// Style lookup table for every visual state
#[derive(Debug, Clone)]
pub struct Theme {
    pub normal: Style,
    pub active: Style,
    pub hover: Style,
    /// Panes that are not the drop target while a drag is in flight
    pub dormant: Style,
    /// The one highlighted edge of a pane-edge drop target
    pub edge: Style,
    pub drag: Style,
    pub normal_fill: Style,
    pub active_fill: Style,
    pub hover_fill: Style,
    pub dormant_fill: Style,
    pub drag_fill: Style,
    pub zone_dim: Style,
    pub zone_lit: Style,
    pub label: Style,
    pub footer: Style,
    pub notice: Style,
    pub alert: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            normal: Style::fg(rgb(0x4a, 0x9e, 0xff)),
            active: Style::fg(rgb(0x00, 0xff, 0x88)).bold(),
            hover: Style::fg(rgb(0xff, 0xcc, 0x00)).bold(),
            dormant: Style::fg(rgb(0x2a, 0x4a, 0x6a)),
            edge: Style::fg(rgb(0x00, 0xff, 0xcc)).bold(),
            drag: Style::fg(rgb(0xff, 0x66, 0xff)).bold(),
            normal_fill: Style::on(rgb(0x8a, 0xb4, 0xd4), rgb(0x0d, 0x1b, 0x2a)),
            active_fill: Style::on(rgb(0xaa, 0xff, 0xcc), rgb(0x0d, 0x2b, 0x1a)),
            hover_fill: Style::on(rgb(0xff, 0xe0, 0x66), rgb(0x2b, 0x25, 0x00)),
            dormant_fill: Style::on(rgb(0x4a, 0x6a, 0x84), rgb(0x0a, 0x14, 0x20)),
            drag_fill: Style::on(rgb(0xff, 0xaa, 0xff), rgb(0x2a, 0x0d, 0x2a)),
            zone_dim: Style::on(rgb(0x1a, 0x3a, 0x66), rgb(0x00, 0x0d, 0x22)),
            zone_lit: Style::on(rgb(0x66, 0xaa, 0xff), rgb(0x00, 0x22, 0x66)).bold(),
            label: Style::on(rgb(0xff, 0x88, 0xff), rgb(0x44, 0x00, 0x66)).bold(),
            footer: Style::on(rgb(0x4a, 0x9e, 0xff), rgb(0x0d, 0x1b, 0x2a)),
            notice: Style::on(rgb(0xaa, 0xff, 0xcc), rgb(0x0d, 0x1b, 0x2a)).bold(),
            alert: Style::on(rgb(0xff, 0x66, 0x66), rgb(0x2a, 0x0d, 0x0d)).bold(),
        }
    }
}

/// Everything a frame depends on
pub struct Scene<'a> {
    pub panes: &'a [Pane],
    pub scaler: Scaler,
    pub state: &'a DragState,
}

/// Builds frames. Has no state of its own beyond its lookup tables, so the
/// same scene always composes to the same canvas.
pub struct Compositor {
    theme: Theme,
    legend: Legend,
}

impl Compositor {
    pub fn new(theme: Theme, legend: Legend) -> Self {
        Self { theme, legend }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn compose(&self, scene: &Scene) -> Canvas {
        let mut canvas = Canvas::blank(scene.scaler.surface);
        let session = match scene.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle { .. } => None,
        };

        // 1. Pane boxes
        for pane in scene.panes {
            if session.is_some_and(|s| s.source.id == pane.id) {
                continue;
            }
            let (border, fill, lit) = self.pane_look(pane, scene.state);
            self.draw_box(&mut canvas, scene.scaler.rect(pane), &pane.label(), border, fill, lit);
        }

        if let Some(session) = session {
            // 2. Screen-edge zones
            self.draw_screen_zones(&mut canvas, session.drop.as_ref().map(|d| d.kind));
            // 3-4. Ghost and action label
            self.draw_ghost(&mut canvas, session, &scene.scaler);
        }

        canvas
    }

    /// Border style, fill style and highlighted edge of a pane box
    fn pane_look(&self, pane: &Pane, state: &DragState) -> (Style, Style, Option<Edge>) {
        let t = &self.theme;
        match state {
            DragState::Dragging(session) => match &session.drop {
                Some(drop) if drop.target.as_ref() == Some(&pane.id) => match drop.kind {
                    ActionKind::Swap => (t.hover, t.hover_fill, None),
                    ActionKind::Pane(edge) => {
                        let base = if pane.active { t.active } else { t.normal };
                        (base, t.hover_fill, Some(edge))
                    }
                    ActionKind::Screen(_) => (t.dormant, t.dormant_fill, None),
                },
                _ => (t.dormant, t.dormant_fill, None),
            },
            DragState::Idle { hover } => {
                if pane.active {
                    (t.active, t.active_fill, None)
                } else if hover.as_ref() == Some(&pane.id) {
                    (t.hover, t.hover_fill, None)
                } else {
                    (t.normal, t.normal_fill, None)
                }
            }
        }
    }

    fn draw_box(
        &self,
        canvas: &mut Canvas,
        r: ScreenRect,
        title: &str,
        border: Style,
        fill: Style,
        lit: Option<Edge>,
    ) {
        for dy in 0..r.height {
            for dx in 0..r.width {
                let top = dy == 0;
                let bottom = dy == r.height - 1;
                let left = dx == 0;
                let right = dx == r.width - 1;
                let hi = match lit {
                    Some(Edge::Left) => left,
                    Some(Edge::Right) => right,
                    Some(Edge::Top) => top,
                    Some(Edge::Bottom) => bottom,
                    None => false,
                };
                let bs = if hi { self.theme.edge } else { border };
                let cell = if top && left {
                    Cell::new(BOX_TL, bs)
                } else if top && right {
                    Cell::new(BOX_TR, bs)
                } else if bottom && left {
                    Cell::new(BOX_BL, bs)
                } else if bottom && right {
                    Cell::new(BOX_BR, bs)
                } else if top || bottom {
                    Cell::new(BOX_H, bs)
                } else if left || right {
                    Cell::new(BOX_V, bs)
                } else {
                    Cell::new(' ', fill)
                };
                canvas.put(r.x + dx, r.y + dy, cell);
            }
        }

        // Title centered in the top border, corners always kept
        if r.width > 5 {
            let label = format!(" {} ", fit_width(title, (r.width - 5) as usize));
            let start = r.x + (r.width - label.width() as i32) / 2;
            let style = if lit == Some(Edge::Top) { self.theme.edge } else { border };
            canvas.put_str(start, r.y, &label, style);
        }
    }

    fn draw_screen_zones(&self, canvas: &mut Canvas, active: Option<ActionKind>) {
        let Size { width: cw, height: ch } = canvas.size();
        let limit = ch - FOOTER_H;
        let zones = [
            (Edge::Left, 0, 0, SCREEN_EDGE_W, limit, '◀'),
            (Edge::Right, cw - SCREEN_EDGE_W, 0, SCREEN_EDGE_W, limit, '▶'),
            (Edge::Top, 0, 0, cw, SCREEN_EDGE_H, '▲'),
            (Edge::Bottom, 0, limit - SCREEN_EDGE_H, cw, SCREEN_EDGE_H, '▼'),
        ];
        for (edge, zx, zy, zw, zh, mark) in zones {
            let style = if active == Some(ActionKind::Screen(edge)) {
                self.theme.zone_lit
            } else {
                self.theme.zone_dim
            };
            for y in zy.max(0)..(zy + zh).min(limit) {
                for x in zx..zx + zw {
                    canvas.put(x, y, Cell::new(mark, style));
                }
            }
        }
    }

    fn draw_ghost(&self, canvas: &mut Canvas, session: &DragSession, scaler: &Scaler) {
        let w = scaler.w(session.source.rect.width);
        let h = scaler.h(session.source.rect.height);
        let ghost = ScreenRect::new(session.x - w / 2, session.y - h / 2, w, h);
        let title = format!("{} {}", GHOST_MARK, session.source.label());
        self.draw_box(canvas, ghost, &title, self.theme.drag, self.theme.drag_fill, None);

        if let Some(drop) = &session.drop {
            let text = format!(" {} ", self.legend.describe(drop.kind));
            canvas.put_str(ghost.x + 1, ghost.y + 1, &text, self.theme.label);
        }
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(Theme::default(), Legend::default())
    }
}

/// Queue the escape sequences for `style`
pub fn apply_style<W: Write>(writer: &mut W, style: Style) -> io::Result<()> {
    queue!(writer, SetAttribute(Attribute::Reset), ResetColor)?;
    if style.attrs.has(Attrs::BOLD) {
        queue!(writer, SetAttribute(Attribute::Bold))?;
    }
    if let Some(fg) = style.fg {
        queue!(writer, SetForegroundColor(fg))?;
    }
    if let Some(bg) = style.bg {
        queue!(writer, SetBackgroundColor(bg))?;
    }
    Ok(())
}

/// Longest prefix of `text` that fits in `max` terminal columns
pub fn fit_width(text: &str, max: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|ch| {
            used += ch.width().unwrap_or(0);
            used <= max
        })
        .collect()
}

/// Writes canvases to the terminal, emitting only cells that changed
pub struct Presenter {
    size: Size,
    // Track what's currently on screen to minimize updates
    last_frame: Vec<Cell>,
}

impl Presenter {
    pub fn new() -> Self {
        Self { size: Size::default(), last_frame: Vec::new() }
    }

    /// Mark the entire frame as dirty (forces full redraw)
    pub fn invalidate(&mut self) {
        for cell in &mut self.last_frame {
            cell.ch = '\x00'; // Invalid char forces redraw
        }
    }

    /// Present the first `rows` rows of `canvas`
    pub fn present<W: Write>(&mut self, writer: &mut W, canvas: &Canvas, rows: i32) -> io::Result<()> {
        let size = canvas.size();
        if size != self.size {
            let len = (size.width.max(0) as usize) * (size.height.max(0) as usize);
            self.size = size;
            self.last_frame = vec![Cell::new('\x00', Style::default()); len];
        }

        let mut last_style: Option<Style> = None;
        let mut need_move = true;

        for y in 0..rows.min(size.height) {
            for x in 0..size.width {
                let (Some(cell), Some(idx)) = (canvas.get(x, y), canvas.index(x, y)) else {
                    continue;
                };
                if cell.ch == WIDE_TAIL {
                    // The glyph to the left already covers this column
                    self.last_frame[idx] = cell;
                    continue;
                }
                if self.last_frame[idx] == cell {
                    // Cell unchanged, skip it
                    need_move = true;
                    continue;
                }

                if need_move {
                    queue!(writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                    last_style = None;
                }
                if last_style != Some(cell.style) {
                    apply_style(writer, cell.style)?;
                    last_style = Some(cell.style);
                }

                write!(writer, "{}", cell.ch)?;
                self.last_frame[idx] = cell;
            }

            // End of row - next row needs MoveTo
            need_move = true;
        }

        queue!(writer, SetAttribute(Attribute::Reset), ResetColor)?;
        Ok(())
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::{PaneId, Rect, WindowExtent};
    use crate::zone::DropCandidate;

    fn scaler() -> Scaler {
        Scaler::new(Size::new(84, 24), WindowExtent::new(160, 40))
    }

    fn panes() -> Vec<Pane> {
        vec![
            Pane::new("%0", Rect::new(0, 0, 80, 40), "left", true),
            Pane::new("%1", Rect::new(80, 0, 80, 40), "right", false),
        ]
    }

    fn dragging(source: &Pane, x: i32, y: i32, drop: Option<DropCandidate>) -> DragState {
        DragState::Dragging(DragSession { source: source.clone(), x, y, drop })
    }

    #[test]
    fn test_idle_boxes() {
        let panes = panes();
        let state = DragState::Idle { hover: None };
        let c = Compositor::default();
        let canvas = c.compose(&Scene { panes: &panes, scaler: scaler(), state: &state });

        assert_eq!(canvas.size(), Size::new(84, 24));
        assert_eq!(canvas.get(1, 1).unwrap().ch, BOX_TL);
        assert_eq!(canvas.get(41, 1).unwrap().ch, BOX_TR);
        assert_eq!(canvas.get(42, 1).unwrap().ch, BOX_TL);
        assert_eq!(canvas.get(1, 22).unwrap().ch, BOX_BL);
        assert_eq!(canvas.get(1, 10).unwrap().ch, BOX_V);
        assert!(canvas.row_text(1).contains(" %0 left "));
        assert!(canvas.row_text(1).contains(" %1 right "));
        // Margins untouched
        assert_eq!(canvas.get(0, 0).unwrap(), Cell::default());
        assert_eq!(canvas.get(83, 23).unwrap(), Cell::default());
        // Active pane uses the active style
        assert_eq!(canvas.get(1, 10).unwrap().style, c.theme().active);
        assert_eq!(canvas.get(42, 10).unwrap().style, c.theme().normal);
    }

    #[test]
    fn test_title_is_centered() {
        let panes = panes();
        let state = DragState::Idle { hover: None };
        let canvas = Compositor::default().compose(&Scene { panes: &panes, scaler: scaler(), state: &state });
        let row = canvas.row_text(1);
        let chars: Vec<char> = row.chars().collect();
        let label: Vec<char> = " %0 left ".chars().collect();
        // 41 wide box at x=1, 9 char label: starts at 1 + (41 - 9) / 2 = 17
        assert_eq!(&chars[17..17 + label.len()], &label[..]);
    }

    #[test]
    fn test_hover_style() {
        let panes = panes();
        let c = Compositor::default();
        let state = DragState::Idle { hover: Some(PaneId("%1".into())) };
        let canvas = c.compose(&Scene { panes: &panes, scaler: scaler(), state: &state });
        assert_eq!(canvas.get(42, 10).unwrap().style, c.theme().hover);
        assert_eq!(canvas.get(50, 10).unwrap().style, c.theme().hover_fill);

        // Active wins over hover
        let state = DragState::Idle { hover: Some(PaneId("%0".into())) };
        let canvas = c.compose(&Scene { panes: &panes, scaler: scaler(), state: &state });
        assert_eq!(canvas.get(1, 10).unwrap().style, c.theme().active);
    }

    // %1 shrunk away from the screen-edge zones: scaled to x 42..=63, y 5..=15
    fn floating() -> Vec<Pane> {
        vec![
            Pane::new("%0", Rect::new(0, 0, 80, 40), "left", true),
            Pane::new("%1", Rect::new(80, 8, 42, 20), "right", false),
        ]
    }

    #[test]
    fn test_drag_hides_source_and_draws_zones() {
        let panes = panes();
        let c = Compositor::default();
        let state = dragging(&panes[0], 41, 12, None);
        let canvas = c.compose(&Scene { panes: &panes, scaler: scaler(), state: &state });

        // Source box is gone from its home position
        assert_eq!(canvas.get(20, 10).unwrap(), Cell::default());
        // Dim zones on all four sides, footer row left alone
        assert_eq!(canvas.get(0, 10).unwrap(), Cell::new('◀', c.theme().zone_dim));
        assert_eq!(canvas.get(83, 10).unwrap(), Cell::new('▶', c.theme().zone_dim));
        assert_eq!(canvas.get(40, 0).unwrap(), Cell::new('▲', c.theme().zone_dim));
        assert_eq!(canvas.get(10, 22).unwrap(), Cell::new('▼', c.theme().zone_dim));
        assert_eq!(canvas.get(10, 23).unwrap(), Cell::default());
        // Other panes turn dormant
        assert_eq!(canvas.get(70, 5).unwrap().style, c.theme().dormant_fill);
        // Ghost is centered on the pointer: 41x22 box at (41-20, 12-11)
        assert_eq!(canvas.get(21, 1).unwrap(), Cell::new(BOX_TL, c.theme().drag));
        assert!(canvas.row_text(1).contains("⠧ %0 left"));
    }

    #[test]
    fn test_lit_screen_zone() {
        let panes = panes();
        let c = Compositor::default();
        let drop = DropCandidate { kind: ActionKind::Screen(Edge::Left), target: None };
        let state = dragging(&panes[1], 60, 12, Some(drop));
        let canvas = c.compose(&Scene { panes: &panes, scaler: scaler(), state: &state });
        assert_eq!(canvas.get(0, 20).unwrap().style, c.theme().zone_lit);
        assert_eq!(canvas.get(83, 20).unwrap().style, c.theme().zone_dim);
    }

    #[test]
    fn test_edge_highlight_only_on_that_edge() {
        let panes = floating();
        let c = Compositor::default();
        let drop = DropCandidate { kind: ActionKind::Pane(Edge::Right), target: Some(panes[1].id.clone()) };
        // Pointer below the surface keeps the ghost out of the picture
        let state = dragging(&panes[0], 20, 40, Some(drop));
        let canvas = c.compose(&Scene { panes: &panes, scaler: scaler(), state: &state });

        assert_eq!(canvas.get(63, 10).unwrap(), Cell::new(BOX_V, c.theme().edge));
        assert_eq!(canvas.get(42, 10).unwrap(), Cell::new(BOX_V, c.theme().normal));
        assert_eq!(canvas.get(44, 5).unwrap(), Cell::new(BOX_H, c.theme().normal));
        assert_eq!(canvas.get(50, 10).unwrap().style, c.theme().hover_fill);
    }

    #[test]
    fn test_swap_target_whole_border() {
        let panes = floating();
        let c = Compositor::default();
        let drop = DropCandidate { kind: ActionKind::Swap, target: Some(panes[1].id.clone()) };
        let state = dragging(&panes[0], 20, 40, Some(drop));
        let canvas = c.compose(&Scene { panes: &panes, scaler: scaler(), state: &state });
        assert_eq!(canvas.get(42, 10).unwrap().style, c.theme().hover);
        assert_eq!(canvas.get(63, 10).unwrap().style, c.theme().hover);
        assert_eq!(canvas.get(44, 15).unwrap().style, c.theme().hover);
    }

    #[test]
    fn test_top_edge_target_lights_title() {
        let panes = floating();
        let c = Compositor::default();
        let drop = DropCandidate { kind: ActionKind::Pane(Edge::Top), target: Some(panes[1].id.clone()) };
        let state = dragging(&panes[0], 20, 40, Some(drop));
        let canvas = c.compose(&Scene { panes: &panes, scaler: scaler(), state: &state });

        // " %1 right " spans x 48..=57 of the 22 wide box at x = 42
        assert_eq!(canvas.get(50, 5).unwrap(), Cell::new('1', c.theme().edge));
        assert_eq!(canvas.get(44, 5).unwrap(), Cell::new(BOX_H, c.theme().edge));
        assert_eq!(canvas.get(42, 10).unwrap().style, c.theme().normal);
    }

    fn wide_panes() -> Vec<Pane> {
        vec![
            Pane::new("%0", Rect::new(0, 0, 80, 40), "日本語のタイトル", true),
            Pane::new("%1", Rect::new(80, 0, 80, 40), "right", false),
        ]
    }

    /// Printable text of presenter output with escape sequences removed
    fn visible(out: &[u8]) -> String {
        let raw = String::from_utf8_lossy(out).into_owned();
        let mut text = String::new();
        let mut chars = raw.chars();
        while let Some(ch) = chars.next() {
            if ch == '\x1b' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                text.push(ch);
            }
        }
        text
    }

    #[test]
    fn test_wide_title_keeps_box_aligned() {
        let panes = wide_panes();
        let state = DragState::Idle { hover: None };
        let canvas = Compositor::default().compose(&Scene { panes: &panes, scaler: scaler(), state: &state });

        // " %0 日本語のタイトル " is 21 columns: starts at 1 + (41 - 21) / 2 = 11
        assert_eq!(canvas.get(15, 1).unwrap().ch, '日');
        assert_eq!(canvas.get(16, 1).unwrap().ch, WIDE_TAIL);
        assert_eq!(canvas.get(29, 1).unwrap().ch, 'ル');
        assert_eq!(canvas.get(31, 1).unwrap().ch, ' ');
        assert_eq!(canvas.get(32, 1).unwrap().ch, BOX_H);
        assert_eq!(canvas.get(41, 1).unwrap().ch, BOX_TR);
        assert_eq!(canvas.get(42, 1).unwrap().ch, BOX_TL);
        assert!(canvas.row_text(1).contains(" %0 日本語のタイトル "));

        // What reaches the terminal takes exactly the surface width per row
        let mut out = Vec::new();
        Presenter::new().present(&mut out, &canvas, 2).unwrap();
        assert_eq!(visible(&out).width(), 2 * 84);
    }

    #[test]
    fn test_wide_title_truncated_by_columns() {
        // 22 wide box leaves 17 columns for the title
        let panes = vec![
            Pane::new("%0", Rect::new(0, 0, 80, 40), "left", true),
            Pane::new("%1", Rect::new(80, 8, 42, 20), "日本語のタイトル", false),
        ];
        let state = DragState::Idle { hover: None };
        let canvas = Compositor::default().compose(&Scene { panes: &panes, scaler: scaler(), state: &state });
        let row = canvas.row_text(5);
        assert!(row.contains(" %1 日本語のタイト "));
        assert!(!row.contains('ル'));
        assert_eq!(canvas.get(63, 5).unwrap().ch, BOX_TR);
    }

    #[test]
    fn test_overwriting_half_a_wide_glyph() {
        let mut canvas = Canvas::blank(Size::new(6, 1));
        assert_eq!(canvas.put_str(0, 0, "日本語", Style::default()), 6);
        canvas.put(1, 0, Cell::new('x', Style::default()));
        canvas.put(4, 0, Cell::new('y', Style::default()));
        assert_eq!(canvas.row_text(0), " x本y ");

        // No room for the right half at the last column
        canvas.put_str(5, 0, "日", Style::default());
        assert_eq!(canvas.get(5, 0).unwrap().ch, ' ');
    }

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width("日本語", 5), "日本");
        assert_eq!(fit_width("abc", 5), "abc");
        assert_eq!(fit_width("日本", 1), "");
    }

    #[test]
    fn test_action_label_inside_ghost() {
        let panes = panes();
        let c = Compositor::default();
        let drop = DropCandidate { kind: ActionKind::Swap, target: Some(panes[1].id.clone()) };
        let state = dragging(&panes[0], 60, 12, Some(drop));
        let canvas = c.compose(&Scene { panes: &panes, scaler: scaler(), state: &state });
        // Ghost top-left is (40, 1); label row is y = 2 starting at x = 41
        assert!(canvas.row_text(2).contains(" ⇄ swap "));
        assert_eq!(canvas.get(41, 2).unwrap().style, c.theme().label);
    }

    #[test]
    fn test_ghost_clipped_at_edges() {
        let panes = panes();
        let state = dragging(&panes[0], 0, 0, None);
        let canvas = Compositor::default().compose(&Scene { panes: &panes, scaler: scaler(), state: &state });
        assert_eq!(canvas.size(), Size::new(84, 24));
    }

    #[test]
    fn test_recompose_is_identical() {
        let panes = panes();
        let c = Compositor::default();
        let drop = DropCandidate { kind: ActionKind::Pane(Edge::Top), target: Some(panes[1].id.clone()) };
        let state = dragging(&panes[0], 60, 8, Some(drop));
        let scene = Scene { panes: &panes, scaler: scaler(), state: &state };
        assert_eq!(c.compose(&scene), c.compose(&scene));
    }

    #[test]
    fn test_zero_surface() {
        let panes = panes();
        let state = DragState::Idle { hover: None };
        let s = Scaler::new(Size::new(0, 0), WindowExtent::new(160, 40));
        let canvas = Compositor::default().compose(&Scene { panes: &panes, scaler: s, state: &state });
        assert_eq!(canvas.get(0, 0), None);
    }

    #[test]
    fn test_presenter_skips_unchanged_cells() {
        let panes = panes();
        let state = DragState::Idle { hover: None };
        let canvas = Compositor::default().compose(&Scene { panes: &panes, scaler: scaler(), state: &state });
        let mut presenter = Presenter::new();

        let mut first = Vec::new();
        presenter.present(&mut first, &canvas, 23).unwrap();
        let mut second = Vec::new();
        presenter.present(&mut second, &canvas, 23).unwrap();
        assert!(second.len() < first.len());
        assert!(!String::from_utf8_lossy(&second).contains('╭'));

        presenter.invalidate();
        let mut third = Vec::new();
        presenter.present(&mut third, &canvas, 23).unwrap();
        assert_eq!(third, first);
    }
}
