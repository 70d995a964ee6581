//! tmux-pane-mover - drag-and-drop rearranging of tmux panes
//!
//! Drop zones while dragging:
//!   - center of a pane  -> swap contents
//!   - edge of a pane    -> split that pane there
//!   - screen edge strip -> outermost column/row of the whole window

mod config;
mod drag;
mod geometry;
mod pane;
mod render;
mod tmux;
mod zone;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Settings, FOOTER_H, KEY_QUIT, KEY_RELOAD};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute, queue,
    style::{Attribute, ResetColor, SetAttribute},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use drag::{DropReport, PaneMap};
use geometry::Size;
use render::{apply_style, fit_width, Compositor, Presenter, Style};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tmux::{Multiplexer, TitleGuard, Tmux};
use unicode_width::UnicodeWidthStr;

const HOST_MISSING: &str = "tmux not found or not running inside a tmux session";

#[derive(Parser, Debug)]
#[command(name = "tmux-pane-mover", version, about)]
struct Cli {
    /// Settings file (default: $XDG_CONFIG_HOME/tmux-pane-mover/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write log output to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let settings = Settings::load(cli.config.as_deref())?;
    let mut tmux = Tmux::new(settings.tmux.clone());

    let _title = TitleGuard::install(&tmux).context(HOST_MISSING)?;
    let snapshot = tmux.snapshot().context(HOST_MISSING)?;

    let result = run(tmux, snapshot, settings);

    // Cleanup
    let _ = execute!(io::stdout(), DisableFocusChange, DisableMouseCapture, Show);
    let _ = terminal::disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, ResetColor);

    result
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Short-lived message shown in the footer
#[derive(Debug, Clone)]
struct Notice {
    text: String,
    style: Style,
    expires: Instant,
}

/// Application state
struct App<M: Multiplexer> {
    map: PaneMap,
    mux: M,
    presenter: Presenter,
    settings: Settings,
    notice: Option<Notice>,
    width: u16,
    height: u16,
    needs_redraw: bool,
    running: bool,
}

impl<M: Multiplexer> App<M> {
    fn new(map: PaneMap, mux: M, settings: Settings, width: u16, height: u16) -> Self {
        Self {
            map,
            mux,
            presenter: Presenter::new(),
            settings,
            notice: None,
            width,
            height,
            needs_redraw: true,
            running: true,
        }
    }

    fn footer_row(&self) -> u16 {
        self.height.saturating_sub(FOOTER_H as u16)
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        match key.code {
            k if k == KEY_QUIT => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            k if k == KEY_RELOAD => {
                self.map.reload(&mut self.mux).context(HOST_MISSING)?;
                self.needs_redraw = true;
            }
            _ => {}
        }

        Ok(())
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        let x = i32::from(mouse.column);
        let y = i32::from(mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                // Clicking the footer dismisses the notice
                if mouse.row >= self.footer_row() {
                    if self.notice.take().is_some() {
                        self.needs_redraw = true;
                    }
                    return Ok(());
                }
                self.needs_redraw |= self.map.pointer_down(x, y);
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                self.needs_redraw |= self.map.pointer_move(x, y);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let report = self.map.pointer_up(x, y, &mut self.mux).context(HOST_MISSING)?;
                if let Some(report) = report {
                    self.report_drop(report);
                }
                self.needs_redraw = true;
            }
            _ => {}
        }

        Ok(())
    }

    fn report_drop(&mut self, report: DropReport) {
        let theme = self.map.compositor().theme();
        let described = self.map.compositor().legend().describe(report.kind);
        let (text, style, timeout) = match (&report.error, &report.action) {
            (Some(e), _) => (e.to_string(), theme.alert, self.settings.error_timeout_ms),
            (None, Some(_)) => (described, theme.notice, self.settings.info_timeout_ms),
            // Nothing was sent, so there is nothing to announce
            (None, None) => return,
        };
        self.notice = Some(Notice {
            text,
            style,
            expires: Instant::now() + Duration::from_millis(timeout),
        });
    }

    fn handle_leave(&mut self) {
        self.needs_redraw |= self.map.pointer_leave();
    }

    /// Handle resize
    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.map.resize(i32::from(width), i32::from(height));
        self.presenter.invalidate();
        self.needs_redraw = true;
    }

    /// Drop the notice once its time is up
    fn expire_notice(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| now >= n.expires) {
            self.notice = None;
            self.needs_redraw = true;
        }
    }

    /// Render the screen
    fn render(&mut self) -> Result<()> {
        if !self.needs_redraw && !self.map.is_dirty() {
            return Ok(());
        }

        let mut stdout = io::stdout();
        let rows = i32::from(self.footer_row());
        let canvas = self.map.canvas();
        self.presenter.present(&mut stdout, canvas, rows)?;
        self.render_footer(&mut stdout)?;

        stdout.flush()?;
        self.needs_redraw = false;

        Ok(())
    }

    /// Key hints on the left, the current notice on the right
    fn render_footer(&self, stdout: &mut impl Write) -> Result<()> {
        let theme = self.map.compositor().theme();
        let width = self.width as usize;

        queue!(stdout, MoveTo(0, self.footer_row()))?;
        apply_style(stdout, theme.footer)?;

        let hints = fit_width(" q Quit  r Reload ", width);
        write!(stdout, "{}", hints)?;
        let room = width - hints.width();

        match &self.notice {
            Some(notice) => {
                let text = fit_width(&format!(" {} ", notice.text), room);
                let pad = room - text.width();
                write!(stdout, "{:pad$}", "")?;
                apply_style(stdout, notice.style)?;
                write!(stdout, "{}", text)?;
            }
            None => write!(stdout, "{:room$}", "")?,
        }

        queue!(stdout, ResetColor, SetAttribute(Attribute::Reset))?;

        Ok(())
    }
}

fn run(tmux: Tmux, snapshot: pane::Snapshot, settings: Settings) -> Result<()> {
    let (width, height) = terminal::size().context("Failed to get terminal size")?;

    let surface = Size::new(i32::from(width), i32::from(height));
    let map = PaneMap::new(snapshot, surface, Compositor::default());
    let mut app = App::new(map, tmux, settings, width, height);

    // Set up terminal
    terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen, SetTitle("tmux-pane-mover"), Hide)?;

    // All-motion mouse reporting drives hover; focus changes stand in for pointer leave
    execute!(io::stdout(), EnableMouseCapture, EnableFocusChange)?;

    // Main loop
    while app.running {
        app.render()?;

        // Short timeout so notices expire without input
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key)?,
                Event::Mouse(mouse) => app.handle_mouse(mouse)?,
                Event::Resize(w, h) => app.resize(w, h),
                Event::FocusLost => app.handle_leave(),
                _ => {}
            }
        }

        app.expire_notice(Instant::now());
    }

    Ok(())
}
