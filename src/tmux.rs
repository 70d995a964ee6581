//! tmux access - pane snapshots, rearrangement commands, pane title handling

use crate::config::SENTINEL_TITLE;
use crate::pane::{parse_extent, parse_pane_list, PaneId, Snapshot};
use crate::zone::{ActionKind, Edge};
use std::io;
use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TmuxError {
    #[error("failed to run tmux: {0}")]
    Spawn(#[from] io::Error),
    /// tmux exited non-zero; carries its stderr
    #[error("{0}")]
    Command(String),
    #[error("unexpected tmux output: {0:?}")]
    Parse(String),
}

/// A rearrangement to perform. For `Screen(_)` kinds `target` is the layout
/// anchor rather than a visual target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub source: PaneId,
    pub target: PaneId,
}

impl Action {
    /// Arguments for the tmux command performing this action
    pub fn tmux_args(&self) -> Vec<String> {
        // -f joins against the whole window layout, giving a full-height
        // column or full-width row; without it only the target is split
        let (command, flags): (&str, &[&str]) = match self.kind {
            ActionKind::Swap => ("swap-pane", &[]),
            ActionKind::Screen(Edge::Left) => ("join-pane", &["-d", "-h", "-f", "-b"]),
            ActionKind::Screen(Edge::Right) => ("join-pane", &["-d", "-h", "-f"]),
            ActionKind::Screen(Edge::Top) => ("join-pane", &["-d", "-v", "-f", "-b"]),
            ActionKind::Screen(Edge::Bottom) => ("join-pane", &["-d", "-v", "-f"]),
            ActionKind::Pane(Edge::Left) => ("join-pane", &["-d", "-h", "-b"]),
            ActionKind::Pane(Edge::Right) => ("join-pane", &["-d", "-h"]),
            ActionKind::Pane(Edge::Top) => ("join-pane", &["-d", "-v", "-b"]),
            ActionKind::Pane(Edge::Bottom) => ("join-pane", &["-d", "-v"]),
        };

        let mut args = vec![command.to_string()];
        args.extend(flags.iter().map(|f| f.to_string()));
        args.extend([
            "-s".to_string(),
            self.source.to_string(),
            "-t".to_string(),
            self.target.to_string(),
        ]);
        args
    }
}

/// The terminal multiplexer as seen by the pane map
pub trait Multiplexer {
    /// Current panes of the window and its extent
    fn snapshot(&mut self) -> Result<Snapshot, TmuxError>;

    /// Perform a rearrangement
    fn execute(&mut self, action: &Action) -> Result<(), TmuxError>;
}

/// Multiplexer backed by the `tmux` binary
#[derive(Debug, Clone)]
pub struct Tmux {
    bin: String,
}

impl Tmux {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Run tmux, returning stdout on success
    fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<String, TmuxError> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        let output = Command::new(&self.bin).args(&args).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                return Err(TmuxError::Command(format!("tmux command failed: {}", args.join(" "))));
            }
            return Err(TmuxError::Command(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn pane_title(&self) -> Result<String, TmuxError> {
        Ok(self.run(&["display-message", "-p", "#{pane_title}"])?.trim().to_string())
    }

    pub fn set_pane_title(&self, title: &str) -> Result<(), TmuxError> {
        self.run(&["select-pane", "-T", title]).map(|_| ())
    }
}

impl Multiplexer for Tmux {
    fn snapshot(&mut self) -> Result<Snapshot, TmuxError> {
        let dims = self.run(&["display-message", "-p", "#{window_width} #{window_height}"])?;
        let extent = parse_extent(&dims).ok_or_else(|| TmuxError::Parse(dims.clone()))?;

        let listing = self.run(&[
            "list-panes",
            "-F",
            "#{pane_id}\t#{pane_left}\t#{pane_top}\t#{pane_width}\t#{pane_height}\t#{pane_title}\t#{pane_active}",
        ])?;
        let panes = parse_pane_list(&listing);

        log::debug!("snapshot: {} panes in {}x{}", panes.len(), extent.width, extent.height);
        Ok(Snapshot::new(panes, extent))
    }

    fn execute(&mut self, action: &Action) -> Result<(), TmuxError> {
        let args = action.tmux_args();
        log::debug!("tmux {}", args.join(" "));
        self.run(&args).map(|_| ())
    }
}

/// Marks the calling pane with a sentinel title for as long as it lives and
/// puts the original title back when dropped.
pub struct TitleGuard {
    tmux: Tmux,
    original: String,
}

impl TitleGuard {
    pub fn install(tmux: &Tmux) -> Result<Self, TmuxError> {
        let original = tmux.pane_title()?;
        tmux.set_pane_title(SENTINEL_TITLE)?;
        Ok(Self { tmux: tmux.clone(), original })
    }
}

impl Drop for TitleGuard {
    fn drop(&mut self) {
        if let Err(e) = self.tmux.set_pane_title(&self.original) {
            log::error!("Failed to restore pane title {:?}: {}", self.original, e);
        }
    }
}
