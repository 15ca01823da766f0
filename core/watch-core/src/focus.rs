//! Foreground window inspection.
//!
//! A direct handle match covers classic console hosts. Tabbed hosts such as
//! Windows Terminal own one top-level window for many consoles, so the
//! console's own handle is never foregrounded; for those we fall back to the
//! foreground window's title.

use crate::patterns::MarkerTable;
use crate::types::ConsoleHandle;

/// Window-manager primitives.
pub trait WindowSystem {
    fn foreground_window(&self) -> Option<ConsoleHandle>;

    fn is_minimized(&self, window: ConsoleHandle) -> bool;

    fn window_title(&self, window: ConsoleHandle) -> String;
}

#[derive(Debug, Clone)]
pub struct ForegroundInspector<W: WindowSystem> {
    windows: W,
    markers: MarkerTable,
}

impl<W: WindowSystem> ForegroundInspector<W> {
    pub fn new(windows: W, markers: MarkerTable) -> Self {
        Self { windows, markers }
    }

    /// True when the user is already looking at `console`.
    pub fn is_focused(&self, console: Option<ConsoleHandle>) -> bool {
        let Some(console) = console else {
            return false;
        };
        let Some(foreground) = self.windows.foreground_window() else {
            return false;
        };

        if foreground == console {
            return !self.windows.is_minimized(console);
        }

        let title = self.windows.window_title(foreground);
        if self.markers.is_cli_window_title(&title) {
            return !self.windows.is_minimized(foreground);
        }

        false
    }
}
