//! Stand-ins for hosts without Win32 consoles: nothing attaches or has focus.

use watch_core::{ConsoleApi, ConsoleHandle, WindowSystem};

const UNSUPPORTED: &str = "console attach is only supported on Windows";

#[derive(Debug, Default)]
pub struct UnsupportedConsole;

impl ConsoleApi for UnsupportedConsole {
    fn detach(&mut self) {}

    fn attach(&mut self, _pid: u32) -> Result<(), String> {
        Err(UNSUPPORTED.to_string())
    }

    fn restore_own(&mut self) {}

    fn title(&mut self) -> Result<String, String> {
        Err(UNSUPPORTED.to_string())
    }

    fn window(&mut self) -> Option<ConsoleHandle> {
        None
    }

    fn buffer_size(&mut self) -> Result<(usize, usize), String> {
        Err(UNSUPPORTED.to_string())
    }

    fn read_chars(&mut self, _row: usize, _col: usize, _max_chars: usize) -> Result<String, String> {
        Err(UNSUPPORTED.to_string())
    }
}

#[derive(Debug, Default)]
pub struct NoWindows;

impl WindowSystem for NoWindows {
    fn foreground_window(&self) -> Option<ConsoleHandle> {
        None
    }

    fn is_minimized(&self, _window: ConsoleHandle) -> bool {
        false
    }

    fn window_title(&self, _window: ConsoleHandle) -> String {
        String::new()
    }
}
