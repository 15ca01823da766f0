//! Win32 bindings for console attach/read and foreground-window queries.

use std::ffi::c_void;

use ::windows::core::w;
use ::windows::Win32::Foundation::{CloseHandle, GENERIC_READ, GENERIC_WRITE, HANDLE, HWND};
use ::windows::Win32::Storage::FileSystem::{
    CreateFileW, FILE_FLAGS_AND_ATTRIBUTES, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use ::windows::Win32::System::Console::{
    AttachConsole, FreeConsole, GetConsoleScreenBufferInfo, GetConsoleTitleW, GetConsoleWindow,
    ReadConsoleOutputCharacterW, ATTACH_PARENT_PROCESS, CONSOLE_SCREEN_BUFFER_INFO, COORD,
};
use ::windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetWindowTextLengthW, GetWindowTextW, IsIconic,
};
use watch_core::{ConsoleApi, ConsoleHandle, WindowSystem};

const TITLE_CAPACITY: usize = 1024;

fn to_handle(hwnd: HWND) -> Option<ConsoleHandle> {
    if hwnd.0.is_null() {
        None
    } else {
        Some(ConsoleHandle(hwnd.0 as isize))
    }
}

fn to_hwnd(handle: ConsoleHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

fn to_coord(col: usize, row: usize) -> Result<COORD, String> {
    let x = i16::try_from(col).map_err(|_| format!("column {col} out of range"))?;
    let y = i16::try_from(row).map_err(|_| format!("row {row} out of range"))?;
    Ok(COORD { X: x, Y: y })
}

/// Active screen buffer of the currently attached console, closed on drop.
///
/// Opened through `CONOUT$` rather than the std output handle: `AttachConsole`
/// leaves redirected std handles pointing at their file or pipe.
struct ScreenBuffer(HANDLE);

impl ScreenBuffer {
    fn open() -> Result<Self, String> {
        // SAFETY: the name is a static wide string; no security attributes or template.
        let handle = unsafe {
            CreateFileW(
                w!("CONOUT$"),
                (GENERIC_READ | GENERIC_WRITE).0,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                None,
                OPEN_EXISTING,
                FILE_FLAGS_AND_ATTRIBUTES(0),
                HANDLE::default(),
            )
        }
        .map_err(|err| err.message().to_string())?;
        Ok(Self(handle))
    }
}

impl Drop for ScreenBuffer {
    fn drop(&mut self) {
        // SAFETY: the handle came from CreateFileW and is closed exactly once.
        let _ = unsafe { CloseHandle(self.0) };
    }
}

/// Kernel32 console primitives. Holds no state: every call acts on whichever
/// console the process is attached to at that moment.
#[derive(Debug, Default)]
pub struct Win32Console;

impl ConsoleApi for Win32Console {
    fn detach(&mut self) {
        // SAFETY: FreeConsole takes no arguments; failure means we had no console.
        let _ = unsafe { FreeConsole() };
    }

    fn attach(&mut self, pid: u32) -> Result<(), String> {
        // SAFETY: AttachConsole only reads the pid; we detached beforehand.
        unsafe { AttachConsole(pid) }.map_err(|err| err.message().to_string())
    }

    fn restore_own(&mut self) {
        // SAFETY: re-attaching to the parent console is the documented restore path.
        // Failure leaves us console-less, which only affects stdout logging.
        let _ = unsafe { AttachConsole(ATTACH_PARENT_PROCESS) };
    }

    fn title(&mut self) -> Result<String, String> {
        let mut buffer = [0u16; TITLE_CAPACITY];
        // SAFETY: the slice length bounds the write.
        let len = unsafe { GetConsoleTitleW(&mut buffer) } as usize;
        Ok(String::from_utf16_lossy(&buffer[..len.min(TITLE_CAPACITY)]))
    }

    fn window(&mut self) -> Option<ConsoleHandle> {
        // SAFETY: no arguments; returns null when the console has no window.
        to_handle(unsafe { GetConsoleWindow() })
    }

    fn buffer_size(&mut self) -> Result<(usize, usize), String> {
        let screen = ScreenBuffer::open()?;
        let mut info = CONSOLE_SCREEN_BUFFER_INFO::default();
        // SAFETY: `screen` is open for the call and `info` is the out-parameter.
        unsafe { GetConsoleScreenBufferInfo(screen.0, &mut info) }
            .map_err(|err| err.message().to_string())?;
        let width = usize::try_from(info.dwSize.X).unwrap_or(0);
        let height = usize::try_from(info.dwSize.Y).unwrap_or(0);
        Ok((width, height))
    }

    fn read_chars(&mut self, row: usize, col: usize, max_chars: usize) -> Result<String, String> {
        let origin = to_coord(col, row)?;
        let screen = ScreenBuffer::open()?;
        let mut buffer = vec![0u16; max_chars];
        let mut read = 0u32;
        // SAFETY: the slice length bounds the write and `read` outlives the call.
        unsafe { ReadConsoleOutputCharacterW(screen.0, &mut buffer, origin, &mut read) }
            .map_err(|err| err.message().to_string())?;
        let read = (read as usize).min(buffer.len());
        Ok(String::from_utf16_lossy(&buffer[..read]))
    }
}

/// User32 foreground-window queries.
#[derive(Debug, Default)]
pub struct Win32Windows;

impl WindowSystem for Win32Windows {
    fn foreground_window(&self) -> Option<ConsoleHandle> {
        // SAFETY: no arguments; null when no window has focus.
        to_handle(unsafe { GetForegroundWindow() })
    }

    fn is_minimized(&self, window: ConsoleHandle) -> bool {
        // SAFETY: IsIconic tolerates stale handles and returns false for them.
        unsafe { IsIconic(to_hwnd(window)) }.as_bool()
    }

    fn window_title(&self, window: ConsoleHandle) -> String {
        let hwnd = to_hwnd(window);
        // SAFETY: both calls tolerate stale handles; the slice bounds the write.
        unsafe {
            let len = usize::try_from(GetWindowTextLengthW(hwnd)).unwrap_or(0);
            let mut buffer = vec![0u16; len + 1];
            let copied = usize::try_from(GetWindowTextW(hwnd, &mut buffer)).unwrap_or(0);
            String::from_utf16_lossy(&buffer[..copied.min(len)])
        }
    }
}
