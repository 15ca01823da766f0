//! OS bindings for console access and window focus.
//!
//! Only Windows lets one process attach to another's console. Elsewhere the
//! watchdog still runs, but every attach fails and nothing is discovered.

#[cfg(windows)]
mod win32;
#[cfg(windows)]
pub use win32::{Win32Console as PlatformConsole, Win32Windows as PlatformWindows};

#[cfg(not(windows))]
mod unsupported;
#[cfg(not(windows))]
pub use unsupported::{UnsupportedConsole as PlatformConsole, NoWindows as PlatformWindows};

pub const SUPPORTED: bool = cfg!(windows);
