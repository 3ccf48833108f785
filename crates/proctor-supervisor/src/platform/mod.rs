//! Platform-specific process-tree control
//!
//! Each spawned child gets a [`TreeGuard`] that knows how to kill the child
//! together with everything it started: a process group on Unix, a Job Object
//! on Windows.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub(crate) use unix::{TreeGuard, configure};
#[cfg(windows)]
pub(crate) use windows::{TreeGuard, configure};
