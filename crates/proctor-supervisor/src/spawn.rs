use std::io;
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::platform::{self, TreeGuard};
use crate::request::ExecutionRequest;

// ============================================================================
// Spawner
// ============================================================================

/// Exclusively owned handle to one spawned process and its tree.
///
/// The handle owns the child's pipes until they are taken by the writer and
/// the capture. Dropping it kills the root (`kill_on_drop`) and, on Windows,
/// the whole job; the supervisor always reaps explicitly before that.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    pid: u32,
    tree: TreeGuard,
}

impl ProcessHandle {
    /// Spawn `request` with all three standard streams piped.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the executable cannot be found or the process
    /// cannot be created or contained.
    pub fn spawn(request: &ExecutionRequest) -> io::Result<Self> {
        let mut cmd = request.to_tokio_command();
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        platform::configure(&mut cmd);

        let child = cmd.spawn()?;
        let tree = TreeGuard::attach(&child)?;
        let pid = child
            .id()
            .ok_or_else(|| io::Error::other("spawned process has no pid"))?;

        debug!(pid, program = %request.program_lossy(), "spawned process");
        Ok(Self { child, pid, tree })
    }

    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    pub(crate) fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    pub(crate) fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub(crate) fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Wait for the root to exit. Cancel-safe.
    pub(crate) async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Kill the root and all descendants, then reap the root so no zombie
    /// remains.
    pub(crate) async fn reap_tree(&mut self) -> io::Result<ExitStatus> {
        self.tree.kill_tree();
        // SIGKILL is already queued; this only makes sure the root is signalled
        // even if the platform guard could not reach it.
        let _ = self.child.start_kill();
        self.child.wait().await
    }

    /// Kill descendants that outlived a root which already exited.
    pub(crate) fn reap_lingering(&self) {
        self.tree.kill_lingering();
    }
}

/// Feed `input` to the child's stdin on its own task, then close the stream.
///
/// Without input the stream is closed immediately. A child that exits
/// without reading everything makes the write fail with a broken pipe; that
/// is expected and only traced.
pub(crate) fn feed_stdin(stdin: Option<ChildStdin>, input: Option<Vec<u8>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Some(mut stdin) = stdin else {
            return;
        };
        if let Some(bytes) = input {
            if let Err(err) = stdin.write_all(&bytes).await {
                trace!(%err, "stdin write interrupted");
                return;
            }
            if let Err(err) = stdin.shutdown().await {
                trace!(%err, "stdin close failed");
            }
        }
        drop(stdin);
    })
}
