use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{ChildStderr, ChildStdout};
use tracing::warn;

const CHUNK_BYTES: usize = 8192;

/// Drains a child's stdout and stderr into memory.
///
/// [`drain`](Self::drain) is meant to be raced against the child's exit and
/// the deadline: every read it awaits is cancel-safe, so dropping the future
/// loses nothing and the buffers stay readable afterwards.
#[derive(Debug, Default)]
pub(crate) struct OutputCapture {
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    stdout_buf: Vec<u8>,
    stderr_buf: Vec<u8>,
}

impl OutputCapture {
    pub(crate) fn new(stdout: Option<ChildStdout>, stderr: Option<ChildStderr>) -> Self {
        Self {
            stdout,
            stderr,
            stdout_buf: Vec::new(),
            stderr_buf: Vec::new(),
        }
    }

    /// Both streams reached end-of-stream (or failed).
    pub(crate) fn is_finished(&self) -> bool {
        self.stdout.is_none() && self.stderr.is_none()
    }

    /// Read both pipes until both report end-of-stream.
    ///
    /// A read error closes only the stream it happened on; whatever was read
    /// before it is kept.
    pub(crate) async fn drain(&mut self) {
        let mut out_chunk = vec![0u8; CHUNK_BYTES];
        let mut err_chunk = vec![0u8; CHUNK_BYTES];

        while !self.is_finished() {
            tokio::select! {
                read = read_chunk(&mut self.stdout, &mut out_chunk) => {
                    absorb("stdout", read, &out_chunk, &mut self.stdout_buf, &mut self.stdout);
                }
                read = read_chunk(&mut self.stderr, &mut err_chunk) => {
                    absorb("stderr", read, &err_chunk, &mut self.stderr_buf, &mut self.stderr);
                }
            }
        }
    }

    /// Hand over the captured bytes, closing any pipe still open.
    pub(crate) fn into_bytes(self) -> (Vec<u8>, Vec<u8>) {
        (self.stdout_buf, self.stderr_buf)
    }
}

async fn read_chunk<R: AsyncRead + Unpin>(pipe: &mut Option<R>, chunk: &mut [u8]) -> io::Result<usize> {
    match pipe {
        Some(pipe) => pipe.read(chunk).await,
        None => std::future::pending().await,
    }
}

fn absorb<R>(
    stream: &'static str,
    read: io::Result<usize>,
    chunk: &[u8],
    buffer: &mut Vec<u8>,
    pipe: &mut Option<R>,
) {
    match read {
        Ok(0) => *pipe = None,
        Ok(n) => buffer.extend_from_slice(&chunk[..n]),
        Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
        Err(err) => {
            warn!(stream, %err, captured = buffer.len(), "output capture failed; keeping partial output");
            *pipe = None;
        }
    }
}
