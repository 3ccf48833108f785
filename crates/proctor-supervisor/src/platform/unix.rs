use nix::sys::signal::{Signal, kill, killpg};
use nix::unistd::Pid;
use std::collections::BTreeSet;
use std::io;
use tokio::process::{Child, Command};
use tracing::{debug, trace};

use crate::reaper::ProcessTable;

/// Upper bound on freeze-and-rescan passes before the final kill.
const MAX_FREEZE_ROUNDS: usize = 16;

/// Put the child in a new process group so the whole group can be signalled.
///
/// `setpgid` runs before `exec`, so the program cannot fork anything outside
/// the group before it is contained.
pub(crate) fn configure(cmd: &mut Command) {
    #[allow(unused_imports)]
    use std::os::unix::process::CommandExt;
    unsafe {
        cmd.pre_exec(|| {
            if libc::setpgid(0, 0) == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

/// Process group of one supervised child. The group id equals the root pid.
#[derive(Debug)]
pub(crate) struct TreeGuard {
    root: u32,
}

impl TreeGuard {
    pub(crate) fn attach(child: &Child) -> io::Result<Self> {
        let root = child
            .id()
            .ok_or_else(|| io::Error::other("spawned process has no pid"))?;
        Ok(Self { root })
    }

    /// Kill the root and every descendant. Must run while the root is still
    /// unreaped so parent links in the process table are intact.
    ///
    /// The group is frozen with `SIGSTOP` first so nothing can fork while the
    /// table is scanned; descendants that left the group (`setsid`) are found
    /// by parent links and frozen individually. The scan repeats until it
    /// finds nothing new, then everything gets `SIGKILL`.
    pub(crate) fn kill_tree(&self) {
        let group = self.group();
        let _ = killpg(group, Signal::SIGSTOP);

        let mut table = ProcessTable::new();
        let mut frozen: BTreeSet<u32> = BTreeSet::new();
        for round in 0..MAX_FREEZE_ROUNDS {
            let fresh: Vec<u32> = table
                .descendants(self.root)
                .into_iter()
                .filter(|pid| frozen.insert(*pid))
                .collect();
            trace!(round, fresh = fresh.len(), "process tree scan");
            if fresh.is_empty() {
                break;
            }
            for pid in fresh {
                let _ = kill(as_pid(pid), Signal::SIGSTOP);
            }
        }

        let _ = killpg(group, Signal::SIGKILL);
        for &pid in &frozen {
            let _ = kill(as_pid(pid), Signal::SIGKILL);
        }
        let _ = kill(as_pid(self.root), Signal::SIGKILL);

        debug!(root = self.root, descendants = frozen.len(), "killed process tree");
    }

    /// Kill whatever is left in the group after the root exited and was
    /// reaped. Parent links are gone by then, so only the group is reachable.
    pub(crate) fn kill_lingering(&self) {
        match killpg(self.group(), Signal::SIGKILL) {
            Ok(()) => debug!(pgid = self.root, "killed lingering process group members"),
            Err(err) => trace!(pgid = self.root, %err, "no lingering process group members"),
        }
    }

    fn group(&self) -> Pid {
        as_pid(self.root)
    }
}

#[allow(clippy::cast_possible_wrap)]
fn as_pid(pid: u32) -> Pid {
    Pid::from_raw(pid as i32)
}
