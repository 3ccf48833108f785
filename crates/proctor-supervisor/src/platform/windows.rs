use std::io;
use tokio::process::{Child, Command};
use tracing::debug;
use windows::Win32::Foundation::{CloseHandle, HANDLE};

/// Start the child suspended. [`TreeGuard::attach`] assigns it to the job and
/// only then resumes it, so the program cannot start anything outside the job.
pub(crate) fn configure(cmd: &mut Command) {
    use windows::Win32::System::Threading::CREATE_SUSPENDED;
    cmd.creation_flags(CREATE_SUSPENDED.0);
}

/// RAII wrapper for a Job Object holding one supervised child.
///
/// The job is created with `JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE`, so closing the
/// handle on drop also kills anything still running in it.
#[derive(Debug)]
pub(crate) struct TreeGuard {
    job: HANDLE,
}

// SAFETY: Windows HANDLEs are safe to send between threads.
// The HANDLE is an opaque kernel object reference that can be used from any thread.
unsafe impl Send for TreeGuard {}
unsafe impl Sync for TreeGuard {}

impl Drop for TreeGuard {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.job);
        }
    }
}

impl TreeGuard {
    /// Assign the suspended child to a fresh job, then let it run.
    ///
    /// On error the guard is dropped, which kills the child through the job
    /// if it was already assigned.
    pub(crate) fn attach(child: &Child) -> io::Result<Self> {
        use windows::Win32::System::JobObjects::{
            AssignProcessToJobObject, CreateJobObjectW, JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE,
            JOBOBJECT_EXTENDED_LIMIT_INFORMATION, JobObjectExtendedLimitInformation,
            SetInformationJobObject,
        };
        use windows::Win32::System::Threading::{OpenProcess, PROCESS_ALL_ACCESS};

        let pid = child
            .id()
            .ok_or_else(|| io::Error::other("spawned process has no pid"))?;

        unsafe {
            let job = CreateJobObjectW(None, None)
                .map_err(|e| io::Error::other(format!("Failed to create Job Object: {e}")))?;
            let guard = Self { job };

            let mut info: JOBOBJECT_EXTENDED_LIMIT_INFORMATION = std::mem::zeroed();
            info.BasicLimitInformation.LimitFlags = JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE;
            SetInformationJobObject(
                guard.job,
                JobObjectExtendedLimitInformation,
                (&raw const info).cast(),
                std::mem::size_of::<JOBOBJECT_EXTENDED_LIMIT_INFORMATION>() as u32,
            )
            .map_err(|e| io::Error::other(format!("Failed to configure Job Object: {e}")))?;

            let process = OpenProcess(PROCESS_ALL_ACCESS, false, pid)
                .map_err(|e| io::Error::other(format!("Failed to open process {pid}: {e}")))?;
            let assigned = AssignProcessToJobObject(guard.job, process);
            let _ = CloseHandle(process);
            assigned.map_err(|e| {
                io::Error::other(format!("Failed to assign process to Job Object: {e}"))
            })?;

            resume_threads(pid)?;
            Ok(guard)
        }
    }

    /// Terminate every process in the job.
    pub(crate) fn kill_tree(&self) {
        self.terminate();
    }

    pub(crate) fn kill_lingering(&self) {
        self.terminate();
    }

    fn terminate(&self) {
        use windows::Win32::System::JobObjects::TerminateJobObject;
        unsafe {
            match TerminateJobObject(self.job, 1) {
                Ok(()) => debug!("terminated job object"),
                Err(err) => debug!(%err, "failed to terminate job object"),
            }
        }
    }
}

/// Resume every thread of the suspended process `pid`. A process created
/// with `CREATE_SUSPENDED` has exactly one, its main thread.
unsafe fn resume_threads(pid: u32) -> io::Result<()> {
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, TH32CS_SNAPTHREAD, THREADENTRY32, Thread32First, Thread32Next,
    };
    use windows::Win32::System::Threading::{OpenThread, ResumeThread, THREAD_SUSPEND_RESUME};

    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPTHREAD, 0)
            .map_err(|e| io::Error::other(format!("Failed to list threads: {e}")))?;

        let mut entry = THREADENTRY32 {
            dwSize: std::mem::size_of::<THREADENTRY32>() as u32,
            ..Default::default()
        };
        let mut resumed = 0usize;
        let mut more = Thread32First(snapshot, &mut entry).is_ok();
        while more {
            if entry.th32OwnerProcessID == pid
                && let Ok(thread) = OpenThread(THREAD_SUSPEND_RESUME, false, entry.th32ThreadID)
            {
                if ResumeThread(thread) != u32::MAX {
                    resumed += 1;
                }
                let _ = CloseHandle(thread);
            }
            more = Thread32Next(snapshot, &mut entry).is_ok();
        }
        let _ = CloseHandle(snapshot);

        if resumed == 0 {
            return Err(io::Error::other(format!(
                "Failed to resume process {pid} after assigning it to the Job Object"
            )));
        }
        debug!(pid, threads = resumed, "resumed contained process");
        Ok(())
    }
}
