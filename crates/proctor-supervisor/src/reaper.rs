//! Process-tree discovery for the reaper
//!
//! The process table is read with `sysinfo`; the walk itself is a pure
//! function over `(pid, parent)` pairs so it can be tested without spawning
//! anything.

use std::collections::{BTreeSet, HashMap};
use sysinfo::{ProcessesToUpdate, System};

/// All transitive descendants of `root` in `table`, excluding `root` itself.
#[must_use]
pub fn descendants_of<I>(root: u32, table: I) -> BTreeSet<u32>
where
    I: IntoIterator<Item = (u32, Option<u32>)>,
{
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for (pid, parent) in table {
        if let Some(parent) = parent {
            if parent != pid {
                children.entry(parent).or_default().push(pid);
            }
        }
    }

    let mut found = BTreeSet::new();
    let mut frontier = vec![root];
    while let Some(pid) = frontier.pop() {
        if let Some(kids) = children.get(&pid) {
            for &kid in kids {
                if kid != root && found.insert(kid) {
                    frontier.push(kid);
                }
            }
        }
    }
    found
}

/// Live snapshot of the process table, refreshed on demand.
pub(crate) struct ProcessTable {
    system: System,
}

impl ProcessTable {
    pub(crate) fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// Re-read the process table and return the descendants of `root`.
    pub(crate) fn descendants(&mut self, root: u32) -> BTreeSet<u32> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);
        descendants_of(
            root,
            self.system
                .processes()
                .iter()
                .map(|(pid, process)| (pid.as_u32(), process.parent().map(|p| p.as_u32()))),
        )
    }
}
