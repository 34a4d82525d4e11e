//! Fixed-capacity tables of running jobs.

use std::fmt;

use log::{debug, warn};
use nix::unistd::Pid;

use crate::errors::{ErrorKind, Result};

pub const DEFAULT_JOB_CAPACITY: usize = 64;

/// Maps slot indices to the processes the shell still has to reclaim.
///
/// A slot holds a pid from the moment the process is launched until it has
/// been waited on; it is emptied right after.
#[derive(Clone, PartialEq)]
pub struct JobSlotTable {
    slots: Vec<Option<Pid>>,
}

impl JobSlotTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Stores `pid` in the lowest empty slot and returns its index.
    ///
    /// Fails with `JobTableFull` if every slot is taken; the table is left
    /// unchanged.
    pub fn insert(&mut self, pid: Pid) -> Result<usize> {
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                debug!("tracking {} in slot {}", pid, index);
                self.slots[index] = Some(pid);
                Ok(index)
            }
            None => {
                warn!("no free slot for {}", pid);
                Err(ErrorKind::JobTableFull(self.capacity()).into())
            }
        }
    }

    /// Occupied `(slot, pid)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Pid)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|pid| (index, pid)))
    }

    /// Empties `slot`, returning the pid it held.
    pub fn clear(&mut self, slot: usize) -> Option<Pid> {
        self.slots.get_mut(slot).and_then(Option::take)
    }
}

impl Default for JobSlotTable {
    fn default() -> Self {
        Self::new(DEFAULT_JOB_CAPACITY)
    }
}

impl fmt::Debug for JobSlotTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} of {} slots in use", self.len(), self.capacity())?;
        for (slot, pid) in self.iter() {
            writeln!(f, "[{}] {}", slot, pid)?;
        }

        Ok(())
    }
}
