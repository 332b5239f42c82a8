// Replay protection: the single owner of the last accepted command counter

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Counter {counter} is not greater than last accepted {last}")]
pub struct ReplayError {
    pub counter: u64,
    pub last: u64,
}

/// Accepts only strictly increasing counters.
///
/// Mutation goes through `&mut self`, so whoever owns the guard is the only
/// authority that can accept a counter; two commands with the same counter
/// can never both pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayGuard {
    last_accepted: Option<u64>,
}

impl ReplayGuard {
    /// A guard that accepts any first counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a counter persisted before a reboot
    pub fn resume_after(last_accepted: u64) -> Self {
        Self {
            last_accepted: Some(last_accepted),
        }
    }

    /// Check without committing
    pub fn check(&self, counter: u64) -> Result<(), ReplayError> {
        match self.last_accepted {
            Some(last) if counter <= last => Err(ReplayError { counter, last }),
            _ => Ok(()),
        }
    }

    /// Check and commit `counter` as the new high-water mark
    pub fn accept(&mut self, counter: u64) -> Result<(), ReplayError> {
        self.check(counter)?;
        self.last_accepted = Some(counter);
        Ok(())
    }

    pub fn last_accepted(&self) -> Option<u64> {
        self.last_accepted
    }
}
