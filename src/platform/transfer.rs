use std::{path::PathBuf, sync::Arc};

use dashmap::{mapref::entry::Entry, DashMap};

use super::{DownloadProgress, PlatformError, TransferKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TransferState {
    Running(u64),
    Completed { path: PathBuf, size: u64 },
    Failed(String),
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum PollOutcome {
    /// This poll registered the key; the caller starts the transfer.
    Started,
    Progress(DownloadProgress),
}

/// Live transfers shared between pollers and the tasks that fetch the files.
#[derive(Debug, Clone, Default)]
pub(super) struct TransferTable {
    entries: Arc<DashMap<TransferKey, TransferState>>,
}

impl TransferTable {
    /// Terminal states are removed once reported.
    pub fn poll(&self, key: &TransferKey) -> Result<PollOutcome, PlatformError> {
        match self.entries.entry(key.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(TransferState::Running(0));
                Ok(PollOutcome::Started)
            }
            Entry::Occupied(entry) => {
                let state = entry.get().clone();
                match state {
                    TransferState::Running(downloaded) => {
                        Ok(PollOutcome::Progress(DownloadProgress::running(downloaded)))
                    }
                    TransferState::Completed { path, size } => {
                        entry.remove();
                        Ok(PollOutcome::Progress(DownloadProgress::completed(size, path)))
                    }
                    TransferState::Failed(reason) => {
                        entry.remove();
                        Err(PlatformError::Download(reason))
                    }
                }
            }
        }
    }

    pub fn record_progress(&self, key: &TransferKey, downloaded: u64) {
        if let Some(mut state) = self.entries.get_mut(key) {
            if matches!(*state, TransferState::Running(_)) {
                *state = TransferState::Running(downloaded);
            }
        }
    }

    /// Returns false when the key was released before the transfer ended.
    pub fn finish(&self, key: &TransferKey, outcome: TransferState) -> bool {
        match self.entries.get_mut(key) {
            Some(mut state) => {
                *state = outcome;
                true
            }
            None => false,
        }
    }

    pub fn release(&self, key: &TransferKey) -> Option<TransferState> {
        self.entries.remove(key).map(|(_, state)| state)
    }

    #[cfg(test)]
    pub fn seed(&self, key: &TransferKey, state: TransferState) {
        self.entries.insert(key.clone(), state);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
