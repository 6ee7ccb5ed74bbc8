// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use trustchain_core::ScratchStore;

/// What the host supplies to every call of one execution.
pub trait ExecutionContext {
    /// Block time in Unix seconds; fixed for the whole execution.
    fn now(&self) -> u64;

    fn scratch(&self) -> &ScratchStore;
}

/// A single execution: a fixed clock and a scratch store that lives exactly
/// as long as the execution does.
#[derive(Debug)]
pub struct Execution {
    now: u64,
    scratch: ScratchStore,
}

impl Execution {
    pub fn new(now: u64) -> Self {
        Self {
            now,
            scratch: ScratchStore::new(),
        }
    }

    /// Ends the execution, discarding everything cached during it.
    pub fn finish(self) {
        self.scratch.clear();
    }
}

impl Drop for Execution {
    fn drop(&mut self) {
        self.scratch.clear();
    }
}

impl ExecutionContext for Execution {
    fn now(&self) -> u64 {
        self.now
    }

    fn scratch(&self) -> &ScratchStore {
        &self.scratch
    }
}
