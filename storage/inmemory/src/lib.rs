// Copyright (c) 2022-2025 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-memory storage backend.
//!
//! The store is a [BTreeMap] behind an [Arc]. Readers take a cheap snapshot by cloning the
//! [Arc]; a batch commit copies the map only if some reader still holds an older snapshot. That
//! way iteration always sees a consistent state and never blocks writers for longer than it takes
//! to clone a pointer.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
};

use logging::log;
use storage_core::{
    backend, error::Fatal, util::SnapshotRangeIter, Data, KeyRange, WriteBatch, WriteOp,
};

type Map = BTreeMap<Data, Data>;

/// In-memory storage backend
#[derive(Clone, Copy, Debug, Default)]
pub struct InMemory;

impl InMemory {
    pub fn new() -> Self {
        Self
    }
}

impl backend::Backend for InMemory {
    type Impl = InMemoryImpl;

    fn open(self) -> storage_core::Result<Self::Impl> {
        log::debug!("Opening in-memory storage");
        Ok(InMemoryImpl {
            map: RwLock::new(Arc::new(Map::new())),
            closed: AtomicBool::new(false),
        })
    }
}

/// Opened in-memory store
pub struct InMemoryImpl {
    map: RwLock<Arc<Map>>,
    closed: AtomicBool,
}

fn poisoned<T>(_: T) -> storage_core::Error {
    Fatal::InternalError("in-memory store lock poisoned".to_string()).into()
}

impl InMemoryImpl {
    /// Current state of the store. Stays valid and immutable even if the store is modified later.
    fn snapshot(&self) -> storage_core::Result<Arc<Map>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Fatal::Closed.into());
        }
        self.map.read().map(|map| Arc::clone(&map)).map_err(poisoned)
    }
}

impl backend::ReadOps for InMemoryImpl {
    fn get(&self, key: &[u8]) -> storage_core::Result<Option<Data>> {
        Ok(self.snapshot()?.get(key).cloned())
    }

    fn range_iter(
        &self,
        range: KeyRange,
    ) -> storage_core::Result<impl Iterator<Item = storage_core::Result<(Data, Data)>> + '_> {
        Ok(SnapshotRangeIter::new(self.snapshot()?, range))
    }

    fn last_in_range(&self, range: KeyRange) -> storage_core::Result<Option<(Data, Data)>> {
        let snapshot = self.snapshot()?;
        Ok(storage_core::util::last_in_range(&snapshot, &range))
    }
}

impl backend::WriteOps for InMemoryImpl {
    fn apply_batch(&self, batch: WriteBatch) -> storage_core::Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Fatal::Closed.into());
        }

        let mut guard = self.map.write().map_err(poisoned)?;
        // Readers only ever see the map through a snapshot taken under the lock, so nobody can
        // observe the batch half-applied. Outstanding snapshots keep the old copy.
        let map = Arc::make_mut(&mut guard);
        for op in batch {
            match op {
                WriteOp::Put(key, val) => {
                    map.insert(key, val);
                }
                WriteOp::Del(key) => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }
}

impl backend::BackendImpl for InMemoryImpl {
    fn close(&self) -> storage_core::Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            log::debug!("Closing in-memory storage");
            *self.map.write().map_err(poisoned)? = Arc::new(Map::new());
        }
        Ok(())
    }
}

#[cfg(test)]
mod test;
