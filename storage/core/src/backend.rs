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

//! Traits specifying the interface a storage backend has to provide.
//!
//! A backend is a single flat keyspace of byte strings ordered byte-lexicographically (i.e. as
//! unsigned bytes, shorter prefix first). Higher layers namespace their keys, see
//! [crate::keyspace].

use crate::{Data, KeyRange, WriteBatch};

/// Read operations on a backend
pub trait ReadOps {
    /// Get value associated with given key
    fn get(&self, key: &[u8]) -> crate::Result<Option<Data>>;

    /// Iterate over entries within given key range in ascending key order.
    ///
    /// The iterator is lazy and forward-only. It must not observe writes applied after it has been
    /// created: it works on a consistent snapshot of the store for its whole life. Each call
    /// produces a fresh iterator. Errors encountered mid-iteration are reported as items.
    fn range_iter(
        &self,
        range: KeyRange,
    ) -> crate::Result<impl Iterator<Item = crate::Result<(Data, Data)>> + '_>;

    /// Get the entry with the greatest key within given range, if any.
    fn last_in_range(&self, range: KeyRange) -> crate::Result<Option<(Data, Data)>>;
}

/// Modifying operations on a backend
pub trait WriteOps {
    /// Apply all operations in the batch atomically.
    ///
    /// Either all of the operations become visible to subsequent reads or none of them do,
    /// including in the presence of a crash midway (to the extent the engine is durable).
    fn apply_batch(&self, batch: WriteBatch) -> crate::Result<()>;
}

/// An opened storage backend
pub trait BackendImpl: ReadOps + WriteOps + Send + Sync + 'static {
    /// Release resources held by the backend. Calling this more than once has no further effect.
    ///
    /// Any operation issued after closing fails with [crate::error::Fatal::Closed].
    fn close(&self) -> crate::Result<()> {
        Ok(())
    }
}

/// Storage backend, before it is opened
pub trait Backend {
    /// Opened backend type
    type Impl: BackendImpl;

    /// Open the database
    fn open(self) -> crate::Result<Self::Impl>;
}
