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

//! Staging of writes and their atomic application

use std::{collections::BTreeMap, sync::MutexGuard};

use logging::log;
use storage_core::{backend::Backend, Data, WriteBatch, WriteOp};

use crate::{
    accessor::Accessor,
    error::UsageError,
    schema::{Column, Variable},
};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TransactionState {
    /// Accepting writes
    Open,
    /// Commit has been attempted, whether it succeeded or not
    Committed,
    /// Closed without committing, all staged writes dropped
    Discarded,
}

/// A batch of writes to be applied atomically.
///
/// Nothing staged here is visible to readers until [Transaction::commit] succeeds. Dropping an
/// uncommitted transaction discards it.
#[must_use = "Transaction has no effect unless committed"]
pub struct Transaction<'a, B: Backend> {
    accessor: &'a Accessor<B>,
    // Namespaced key to the new value, `None` for deletion
    writes: BTreeMap<Data, Option<Data>>,
    state: TransactionState,
    writer: Option<MutexGuard<'a, ()>>,
}

impl<'a, B: Backend> Transaction<'a, B> {
    pub(crate) fn new(accessor: &'a Accessor<B>, writer: MutexGuard<'a, ()>) -> Self {
        Self {
            accessor,
            writes: BTreeMap::new(),
            state: TransactionState::Open,
            writer: Some(writer),
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == TransactionState::Open
    }

    /// Number of distinct keys with a write staged
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    fn stage(&mut self, key: Data, value: Option<Data>) -> crate::Result<()> {
        if !self.is_open() {
            return Err(UsageError::TransactionNotOpen.into());
        }
        self.writes.insert(key, value);
        Ok(())
    }

    fn check_variable<T>(&self, variable: &Variable<T>) -> crate::Result<()> {
        Ok(self.accessor.schema().check_variable(variable)?)
    }

    fn check_column<K, V>(&self, column: &Column<K, V>) -> crate::Result<()> {
        Ok(self.accessor.schema().check_column(column)?)
    }

    pub fn put_variable<T>(&mut self, variable: &Variable<T>, value: &T) -> crate::Result<()> {
        self.check_variable(variable)?;
        let value = variable.serializer().serialize(value);
        self.stage(variable.namespace().prefix(), Some(value))
    }

    /// Set the variable to given bytes as they are
    pub fn put_variable_raw<T>(
        &mut self,
        variable: &Variable<T>,
        value: Data,
    ) -> crate::Result<()> {
        self.check_variable(variable)?;
        self.stage(variable.namespace().prefix(), Some(value))
    }

    pub fn delete_variable<T>(&mut self, variable: &Variable<T>) -> crate::Result<()> {
        self.check_variable(variable)?;
        self.stage(variable.namespace().prefix(), None)
    }

    /// Associate a value with given key, replacing the previous one
    pub fn put<K, V>(&mut self, column: &Column<K, V>, key: &K, value: &V) -> crate::Result<()> {
        self.check_column(column)?;
        let key = column.namespace().key(&column.key_serializer().serialize(key));
        let value = column.value_serializer().serialize(value);
        self.stage(key, Some(value))
    }

    /// Store an already serialized entry, e.g. one obtained from [Accessor::stream_raw]
    pub fn put_raw<K, V>(
        &mut self,
        column: &Column<K, V>,
        key: &[u8],
        value: Data,
    ) -> crate::Result<()> {
        self.check_column(column)?;
        self.stage(column.namespace().key(key), Some(value))
    }

    pub fn delete<K, V>(&mut self, column: &Column<K, V>, key: &K) -> crate::Result<()> {
        self.check_column(column)?;
        let key = column.namespace().key(&column.key_serializer().serialize(key));
        self.stage(key, None)
    }

    /// Apply all staged writes in one atomic batch.
    ///
    /// The transaction is finished afterwards even if the commit fails, in which case none of the
    /// writes have taken effect.
    pub fn commit(&mut self) -> crate::Result<()> {
        if !self.is_open() {
            return Err(UsageError::TransactionNotOpen.into());
        }
        self.state = TransactionState::Committed;

        let batch: WriteBatch = std::mem::take(&mut self.writes)
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => WriteOp::Put(key, value),
                None => WriteOp::Del(key),
            })
            .collect();
        let (puts, dels) = batch.counts();

        let result = self.accessor.apply_batch(batch);
        self.writer = None;

        match &result {
            Ok(()) => log::debug!("Transaction committed: {puts} puts, {dels} deletions"),
            Err(e) => log::error!("Transaction commit failed: {e}"),
        }
        result
    }

    /// Discard all staged writes. Does nothing if the transaction is already finished.
    pub fn close(&mut self) {
        if self.is_open() {
            log::trace!("Discarding {} staged writes", self.writes.len());
            self.state = TransactionState::Discarded;
            self.writes.clear();
        }
        self.writer = None;
    }
}

impl<B: Backend> Drop for Transaction<'_, B> {
    fn drop(&mut self) {
        self.close()
    }
}
