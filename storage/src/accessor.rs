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

//! The store handle serving typed reads and creating write transactions

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, PoisonError, TryLockError,
};

use logging::log;
use storage_core::{
    backend::{Backend, BackendImpl, ReadOps, WriteOps},
    Data, KeyRange, Namespace, WriteBatch,
};

use crate::{
    entry::ColumnEntry,
    error::{ConfigurationError, UsageError},
    raw::RawDb,
    schema::{Column, Schema, Variable},
    transaction::Transaction,
};

/// Handle to an opened store, bound to a fixed [Schema].
///
/// Reads go straight to the backend and never wait for a transaction in progress. There is at
/// most one [Transaction] per accessor at any time. The backend is released by [Accessor::close]
/// or when the accessor is dropped.
pub struct Accessor<B: Backend> {
    backend: B::Impl,
    schema: Schema,
    writer: Mutex<()>,
    closed: AtomicBool,
}

impl<B: Backend> Accessor<B> {
    /// Open the backend and bind it to given schema.
    ///
    /// Fails if the schema declares an id twice or if the store was previously used with
    /// different names for the same ids.
    pub fn open(backend: B, schema: Schema) -> crate::Result<Self> {
        schema.validate()?;

        let backend = backend.open()?;
        if let Err(e) = register_schema(&backend, &schema) {
            if let Err(close_err) = backend.close() {
                log::warn!("Failed to close backend after failed open: {close_err}");
            }
            return Err(e);
        }

        log::info!(
            "Storage opened with {} columns and {} variables",
            schema.columns().count(),
            schema.variables().count(),
        );

        Ok(Self {
            backend,
            schema,
            writer: Mutex::new(()),
            closed: AtomicBool::new(false),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> crate::Result<()> {
        if self.is_closed() {
            return Err(UsageError::AccessorClosed.into());
        }
        Ok(())
    }

    fn ensure_column<K, V>(&self, column: &Column<K, V>) -> crate::Result<()> {
        self.ensure_open()?;
        Ok(self.schema.check_column(column)?)
    }

    fn ensure_variable<T>(&self, variable: &Variable<T>) -> crate::Result<()> {
        self.ensure_open()?;
        Ok(self.schema.check_variable(variable)?)
    }

    /// Get the undecoded contents of a variable
    pub fn get_variable_raw<T>(&self, variable: &Variable<T>) -> crate::Result<Option<Data>> {
        self.ensure_variable(variable)?;
        Ok(self.backend.get(&variable.namespace().prefix())?)
    }

    /// Get the value of a variable, `None` if it has never been set
    pub fn get_variable<T>(&self, variable: &Variable<T>) -> crate::Result<Option<T>> {
        let raw = self.get_variable_raw(variable)?;
        Ok(raw.map(|bytes| variable.serializer().deserialize(&bytes)).transpose()?)
    }

    /// Get the undecoded value associated with given key
    pub fn get_raw<K, V>(&self, column: &Column<K, V>, key: &K) -> crate::Result<Option<Data>> {
        self.ensure_column(column)?;
        let key = column.namespace().key(&column.key_serializer().serialize(key));
        Ok(self.backend.get(&key)?)
    }

    /// Get the value associated with given key
    pub fn get<K, V>(&self, column: &Column<K, V>, key: &K) -> crate::Result<Option<V>> {
        let raw = self.get_raw(column, key)?;
        Ok(raw.map(|bytes| column.value_serializer().deserialize(&bytes)).transpose()?)
    }

    /// Entries with keys between `from` and `to`, both inclusive, in ascending key order.
    ///
    /// The iterator sees the column as it was when this was called, later commits have no effect
    /// on it. The sequence is empty if `from > to`.
    pub fn stream<K, V>(
        &self,
        column: &Column<K, V>,
        from: &K,
        to: &K,
    ) -> crate::Result<impl Iterator<Item = crate::Result<ColumnEntry<K, V>>> + '_> {
        self.ensure_column(column)?;
        let ser = column.key_serializer();
        let range = column.namespace().inclusive_range(&ser.serialize(from), &ser.serialize(to));
        self.decoded_entries(*column, range)
    }

    /// All entries of a column in ascending key order
    pub fn stream_all<K, V>(
        &self,
        column: &Column<K, V>,
    ) -> crate::Result<impl Iterator<Item = crate::Result<ColumnEntry<K, V>>> + '_> {
        self.ensure_column(column)?;
        self.decoded_entries(*column, column.namespace().range())
    }

    /// Keys between `from` and `to`, both inclusive. Values are not decoded.
    pub fn stream_keys<K, V>(
        &self,
        column: &Column<K, V>,
        from: &K,
        to: &K,
    ) -> crate::Result<impl Iterator<Item = crate::Result<K>> + '_> {
        self.ensure_column(column)?;
        let key_serializer = column.key_serializer();
        let range = column
            .namespace()
            .inclusive_range(&key_serializer.serialize(from), &key_serializer.serialize(to));
        let entries = self.raw_entries(column.namespace(), range)?;
        Ok(entries.map(move |entry| -> crate::Result<K> {
            Ok(key_serializer.deserialize(entry?.key())?)
        }))
    }

    /// All entries of a column as undecoded bytes, keys without the column prefix
    pub fn stream_raw<K, V>(
        &self,
        column: &Column<K, V>,
    ) -> crate::Result<impl Iterator<Item = crate::Result<ColumnEntry<Data, Data>>> + '_> {
        self.ensure_column(column)?;
        self.raw_entries(column.namespace(), column.namespace().range())
    }

    /// The entry with the greatest key less than or equal to given key
    pub fn get_floor_entry<K, V>(
        &self,
        column: &Column<K, V>,
        key: &K,
    ) -> crate::Result<Option<ColumnEntry<K, V>>> {
        self.ensure_column(column)?;
        let range = column.namespace().range_up_to(&column.key_serializer().serialize(key));
        self.last_entry_in(column, range)
    }

    /// The entry with the smallest key
    pub fn get_first_entry<K, V>(
        &self,
        column: &Column<K, V>,
    ) -> crate::Result<Option<ColumnEntry<K, V>>> {
        self.ensure_column(column)?;
        self.raw_entries(column.namespace(), column.namespace().range())?
            .next()
            .transpose()?
            .map(|entry| decode_entry(column, entry))
            .transpose()
    }

    /// The entry with the greatest key
    pub fn get_last_entry<K, V>(
        &self,
        column: &Column<K, V>,
    ) -> crate::Result<Option<ColumnEntry<K, V>>> {
        self.ensure_column(column)?;
        self.last_entry_in(column, column.namespace().range())
    }

    fn last_entry_in<K, V>(
        &self,
        column: &Column<K, V>,
        range: KeyRange,
    ) -> crate::Result<Option<ColumnEntry<K, V>>> {
        let prefix_len = column.namespace().prefix().len();
        self.backend
            .last_in_range(range)?
            .map(|(key, value)| decode_entry(column, strip_prefix(prefix_len, key, value)))
            .transpose()
    }

    fn raw_entries(
        &self,
        namespace: Namespace,
        range: KeyRange,
    ) -> crate::Result<impl Iterator<Item = crate::Result<ColumnEntry<Data, Data>>> + '_> {
        let prefix_len = namespace.prefix().len();
        let iter = self.backend.range_iter(range)?;
        Ok(iter.map(move |entry| -> crate::Result<ColumnEntry<Data, Data>> {
            let (key, value) = entry?;
            Ok(strip_prefix(prefix_len, key, value))
        }))
    }

    fn decoded_entries<K, V>(
        &self,
        column: Column<K, V>,
        range: KeyRange,
    ) -> crate::Result<impl Iterator<Item = crate::Result<ColumnEntry<K, V>>> + '_> {
        let entries = self.raw_entries(column.namespace(), range)?;
        Ok(entries.map(move |entry| -> crate::Result<ColumnEntry<K, V>> {
            decode_entry(&column, entry?)
        }))
    }

    /// Start a write transaction, waiting for the one in progress (if any) to finish.
    ///
    /// Calling this while the same thread holds an open transaction of this accessor deadlocks.
    pub fn start_transaction(&self) -> crate::Result<Transaction<'_, B>> {
        self.ensure_open()?;
        let guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        // The accessor may have been closed while waiting
        self.ensure_open()?;
        log::trace!("Write transaction started");
        Ok(Transaction::new(self, guard))
    }

    /// Start a write transaction, failing with [UsageError::WriterBusy] if one is in progress
    pub fn try_start_transaction(&self) -> crate::Result<Transaction<'_, B>> {
        self.ensure_open()?;
        let guard = match self.writer.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(UsageError::WriterBusy.into()),
        };
        log::trace!("Write transaction started");
        Ok(Transaction::new(self, guard))
    }

    /// Run given closure in a transaction. The transaction is committed if the closure returns
    /// `Ok` and discarded otherwise.
    pub fn update<R, E: From<crate::Error>>(
        &self,
        f: impl FnOnce(&mut Transaction<'_, B>) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut tx = self.start_transaction()?;
        let result = f(&mut tx)?;
        tx.commit()?;
        Ok(result)
    }

    /// Dump the contents of every declared column and variable
    pub fn dump_raw(&self) -> crate::Result<RawDb> {
        self.ensure_open()?;
        let mut db = RawDb::default();
        for desc in self.schema.columns() {
            let entries = self.raw_entries(desc.namespace, desc.namespace.range())?;
            let column = entries
                .map(|entry| entry.map(ColumnEntry::into_pair))
                .collect::<crate::Result<_>>()?;
            db.insert_column(desc.name, column);
        }
        for desc in self.schema.variables() {
            if let Some(value) = self.backend.get(&desc.namespace.prefix())? {
                db.insert_variable(desc.name, value);
            }
        }
        Ok(db)
    }

    pub(crate) fn apply_batch(&self, batch: WriteBatch) -> crate::Result<()> {
        self.ensure_open()?;
        Ok(self.backend.apply_batch(batch)?)
    }

    /// Release the backend. Subsequent operations fail with [UsageError::AccessorClosed].
    ///
    /// Closing an already closed accessor does nothing.
    pub fn close(&self) -> crate::Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        log::info!("Closing storage");
        Ok(self.backend.close()?)
    }
}

impl<B: Backend> Drop for Accessor<B> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to close storage: {e}");
        }
    }
}

fn strip_prefix(prefix_len: usize, mut key: Data, value: Data) -> ColumnEntry<Data, Data> {
    key.drain(..prefix_len);
    ColumnEntry::new(key, value)
}

fn decode_entry<K, V>(
    column: &Column<K, V>,
    entry: ColumnEntry<Data, Data>,
) -> crate::Result<ColumnEntry<K, V>> {
    let key = column.key_serializer().deserialize(entry.key())?;
    let value = column.value_serializer().deserialize(entry.value())?;
    Ok(ColumnEntry::new(key, value))
}

/// Record the names of the declared columns and variables, checking them against the ones
/// recorded by previous runs.
fn register_schema<S: ReadOps + WriteOps>(store: &S, schema: &Schema) -> crate::Result<()> {
    let mut batch = WriteBatch::new();
    for desc in schema.descriptors() {
        let Some(meta_key) = desc.namespace.meta_key() else {
            continue;
        };
        match store.get(&meta_key)? {
            Some(stored) if stored == desc.name.as_bytes() => {}
            Some(stored) => {
                return Err(ConfigurationError::SchemaMismatch {
                    namespace: desc.namespace,
                    stored: String::from_utf8_lossy(&stored).into_owned(),
                    declared: desc.name.to_owned(),
                }
                .into())
            }
            None => batch.put(meta_key, desc.name.as_bytes().to_vec()),
        }
    }

    if !batch.is_empty() {
        log::debug!("Registering {} new columns and variables", batch.len());
        store.apply_batch(batch)?;
    }
    Ok(())
}
