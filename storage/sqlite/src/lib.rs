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

//! Persistent storage backend on top of SQLite.
//!
//! All entries live in a single table keyed by the namespaced key. The database runs in WAL
//! mode: one connection does all the writing while reads go through a pool of separate
//! connections, so readers never wait for a batch being written. A range iterator keeps a read
//! transaction open on its connection for its whole life and fetches rows in pages.

mod error;
mod queries;

use std::{
    collections::VecDeque,
    ops::Bound,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard,
    },
    time::Duration,
};

use logging::log;
use rusqlite::{Connection, OpenFlags, OptionalExtension, ToSql, TransactionBehavior};
use storage_core::{
    backend::{self, ReadOps, WriteOps},
    error::Fatal,
    Data, KeyRange, WriteBatch, WriteOp,
};

pub use error::process_sqlite_error;
use queries::{Order, RangeQuery};

/// How hard SQLite tries to make sure data reaches the disk, see `PRAGMA synchronous`
#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum Synchronous {
    Off,
    Normal,
    Full,
    Extra,
}

impl Synchronous {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Normal => "NORMAL",
            Self::Full => "FULL",
            Self::Extra => "EXTRA",
        }
    }
}

#[derive(Eq, PartialEq, Clone, Debug)]
pub struct Sqlite {
    path: PathBuf,
    synchronous: Synchronous,
    busy_timeout: Duration,
    iter_page_size: usize,
    max_idle_readers: usize,
}

impl Sqlite {
    /// New SQLite database backend stored in given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            synchronous: Synchronous::Full,
            busy_timeout: Duration::from_secs(5),
            iter_page_size: 256,
            max_idle_readers: 4,
        }
    }

    pub fn with_synchronous(mut self, synchronous: Synchronous) -> Self {
        self.synchronous = synchronous;
        self
    }

    /// How long to wait for a lock held by another connection before giving up
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Number of rows a range iterator fetches at once
    pub fn with_iter_page_size(mut self, page_size: usize) -> Self {
        self.iter_page_size = page_size.max(1);
        self
    }

    /// Number of unused read connections kept around for reuse
    pub fn with_max_idle_readers(mut self, max_idle_readers: usize) -> Self {
        self.max_idle_readers = max_idle_readers;
        self
    }

    fn open_writer(&self) -> rusqlite::Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(&self.path, flags)?;
        connection.busy_timeout(self.busy_timeout)?;
        connection.pragma_update(None, "synchronous", self.synchronous.as_str())?;
        Ok(connection)
    }
}

/// Switch the database to WAL and set up the table, checking the layout version
fn init_schema(connection: &mut Connection) -> storage_core::Result<()> {
    let journal_mode: String = connection
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(process_sqlite_error)?;
    if !journal_mode.eq_ignore_ascii_case("wal") {
        return Err(Fatal::InternalError(format!("Cannot enable WAL, got {journal_mode}")).into());
    }

    let tx = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(process_sqlite_error)?;
    let version: i32 = tx
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(process_sqlite_error)?;

    match version {
        0 => {
            log::info!("Initializing new database, layout version {}", queries::SCHEMA_VERSION);
            tx.execute(queries::CREATE_TABLE, ()).map_err(process_sqlite_error)?;
            tx.pragma_update(None, "user_version", queries::SCHEMA_VERSION)
                .map_err(process_sqlite_error)?;
        }
        queries::SCHEMA_VERSION => {}
        other => {
            log::error!(
                "Database layout version {other} not supported, expected {}",
                queries::SCHEMA_VERSION
            );
            return Err(Fatal::SchemaMismatch.into());
        }
    }

    tx.commit().map_err(process_sqlite_error)
}

impl backend::Backend for Sqlite {
    type Impl = SqliteImpl;

    fn open(self) -> storage_core::Result<Self::Impl> {
        // Attempt to create the parent storage directory
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(storage_core::error::process_io_error)?;
        }

        let mut writer = self.open_writer().map_err(process_sqlite_error)?;
        init_schema(&mut writer)?;
        log::info!("Opened SQLite database at {}", self.path.display());

        Ok(SqliteImpl {
            writer: Mutex::new(Some(writer)),
            readers: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            config: self,
        })
    }
}

pub struct SqliteImpl {
    writer: Mutex<Option<Connection>>,
    /// Idle read connections
    readers: Mutex<Vec<Connection>>,
    closed: AtomicBool,
    config: Sqlite,
}

fn lock<T>(mutex: &Mutex<T>) -> storage_core::Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Fatal::InternalError("SQLite connection mutex poisoned".to_owned()).into())
}

impl SqliteImpl {
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn ensure_open(&self) -> storage_core::Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Fatal::Closed.into());
        }
        Ok(())
    }

    /// Take an idle read connection or open a new one
    fn take_reader(&self) -> storage_core::Result<Connection> {
        self.ensure_open()?;
        if let Some(connection) = lock(&self.readers)?.pop() {
            return Ok(connection);
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let open = || -> rusqlite::Result<Connection> {
            let connection = Connection::open_with_flags(&self.config.path, flags)?;
            connection.busy_timeout(self.config.busy_timeout)?;
            connection.pragma_update(None, "query_only", true)?;
            Ok(connection)
        };
        log::trace!("Opening new read connection");
        open().map_err(process_sqlite_error)
    }

    /// Return a read connection to the pool
    fn release_reader(&self, connection: Connection) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        match self.readers.lock() {
            Ok(mut readers) if readers.len() < self.config.max_idle_readers => {
                readers.push(connection)
            }
            _ => {}
        }
    }

    fn with_reader<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> storage_core::Result<T> {
        let connection = self.take_reader()?;
        let result = f(&connection).map_err(process_sqlite_error);
        self.release_reader(connection);
        result
    }
}

fn query_range(
    connection: &Connection,
    range: &KeyRange,
    order: Order,
    limit: usize,
) -> rusqlite::Result<Vec<(Data, Data)>> {
    let query = RangeQuery::new(range, order);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let mut params: Vec<&dyn ToSql> = query.keys.iter().map(|k| k as &dyn ToSql).collect();
    params.push(&limit);

    let mut stmt = connection.prepare_cached(&query.sql)?;
    let rows = stmt.query_map(params.as_slice(), |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

impl ReadOps for SqliteImpl {
    fn get(&self, key: &[u8]) -> storage_core::Result<Option<Data>> {
        self.with_reader(|connection| {
            let mut stmt = connection.prepare_cached(queries::GET)?;
            stmt.query_row([key], |row| row.get(0)).optional()
        })
    }

    fn range_iter(
        &self,
        range: KeyRange,
    ) -> storage_core::Result<impl Iterator<Item = storage_core::Result<(Data, Data)>> + '_> {
        self.ensure_open()?;
        RangeIter::new(self, range)
    }

    fn last_in_range(&self, range: KeyRange) -> storage_core::Result<Option<(Data, Data)>> {
        self.ensure_open()?;
        if range.is_empty() {
            return Ok(None);
        }
        self.with_reader(|connection| {
            Ok(query_range(connection, &range, Order::Descending, 1)?.pop())
        })
    }
}

impl WriteOps for SqliteImpl {
    fn apply_batch(&self, batch: WriteBatch) -> storage_core::Result<()> {
        self.ensure_open()?;
        let mut writer = lock(&self.writer)?;
        let connection = writer.as_mut().ok_or(Fatal::Closed)?;

        let (puts, dels) = batch.counts();
        let write = |connection: &mut Connection| -> rusqlite::Result<()> {
            let tx = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;
            {
                let mut put = tx.prepare_cached(queries::PUT)?;
                let mut del = tx.prepare_cached(queries::DELETE)?;
                for op in batch {
                    match op {
                        WriteOp::Put(key, val) => put.execute([key, val])?,
                        WriteOp::Del(key) => del.execute([key])?,
                    };
                }
            }
            // Dropping the transaction on error above rolls it back
            tx.commit()
        };

        write(connection).map_err(process_sqlite_error)?;
        log::trace!("Applied batch: {puts} puts, {dels} deletions");
        Ok(())
    }
}

impl backend::BackendImpl for SqliteImpl {
    fn close(&self) -> storage_core::Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        lock(&self.readers)?.clear();
        let writer = lock(&self.writer)?.take();
        if let Some(connection) = writer {
            connection.close().map_err(|(_, e)| process_sqlite_error(e))?;
        }
        log::info!("Closed SQLite database at {}", self.config.path.display());
        Ok(())
    }
}

impl Drop for SqliteImpl {
    fn drop(&mut self) {
        if let Err(e) = backend::BackendImpl::close(self) {
            log::warn!("Error closing SQLite database: {e}");
        }
    }
}

/// Paged iterator over a key range within a read transaction
struct RangeIter<'a> {
    db: &'a SqliteImpl,
    connection: Option<Connection>,
    /// The part of the range not fetched yet
    rest: Option<KeyRange>,
    page: VecDeque<(Data, Data)>,
}

impl<'a> RangeIter<'a> {
    fn new(db: &'a SqliteImpl, range: KeyRange) -> storage_core::Result<Self> {
        let mut iter = Self {
            db,
            connection: None,
            rest: None,
            page: VecDeque::new(),
        };
        if range.is_empty() {
            return Ok(iter);
        }

        let connection = db.take_reader()?;
        if let Err(e) = connection.execute_batch("BEGIN DEFERRED") {
            db.release_reader(connection);
            return Err(process_sqlite_error(e));
        }
        iter.connection = Some(connection);
        iter.rest = Some(range);

        // The read snapshot is taken by the first query
        iter.fetch_page()?;
        Ok(iter)
    }

    fn fetch_page(&mut self) -> storage_core::Result<()> {
        let (Some(connection), Some(range)) = (self.connection.as_ref(), self.rest.take()) else {
            return Ok(());
        };

        let page_size = self.db.config.iter_page_size;
        let rows = query_range(connection, &range, Order::Ascending, page_size)
            .map_err(process_sqlite_error)?;

        if rows.len() == page_size {
            if let Some((last_key, _)) = rows.last() {
                self.rest = Some(range.with_start(Bound::Excluded(last_key.clone())));
            }
        }
        self.page.extend(rows);

        if self.rest.is_none() {
            self.finish();
        }
        Ok(())
    }

    /// End the read transaction and give the connection back
    fn finish(&mut self) {
        self.rest = None;
        let Some(connection) = self.connection.take() else {
            return;
        };
        if connection.is_autocommit() {
            self.db.release_reader(connection);
            return;
        }
        match connection.execute_batch("ROLLBACK") {
            Ok(()) => self.db.release_reader(connection),
            Err(e) => log::warn!("Failed to end read transaction: {e}"),
        }
    }
}

impl Iterator for RangeIter<'_> {
    type Item = storage_core::Result<(Data, Data)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.page.is_empty() {
            if let Err(e) = self.fetch_page() {
                self.finish();
                return Some(Err(e));
            }
        }
        self.page.pop_front().map(Ok)
    }
}

impl Drop for RangeIter<'_> {
    fn drop(&mut self) {
        self.finish()
    }
}

#[cfg(test)]
mod tests;
