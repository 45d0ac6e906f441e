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

use std::ops::Bound;

use storage::{
    error::ConfigurationError,
    schema::{Column, Schema, Variable},
    serializer::{StringSerializer, U64Serializer},
    Accessor,
};
use storage_core::{
    backend::{Backend as _, BackendImpl as _, ReadOps as _, WriteOps as _},
    error::Fatal,
};
use test_utils::{assert_matches, test_dir::TestDir};

use super::*;

fn test_db() -> (TestDir, Sqlite) {
    let dir = TestDir::new("storage-sqlite-").unwrap();
    let sqlite = Sqlite::new(dir.file("database.sqlite"));
    (dir, sqlite)
}

fn put(store: &SqliteImpl, entries: &[(&[u8], &[u8])]) {
    let batch = entries.iter().map(|(k, v)| WriteOp::Put(k.to_vec(), v.to_vec())).collect();
    store.apply_batch(batch).unwrap();
}

fn collect(store: &SqliteImpl, range: KeyRange) -> Vec<(Data, Data)> {
    store.range_iter(range).unwrap().collect::<storage_core::Result<_>>().unwrap()
}

#[test]
fn db_reopen_after_commit() {
    let (_dir, sqlite) = test_db();

    {
        let store = sqlite.clone().open().unwrap();
        put(&store, &[(b"hello", b"world"), (b"foo", b"bar")]);
        store.close().unwrap();
    }

    let store = sqlite.open().unwrap();
    assert_eq!(store.get(b"hello"), Ok(Some(b"world".to_vec())));
    assert_eq!(collect(&store, KeyRange::full()).len(), 2);
}

#[test]
fn creates_parent_directories() {
    let dir = TestDir::new("storage-sqlite-").unwrap();
    let sqlite = Sqlite::new(dir.path().join("a").join("b").join("db.sqlite"));

    let store = sqlite.open().unwrap();
    put(&store, &[(b"k", b"v")]);
    assert!(store.path().exists());
}

#[test]
fn unsupported_layout_version() {
    let (dir, sqlite) = test_db();
    drop(sqlite.clone().open().unwrap());

    {
        let conn = Connection::open(dir.file("database.sqlite")).unwrap();
        conn.pragma_update(None, "user_version", 99).unwrap();
    }

    assert_matches!(
        sqlite.open().err(),
        Some(storage_core::Error::Fatal(Fatal::SchemaMismatch))
    );
}

#[test]
fn not_a_database() {
    let (dir, sqlite) = test_db();
    std::fs::write(dir.file("database.sqlite"), vec![0x5a; 4096]).unwrap();

    assert_matches!(
        sqlite.open().err(),
        Some(storage_core::Error::Fatal(Fatal::DatabaseCorrupted))
    );
}

#[test]
fn paged_iteration() {
    let (_dir, sqlite) = test_db();
    let store = sqlite.with_iter_page_size(2).open().unwrap();

    let entries: Vec<(Data, Data)> = (0u8..7).map(|i| (vec![1, i], vec![i])).collect();
    let batch = entries.iter().map(|(k, v)| WriteOp::Put(k.clone(), v.clone())).collect();
    store.apply_batch(batch).unwrap();

    assert_eq!(collect(&store, KeyRange::full()), entries);
    assert_eq!(collect(&store, KeyRange::inclusive(vec![1, 1], vec![1, 4])), entries[1..=4]);
    assert_eq!(
        collect(&store, KeyRange::new(Bound::Excluded(vec![1, 3]), Bound::Unbounded)),
        entries[4..]
    );
    // Page boundary falls exactly at the end of the range
    assert_eq!(collect(&store, KeyRange::inclusive(vec![1, 0], vec![1, 3])), entries[0..4]);
}

#[test]
fn paged_iteration_keeps_snapshot() {
    let (_dir, sqlite) = test_db();
    let store = sqlite.with_iter_page_size(2).open().unwrap();
    put(&store, &[(&[1], &[1]), (&[2], &[2]), (&[3], &[3]), (&[4], &[4])]);

    let mut iter = store.range_iter(KeyRange::full()).unwrap();
    assert_eq!(iter.next(), Some(Ok((vec![1], vec![1]))));

    // Modify entries in the part of the range not fetched yet
    let mut batch = WriteBatch::new();
    batch.del(vec![3]);
    batch.put(vec![4], vec![44]);
    batch.put(vec![5], vec![5]);
    store.apply_batch(batch).unwrap();

    let rest: Vec<_> = iter.map(Result::unwrap).collect();
    assert_eq!(rest, vec![(vec![2], vec![2]), (vec![3], vec![3]), (vec![4], vec![4])]);

    assert_eq!(
        collect(&store, KeyRange::full()),
        vec![(vec![1], vec![1]), (vec![2], vec![2]), (vec![4], vec![44]), (vec![5], vec![5])]
    );
}

#[test]
fn readers_are_pooled() {
    let (_dir, sqlite) = test_db();
    let store = sqlite.with_max_idle_readers(2).with_iter_page_size(1).open().unwrap();
    put(&store, &[(b"a", b"1"), (b"b", b"2")]);

    let idle = |store: &SqliteImpl| store.readers.lock().unwrap().len();

    assert_eq!(store.get(b"a"), Ok(Some(b"1".to_vec())));
    assert_eq!(idle(&store), 1);

    // Each iterator holds a connection until it has fetched all of its pages
    let iters: Vec<_> = (0..3).map(|_| store.range_iter(KeyRange::full()).unwrap()).collect();
    assert_eq!(idle(&store), 0);
    drop(iters);
    assert_eq!(idle(&store), 2);

    let mut iter = store.range_iter(KeyRange::full()).unwrap();
    assert_eq!(idle(&store), 1);
    assert_eq!(iter.next(), Some(Ok((b"a".to_vec(), b"1".to_vec()))));
    assert_eq!(iter.next(), Some(Ok((b"b".to_vec(), b"2".to_vec()))));
    assert_eq!(iter.next(), None);
    assert_eq!(idle(&store), 2);
}

#[test]
fn use_after_close() {
    let (_dir, sqlite) = test_db();
    let store = sqlite.open().unwrap();
    put(&store, &[(b"a", b"1")]);

    assert_eq!(store.close(), Ok(()));
    assert_eq!(store.close(), Ok(()));

    assert_eq!(store.get(b"a"), Err(Fatal::Closed.into()));
    assert_eq!(store.last_in_range(KeyRange::full()), Err(Fatal::Closed.into()));
    assert!(store.range_iter(KeyRange::full()).is_err());
    assert_eq!(store.apply_batch(WriteBatch::new()), Err(Fatal::Closed.into()));
}

const NAMES: Column<u64, String> = Column::new(1, "names", &U64Serializer, &StringSerializer);
const RENAMED: Column<u64, String> = Column::new(1, "aliases", &U64Serializer, &StringSerializer);
const HEIGHT: Variable<u64> = Variable::new(1, "height", &U64Serializer);

#[test]
fn accessor_persists_across_reopen() {
    let (_dir, sqlite) = test_db();
    let schema = Schema::new().with_column(&NAMES).with_variable(&HEIGHT);

    {
        let store = Accessor::open(sqlite.clone(), schema.clone()).unwrap();
        store
            .update(|tx| {
                tx.put(&NAMES, &7, &"seven".to_owned())?;
                tx.put_variable(&HEIGHT, &7)
            })
            .unwrap();
        store.close().unwrap();
    }

    let store = Accessor::open(sqlite, schema).unwrap();
    assert_eq!(store.get(&NAMES, &7), Ok(Some("seven".to_owned())));
    assert_eq!(store.get_variable(&HEIGHT), Ok(Some(7)));
}

#[test]
fn accessor_detects_renamed_column() {
    let (_dir, sqlite) = test_db();

    drop(Accessor::open(sqlite.clone(), Schema::new().with_column(&NAMES)).unwrap());

    let result = Accessor::open(sqlite, Schema::new().with_column(&RENAMED));
    assert_matches!(
        result.err(),
        Some(storage::Error::Configuration(ConfigurationError::SchemaMismatch { .. }))
    );
}
