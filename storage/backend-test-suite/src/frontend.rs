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

// Tests exercising the typed accessor on top of each backend

use std::{sync::mpsc, time::Duration};

use storage::{
    error::{ConfigurationError, UsageError},
    schema::{Column, Schema, Variable},
    serializer::{I32Serializer, U64Serializer},
    Accessor, ColumnEntry, Error, TransactionState,
};
use test_utils::random::{make_seedable_rng, Rng, Seed};

use crate::prelude::*;

const VARIABLE_1: Variable<i32> = Variable::new(0, "variable-1", &I32Serializer);
const VARIABLE_2: Variable<i32> = Variable::new(1, "variable-2", &I32Serializer);
const VARIABLE_3: Variable<u64> = Variable::new(2, "variable-3", &U64Serializer);

const COLUMN_1: Column<i32, i32> = Column::new(1, "column-1", &I32Serializer, &I32Serializer);
const COLUMN_2: Column<i32, i32> = Column::new(2, "column-2", &I32Serializer, &I32Serializer);
const COLUMN_3: Column<i32, i32> = Column::new(3, "column-3", &I32Serializer, &I32Serializer);
const COLUMN_4: Column<u64, u64> = Column::new(4, "column-4", &U64Serializer, &U64Serializer);

fn schema() -> Schema {
    Schema::new()
        .with_column(&COLUMN_1)
        .with_column(&COLUMN_2)
        .with_column(&COLUMN_3)
        .with_column(&COLUMN_4)
        .with_variable(&VARIABLE_1)
        .with_variable(&VARIABLE_2)
        .with_variable(&VARIABLE_3)
}

fn open_store<B: Backend, F: BackendFn<B>>(backend_fn: &F) -> Accessor<B> {
    Accessor::open(backend_fn(), schema()).expect("accessor open to succeed")
}

fn update<B: Backend>(store: &Accessor<B>, f: impl FnOnce(&mut storage::Transaction<'_, B>)) {
    store
        .update(|tx| -> storage::Result<()> {
            f(tx);
            Ok(())
        })
        .expect("update to succeed")
}

fn stream<B: Backend, K, V>(
    store: &Accessor<B>,
    column: &Column<K, V>,
    from: K,
    to: K,
) -> Vec<ColumnEntry<K, V>> {
    store
        .stream(column, &from, &to)
        .expect("stream to start")
        .collect::<storage::Result<_>>()
        .expect("stream to succeed")
}

fn entries(range: impl IntoIterator<Item = i32>) -> Vec<ColumnEntry<i32, i32>> {
    range.into_iter().map(|i| ColumnEntry::new(i, i)).collect()
}

// A random u64 with the top bit clear along with its big-endian encoding
fn random_u64_bytes(rng: &mut impl Rng) -> (u64, Data) {
    let value = rng.gen::<u64>() & 0x7fff_ffff_ffff_ffff;
    (value, value.to_be_bytes().to_vec())
}

fn store_and_load_simple_key<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);

    let mut tx = store.start_transaction().unwrap();
    tx.put(&COLUMN_1, &0, &0).unwrap();
    tx.put(&COLUMN_1, &1, &1).unwrap();
    tx.put(&COLUMN_2, &1, &2).unwrap();
    tx.put(&COLUMN_3, &0, &3).unwrap();
    tx.commit().unwrap();
    drop(tx);

    assert_eq!(store.get(&COLUMN_1, &0), Ok(Some(0)));
    assert_eq!(store.get(&COLUMN_1, &1), Ok(Some(1)));
    assert_eq!(store.get(&COLUMN_1, &2), Ok(None));

    assert_eq!(store.get(&COLUMN_2, &0), Ok(None));
    assert_eq!(store.get(&COLUMN_2, &1), Ok(Some(2)));

    assert_eq!(store.get(&COLUMN_3, &0), Ok(Some(3)));
    assert_eq!(store.get(&COLUMN_3, &1), Ok(None));
}

fn store_and_load_variables<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    assert_eq!(store.get_variable(&VARIABLE_1), Ok(None));
    assert_eq!(store.get_variable(&VARIABLE_2), Ok(None));

    update(&store, |tx| {
        tx.put_variable(&VARIABLE_1, &0).unwrap();
        tx.put_variable(&VARIABLE_2, &1).unwrap();
    });

    assert_eq!(store.get_variable(&VARIABLE_1), Ok(Some(0)));
    assert_eq!(store.get_variable(&VARIABLE_2), Ok(Some(1)));
    assert_eq!(store.get_variable(&VARIABLE_3), Ok(None));

    update(&store, |tx| tx.delete_variable(&VARIABLE_1).unwrap());
    assert_eq!(store.get_variable(&VARIABLE_1), Ok(None));
    assert_eq!(store.get_variable(&VARIABLE_2), Ok(Some(1)));
}

fn stream_from_middle_of_range<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    update(&store, |tx| (0..10).for_each(|i| tx.put(&COLUMN_1, &i, &i).unwrap()));

    assert_eq!(stream(&store, &COLUMN_1, 2, 8), entries(2..=8));
    assert_eq!(stream(&store, &COLUMN_1, 0, 9), entries(0..=9));
    assert_eq!(stream(&store, &COLUMN_1, 4, 4), entries([4]));
}

fn stream_bounds_beyond_stored_keys<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    update(&store, |tx| (2..8).for_each(|i| tx.put(&COLUMN_1, &i, &i).unwrap()));

    assert_eq!(stream(&store, &COLUMN_1, 0, 10), entries(2..8));
    assert!(stream(&store, &COLUMN_1, 8, 100).is_empty());
}

fn stream_middle_column<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    update(&store, |tx| {
        tx.put(&COLUMN_1, &5, &5).unwrap();
        tx.put(&COLUMN_1, &6, &6).unwrap();
        (2..8).for_each(|i| tx.put(&COLUMN_2, &i, &i).unwrap());
        tx.put(&COLUMN_3, &0, &0).unwrap();
        tx.put(&COLUMN_3, &8, &8).unwrap();
        tx.put_variable(&VARIABLE_1, &6).unwrap();
        tx.put_variable(&VARIABLE_2, &7).unwrap();
    });

    assert_eq!(stream(&store, &COLUMN_2, 0, 10), entries(2..8));

    let all: Vec<_> = store.stream_all(&COLUMN_3).unwrap().map(Result::unwrap).collect();
    assert_eq!(all, entries([0, 8]));
}

fn stream_empty_when_bounds_reversed<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    update(&store, |tx| (0..10).for_each(|i| tx.put(&COLUMN_1, &i, &i).unwrap()));

    assert!(stream(&store, &COLUMN_1, 8, 2).is_empty());
    assert_eq!(store.stream_keys(&COLUMN_1, &8, &2).unwrap().count(), 0);
}

fn stream_compares_keys_unsigned<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    update(&store, |tx| (499u64..=655).for_each(|i| tx.put(&COLUMN_4, &i, &i).unwrap()));

    // 500 and 650 differ in the sign bit of their low byte
    let keys: Vec<u64> = stream(&store, &COLUMN_4, 500, 650)
        .into_iter()
        .map(ColumnEntry::into_key)
        .collect();
    assert_eq!(keys, (500..=650).collect::<Vec<u64>>());
}

fn stream_across_top_bit<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    const BASE: u64 = 1 << 63;
    let store = open_store(&*backend_fn);
    update(&store, |tx| {
        for i in (BASE - 5..BASE + 5).chain([499, u64::MAX]) {
            tx.put(&COLUMN_4, &i, &i).unwrap();
        }
    });

    let keys: Vec<u64> = stream(&store, &COLUMN_4, BASE - 3, BASE + 2)
        .into_iter()
        .map(ColumnEntry::into_key)
        .collect();
    assert_eq!(keys, (BASE - 3..=BASE + 2).collect::<Vec<u64>>());

    let keys: Vec<u64> = stream(&store, &COLUMN_4, 0, u64::MAX)
        .into_iter()
        .map(ColumnEntry::into_key)
        .collect();
    let mut expected: Vec<u64> = (BASE - 5..BASE + 5).collect();
    expected.insert(0, 499);
    expected.push(u64::MAX);
    assert_eq!(keys, expected);

    let floor = |key: u64| store.get_floor_entry(&COLUMN_4, &key).unwrap().map(|e| e.into_key());
    assert_eq!(floor(BASE), Some(BASE));
    assert_eq!(floor(BASE - 6), Some(499));
    assert_eq!(floor(BASE + 100), Some(BASE + 4));
    assert_eq!(floor(u64::MAX), Some(u64::MAX));
    assert_eq!(floor(498), None);
}

fn stream_keys_only<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    update(&store, |tx| (0..10).for_each(|i| tx.put(&COLUMN_1, &i, &(i * 10)).unwrap()));

    let keys = store.stream_keys(&COLUMN_1, &3, &6).unwrap().collect::<storage::Result<Vec<_>>>();
    assert_eq!(keys, Ok(vec![3, 4, 5, 6]));
}

fn put_raw_variable<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let mut rng = make_seedable_rng(Seed::from_entropy());
    let store = open_store(&*backend_fn);
    let (value, bytes) = random_u64_bytes(&mut rng);

    update(&store, |tx| tx.put_variable_raw(&VARIABLE_3, bytes.clone()).unwrap());

    assert_eq!(store.get_variable(&VARIABLE_3), Ok(Some(value)));
    assert_eq!(store.get_variable_raw(&VARIABLE_3), Ok(Some(bytes)));
}

fn put_raw_column_entry<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let mut rng = make_seedable_rng(Seed::from_entropy());
    let store = open_store(&*backend_fn);
    let (key, key_bytes) = random_u64_bytes(&mut rng);
    let (value, value_bytes) = random_u64_bytes(&mut rng);

    update(&store, |tx| tx.put_raw(&COLUMN_4, &key_bytes, value_bytes.clone()).unwrap());

    assert_eq!(store.get(&COLUMN_4, &key), Ok(Some(value)));
    assert_eq!(store.get_raw(&COLUMN_4, &key), Ok(Some(value_bytes)));
}

fn stream_raw_bytes<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let mut rng = make_seedable_rng(Seed::from_entropy());
    let store = open_store(&*backend_fn);
    let (value, bytes) = random_u64_bytes(&mut rng);

    update(&store, |tx| tx.put(&COLUMN_4, &0, &value).unwrap());
    assert_eq!(store.get(&COLUMN_4, &0), Ok(Some(value)));

    let raw = store.stream_raw(&COLUMN_4).unwrap().collect::<storage::Result<Vec<_>>>();
    assert_eq!(raw, Ok(vec![ColumnEntry::new(vec![0u8; 8], bytes)]));
}

fn floor_entry<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    update(&store, |tx| (1..=4).for_each(|i| tx.put(&COLUMN_1, &i, &i).unwrap()));

    // Exact match
    assert_eq!(store.get_floor_entry(&COLUMN_1, &3), Ok(Some(ColumnEntry::new(3, 3))));

    update(&store, |tx| {
        tx.delete(&COLUMN_1, &2).unwrap();
        tx.delete(&COLUMN_1, &3).unwrap();
    });

    // Closest prior entry
    assert_eq!(store.get_floor_entry(&COLUMN_1, &3), Ok(Some(ColumnEntry::new(1, 1))));
    // Past the last entry
    assert_eq!(store.get_floor_entry(&COLUMN_1, &5), Ok(Some(ColumnEntry::new(4, 4))));
    assert_eq!(store.get_floor_entry(&COLUMN_1, &0), Ok(None));
}

fn floor_entry_stays_in_column<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    update(&store, |tx| {
        tx.put(&COLUMN_1, &1, &1).unwrap();
        tx.put(&COLUMN_1, &4, &4).unwrap();
        tx.put(&COLUMN_2, &3, &3).unwrap();
        tx.put(&COLUMN_2, &4, &4).unwrap();
        tx.put(&COLUMN_3, &9, &9).unwrap();
    });

    assert_eq!(store.get_floor_entry(&COLUMN_2, &2), Ok(None));
    assert_eq!(store.get_floor_entry(&COLUMN_1, &5), Ok(Some(ColumnEntry::new(4, 4))));
    assert_eq!(store.get_floor_entry(&COLUMN_2, &100), Ok(Some(ColumnEntry::new(4, 4))));
    assert_eq!(store.get_floor_entry(&COLUMN_3, &8), Ok(None));
}

fn first_and_last_entry<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    assert_eq!(store.get_first_entry(&COLUMN_2), Ok(None));
    assert_eq!(store.get_last_entry(&COLUMN_2), Ok(None));

    update(&store, |tx| {
        tx.put(&COLUMN_1, &0, &0).unwrap();
        [3, 7, 5].into_iter().for_each(|i| tx.put(&COLUMN_2, &i, &i).unwrap());
        tx.put(&COLUMN_3, &9, &9).unwrap();
    });

    assert_eq!(store.get_first_entry(&COLUMN_2), Ok(Some(ColumnEntry::new(3, 3))));
    assert_eq!(store.get_last_entry(&COLUMN_2), Ok(Some(ColumnEntry::new(7, 7))));
}

fn uncommitted_writes_are_invisible<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);

    let mut tx = store.start_transaction().unwrap();
    tx.put(&COLUMN_1, &1, &1).unwrap();
    tx.put_variable(&VARIABLE_1, &5).unwrap();
    assert_eq!(tx.pending_writes(), 2);
    assert_eq!(store.get(&COLUMN_1, &1), Ok(None));
    assert_eq!(store.get_variable(&VARIABLE_1), Ok(None));

    tx.close();
    assert_eq!(tx.state(), TransactionState::Discarded);
    drop(tx);

    // Dropping without commit also discards
    {
        let mut tx = store.start_transaction().unwrap();
        tx.put(&COLUMN_1, &2, &2).unwrap();
    }

    assert_eq!(store.get(&COLUMN_1, &1), Ok(None));
    assert_eq!(store.get(&COLUMN_1, &2), Ok(None));
    assert_eq!(store.get_variable(&VARIABLE_1), Ok(None));
}

fn last_write_in_transaction_wins<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    update(&store, |tx| {
        tx.put(&COLUMN_1, &1, &1).unwrap();
        tx.put(&COLUMN_1, &1, &2).unwrap();
        tx.put(&COLUMN_1, &2, &2).unwrap();
        tx.delete(&COLUMN_1, &2).unwrap();
        tx.delete(&COLUMN_1, &3).unwrap();
        tx.put(&COLUMN_1, &3, &3).unwrap();
    });

    let expected = vec![ColumnEntry::new(1, 2), ColumnEntry::new(3, 3)];
    assert_eq!(stream(&store, &COLUMN_1, 0, 10), expected);
}

fn finished_transaction_rejects_use<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);

    let mut tx = store.start_transaction().unwrap();
    tx.put(&COLUMN_1, &1, &1).unwrap();
    tx.commit().unwrap();
    assert_eq!(tx.state(), TransactionState::Committed);

    let not_open = Err(Error::Usage(UsageError::TransactionNotOpen));
    assert_eq!(tx.commit(), not_open);
    assert_eq!(tx.put(&COLUMN_1, &2, &2), not_open);

    // Closing a committed transaction keeps it committed
    tx.close();
    tx.close();
    assert_eq!(tx.state(), TransactionState::Committed);
    drop(tx);

    let mut tx = store.start_transaction().unwrap();
    tx.put(&COLUMN_1, &3, &3).unwrap();
    tx.close();
    assert_eq!(tx.commit(), not_open);
    assert_eq!(tx.put_variable(&VARIABLE_1, &1), not_open);
    drop(tx);

    assert_eq!(stream(&store, &COLUMN_1, 0, 10), entries([1]));
}

fn writer_busy_while_transaction_open<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);

    let mut tx = store.try_start_transaction().unwrap();
    assert_eq!(
        store.try_start_transaction().err(),
        Some(Error::Usage(UsageError::WriterBusy))
    );

    // Reads are not blocked by the writer
    assert_eq!(store.get(&COLUMN_1, &1), Ok(None));

    tx.put(&COLUMN_1, &1, &1).unwrap();
    tx.commit().unwrap();

    // The writer is released by the commit even before the transaction is dropped
    let tx2 = store.try_start_transaction().unwrap();
    drop(tx2);
    drop(tx);
}

fn start_transaction_waits_for_writer<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    let (sender, receiver) = mpsc::channel();

    let mut tx = store.start_transaction().unwrap();
    tx.put(&COLUMN_1, &1, &1).unwrap();

    thread::scope(|s| {
        let store = &store;
        s.spawn(move || {
            let mut tx = store.start_transaction().unwrap();
            // The first transaction is already committed once we get here
            assert_eq!(store.get(&COLUMN_1, &1), Ok(Some(1)));
            tx.put(&COLUMN_1, &1, &2).unwrap();
            tx.commit().unwrap();
            sender.send(()).unwrap();
        });

        thread::sleep(Duration::from_millis(50));
        assert!(receiver.try_recv().is_err());
        tx.commit().unwrap();
    });

    assert_eq!(receiver.try_recv(), Ok(()));
    assert_eq!(store.get(&COLUMN_1, &1), Ok(Some(2)));
}

fn stream_is_isolated_from_commits<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    update(&store, |tx| (0..6).for_each(|i| tx.put(&COLUMN_1, &i, &i).unwrap()));

    let mut iter = store.stream(&COLUMN_1, &0, &10).unwrap();
    assert_eq!(iter.next(), Some(Ok(ColumnEntry::new(0, 0))));

    update(&store, |tx| {
        tx.delete(&COLUMN_1, &3).unwrap();
        tx.put(&COLUMN_1, &4, &40).unwrap();
        tx.put(&COLUMN_1, &8, &8).unwrap();
    });

    let rest: Vec<_> = iter.map(Result::unwrap).collect();
    assert_eq!(rest, entries(1..6));

    let mut expected = entries([0, 1, 2, 5, 8]);
    expected.insert(3, ColumnEntry::new(4, 40));
    assert_eq!(stream(&store, &COLUMN_1, 0, 10), expected);
}

fn undeclared_column_is_rejected<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    const UNDECLARED: Column<i32, i32> =
        Column::new(5, "undeclared", &I32Serializer, &I32Serializer);
    const RENAMED: Column<i32, i32> = Column::new(1, "renamed", &I32Serializer, &I32Serializer);
    const UNDECLARED_VAR: Variable<i32> = Variable::new(7, "undeclared", &I32Serializer);

    let store = open_store(&*backend_fn);

    let unknown = |id: u8, name: &str| {
        Error::Configuration(ConfigurationError::UnknownColumn {
            id,
            name: name.to_owned(),
        })
    };

    assert_eq!(store.get(&UNDECLARED, &1), Err(unknown(5, "undeclared")));
    assert_eq!(store.get_floor_entry(&RENAMED, &1), Err(unknown(1, "renamed")));
    assert_eq!(store.stream_raw(&UNDECLARED).err(), Some(unknown(5, "undeclared")));
    assert_eq!(
        store.get_variable(&UNDECLARED_VAR),
        Err(Error::Configuration(ConfigurationError::UnknownVariable {
            id: 7,
            name: "undeclared".to_owned(),
        }))
    );

    let mut tx = store.start_transaction().unwrap();
    assert_eq!(tx.put(&UNDECLARED, &1, &1), Err(unknown(5, "undeclared")));
    assert_eq!(tx.pending_writes(), 0);
}

fn duplicate_ids_fail_open<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    const DUPLICATE: Column<u64, u64> = Column::new(2, "dup", &U64Serializer, &U64Serializer);

    let result = Accessor::open(backend_fn(), schema().with_column(&DUPLICATE));
    assert_eq!(
        result.err(),
        Some(Error::Configuration(ConfigurationError::DuplicateColumnId(2)))
    );
}

fn closed_accessor_rejects_use<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    update(&store, |tx| tx.put(&COLUMN_1, &1, &1).unwrap());

    let mut tx = store.start_transaction().unwrap();
    tx.put(&COLUMN_1, &2, &2).unwrap();

    assert!(!store.is_closed());
    assert_eq!(store.close(), Ok(()));
    assert_eq!(store.close(), Ok(()));
    assert!(store.is_closed());

    let closed = Error::Usage(UsageError::AccessorClosed);
    assert_eq!(tx.commit(), Err(closed.clone()));
    assert_eq!(tx.state(), TransactionState::Committed);
    drop(tx);

    assert_eq!(store.get(&COLUMN_1, &1), Err(closed.clone()));
    assert_eq!(store.get_variable(&VARIABLE_1), Err(closed.clone()));
    assert_eq!(store.get_floor_entry(&COLUMN_1, &1), Err(closed.clone()));
    assert_eq!(store.stream_all(&COLUMN_1).err(), Some(closed.clone()));
    assert_eq!(store.start_transaction().err(), Some(closed.clone()));
    assert_eq!(store.dump_raw(), Err(closed));
}

#[derive(Debug, PartialEq)]
enum UpdateError {
    Storage(Error),
    Rejected,
}

impl From<Error> for UpdateError {
    fn from(e: Error) -> Self {
        Self::Storage(e)
    }
}

fn update_commits_only_on_success<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);

    let result = store.update(|tx| {
        tx.put(&COLUMN_1, &1, &1)?;
        Ok::<_, Error>(tx.pending_writes())
    });
    assert_eq!(result, Ok(1));

    let result = store.update(|tx| {
        tx.put(&COLUMN_1, &2, &2)?;
        Err::<(), _>(UpdateError::Rejected)
    });
    assert_eq!(result, Err(UpdateError::Rejected));

    assert_eq!(stream(&store, &COLUMN_1, 0, 10), entries([1]));
}

fn dump_contents<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open_store(&*backend_fn);
    update(&store, |tx| {
        tx.put(&COLUMN_1, &1, &2).unwrap();
        tx.put(&COLUMN_4, &3, &4).unwrap();
        tx.put_variable(&VARIABLE_2, &5).unwrap();
    });

    let dump = store.dump_raw().unwrap();
    assert_eq!(dump.columns().len(), 4);
    assert_eq!(dump.column("column-1").map(|c| c.len()), Some(1));
    assert_eq!(dump.column("column-2").map(|c| c.len()), Some(0));

    let column_4 = dump.column("column-4").unwrap();
    assert_eq!(column_4.get(&3u64.to_be_bytes()[..]), Some(&4u64.to_be_bytes().to_vec()));

    assert_eq!(dump.variables().len(), 1);
    let expected = VARIABLE_2.serializer().serialize(&5);
    assert_eq!(dump.variable("variable-2"), Some(&expected));
}

tests![
    closed_accessor_rejects_use,
    dump_contents,
    duplicate_ids_fail_open,
    finished_transaction_rejects_use,
    first_and_last_entry,
    floor_entry,
    floor_entry_stays_in_column,
    last_write_in_transaction_wins,
    put_raw_column_entry,
    put_raw_variable,
    start_transaction_waits_for_writer,
    store_and_load_simple_key,
    store_and_load_variables,
    stream_bounds_beyond_stored_keys,
    stream_across_top_bit,
    stream_compares_keys_unsigned,
    stream_empty_when_bounds_reversed,
    stream_from_middle_of_range,
    stream_is_isolated_from_commits,
    stream_keys_only,
    stream_middle_column,
    stream_raw_bytes,
    undeclared_column_is_rejected,
    uncommitted_writes_are_invisible,
    update_commits_only_on_success,
    writer_busy_while_transaction_open,
];
