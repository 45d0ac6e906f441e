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

use rstest::rstest;
use storage_core::error::{Fatal, Recoverable};
use storage_failing::{FailOp, Failing, FailureConfig};
use storage_inmemory::InMemory;
use test_utils::random::Seed;

use crate::{
    error::{ConfigurationError, SerializationError, UsageError},
    schema::{Column, Schema, Variable},
    serializer::{BytesSerializer, StringSerializer, U16Serializer, U32Serializer},
    Accessor, ColumnEntry, Error, TransactionState,
};

const NUMBERS: Column<u32, String> = Column::new(1, "numbers", &U32Serializer, &StringSerializer);
const BLOBS: Column<u32, Vec<u8>> = Column::new(2, "blobs", &U32Serializer, &BytesSerializer);
const COUNTER: Variable<u32> = Variable::new(1, "counter", &U32Serializer);

// Same column with a narrower key type, to read back entries written through NUMBERS
const SHORT_KEYS: Column<u16, String> =
    Column::new(1, "numbers", &U16Serializer, &StringSerializer);

fn schema() -> Schema {
    Schema::new().with_column(&NUMBERS).with_column(&BLOBS).with_variable(&COUNTER)
}

fn populated<B: storage_core::Backend>(backend: B) -> Accessor<B> {
    let store = Accessor::open(backend, schema()).unwrap();
    store
        .update(|tx| {
            for i in 0..5u32 {
                tx.put(&NUMBERS, &i, &i.to_string())?;
            }
            tx.put_variable(&COUNTER, &5)
        })
        .unwrap();
    store
}

#[rstest]
fn failed_commit_leaves_store_unchanged(#[values(Seed::from_entropy())] seed: Seed) {
    let backend = Failing::new(
        InMemory::new(),
        FailureConfig::new(FailOp::ApplyBatch, 1.0, seed.0).disarmed(),
    );
    let control = backend.control();
    let store = populated(backend);
    let before = store.dump_raw().unwrap();

    control.arm();
    let mut tx = store.start_transaction().unwrap();
    tx.put(&NUMBERS, &7, &"seven".to_string()).unwrap();
    tx.delete(&NUMBERS, &0).unwrap();
    tx.put_variable(&COUNTER, &6).unwrap();

    let result = tx.commit();
    assert_eq!(
        result,
        Err(Error::Storage(Recoverable::TemporarilyUnavailable.into()))
    );
    assert!(result.unwrap_err().is_recoverable());
    assert_eq!(tx.state(), TransactionState::Committed);
    assert_eq!(tx.commit(), Err(UsageError::TransactionNotOpen.into()));
    drop(tx);

    control.disarm();
    assert_eq!(control.injected(), 1);
    assert_eq!(store.dump_raw(), Ok(before));
    assert_eq!(store.get_variable(&COUNTER), Ok(Some(5)));

    // The writer has been released by the failed commit
    let mut tx = store.try_start_transaction().unwrap();
    tx.put_variable(&COUNTER, &6).unwrap();
    tx.commit().unwrap();
    drop(tx);
    assert_eq!(store.get_variable(&COUNTER), Ok(Some(6)));
}

#[rstest]
fn read_faults_are_propagated(#[values(Seed::from_entropy())] seed: Seed) {
    let ops = FailOp::Get | FailOp::IterStart | FailOp::LastInRange;
    let config = FailureConfig::new(ops, 1.0, seed.0)
        .with_error(Fatal::DatabaseCorrupted)
        .disarmed();
    let backend = Failing::new(InMemory::new(), config);
    let control = backend.control();
    let store = populated(backend);

    control.arm();
    let fault = Error::Storage(Fatal::DatabaseCorrupted.into());
    assert_eq!(store.get(&NUMBERS, &1), Err(fault.clone()));
    assert_eq!(store.get_variable(&COUNTER), Err(fault.clone()));
    assert_eq!(store.stream_all(&NUMBERS).err(), Some(fault.clone()));
    assert_eq!(store.get_floor_entry(&NUMBERS, &3), Err(fault.clone()));
    assert!(!fault.is_recoverable());

    control.disarm();
    assert_eq!(store.get(&NUMBERS, &1), Ok(Some("1".to_string())));
}

#[rstest]
fn iteration_faults_end_up_in_the_stream(#[values(Seed::from_entropy())] seed: Seed) {
    let config = FailureConfig::new(FailOp::IterStep, 1.0, seed.0).disarmed();
    let backend = Failing::new(InMemory::new(), config);
    let control = backend.control();
    let store = populated(backend);

    control.arm();
    let mut stream = store.stream(&NUMBERS, &0, &10).unwrap();
    assert_eq!(
        stream.next(),
        Some(Err(Error::Storage(Recoverable::TemporarilyUnavailable.into())))
    );
}

#[test]
fn undecodable_entries_are_reported() {
    let store = populated(InMemory::new());
    store.update(|tx| tx.put_raw(&NUMBERS, &[0, 0, 0, 9], vec![0xff, 0xfe])).unwrap();

    let bad_value = store.get(&NUMBERS, &9).unwrap_err();
    assert!(matches!(
        bad_value,
        Error::Serialization(SerializationError::InvalidUtf8(_))
    ));
    assert!(!bad_value.is_recoverable());
    // The raw bytes are still accessible
    assert_eq!(store.get_raw(&NUMBERS, &9), Ok(Some(vec![0xff, 0xfe])));

    // Keys written as u32 read through a u16 key serializer
    assert_eq!(
        store.get_first_entry(&SHORT_KEYS),
        Err(Error::Serialization(SerializationError::InvalidLength {
            expected: 2,
            actual: 4,
        }))
    );

    let mut entries = store.stream(&NUMBERS, &8, &10).unwrap();
    assert!(matches!(entries.next(), Some(Err(Error::Serialization(_)))));
    assert!(entries.next().is_none());
}

#[test]
fn duplicate_ids_are_rejected() {
    const SECOND: Column<u32, Vec<u8>> =
        Column::new(1, "second", &U32Serializer, &BytesSerializer);
    const COUNTER_AGAIN: Variable<u32> = Variable::new(1, "again", &U32Serializer);

    let result = Accessor::open(InMemory::new(), schema().with_column(&SECOND));
    assert_eq!(
        result.err(),
        Some(ConfigurationError::DuplicateColumnId(1).into())
    );

    let result = Accessor::open(InMemory::new(), schema().with_variable(&COUNTER_AGAIN));
    assert_eq!(
        result.err(),
        Some(ConfigurationError::DuplicateVariableId(1).into())
    );

    // Columns and variables have separate id spaces
    assert!(Accessor::open(InMemory::new(), schema()).is_ok());
}

#[test]
fn failed_open_reports_backend_error() {
    let config = FailureConfig::new(FailOp::Get, 1.0, 0).with_error(Fatal::DatabaseCorrupted);
    let result = Accessor::open(Failing::new(InMemory::new(), config), schema());
    assert_eq!(result.err(), Some(Fatal::DatabaseCorrupted.into()));
}

#[test]
fn writer_is_exclusive() {
    let store = populated(InMemory::new());

    let tx = store.try_start_transaction().unwrap();
    assert_eq!(
        store.try_start_transaction().err(),
        Some(UsageError::WriterBusy.into())
    );
    assert!(Error::from(UsageError::WriterBusy).is_recoverable());
    drop(tx);

    let mut tx = store.try_start_transaction().unwrap();
    tx.close();
    assert_eq!(tx.state(), TransactionState::Discarded);
    let tx2 = store.try_start_transaction().unwrap();
    drop(tx2);
}

#[test]
fn empty_transaction_commits() {
    let store = populated(InMemory::new());
    let before = store.dump_raw().unwrap();

    let mut tx = store.start_transaction().unwrap();
    assert_eq!(tx.pending_writes(), 0);
    assert_eq!(tx.commit(), Ok(()));
    drop(tx);

    assert_eq!(store.dump_raw(), Ok(before));
}

#[test]
fn closed_accessor() {
    let store = populated(InMemory::new());
    store.close().unwrap();

    let closed = Error::Usage(UsageError::AccessorClosed);
    assert_eq!(store.get(&NUMBERS, &1), Err(closed.clone()));
    assert_eq!(store.stream_raw(&NUMBERS).err(), Some(closed.clone()));
    assert_eq!(store.get_last_entry(&NUMBERS), Err(closed.clone()));
    assert_eq!(store.try_start_transaction().err(), Some(closed));
    assert_eq!(store.close(), Ok(()));
}

#[test]
fn entries_come_back_in_key_order() {
    let store = Accessor::open(InMemory::new(), schema()).unwrap();
    store
        .update(|tx| {
            for i in [300u32, 2, 70_000, 1, 256] {
                tx.put(&NUMBERS, &i, &i.to_string())?;
            }
            Ok::<_, Error>(())
        })
        .unwrap();

    let keys = store.stream_keys(&NUMBERS, &0, &u32::MAX).unwrap();
    assert_eq!(
        keys.collect::<crate::Result<Vec<_>>>(),
        Ok(vec![1, 2, 256, 300, 70_000])
    );
    assert_eq!(
        store.get_last_entry(&NUMBERS),
        Ok(Some(ColumnEntry::new(70_000, "70000".to_string())))
    );
    assert_eq!(
        store.get_floor_entry(&NUMBERS, &299),
        Ok(Some(ColumnEntry::new(256, "256".to_string())))
    );
}
