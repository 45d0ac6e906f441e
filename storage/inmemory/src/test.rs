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

use super::*;
use storage_core::backend::{Backend, BackendImpl, ReadOps, WriteOps};

fn batch(ops: impl IntoIterator<Item = WriteOp>) -> WriteBatch {
    ops.into_iter().collect()
}

#[test]
fn snapshot_survives_commit() {
    let store = InMemory::new().open().unwrap();
    store
        .apply_batch(batch([
            WriteOp::Put(b"a".to_vec(), b"1".to_vec()),
            WriteOp::Put(b"b".to_vec(), b"2".to_vec()),
        ]))
        .unwrap();

    let mut iter = store.range_iter(KeyRange::full()).unwrap();
    assert_eq!(iter.next(), Some(Ok((b"a".to_vec(), b"1".to_vec()))));

    store
        .apply_batch(batch([
            WriteOp::Del(b"b".to_vec()),
            WriteOp::Put(b"c".to_vec(), b"3".to_vec()),
        ]))
        .unwrap();

    // The iterator keeps seeing the state from before the second batch
    assert_eq!(iter.next(), Some(Ok((b"b".to_vec(), b"2".to_vec()))));
    assert_eq!(iter.next(), None);

    // A fresh iterator sees the new state
    let keys: Vec<_> = store.range_iter(KeyRange::full()).unwrap().map(|e| e.unwrap().0).collect();
    assert_eq!(keys, vec![b"a".to_vec(), b"c".to_vec()]);
}

#[test]
fn close_is_idempotent() {
    let store = InMemory::new().open().unwrap();
    store.apply_batch(batch([WriteOp::Put(vec![1], vec![1])])).unwrap();

    assert_eq!(store.close(), Ok(()));
    assert_eq!(store.close(), Ok(()));

    assert_eq!(store.get(&[1]), Err(Fatal::Closed.into()));
    assert_eq!(
        store.apply_batch(batch([WriteOp::Del(vec![1])])),
        Err(Fatal::Closed.into())
    );
}

#[test]
fn last_in_range_stays_within_bounds() {
    let store = InMemory::new().open().unwrap();
    store
        .apply_batch(batch([
            WriteOp::Put(vec![1, 1], vec![1]),
            WriteOp::Put(vec![1, 5], vec![5]),
            WriteOp::Put(vec![2, 0], vec![20]),
        ]))
        .unwrap();

    let last = store.last_in_range(KeyRange::inclusive(vec![1], vec![1, 4])).unwrap();
    assert_eq!(last, Some((vec![1, 1], vec![1])));
    let last = store.last_in_range(KeyRange::prefix(vec![1])).unwrap();
    assert_eq!(last, Some((vec![1, 5], vec![5])));
    assert_eq!(store.last_in_range(KeyRange::prefix(vec![3])), Ok(None));
}
