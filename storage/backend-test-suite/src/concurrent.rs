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

//! Tests exercising the backend from multiple threads and interleaved iterators

use crate::prelude::*;

fn iterator_ignores_later_writes<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);
    put_all(&store, [(&[0x01, 1][..], &[1][..]), (&[0x01, 3][..], &[3][..])]);

    let mut iter = store.range_iter(KeyRange::prefix(vec![0x01])).unwrap();
    assert_eq!(iter.next(), Some(Ok((vec![0x01, 1], vec![1]))));

    let mut batch = WriteBatch::new();
    batch.put(vec![0x01, 2], vec![2]);
    batch.put(vec![0x01, 4], vec![4]);
    batch.del(vec![0x01, 3]);
    store.apply_batch(batch).unwrap();

    assert_eq!(iter.next(), Some(Ok((vec![0x01, 3], vec![3]))));
    assert_eq!(iter.next(), None);
    drop(iter);

    let keys: Vec<_> = collect_range(&store, KeyRange::prefix(vec![0x01]))
        .into_iter()
        .map(|(k, _)| k[1])
        .collect();
    assert_eq!(keys, vec![1u8, 2, 4]);
}

fn interleaved_iterators<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);
    let entries: Vec<(Data, Data)> = (0u8..20).map(|i| (vec![i], vec![i])).collect();
    put_all(&store, entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice())));

    let mut evens = store.range_iter(KeyRange::full()).unwrap().step_by(2);
    let mut odds = store.range_iter(KeyRange::full()).unwrap().skip(1).step_by(2);

    for i in (0u8..20).step_by(2) {
        assert_eq!(evens.next(), Some(Ok((vec![i], vec![i]))));
        assert_eq!(odds.next(), Some(Ok((vec![i + 1], vec![i + 1]))));
    }
    assert_eq!(evens.next(), None);
    assert_eq!(odds.next(), None);
}

fn parallel_readers<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);
    let entries: Vec<(Data, Data)> = (0u8..50).map(|i| (vec![0x01, i], vec![i; 4])).collect();
    put_all(&store, entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice())));

    thread::scope(|s| {
        for t in 0u8..4 {
            let store = &store;
            let entries = &entries;
            s.spawn(move || {
                for round in 0..10u8 {
                    let i = (t * 10 + round) % 50;
                    assert_eq!(store.get(&[0x01, i]), Ok(Some(vec![i; 4])));
                }
                assert_eq!(&collect_range(store, KeyRange::prefix(vec![0x01])), entries);
            });
        }
    });
}

fn parallel_batches_are_all_applied<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);

    thread::scope(|s| {
        for t in 0u8..4 {
            let store = &store;
            s.spawn(move || {
                for i in 0u8..10 {
                    let mut batch = WriteBatch::new();
                    batch.put(vec![t, i], vec![t]);
                    batch.put(vec![0xff, t, i], vec![i]);
                    store.apply_batch(batch).expect("batch to succeed");
                }
            });
        }
    });

    for t in 0u8..4 {
        assert_eq!(collect_range(&store, KeyRange::prefix(vec![t])).len(), 10);
    }
    assert_eq!(collect_range(&store, KeyRange::prefix(vec![0xff])).len(), 40);
}

fn batch_is_atomic_for_readers<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);
    put_all(&store, [(&b"a"[..], &[0][..]), (&b"b"[..], &[0][..])]);

    thread::scope(|s| {
        let store = &store;
        let writer = s.spawn(move || {
            for n in 1u8..=50 {
                let mut batch = WriteBatch::new();
                batch.put(b"a".to_vec(), vec![n]);
                batch.put(b"b".to_vec(), vec![n]);
                store.apply_batch(batch).expect("batch to succeed");
            }
        });

        // Both keys are always written together so a consistent view sees equal values
        while !writer.is_finished() {
            let view = collect_range(store, KeyRange::full());
            assert_eq!(view.len(), 2);
            assert_eq!(view[0].1, view[1].1);
        }
    });

    assert_eq!(store.get(b"a"), Ok(Some(vec![50])));
}

tests![
    batch_is_atomic_for_readers,
    interleaved_iterators,
    iterator_ignores_later_writes,
    parallel_batches_are_all_applied,
    parallel_readers,
];
