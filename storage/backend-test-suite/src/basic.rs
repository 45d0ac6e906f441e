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

//! Some basic tests

use std::ops::Bound;

use crate::prelude::*;

fn put_and_get<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);

    assert_eq!(store.get(b"hello"), Ok(None));
    put_all(&store, [(&b"hello"[..], &b"world"[..])]);
    assert_eq!(store.get(b"hello"), Ok(Some(b"world".to_vec())));
    assert_eq!(store.get(b"hell"), Ok(None));
    assert_eq!(store.get(b"hello!"), Ok(None));
}

fn empty_batch<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);

    put_all(&store, [(&b"a"[..], &b"0"[..])]);
    store.apply_batch(WriteBatch::new()).unwrap();
    assert_eq!(collect_range(&store, KeyRange::full()), vec![(b"a".to_vec(), b"0".to_vec())]);
}

fn put_twice_in_batch_last_wins<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);

    let mut batch = WriteBatch::new();
    batch.put(b"hello".to_vec(), b"a".to_vec());
    batch.put(b"hello".to_vec(), b"b".to_vec());
    store.apply_batch(batch).unwrap();
    assert_eq!(store.get(b"hello"), Ok(Some(b"b".to_vec())));

    let mut batch = WriteBatch::new();
    batch.put(b"hello".to_vec(), b"c".to_vec());
    batch.del(b"hello".to_vec());
    store.apply_batch(batch).unwrap();
    assert_eq!(store.get(b"hello"), Ok(None));

    let mut batch = WriteBatch::new();
    batch.del(b"hello".to_vec());
    batch.put(b"hello".to_vec(), b"d".to_vec());
    store.apply_batch(batch).unwrap();
    assert_eq!(store.get(b"hello"), Ok(Some(b"d".to_vec())));
}

fn delete_missing_key<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);

    let mut batch = WriteBatch::new();
    batch.del(b"nothing here".to_vec());
    assert_eq!(store.apply_batch(batch), Ok(()));
    assert_eq!(store.get(b"nothing here"), Ok(None));
}

fn empty_value<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);

    put_all(&store, [(&[0x00, 0x01][..], &[][..])]);
    assert_eq!(store.get(&[0x00, 0x01]), Ok(Some(vec![])));
}

fn iterate_in_unsigned_byte_order<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);

    put_all(
        &store,
        [
            (&[0x80][..], &b"3"[..]),
            (&[0x7f, 0xff][..], &b"2"[..]),
            (&[0xff][..], &b"4"[..]),
            (&[0x00][..], &b"0"[..]),
            (&[0x00, 0x00][..], &b"1"[..]),
        ],
    );

    let vals: Vec<_> = collect_range(&store, KeyRange::full()).into_iter().map(|e| e.1).collect();
    let expected: Vec<Data> =
        ["0", "1", "2", "3", "4"].iter().map(|v| v.as_bytes().to_vec()).collect();
    assert_eq!(vals, expected);
}

fn iterate_over_ranges<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);

    let entries: Vec<(Data, Data)> = (0u8..10).map(|i| (vec![0x01, i], vec![i])).collect();
    put_all(&store, entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice())));
    put_all(&store, [(&[0x02, 0x00][..], &[0xaa][..]), (&[0x00, 0x09][..], &[0xbb][..])]);

    let vals = |range: KeyRange| -> Vec<u8> {
        collect_range(&store, range).into_iter().map(|(_, v)| v[0]).collect()
    };

    let expected = |range: std::ops::RangeInclusive<u8>| range.collect::<Vec<u8>>();
    assert_eq!(vals(KeyRange::inclusive(vec![0x01, 2], vec![0x01, 8])), expected(2..=8));
    assert_eq!(vals(KeyRange::inclusive(vec![0x01, 0], vec![0x01, 9])), expected(0..=9));
    assert_eq!(vals(KeyRange::prefix(vec![0x01])), expected(0..=9));
    assert_eq!(
        vals(KeyRange::new(
            Bound::Excluded(vec![0x01, 2]),
            Bound::Excluded(vec![0x01, 5])
        )),
        vec![3, 4]
    );
    assert_eq!(
        vals(KeyRange::new(Bound::Excluded(vec![0x01, 7]), Bound::Unbounded)),
        vec![8, 9, 0xaa]
    );
    assert_eq!(
        vals(KeyRange::new(Bound::Unbounded, Bound::Excluded(vec![0x01, 1]))),
        vec![0xbb, 0]
    );
    assert_eq!(vals(KeyRange::inclusive(vec![0x01, 8], vec![0x01, 2])), Vec::<u8>::new());
    assert_eq!(vals(KeyRange::prefix(vec![0x03])), Vec::<u8>::new());
}

fn iterators_are_restartable<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);
    put_all(&store, [(&b"a"[..], &b"0"[..]), (&b"b"[..], &b"1"[..])]);

    let first = collect_range(&store, KeyRange::full());
    let second = collect_range(&store, KeyRange::full());
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

fn last_in_range<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);

    put_all(
        &store,
        [
            (&[0x01, 1][..], &[1][..]),
            (&[0x01, 4][..], &[4][..]),
            (&[0x02, 0][..], &[0xaa][..]),
        ],
    );

    let last = |range: KeyRange| store.last_in_range(range).unwrap().map(|(_, v)| v[0]);

    assert_eq!(last(KeyRange::inclusive(vec![0x01], vec![0x01, 3])), Some(1));
    assert_eq!(last(KeyRange::inclusive(vec![0x01], vec![0x01, 4])), Some(4));
    assert_eq!(last(KeyRange::inclusive(vec![0x01], vec![0x01, 0xff])), Some(4));
    assert_eq!(last(KeyRange::inclusive(vec![0x01], vec![0x01, 0])), None);
    assert_eq!(last(KeyRange::prefix(vec![0x01])), Some(4));
    assert_eq!(last(KeyRange::prefix(vec![0x03])), None);
    assert_eq!(last(KeyRange::inclusive(vec![0x01, 4], vec![0x01, 1])), None);
}

fn delete_then_iterate<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);

    put_all(
        &store,
        [
            (&b"aa"[..], &b"0"[..]),
            (&b"ab"[..], &b"1"[..]),
            (&b"ac"[..], &b"2"[..]),
            (&b"aca"[..], &b"3"[..]),
            (&b"b"[..], &b"5"[..]),
        ],
    );

    let mut batch = WriteBatch::new();
    batch.del(b"ab".to_vec());
    batch.del(b"aca".to_vec());
    store.apply_batch(batch).unwrap();

    let keys: Vec<_> = collect_range(&store, KeyRange::prefix(b"a".to_vec()))
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(keys, vec![b"aa".to_vec(), b"ac".to_vec()]);
}

fn close_is_idempotent<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    let store = open(&*backend_fn);
    put_all(&store, [(&b"a"[..], &b"0"[..])]);

    assert_eq!(store.close(), Ok(()));
    assert_eq!(store.close(), Ok(()));
    assert!(store.get(b"a").is_err());
}

tests![
    close_is_idempotent,
    delete_missing_key,
    delete_then_iterate,
    empty_batch,
    empty_value,
    iterate_in_unsigned_byte_order,
    iterate_over_ranges,
    iterators_are_restartable,
    last_in_range,
    put_and_get,
    put_twice_in_batch_last_wins,
];
