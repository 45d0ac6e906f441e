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

//! Utilities for implementing storage backends

use std::{collections::BTreeMap, ops::Bound};

use crate::{Data, KeyRange};

/// If your map/set has Vec<T> as the key and you need to call `range` on it, you'll want to pass
/// slices for the bounds instead of allocating temporary vectors. However, something like
/// ```ignore
/// my_map.range(my_slice..);
/// ```
/// won't compile because trait bounds on `range` require that the passed range's generic parameter
/// implements `Borrow<&[T]>`, but `Vec<T>` only implements `Borrow<[T]>`.
/// `SliceRange` can be used as a workaround for this.
pub struct SliceRange<'a, T> {
    pub start: Bound<&'a [T]>,
    pub end: Bound<&'a [T]>,
}

impl<T> std::ops::RangeBounds<[T]> for SliceRange<'_, T> {
    fn start_bound(&self) -> Bound<&[T]> {
        self.start
    }

    fn end_bound(&self) -> Bound<&[T]> {
        self.end
    }
}

/// Iterator over a range of entries in an immutable snapshot of a [BTreeMap].
///
/// The iterator owns (a handle to) the snapshot and remembers the last key it has yielded, so it
/// does not borrow from anything and the snapshot stays alive for as long as the iteration does.
pub struct SnapshotRangeIter<M> {
    snapshot: M,
    range: Option<KeyRange>,
}

impl<M: std::ops::Deref<Target = BTreeMap<Data, Data>>> SnapshotRangeIter<M> {
    pub fn new(snapshot: M, range: KeyRange) -> Self {
        let range = (!range.is_empty()).then_some(range);
        Self { snapshot, range }
    }
}

impl<M: std::ops::Deref<Target = BTreeMap<Data, Data>>> Iterator for SnapshotRangeIter<M> {
    type Item = crate::Result<(Data, Data)>;

    fn next(&mut self) -> Option<Self::Item> {
        let range = self.range.take()?;
        let (key, val) = self.snapshot.range(range.as_slice_range()).next()?;
        let entry = (key.clone(), val.clone());

        let rest = range.with_start(Bound::Excluded(key.clone()));
        self.range = (!rest.is_empty()).then_some(rest);

        Some(Ok(entry))
    }
}

/// Get the last entry of a [BTreeMap] within given range
pub fn last_in_range(map: &BTreeMap<Data, Data>, range: &KeyRange) -> Option<(Data, Data)> {
    if range.is_empty() {
        return None;
    }
    map.range(range.as_slice_range()).next_back().map(|(k, v)| (k.clone(), v.clone()))
}

/// Hex representation of a key, for log messages
pub fn fmt_key(key: &[u8]) -> String {
    hex::encode(key)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;

    fn sample_map() -> BTreeMap<Data, Data> {
        [1u8, 3, 5, 7].into_iter().map(|k| (vec![k], vec![k * 10])).collect()
    }

    #[test]
    fn snapshot_iteration_is_bounded() {
        let map = Arc::new(sample_map());
        let iter = SnapshotRangeIter::new(Arc::clone(&map), KeyRange::inclusive(vec![2], vec![5]));
        let keys: Vec<_> = iter.map(|e| e.unwrap().0).collect();
        assert_eq!(keys, vec![vec![3], vec![5]]);
    }

    #[test]
    fn snapshot_iteration_inverted_range() {
        let range = KeyRange::inclusive(vec![5], vec![2]);
        let iter = SnapshotRangeIter::new(Arc::new(sample_map()), range);
        assert_eq!(iter.count(), 0);
    }

    #[test]
    fn last_entry() {
        let map = sample_map();
        let range = KeyRange::inclusive(vec![0], vec![6]);
        assert_eq!(last_in_range(&map, &range), Some((vec![5], vec![50])));
        let range = KeyRange::inclusive(vec![8], vec![9]);
        assert_eq!(last_in_range(&map, &range), None);
    }

    #[test]
    fn keys_formatted_as_hex() {
        assert_eq!(fmt_key(&[]), "");
        assert_eq!(fmt_key(&[0x01, 0xab, 0x00]), "01ab00");
    }
}
