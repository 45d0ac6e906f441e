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

//! Ranges of keys in the flat backend keyspace

use std::ops::Bound;

use crate::{util::SliceRange, Data};

/// A range of raw keys, ordered byte-lexicographically
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct KeyRange {
    start: Bound<Data>,
    end: Bound<Data>,
}

impl KeyRange {
    /// Range with arbitrary bounds
    pub fn new(start: Bound<Data>, end: Bound<Data>) -> Self {
        Self { start, end }
    }

    /// All keys `k` such that `from <= k <= to`
    pub fn inclusive(from: Data, to: Data) -> Self {
        Self::new(Bound::Included(from), Bound::Included(to))
    }

    /// All keys starting with given prefix
    pub fn prefix(prefix: Data) -> Self {
        let end = match prefix_successor(&prefix) {
            Some(succ) => Bound::Excluded(succ),
            None => Bound::Unbounded,
        };
        Self::new(Bound::Included(prefix), end)
    }

    /// Range covering the whole keyspace
    pub fn full() -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded)
    }

    pub fn start(&self) -> Bound<&[u8]> {
        as_slice_bound(&self.start)
    }

    pub fn end(&self) -> Bound<&[u8]> {
        as_slice_bound(&self.end)
    }

    /// Take the bounds out of the range
    pub fn into_bounds(self) -> (Bound<Data>, Bound<Data>) {
        (self.start, self.end)
    }

    /// Bounds as slices, suitable for passing to `BTreeMap::range`.
    ///
    /// Note `BTreeMap::range` panics on inverted ranges, check [Self::is_empty] first.
    pub fn as_slice_range(&self) -> SliceRange<'_, u8> {
        SliceRange {
            start: self.start(),
            end: self.end(),
        }
    }

    /// Range with the start bound replaced, keeping the end bound
    pub fn with_start(self, start: Bound<Data>) -> Self {
        Self::new(start, self.end)
    }

    /// Check whether the range contains given key
    pub fn contains(&self, key: &[u8]) -> bool {
        let after_start = match self.start() {
            Bound::Included(s) => key >= s,
            Bound::Excluded(s) => key > s,
            Bound::Unbounded => true,
        };
        let before_end = match self.end() {
            Bound::Included(e) => key <= e,
            Bound::Excluded(e) => key < e,
            Bound::Unbounded => true,
        };
        after_start && before_end
    }

    /// Check whether no key can possibly fall within the range
    pub fn is_empty(&self) -> bool {
        match (self.start(), self.end()) {
            (Bound::Unbounded, _) | (_, Bound::Unbounded) => false,
            (Bound::Included(s), Bound::Included(e)) => s > e,
            (Bound::Included(s), Bound::Excluded(e)) | (Bound::Excluded(s), Bound::Included(e)) => {
                s >= e
            }
            (Bound::Excluded(s), Bound::Excluded(e)) => {
                // (s, e) is empty if there is no byte string strictly in between
                s >= e || key_successor(s).as_slice() >= e
            }
        }
    }
}

fn as_slice_bound(bound: &Bound<Data>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(k) => Bound::Included(k.as_slice()),
        Bound::Excluded(k) => Bound::Excluded(k.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

/// The smallest byte string greater than every string starting with `prefix`.
///
/// Returns `None` if there is no such string, i.e. the prefix is empty or consists of `0xff`s only.
pub fn prefix_successor(prefix: &[u8]) -> Option<Data> {
    let last = prefix.iter().rposition(|b| *b != 0xff)?;
    let mut succ = prefix[..=last].to_vec();
    succ[last] += 1;
    Some(succ)
}

/// The immediate successor of a key in byte-lexicographic order
pub fn key_successor(key: &[u8]) -> Data {
    let mut succ = Vec::with_capacity(key.len() + 1);
    succ.extend_from_slice(key);
    succ.push(0x00);
    succ
}
