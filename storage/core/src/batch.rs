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

//! Batches of modifications applied to a backend atomically

use crate::Data;

/// A single modifying operation on the flat keyspace
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum WriteOp {
    /// Associate the value with the key, overwriting the previous one
    Put(Data, Data),
    /// Remove the key
    Del(Data),
}

impl WriteOp {
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Put(k, _) | Self::Del(k) => k,
        }
    }

    /// Apply given function to the key
    pub fn map_key(self, f: impl FnOnce(Data) -> Data) -> Self {
        match self {
            Self::Put(k, v) => Self::Put(f(k), v),
            Self::Del(k) => Self::Del(f(k)),
        }
    }
}

/// An ordered list of write operations. Later operations on the same key take precedence.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct WriteBatch(Vec<WriteOp>);

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: Data, val: Data) {
        self.0.push(WriteOp::Put(key, val));
    }

    pub fn del(&mut self, key: Data) {
        self.0.push(WriteOp::Del(key));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of (puts, deletions) in the batch
    pub fn counts(&self) -> (usize, usize) {
        let puts = self.0.iter().filter(|op| matches!(op, WriteOp::Put(..))).count();
        (puts, self.0.len() - puts)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &WriteOp> + '_ {
        self.0.iter()
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<WriteOp> for WriteBatch {
    fn from_iter<T: IntoIterator<Item = WriteOp>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<WriteOp> for WriteBatch {
    fn extend<T: IntoIterator<Item = WriteOp>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}
