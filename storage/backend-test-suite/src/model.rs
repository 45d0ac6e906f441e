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

//! A dead-simple reference implementation of a storage backend

use std::collections::BTreeMap;

use storage_core::{backend, Data, KeyRange, WriteBatch, WriteOp};

pub trait ApplyActions {
    /// Apply a sequence of write operations as a single batch
    fn apply_actions(&self, iter: impl IntoIterator<Item = WriteOp>);
}

impl<T: backend::WriteOps> ApplyActions for T {
    fn apply_actions(&self, iter: impl IntoIterator<Item = WriteOp>) {
        let batch: WriteBatch = iter.into_iter().collect();
        self.apply_batch(batch).expect("batch to succeed")
    }
}

/// Reference implementation of the whole keyspace
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct Model(BTreeMap<Data, Data>);

impl Model {
    /// New empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// New model pre-populated by contents resulting by applying a sequence of actions
    pub fn from_actions<T: IntoIterator<Item = WriteOp>>(iter: T) -> Self {
        let mut this = Self::default();
        this.extend(iter);
        this
    }

    /// New model obtained by dumping given range of a database
    pub fn from_db<B: backend::ReadOps>(store: &B, range: KeyRange) -> Self {
        crate::prelude::collect_range(store, range).into_iter().collect()
    }

    /// Get the inner map
    pub fn inner(&self) -> &BTreeMap<Data, Data> {
        &self.0
    }

    /// Apply given action
    pub fn apply_action(&mut self, action: WriteOp) {
        match action {
            WriteOp::Put(key, val) => {
                let _ = self.0.insert(key, val);
            }
            WriteOp::Del(key) => {
                let _ = self.0.remove(&key);
            }
        }
    }

    /// Get value associated with given key
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.0.get(key.as_ref()).map(|v| v.as_ref())
    }

    /// Entries within given range
    pub fn range(&self, range: &KeyRange) -> Vec<(Data, Data)> {
        self.0
            .iter()
            .filter(|(k, _)| range.contains(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Last entry within given range
    pub fn last_in_range(&self, range: &KeyRange) -> Option<(Data, Data)> {
        self.range(range).pop()
    }
}

impl IntoIterator for Model {
    type Item = (Data, Data);
    type IntoIter = std::collections::btree_map::IntoIter<Data, Data>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Extend<WriteOp> for Model {
    fn extend<T: IntoIterator<Item = WriteOp>>(&mut self, iter: T) {
        iter.into_iter().for_each(|action| self.apply_action(action))
    }
}

impl FromIterator<(Data, Data)> for Model {
    fn from_iter<T: IntoIterator<Item = (Data, Data)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
