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

//! Mapping of columns and variables onto the flat backend keyspace
//!
//! Every namespaced key starts with a fixed-width prefix: one tag byte identifying the kind of
//! namespace followed by one id byte. Distinct namespaces occupy disjoint key ranges, so one
//! column can never alias the keys of another, and key order within a column is exactly the order
//! of the column-local key bytes.
//!
//! | namespace        | prefix          |
//! |------------------|-----------------|
//! | variable `id`    | `0x00 id`       |
//! | column `id`      | `0x01 id`       |
//! | schema metadata  | `0xff`          |

use crate::{Data, KeyRange};

const VARIABLE_TAG: u8 = 0x00;
const COLUMN_TAG: u8 = 0x01;
const META_TAG: u8 = 0xff;

/// A disjoint region of the backend keyspace
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Debug, Hash)]
pub enum Namespace {
    /// Slot of a single variable
    Variable(u8),
    /// Keyed entries of a column
    Column(u8),
    /// Store metadata (schema description)
    Meta,
}

impl Namespace {
    /// Byte prefix shared by all keys in this namespace
    pub fn prefix(&self) -> Data {
        match self {
            Self::Variable(id) => vec![VARIABLE_TAG, *id],
            Self::Column(id) => vec![COLUMN_TAG, *id],
            Self::Meta => vec![META_TAG],
        }
    }

    /// Namespaced version of given key
    pub fn key(&self, key: &[u8]) -> Data {
        let mut full = self.prefix();
        full.extend_from_slice(key);
        full
    }

    /// Strip the namespace prefix from a full key, if the key belongs to this namespace
    pub fn strip_prefix<'k>(&self, full_key: &'k [u8]) -> Option<&'k [u8]> {
        full_key.strip_prefix(self.prefix().as_slice())
    }

    /// Range covering the whole namespace
    pub fn range(&self) -> KeyRange {
        KeyRange::prefix(self.prefix())
    }

    /// Keys `k` in this namespace with `from <= k <= to`
    pub fn inclusive_range(&self, from: &[u8], to: &[u8]) -> KeyRange {
        KeyRange::inclusive(self.key(from), self.key(to))
    }

    /// Keys `k` in this namespace with `k <= to`
    pub fn range_up_to(&self, to: &[u8]) -> KeyRange {
        KeyRange::inclusive(self.prefix(), self.key(to))
    }

    /// Metadata key describing this namespace. `None` for the metadata namespace itself.
    pub fn meta_key(&self) -> Option<Data> {
        match self {
            Self::Variable(_) | Self::Column(_) => Some(Self::Meta.key(&self.prefix())),
            Self::Meta => None,
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Variable(id) => write!(f, "variable #{id}"),
            Self::Column(id) => write!(f, "column #{id}"),
            Self::Meta => f.write_str("metadata"),
        }
    }
}
