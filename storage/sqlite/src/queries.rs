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

//! SQL statements used by the backend

use std::ops::Bound;

use storage_core::KeyRange;

/// Version of the on-disk layout, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 1;

pub const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS kv(
    key BLOB PRIMARY KEY NOT NULL,
    value BLOB NOT NULL
) WITHOUT ROWID";

pub const GET: &str = "SELECT value FROM kv WHERE key = ?";

pub const PUT: &str = "INSERT OR REPLACE INTO kv(key, value) VALUES(?, ?)";

pub const DELETE: &str = "DELETE FROM kv WHERE key = ?";

#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum Order {
    Ascending,
    Descending,
}

/// Query selecting `(key, value)` rows within a key range. The key bounds are followed by a
/// single `LIMIT` parameter.
#[derive(Eq, PartialEq, Debug)]
pub struct RangeQuery<'a> {
    pub sql: String,
    pub keys: Vec<&'a [u8]>,
}

impl<'a> RangeQuery<'a> {
    pub fn new(range: &'a KeyRange, order: Order) -> Self {
        let mut conditions = Vec::with_capacity(2);
        let mut keys = Vec::with_capacity(2);

        match range.start() {
            Bound::Included(k) => {
                conditions.push("key >= ?");
                keys.push(k);
            }
            Bound::Excluded(k) => {
                conditions.push("key > ?");
                keys.push(k);
            }
            Bound::Unbounded => {}
        }
        match range.end() {
            Bound::Included(k) => {
                conditions.push("key <= ?");
                keys.push(k);
            }
            Bound::Excluded(k) => {
                conditions.push("key < ?");
                keys.push(k);
            }
            Bound::Unbounded => {}
        }

        let mut sql = String::from("SELECT key, value FROM kv");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(match order {
            Order::Ascending => " ORDER BY key ASC LIMIT ?",
            Order::Descending => " ORDER BY key DESC LIMIT ?",
        });

        Self { sql, keys }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unbounded() {
        let range = KeyRange::full();
        let query = RangeQuery::new(&range, Order::Ascending);
        assert_eq!(query.sql, "SELECT key, value FROM kv ORDER BY key ASC LIMIT ?");
        assert!(query.keys.is_empty());
    }

    #[test]
    fn prefix() {
        let range = KeyRange::prefix(vec![1, 2]);
        let query = RangeQuery::new(&range, Order::Descending);
        assert_eq!(
            query.sql,
            "SELECT key, value FROM kv WHERE key >= ? AND key < ? ORDER BY key DESC LIMIT ?"
        );
        assert_eq!(query.keys, vec![&[1u8, 2][..], &[1u8, 3][..]]);
    }

    #[test]
    fn exclusive_start() {
        let range = KeyRange::new(Bound::Excluded(vec![5]), Bound::Included(vec![9]));
        let query = RangeQuery::new(&range, Order::Ascending);
        assert_eq!(
            query.sql,
            "SELECT key, value FROM kv WHERE key > ? AND key <= ? ORDER BY key ASC LIMIT ?"
        );
        assert_eq!(query.keys, vec![&[5u8][..], &[9u8][..]]);
    }
}
