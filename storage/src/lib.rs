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

//! Typed column-family storage on top of an ordered key-value backend.
//!
//! A store is made of *columns*, ordered collections of key-value pairs, and *variables*, slots
//! holding a single value. Both are described by constant descriptors carrying the serializers
//! that convert keys and values to bytes:
//!
//! ```
//! use storage::{
//!     schema::{Column, Schema, Variable},
//!     serializer::{BytesSerializer, U64Serializer},
//!     Accessor,
//! };
//!
//! const BLOCKS: Column<u64, Vec<u8>> = Column::new(1, "blocks", &U64Serializer, &BytesSerializer);
//! const TIP: Variable<u64> = Variable::new(1, "tip", &U64Serializer);
//!
//! let schema = Schema::new().with_column(&BLOCKS).with_variable(&TIP);
//! let store = Accessor::open(storage_inmemory::InMemory::new(), schema)?;
//!
//! store.update(|tx| {
//!     tx.put(&BLOCKS, &5, &vec![0xab])?;
//!     tx.put_variable(&TIP, &5)
//! })?;
//!
//! assert_eq!(store.get_variable(&TIP)?, Some(5));
//! let tip = store.get_floor_entry(&BLOCKS, &10)?.expect("entry to exist");
//! assert_eq!(tip.key(), &5);
//! # Ok::<(), storage::Error>(())
//! ```

pub mod accessor;
pub mod entry;
pub mod error;
pub mod raw;
pub mod schema;
pub mod serializer;
pub mod transaction;

pub use accessor::Accessor;
pub use entry::ColumnEntry;
pub use error::Error;
pub use transaction::{Transaction, TransactionState};

pub use storage_core::{Backend, Data};

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test;
