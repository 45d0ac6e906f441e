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

//! Column and variable descriptors and the schema an accessor is opened with

use itertools::Itertools;
use storage_core::Namespace;

use crate::{
    error::ConfigurationError,
    serializer::{KeySerializer, KvSerializer},
};

#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Debug, Hash)]
pub struct ColumnId(u8);

impl ColumnId {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Debug, Hash)]
pub struct VariableId(u8);

impl VariableId {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

/// An ordered collection of key-value pairs.
///
/// Entries are ordered by their serialized keys, which by the [KeySerializer] contract is the
/// natural order of `K`.
pub struct Column<K: 'static, V: 'static> {
    id: ColumnId,
    name: &'static str,
    key_serializer: &'static dyn KeySerializer<K>,
    value_serializer: &'static dyn KvSerializer<V>,
}

impl<K, V> Column<K, V> {
    pub const fn new(
        id: u8,
        name: &'static str,
        key_serializer: &'static dyn KeySerializer<K>,
        value_serializer: &'static dyn KvSerializer<V>,
    ) -> Self {
        Self {
            id: ColumnId(id),
            name,
            key_serializer,
            value_serializer,
        }
    }

    pub const fn id(&self) -> ColumnId {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn key_serializer(&self) -> &'static dyn KeySerializer<K> {
        self.key_serializer
    }

    pub fn value_serializer(&self) -> &'static dyn KvSerializer<V> {
        self.value_serializer
    }

    /// Region of the backend keyspace holding the column entries
    pub const fn namespace(&self) -> Namespace {
        Namespace::Column(self.id.0)
    }
}

impl<K, V> Clone for Column<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Column<K, V> {}

impl<K, V> std::fmt::Debug for Column<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column").field("id", &self.id.0).field("name", &self.name).finish()
    }
}

/// A single slot holding at most one value
pub struct Variable<T: 'static> {
    id: VariableId,
    name: &'static str,
    serializer: &'static dyn KvSerializer<T>,
}

impl<T> Variable<T> {
    pub const fn new(id: u8, name: &'static str, serializer: &'static dyn KvSerializer<T>) -> Self {
        Self {
            id: VariableId(id),
            name,
            serializer,
        }
    }

    pub const fn id(&self) -> VariableId {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn serializer(&self) -> &'static dyn KvSerializer<T> {
        self.serializer
    }

    pub const fn namespace(&self) -> Namespace {
        Namespace::Variable(self.id.0)
    }
}

impl<T> Clone for Variable<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Variable<T> {}

impl<T> std::fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Variable").field("id", &self.id.0).field("name", &self.name).finish()
    }
}

/// Type-erased description of a column or variable
#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub struct Descriptor {
    pub namespace: Namespace,
    pub name: &'static str,
}

/// The set of columns and variables served by an accessor
#[derive(Eq, PartialEq, Clone, Debug, Default)]
pub struct Schema {
    columns: Vec<Descriptor>,
    variables: Vec<Descriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column<K, V>(mut self, column: &Column<K, V>) -> Self {
        self.columns.push(Descriptor {
            namespace: column.namespace(),
            name: column.name(),
        });
        self
    }

    pub fn with_variable<T>(mut self, variable: &Variable<T>) -> Self {
        self.variables.push(Descriptor {
            namespace: variable.namespace(),
            name: variable.name(),
        });
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &Descriptor> + '_ {
        self.columns.iter()
    }

    pub fn variables(&self) -> impl Iterator<Item = &Descriptor> + '_ {
        self.variables.iter()
    }

    /// All descriptors, columns first
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> + '_ {
        self.columns.iter().chain(self.variables.iter())
    }

    /// Check no id is declared twice within the columns or within the variables
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let id_of = |desc: &&Descriptor| match desc.namespace {
            Namespace::Column(id) | Namespace::Variable(id) => id,
            Namespace::Meta => u8::MAX,
        };
        if let Some(dup) = self.columns.iter().duplicates_by(id_of).next() {
            return Err(ConfigurationError::DuplicateColumnId(id_of(&dup)));
        }
        if let Some(dup) = self.variables.iter().duplicates_by(id_of).next() {
            return Err(ConfigurationError::DuplicateVariableId(id_of(&dup)));
        }
        Ok(())
    }

    pub fn check_column<K, V>(&self, column: &Column<K, V>) -> Result<(), ConfigurationError> {
        let declared = self
            .columns
            .iter()
            .any(|d| d.namespace == column.namespace() && d.name == column.name());
        if !declared {
            return Err(ConfigurationError::UnknownColumn {
                id: column.id().get(),
                name: column.name().to_owned(),
            });
        }
        Ok(())
    }

    pub fn check_variable<T>(&self, variable: &Variable<T>) -> Result<(), ConfigurationError> {
        let declared = self
            .variables
            .iter()
            .any(|d| d.namespace == variable.namespace() && d.name == variable.name());
        if !declared {
            return Err(ConfigurationError::UnknownVariable {
                id: variable.id().get(),
                name: variable.name().to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::serializer::{BytesSerializer, U32Serializer, U64Serializer};

    const COL_A: Column<u64, Vec<u8>> = Column::new(1, "a", &U64Serializer, &BytesSerializer);
    const COL_B: Column<u32, u32> = Column::new(2, "b", &U32Serializer, &U32Serializer);
    const COL_A_AGAIN: Column<u32, u32> = Column::new(1, "a2", &U32Serializer, &U32Serializer);
    const VAR_A: Variable<u64> = Variable::new(1, "var_a", &U64Serializer);
    const VAR_B: Variable<u64> = Variable::new(2, "var_b", &U64Serializer);

    #[test]
    fn descriptors_are_const_and_copy() {
        let copy = COL_A;
        assert_eq!(copy.id(), ColumnId::new(1));
        assert_eq!(copy.name(), "a");
        assert_eq!(COL_A.namespace(), Namespace::Column(1));
        assert_eq!(VAR_A.namespace(), Namespace::Variable(1));
        assert_eq!(COL_A.key_serializer().serialize(&5), vec![0, 0, 0, 0, 0, 0, 0, 5]);
    }

    #[test]
    fn column_and_variable_may_share_id() {
        let schema = Schema::new().with_column(&COL_A).with_variable(&VAR_A);
        assert_eq!(schema.validate(), Ok(()));
        assert_eq!(schema.descriptors().count(), 2);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let schema =
            Schema::new().with_column(&COL_A).with_column(&COL_B).with_column(&COL_A_AGAIN);
        assert_eq!(schema.validate(), Err(ConfigurationError::DuplicateColumnId(1)));

        let schema =
            Schema::new().with_variable(&VAR_B).with_variable(&VAR_A).with_variable(&VAR_B);
        assert_eq!(schema.validate(), Err(ConfigurationError::DuplicateVariableId(2)));
    }

    #[test]
    fn undeclared_rejected() {
        let schema = Schema::new().with_column(&COL_A).with_variable(&VAR_A);

        assert_eq!(schema.check_column(&COL_A), Ok(()));
        assert_eq!(schema.check_variable(&VAR_A), Ok(()));
        assert_eq!(
            schema.check_column(&COL_B),
            Err(ConfigurationError::UnknownColumn {
                id: 2,
                name: "b".to_owned()
            })
        );
        // Same id, different column
        assert!(schema.check_column(&COL_A_AGAIN).is_err());
        assert_eq!(
            schema.check_variable(&VAR_B),
            Err(ConfigurationError::UnknownVariable {
                id: 2,
                name: "var_b".to_owned()
            })
        );
    }
}
