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

//! Raw dump of the store contents for inspection and tests

use std::collections::BTreeMap;

use storage_core::Data;

pub type RawColumnContents = BTreeMap<Data, Data>;

#[derive(Eq, PartialEq, Debug, Default, Clone)]
pub struct RawDb {
    columns: BTreeMap<String, RawColumnContents>,
    variables: BTreeMap<String, Data>,
}

impl RawDb {
    /// Contents of every declared column by name. Keys are without the column prefix.
    pub fn columns(&self) -> &BTreeMap<String, RawColumnContents> {
        &self.columns
    }

    /// Values of the declared variables that are set, by name
    pub fn variables(&self) -> &BTreeMap<String, Data> {
        &self.variables
    }

    pub fn column(&self, name: &str) -> Option<&RawColumnContents> {
        self.columns.get(name)
    }

    pub fn variable(&self, name: &str) -> Option<&Data> {
        self.variables.get(name)
    }

    pub(crate) fn insert_column(&mut self, name: &str, contents: RawColumnContents) {
        self.columns.insert(name.to_owned(), contents);
    }

    pub(crate) fn insert_variable(&mut self, name: &str, value: Data) {
        self.variables.insert(name.to_owned(), value);
    }
}

#[cfg(test)]
mod test {
    use crate::{
        schema::{Column, Schema, Variable},
        serializer::{BytesSerializer, U16Serializer, U32Serializer},
        Accessor,
    };
    use storage_inmemory::InMemory;

    const DB1: Column<u32, u32> = Column::new(1, "Db1", &U32Serializer, &U32Serializer);
    const DB2: Column<u16, Vec<u8>> = Column::new(2, "Db2", &U16Serializer, &BytesSerializer);
    const VAR: Variable<u32> = Variable::new(1, "Var", &U32Serializer);

    #[test]
    fn basic_dump() {
        let schema = Schema::new().with_column(&DB1).with_column(&DB2).with_variable(&VAR);
        let storage = Accessor::open(InMemory::new(), schema).unwrap();

        {
            // Check the DB dump is empty initially
            let dump = storage.dump_raw().unwrap();
            assert_eq!(dump.columns().keys().collect::<Vec<_>>(), vec!["Db1", "Db2"]);
            assert!(dump.columns().values().all(|x| x.is_empty()));
            assert!(dump.variables().is_empty());
        }

        // Add some values, check the dump contents
        let mut dbtx = storage.start_transaction().unwrap();
        dbtx.put(&DB1, &42, &1337).unwrap();
        dbtx.put(&DB2, &21, &vec![1, 2, 3, 4]).unwrap();
        dbtx.put_variable(&VAR, &7).unwrap();
        dbtx.commit().unwrap();

        {
            let dump = storage.dump_raw().unwrap();
            let db1 = dump.column("Db1").unwrap();
            assert_eq!(db1.len(), 1);
            assert_eq!(db1[[0, 0, 0, 42].as_ref()], vec![0, 0, 5, 57]);
            let db2 = dump.column("Db2").unwrap();
            assert_eq!(db2.len(), 1);
            assert_eq!(db2[[0, 21].as_ref()], vec![1, 2, 3, 4]);
            assert_eq!(dump.variable("Var"), Some(&vec![0, 0, 0, 7]));
        }

        // More modifications, check contents
        let mut dbtx = storage.start_transaction().unwrap();
        dbtx.delete(&DB1, &42).unwrap();
        dbtx.put(&DB2, &22, &vec![1, 2]).unwrap();
        dbtx.delete_variable(&VAR).unwrap();
        dbtx.commit().unwrap();

        {
            let dump = storage.dump_raw().unwrap();
            assert_eq!(dump.column("Db1").unwrap().len(), 0);
            let db2 = dump.column("Db2").unwrap();
            assert_eq!(db2.len(), 2);
            assert_eq!(db2[[0, 21].as_ref()], vec![1, 2, 3, 4]);
            assert_eq!(db2[[0, 22].as_ref()], vec![1, 2]);
            assert_eq!(dump.variable("Var"), None);
        }
    }
}
