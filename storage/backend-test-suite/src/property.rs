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

//! Randomized property-based tests

use crate::prelude::*;
use proptest::prelude::Strategy;

/// Proptest generators
mod gen {
    pub use proptest::prelude::*;
    use storage_core::{Data, Namespace, WriteOp};

    pub fn namespace(num_columns: u8) -> impl Strategy<Value = Namespace> {
        prop_oneof![
            (0..num_columns).prop_map(Namespace::Column),
            (0..num_columns).prop_map(Namespace::Variable),
        ]
    }

    pub fn entries(
        num_columns: u8,
        num_entries: impl Into<proptest::collection::SizeRange>,
    ) -> impl Strategy<Value = std::collections::BTreeMap<Data, Data>> {
        let full_key = (namespace(num_columns), big_key()).prop_map(|(ns, k)| ns.key(&k));
        proptest::collection::btree_map(full_key, any::<Data>(), num_entries)
    }

    // Generate key from a set of keys with given cardinality. Lower cardinality encourages
    // generation of conflicting keys, causing value overwrites and deletions to be more likely.
    pub fn key(key_cardinality: u32) -> impl Strategy<Value = Data> {
        (0..key_cardinality).prop_map(|x| format!("{x:x}").into())
    }

    // Potentially big arbitrary key
    pub fn big_key() -> impl Strategy<Value = Data> {
        proptest::collection::vec(any::<u8>(), 0..300)
    }

    pub fn action(key_cardinality: u32) -> impl Strategy<Value = WriteOp> {
        prop_oneof![
            (key(key_cardinality), any::<Data>()).prop_map(|(k, v)| WriteOp::Put(k, v)),
            key(key_cardinality).prop_map(WriteOp::Del),
        ]
    }

    pub fn actions(
        key_cardinality: u32,
        count: impl Into<proptest::collection::SizeRange>,
    ) -> impl Strategy<Value = Vec<WriteOp>> {
        proptest::collection::vec(action(key_cardinality), count)
    }
}

fn add_and_delete<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    using_proptest(
        file!(),
        backend_fn,
        gen::entries(4, 0usize..20),
        |backend, entries| {
            let store = backend.open().expect("db open to succeed");

            // Add all entries to the database
            put_all(&store, entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice())));

            // Check all entries have been added
            for (key, val) in &entries {
                assert_eq!(store.get(key).unwrap().as_ref(), Some(val));
            }
            assert_eq!(Model::from_db(&store, KeyRange::full()).inner(), &entries);

            // Remove all entries
            store.apply_actions(entries.keys().map(|k| WriteOp::Del(k.clone())));

            // Check entries no longer present
            for key in entries.keys() {
                assert_eq!(store.get(key), Ok(None));
            }
            assert!(collect_range(&store, KeyRange::full()).is_empty());
        },
    )
}

fn batches_match_model<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    using_proptest(
        file!(),
        backend_fn,
        proptest::collection::vec(gen::actions(20, 0usize..10), 1usize..8),
        |backend, batches| {
            let store = backend.open().expect("db open to succeed");
            let mut model = Model::new();

            for batch in batches {
                let batch: Vec<_> =
                    batch.into_iter().map(|a| a.map_key(|k| NS.0.key(&k))).collect();
                model.extend(batch.clone());
                store.apply_actions(batch);
                assert_eq!(Model::from_db(&store, NS.0.range()), model);
            }
            assert!(collect_range(&store, NS.1.range()).is_empty());
        },
    )
}

fn ranges_match_model<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    using_proptest(
        file!(),
        backend_fn,
        (
            gen::actions(50, 0usize..60),
            gen::key(60),
            gen::key(60),
        ),
        |backend, (actions, from, to)| {
            let store = backend.open().expect("db open to succeed");
            let actions: Vec<_> =
                actions.into_iter().map(|a| a.map_key(|k| NS.1.key(&k))).collect();
            let model = Model::from_actions(actions.clone());
            store.apply_actions(actions);

            let range = NS.1.inclusive_range(&from, &to);
            assert_eq!(collect_range(&store, range.clone()), model.range(&range));

            let range = NS.1.range_up_to(&to);
            assert_eq!(store.last_in_range(range.clone()), Ok(model.last_in_range(&range)));
        },
    )
}

fn big_endian_keys_iterate_in_numeric_order<B: Backend, F: BackendFn<B>>(backend_fn: Arc<F>) {
    using_proptest(
        file!(),
        backend_fn,
        proptest::collection::btree_set(gen::any::<u64>(), 0usize..40),
        |backend, numbers| {
            let store = backend.open().expect("db open to succeed");
            let actions = numbers
                .iter()
                .map(|n| WriteOp::Put(NS.0.key(&n.to_be_bytes()), n.to_le_bytes().to_vec()));
            store.apply_actions(actions);

            let stored: Vec<u64> = collect_range(&store, NS.0.range())
                .into_iter()
                .map(|(_, v)| u64::from_le_bytes(v.try_into().expect("8 bytes")))
                .collect();
            assert_eq!(stored, numbers.into_iter().collect::<Vec<_>>());
        },
    )
}

tests![
    add_and_delete,
    batches_match_model,
    big_endian_keys_iterate_in_numeric_order,
    ranges_match_model,
];
