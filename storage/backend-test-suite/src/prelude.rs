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

// Re-export a bunch of often used items
pub use crate::model::{ApplyActions, Model};
pub use storage_core::{
    backend::{Backend, BackendImpl, ReadOps, WriteOps},
    Data, KeyRange, Namespace, WriteBatch, WriteOp,
};

pub use std::{mem::drop, sync::Arc, thread};

/// A function to construct a backend
pub trait BackendFn<B>: Fn() -> B + Send + Sync + 'static {}
impl<B, F: Fn() -> B + Send + Sync + 'static> BackendFn<B> for F {}

/// A couple of namespace constants
pub const NS: (Namespace, Namespace) = (Namespace::Column(0), Namespace::Column(1));

/// Open a fresh backend instance
pub fn open<B: Backend, F: BackendFn<B>>(backend_fn: &F) -> B::Impl {
    backend_fn().open().expect("db open to succeed")
}

/// Apply a batch consisting of puts only
pub fn put_all<'a, S: WriteOps>(
    store: &S,
    entries: impl IntoIterator<Item = (&'a [u8], &'a [u8])>,
) {
    let batch = entries.into_iter().map(|(k, v)| WriteOp::Put(k.to_vec(), v.to_vec())).collect();
    store.apply_batch(batch).expect("batch to succeed");
}

/// Collect all entries in the range, panicking on errors
pub fn collect_range<S: ReadOps>(store: &S, range: KeyRange) -> Vec<(Data, Data)> {
    store
        .range_iter(range)
        .expect("iterator to be created")
        .collect::<storage_core::Result<Vec<_>>>()
        .expect("iteration to succeed")
}

/// Run tests with backend using proptest
pub fn using_proptest<B: Backend, F: BackendFn<B>, S: proptest::prelude::Strategy>(
    source_file: &'static str,
    backend_fn: impl std::ops::Deref<Target = F>,
    strategy: S,
    test: impl Fn(B, S::Value),
) {
    let config = {
        let mut config = proptest::prelude::ProptestConfig::with_source_file(source_file);
        // Decrease the number of test cases. By default, this is 256 / 8 = 32.
        config.cases /= 8;
        config
    };
    let mut runner = proptest::test_runner::TestRunner::new(config);
    let result = runner.run(&strategy, |val| {
        test(backend_fn(), val);
        Ok(())
    });
    result.unwrap_or_else(|e| panic!("{}{}", &e, &runner))
}

/// Test helper function not exported with the prelude
pub mod support {
    use super::*;
    use libtest_mimic::Trial;

    /// Create the test list
    pub fn create_tests<B: Backend + 'static, F: BackendFn<B>>(
        backend_fn: Arc<F>,
        tests: impl IntoIterator<Item = (&'static str, fn(Arc<F>))>,
    ) -> impl Iterator<Item = Trial> {
        tests.into_iter().map(move |(name, test)| {
            let backend_fn = Arc::clone(&backend_fn);
            let test_fn = move || {
                test(backend_fn);
                Ok(())
            };
            Trial::test(name, test_fn)
        })
    }
}

macro_rules! tests {
    ($($name:path),* $(,)?) => {
        pub fn tests<B: $crate::prelude::Backend + 'static, F: $crate::prelude::BackendFn<B>>(
            backend_fn: Arc<F>,
        ) -> impl std::iter::Iterator<Item = libtest_mimic::Trial> {
            $crate::prelude::support::create_tests(backend_fn, [
                $((concat!(module_path!(), "::", stringify!($name)), $name as fn(Arc<F>)),)*
            ])
        }
    }
}
