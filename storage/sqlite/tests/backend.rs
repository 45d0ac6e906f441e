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

use std::sync::atomic::{AtomicUsize, Ordering};

use storage_sqlite::Sqlite;
use test_utils::test_dir::TestDir;

fn main() {
    let test_dir = TestDir::new("storage-sqlite-backend-").expect("test dir to be created");
    let dir = test_dir.path().to_path_buf();
    let counter = AtomicUsize::new(0);

    // Each test gets a database file of its own. The small page size makes iterators fetch
    // several pages even for short ranges.
    let backend_fn = move || {
        let n = counter.fetch_add(1, Ordering::Relaxed);
        Sqlite::new(dir.join(format!("db-{n:05}.sqlite"))).with_iter_page_size(3)
    };

    let result = storage_backend_test_suite::main(backend_fn);
    drop(test_dir);
    result.exit()
}
