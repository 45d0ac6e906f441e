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

use storage_failing::{Failing, FailureConfig};

fn main() {
    // The wrapper must behave like the wrapped backend as long as no faults are injected
    let result = storage_backend_test_suite::main(|| {
        Failing::new(storage_inmemory::InMemory::new(), FailureConfig::none())
    });
    result.exit()
}
