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

pub mod random;
pub mod test_dir;

use random::Rng;

/// Random byte string with length picked from given range
pub fn random_bytes(rng: &mut impl Rng, len: std::ops::Range<usize>) -> Vec<u8> {
    if len.is_empty() {
        return Vec::new();
    }
    let len = rng.gen_range(len);
    (0..len).map(|_| rng.gen::<u8>()).collect()
}

pub fn gen_different_value<T, G>(orig_val: &T, mut gen: G) -> T
where
    T: Eq,
    G: FnMut() -> T,
{
    for _ in 0..1000 {
        let val = gen();

        if val != *orig_val {
            return val;
        }
    }

    panic!("Failed to generate a value");
}

#[macro_export]
macro_rules! assert_matches_return_val {
    ($in:expr, $pattern:pat $(if $guard:expr)?, $out:expr) => {
        {
            let to_match = $in;
            match to_match {
                $pattern $(if $guard)? => $out,
                _ => {
                    panic!(
                        "Assertion failed: expression {:?} doesn't match pattern {}",
                        to_match,
                        stringify!($pattern)
                    )
                }
            }
        }
    };
}

#[macro_export]
macro_rules! assert_matches {
    ($in:expr, $pattern:pat $(if $guard:expr)?) => {
        $crate::assert_matches_return_val!($in, $pattern $(if $guard)?, ())
    };
}
