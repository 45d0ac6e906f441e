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

pub use rand::{self, Rng, RngCore, SeedableRng};
pub use rand_chacha::ChaChaRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed(pub u64);

impl Seed {
    pub fn from_entropy() -> Self {
        Seed(rand::random::<u64>())
    }

    pub fn from_u64(v: u64) -> Self {
        Seed(v)
    }
}

#[must_use]
pub fn make_seedable_rng(seed: Seed) -> ChaChaRng {
    ChaChaRng::seed_from_u64(seed.0)
}

#[macro_export]
macro_rules! make_seedable_rng {
    ($seed:expr) => {{
        println!(
            "{}:{} Using seed '{}' for the PRNG",
            file!(),
            line!(),
            $seed.0
        );
        make_seedable_rng($seed)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut rng1 = make_seedable_rng(Seed::from_u64(42));
        let mut rng2 = make_seedable_rng(Seed::from_u64(42));
        let a: Vec<u64> = (0..8).map(|_| rng1.gen()).collect();
        let b: Vec<u64> = (0..8).map(|_| rng2.gen()).collect();
        assert_eq!(a, b);
    }
}
