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

//! Storage backend wrapper that makes selected operations fail at random.
//!
//! Used to exercise error paths of code built on top of the storage. The faults are injected
//! before the wrapped backend is touched, so a failed batch never reaches the inner store.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex, PoisonError,
};

use enumflags2::{bitflags, BitFlags};
use logging::log;
use storage_core::{
    backend::{Backend, BackendImpl, ReadOps, WriteOps},
    error::Recoverable,
    util::fmt_key,
    Data, KeyRange, WriteBatch,
};
use test_utils::random::{make_seedable_rng, ChaChaRng, Rng, Seed};

/// Operations that can be made to fail
#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FailOp {
    /// Point lookup
    Get = 0b0000_0001,
    /// Creation of a range iterator
    IterStart = 0b0000_0010,
    /// Each step of a range iterator
    IterStep = 0b0000_0100,
    /// Last entry lookup
    LastInRange = 0b0000_1000,
    /// Batch write
    ApplyBatch = 0b0001_0000,
}

/// Shared handle to turn the fault injection on and off and to inspect how many faults were
/// injected. Stays usable after the backend has been moved into its owner.
#[derive(Clone, Debug)]
pub struct FailureControl {
    armed: Arc<AtomicBool>,
    injected: Arc<AtomicUsize>,
}

impl FailureControl {
    fn new(armed: bool) -> Self {
        Self {
            armed: Arc::new(AtomicBool::new(armed)),
            injected: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn arm(&self) {
        self.armed.store(true, Ordering::Release)
    }

    pub fn disarm(&self) {
        self.armed.store(false, Ordering::Release)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Number of faults injected so far
    pub fn injected(&self) -> usize {
        self.injected.load(Ordering::Acquire)
    }
}

#[derive(Clone, Debug)]
pub struct FailureConfig {
    ops: BitFlags<FailOp>,
    probability: f64,
    seed: u64,
    error: storage_core::Error,
    control: FailureControl,
}

impl FailureConfig {
    /// Fail operations in `ops`, each with given probability. Probabilities outside of `[0, 1]`
    /// are clamped.
    pub fn new(ops: impl Into<BitFlags<FailOp>>, probability: f64, seed: u64) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self {
            ops: ops.into(),
            probability,
            seed,
            error: Recoverable::TemporarilyUnavailable.into(),
            control: FailureControl::new(true),
        }
    }

    /// Configuration that never injects anything
    pub fn none() -> Self {
        Self::new(BitFlags::empty(), 0.0, 0)
    }

    /// Error to report for injected faults
    pub fn with_error(mut self, error: impl Into<storage_core::Error>) -> Self {
        self.error = error.into();
        self
    }

    /// Start with the fault injection turned off, see [FailureControl::arm]
    pub fn disarmed(self) -> Self {
        self.control.disarm();
        self
    }

    pub fn control(&self) -> FailureControl {
        self.control.clone()
    }
}

/// Backend wrapping another backend and injecting faults into it
pub struct Failing<B> {
    inner: B,
    config: FailureConfig,
}

impl<B: Backend> Failing<B> {
    pub fn new(inner: B, config: FailureConfig) -> Self {
        Self { inner, config }
    }

    pub fn control(&self) -> FailureControl {
        self.config.control()
    }
}

impl<B: Backend> Backend for Failing<B> {
    type Impl = FailingImpl<B::Impl>;

    fn open(self) -> storage_core::Result<Self::Impl> {
        let inner = self.inner.open()?;
        let rng = make_seedable_rng(Seed::from_u64(self.config.seed));
        log::debug!(
            "Injecting faults into {:?} with probability {}",
            self.config.ops,
            self.config.probability
        );
        Ok(FailingImpl {
            inner,
            injector: Injector {
                config: self.config,
                rng: Mutex::new(rng),
            },
        })
    }
}

struct Injector {
    config: FailureConfig,
    rng: Mutex<ChaChaRng>,
}

impl Injector {
    fn check(&self, op: FailOp) -> storage_core::Result<()> {
        let config = &self.config;
        if !config.ops.contains(op) || !config.control.is_armed() {
            return Ok(());
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        if rng.gen_bool(config.probability) {
            config.control.injected.fetch_add(1, Ordering::AcqRel);
            log::debug!("Injecting failure into {op:?}: {}", config.error);
            return Err(config.error.clone());
        }
        Ok(())
    }
}

pub struct FailingImpl<I> {
    inner: I,
    injector: Injector,
}

impl<I> FailingImpl<I> {
    pub fn control(&self) -> FailureControl {
        self.injector.config.control()
    }
}

impl<I: ReadOps> ReadOps for FailingImpl<I> {
    fn get(&self, key: &[u8]) -> storage_core::Result<Option<Data>> {
        self.injector
            .check(FailOp::Get)
            .inspect_err(|_| log::trace!("Lookup of key {} failed", fmt_key(key)))?;
        self.inner.get(key)
    }

    fn range_iter(
        &self,
        range: KeyRange,
    ) -> storage_core::Result<impl Iterator<Item = storage_core::Result<(Data, Data)>> + '_> {
        self.injector.check(FailOp::IterStart)?;
        let injector = &self.injector;
        let inner = self.inner.range_iter(range)?;
        Ok(inner.map(move |item| -> storage_core::Result<(Data, Data)> {
            injector.check(FailOp::IterStep)?;
            item
        }))
    }

    fn last_in_range(&self, range: KeyRange) -> storage_core::Result<Option<(Data, Data)>> {
        self.injector.check(FailOp::LastInRange)?;
        self.inner.last_in_range(range)
    }
}

impl<I: WriteOps> WriteOps for FailingImpl<I> {
    fn apply_batch(&self, batch: WriteBatch) -> storage_core::Result<()> {
        self.injector.check(FailOp::ApplyBatch)?;
        self.inner.apply_batch(batch)
    }
}

impl<I: BackendImpl> BackendImpl for FailingImpl<I> {
    fn close(&self) -> storage_core::Result<()> {
        self.inner.close()
    }
}
