// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Opt-in cache of spectral decompositions.
//!
//! Entries are bucketed by a structural hash of the matrix (shape, element
//! bit patterns and tolerance) and confirmed by full element equality, so a
//! hash collision can never return the wrong spectrum.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::trace;

use crate::hamiltonian::SpectralAnalysis;
use crate::kernel::Matrix;
use crate::validation::Tolerance;

/// Default bound on cached decompositions.
pub const DEFAULT_CAPACITY: usize = 256;

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

type Bucket = Vec<(Matrix, u64, Arc<SpectralAnalysis>)>;

#[derive(Debug, Default)]
struct Inner {
    buckets: HashMap<u64, Bucket>,
    entries: usize,
    hits: u64,
    misses: u64,
}

/// Thread-safe spectral cache shared between analyzers.
#[derive(Debug)]
pub struct SpectralCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl SpectralCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Cache holding at most `capacity` decompositions. When full, an
    /// arbitrary bucket is evicted.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, h: &Matrix, tol: Tolerance) -> Option<Arc<SpectralAnalysis>> {
        let tol_bits = tol.value().to_bits();
        let key = structural_hash(h, tol_bits);
        let mut inner = self.inner.lock();
        let found = inner.buckets.get(&key).and_then(|bucket| {
            bucket
                .iter()
                .find(|(m, t, _)| *t == tol_bits && m == h)
                .map(|(_, _, a)| Arc::clone(a))
        });
        if found.is_some() {
            inner.hits += 1;
            trace!(key, "Spectral cache hit");
        } else {
            inner.misses += 1;
        }
        found
    }

    pub fn insert(&self, h: &Matrix, tol: Tolerance, analysis: Arc<SpectralAnalysis>) {
        let tol_bits = tol.value().to_bits();
        let key = structural_hash(h, tol_bits);
        let mut inner = self.inner.lock();

        if inner.entries >= self.capacity {
            if let Some(evict) = inner.buckets.keys().next().copied() {
                let removed = inner.buckets.remove(&evict).map_or(0, |b| b.len());
                inner.entries -= removed;
            }
        }

        let bucket = inner.buckets.entry(key).or_default();
        if bucket.iter().any(|(m, t, _)| *t == tol_bits && m == h) {
            return;
        }
        bucket.push((h.clone(), tol_bits, analysis));
        inner.entries += 1;
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.buckets.clear();
        inner.entries = 0;
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.entries,
        }
    }
}

impl Default for SpectralCache {
    fn default() -> Self {
        Self::new()
    }
}

fn structural_hash(m: &Matrix, tol_bits: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    m.shape().hash(&mut hasher);
    tol_bits.hash(&mut hasher);
    for z in m.iter() {
        z.re.to_bits().hash(&mut hasher);
        z.im.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}
