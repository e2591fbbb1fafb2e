//! Memoizing feature cache keyed by shallow identity.
//!
//! Keys combine the raster context identity, the mark snapshot stamps, and
//! the feature slot; they never compare pixel data or mark geometry. The
//! correctness of this policy rests on the mark immutability invariant: a
//! mark snapshot is never mutated in place while cached entries referencing
//! its stamp exist.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mpp_core::MppError;
use mpp_image::{ChannelStack, StackId};
use mpp_model::{Mark, MarkStamp};

use crate::features::{PairwiseFeature, UnaryFeature};

/// Position of a feature within its owning energy scheme.
///
/// Features are trait objects without intrinsic identity, so the scheme's
/// term index stands in for them in cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureSlot(pub usize);

/// Shallow identity key for one cached evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FeatureKey {
    stack: StackId,
    primary: MarkStamp,
    secondary: Option<MarkStamp>,
    slot: FeatureSlot,
}

impl FeatureKey {
    fn unary(stack: StackId, mark: MarkStamp, slot: FeatureSlot) -> Self {
        Self {
            stack,
            primary: mark,
            secondary: None,
            slot,
        }
    }

    /// Pair keys are normalized to unordered form by sorting the stamps.
    fn pairwise(stack: StackId, a: MarkStamp, b: MarkStamp, slot: FeatureSlot) -> Self {
        let (primary, secondary) = if a <= b { (a, b) } else { (b, a) };
        Self {
            stack,
            primary,
            secondary: Some(secondary),
            slot,
        }
    }
}

type CacheCell = Arc<OnceLock<Result<f64, MppError>>>;

/// Concurrent memoizing cache for feature evaluations.
///
/// At most one computation runs per distinct key for the lifetime of the
/// owning raster context, however many threads request it: each key owns a
/// `OnceLock` cell, and the map lock is held only long enough to hand the
/// cell out, never across a computation. Errors are memoized like values so
/// the at-most-one-computation guarantee also holds on the failure path.
#[derive(Debug, Default)]
pub struct FeatureCache {
    cells: Mutex<HashMap<FeatureKey, CacheCell>>,
    computations: AtomicUsize,
}

impl FeatureCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates a unary feature through the cache.
    pub fn evaluate_unary(
        &self,
        slot: FeatureSlot,
        feature: &dyn UnaryFeature,
        mark: &Mark,
        stack: &ChannelStack,
    ) -> Result<f64, MppError> {
        let key = FeatureKey::unary(stack.id(), mark.stamp(), slot);
        self.get_or_compute(key, || feature.evaluate(mark, stack))
    }

    /// Evaluates a pairwise feature through the cache.
    pub fn evaluate_pairwise(
        &self,
        slot: FeatureSlot,
        feature: &dyn PairwiseFeature,
        a: &Mark,
        b: &Mark,
        stack: &ChannelStack,
    ) -> Result<f64, MppError> {
        let key = FeatureKey::pairwise(stack.id(), a.stamp(), b.stamp(), slot);
        self.get_or_compute(key, || feature.evaluate(a, b, stack))
    }

    fn get_or_compute(
        &self,
        key: FeatureKey,
        compute: impl FnOnce() -> Result<f64, MppError>,
    ) -> Result<f64, MppError> {
        let cell = {
            let mut cells = self.lock_cells();
            cells.entry(key).or_default().clone()
        };
        cell.get_or_init(|| {
            self.computations.fetch_add(1, Ordering::Relaxed);
            compute()
        })
        .clone()
    }

    /// Number of underlying computations performed so far (instrumentation
    /// for locality and memoization checks).
    pub fn computation_count(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock_cells().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock_cells().is_empty()
    }

    /// Evicts every entry; used under memory pressure between runs.
    pub fn clear(&self) {
        self.lock_cells().clear();
    }

    fn lock_cells(&self) -> MutexGuard<'_, HashMap<FeatureKey, CacheCell>> {
        // A poisoned lock only means another thread panicked while holding
        // the guard; the map itself stays usable.
        match self.cells.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
