//! Rebalancing traits.

use std::collections::HashMap;

use crate::overlays::Overlay;

/// Strategy seam for computing a proposal's after-weights.
///
/// The shipped [`IdentityAllocator`] copies the before-weights unchanged — a
/// placeholder policy. A production embedder supplies an allocator that
/// shifts weights toward the active overlays' target allocations.
pub trait WeightAllocator: Send + Sync {
    fn allocate(
        &self,
        before: &HashMap<String, f64>,
        active_overlays: &[Overlay],
    ) -> HashMap<String, f64>;
}

/// Placeholder allocator: after-weights mirror before-weights.
#[derive(Clone, Copy, Default)]
pub struct IdentityAllocator;

impl WeightAllocator for IdentityAllocator {
    fn allocate(
        &self,
        before: &HashMap<String, f64>,
        _active_overlays: &[Overlay],
    ) -> HashMap<String, f64> {
        before.clone()
    }
}
