use crate::collision::AabbTree;
use crate::core::{BodyHandle, BroadPhaseKind};
use crate::math::{Aabb, Vector2};

/// Identifier of a body's registration inside a broad phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyId(pub(crate) usize);

/// Two bodies with overlapping bounds, lower handle first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
}

impl CollisionPair {
    pub fn new(first: BodyHandle, second: BodyHandle) -> Self {
        let (body_a, body_b) = if first <= second { (first, second) } else { (second, first) };
        Self { body_a, body_b }
    }
}

/// Trait for broad-phase collision detection algorithms.
///
/// A broad phase tracks one tight AABB per body and reports every pair of
/// bodies whose tight AABBs overlap. It may report extra pairs; it must never
/// miss an overlapping one.
pub trait BroadPhase: Send + Sync {
    /// Registers a body with its current tight bounds
    fn add(&mut self, body: BodyHandle, aabb: Aabb) -> ProxyId;

    /// Unregisters a proxy; unknown ids are ignored
    fn remove(&mut self, proxy: ProxyId);

    /// Stores a body's new tight bounds. Takes effect on the next [`BroadPhase::update`].
    fn set_aabb(&mut self, proxy: ProxyId, aabb: Aabb);

    /// Restructures internal data after bounds have changed
    fn update(&mut self);

    /// Recomputes and returns the overlapping pairs
    fn compute_pairs(&mut self) -> &[CollisionPair];

    /// A body whose tight bounds contain `point`, if any
    fn pick(&self, point: &Vector2) -> Option<BodyHandle>;

    /// Every body whose tight bounds overlap `aabb`
    fn query(&self, aabb: &Aabb) -> Vec<BodyHandle>;

    /// Number of registered proxies
    fn proxy_count(&self) -> usize;

    /// Visits internal bounding volumes with their depth, root first.
    ///
    /// Flat structures have nothing to report.
    fn visit_nodes(&self, _visitor: &mut dyn FnMut(&Aabb, usize)) {}

    /// Short name used in log output
    fn name(&self) -> &'static str;
}

/// Builds the broad phase selected by a world configuration
pub fn new_broad_phase(kind: BroadPhaseKind, margin: f32) -> Box<dyn BroadPhase> {
    match kind {
        BroadPhaseKind::AabbTree => Box::new(AabbTree::new(margin)),
        BroadPhaseKind::BruteForce => Box::new(BruteForceBroadPhase::new()),
    }
}

/// Simple brute-force broad-phase algorithm
#[derive(Debug, Default)]
pub struct BruteForceBroadPhase {
    proxies: Vec<Option<(BodyHandle, Aabb)>>,
    free: Vec<usize>,
    pairs: Vec<CollisionPair>,
}

impl BruteForceBroadPhase {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self) -> impl Iterator<Item = &(BodyHandle, Aabb)> {
        self.proxies.iter().flatten()
    }
}

impl BroadPhase for BruteForceBroadPhase {
    fn add(&mut self, body: BodyHandle, aabb: Aabb) -> ProxyId {
        match self.free.pop() {
            Some(index) => {
                self.proxies[index] = Some((body, aabb));
                ProxyId(index)
            }
            None => {
                self.proxies.push(Some((body, aabb)));
                ProxyId(self.proxies.len() - 1)
            }
        }
    }

    fn remove(&mut self, proxy: ProxyId) {
        if let Some(slot) = self.proxies.get_mut(proxy.0) {
            if slot.take().is_some() {
                self.free.push(proxy.0);
            }
        }
    }

    fn set_aabb(&mut self, proxy: ProxyId, aabb: Aabb) {
        if let Some(Some((_, stored))) = self.proxies.get_mut(proxy.0) {
            *stored = aabb;
        }
    }

    fn update(&mut self) {}

    fn compute_pairs(&mut self) -> &[CollisionPair] {
        self.pairs.clear();
        let live: Vec<&(BodyHandle, Aabb)> = self.proxies.iter().flatten().collect();
        for (i, (handle_a, aabb_a)) in live.iter().enumerate() {
            for (handle_b, aabb_b) in &live[i + 1..] {
                if aabb_a.intersects(aabb_b) {
                    self.pairs.push(CollisionPair::new(*handle_a, *handle_b));
                }
            }
        }
        &self.pairs
    }

    fn pick(&self, point: &Vector2) -> Option<BodyHandle> {
        self.live()
            .find(|(_, aabb)| aabb.contains_point(point))
            .map(|(handle, _)| *handle)
    }

    fn query(&self, aabb: &Aabb) -> Vec<BodyHandle> {
        self.live()
            .filter(|(_, other)| other.intersects(aabb))
            .map(|(handle, _)| *handle)
            .collect()
    }

    fn proxy_count(&self) -> usize {
        self.live().count()
    }

    fn name(&self) -> &'static str {
        "brute-force"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PoolHandle;

    fn handle(i: u32) -> BodyHandle {
        BodyHandle::from_raw_parts(i, 0)
    }

    fn unit_box(x: f32, y: f32) -> Aabb {
        Aabb::new(Vector2::new(x, y), Vector2::new(x + 1.0, y + 1.0))
    }

    #[test]
    fn pair_orders_handles() {
        let pair = CollisionPair::new(handle(4), handle(1));
        assert_eq!(pair.body_a, handle(1));
        assert_eq!(pair.body_b, handle(4));
        assert_eq!(pair, CollisionPair::new(handle(1), handle(4)));
    }

    #[test]
    fn brute_force_reports_overlaps_only() {
        let mut broad = BruteForceBroadPhase::new();
        broad.add(handle(0), unit_box(0.0, 0.0));
        broad.add(handle(1), unit_box(0.5, 0.5));
        broad.add(handle(2), unit_box(5.0, 5.0));

        assert_eq!(broad.compute_pairs().to_vec(), vec![CollisionPair::new(handle(0), handle(1))]);
    }

    #[test]
    fn removed_slot_is_reused() {
        let mut broad = BruteForceBroadPhase::new();
        let first = broad.add(handle(0), unit_box(0.0, 0.0));
        broad.add(handle(1), unit_box(3.0, 0.0));
        broad.remove(first);
        assert_eq!(broad.proxy_count(), 1);
        assert_eq!(broad.pick(&Vector2::new(0.5, 0.5)), None);

        let reused = broad.add(handle(2), unit_box(0.0, 0.0));
        assert_eq!(reused, first);
        assert_eq!(broad.pick(&Vector2::new(0.5, 0.5)), Some(handle(2)));
    }

    #[test]
    fn factory_honours_kind() {
        assert_eq!(new_broad_phase(BroadPhaseKind::AabbTree, 2.0).name(), "aabb-tree");
        assert_eq!(new_broad_phase(BroadPhaseKind::BruteForce, 2.0).name(), "brute-force");
    }
}
