use std::collections::VecDeque;

use tracing::trace;

use crate::collision::{BroadPhase, CollisionPair, ProxyId};
use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::math::{Aabb, Vector2};
use crate::Result;

/// Default fat-AABB margin
pub const DEFAULT_MARGIN: f32 = 2.0;

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf {
        body: BodyHandle,
        /// Tight bounds as last reported for the body
        aabb: Aabb,
    },
    Branch {
        children: [usize; 2],
        /// Set once the pairs between the two subtrees were gathered this pass
        children_crossed: bool,
    },
    Free,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<usize>,
    /// Leaf: tight bounds grown by the margin. Branch: union of the children.
    fat: Aabb,
    kind: NodeKind,
}

/// Incremental dynamic AABB tree.
///
/// Every leaf holds one body. Leaves are only reinserted once the body's
/// tight bounds leave their fat box, so slowly moving bodies cost nothing per
/// step. Leaf node indices never change while the body is registered and
/// double as [`ProxyId`]s.
#[derive(Debug, Clone)]
pub struct AabbTree {
    nodes: Vec<Node>,
    free: Vec<usize>,
    root: Option<usize>,
    margin: f32,
    proxy_count: usize,
    pairs: Vec<CollisionPair>,
}

impl AabbTree {
    pub fn new(margin: f32) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            margin,
            proxy_count: 0,
            pairs: Vec::new(),
        }
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    /// Number of live nodes (leaves and branches)
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of edges on the longest root-to-leaf path; zero for a single leaf
    pub fn height(&self) -> usize {
        let mut height = 0;
        self.visit_nodes(&mut |_, depth| height = height.max(depth));
        height
    }

    /// Fat bounds of a registered proxy
    pub fn fat_aabb(&self, proxy: ProxyId) -> Option<Aabb> {
        self.leaf(proxy.0).map(|_| self.nodes[proxy.0].fat)
    }

    /// Verifies the structural invariants of the tree.
    ///
    /// Fat-box containment is only guaranteed right after [`BroadPhase::update`].
    pub fn check_invariants(&self) -> Result<()> {
        let fail = |message: String| Err(PhysicsError::InternalError(message));

        let root = match self.root {
            Some(root) => root,
            None if self.proxy_count == 0 => return Ok(()),
            None => return fail(format!("empty tree reports {} proxies", self.proxy_count)),
        };
        if self.nodes[root].parent.is_some() {
            return fail(format!("root {} has a parent", root));
        }

        let mut leaves = 0;
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            match node.kind {
                NodeKind::Free => return fail(format!("free node {} is reachable", index)),
                NodeKind::Leaf { aabb, .. } => {
                    leaves += 1;
                    if !node.fat.contains(&aabb) {
                        return fail(format!("leaf {} escaped its fat box", index));
                    }
                }
                NodeKind::Branch { children, .. } => {
                    for child in children {
                        if self.nodes[child].parent != Some(index) {
                            return fail(format!("node {} does not point back to parent {}", child, index));
                        }
                        stack.push(child);
                    }
                    let union = self.nodes[children[0]].fat.union(&self.nodes[children[1]].fat);
                    if union != node.fat {
                        return fail(format!("branch {} is not the union of its children", index));
                    }
                }
            }
        }
        if leaves != self.proxy_count {
            return fail(format!("{} reachable leaves but {} proxies", leaves, self.proxy_count));
        }
        Ok(())
    }

    fn leaf(&self, index: usize) -> Option<(BodyHandle, Aabb)> {
        match self.nodes.get(index).map(|node| node.kind) {
            Some(NodeKind::Leaf { body, aabb }) => Some((body, aabb)),
            _ => None,
        }
    }

    fn allocate(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = node;
                index
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) {
        self.nodes[index].kind = NodeKind::Free;
        self.nodes[index].parent = None;
        self.free.push(index);
    }

    fn children(&self, index: usize) -> Option<[usize; 2]> {
        match self.nodes[index].kind {
            NodeKind::Branch { children, .. } => Some(children),
            _ => None,
        }
    }

    fn insert_leaf(&mut self, leaf: usize) {
        let new_root = match self.root {
            None => leaf,
            Some(root) => self.insert_at(root, leaf),
        };
        self.nodes[new_root].parent = None;
        self.root = Some(new_root);
    }

    /// Inserts `leaf` below `index`, returning the subtree's new root
    fn insert_at(&mut self, index: usize, leaf: usize) -> usize {
        let leaf_fat = self.nodes[leaf].fat;
        let Some(children) = self.children(index) else {
            // splitting a leaf: a new branch takes its place
            let branch = self.allocate(Node {
                parent: self.nodes[index].parent,
                fat: self.nodes[index].fat.union(&leaf_fat),
                kind: NodeKind::Branch {
                    children: [index, leaf],
                    children_crossed: false,
                },
            });
            self.nodes[index].parent = Some(branch);
            self.nodes[leaf].parent = Some(branch);
            return branch;
        };

        let cost = |node: &Node| node.fat.union(&leaf_fat).perimeter() - node.fat.perimeter();
        let slot = if cost(&self.nodes[children[0]]) < cost(&self.nodes[children[1]]) { 0 } else { 1 };

        let replacement = self.insert_at(children[slot], leaf);
        self.nodes[replacement].parent = Some(index);
        if let NodeKind::Branch { children, .. } = &mut self.nodes[index].kind {
            children[slot] = replacement;
        }
        self.refit(index);
        index
    }

    /// Unlinks a leaf from the tree without freeing it
    fn detach_leaf(&mut self, leaf: usize) {
        let Some(parent) = self.nodes[leaf].parent else {
            self.root = None;
            return;
        };
        let Some(children) = self.children(parent) else {
            return;
        };
        let sibling = if children[0] == leaf { children[1] } else { children[0] };
        let grandparent = self.nodes[parent].parent;

        self.nodes[sibling].parent = grandparent;
        match grandparent {
            None => self.root = Some(sibling),
            Some(grandparent) => {
                if let NodeKind::Branch { children, .. } = &mut self.nodes[grandparent].kind {
                    for child in children.iter_mut() {
                        if *child == parent {
                            *child = sibling;
                        }
                    }
                }
            }
        }
        self.release(parent);
        self.nodes[leaf].parent = None;

        let mut cursor = grandparent;
        while let Some(index) = cursor {
            self.refit(index);
            cursor = self.nodes[index].parent;
        }
    }

    fn refit(&mut self, index: usize) {
        if let Some([a, b]) = self.children(index) {
            self.nodes[index].fat = self.nodes[a].fat.union(&self.nodes[b].fat);
        }
    }

    fn cross_children(&mut self, index: usize) {
        if let NodeKind::Branch { children, children_crossed } = &mut self.nodes[index].kind {
            if *children_crossed {
                return;
            }
            *children_crossed = true;
            let [a, b] = *children;
            self.collect_pairs(a, b);
        }
    }

    /// Gathers leaf pairs with one leaf under `a` and the other under `b`
    fn collect_pairs(&mut self, a: usize, b: usize) {
        let (kind_a, kind_b) = (self.nodes[a].kind, self.nodes[b].kind);
        if let (NodeKind::Leaf { body: body_a, aabb: aabb_a }, NodeKind::Leaf { body: body_b, aabb: aabb_b }) = (kind_a, kind_b) {
            if aabb_a.intersects(&aabb_b) {
                self.pairs.push(CollisionPair::new(body_a, body_b));
            }
            return;
        }

        // pairs inside each subtree are gathered regardless of overlap
        self.cross_children(a);
        self.cross_children(b);
        if !self.nodes[a].fat.intersects(&self.nodes[b].fat) {
            return;
        }

        match (self.children(a), self.children(b)) {
            (Some([a0, a1]), Some([b0, b1])) => {
                self.collect_pairs(a0, b0);
                self.collect_pairs(a0, b1);
                self.collect_pairs(a1, b0);
                self.collect_pairs(a1, b1);
            }
            (Some([a0, a1]), None) => {
                self.collect_pairs(a0, b);
                self.collect_pairs(a1, b);
            }
            (None, Some([b0, b1])) => {
                self.collect_pairs(a, b0);
                self.collect_pairs(a, b1);
            }
            (None, None) => {}
        }
    }
}

impl Default for AabbTree {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN)
    }
}

impl BroadPhase for AabbTree {
    fn add(&mut self, body: BodyHandle, aabb: Aabb) -> ProxyId {
        let leaf = self.allocate(Node {
            parent: None,
            fat: aabb.expand(self.margin),
            kind: NodeKind::Leaf { body, aabb },
        });
        self.insert_leaf(leaf);
        self.proxy_count += 1;
        ProxyId(leaf)
    }

    fn remove(&mut self, proxy: ProxyId) {
        if self.leaf(proxy.0).is_none() {
            return;
        }
        self.detach_leaf(proxy.0);
        self.release(proxy.0);
        self.proxy_count -= 1;
    }

    fn set_aabb(&mut self, proxy: ProxyId, aabb: Aabb) {
        if let Some(Node { kind: NodeKind::Leaf { aabb: stored, .. }, .. }) = self.nodes.get_mut(proxy.0) {
            *stored = aabb;
        }
    }

    fn update(&mut self) {
        let Some(root) = self.root else {
            return;
        };

        if let Some((_, aabb)) = self.leaf(root) {
            if !self.nodes[root].fat.contains(&aabb) {
                self.nodes[root].fat = aabb.expand(self.margin);
            }
            return;
        }

        let escaped: Vec<(usize, Aabb)> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| match node.kind {
                NodeKind::Leaf { aabb, .. } if !node.fat.contains(&aabb) => Some((index, aabb)),
                _ => None,
            })
            .collect();

        if !escaped.is_empty() {
            trace!(count = escaped.len(), "reinserting escaped leaves");
        }
        for (leaf, aabb) in escaped {
            self.detach_leaf(leaf);
            self.nodes[leaf].fat = aabb.expand(self.margin);
            self.insert_leaf(leaf);
        }
    }

    fn compute_pairs(&mut self) -> &[CollisionPair] {
        self.pairs.clear();
        for node in &mut self.nodes {
            if let NodeKind::Branch { children_crossed, .. } = &mut node.kind {
                *children_crossed = false;
            }
        }
        if let Some(root) = self.root {
            self.cross_children(root);
        }
        &self.pairs
    }

    fn pick(&self, point: &Vector2) -> Option<BodyHandle> {
        let mut queue: VecDeque<usize> = self.root.into_iter().collect();
        while let Some(index) = queue.pop_front() {
            let node = &self.nodes[index];
            if !node.fat.contains_point(point) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { body, aabb } if aabb.contains_point(point) => return Some(body),
                NodeKind::Branch { children, .. } => queue.extend(children),
                _ => {}
            }
        }
        None
    }

    fn query(&self, aabb: &Aabb) -> Vec<BodyHandle> {
        let mut found = Vec::new();
        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.fat.intersects(aabb) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { body, aabb: tight } if tight.intersects(aabb) => found.push(body),
                NodeKind::Branch { children, .. } => stack.extend(children),
                _ => {}
            }
        }
        found
    }

    fn proxy_count(&self) -> usize {
        self.proxy_count
    }

    fn visit_nodes(&self, visitor: &mut dyn FnMut(&Aabb, usize)) {
        let mut stack: Vec<(usize, usize)> = self.root.map(|root| (root, 0)).into_iter().collect();
        while let Some((index, depth)) = stack.pop() {
            let node = &self.nodes[index];
            visitor(&node.fat, depth);
            if let NodeKind::Branch { children, .. } = node.kind {
                stack.push((children[1], depth + 1));
                stack.push((children[0], depth + 1));
            }
        }
    }

    fn name(&self) -> &'static str {
        "aabb-tree"
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
    fn single_leaf_is_root() {
        let mut tree = AabbTree::new(2.0);
        let proxy = tree.add(handle(0), unit_box(0.0, 0.0));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.fat_aabb(proxy), Some(unit_box(0.0, 0.0).expand(2.0)));
        assert!(tree.check_invariants().is_ok());
        assert!(tree.compute_pairs().is_empty());
    }

    #[test]
    fn pairs_only_for_tight_overlap() {
        let mut tree = AabbTree::new(2.0);
        tree.add(handle(0), unit_box(0.0, 0.0));
        tree.add(handle(1), unit_box(0.5, 0.5));
        // fat boxes overlap, tight ones do not
        tree.add(handle(2), unit_box(2.5, 0.0));
        let pairs = tree.compute_pairs().to_vec();
        assert_eq!(pairs, vec![CollisionPair::new(handle(0), handle(1))]);
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn proxy_survives_reinsertion() {
        let mut tree = AabbTree::new(0.5);
        let a = tree.add(handle(0), unit_box(0.0, 0.0));
        tree.add(handle(1), unit_box(10.0, 0.0));
        tree.add(handle(2), unit_box(20.0, 0.0));

        tree.set_aabb(a, unit_box(19.5, 0.0));
        tree.update();
        assert!(tree.check_invariants().is_ok());
        assert_eq!(tree.fat_aabb(a), Some(unit_box(19.5, 0.0).expand(0.5)));
        assert_eq!(tree.compute_pairs().to_vec(), vec![CollisionPair::new(handle(0), handle(2))]);
    }

    #[test]
    fn small_moves_keep_the_fat_box() {
        let mut tree = AabbTree::new(2.0);
        let a = tree.add(handle(0), unit_box(0.0, 0.0));
        tree.add(handle(1), unit_box(5.0, 5.0));
        tree.set_aabb(a, unit_box(1.0, 0.0));
        tree.update();
        assert_eq!(tree.fat_aabb(a), Some(unit_box(0.0, 0.0).expand(2.0)));
    }

    #[test]
    fn remove_collapses_parent() {
        let mut tree = AabbTree::new(1.0);
        let a = tree.add(handle(0), unit_box(0.0, 0.0));
        let b = tree.add(handle(1), unit_box(3.0, 0.0));
        let c = tree.add(handle(2), unit_box(6.0, 0.0));
        assert_eq!(tree.node_count(), 5);

        tree.remove(b);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.proxy_count(), 2);
        assert!(tree.check_invariants().is_ok());

        tree.remove(a);
        tree.remove(c);
        assert_eq!(tree.node_count(), 0);
        assert!(tree.check_invariants().is_ok());
        assert_eq!(tree.pick(&Vector2::new(0.5, 0.5)), None);
    }

    #[test]
    fn pick_and_query_use_tight_bounds() {
        let mut tree = AabbTree::new(2.0);
        tree.add(handle(0), unit_box(0.0, 0.0));
        tree.add(handle(1), unit_box(4.0, 0.0));
        assert_eq!(tree.pick(&Vector2::new(4.5, 0.5)), Some(handle(1)));
        assert_eq!(tree.pick(&Vector2::new(2.5, 0.5)), None);

        let mut hits = tree.query(&Aabb::new(Vector2::new(0.5, 0.5), Vector2::new(4.2, 0.6)));
        hits.sort();
        assert_eq!(hits, vec![handle(0), handle(1)]);
    }

    #[test]
    fn visit_reports_depths() {
        let mut tree = AabbTree::new(1.0);
        for i in 0..4 {
            tree.add(handle(i), unit_box(i as f32 * 3.0, 0.0));
        }
        let mut visited = Vec::new();
        tree.visit_nodes(&mut |_, depth| visited.push(depth));
        assert_eq!(visited.len(), tree.node_count());
        assert_eq!(visited[0], 0);
        assert!(tree.height() >= 2);
    }
}
