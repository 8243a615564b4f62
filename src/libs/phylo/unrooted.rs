use super::cost::{dup_events, loss_events, DlCost};
use super::error::ReconError;
use super::node::NodeId;
use super::species::SpeciesTree;
use super::tree::Tree;

/// CornerId is an index into the UnrootedTree's corner vector.
pub type CornerId = usize;

// Memoization stages; backward transitions only via clear().
pub const C_MAP: u8 = 1;
pub const C_SC: u8 = 2;
pub const C_COST: u8 = 4;

// Mark bits, used for reporting only.
pub const MARK_WALK: u8 = 1;
pub const MARK_OPT: u8 = 2;
pub const MARK_START: u8 = 4;
pub const MARK_OPT_MATE: u8 = 8;

/// One orientation of a vertex of the unrooted gene tree.
///
/// A leaf is a single corner. An internal (degree-3) vertex is three
/// corners sharing identity, allocated contiguously from `base`; each
/// corner's `parent` is the neighbor across its outgoing edge, and the
/// other two corners of the vertex are reached by index arithmetic
/// modulo 3 (see [`UnrootedTree::left`] / [`UnrootedTree::right`]).
///
/// The cached mapping and costs depend on which neighbor is treated as
/// "toward the root", which is exactly what a corner encodes.
#[derive(Debug, Clone)]
pub struct Corner {
    pub id: CornerId,

    /// Neighbor across this corner's outgoing edge
    pub parent: Option<CornerId>,

    /// First corner of this vertex's triple; None for leaves
    pub base: Option<CornerId>,

    /// Verbatim label text: the full leaf label, or the ':'-annotation
    /// of an internal vertex
    pub name: Option<String>,

    /// Species label extracted from the leaf label
    pub species: Option<String>,

    /// Base token of the leaf label
    pub gene_id: Option<String>,

    // --- Memo state, reset by clear() ---
    pub(crate) computed: u8,
    pub(crate) mapping: Option<NodeId>,
    pub(crate) sc: DlCost,
    pub(crate) cost: DlCost,
    pub(crate) mark: u8,
}

impl Corner {
    fn new(id: CornerId) -> Self {
        Self {
            id,
            parent: None,
            base: None,
            name: None,
            species: None,
            gene_id: None,
            computed: 0,
            mapping: None,
            sc: DlCost::default(),
            cost: DlCost::default(),
            mark: 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.base.is_none()
    }
}

/// An unrooted binary gene tree backed by an arena of corners.
///
/// The `start` corner designates the current rooting. The structure is
/// immutable after construction; the per-corner memo fields are the only
/// mutable state and are cleared between reconciliations.
#[derive(Debug, Default, Clone)]
pub struct UnrootedTree {
    corners: Vec<Corner>,
    start: Option<CornerId>,
}

impl UnrootedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of corners (three per internal vertex, one per leaf).
    pub fn len(&self) -> usize {
        self.corners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    pub fn corner(&self, id: CornerId) -> &Corner {
        &self.corners[id]
    }

    pub fn corners(&self) -> impl Iterator<Item = &Corner> {
        self.corners.iter()
    }

    pub fn start(&self) -> Option<CornerId> {
        self.start
    }

    pub fn set_start(&mut self, id: CornerId) {
        self.start = Some(id);
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.corners.iter().filter(|c| c.is_leaf()).count()
    }

    /// Add a detached leaf corner. The label's species attribute is
    /// extracted as for rooted leaves.
    pub fn add_leaf(&mut self, label: &str) -> CornerId {
        let id = self.corners.len();
        let mut corner = Corner::new(id);
        let (gene_id, species) = super::parser::split_leaf_label(label);
        corner.name = Some(label.to_string());
        corner.gene_id = Some(gene_id);
        corner.species = Some(species);
        self.corners.push(corner);
        id
    }

    /// Add a degree-3 vertex joining the subtrees hanging from `u1` and
    /// `u2`. Returns the vertex's third corner, whose edge is wired up
    /// by the caller (via another `add_vertex` or [`Self::join`]).
    pub fn add_vertex(&mut self, u1: CornerId, u2: CornerId, name: Option<String>) -> CornerId {
        let base = self.corners.len();
        for i in 0..3 {
            let mut corner = Corner::new(base + i);
            corner.base = Some(base);
            corner.name = name.clone();
            self.corners.push(corner);
        }
        self.corners[base].parent = Some(u1);
        self.corners[u1].parent = Some(base);
        self.corners[base + 1].parent = Some(u2);
        self.corners[u2].parent = Some(base + 1);
        base + 2
    }

    /// Join two free corners by an edge and make `b` the start corner.
    pub fn join(&mut self, a: CornerId, b: CornerId) {
        self.corners[a].parent = Some(b);
        self.corners[b].parent = Some(a);
        self.start = Some(b);
    }

    pub fn is_leaf(&self, id: CornerId) -> bool {
        self.corners[id].is_leaf()
    }

    /// Next corner of the same vertex along the directed 3-cycle.
    pub fn left(&self, id: CornerId) -> CornerId {
        let base = self.corners[id].base.expect("left() on an internal corner");
        base + (id - base + 1) % 3
    }

    /// Previous corner of the same vertex (two steps left).
    pub fn right(&self, id: CornerId) -> CornerId {
        let base = self.corners[id].base.expect("right() on an internal corner");
        base + (id - base + 2) % 3
    }

    /// The two corners of the same vertex seen as children when `id` is
    /// oriented toward the root: the neighbors across the left and right
    /// corners' edges.
    fn child_corners(&self, id: CornerId) -> (CornerId, CornerId) {
        let yl = self.corners[self.left(id)].parent.expect("wired corner");
        let yr = self.corners[self.right(id)].parent.expect("wired corner");
        (yl, yr)
    }

    pub fn mark(&mut self, id: CornerId, bits: u8) {
        self.corners[id].mark |= bits;
    }

    pub fn marked(&self, id: CornerId) -> u8 {
        self.corners[id].mark
    }

    /// Reset all memo flags, cached mappings, and marks. Required
    /// between reconciliations against different species trees.
    pub fn clear(&mut self) {
        for corner in self.corners.iter_mut() {
            corner.computed = 0;
            corner.mapping = None;
            corner.mark = 0;
        }
    }

    /// LCA mapping of the subtree hanging from this corner into the
    /// species tree. Memoized; a leaf maps to the species-tree leaf
    /// carrying its species label.
    pub fn mapping(&mut self, id: CornerId, st: &SpeciesTree) -> Result<NodeId, ReconError> {
        if self.corners[id].computed & C_MAP != 0 {
            return Ok(self.corners[id].mapping.expect("C_MAP set"));
        }

        let mapped = if self.is_leaf(id) {
            let label = self.corners[id].species.clone().unwrap_or_default();
            match st.leaf(&label) {
                Some(leaf) => leaf,
                None => return Err(ReconError::Mapping { label }),
            }
        } else {
            let (yl, yr) = self.child_corners(id);
            let ml = self.mapping(yl, st)?;
            let mr = self.mapping(yr, st)?;
            st.lca(ml, mr)
                .ok_or_else(|| ReconError::Logic("lca of disjoint nodes".to_string()))?
        };

        let corner = &mut self.corners[id];
        corner.mapping = Some(mapped);
        corner.computed |= C_MAP;
        Ok(mapped)
    }

    /// Reconciliation cost of the subtree hanging from this corner.
    pub fn subtree_cost(&mut self, id: CornerId, st: &SpeciesTree) -> Result<DlCost, ReconError> {
        if self.corners[id].computed & C_SC != 0 {
            return Ok(self.corners[id].sc);
        }

        let sc = if self.is_leaf(id) {
            DlCost::default()
        } else {
            let (yl, yr) = self.child_corners(id);
            let m = self.mapping(id, st)?;
            let ml = self.mapping(yl, st)?;
            let mr = self.mapping(yr, st)?;
            let local = DlCost::new(
                dup_events(m, ml, mr),
                loss_events(st.tree(), m, ml, mr),
            );
            self.subtree_cost(yl, st)? + self.subtree_cost(yr, st)? + local
        };

        let corner = &mut self.corners[id];
        corner.sc = sc;
        corner.computed |= C_SC;
        Ok(sc)
    }

    /// Total cost of rooting the tree on the edge incident to this
    /// corner. Symmetric: both corners of an edge report the same cost.
    /// A corner without a parent (single-leaf tree) costs (0,0).
    pub fn edge_cost(&mut self, id: CornerId, st: &SpeciesTree) -> Result<DlCost, ReconError> {
        let Some(p) = self.corners[id].parent else {
            return Ok(DlCost::default());
        };
        if self.corners[id].computed & C_COST != 0 {
            return Ok(self.corners[id].cost);
        }

        let m = self.mapping(id, st)?;
        let mp = self.mapping(p, st)?;
        let s = st
            .lca(m, mp)
            .ok_or_else(|| ReconError::Logic("lca of disjoint nodes".to_string()))?;
        let local = DlCost::new(dup_events(s, m, mp), loss_events(st.tree(), s, m, mp));
        let cost = self.subtree_cost(id, st)? + self.subtree_cost(p, st)? + local;

        let corner = &mut self.corners[id];
        corner.cost = cost;
        corner.computed |= C_COST;
        Ok(cost)
    }

    /// The rooted tree obtained by rooting on the edge incident to
    /// `at`. A corner without a parent yields its own subtree.
    pub fn rooted_at(&self, at: CornerId) -> Tree {
        let mut tree = Tree::new();
        let root = match self.corners[at].parent {
            Some(p) => {
                let root = tree.add_node();
                let a = self.copy_subtree(at, &mut tree);
                let b = self.copy_subtree(p, &mut tree);
                tree.add_child(root, a).expect("fresh nodes");
                tree.add_child(root, b).expect("fresh nodes");
                root
            }
            None => self.copy_subtree(at, &mut tree),
        };
        tree.set_root(root);
        tree.assign_depths();
        tree
    }

    /// The rooted view of just the subtree hanging from `at`.
    pub fn subtree_rooted(&self, at: CornerId) -> Tree {
        let mut tree = Tree::new();
        let root = self.copy_subtree(at, &mut tree);
        tree.set_root(root);
        tree.assign_depths();
        tree
    }

    fn copy_subtree(&self, id: CornerId, tree: &mut Tree) -> NodeId {
        let nid = tree.add_node();
        if self.is_leaf(id) {
            let corner = &self.corners[id];
            let node = tree.node_mut(nid);
            node.name = corner.name.clone();
            node.species = corner.species.clone();
            node.gene_id = corner.gene_id.clone();
        } else {
            let (yl, yr) = self.child_corners(id);
            let a = self.copy_subtree(yl, tree);
            let b = self.copy_subtree(yr, tree);
            tree.add_child(nid, a).expect("fresh nodes");
            tree.add_child(nid, b).expect("fresh nodes");
            tree.node_mut(nid).name = self.corners[id].name.clone();
        }
        nid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::phylo::writer;

    #[test]
    fn test_vertex_wiring() {
        let mut ut = UnrootedTree::new();
        let a = ut.add_leaf("a");
        let b = ut.add_leaf("b");
        let free = ut.add_vertex(a, b, None);
        let c = ut.add_leaf("c");
        ut.join(free, c);

        assert_eq!(ut.leaf_count(), 3);
        assert_eq!(ut.start(), Some(c));

        // edges are mutual
        for corner in ut.corners() {
            let p = corner.parent.unwrap();
            assert_eq!(ut.corner(p).parent, Some(corner.id));
        }

        // three lefts come back around
        let base = ut.corner(free).base.unwrap();
        for id in base..base + 3 {
            assert_eq!(ut.left(ut.left(ut.left(id))), id);
            assert_eq!(ut.right(id), ut.left(ut.left(id)));
        }
    }

    #[test]
    fn test_mapping_invariant() {
        let mut ut = UnrootedTree::from_newick("(a,(b,c))").unwrap();
        let st = crate::libs::phylo::SpeciesTree::from_newick("((a,b),c)").unwrap();

        let internal: Vec<CornerId> = ut
            .corners()
            .filter(|c| !c.is_leaf())
            .map(|c| c.id)
            .collect();
        for id in internal {
            let m = ut.mapping(id, &st).unwrap();
            let yl = ut.corner(ut.left(id)).parent.unwrap();
            let yr = ut.corner(ut.right(id)).parent.unwrap();
            let ml = ut.mapping(yl, &st).unwrap();
            let mr = ut.mapping(yr, &st).unwrap();
            assert_eq!(st.lca(ml, mr), Some(m));
        }

        // leaves map to their species leaf
        let leaves: Vec<CornerId> = ut.corners().filter(|c| c.is_leaf()).map(|c| c.id).collect();
        for id in leaves {
            let m = ut.mapping(id, &st).unwrap();
            let species = ut.corner(id).species.clone().unwrap();
            assert_eq!(st.leaf(&species), Some(m));
        }
    }

    #[test]
    fn test_cost_edge_symmetry() {
        let mut ut = UnrootedTree::from_newick("((a,c),(b,d))").unwrap();
        let st = crate::libs::phylo::SpeciesTree::from_newick("((a,b),(c,d))").unwrap();

        for id in 0..ut.len() {
            let Some(p) = ut.corner(id).parent else {
                continue;
            };
            let here = ut.edge_cost(id, &st).unwrap();
            let there = ut.edge_cost(p, &st).unwrap();
            assert_eq!(here, there);
        }
    }

    #[test]
    fn test_clear_determinism() {
        let mut ut = UnrootedTree::from_newick("(a,(a,b))").unwrap();
        let st = crate::libs::phylo::SpeciesTree::from_newick("(a,b)").unwrap();

        let start = ut.start().unwrap();
        let before = ut.edge_cost(start, &st).unwrap();
        ut.clear();
        for corner in ut.corners() {
            assert_eq!(corner.computed, 0);
            assert_eq!(corner.mapping, None);
        }
        let after = ut.edge_cost(start, &st).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_mapping_error() {
        let mut ut = UnrootedTree::from_newick("(a,c)").unwrap();
        let st = crate::libs::phylo::SpeciesTree::from_newick("(a,b)").unwrap();
        let start = ut.start().unwrap();
        let res = ut.edge_cost(start, &st);
        assert!(
            matches!(res, Err(crate::libs::phylo::ReconError::Mapping { ref label }) if label == "c")
        );
    }

    #[test]
    fn test_rooted_views() {
        let ut = UnrootedTree::from_newick("(a,(b,c))").unwrap();
        let start = ut.start().unwrap();
        let rooted = ut.rooted_at(start);
        // start is the vertex corner toward leaf a
        assert_eq!(writer::write_newick(&rooted), "((b,c),a);");

        let sub = ut.subtree_rooted(start);
        assert_eq!(writer::write_newick(&sub), "(b,c);");
    }
}
