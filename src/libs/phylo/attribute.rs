use super::error::ReconError;
use super::node::NodeId;
use super::species::SpeciesTree;
use super::unrooted::{CornerId, UnrootedTree};

impl UnrootedTree {
    /// Distribute the dup/loss events of the rooting at `at` onto the
    /// branches of the species tree, incrementing its per-node detail
    /// counters. Additive: reconciling several gene trees against one
    /// species tree accumulates totals.
    pub fn attribute_details(
        &mut self,
        at: CornerId,
        st: &mut SpeciesTree,
    ) -> Result<(), ReconError> {
        let Some(p) = self.corner(at).parent else {
            // single-leaf tree, nothing to attribute
            return Ok(());
        };

        let m1 = self.mapping(at, st)?;
        let m2 = self.mapping(p, st)?;
        let s = st
            .lca(m1, m2)
            .ok_or_else(|| ReconError::Logic("lca of disjoint nodes".to_string()))?;
        record_events(st, s, m1, m2);

        self.attribute_subtree(at, st)?;
        self.attribute_subtree(p, st)
    }

    fn attribute_subtree(&mut self, id: CornerId, st: &mut SpeciesTree) -> Result<(), ReconError> {
        if self.is_leaf(id) {
            return Ok(());
        }
        let yl = self.corner(self.left(id)).parent.unwrap();
        let yr = self.corner(self.right(id)).parent.unwrap();

        let m = self.mapping(id, st)?;
        let ml = self.mapping(yl, st)?;
        let mr = self.mapping(yr, st)?;
        record_events(st, m, ml, mr);

        self.attribute_subtree(yl, st)?;
        self.attribute_subtree(yr, st)
    }
}

/// Record the events of one gene node mapped to `s` with children
/// mapped to `s1` and `s2`: a duplication at `s` when `s` equals one of
/// them, and one loss on the sibling of every branch crossed on the way
/// from `s1` (resp. `s2`) up to `s`.
fn record_events(st: &mut SpeciesTree, s: NodeId, s1: NodeId, s2: NodeId) {
    if s != s1 && s != s2 {
        record_losses(st, s1, s, true);
        record_losses(st, s2, s, true);
    } else {
        if s != s1 {
            record_losses(st, s1, s, false);
        } else if s != s2 {
            record_losses(st, s2, s, false);
        }
        st.detail_mut(s).dup += 1;
    }
}

// Walk from `from` up to `top`; at each visited ancestor the sibling of
// the climbing child takes one loss. The step at `top` itself is
// counted only when `skip_top` is false.
fn record_losses(st: &mut SpeciesTree, from: NodeId, top: NodeId, skip_top: bool) {
    let mut child = from;
    let mut cur = st.tree().node(from).parent.unwrap();
    loop {
        if cur == top && skip_top {
            return;
        }
        let children = &st.tree().node(cur).children;
        let sibling = if children[0] == child {
            children[1]
        } else {
            children[0]
        };
        st.detail_mut(sibling).loss += 1;
        if cur == top {
            return;
        }
        child = cur;
        cur = st.tree().node(cur).parent.unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::phylo::cost::DlCost;

    fn attributed(gene: &str, species: &str) -> (SpeciesTree, DlCost) {
        let mut ut = UnrootedTree::from_newick(gene).unwrap();
        let mut st = SpeciesTree::from_newick(species).unwrap();
        let opt = ut.find_optimal_edge(&st).unwrap();
        let cost = ut.edge_cost(opt, &st).unwrap();
        ut.attribute_details(opt, &mut st).unwrap();
        (st, cost)
    }

    #[test]
    fn test_attribution_congruent() {
        // the optimal rooting (c,(a,b)) is congruent: nothing to record
        let (st, cost) = attributed("(a,(b,c))", "((a,b),c)");
        assert_eq!(cost, DlCost::new(0, 0));
        assert_eq!(st.detail_total(), DlCost::new(0, 0));
        let root = st.root();
        assert_eq!(st.tree().node(root).detail, DlCost::new(0, 0));
    }

    #[test]
    fn test_attribution_duplication() {
        // optimal rooting (b,(a,a)): one duplication at the a leaf
        let (st, cost) = attributed("(a,(a,b))", "((a,b),c)");
        assert_eq!(cost, DlCost::new(1, 0));
        let a = st.leaf("a").unwrap();
        assert_eq!(st.tree().node(a).detail, DlCost::new(1, 0));
        assert_eq!(st.detail_total(), DlCost::new(1, 0));
    }

    #[test]
    fn test_attribution_loss_on_sibling() {
        // G = (a,c) against ((a,b),c): the lineage passes the (a,b)
        // branch without a b copy, so b takes the single loss
        let (st, cost) = attributed("(a,c)", "((a,b),c)");
        assert_eq!(cost, DlCost::new(0, 1));
        let b = st.leaf("b").unwrap();
        assert_eq!(st.tree().node(b).detail, DlCost::new(0, 1));
        assert_eq!(st.detail_total(), DlCost::new(0, 1));
    }

    #[test]
    fn test_attribution_additive() {
        let mut st = SpeciesTree::from_newick("((a,b),c)").unwrap();
        for _ in 0..2 {
            let mut ut = UnrootedTree::from_newick("(a,c)").unwrap();
            let opt = ut.find_optimal_edge(&st).unwrap();
            ut.attribute_details(opt, &mut st).unwrap();
        }
        assert_eq!(st.detail_total(), DlCost::new(0, 2));

        st.clear_details();
        assert_eq!(st.detail_total(), DlCost::new(0, 0));
    }

    #[test]
    fn test_attribution_matches_cost() {
        // the per-branch counters of a single reconciliation sum to its
        // edge cost
        let cases = [
            ("((a,c),b)", "((a,b),c)"),
            ("((a,b),(a,c))", "((a,b),c)"),
            ("((a,(b,e)),(c,d))", "(((a,b),c),(d,e))"),
            ("(a,(a,a))", "((a,b),c)"),
        ];
        for (gene, species) in cases {
            let (st, cost) = attributed(gene, species);
            assert_eq!(st.detail_total(), cost, "({}, {})", gene, species);
        }
    }
}
