use super::cost::CostWeights;
use super::error::ReconError;
use super::species::SpeciesTree;
use super::unrooted::{CornerId, UnrootedTree, MARK_START, MARK_WALK};

impl UnrootedTree {
    /// Locate a rooting edge minimizing the total mutation cost, in time
    /// linear in the gene-tree size.
    ///
    /// The walk is guided purely by the LCA mapping: starting from the
    /// start edge it rotates to a corner whose mapping differs from the
    /// mapping MG of the whole tree, then follows such corners across
    /// edges until it enters the region where every rooting maps to MG;
    /// inside that region the cost cannot decrease further. Ties are
    /// broken by first encounter.
    ///
    /// Corners touched by the walk are marked for reporting.
    pub fn find_optimal_edge(&mut self, st: &SpeciesTree) -> Result<CornerId, ReconError> {
        let mut cur = self
            .start()
            .ok_or_else(|| ReconError::Logic("empty gene tree".to_string()))?;
        self.mark(cur, MARK_START | MARK_WALK);

        let Some(p) = self.corner(cur).parent else {
            // single-leaf tree
            return Ok(cur);
        };
        if self.is_leaf(cur) && self.is_leaf(p) {
            // two-leaf tree: the start edge is the only edge
            return Ok(cur);
        }
        if self.is_leaf(cur) {
            cur = p;
        }

        // cur is now a corner of an internal vertex
        let p = self.corner(cur).parent.unwrap();
        let ma = self.mapping(cur, st)?;
        let mp = self.mapping(p, st)?;
        let mg = st
            .lca(ma, mp)
            .ok_or_else(|| ReconError::Logic("lca of disjoint nodes".to_string()))?;
        if st.tree().node(mg).is_leaf() {
            // the whole gene tree maps into a single species leaf
            return Ok(cur);
        }

        // pick a corner of this vertex whose mapping differs from MG
        let mut found = false;
        for _ in 0..3 {
            if self.mapping(cur, st)? != mg {
                found = true;
                break;
            }
            cur = self.left(cur);
        }
        self.mark(cur, MARK_WALK);

        if found {
            // follow the descending gradient across edges
            loop {
                let p = self.corner(cur).parent.unwrap();
                if self.is_leaf(p) {
                    break;
                }
                let pl = self.left(p);
                let pr = self.right(p);
                if self.mapping(pl, st)? != mg {
                    cur = pl;
                } else if self.mapping(pr, st)? != mg {
                    cur = pr;
                } else {
                    cur = p;
                    break;
                }
                self.mark(cur, MARK_WALK);
            }
            if self.mapping(cur, st)? != mg {
                return Ok(cur);
            }
        }

        self.mark(cur, MARK_WALK);
        // final pass around the last vertex: prefer an edge whose far
        // side already maps to MG
        for _ in 0..3 {
            let p = self.corner(cur).parent.unwrap();
            if self.mapping(p, st)? == mg {
                return Ok(cur);
            }
            cur = self.left(cur);
        }
        Ok(cur)
    }

    /// Scan every corner and return the first one whose edge cost is
    /// minimal under the given weights. Quadratic in the worst case;
    /// kept as the reference answer the fast walk is checked against.
    pub fn min_edge_exhaustive(
        &mut self,
        st: &SpeciesTree,
        weights: &CostWeights,
    ) -> Result<CornerId, ReconError> {
        let start = self
            .start()
            .ok_or_else(|| ReconError::Logic("empty gene tree".to_string()))?;
        if self.corner(start).parent.is_none() {
            return Ok(start);
        }

        let mut best: Option<(CornerId, f64)> = None;
        for id in 0..self.len() {
            if self.corner(id).parent.is_none() {
                continue;
            }
            let scalar = self.edge_cost(id, st)?.mut_cost(weights);
            match best {
                Some((_, b)) if scalar >= b => {}
                _ => best = Some((id, scalar)),
            }
        }
        Ok(best.expect("a wired tree has at least one edge").0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::phylo::cost::DlCost;
    use approx::assert_relative_eq;

    fn min_cost(gene: &str, species: &str) -> DlCost {
        let mut ut = UnrootedTree::from_newick(gene).unwrap();
        let st = SpeciesTree::from_newick(species).unwrap();
        let opt = ut.find_optimal_edge(&st).unwrap();
        ut.edge_cost(opt, &st).unwrap()
    }

    #[test]
    fn test_identical_pair() {
        assert_eq!(min_cost("(a,b)", "(a,b)"), DlCost::new(0, 0));
    }

    #[test]
    fn test_extra_copy() {
        // the extra a forces one duplication, no losses
        assert_eq!(min_cost("(a,(a,b))", "(a,b)"), DlCost::new(1, 0));
    }

    #[test]
    fn test_congruent_rerooted() {
        // as an unrooted tree, ((a,c),b) can be rooted into (c,(a,b))
        assert_eq!(min_cost("((a,c),b)", "((a,b),c)"), DlCost::new(0, 0));
    }

    #[test]
    fn test_ternary_root() {
        assert_eq!(min_cost("(a,b,(c,d))", "((a,b),(c,d))"), DlCost::new(0, 0));
        assert_eq!(
            min_cost("((a,b),(c,d))", "((a,b),(c,d))"),
            DlCost::new(0, 0)
        );
    }

    #[test]
    fn test_single_leaf() {
        assert_eq!(min_cost("a", "((a,b),c)"), DlCost::new(0, 0));
    }

    #[test]
    fn test_all_leaves_one_species() {
        // every rooting has one duplication per internal node
        assert_eq!(min_cost("(a,(a,a))", "((a,b),c)"), DlCost::new(2, 0));
        assert_eq!(min_cost("(a,a)", "(a,b)"), DlCost::new(1, 0));
    }

    #[test]
    fn test_caterpillar_congruent() {
        assert_eq!(
            min_cost("((c,(a,b)),(d,e))", "((((a,b),c),d),e)"),
            DlCost::new(0, 0)
        );
    }

    #[test]
    fn test_mixed_tie_region() {
        // several edges tie at (2,8); the walk must land on one of them
        let mut ut = UnrootedTree::from_newick("((a,(b,e)),(c,d))").unwrap();
        let st = SpeciesTree::from_newick("(((a,b),c),(d,e))").unwrap();
        let opt = ut.find_optimal_edge(&st).unwrap();
        assert_eq!(ut.edge_cost(opt, &st).unwrap(), DlCost::new(2, 8));
    }

    #[test]
    fn test_walk_matches_exhaustive() {
        let cases = [
            ("(a,b)", "(a,b)"),
            ("(a,(a,b))", "(a,b)"),
            ("((a,c),b)", "((a,b),c)"),
            ("(a,b,(c,d))", "((a,b),(c,d))"),
            ("((a,b),(c,d))", "((a,b),(c,d))"),
            ("((a,(b,e)),(c,d))", "(((a,b),c),(d,e))"),
            ("((c,(a,b)),(d,e))", "((((a,b),c),d),e)"),
            ("((a,b),(a,c))", "((a,b),c)"),
            ("(a,(a,a))", "((a,b),c)"),
        ];
        let weights = CostWeights::default();

        for (gene, species) in cases {
            let mut ut = UnrootedTree::from_newick(gene).unwrap();
            let st = SpeciesTree::from_newick(species).unwrap();

            let walked = ut.find_optimal_edge(&st).unwrap();
            let best = ut.edge_cost(walked, &st).unwrap().mut_cost(&weights);

            let scanned = ut.min_edge_exhaustive(&st, &weights).unwrap();
            let reference = ut.edge_cost(scanned, &st).unwrap().mut_cost(&weights);
            assert_relative_eq!(best, reference);

            // true optimality: no corner beats the walk's edge
            for id in 0..ut.len() {
                if ut.corner(id).parent.is_none() {
                    continue;
                }
                let scalar = ut.edge_cost(id, &st).unwrap().mut_cost(&weights);
                assert!(best <= scalar, "({}, {}): corner {}", gene, species, id);
            }
        }
    }

    #[test]
    fn test_weights_respected() {
        // edges of (a,(a,b)) cost (1,1), (1,1) and (1,0); the scan must
        // score them under the current weights
        let mut ut = UnrootedTree::from_newick("(a,(a,b))").unwrap();
        let st = SpeciesTree::from_newick("(a,b)").unwrap();

        let dup_heavy = CostWeights {
            dup: 10.0,
            loss: 1.0,
        };
        let best = ut.min_edge_exhaustive(&st, &dup_heavy).unwrap();
        assert_relative_eq!(ut.edge_cost(best, &st).unwrap().mut_cost(&dup_heavy), 10.0);

        ut.clear();
        let loss_heavy = CostWeights {
            dup: 1.0,
            loss: 10.0,
        };
        let best = ut.min_edge_exhaustive(&st, &loss_heavy).unwrap();
        assert_relative_eq!(ut.edge_cost(best, &st).unwrap().mut_cost(&loss_heavy), 1.0);
    }

    #[test]
    fn test_walk_marks() {
        let mut ut = UnrootedTree::from_newick("((a,c),b)").unwrap();
        let st = SpeciesTree::from_newick("((a,b),c)").unwrap();
        let start = ut.start().unwrap();
        ut.find_optimal_edge(&st).unwrap();
        assert_ne!(ut.marked(start) & MARK_START, 0);
        ut.clear();
        assert_eq!(ut.marked(start), 0);
    }
}
