use super::cost::DlCost;
use super::error::ReconError;
use super::node::NodeId;
use super::parser;
use super::tree::Tree;
use std::collections::HashMap;

/// A rooted species tree with an O(1) species-label index over its
/// leaves and an LCA operator on the hot path of the reconciliation.
#[derive(Debug, Clone)]
pub struct SpeciesTree {
    tree: Tree,
    leaf_index: HashMap<String, NodeId>,
}

impl SpeciesTree {
    /// Parse a Newick string into a species tree.
    ///
    /// # Example
    /// ```
    /// use urec::libs::phylo::species::SpeciesTree;
    /// let st = SpeciesTree::from_newick("((a,b),c)").unwrap();
    /// assert_eq!(st.leaf_count(), 3);
    /// assert!(st.leaf("a").is_some());
    /// assert!(st.leaf("z").is_none());
    /// ```
    pub fn from_newick(input: &str) -> Result<Self, ReconError> {
        let tree = parser::parse_rooted(input)?;
        Self::from_tree(tree)
    }

    /// Wrap an already-built rooted tree, indexing its leaves by species
    /// label. Species labels must be unique.
    pub fn from_tree(mut tree: Tree) -> Result<Self, ReconError> {
        tree.assign_depths();

        let mut leaf_index = HashMap::new();
        for id in tree.leaves() {
            let label = match &tree.node(id).species {
                Some(s) => s.clone(),
                None => {
                    return Err(ReconError::Input(format!(
                        "species leaf {} has no label",
                        id
                    )))
                }
            };
            if leaf_index.insert(label.clone(), id).is_some() {
                return Err(ReconError::Input(format!(
                    "duplicate species label '{}'",
                    label
                )));
            }
        }

        Ok(Self { tree, leaf_index })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.get_root().expect("species tree has a root")
    }

    /// Leaf node carrying the given species label.
    pub fn leaf(&self, label: &str) -> Option<NodeId> {
        self.leaf_index.get(label).copied()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_index.len()
    }

    /// Species labels of all leaves, in preorder.
    pub fn leaf_labels(&self) -> Vec<String> {
        self.tree
            .leaves()
            .into_iter()
            .filter_map(|id| self.tree.node(id).species.clone())
            .collect()
    }

    /// Lowest common ancestor of `a` and `b`, walking the deeper node up
    /// until depths match, then both until they meet. `None` means the
    /// nodes are disjoint, which indicates a bug.
    pub fn lca(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut a = a;
        let mut b = b;
        while self.tree.node(a).depth > self.tree.node(b).depth {
            a = self.tree.node(a).parent?;
        }
        while self.tree.node(b).depth > self.tree.node(a).depth {
            b = self.tree.node(b).parent?;
        }
        while a != b {
            a = self.tree.node(a).parent?;
            b = self.tree.node(b).parent?;
        }
        Some(a)
    }

    pub(crate) fn detail_mut(&mut self, id: NodeId) -> &mut DlCost {
        &mut self.tree.node_mut(id).detail
    }

    /// Sum of the per-branch detail counters over the whole tree.
    pub fn detail_total(&self) -> DlCost {
        let root = self.root();
        self.tree
            .preorder(root)
            .into_iter()
            .fold(DlCost::default(), |acc, id| acc + self.tree.node(id).detail)
    }

    /// Reset all detail counters; the attribution pass is additive.
    pub fn clear_details(&mut self) {
        let ids = self.tree.preorder(self.root());
        for id in ids {
            self.tree.node_mut(id).detail = DlCost::default();
        }
    }
}
