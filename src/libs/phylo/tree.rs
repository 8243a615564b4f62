use super::error::ReconError;
use super::node::{Node, NodeId};

/// A rooted binary tree backed by an arena of nodes.
///
/// Trees are built by the parser (or the random generator) and are never
/// structurally mutated afterwards; the per-node `detail` counters are
/// the only mutable state.
#[derive(Debug, Default, Clone)]
pub struct Tree {
    /// Arena storage for all nodes
    nodes: Vec<Node>,

    /// Optional root ID (a tree might be empty or in construction)
    root: Option<NodeId>,
}

impl Tree {
    /// Create a new empty tree
    ///
    /// # Example
    /// ```
    /// use urec::libs::phylo::tree::Tree;
    /// let tree = Tree::new();
    /// assert!(tree.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new node to the tree. Returns the new node's ID.
    /// The node is initially detached (no parent).
    pub fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        let node = Node::new(id);
        self.nodes.push(node);
        id
    }

    /// Get a reference to a node by ID. Returns None if ID is invalid.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Direct access to a node known to exist.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Set a node as the root of the tree.
    pub fn set_root(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.root = Some(id);
        }
    }

    /// Get the root node ID
    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    /// Add a child to a parent node.
    /// Updates both parent's `children` list and child's `parent` field.
    ///
    /// # Errors
    /// Returns error if parent/child invalid or the child already has a
    /// parent.
    pub fn add_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), ReconError> {
        if parent_id == child_id {
            return Err(ReconError::Logic(
                "cannot add node as child of itself".to_string(),
            ));
        }
        if self.get_node(parent_id).is_none() {
            return Err(ReconError::Logic(format!("parent node {} not found", parent_id)));
        }
        if self.get_node(child_id).is_none() {
            return Err(ReconError::Logic(format!("child node {} not found", child_id)));
        }
        if let Some(old_parent) = self.nodes[child_id].parent {
            return Err(ReconError::Logic(format!(
                "node {} already has parent {}",
                child_id, old_parent
            )));
        }

        self.nodes[child_id].parent = Some(parent_id);
        self.nodes[parent_id].children.push(child_id);

        Ok(())
    }

    /// Get number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Recompute depths from the root; the root has depth 0.
    pub fn assign_depths(&mut self) {
        if let Some(root) = self.root {
            let mut stack = vec![(root, 0usize)];
            while let Some((id, depth)) = stack.pop() {
                self.nodes[id].depth = depth;
                let children = self.nodes[id].children.clone();
                for child in children {
                    stack.push((child, depth + 1));
                }
            }
        }
    }

    /// Get node IDs in preorder traversal (Root -> Children)
    pub fn preorder(&self, start_node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start_node];

        while let Some(id) = stack.pop() {
            if let Some(node) = self.get_node(id) {
                result.push(id);
                // Push children in reverse order so they are processed in order
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }

        result
    }

    /// Get node IDs in postorder traversal (Children -> Root)
    pub fn postorder(&self, start_node: NodeId) -> Vec<NodeId> {
        fn helper(tree: &Tree, id: NodeId, result: &mut Vec<NodeId>) {
            if let Some(node) = tree.get_node(id) {
                for &child in &node.children {
                    helper(tree, child, result);
                }
                result.push(id);
            }
        }

        let mut result = Vec::new();
        helper(self, start_node, &mut result);
        result
    }

    /// IDs of all leaves, in preorder.
    pub fn leaves(&self) -> Vec<NodeId> {
        match self.root {
            Some(root) => self
                .preorder(root)
                .into_iter()
                .filter(|&id| self.nodes[id].is_leaf())
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_basic_ops() {
        let mut tree = Tree::new();

        // 0(root) -> 1, 2
        // 1 -> 3
        let n0 = tree.add_node();
        let n1 = tree.add_node();
        let n2 = tree.add_node();
        let n3 = tree.add_node();

        tree.set_root(n0);

        assert!(tree.add_child(n0, n1).is_ok());
        assert!(tree.add_child(n0, n2).is_ok());
        assert!(tree.add_child(n1, n3).is_ok());

        assert_eq!(tree.len(), 4);

        let root = tree.node(n0);
        assert_eq!(root.children, vec![n1, n2]);

        let node1 = tree.node(n1);
        assert_eq!(node1.parent, Some(n0));
        assert_eq!(node1.children, vec![n3]);

        // re-parenting is rejected
        assert!(tree.add_child(n2, n3).is_err());
    }

    #[test]
    fn test_tree_depths() {
        let mut tree = Tree::new();
        let n0 = tree.add_node();
        let n1 = tree.add_node();
        let n2 = tree.add_node();
        let n3 = tree.add_node();

        tree.set_root(n0);
        tree.add_child(n0, n1).unwrap();
        tree.add_child(n0, n2).unwrap();
        tree.add_child(n1, n3).unwrap();
        tree.assign_depths();

        assert_eq!(tree.node(n0).depth, 0);
        assert_eq!(tree.node(n1).depth, 1);
        assert_eq!(tree.node(n2).depth, 1);
        assert_eq!(tree.node(n3).depth, 2);
    }

    #[test]
    fn test_traversals() {
        let mut tree = Tree::new();
        let n0 = tree.add_node();
        let n1 = tree.add_node();
        let n2 = tree.add_node();
        let n3 = tree.add_node();
        let n4 = tree.add_node();

        tree.set_root(n0);
        tree.add_child(n0, n1).unwrap();
        tree.add_child(n0, n2).unwrap();
        tree.add_child(n1, n3).unwrap();
        tree.add_child(n1, n4).unwrap();

        assert_eq!(tree.preorder(n0), vec![n0, n1, n3, n4, n2]);
        assert_eq!(tree.postorder(n0), vec![n3, n4, n1, n2, n0]);
        assert_eq!(tree.leaves(), vec![n3, n4, n2]);
    }
}
