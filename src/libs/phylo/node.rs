use super::cost::DlCost;

/// NodeId is an index into the Tree's node vector.
/// It is lightweight (Copy) and safe (no pointers).
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for the node (index in the arena)
    pub id: NodeId,

    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,

    /// Child node IDs; binary trees carry exactly zero or two
    pub children: Vec<NodeId>,

    // --- Payload ---
    /// Verbatim label text (e.g., "At435[species=Arabidopsis]:0.1");
    /// internal nodes carry their ':'-annotation here, if any
    pub name: Option<String>,

    /// Species label extracted from the leaf label
    pub species: Option<String>,

    /// Base token of the leaf label (sequence id)
    pub gene_id: Option<String>,

    /// Distance from the root; the root has depth 0
    pub depth: usize,

    /// Per-branch dup/loss counters, filled by the attribution pass
    pub detail: DlCost,
}

impl Node {
    /// Create a new empty node with a specific ID
    ///
    /// # Example
    /// ```
    /// use urec::libs::phylo::node::Node;
    /// let node = Node::new(1);
    /// assert_eq!(node.id, 1);
    /// assert!(node.children.is_empty());
    /// assert!(node.name.is_none());
    /// ```
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name: None,
            species: None,
            gene_id: None,
            depth: 0,
            detail: DlCost::default(),
        }
    }

    /// Set the name of the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Check if the node is a leaf (no children)
    ///
    /// # Example
    /// ```
    /// use urec::libs::phylo::node::Node;
    /// let mut node = Node::new(1);
    /// assert!(node.is_leaf());
    ///
    /// node.children.push(2);
    /// assert!(!node.is_leaf());
    /// ```
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
