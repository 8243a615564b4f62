use super::error::ReconError;
use super::node::NodeId;
use super::species::SpeciesTree;
use super::tree::Tree;
use super::unrooted::{CornerId, UnrootedTree, MARK_OPT, MARK_OPT_MATE, MARK_START, MARK_WALK};

/// Serialize a rooted tree to a Newick string.
///
/// Labels are emitted verbatim: leaves print their full original text,
/// internal nodes their ':'-annotation when present, so a parsed tree
/// round-trips.
///
/// # Example
/// ```
/// use urec::libs::phylo::tree::Tree;
/// use urec::libs::phylo::writer;
/// let tree = Tree::from_rooted_newick("((a,b):0.35,c);").unwrap();
/// assert_eq!(writer::write_newick(&tree), "((a,b):0.35,c);");
/// ```
pub fn write_newick(tree: &Tree) -> String {
    match tree.get_root() {
        Some(root) => {
            let mut s = write_subtree(tree, root);
            s.push(';');
            s
        }
        None => ";".to_string(),
    }
}

/// Serialize the subtree hanging from `id`, without the trailing ';'.
pub fn write_subtree(tree: &Tree, id: NodeId) -> String {
    let node = tree.node(id);
    if node.is_leaf() {
        node.name.clone().unwrap_or_default()
    } else {
        let children_strs: Vec<String> = node
            .children
            .iter()
            .map(|&child| write_subtree(tree, child))
            .collect();
        format!(
            "({}){}",
            children_strs.join(","),
            node.name.as_deref().unwrap_or("")
        )
    }
}

/// One rooted Newick line per edge of the unrooted tree (a single-leaf
/// tree prints its one leaf).
pub fn write_rootings(ut: &UnrootedTree) -> String {
    let mut out = String::new();
    for corner in ut.corners() {
        if let Some(p) = corner.parent {
            if corner.id < p {
                out.push_str(&write_newick(&ut.rooted_at(corner.id)));
                out.push('\n');
            }
        }
    }
    if out.is_empty() {
        if let Some(start) = ut.start() {
            out.push_str(&write_newick(&ut.rooted_at(start)));
            out.push('\n');
        }
    }
    out
}

/// Per-node detail lines of the species tree, preorder: counters
/// followed by the subtree they belong to.
pub fn write_species_details(st: &SpeciesTree) -> String {
    let mut out = String::new();
    for id in st.tree().preorder(st.root()) {
        let node = st.tree().node(id);
        out.push_str(&format!("{}\t{}\n", node.detail, write_subtree(st.tree(), id)));
    }
    out
}

/// The species tree in nested parenthesis notation with per-node
/// dup/loss attributes.
pub fn write_tree_details(st: &SpeciesTree) -> String {
    format!("[ {} ]", tree_details_node(st.tree(), st.root()))
}

fn tree_details_node(tree: &Tree, id: NodeId) -> String {
    let node = tree.node(id);
    let attrs = format!(" dup({}) loss({})", node.detail.dup, node.detail.loss);
    if node.is_leaf() {
        format!("{}{}", node.name.as_deref().unwrap_or(""), attrs)
    } else {
        format!(
            "({},{}){}",
            tree_details_node(tree, node.children[0]),
            tree_details_node(tree, node.children[1]),
            attrs
        )
    }
}

/// The gene tree rooted on the start edge, every corner annotated with
/// its edge cost, subtree cost, marks, and destination mapping in the
/// species tree. Demand-drives the cost computation.
pub fn write_attributes(
    ut: &mut UnrootedTree,
    st: &SpeciesTree,
) -> Result<String, ReconError> {
    let Some(start) = ut.start() else {
        return Ok("[]".to_string());
    };

    let mut s = String::from("[");
    match ut.corner(start).parent {
        Some(p) => {
            s.push('(');
            s.push_str(&attr_subtree(ut, start, st)?);
            s.push(',');
            s.push_str(&attr_subtree(ut, p, st)?);
            s.push(')');
        }
        None => s.push_str(&attr_subtree(ut, start, st)?),
    }
    s.push(']');
    Ok(s)
}

fn attr_subtree(
    ut: &mut UnrootedTree,
    id: CornerId,
    st: &SpeciesTree,
) -> Result<String, ReconError> {
    if ut.is_leaf(id) {
        let label = ut.corner(id).name.clone().unwrap_or_default();
        let attrs = corner_attrs(ut, id, st)?;
        return Ok(format!("{}{}", label, attrs));
    }

    let l = ut.left(id);
    let r = ut.right(id);
    let lp = ut.corner(l).parent.unwrap();
    let rp = ut.corner(r).parent.unwrap();

    let left_str = attr_subtree(ut, lp, st)?;
    let left_attrs = corner_attrs(ut, l, st)?;
    let right_str = attr_subtree(ut, rp, st)?;
    let right_attrs = corner_attrs(ut, r, st)?;
    let own_attrs = corner_attrs(ut, id, st)?;

    Ok(format!(
        "( ({}) {}, ( {} ) {} ){}",
        left_str, left_attrs, right_str, right_attrs, own_attrs
    ))
}

fn corner_attrs(
    ut: &mut UnrootedTree,
    id: CornerId,
    st: &SpeciesTree,
) -> Result<String, ReconError> {
    let total = ut.edge_cost(id, st)?;
    let sc = ut.subtree_cost(id, st)?;
    let mut s = format!(
        " totalc({{{},{}}}) treec({{{},{}}})",
        total.dup, total.loss, sc.dup, sc.loss
    );

    let mark = ut.marked(id);
    if mark & MARK_WALK != 0 {
        s.push_str(" mark(1)");
    }
    if mark & MARK_OPT != 0 {
        s.push_str(" markopt(1)");
    }
    if mark & MARK_START != 0 {
        s.push_str(" markstart(1)");
    }
    if mark & MARK_OPT_MATE != 0 {
        s.push_str(" markoptm(1)");
    }

    let m = ut.mapping(id, st)?;
    if st.tree().node(m).parent.is_some() {
        s.push_str(&format!(" destn(\"{}\")", write_subtree(st.tree(), m)));
    } else {
        s.push_str(" destn(\"\")");
    }
    Ok(s)
}
