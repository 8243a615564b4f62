use super::error::ReconError;
use super::node::NodeId;
use super::tree::Tree;
use super::unrooted::{CornerId, UnrootedTree};
use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, multispace0},
    combinator::{cut, map, opt, recognize, verify},
    error::{context, ContextError, ErrorKind, ParseError},
    sequence::{delimited, preceded},
    IResult, Offset, Parser,
};

// ================================================================================================
// Error Handling Structures
// ================================================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum DetailedErrorKind {
    Context(&'static str),
    Nom(ErrorKind),
}

/// A custom error type for nom that accumulates context and error kinds.
/// This allows for more informative error messages when parsing fails.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailedError<'a> {
    pub errors: Vec<(&'a str, DetailedErrorKind)>,
}

impl<'a> ParseError<&'a str> for DetailedError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }

    fn append(input: &'a str, kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Nom(kind)));
        other
    }
}

impl<'a> ContextError<&'a str> for DetailedError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Context(ctx)));
        other
    }
}

// ================================================================================================
// Intermediate Structure
// ================================================================================================

/// `ParsedNode` is a temporary recursive structure used during parsing.
/// It mirrors the shape of a Newick node but exists independently of
/// the final arena; once parsing succeeds it is converted into a rooted
/// `Tree` or an `UnrootedTree`.
#[derive(Debug)]
struct ParsedNode {
    /// Leaf: the full label text; internal: the ':'-annotation
    name: Option<String>,
    /// Zero (leaf) or two (internal) children
    children: Vec<ParsedNode>,
}

impl ParsedNode {
    fn leaf(name: String) -> Self {
        Self {
            name: Some(name),
            children: Vec::new(),
        }
    }

    fn internal(a: ParsedNode, b: ParsedNode, name: Option<String>) -> Self {
        Self {
            name,
            children: vec![a, b],
        }
    }

    /// Converts this recursive node into nodes in the provided rooted
    /// arena. Returns the `NodeId` of the created node.
    fn into_tree(self, tree: &mut Tree) -> NodeId {
        let ParsedNode { name, children } = self;
        let id = tree.add_node();
        let is_leaf = children.is_empty();
        for child in children {
            let child_id = child.into_tree(tree);
            // The unwrap here is safe because `id` was just created.
            tree.add_child(id, child_id).unwrap();
        }

        let node = tree.node_mut(id);
        if is_leaf {
            let label = name.unwrap_or_default();
            let (gene_id, species) = split_leaf_label(&label);
            node.gene_id = Some(gene_id);
            node.species = Some(species);
            node.name = Some(label);
        } else {
            node.name = name;
        }
        id
    }

    /// Converts this recursive node into corners of the unrooted arena.
    /// Returns the corner whose outgoing edge is still unwired.
    fn into_unrooted(self, ut: &mut UnrootedTree) -> CornerId {
        let ParsedNode { name, children } = self;
        if children.is_empty() {
            ut.add_leaf(name.as_deref().unwrap_or(""))
        } else {
            let mut it = children.into_iter();
            let a = it.next().unwrap().into_unrooted(ut);
            let b = it.next().unwrap().into_unrooted(ut);
            ut.add_vertex(a, b, name)
        }
    }
}

// ================================================================================================
// Parsers
// ================================================================================================

// Whitespace eater: wraps another parser and ignores surrounding
// whitespace (spaces, tabs, newlines).
fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

// Label: a contiguous run of characters not in "(),", surrounding
// whitespace trimmed. Brackets and colons stay inside the label, so a
// leaf like "At435[species=Arabidopsis]:0.1" is a single token.
fn parse_label(input: &str) -> IResult<&str, String, DetailedError<'_>> {
    context(
        "label",
        verify(
            map(take_while(|c: char| !"(),".contains(c)), |s: &str| {
                s.trim().to_string()
            }),
            |s: &String| !s.is_empty(),
        ),
    )
    .parse(input)
}

// Annotation: an optional ':'-introduced suffix after a group, captured
// verbatim (leading ':' included) as the internal node's display label.
fn parse_annotation(input: &str) -> IResult<&str, Option<String>, DetailedError<'_>> {
    opt(preceded(
        multispace0,
        map(
            recognize(preceded(char(':'), take_while(|c: char| !"(),".contains(c)))),
            |s: &str| s.trim_end().to_string(),
        ),
    ))
    .parse(input)
}

fn parse_leaf(input: &str) -> IResult<&str, ParsedNode, DetailedError<'_>> {
    map(parse_label, ParsedNode::leaf).parse(input)
}

// Group: '(' Tree ',' Tree ')' [annotation]. Strictly binary; `cut`
// commits after the opening paren so errors point at the right spot.
fn parse_group(input: &str) -> IResult<&str, ParsedNode, DetailedError<'_>> {
    let (input, _) = ws(char('(')).parse(input)?;
    let (input, a) = cut(parse_subtree).parse(input)?;
    let (input, _) = context("comma", cut(ws(char(',')))).parse(input)?;
    let (input, b) = cut(parse_subtree).parse(input)?;
    let (input, _) = context("closing paren", cut(ws(char(')')))).parse(input)?;
    let (input, name) = parse_annotation(input)?;
    Ok((input, ParsedNode::internal(a, b, name)))
}

fn parse_subtree(input: &str) -> IResult<&str, ParsedNode, DetailedError<'_>> {
    alt((parse_group, parse_leaf)).parse(input)
}

// Outermost production of an unrooted tree: binary or ternary.
fn parse_top_group(input: &str) -> IResult<&str, Vec<ParsedNode>, DetailedError<'_>> {
    let (input, _) = ws(char('(')).parse(input)?;
    let (input, a) = cut(parse_subtree).parse(input)?;
    let (input, _) = context("comma", cut(ws(char(',')))).parse(input)?;
    let (input, b) = cut(parse_subtree).parse(input)?;
    let (input, c) = opt(preceded(ws(char(',')), cut(parse_subtree))).parse(input)?;
    let (input, _) = context("closing paren", cut(ws(char(')')))).parse(input)?;
    // A root annotation has no vertex to hang from; accept and drop it.
    let (input, _) = parse_annotation(input)?;

    let mut parts = vec![a, b];
    parts.extend(c);
    Ok((input, parts))
}

fn parse_unrooted_top(input: &str) -> IResult<&str, Vec<ParsedNode>, DetailedError<'_>> {
    alt((parse_top_group, map(parse_leaf, |leaf| vec![leaf]))).parse(input)
}

// ================================================================================================
// Entry Points
// ================================================================================================

/// Parse a Newick string into a rooted binary tree. A single trailing
/// ';' is accepted and ignored.
pub fn parse_rooted(input: &str) -> Result<Tree, ReconError> {
    let text = strip_terminator(input);

    match ws(parse_subtree).parse(text) {
        Ok((_, parsed)) => {
            let mut tree = Tree::new();
            let root = parsed.into_tree(&mut tree);
            tree.set_root(root);
            tree.assign_depths();
            Ok(tree)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(make_parse_error(text, e)),
        Err(nom::Err::Incomplete(_)) => Err(incomplete_error()),
    }
}

/// Parse a Newick string into an unrooted binary tree.
///
/// The outermost production may be binary (the root edge is erased and
/// the two subtrees joined directly) or ternary (a degree-3 vertex); a
/// bare leaf yields the degenerate single-leaf tree.
pub fn parse_unrooted(input: &str) -> Result<UnrootedTree, ReconError> {
    let text = strip_terminator(input);

    let parts = match ws(parse_unrooted_top).parse(text) {
        Ok((_, parts)) => parts,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(make_parse_error(text, e))
        }
        Err(nom::Err::Incomplete(_)) => return Err(incomplete_error()),
    };

    let mut ut = UnrootedTree::new();
    let mut it = parts.into_iter();
    match (it.next(), it.next(), it.next()) {
        (Some(leaf), None, None) => {
            let id = leaf.into_unrooted(&mut ut);
            ut.set_start(id);
        }
        (Some(a), Some(b), None) => {
            let a = a.into_unrooted(&mut ut);
            let b = b.into_unrooted(&mut ut);
            ut.join(a, b);
        }
        (Some(a), Some(b), Some(c)) => {
            let a = a.into_unrooted(&mut ut);
            let b = b.into_unrooted(&mut ut);
            let v = ut.add_vertex(a, b, None);
            let c = c.into_unrooted(&mut ut);
            ut.join(v, c);
        }
        _ => unreachable!(),
    }

    Ok(ut)
}

/// Split a leaf label into (gene_id, species): the base token runs up
/// to the first ' ', '[' or ':'; when the token immediately after it is
/// a "[species=VALUE]" attribute, VALUE becomes the species, otherwise
/// the base token is used. Attributes further down the label are not
/// consulted.
///
/// # Example
/// ```
/// use urec::libs::phylo::parser::split_leaf_label;
/// assert_eq!(
///     split_leaf_label("At435[species=Arabidopsis]:0.1"),
///     ("At435".to_string(), "Arabidopsis".to_string())
/// );
/// assert_eq!(split_leaf_label("wombat"), ("wombat".to_string(), "wombat".to_string()));
/// assert_eq!(split_leaf_label("gene:0.5"), ("gene".to_string(), "gene".to_string()));
/// ```
pub fn split_leaf_label(text: &str) -> (String, String) {
    let base_end = text.find([' ', '[', ':']).unwrap_or(text.len());
    let base = text[..base_end].to_string();

    // Only the token right after the base can name the attribute.
    let rest = text.get(base_end + 1..).unwrap_or("");
    let rest = rest.trim_start_matches([' ', '[', '=']);
    let name_end = rest.find([' ', '[', '=']).unwrap_or(rest.len());
    if &rest[..name_end] != "species" {
        return (base.clone(), base);
    }

    let value = rest.get(name_end + 1..).unwrap_or("");
    let value = value.trim_start_matches([' ', '=', ']']);
    let value_end = value.find([' ', '=', ']']).unwrap_or(value.len());
    let value = &value[..value_end];

    if value.is_empty() {
        (base.clone(), base)
    } else {
        (base.clone(), value.to_string())
    }
}

// A single trailing ';' is the conventional Newick terminator.
fn strip_terminator(input: &str) -> &str {
    let text = input.trim_end();
    text.strip_suffix(';').unwrap_or(text).trim_end()
}

fn incomplete_error() -> ReconError {
    ReconError::Parse {
        message: "Incomplete input".to_string(),
        line: 0,
        column: 0,
        snippet: "".to_string(),
    }
}

// Helper to convert nom errors into a friendly ReconError
fn make_parse_error(input: &str, e: DetailedError) -> ReconError {
    let (remaining, _) = e.errors.first().unwrap();
    let offset = input.offset(remaining);

    // Calculate line/col
    let prefix = &input[..offset];
    let line = prefix.chars().filter(|&c| c == '\n').count() + 1;
    let last_newline = prefix.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = offset - last_newline + 1;

    let mut msg = String::new();
    for (_, kind) in e.errors.iter().rev() {
        match kind {
            DetailedErrorKind::Context(ctx) => {
                msg.push_str(&format!("while parsing {}:\n", ctx));
            }
            DetailedErrorKind::Nom(k) => {
                msg.push_str(&format!("  error: {:?}\n", k));
            }
        }
    }

    ReconError::Parse {
        message: msg,
        line,
        column,
        snippet: remaining.chars().take(50).collect(),
    }
}

impl Tree {
    /// Parse a Newick string into a rooted binary tree.
    ///
    /// # Example
    /// ```
    /// use urec::libs::phylo::tree::Tree;
    ///
    /// let tree = Tree::from_rooted_newick("((a,b),c);").unwrap();
    /// assert_eq!(tree.len(), 5);
    ///
    /// let result = Tree::from_rooted_newick("((a,b),c");
    /// assert!(result.is_err());
    /// ```
    pub fn from_rooted_newick(input: &str) -> Result<Self, ReconError> {
        parse_rooted(input)
    }
}

impl UnrootedTree {
    /// Parse a Newick string into an unrooted binary tree.
    ///
    /// # Example
    /// ```
    /// use urec::libs::phylo::unrooted::UnrootedTree;
    ///
    /// // A binary root joins two subtrees by a single edge: one vertex,
    /// // three leaves.
    /// let ut = UnrootedTree::from_newick("(a,(b,c));").unwrap();
    /// assert_eq!(ut.leaf_count(), 3);
    /// assert_eq!(ut.len(), 6);
    /// ```
    pub fn from_newick(input: &str) -> Result<Self, ReconError> {
        parse_unrooted(input)
    }
}
