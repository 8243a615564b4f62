pub mod attribute;
pub mod cost;
pub mod error;
pub mod node;
pub mod parser;
pub mod random;
pub mod search;
pub mod species;
pub mod tree;
pub mod unrooted;
pub mod writer;

pub use cost::{CostWeights, DlCost};
pub use error::ReconError;
pub use node::{Node, NodeId};
pub use species::SpeciesTree;
pub use tree::Tree;
pub use unrooted::{Corner, CornerId, UnrootedTree};
