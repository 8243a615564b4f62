use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Error during parsing (e.g., syntax error)
    Parse {
        /// A human-readable message explaining the error
        message: String,
        /// The line number (1-based)
        line: usize,
        /// The column number (1-based)
        column: usize,
        /// The snippet of input where the error occurred
        snippet: String,
    },
    /// A gene leaf's species label is absent from the species tree
    Mapping { label: String },
    /// Semantically invalid input (e.g., duplicate species labels)
    Input(String),
    /// Internal invariant violation (e.g., LCA of disjoint trees)
    Logic(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconError::Parse {
                message,
                line,
                column,
                snippet,
            } => {
                write!(
                    f,
                    "Parse error at line {}, column {}:\n{}\nSnippet: \"{}\"",
                    line, column, message, snippet
                )
            }
            ReconError::Mapping { label } => {
                write!(f, "Mapping of {} not found in the species tree", label)
            }
            ReconError::Input(msg) => write!(f, "Input error: {}", msg),
            ReconError::Logic(msg) => write!(f, "Reconciliation logic error: {}", msg),
        }
    }
}

impl std::error::Error for ReconError {}
