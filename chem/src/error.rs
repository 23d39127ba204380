use thiserror::Error;

/// Reasons a SMILES string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChemError {
    #[error("Empty SMILES")]
    Empty,

    #[error("Unexpected token {token} at position {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("Unknown element {symbol}")]
    UnknownElement { symbol: String },

    #[error("Malformed bracket atom {token}")]
    MalformedBracketAtom { token: String },

    #[error("Unbalanced branch at position {position}")]
    UnbalancedBranch { position: usize },

    #[error("Ring closure {label} was never closed")]
    UnclosedRing { label: u16 },

    #[error("Ring closure {label} is invalid: {reason}")]
    InvalidRingClosure { label: u16, reason: String },

    #[error("Bond symbol at position {position} is not attached to two atoms")]
    DanglingBond { position: usize },

    #[error("Atom {index} ({symbol}) exceeds its allowed valence")]
    ValenceExceeded { index: usize, symbol: String },

    #[error("Aromatic atom {index} is not part of a ring")]
    AromaticOutsideRing { index: usize },
}
