//! Defines the `Error` type for the bayonet library

use std::error;
use std::fmt;
use std::result;

pub type Result<T> = result::Result<T, BayonetError>;

#[derive(Clone, Debug, PartialEq)]
pub enum BayonetError {

    /// A distribution or table length did not line up with what the operation
    /// required. The message names the lengths that disagreed.
    ShapeMismatch(String),

    /// Every entry of a distribution was zero where a draw or a normalization
    /// was required
    DegenerateDistribution,

    /// A distribution summed outside the correction tolerance. The value is
    /// the offending sum.
    Denormalized(f64),

    /// A negative probability was supplied
    NegativeProbability,

    /// An initialization was applied to a variable it is not valid for
    InvalidInitialization,

    /// A parent variable was named that is not (yet) in the network
    MissingParent(String),

    /// A variable was added twice, or appeared twice in a parent list
    DuplicateVariable(String),

    /// A state index at or beyond a variable's cardinality
    InvalidState(usize),

    /// A general error with the given description
    General(String)

}

impl fmt::Display for BayonetError {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BayonetError::ShapeMismatch(msg) => write!(f, "shape mismatch: {}", msg),
            BayonetError::DegenerateDistribution => write!(f, "degenerate (all-zero) distribution"),
            BayonetError::Denormalized(sum) => write!(f, "denormalized distribution: sum = {}", sum),
            BayonetError::NegativeProbability => write!(f, "encountered a negative probability"),
            BayonetError::InvalidInitialization => write!(f, "an invalid initialization was provided"),
            BayonetError::MissingParent(name) => write!(f, "parent '{}' is not in the network", name),
            BayonetError::DuplicateVariable(name) => write!(f, "variable '{}' was encountered twice", name),
            BayonetError::InvalidState(state) => write!(f, "state {} is out of range", state),
            BayonetError::General(msg) => write!(f, "{}", msg)
        }
    }

}

impl error::Error for BayonetError {}
