//! Module containing initialization routines for a variable's conditional
//! probability table.

use crate::table::ConditionalTable;
use crate::util::{BayonetError, Result};

use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use ndarray::Array1;

/// Defines the possible ways to initialize a variable's table when it is
/// added to a network.
pub enum Init {

    /// A uniform distribution over the variable's states, whatever the
    /// conditioning combination
    Uniform,

    /// Randomly initialized positive weights, normalized per conditioning
    /// combination
    Random,

    /// An explicit prior. Valid only for a variable with no parents.
    Prior(Vec<f64>),

    /// An explicit flat table in own-state-major order (see
    /// `ConditionalTable` for the layout)
    Table(Vec<f64>)

}

impl Init {

    /// Build the table for a variable of the given cardinality whose
    /// conditioning variables have cardinalities `cond_lens` (declaration
    /// order).
    ///
    /// # Errors
    /// * `BayonetError::InvalidInitialization` if a `Prior` is applied to a
    ///   conditioned variable or its length disagrees with the cardinality
    /// * any `ConditionalTable::new` error for explicit tables
    pub fn build_table(self, cardinality: usize, cond_lens: &[usize]) -> Result<ConditionalTable> {
        let mut lens = Vec::with_capacity(cond_lens.len() + 1);
        lens.push(cardinality);
        lens.extend_from_slice(cond_lens);

        let condlen: usize = cond_lens.iter().product();

        match self {
            Init::Uniform => {
                let val = 1.0 / cardinality as f64;
                ConditionalTable::new(lens, vec![val; cardinality * condlen])
            },
            Init::Random => {
                let weights = Array1::random(cardinality * condlen, Uniform::new(1.0, 100.0));
                ConditionalTable::new(lens, weights.to_vec())
            },
            Init::Prior(values) => {
                if !cond_lens.is_empty() || values.len() != cardinality {
                    return Err(BayonetError::InvalidInitialization);
                }

                ConditionalTable::prior(values)
            },
            Init::Table(values) => ConditionalTable::new(lens, values)
        }
    }

}
