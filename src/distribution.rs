//! Defines a discrete probability `Distribution`.
//!
//! A `Distribution` is an ordered sequence of nonnegative reals over the
//! states of a single variable. After normalization it sums to 1 within
//! `TOLERANCE`.

use crate::util::{BayonetError, Result};

use itertools::Itertools;
use ndarray::Array1;

use std::fmt;

/// Tolerance for absorbing floating-point drift when correcting a computed
/// posterior. Sums further than this from 1 indicate malformed inputs, not
/// rounding error.
pub const TOLERANCE: f64 = 5e-5;

#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    values: Array1<f64>
}

impl Distribution {

    /// Construct a distribution of all zeros over `len` states
    pub fn zeros(len: usize) -> Self {
        Distribution { values: Array1::zeros(len) }
    }

    /// Construct the uniform distribution over `len` states
    pub fn uniform(len: usize) -> Self {
        Distribution { values: Array1::from_elem(len, 1.0 / len as f64) }
    }

    /// Construct a distribution from raw weights, normalizing them.
    ///
    /// # Errors
    /// * `BayonetError::NegativeProbability` if any weight is negative
    /// * `BayonetError::DegenerateDistribution` if every weight is zero
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        if values.iter().any(|&v| v < 0.0) {
            return Err(BayonetError::NegativeProbability);
        }

        let mut dist = Distribution { values: Array1::from_vec(values) };
        dist.normalize()?;
        Ok(dist)
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Probability mass of state `i`
    pub fn get(&self, i: usize) -> f64 {
        self.values[i]
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut Array1<f64> {
        &mut self.values
    }

    /// Sum of all mass
    pub fn sum(&self) -> f64 {
        self.values.sum()
    }

    /// Zero every entry
    pub fn zero(&mut self) {
        self.values.fill(0.0);
    }

    /// Set `state` to 1.0 and every other entry to 0.0
    pub fn choose(&mut self, state: usize) {
        self.values.fill(0.0);
        self.values[state] = 1.0;
    }

    /// Index of the most probable state (lowest index wins ties)
    pub fn most_likely(&self) -> usize {
        let mut best = 0;
        for i in 1..self.values.len() {
            if self.values[i] > self.values[best] {
                best = i;
            }
        }
        best
    }

    /// Divide every entry by the total mass.
    ///
    /// # Errors
    /// * `BayonetError::DegenerateDistribution` if the total mass is zero
    pub fn normalize(&mut self) -> Result<()> {
        let sum = self.sum();
        if sum <= 0.0 {
            return Err(BayonetError::DegenerateDistribution);
        }

        self.values.mapv_inplace(|v| v / sum);
        Ok(())
    }

    /// Renormalize a distribution whose sum has drifted from 1 by at most
    /// `tol`. Multiplication error makes computed posteriors slightly
    /// denormalized; anything beyond `tol` is treated as bad input.
    ///
    /// # Errors
    /// * `BayonetError::Denormalized` if the sum is further than `tol` from 1
    /// * `BayonetError::DegenerateDistribution` if the total mass is zero
    pub fn correct(&mut self, tol: f64) -> Result<()> {
        let sum = self.sum();
        if (1.0 - sum).abs() > tol {
            return Err(BayonetError::Denormalized(sum));
        }

        self.normalize()
    }

}

impl fmt::Display for Distribution {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}}}", self.values.iter().format(", "))
    }

}
