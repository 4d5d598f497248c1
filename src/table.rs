//! Defines the `ConditionalTable` - a tabulated conditional probability
//! distribution P(variable | conditioning variables).
//!
//! # Layout
//! The table is a flat array. The entry for own state `s` under conditioning
//! offset `u` lives at index `s * condlen + u`, where `condlen` is the product
//! of the conditioning variables' cardinalities. Conditioning offsets are
//! mixed-radix codes over the conditioning states with the first conditioning
//! variable most significant; `Network::conditioning_offset` produces them.

use crate::util::{BayonetError, Result};

use ndarray::Array1;

#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalTable {
    /// Flat table values, own state major
    values: Array1<f64>,

    /// Cardinality of each table position; `lens[0]` is the target variable,
    /// the rest are the conditioning variables in declaration order
    lens: Vec<usize>,

    /// Product of the conditioning cardinalities
    condlen: usize
}

impl ConditionalTable {

    /// Construct a table over variables with the given cardinalities.
    /// `lens[0]` is the target variable. Each conditioning column is
    /// normalized so that the own-state masses sum to 1.
    ///
    /// # Errors
    /// * `BayonetError::ShapeMismatch` if `lens` is empty, contains a zero,
    ///   or its product disagrees with `values.len()`
    /// * `BayonetError::NegativeProbability` if any entry is negative
    /// * `BayonetError::DegenerateDistribution` if a conditioning column is
    ///   all zero
    pub fn new(lens: Vec<usize>, values: Vec<f64>) -> Result<Self> {
        if lens.is_empty() || lens.contains(&0) {
            return Err(BayonetError::ShapeMismatch(
                format!("invalid table cardinalities {:?}", lens)
            ));
        }

        let condlen: usize = lens[1..].iter().product();
        if lens[0] * condlen != values.len() {
            return Err(BayonetError::ShapeMismatch(
                format!("table of shape {:?} requires {} values, got {}",
                        lens, lens[0] * condlen, values.len())
            ));
        }

        if values.iter().any(|&v| v < 0.0) {
            return Err(BayonetError::NegativeProbability);
        }

        let mut table = ConditionalTable { values: Array1::from_vec(values), lens, condlen };
        table.normalize_columns()?;
        Ok(table)
    }

    /// Construct an unconditional (prior) table from raw weights
    pub fn prior(values: Vec<f64>) -> Result<Self> {
        ConditionalTable::new(vec![values.len()], values)
    }

    /// Number of variables covered by the table, the target included
    pub fn nvars(&self) -> usize {
        self.lens.len()
    }

    /// Product of the conditioning variables' cardinalities
    pub fn condlen(&self) -> usize {
        self.condlen
    }

    /// Cardinality of the target variable
    pub fn cardinality(&self) -> usize {
        self.lens[0]
    }

    /// Cardinality of table position `i` (0 is the target variable)
    pub fn len(&self, i: usize) -> usize {
        self.lens[i]
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// P(own state | conditioning offset)
    pub fn value(&self, state: usize, cond: usize) -> f64 {
        self.values[state * self.condlen + cond]
    }

    /// Raw flat lookup. The sampler walks the table with precomputed strides
    /// rather than re-deriving `(state, cond)` pairs.
    pub(crate) fn flat(&self, idx: usize) -> f64 {
        self.values[idx]
    }

    /// The most likely own state under the given conditioning offset
    /// (lowest index wins ties)
    pub fn most_likely(&self, cond: usize) -> usize {
        let mut best = 0;
        let mut max = self.value(0, cond);

        for state in 1..self.cardinality() {
            let v = self.value(state, cond);
            if v > max {
                max = v;
                best = state;
            }
        }

        best
    }

    /// Divide each conditioning column by its own-state mass
    fn normalize_columns(&mut self) -> Result<()> {
        for cond in 0..self.condlen {
            let mut sum = 0.0;
            for state in 0..self.cardinality() {
                sum += self.value(state, cond);
            }

            if sum <= 0.0 {
                return Err(BayonetError::DegenerateDistribution);
            }

            for state in 0..self.cardinality() {
                self.values[state * self.condlen + cond] /= sum;
            }
        }

        Ok(())
    }

}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn prior() {
        let t = ConditionalTable::prior(vec![0.3, 0.7]).unwrap();
        assert_eq!(1, t.nvars());
        assert_eq!(1, t.condlen());
        assert_eq!(2, t.cardinality());
        assert_eq!(0.3, t.value(0, 0));
        assert_eq!(0.7, t.value(1, 0));
    }

    #[test]
    fn conditional_layout() {
        // P(b | a) with a binary: columns are a = 0 and a = 1
        let t = ConditionalTable::new(vec![2, 2], vec![0.9, 0.3, 0.1, 0.7]).unwrap();
        assert_eq!(2, t.nvars());
        assert_eq!(2, t.condlen());
        assert_eq!(0.9, t.value(0, 0));
        assert_eq!(0.3, t.value(0, 1));
        assert_eq!(0.1, t.value(1, 0));
        assert_eq!(0.7, t.value(1, 1));
    }

    #[test]
    fn columns_normalized() {
        let t = ConditionalTable::new(vec![2, 2], vec![2.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(0.5, t.value(0, 0));
        assert_eq!(0.5, t.value(1, 0));
        assert_eq!(0.25, t.value(0, 1));
        assert_eq!(0.75, t.value(1, 1));
    }

    #[test]
    fn shape_errors() {
        match ConditionalTable::new(vec![], vec![]) {
            Err(BayonetError::ShapeMismatch(_)) => (),
            other => panic!("expected ShapeMismatch, got {:?}", other)
        }

        match ConditionalTable::new(vec![2, 0], vec![1.0, 1.0]) {
            Err(BayonetError::ShapeMismatch(_)) => (),
            other => panic!("expected ShapeMismatch, got {:?}", other)
        }

        match ConditionalTable::new(vec![2, 2], vec![0.5; 3]) {
            Err(BayonetError::ShapeMismatch(_)) => (),
            other => panic!("expected ShapeMismatch, got {:?}", other)
        }
    }

    #[test]
    fn negative_entry() {
        let t = ConditionalTable::new(vec![2], vec![1.1, -0.1]);
        assert_eq!(Err(BayonetError::NegativeProbability), t);
    }

    #[test]
    fn zero_column() {
        let t = ConditionalTable::new(vec![2, 2], vec![0.5, 0.0, 0.5, 0.0]);
        assert_eq!(Err(BayonetError::DegenerateDistribution), t);
    }

    #[test]
    fn most_likely() {
        let t = ConditionalTable::new(vec![3, 2], vec![0.1, 0.6, 0.2, 0.3, 0.7, 0.1]).unwrap();
        assert_eq!(2, t.most_likely(0));
        assert_eq!(0, t.most_likely(1));
    }

}
