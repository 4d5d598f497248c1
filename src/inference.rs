//! Collection of local inference routines over conditional tables.
//!
//! `conditional` marginalizes a table against the distributions of its
//! conditioning variables; `marginals` runs it across a whole network in
//! topological order.

use crate::distribution::{Distribution, TOLERANCE};
use crate::network::Network;
use crate::table::ConditionalTable;
use crate::util::{BayonetError, Result};

/// Calculate the marginal distribution of a variable given its conditional
/// probability table and the distributions of its conditioning variables:
///
/// ```text
/// target[s] = sum over conditioning combinations of
///             table[s | combination] * product of conds[i][combination[i]]
/// ```
///
/// The `condlen` conditioning combinations are enumerated with a mixed-radix
/// odometer (increment the last position, carry into earlier positions on
/// overflow). Cumulative products of the selected conditioning entries are
/// kept per position and recomputed only from the position that carried.
/// Each combination's weighted column is scatter-added across the target's
/// states with stride `condlen`.
///
/// Running time: O(condlen * cardinality) - exponential in the number of
/// conditioning variables, which is unavoidable for the exact computation.
///
/// The target is overwritten (zeroed first); the inputs are untouched.
/// Scratch storage is call-local, so concurrent calls may share a table.
///
/// # Errors
/// * `BayonetError::ShapeMismatch` if the distribution count or any length
///   disagrees with the table; nothing is mutated in that case
/// * `BayonetError::Denormalized` if the result sums outside `TOLERANCE`
///   (the conditioning distributions were not normalized)
pub fn conditional(
    table: &ConditionalTable,
    conds: &[&Distribution],
    target: &mut Distribution,
) -> Result<()> {
    let n = conds.len();

    if n != table.nvars() - 1 {
        return Err(BayonetError::ShapeMismatch(
            format!("table over {} variables conditioned by {} distributions",
                    table.nvars(), n)
        ));
    }

    for (i, d) in conds.iter().enumerate() {
        if d.len() != table.len(i + 1) {
            return Err(BayonetError::ShapeMismatch(
                format!("conditioning distribution {} has {} states, table expects {}",
                        i, d.len(), table.len(i + 1))
            ));
        }
    }

    let cardinality = table.cardinality();
    if target.len() != cardinality {
        return Err(BayonetError::ShapeMismatch(
            format!("target has {} states, table expects {}", target.len(), cardinality)
        ));
    }

    let condlen = table.condlen();

    // call-local odometer and cumulative products; val[j + 1] is the product
    // of the first j + 1 selected conditioning entries, val[0] = 1
    let mut idx = vec![0usize; n];
    let mut val = vec![1.0f64; n + 1];
    for j in 0..n {
        val[j + 1] = val[j] * conds[j].get(0);
    }

    target.zero();
    let out = target.values_mut();

    for i in 0..condlen {
        // scatter the weighted column for this combination
        let weight = val[n];
        let mut b = i;
        for s in 0..cardinality {
            out[s] += table.flat(b) * weight;
            b += condlen;
        }

        // advance the odometer; j ends at the highest position that carried
        let mut j = n as isize - 1;
        while j >= 0 {
            let p = j as usize;
            idx[p] += 1;
            if idx[p] == conds[p].len() {
                idx[p] = 0;
                j -= 1;
            } else {
                break;
            }
        }

        if j < 0 {
            // wrapped around; every combination has been visited
            break;
        }

        for p in (j as usize)..n {
            val[p + 1] = val[p] * conds[p].get(idx[p]);
        }
    }

    target.correct(TOLERANCE)
}

/// Perform forward local inference on every variable of the network, in
/// topological order, with whatever evidence is currently set. Observed
/// variables keep their indicator posterior; parentless variables copy
/// their prior; everything else gets `conditional` over its parents'
/// posteriors.
///
/// # Errors
/// * `BayonetError::General` if an observed variable has an unobserved
///   parent - local forward computation cannot account for that evidence
/// * any `conditional` error
pub fn marginals(net: &mut Network) -> Result<()> {
    // evidence nodes must not hang below unobserved parents
    for v in net.variables() {
        if net.is_observed(v) {
            for &p in net.parents(v) {
                if !net.is_observed(p) {
                    return Err(BayonetError::General(
                        format!("parent '{}' of observed variable '{}' has no evidence",
                                net.name(p), net.name(v))
                    ));
                }
            }
        }
    }

    // parents always precede children, so a single pass suffices and every
    // conditioning posterior is final by the time it is read
    for i in 0..net.nodes.len() {
        let (before, rest) = net.nodes.split_at_mut(i);
        let node = &mut rest[0];

        if node.observed {
            node.posterior.choose(node.state);
        } else if node.parents.is_empty() {
            let out = node.posterior.values_mut();
            for s in 0..node.table.cardinality() {
                out[s] = node.table.value(s, 0);
            }
        } else {
            let conds: Vec<&Distribution> = node.parents
                                                .iter()
                                                .map(|p| &before[p.0].posterior)
                                                .collect();
            conditional(&node.table, &conds, &mut node.posterior)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::init::Init;
    use crate::network::NetworkBuilder;
    use itertools::iproduct;

    #[test]
    fn single_condition() {
        // P(t | c) against P(c) = [0.4, 0.6]
        let table = ConditionalTable::new(vec![2, 2], vec![0.9, 0.3, 0.1, 0.7]).unwrap();
        let c = Distribution::from_values(vec![0.4, 0.6]).unwrap();
        let mut target = Distribution::zeros(2);

        conditional(&table, &[&c], &mut target).unwrap();

        assert!((target.get(0) - 0.54).abs() < 1e-12);
        assert!((target.get(1) - 0.46).abs() < 1e-12);
    }

    #[test]
    fn no_conditioning_variables() {
        let table = ConditionalTable::prior(vec![0.3, 0.2, 0.5]).unwrap();
        let mut target = Distribution::zeros(3);

        conditional(&table, &[], &mut target).unwrap();

        assert!((target.get(0) - 0.3).abs() < 1e-12);
        assert!((target.get(1) - 0.2).abs() < 1e-12);
        assert!((target.get(2) - 0.5).abs() < 1e-12);
    }

    /// Check the odometer enumeration against a brute-force sum over the
    /// full Cartesian product of conditioning states.
    #[test]
    fn matches_brute_force() {
        // target ternary, conditioning cardinalities (2, 3, 2)
        let lens = vec![3usize, 2, 3, 2];
        let condlen = 12;
        let values: Vec<f64> = (0..3 * condlen).map(|i| ((i * 7 + 3) % 11) as f64 + 1.0).collect();
        let table = ConditionalTable::new(lens, values).unwrap();

        let d1 = Distribution::from_values(vec![0.3, 0.7]).unwrap();
        let d2 = Distribution::from_values(vec![0.2, 0.5, 0.3]).unwrap();
        let d3 = Distribution::from_values(vec![0.6, 0.4]).unwrap();

        let mut target = Distribution::zeros(3);
        conditional(&table, &[&d1, &d2, &d3], &mut target).unwrap();

        let mut expected = [0.0f64; 3];
        for (a, b, c) in iproduct!(0..2usize, 0..3usize, 0..2usize) {
            let offset = (a * 3 + b) * 2 + c;
            let weight = d1.get(a) * d2.get(b) * d3.get(c);
            for (s, e) in expected.iter_mut().enumerate() {
                *e += table.value(s, offset) * weight;
            }
        }
        let z: f64 = expected.iter().sum();

        for s in 0..3 {
            assert!((target.get(s) - expected[s] / z).abs() < 1e-12);
        }
    }

    #[test]
    fn output_is_normalized() {
        let table = Init::Random.build_table(4, &[3, 2]).unwrap();
        let d1 = Distribution::from_values(vec![0.2, 0.3, 0.5]).unwrap();
        let d2 = Distribution::from_values(vec![0.45, 0.55]).unwrap();
        let mut target = Distribution::zeros(4);

        conditional(&table, &[&d1, &d2], &mut target).unwrap();

        assert!((target.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn shape_errors() {
        let table = ConditionalTable::new(vec![2, 2], vec![0.9, 0.3, 0.1, 0.7]).unwrap();
        let c2 = Distribution::uniform(2);
        let c3 = Distribution::uniform(3);

        // wrong distribution count
        let mut target = Distribution::zeros(2);
        match conditional(&table, &[], &mut target) {
            Err(BayonetError::ShapeMismatch(_)) => (),
            other => panic!("expected ShapeMismatch, got {:?}", other)
        }

        // wrong conditioning length
        match conditional(&table, &[&c3], &mut target) {
            Err(BayonetError::ShapeMismatch(_)) => (),
            other => panic!("expected ShapeMismatch, got {:?}", other)
        }

        // wrong target length; target must be untouched on failure
        let mut target = Distribution::from_values(vec![0.5, 0.25, 0.25]).unwrap();
        match conditional(&table, &[&c2], &mut target) {
            Err(BayonetError::ShapeMismatch(_)) => (),
            other => panic!("expected ShapeMismatch, got {:?}", other)
        }
        assert_eq!(0.5, target.get(0));
    }

    #[test]
    fn denormalized_input() {
        let table = ConditionalTable::new(vec![2, 2], vec![0.9, 0.3, 0.1, 0.7]).unwrap();
        let mut half = Distribution::uniform(2);
        half.values_mut()[0] = 0.25;
        half.values_mut()[1] = 0.25;
        let mut target = Distribution::zeros(2);

        match conditional(&table, &[&half], &mut target) {
            Err(BayonetError::Denormalized(_)) => (),
            other => panic!("expected Denormalized, got {:?}", other)
        }
    }

    /// The classic rain/sprinkler chain, forward pass
    #[test]
    fn marginals_chain() {
        let mut net = NetworkBuilder::new()
            .with_variable("rain", 2, &[], Init::Prior(vec![0.2, 0.8]))
            .with_variable("wet", 2, &["rain"], Init::Table(vec![0.9, 0.25, 0.1, 0.75]))
            .build()
            .unwrap();

        marginals(&mut net).unwrap();

        let rain = net.lookup("rain").unwrap();
        let wet = net.lookup("wet").unwrap();

        assert!((net.posterior(rain).get(0) - 0.2).abs() < 1e-9);
        // P(wet = 0) = 0.9 * 0.2 + 0.25 * 0.8 = 0.38
        assert!((net.posterior(wet).get(0) - 0.38).abs() < 1e-9);
        assert!((net.posterior(wet).sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn marginals_with_evidence() {
        let mut net = NetworkBuilder::new()
            .with_variable("rain", 2, &[], Init::Prior(vec![0.2, 0.8]))
            .with_variable("wet", 2, &["rain"], Init::Table(vec![0.9, 0.25, 0.1, 0.75]))
            .build()
            .unwrap();
        let rain = net.lookup("rain").unwrap();
        let wet = net.lookup("wet").unwrap();

        net.observe(rain, 0).unwrap();
        marginals(&mut net).unwrap();

        assert_eq!(1.0, net.posterior(rain).get(0));
        assert!((net.posterior(wet).get(0) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn marginals_evidence_below_unobserved_parent() {
        let mut net = NetworkBuilder::new()
            .with_variable("rain", 2, &[], Init::Prior(vec![0.2, 0.8]))
            .with_variable("wet", 2, &["rain"], Init::Uniform)
            .build()
            .unwrap();
        let wet = net.lookup("wet").unwrap();

        net.observe(wet, 1).unwrap();
        assert!(matches!(marginals(&mut net), Err(BayonetError::General(_))));
    }

}
