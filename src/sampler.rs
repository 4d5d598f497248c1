//! Markov blanket Gibbs sampling over a `Network`.
//!
//! Each transition resamples one variable from its full conditional given
//! its Markov blanket (parents, children, and the children's co-parents),
//! so a step costs O(states * children) instead of a pass over the joint -
//! the property that keeps MCMC tractable on large networks.

use crate::network::{Network, VarId};
use crate::util::{BayonetError, Result};

use rand::Rng;

use std::mem;

/// Precomputed per-variable sampling state.
///
/// For each child, `base` holds the stride by which this variable's
/// candidate state shifts the offset into the child's table, and `idx` holds
/// the running table offset during a step. `scratch` stages the unnormalized
/// full conditional so a failed step leaves the posterior untouched.
#[derive(Clone, Debug, Default)]
pub(crate) struct Blanket {
    pub(crate) base: Vec<usize>,
    pub(crate) idx: Vec<usize>,
    pub(crate) scratch: Vec<f64>
}

/// Prepare a variable for sampling: zero its histogram, rebuild the
/// per-child stride/offset storage, and seed its state with the most likely
/// state given its parents' current states. A no-op for observed variables.
///
/// The stride for child `c` is the product of the cardinalities of the
/// conditioning variables declared after this variable in `c`'s own
/// conditioning order - the mixed-radix step size of this variable's
/// position in `c`'s table.
///
/// Safe to re-invoke; prior storage is dropped and rebuilt. Must precede any
/// `step` on the variable.
pub fn markov_init(net: &mut Network, v: VarId) -> Result<()> {
    if net.nodes[v.0].observed {
        return Ok(());
    }

    let node = &net.nodes[v.0];
    let mut base = Vec::with_capacity(node.children.len());

    for &c in &node.children {
        let child = &net.nodes[c.0];
        let mut stride = 1;
        for &p in child.parents.iter().rev() {
            if p == v {
                break;
            }
            stride *= net.nodes[p.0].cardinality();
        }
        base.push(stride);
    }

    let state = node.table.most_likely(net.conditioning_offset(v));
    let nchildren = node.children.len();
    let cardinality = node.cardinality();

    let node = &mut net.nodes[v.0];
    node.state = state;
    node.histogram.fill(0);
    node.blanket = Blanket {
        base,
        idx: vec![0; nchildren],
        scratch: vec![0.0; cardinality]
    };

    Ok(())
}

/// Advance one variable through a single Gibbs transition: compute its full
/// conditional given the current blanket states, draw the next state by
/// inverse CDF, record it in the histogram, and return it. Observed
/// variables are skipped (their state is returned unchanged).
///
/// All-or-nothing: on error the variable's state, posterior, and histogram
/// are exactly as before the call. The blanket's running offsets carry no
/// information between calls; they are recomputed fresh each time.
///
/// # Errors
/// * `BayonetError::General` if `markov_init` has not run for the variable
/// * `BayonetError::DegenerateDistribution` if every candidate state has
///   zero probability under the blanket
pub(crate) fn step_var<R: Rng>(
    net: &mut Network,
    v: VarId,
    rng: &mut R,
) -> Result<usize> {
    if net.nodes[v.0].observed {
        return Ok(net.nodes[v.0].state);
    }

    if net.nodes[v.0].blanket.scratch.len() != net.nodes[v.0].cardinality() {
        return Err(BayonetError::General(
            format!("variable '{}' was not initialized for sampling", net.nodes[v.0].name)
        ));
    }

    let mut blanket = mem::take(&mut net.nodes[v.0].blanket);

    let node = &net.nodes[v.0];
    let cardinality = node.cardinality();
    let condlen = node.table.condlen();

    // offset of the parents' current states into our own table; constant
    // across candidate states
    let pt = net.conditioning_offset(v);

    // each child's table offset for its actual state and parent states,
    // rebased to our candidate state zero
    for (j, &c) in node.children.iter().enumerate() {
        let child = &net.nodes[c.0];
        let offset = net.conditioning_offset(c) + child.table.condlen() * child.state;
        blanket.idx[j] = offset - node.state * blanket.base[j];
    }

    // unnormalized full conditional over candidate states
    let mut sum = 0.0;
    let mut own = pt;
    for i in 0..cardinality {
        let mut p = node.table.flat(own);
        own += condlen;

        for (j, &c) in node.children.iter().enumerate() {
            p *= net.nodes[c.0].table.flat(blanket.idx[j]);
            blanket.idx[j] += blanket.base[j];
        }

        blanket.scratch[i] = p;
        sum += p;
    }

    if sum <= 0.0 {
        net.nodes[v.0].blanket = blanket;
        return Err(BayonetError::DegenerateDistribution);
    }

    // inverse-CDF draw; floating-point shortfall selects the last state
    let q: f64 = rng.gen();
    let mut acc = 0.0;
    let mut selected = cardinality - 1;
    for (i, &p) in blanket.scratch.iter().enumerate() {
        acc += p / sum;
        if acc > q {
            selected = i;
            break;
        }
    }

    let node = &mut net.nodes[v.0];
    let posterior = node.posterior.values_mut();
    for (i, &p) in blanket.scratch.iter().enumerate() {
        posterior[i] = p / sum;
    }
    node.blanket = blanket;
    node.state = selected;
    node.histogram[selected] += 1;

    Ok(selected)
}

/// A Gibbs `Sampler` over a `Network` with an injected random source.
///
/// Construction initializes every variable's blanket storage; `sweep`
/// resamples each non-observed variable once, in topological order, and
/// `run` performs a fixed number of sweeps. Given the same seed and network
/// the state trajectory is identical across runs.
pub struct GibbsSampler<'a, R: Rng> {
    network: &'a mut Network,
    rng: R
}

impl<'a, R: Rng> GibbsSampler<'a, R> {

    /// Construct a new `GibbsSampler` over the network, running
    /// `markov_init` on every variable
    pub fn new(network: &'a mut Network, rng: R) -> Result<Self> {
        let vars: Vec<VarId> = network.variables().collect();
        for v in vars {
            markov_init(network, v)?;
        }

        log::debug!("initialized markov blankets for {} variables", network.num_variables());
        Ok(GibbsSampler { network, rng })
    }

    /// Resample a single variable; see `step_var`
    pub fn step(&mut self, v: VarId) -> Result<usize> {
        step_var(self.network, v, &mut self.rng)
    }

    /// Resample every non-observed variable once, in topological order
    pub fn sweep(&mut self) -> Result<()> {
        for i in 0..self.network.num_variables() {
            let v = VarId(i);
            if !self.network.is_observed(v) {
                step_var(self.network, v, &mut self.rng)?;
            }
        }

        Ok(())
    }

    /// Perform `iterations` sweeps
    pub fn run(&mut self, iterations: usize) -> Result<()> {
        for _ in 0..iterations {
            self.sweep()?;
        }

        Ok(())
    }

    /// The network being sampled
    pub fn network(&self) -> &Network {
        self.network
    }

}
