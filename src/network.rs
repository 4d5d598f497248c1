//! Defines the `Network` - a directed acyclic graph of discrete variables.
//!
//! # Representation
//! Variables live in a network-owned arena and refer to each other by
//! `VarId` index, so the mutually-referencing parent/child graph carries no
//! ownership cycles. Variables are stored in topological order: the builder
//! only accepts parents that are already present, so a parent's index is
//! always lower than its children's.

use crate::distribution::Distribution;
use crate::init::Init;
use crate::sampler::Blanket;
use crate::table::ConditionalTable;
use crate::util::{BayonetError, Result};

use indexmap::IndexMap;

/// Index of a variable in its `Network`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VarId(pub(crate) usize);

/// A single variable of the network
#[derive(Clone, Debug)]
pub(crate) struct Node {

    /// Printable name of the variable
    pub(crate) name: String,

    /// Parent links, in the order the conditional table was populated
    pub(crate) parents: Vec<VarId>,

    /// Child links
    pub(crate) children: Vec<VarId>,

    /// Current state (for markov chain simulation)
    pub(crate) state: usize,

    /// Whether the variable is clamped to an observed state
    pub(crate) observed: bool,

    /// Posterior (marginal or full-conditional) distribution
    pub(crate) posterior: Distribution,

    /// Conditional probability table P(self | parents)
    pub(crate) table: ConditionalTable,

    /// Counts how often each state was sampled
    pub(crate) histogram: Vec<u64>,

    /// Precomputed markov blanket strides and working offsets
    pub(crate) blanket: Blanket

}

impl Node {

    pub(crate) fn cardinality(&self) -> usize {
        self.table.cardinality()
    }

}

/// A directed model over discrete variables. Construct one with
/// `NetworkBuilder`; query and sample it through `inference` and `sampler`.
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    names: IndexMap<String, VarId>
}

impl Network {

    /// Number of variables in the network
    pub fn num_variables(&self) -> usize {
        self.nodes.len()
    }

    /// All variables, in topological order
    pub fn variables(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.nodes.len()).map(VarId)
    }

    /// Find a variable by name
    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.names.get(name).copied()
    }

    /// Name of a variable
    pub fn name(&self, v: VarId) -> &str {
        &self.nodes[v.0].name
    }

    /// Number of states of a variable
    pub fn cardinality(&self, v: VarId) -> usize {
        self.nodes[v.0].cardinality()
    }

    pub fn parents(&self, v: VarId) -> &[VarId] {
        &self.nodes[v.0].parents
    }

    pub fn children(&self, v: VarId) -> &[VarId] {
        &self.nodes[v.0].children
    }

    /// Current sampled (or observed) state of a variable
    pub fn state(&self, v: VarId) -> usize {
        self.nodes[v.0].state
    }

    pub fn is_observed(&self, v: VarId) -> bool {
        self.nodes[v.0].observed
    }

    /// The variable's posterior distribution. During sampling this holds the
    /// full conditional of the most recent step and remains queryable.
    pub fn posterior(&self, v: VarId) -> &Distribution {
        &self.nodes[v.0].posterior
    }

    /// The variable's conditional probability table
    pub fn table(&self, v: VarId) -> &ConditionalTable {
        &self.nodes[v.0].table
    }

    /// Per-state sample counts accumulated since the last `markov_init`
    pub fn histogram(&self, v: VarId) -> &[u64] {
        &self.nodes[v.0].histogram
    }

    /// Empirical marginal of a variable computed from its sample histogram.
    /// Observed variables report their (indicator) posterior.
    ///
    /// # Errors
    /// * `BayonetError::General` if no samples have been recorded
    pub fn average(&self, v: VarId) -> Result<Distribution> {
        let node = &self.nodes[v.0];

        if node.observed {
            return Ok(node.posterior.clone());
        }

        if node.histogram.iter().all(|&c| c == 0) {
            return Err(BayonetError::General(
                format!("no samples recorded for variable '{}'", node.name)
            ));
        }

        Distribution::from_values(node.histogram.iter().map(|&c| c as f64).collect())
    }

    /// Clamp a variable to `state` as evidence. The posterior becomes the
    /// indicator distribution of that state, and the variable is excluded
    /// from sampling until `clear_observed`.
    ///
    /// # Errors
    /// * `BayonetError::InvalidState` if `state` is out of range
    pub fn observe(&mut self, v: VarId, state: usize) -> Result<()> {
        let node = &mut self.nodes[v.0];

        if state >= node.cardinality() {
            return Err(BayonetError::InvalidState(state));
        }

        node.state = state;
        node.observed = true;
        node.posterior.choose(state);
        Ok(())
    }

    /// Remove the evidence mark from a variable. Its state is left where the
    /// evidence put it.
    pub fn clear_observed(&mut self, v: VarId) {
        self.nodes[v.0].observed = false;
    }

    /// Encode the current states of a variable's parents into the linear
    /// conditioning offset of its table.
    ///
    /// Parents are walked in reverse declaration order, accumulating
    /// `idx += base * parent.state; base *= parent.cardinality`, which makes
    /// the first-declared parent most significant - the same convention the
    /// table was populated with. The mapping is a bijection between parent
    /// state combinations and `[0, condlen)`.
    pub fn conditioning_offset(&self, v: VarId) -> usize {
        let mut idx = 0;
        let mut base = 1;

        for &p in self.nodes[v.0].parents.iter().rev() {
            let parent = &self.nodes[p.0];
            idx += base * parent.state;
            base *= parent.cardinality();
        }

        idx
    }

}

/// An implementation of the builder pattern for creating a `Network`.
///
/// Variables must be added in topological order: every parent named in a
/// `with_variable` call must already be in the model. Errors are latched and
/// reported by `build`.
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    names: IndexMap<String, VarId>,
    err: Option<BayonetError>
}

impl NetworkBuilder {

    /// Construct a `NetworkBuilder` representing an empty `Network`
    pub fn new() -> Self {
        NetworkBuilder {
            nodes: Vec::new(),
            names: IndexMap::new(),
            err: None
        }
    }

    /// Add a variable to the network.
    ///
    /// # Args
    /// * `name`: the variable's name, unique within the network
    /// * `cardinality`: the number of states, at least 1
    /// * `parents`: names of the conditioning variables, in the order the
    ///   table is populated. All must already be in the model.
    /// * `init`: the initialization for the variable's table
    pub fn with_variable(
        mut self,
        name: &str,
        cardinality: usize,
        parents: &[&str],
        init: Init,
    ) -> Self {
        // a latched error suppresses all further work
        if self.err.is_some() {
            return self;
        }

        if cardinality == 0 {
            self.err = Some(BayonetError::ShapeMismatch(
                format!("variable '{}' must have at least one state", name)
            ));
            return self;
        }

        if self.names.contains_key(name) {
            self.err = Some(BayonetError::DuplicateVariable(String::from(name)));
            return self;
        }

        let mut parent_ids = Vec::with_capacity(parents.len());
        for &p in parents {
            match self.names.get(p) {
                Some(&id) => {
                    if parent_ids.contains(&id) {
                        self.err = Some(BayonetError::DuplicateVariable(String::from(p)));
                        return self;
                    }
                    parent_ids.push(id);
                },
                None => {
                    self.err = Some(BayonetError::MissingParent(String::from(p)));
                    return self;
                }
            }
        }

        let cond_lens: Vec<usize> = parent_ids.iter()
                                              .map(|&p| self.nodes[p.0].cardinality())
                                              .collect();

        let table = match init.build_table(cardinality, &cond_lens) {
            Ok(t) => t,
            Err(e) => {
                self.err = Some(e);
                return self;
            }
        };

        let id = VarId(self.nodes.len());
        for &p in &parent_ids {
            self.nodes[p.0].children.push(id);
        }

        self.nodes.push(Node {
            name: String::from(name),
            parents: parent_ids,
            children: Vec::new(),
            state: 0,
            observed: false,
            posterior: Distribution::uniform(cardinality),
            table,
            histogram: vec![0; cardinality],
            blanket: Blanket::default()
        });
        self.names.insert(String::from(name), id);

        self
    }

    /// Complete building the model.
    ///
    /// # Returns
    /// the `Network`, or the first error encountered during building
    pub fn build(self) -> Result<Network> {
        if let Some(e) = self.err {
            return Err(e);
        }

        log::debug!("built network with {} variables", self.nodes.len());
        Ok(Network { nodes: self.nodes, names: self.names })
    }

}

impl Default for NetworkBuilder {

    fn default() -> Self {
        NetworkBuilder::new()
    }

}
