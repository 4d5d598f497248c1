//! bayonet - approximate inference on discrete Bayesian networks.
//!
//! A network of discrete variables is assembled with `NetworkBuilder`, each
//! variable carrying a conditional probability table over its parents.
//! Posteriors are then obtained either by forward local inference
//! (`inference::marginals`) or by Markov blanket Gibbs sampling
//! (`GibbsSampler`), with evidence clamped through `Network::observe`.

pub mod distribution;
pub mod inference;
pub mod init;
pub mod network;
pub mod sampler;
pub mod table;
pub mod util;

pub use distribution::Distribution;
pub use init::Init;
pub use network::{Network, NetworkBuilder, VarId};
pub use sampler::{markov_init, GibbsSampler};
pub use table::ConditionalTable;
pub use util::{BayonetError, Result};
