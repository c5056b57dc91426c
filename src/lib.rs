//! Destroy and repair-ordering operators for large neighborhood search over
//! vehicle-routing problems (CVRP, PCVRP, VRPTW).
//!
//! The destroy side ([`ClusterRemoval`], [`RandomRemoval`]) selects a
//! duplicate-free, exactly-sized set of customers to remove from a
//! [`Solution`]; the repair side ([`ReinsertionOrder`]) permutes the removed
//! ids into the sequence in which an external greedy insertion re-offers
//! them. Both operators are stateless between calls and deterministic given
//! a seeded random stream, so independent search trials each own one stream
//! (see [`create_seeded_rng`] and [`create_fast_rng`]).

pub mod lns;
pub mod problem;
pub mod solution;
pub mod utils;

pub use lns::destroy::{select_removal_generic, ClusterRemoval, DestroyOperators, RandomRemoval};
pub use lns::repair::{OrderStrategy, OrderingParameters, ReinsertionOrder, StrategyWeights};
pub use lns::{Parameters, RemovalTarget};
pub use problem::distance_matrix::DistanceMatrix;
pub use problem::instance::{create_instance_with, Instance, Node, ProblemVariant};
pub use problem::{Capacity, CustomerId, Num};
pub use solution::{Solution, Tour};
pub use utils::{create_fast_rng, create_seeded_rng, FastRandom, Random};
