use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::lns::destroy::cluster_removal::ClusterRemovalParameters;
use crate::lns::repair::OrderingParameters;
use crate::problem::instance::Instance;

pub mod destroy;
pub mod repair;

/// How many customers a destroy call should remove. Drawn per call and
/// clamped to `[0, num_customers]`; a draw of 0 against a non-empty instance
/// is raised to 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RemovalTarget {
    Absolute { min: usize, max: usize },
    Fraction { min: f64, max: f64 },
}

impl RemovalTarget {
    pub fn draw<R: Rng>(&self, num_customers: usize, rng: &mut R) -> usize {
        if num_customers == 0 {
            return 0;
        }
        let drawn = match self {
            RemovalTarget::Absolute { min, max } => {
                debug_assert!(min <= max);
                rng.gen_range(*min..=(*max).max(*min))
            }
            RemovalTarget::Fraction { min, max } => {
                debug_assert!(min <= max);
                let fraction = rng.gen_range(*min..=(*max).max(*min));
                (fraction * num_customers as f64).round() as usize
            }
        };
        drawn.min(num_customers).max(1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub target: RemovalTarget,
    pub cluster: ClusterRemovalParameters,
    pub ordering: OrderingParameters,
}

impl Parameters {
    pub fn default_for_instance(instance: &Instance) -> Self {
        Self {
            target: RemovalTarget::Absolute { min: 5, max: 30 },
            cluster: ClusterRemovalParameters::default(),
            ordering: OrderingParameters::default_for_variant(instance.variant()),
        }
    }
}
