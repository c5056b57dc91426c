use std::fmt::{Debug, Formatter};

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::problem::distance_matrix::DistanceMatrix;
use crate::problem::{Capacity, CustomerId, Num};
use crate::utils::NumIndexVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemVariant {
    Capacitated,
    PrizeCollecting,
    TimeWindowed,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub demand: Capacity,
    pub prize: Num,
    pub ready: Num,
    pub due: Num,
    pub servicetime: Num,
}

impl Node {
    pub fn tw_width(&self) -> Num {
        self.due - self.ready
    }
}

/// Immutable problem data shared read-only across all search trials. The
/// adjacency lists are computed once at construction and never mutated:
/// per node, every *customer* id sorted ascending by distance from that
/// node, self and depot excluded.
pub struct Instance {
    pub name: String,
    variant: ProblemVariant,
    vehicle_capacity: Capacity,
    nodes: NumIndexVec<Node>,
    distance_matrix: DistanceMatrix,
    adjacency: NumIndexVec<Vec<CustomerId>>,
}

impl Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({:?}, {} customers, capacity {})",
            self.name,
            self.variant,
            self.num_customers(),
            self.vehicle_capacity
        )
    }
}

impl Instance {
    pub fn num_customers(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn variant(&self) -> ProblemVariant {
        self.variant
    }

    pub fn vehicle_capacity(&self) -> Capacity {
        self.vehicle_capacity
    }

    pub fn node(&self, customer: CustomerId) -> &Node {
        &self.nodes[customer]
    }

    pub fn depot(&self) -> &Node {
        &self.nodes[0usize]
    }

    pub fn demand(&self, customer: CustomerId) -> Capacity {
        self.nodes[customer].demand
    }

    pub fn prize(&self, customer: CustomerId) -> Num {
        self.nodes[customer].prize
    }

    pub fn distance(&self, from: usize, to: usize) -> Num {
        self.distance_matrix.distance(from, to)
    }

    pub fn distance_between(&self, from: CustomerId, to: CustomerId) -> Num {
        self.distance_matrix.distance(from.index(), to.index())
    }

    pub fn distance_to_depot(&self, customer: CustomerId) -> Num {
        self.distance_matrix.distance(0, customer.index())
    }

    /// Customers sorted ascending by distance from `customer`.
    pub fn neighbors_of(&self, customer: CustomerId) -> &[CustomerId] {
        &self.adjacency[customer]
    }

    pub fn iter_customers(&self) -> impl Iterator<Item = CustomerId> + '_ {
        (1..self.nodes.len()).map(CustomerId::new)
    }
}

pub fn create_instance_with(
    name: String,
    variant: ProblemVariant,
    vehicle_capacity: Capacity,
    nodes: Vec<Node>,
    distance_matrix: DistanceMatrix,
) -> Result<Instance> {
    ensure!(!nodes.is_empty(), "instance needs at least the depot node");
    ensure!(nodes[0].demand == 0, "depot demand must be zero");
    ensure!(
        distance_matrix.dim() == nodes.len(),
        "distance matrix covers {} nodes, instance has {}",
        distance_matrix.dim(),
        nodes.len()
    );
    for (idx, node) in nodes.iter().enumerate() {
        ensure!(
            node.id == idx,
            "node ids must be contiguous, found {} at position {}",
            node.id,
            idx
        );
    }

    let adjacency: NumIndexVec<Vec<CustomerId>> = (0..nodes.len())
        .map(|from| {
            let mut related: Vec<CustomerId> = (1..nodes.len())
                .filter(|&to| to != from)
                .map(CustomerId::new)
                .collect();
            related.sort_by_cached_key(|to| distance_matrix.distance(from, to.index()));
            related
        })
        .collect();

    Ok(Instance {
        name,
        variant,
        vehicle_capacity,
        nodes: NumIndexVec::from_vec(nodes),
        distance_matrix,
        adjacency,
    })
}

#[cfg(test)]
pub(crate) fn plain_node(id: usize, x: f64, y: f64, demand: Capacity) -> Node {
    Node {
        id,
        x,
        y,
        demand,
        prize: Num::ZERO,
        ready: Num::ZERO,
        due: Num::from(1_000),
        servicetime: Num::ZERO,
    }
}

#[cfg(test)]
pub(crate) fn instance_from_coords(
    variant: ProblemVariant,
    vehicle_capacity: Capacity,
    coords: &[(f64, f64)],
) -> Instance {
    let nodes = coords
        .iter()
        .enumerate()
        .map(|(id, &(x, y))| plain_node(id, x, y, if id == 0 { 0 } else { 1 }))
        .collect();
    create_instance_with(
        "test".to_string(),
        variant,
        vehicle_capacity,
        nodes,
        DistanceMatrix::with_euclidean_distances(coords),
    )
    .expect("valid test instance")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_sorted_ascending_and_excludes_self_and_depot() {
        let instance = instance_from_coords(
            ProblemVariant::Capacitated,
            100,
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (10.0, 0.0)],
        );
        for customer in instance.iter_customers() {
            let neighbors = instance.neighbors_of(customer);
            assert_eq!(instance.num_customers() - 1, neighbors.len());
            assert!(neighbors.iter().all(|&n| n != customer));
            for pair in neighbors.windows(2) {
                assert!(
                    instance.distance_between(customer, pair[0])
                        <= instance.distance_between(customer, pair[1])
                );
            }
        }
        // nearest neighbor of customer 2 (at x=2) is customer 1 (at x=1)
        assert_eq!(CustomerId::new(1), instance.neighbors_of(CustomerId::new(2))[0]);
    }

    #[test]
    fn construction_rejects_nonzero_depot_demand() {
        let coords = [(0.0, 0.0), (1.0, 0.0)];
        let mut nodes: Vec<Node> = coords
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| plain_node(id, x, y, 1))
            .collect();
        nodes[0].demand = 3;
        let result = create_instance_with(
            "bad".to_string(),
            ProblemVariant::Capacitated,
            10,
            nodes,
            DistanceMatrix::with_euclidean_distances(&coords),
        );
        assert!(result.is_err());
    }

    #[test]
    fn construction_rejects_mismatched_matrix() {
        let nodes = vec![plain_node(0, 0.0, 0.0, 0), plain_node(1, 1.0, 0.0, 1)];
        let matrix = DistanceMatrix::with_euclidean_distances(&[(0.0, 0.0)]);
        assert!(create_instance_with(
            "bad".to_string(),
            ProblemVariant::Capacitated,
            10,
            nodes,
            matrix
        )
        .is_err());
    }

    #[test]
    fn tw_width_is_due_minus_ready() {
        let mut node = plain_node(1, 0.0, 0.0, 1);
        node.ready = Num::from(10);
        node.due = Num::from(35);
        assert_eq!(Num::from(25), node.tw_width());
    }
}
