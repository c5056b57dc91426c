use anyhow::{ensure, Result};

use crate::problem::Num;

/// Dense travel distances between all nodes; node 0 is the depot. The matrix
/// is not required to be symmetric.
#[derive(Debug)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<Num>,
}

impl DistanceMatrix {
    pub fn from_distances(n: usize, data: Vec<Num>) -> Result<Self> {
        ensure!(
            data.len() == n * n,
            "distance matrix for {} nodes needs {} entries, got {}",
            n,
            n * n,
            data.len()
        );
        Ok(Self { n, data })
    }

    pub fn with_euclidean_distances(coords: &[(f64, f64)]) -> Self {
        let n = coords.len();
        let mut data = vec![Num::ZERO; n * n];
        for i in 0..n {
            let (xi, yi) = coords[i];
            for j in 0..n {
                if i == j {
                    continue;
                }
                let (xj, yj) = coords[j];
                let euclidean = ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt();
                data[i * n + j] = Num::from(euclidean);
            }
        }
        Self { n, data }
    }

    #[inline(always)]
    fn idx(&self, from: usize, to: usize) -> usize {
        debug_assert!(from < self.n && to < self.n);
        from * self.n + to
    }

    #[inline(always)]
    pub fn distance(&self, from: usize, to: usize) -> Num {
        self.data[self.idx(from, to)]
    }

    pub fn dim(&self) -> usize {
        self.n
    }
}
