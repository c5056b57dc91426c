#[cfg(test)]
use std::fmt::Debug;
use std::iter::FromIterator;
use std::mem::transmute;
use std::ops::{Index, IndexMut, Range};

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::{Pcg32, Pcg64Mcg};

use crate::problem::CustomerId;

pub mod num;
pub mod rcl;

/// The per-worker random stream. Every operator call draws from a stream
/// owned by exactly one search trial; nothing is shared or global.
pub type Random = Pcg64Mcg;

/// Cheaper, lower-quality stream for hot inner loops where throughput
/// matters more than statistical quality.
pub type FastRandom = Pcg32;

pub fn create_seeded_rng(seed: i128) -> Random {
    let raw_bytes: [u8; 16] = unsafe { transmute(seed) };
    let mut rng = Pcg64Mcg::from_seed(raw_bytes);
    // discard the first three
    rng.next_u64();
    rng.next_u64();
    rng.next_u64();
    rng
}

pub fn create_fast_rng(seed: u64) -> FastRandom {
    let mut rng = Pcg32::seed_from_u64(seed);
    // discard the first three
    rng.next_u32();
    rng.next_u32();
    rng.next_u32();
    rng
}

/// Draws an index with probability proportional to its weight. An all-zero
/// weight vector is a configuration fault; release builds fall back to the
/// last index.
pub fn weighted_index<R: Rng>(rng: &mut R, weights: &[u32]) -> usize {
    let total: u32 = weights.iter().sum();
    debug_assert!(total > 0, "weighted draw over all-zero weights");
    if total == 0 {
        return weights.len().saturating_sub(1);
    }
    let mut w = rng.gen_range(0..total);
    for (idx, weight) in weights.iter().enumerate() {
        if w < *weight {
            return idx;
        }
        w -= *weight;
    }
    weights.len() - 1
}

/// Vec with unchecked-in-release indexing by the id types used throughout
/// the crate, customer ids included.
pub struct NumIndexVec<T> {
    data: Vec<T>,
}

impl<T: Clone> NumIndexVec<T> {
    pub fn with_default(size: usize, default: T) -> Self {
        Self {
            data: vec![default; size],
        }
    }
}

impl<T> NumIndexVec<T> {
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

macro_rules! impl_index_t {
    ($t:ty) => {
        impl<T> Index<$t> for NumIndexVec<T> {
            type Output = T;

            #[inline(always)]
            fn index(&self, index: $t) -> &Self::Output {
                debug_assert!((index as usize) < self.data.len());
                unsafe { self.data.get_unchecked(index as usize) }
            }
        }

        impl<T> IndexMut<$t> for NumIndexVec<T> {
            #[inline(always)]
            fn index_mut(&mut self, index: $t) -> &mut Self::Output {
                debug_assert!((index as usize) < self.data.len());
                unsafe { self.data.get_unchecked_mut(index as usize) }
            }
        }

        impl<T> Index<Range<$t>> for NumIndexVec<T> {
            type Output = [T];

            #[inline(always)]
            fn index(&self, index: Range<$t>) -> &Self::Output {
                self.data.index(index.start as usize..index.end as usize)
            }
        }
    };
}

impl_index_t!(usize);
impl_index_t!(u32);
impl_index_t!(u16);

impl<T> Index<CustomerId> for NumIndexVec<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: CustomerId) -> &Self::Output {
        debug_assert!(index.index() < self.data.len());
        unsafe { self.data.get_unchecked(index.index()) }
    }
}

impl<T> IndexMut<CustomerId> for NumIndexVec<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: CustomerId) -> &mut Self::Output {
        debug_assert!(index.index() < self.data.len());
        unsafe { self.data.get_unchecked_mut(index.index()) }
    }
}

impl<T> FromIterator<T> for NumIndexVec<T> {
    fn from_iter<E: IntoIterator<Item = T>>(iter: E) -> Self {
        Self {
            data: Vec::from_iter(iter),
        }
    }
}

#[cfg(test)]
pub fn assert_vec_eq<T: PartialEq + Eq + Debug>(expect: &Vec<T>, actual: &Vec<T>) {
    assert_eq!(
        expect.len(),
        actual.len(),
        "sizes of the vecs differ (expect: {}, actual: {})",
        expect.len(),
        actual.len()
    );
    for (idx, (x, y)) in expect.iter().zip(actual.iter()).enumerate() {
        assert_eq!(
            x, y,
            "vecs differ at index {} ({:?} != {:?})\n expect: {:?}\n actual: {:?}",
            idx, x, y, &expect, &actual
        );
    }
}
