use rand::Rng;

use crate::problem::Num;

/// Restricted candidate list: keeps the `SIZE` entries with the smallest keys
/// seen so far, in ascending key order.
pub struct RCL<T, const SIZE: usize> {
    list: Vec<(Num, T)>,
}

impl<T, const SIZE: usize> RCL<T, SIZE> {
    pub fn new() -> Self {
        Self {
            list: Vec::with_capacity(SIZE),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Num, T)> {
        self.list.iter()
    }

    pub fn push(&mut self, element: (Num, T)) {
        let at = self.list.partition_point(|(key, _)| *key <= element.0);
        if at >= SIZE {
            return;
        }
        if self.list.len() == SIZE {
            self.list.pop();
        }
        self.list.insert(at, element);
    }

    /// Takes the entry with the smallest key and resets the list.
    pub fn pop_first_and_clear(&mut self) -> T {
        let (_key, item) = self.list.swap_remove(0);
        self.list.clear();
        item
    }

    /// Takes a uniformly random entry among the kept candidates and resets
    /// the list.
    pub fn pop_random_and_clear<R: Rng>(&mut self, rng: &mut R) -> T {
        let at = rng.gen_range(0..self.list.len());
        let (_key, item) = self.list.swap_remove(at);
        self.list.clear();
        item
    }
}

impl<T, const SIZE: usize> Default for RCL<T, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}
