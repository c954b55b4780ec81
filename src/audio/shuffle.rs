//! Shuffle order: a permutation of playlist positions plus a cursor.

use rand::Rng;
use rand::thread_rng;

/// Non-sequential traversal order over a playlist of `len` tracks.
///
/// The permutation always holds each index in `0..len` exactly once.
#[derive(Debug, Clone, Default)]
pub struct ShuffleOrder {
    order: Vec<usize>,
    cursor: usize,
}

impl ShuffleOrder {
    /// Build a fresh uniform permutation of `0..len` and reset the cursor.
    pub fn regenerate(&mut self, len: usize) {
        self.regenerate_with(len, &mut thread_rng());
    }

    /// Fisher-Yates over `0..len` with a caller-supplied RNG.
    pub fn regenerate_with<R: Rng + ?Sized>(&mut self, len: usize, rng: &mut R) {
        self.order = (0..len).collect();
        for i in (1..len).rev() {
            let j = rng.gen_range(0..=i);
            self.order.swap(i, j);
        }
        self.cursor = 0;
    }

    /// Move the cursor forward (wrapping) and return the playlist index there.
    pub fn advance(&mut self) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.order.len();
        Some(self.order[self.cursor])
    }

    /// Move the cursor back (wrapping) and return the playlist index there.
    pub fn retreat(&mut self) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + self.order.len() - 1) % self.order.len();
        Some(self.order[self.cursor])
    }

    /// Point the cursor at the slot holding `raw_index`; slot 0 if absent.
    pub fn locate(&mut self, raw_index: usize) {
        self.cursor = self
            .order
            .iter()
            .position(|&i| i == raw_index)
            .unwrap_or(0);
    }
}

#[cfg(test)]
impl ShuffleOrder {
    pub fn new(len: usize) -> Self {
        let mut s = Self::default();
        s.regenerate(len);
        s
    }

    pub fn current(&self) -> Option<usize> {
        self.order.get(self.cursor).copied()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn is_permutation(order: &[usize], len: usize) -> bool {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        sorted == (0..len).collect::<Vec<_>>()
    }

    #[test]
    fn regenerate_produces_a_permutation_for_every_length() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut s = ShuffleOrder::default();
        for len in 0..40 {
            s.regenerate_with(len, &mut rng);
            assert_eq!(s.len(), len);
            assert!(is_permutation(s.as_slice(), len));
            assert_eq!(s.cursor(), 0);
        }
    }

    #[test]
    fn advance_and_retreat_wrap_around() {
        let mut s = ShuffleOrder::new(3);
        let order = s.as_slice().to_vec();

        assert_eq!(s.advance(), Some(order[1]));
        assert_eq!(s.advance(), Some(order[2]));
        assert_eq!(s.advance(), Some(order[0]));
        assert_eq!(s.retreat(), Some(order[2]));
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn empty_order_has_no_next() {
        let mut s = ShuffleOrder::new(0);
        assert_eq!(s.advance(), None);
        assert_eq!(s.retreat(), None);
        assert_eq!(s.current(), None);
    }

    #[test]
    fn locate_finds_every_index_and_defaults_to_zero() {
        let mut s = ShuffleOrder::new(25);
        for raw in 0..25 {
            s.locate(raw);
            assert_eq!(s.current(), Some(raw));
        }
        s.locate(999);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn first_slot_is_roughly_uniform() {
        // 3 elements, 6000 draws: each index should lead about 2000 times.
        let mut rng = StdRng::seed_from_u64(42);
        let mut s = ShuffleOrder::default();
        let mut counts = [0usize; 3];
        for _ in 0..6000 {
            s.regenerate_with(3, &mut rng);
            counts[s.as_slice()[0]] += 1;
        }
        for c in counts {
            assert!((1700..2300).contains(&c), "biased counts: {counts:?}");
        }
    }
}
