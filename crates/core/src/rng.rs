//! RNG module - seeded color draws and the pair queue
//!
//! Every simulation owns its own generators, so a seed fully determines the
//! sequence of pairs and the scatter of garbage. Nothing here is global.

use puyo_duel_types::{Puyo, COLORS, NEXT_COUNT};

use crate::pair::PuyoPair;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales the full 32-bit output instead of taking a remainder: the low
    /// bits of an LCG with a power-of-two modulus have very short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((u64::from(self.next_u32()) * u64::from(max)) >> 32) as u32
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Draw one of the four pair colors
    pub fn next_color(&mut self) -> Puyo {
        COLORS[self.next_range(COLORS.len() as u32) as usize]
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// The falling pair followed by its previews
#[derive(Debug, Clone)]
pub struct PairQueue {
    pairs: [PuyoPair; NEXT_COUNT],
    rng: SimpleRng,
}

impl PairQueue {
    /// Create a queue filled from the given seed
    pub fn new(seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let pairs = std::array::from_fn(|_| Self::draw(&mut rng));
        Self { pairs, rng }
    }

    fn draw(rng: &mut SimpleRng) -> PuyoPair {
        let pivot = rng.next_color();
        let satellite = rng.next_color();
        PuyoPair::new(pivot, satellite)
    }

    /// The pair under control
    pub fn current(&self) -> PuyoPair {
        self.pairs[0]
    }

    /// Replace the pair under control (position, rotation or colors)
    pub fn set_current(&mut self, pair: PuyoPair) {
        self.pairs[0] = pair;
    }

    /// Pair at queue position `index` (0 is the current one)
    pub fn get(&self, index: usize) -> PuyoPair {
        self.pairs[index]
    }

    /// The pairs after the current one
    pub fn previews(&self) -> &[PuyoPair] {
        &self.pairs[1..]
    }

    pub fn pairs(&self) -> &[PuyoPair; NEXT_COUNT] {
        &self.pairs
    }

    /// Drop the current pair, move the previews up and draw a new last pair
    pub fn advance(&mut self) {
        self.pairs.rotate_left(1);
        self.pairs[NEXT_COUNT - 1] = Self::draw(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), rng.next_u32());
    }

    #[test]
    fn test_next_range_bounds() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            assert!(rng.next_range(6) < 6);
        }
    }

    #[test]
    fn test_colors_are_not_periodic() {
        // taking `% 4` of this LCG would repeat every 4 draws
        let mut rng = SimpleRng::new(99);
        let draws: Vec<Puyo> = (0..64).map(|_| rng.next_color()).collect();
        let periodic = draws.chunks(4).all(|c| c == &draws[..4]);
        assert!(!periodic);
        for color in COLORS {
            assert!(draws.contains(&color), "{:?} never drawn", color);
        }
        assert!(!draws.contains(&Puyo::Garbage));
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = SimpleRng::new(3);
        let mut cols = [0usize, 1, 2, 3, 4, 5];
        rng.shuffle(&mut cols);
        let mut sorted = cols;
        sorted.sort_unstable();
        assert_eq!(sorted, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_queue_advance_shifts_previews() {
        let mut queue = PairQueue::new(42);
        let second = queue.get(1);
        let third = queue.get(2);
        queue.advance();
        assert_eq!(queue.current(), second);
        assert_eq!(queue.get(1), third);
        assert_eq!(queue.previews().len(), NEXT_COUNT - 1);
    }

    #[test]
    fn test_queue_same_seed_same_pairs() {
        let mut a = PairQueue::new(2024);
        let mut b = PairQueue::new(2024);
        for _ in 0..20 {
            assert_eq!(a.current(), b.current());
            a.advance();
            b.advance();
        }
    }
}
