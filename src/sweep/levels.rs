//! Skip-level sampling shared by the beach line and the event queue

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Draws the number of skip levels for a newly inserted node
///
/// One uniform draw in `[0, 2^(depth+1)]` is turned into
/// `depth - floor(log2(max(draw, 1)))`, saturating at zero. Each extra level
/// is about half as likely as the previous one.
#[derive(Debug, Clone)]
pub struct LevelSampler {
    rng: ChaCha8Rng,
    depth: usize,
}

impl LevelSampler {
    pub fn new(depth: usize, seed: u64) -> Self {
        debug_assert!(depth < 31);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            depth,
        }
    }

    #[inline]
    pub fn sample(&mut self) -> usize {
        let draw: u32 = self.rng.gen_range(0..=(1u32 << (self.depth + 1)));
        let log = draw.max(1).ilog2() as usize;
        self.depth.saturating_sub(log)
    }
}
