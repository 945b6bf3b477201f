use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Golden-ratio increment used to spread shard seeds apart.
const SHARD_STRIDE: u64 = 0x9e3779b97f4a7c15;

/// Random source owned by a single simulation call.
///
/// Never shared between calls: every simulation builds its own from a seed
/// (or from OS entropy), so concurrent simulations cannot perturb each other.
pub struct SimRng {
    rng: ChaCha20Rng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is given, otherwise from OS entropy.
    pub fn from_optional(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::new(entropy_seed()),
        }
    }

    pub fn from_shard(global_seed: u64, shard_id: u64) -> Self {
        // Combine seeds deterministically
        Self::new(shard_seed(global_seed, shard_id))
    }

    pub fn inner(&mut self) -> &mut ChaCha20Rng {
        &mut self.rng
    }
}

pub fn shard_seed(global_seed: u64, shard_id: u64) -> u64 {
    global_seed.wrapping_add(shard_id.wrapping_mul(SHARD_STRIDE))
}

pub fn entropy_seed() -> u64 {
    OsRng.next_u64()
}
