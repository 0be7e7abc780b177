//! Deterministic RNG seeding and wall shuffle.
//!
//! - Per-round wall seed via a SHA-256 KDF over `(game_seed, num_game, honba)`
//! - Vendored Fisher-Yates shuffle for cross-version determinism
//! - Session-level RNG producing independent per-game seeds
//!
//! # Determinism guarantee
//!
//! Given the same `(game_seed, num_game, honba)` tuple, [`generate_wall`]
//! produces an identical 136-tile wall on any platform and Rust version.
//! Nothing else in the engine draws randomness, so a game is fully determined
//! by its seed and the calls submitted by the driver.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::types::NUM_TILES;

/// Vendored Fisher-Yates shuffle.
///
/// Does not depend on `rand::seq::SliceRandom`, whose internal algorithm may
/// change across rand versions; the output is fixed for a given RNG stream.
pub fn fisher_yates_shuffle<T>(slice: &mut [T], rng: &mut impl Rng) {
    for i in (1..slice.len()).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

/// `SHA-256(game_seed_le || num_game_le || honba_le)`, usable as a
/// `ChaCha8Rng` seed.
pub fn derive_round_seed(game_seed: u64, num_game: u32, honba: u32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(game_seed.to_le_bytes());
    hasher.update(num_game.to_le_bytes());
    hasher.update(honba.to_le_bytes());
    hasher.finalize().into()
}

/// Shuffled wall of physical tile ids (0..136) for one round.
pub fn generate_wall(game_seed: u64, num_game: u32, honba: u32) -> [u8; NUM_TILES] {
    let seed = derive_round_seed(game_seed, num_game, honba);
    let mut rng = ChaCha8Rng::from_seed(seed);

    let mut wall = [0u8; NUM_TILES];
    for (i, tile) in wall.iter_mut().enumerate() {
        // NUM_TILES = 136 fits in u8
        *tile = i as u8;
    }
    fisher_yates_shuffle(&mut wall, &mut rng);
    wall
}

/// A deterministic session RNG that hands out per-game seeds.
///
/// # Example
///
/// ```
/// use kyoku_engine::seeding::SessionRng;
///
/// let mut session = SessionRng::new([0u8; 32]);
/// let seed_0 = session.next_game_seed();
/// let seed_1 = session.next_game_seed();
/// assert_ne!(seed_0, seed_1);
/// ```
pub struct SessionRng {
    seed: [u8; 32],
    game_index: u64,
}

impl SessionRng {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            seed,
            game_index: 0,
        }
    }

    /// Session seed built from a plain integer, for tests and CLIs.
    pub fn from_u64(seed: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&seed.to_le_bytes());
        Self::new(bytes)
    }

    pub fn game_index(&self) -> u64 {
        self.game_index
    }

    /// Derives `SHA-256(session_seed || game_index_le)` and advances the counter.
    pub fn next_game_seed(&mut self) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(self.game_index.to_le_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        self.game_index += 1;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(buf)
    }
}
