use serde::{Deserialize, Serialize};

use crate::seeding::generate_wall;
use crate::types::{Wind, NP, NUM_TILES};

/// Live tiles left after the deal: 136 - 4 * 13 - 14 (dead wall).
pub const LIVE_TILES: u32 = 70;
/// Index of the first live draw.
const FIRST_LIVE: usize = 52;
/// Index of the first replacement (rinshan) draw; rinshan tiles come off the back.
const FIRST_RINSHAN: usize = 135;
pub const MAX_KANS: u32 = 4;

/// Per-physical-tile annotations, valid for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileFlags {
    pub discardable: bool,
    pub is_rinshan: bool,
    pub is_last: bool,
    pub discard_wind: Option<Wind>,
}

impl Default for TileFlags {
    fn default() -> Self {
        Self {
            discardable: true,
            is_rinshan: false,
            is_last: false,
            discard_wind: None,
        }
    }
}

/// The 136-tile wall with its draw pointers and the dead wall layout.
///
/// Dora indicators sit at `130, 128, ...` and ura indicators at `131, 129, ...`
/// (one more per kan); rinshan tiles are drawn from index 135 downwards.
#[derive(Debug, Clone)]
pub struct Wall {
    seed: u64,
    tiles: [u8; NUM_TILES],
    flags: [TileFlags; NUM_TILES],
    kan_num: u32,
    num_remain_tiles: u32,
    tile_pointer: usize,
    rinshan_pointer: usize,
}

impl Wall {
    pub fn new(seed: u64) -> Self {
        let mut tiles = [0u8; NUM_TILES];
        for (i, t) in tiles.iter_mut().enumerate() {
            *t = i as u8;
        }
        Self {
            seed,
            tiles,
            flags: [TileFlags::default(); NUM_TILES],
            kan_num: 0,
            num_remain_tiles: LIVE_TILES,
            tile_pointer: FIRST_LIVE,
            rinshan_pointer: FIRST_RINSHAN,
        }
    }

    /// Reshuffles for a new round and resets every pointer and flag.
    pub fn reset(&mut self, num_game: u32, honba: u32) {
        self.tiles = generate_wall(self.seed, num_game, honba);
        self.flags = [TileFlags::default(); NUM_TILES];
        self.kan_num = 0;
        self.num_remain_tiles = LIVE_TILES;
        self.tile_pointer = FIRST_LIVE;
        self.rinshan_pointer = FIRST_RINSHAN;
    }

    /// Installs `fixed` (if any) as the permutation and returns the four
    /// starting hands, East first.
    pub fn setup(&mut self, fixed: Option<[u8; NUM_TILES]>) -> [Vec<u8>; NP] {
        if let Some(tiles) = fixed {
            self.tiles = tiles;
        }
        std::array::from_fn(|seat| self.tiles[seat * 13..(seat + 1) * 13].to_vec())
    }

    /// Draws the next live tile, or a replacement tile after a kan.
    ///
    /// # Panics
    /// When the live wall is exhausted or a fifth rinshan draw is requested.
    pub fn deal_tile(&mut self, rinshan: bool) -> u8 {
        assert!(self.num_remain_tiles > 0, "no more tiles");
        assert!(
            !(rinshan && self.kan_num == MAX_KANS),
            "no more rinshan tiles"
        );
        self.num_remain_tiles -= 1;
        if rinshan {
            let tile = self.tiles[self.rinshan_pointer];
            self.rinshan_pointer -= 1;
            self.kan_num += 1;
            self.flags[tile as usize].is_rinshan = true;
            tile
        } else {
            let tile = self.tiles[self.tile_pointer];
            self.tile_pointer += 1;
            if self.num_remain_tiles == 0 {
                self.flags[tile as usize].is_last = true;
            }
            tile
        }
    }

    pub fn dora_indicators(&self) -> Vec<u8> {
        (0..=self.kan_num as usize)
            .map(|i| self.tiles[130 - 2 * i])
            .collect()
    }

    pub fn ura_dora_indicators(&self) -> Vec<u8> {
        (0..=self.kan_num as usize)
            .map(|i| self.tiles[131 - 2 * i])
            .collect()
    }

    pub fn current_indicator(&self) -> u8 {
        self.tiles[130 - 2 * self.kan_num as usize]
    }

    pub fn tiles(&self) -> &[u8; NUM_TILES] {
        &self.tiles
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn kan_num(&self) -> u32 {
        self.kan_num
    }

    pub fn num_remain_tiles(&self) -> u32 {
        self.num_remain_tiles
    }

    /// Tiles still physically in the wall (live remainder plus the untouched
    /// part of the dead wall).
    pub fn undrawn_tiles(&self) -> Vec<u8> {
        let live_end = self.tile_pointer + self.num_remain_tiles as usize;
        let mut out: Vec<u8> = self.tiles[self.tile_pointer..live_end.min(NUM_TILES)].to_vec();
        out.extend_from_slice(&self.tiles[live_end.min(NUM_TILES)..=self.rinshan_pointer]);
        out
    }

    pub fn flags(&self, tile: u8) -> &TileFlags {
        &self.flags[tile as usize]
    }

    pub fn is_discardable(&self, tile: u8) -> bool {
        self.flags[tile as usize].discardable
    }

    pub fn set_discardable(&mut self, tile: u8, discardable: bool) {
        self.flags[tile as usize].discardable = discardable;
    }

    pub fn is_last(&self, tile: u8) -> bool {
        self.flags[tile as usize].is_last
    }

    pub fn is_rinshan(&self, tile: u8) -> bool {
        self.flags[tile as usize].is_rinshan
    }

    pub fn discard_wind(&self, tile: u8) -> Option<Wind> {
        self.flags[tile as usize].discard_wind
    }

    pub fn set_discard_wind(&mut self, tile: u8, wind: Wind) {
        self.flags[tile as usize].discard_wind = Some(wind);
    }
}
