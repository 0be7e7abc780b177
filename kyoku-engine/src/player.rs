use crate::call::Call;
use crate::scoring::ScoringAdapter;
use crate::types::{is_yaochu, tile_class, Wind};

/// Insert `tile` into a sorted hand, maintaining sort order.
#[inline]
pub(crate) fn sorted_insert(hand: &mut Vec<u8>, tile: u8) {
    let pos = hand.partition_point(|&t| t < tile);
    hand.insert(pos, tile);
}

/// Removes one copy of `tile`; `false` when it is not held.
pub(crate) fn remove_tile(tiles: &mut Vec<u8>, tile: u8) -> bool {
    match tiles.iter().position(|&t| t == tile) {
        Some(pos) => {
            tiles.remove(pos);
            true
        }
        None => false,
    }
}

/// One seat's round state. Indexed by physical player, not by wind.
#[derive(Debug, Clone)]
pub struct Player {
    pub points: i32,
    pub wind: Wind,
    pub jun_num: u32,
    pub kan_num: u32,

    /// Sorted, except that a fresh draw sits at the end until discarded.
    pub hand_tiles: Vec<u8>,
    pub discard_tiles: Vec<u8>,
    pub tiles_tsumo_giri: Vec<bool>,
    /// Discards still lying in front of the player (claimed ones are removed).
    pub board_tiles: Vec<u8>,
    pub melds: Vec<Call>,

    pub shanten_num: i32,
    /// Winning classes while tenpai, empty otherwise.
    pub tenpai_slice: Vec<u8>,

    pub jun_furiten: bool,
    pub discard_furiten: bool,
    pub riichi_furiten: bool,
    /// The last discard by another seat is one of our waits.
    pub furiten_status: bool,
    pub ippatsu_status: bool,
    /// Still eligible for kyuushu kyuuhai / four-wind abort (no call yet).
    pub ryuukyoku_status: bool,
    /// 0 none, 1 declared, 2 accepted.
    pub riichi_step: u8,

    pub is_tsumo: bool,
    pub is_riichi: bool,
    pub is_ippatsu: bool,
    pub is_rinshan: bool,
    pub is_chankan: bool,
    pub is_haitei: bool,
    pub is_houtei: bool,
    pub is_daburu_riichi: bool,
    pub is_tenhou: bool,
    pub is_chiihou: bool,
}

impl Player {
    pub fn new(points: i32) -> Self {
        let mut p = Self {
            points,
            wind: Wind::East,
            jun_num: 0,
            kan_num: 0,
            hand_tiles: Vec::with_capacity(14),
            discard_tiles: Vec::with_capacity(24),
            tiles_tsumo_giri: Vec::with_capacity(24),
            board_tiles: Vec::with_capacity(24),
            melds: Vec::with_capacity(4),
            shanten_num: 7,
            tenpai_slice: Vec::new(),
            jun_furiten: false,
            discard_furiten: false,
            riichi_furiten: false,
            furiten_status: false,
            ippatsu_status: true,
            ryuukyoku_status: true,
            riichi_step: 0,
            is_tsumo: false,
            is_riichi: false,
            is_ippatsu: false,
            is_rinshan: false,
            is_chankan: false,
            is_haitei: false,
            is_houtei: false,
            is_daburu_riichi: false,
            is_tenhou: false,
            is_chiihou: false,
        };
        p.reset_for_round();
        p
    }

    pub fn reset_for_game(&mut self, points: i32) {
        self.points = points;
        self.reset_for_round();
    }

    /// Clears everything but points and wind.
    pub fn reset_for_round(&mut self) {
        self.jun_num = 0;
        self.kan_num = 0;
        self.hand_tiles.clear();
        self.discard_tiles.clear();
        self.tiles_tsumo_giri.clear();
        self.board_tiles.clear();
        self.melds.clear();
        self.shanten_num = 7;
        self.tenpai_slice.clear();
        self.jun_furiten = false;
        self.discard_furiten = false;
        self.riichi_furiten = false;
        self.furiten_status = false;
        self.ippatsu_status = true;
        self.ryuukyoku_status = true;
        self.riichi_step = 0;
        self.clear_win_flags();
        self.is_riichi = false;
        self.is_daburu_riichi = false;
    }

    /// Per-win context flags; set right before scoring.
    pub fn clear_win_flags(&mut self) {
        self.is_tsumo = false;
        self.is_ippatsu = false;
        self.is_rinshan = false;
        self.is_chankan = false;
        self.is_haitei = false;
        self.is_houtei = false;
        self.is_tenhou = false;
        self.is_chiihou = false;
    }

    pub fn is_furiten(&self) -> bool {
        self.jun_furiten || self.riichi_furiten || self.discard_furiten
    }

    /// Closed hand: no meld other than ankan.
    pub fn is_menzen(&self) -> bool {
        self.melds.iter().all(|m| !m.is_open())
    }

    pub fn shanten(&self, scorer: &dyn ScoringAdapter) -> i32 {
        scorer.shanten(&self.hand_tiles, &self.melds)
    }

    pub fn compute_tenpai_slice(&self, scorer: &dyn ScoringAdapter) -> Vec<u8> {
        scorer.tenpai_classes(&self.hand_tiles, &self.melds)
    }

    /// Hand tiles whose discard leaves the hand tenpai, one id per class.
    ///
    /// Empty when the hand is too far away for this to matter (more than
    /// iishanten after the first turn).
    pub fn possible_tenpai_tiles(&self, scorer: &dyn ScoringAdapter) -> Vec<u8> {
        if self.shanten_num > 1 && self.jun_num > 1 {
            return Vec::new();
        }
        let mut seen = [false; 34];
        let mut out = Vec::new();
        for (i, &tile) in self.hand_tiles.iter().enumerate() {
            let class = tile_class(tile) as usize;
            if seen[class] {
                continue;
            }
            let mut rest = self.hand_tiles.clone();
            rest.remove(i);
            if scorer.shanten(&rest, &self.melds) == 0 {
                seen[class] = true;
                out.push(tile);
            }
        }
        out
    }

    /// No discard of ours was claimed and every discard is a terminal or honor.
    pub fn is_nagashi_mangan(&self) -> bool {
        self.board_tiles.len() == self.discard_tiles.len()
            && self
                .discard_tiles
                .iter()
                .all(|&t| is_yaochu(tile_class(t)))
    }

    /// Recomputes shanten and the wait set after the hand changed.
    pub fn refresh_waits(&mut self, scorer: &dyn ScoringAdapter) {
        self.shanten_num = self.shanten(scorer);
        if self.shanten_num == 0 {
            self.tenpai_slice = self.compute_tenpai_slice(scorer);
        } else {
            self.tenpai_slice.clear();
        }
    }

    /// Own discards include a winning class.
    pub fn discards_hit_waits(&self) -> bool {
        self.discard_tiles
            .iter()
            .any(|&t| self.tenpai_slice.contains(&tile_class(t)))
    }

    pub fn is_tenpai(&self) -> bool {
        !self.tenpai_slice.is_empty()
    }
}
