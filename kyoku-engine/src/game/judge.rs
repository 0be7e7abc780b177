//! Call judgment: which calls each seat may make right now.
//!
//! Every judge is read-only; it looks at the player, the wall flags and the
//! current position and returns the legal calls in menu order.

use crate::call::{Call, CallType};
use crate::game::Game;
use crate::player::remove_tile;
use crate::result::{RoundResult, Yakuman};
use crate::scoring::WinContext;
use crate::types::{is_red_five, is_yaochu, tile_class, Wind, TILE_MAX};
use crate::wall::MAX_KANS;

/// How a win is being scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinKind {
    Tsumo,
    Ron,
    ChanKan,
}

pub trait GameJudge {
    /// Menu for the seat that just drew: tsumo, riichi, kans, kyuushu, discards.
    fn judge_self_calls(&self, who: Wind) -> Vec<Call>;
    /// Menu for a seat reacting to `tile`; empty unless it can do more than skip.
    fn judge_other_calls(&self, who: Wind, tile: u8) -> Vec<Call>;

    fn judge_discard(&self, who: Wind) -> Vec<Call>;
    fn judge_riichi(&self, who: Wind) -> Vec<Call>;
    fn judge_tsumo(&self, who: Wind) -> Option<Call>;
    fn judge_ankan(&self, who: Wind) -> Vec<Call>;
    fn judge_shouminkan(&self, who: Wind) -> Vec<Call>;
    fn judge_kyuushu(&self, who: Wind) -> Option<Call>;

    fn judge_chi(&self, who: Wind, tile: u8) -> Vec<Call>;
    fn judge_pon(&self, who: Wind, tile: u8) -> Vec<Call>;
    fn judge_daiminkan(&self, who: Wind, tile: u8) -> Option<Call>;
    fn judge_ron(&self, who: Wind, tile: u8) -> Option<Call>;
    /// `is_ankan`: only kokushi may rob a closed kan.
    fn judge_chankan(&self, who: Wind, tile: u8, is_ankan: bool) -> Option<Call>;

    fn win_context(&self, who: Wind, tile: u8, kind: WinKind) -> WinContext;
    /// Scores `who` winning on `tile`; the hand must not contain the tile yet.
    fn evaluate_win(&self, who: Wind, hand: &[u8], tile: u8, kind: WinKind) -> Option<RoundResult>;
}

/// Classes that may not be discarded right after `call` (kuikae).
pub(crate) fn kuikae_classes(call: &Call) -> Vec<u8> {
    let Some(claimed) = call.tile(2).map(tile_class) else {
        return Vec::new();
    };
    let mut out = vec![claimed];
    if call.call_type == CallType::Chi {
        let (Some(a), Some(b)) = (call.tile(0), call.tile(1)) else {
            return out;
        };
        let (lo, hi) = {
            let (x, y) = (tile_class(a), tile_class(b));
            (x.min(y), x.max(y))
        };
        if hi == lo + 1 {
            if claimed + 1 == lo && hi % 9 != 8 {
                out.push(hi + 1);
            } else if claimed == hi + 1 && lo % 9 != 0 {
                out.push(lo - 1);
            }
        }
    }
    out
}

/// Whether `hand` still has a legal discard after forming `call` under kuikae.
fn leaves_discard(hand: &[u8], call: &Call) -> bool {
    let mut rest = hand.to_vec();
    for i in 0..2 {
        if let Some(t) = call.tile(i) {
            remove_tile(&mut rest, t);
        }
    }
    let forbidden = kuikae_classes(call);
    rest.iter().any(|&t| !forbidden.contains(&tile_class(t)))
}

/// Offsets of the two hand tiles from a claimed tile of `rank` (0-based).
fn chi_offsets(rank: u8) -> &'static [(i8, i8)] {
    match rank {
        0 => &[(1, 2)],
        1 => &[(-1, 1), (1, 2)],
        7 => &[(-2, -1), (-1, 1)],
        8 => &[(-2, -1)],
        _ => &[(-2, -1), (-1, 1), (1, 2)],
    }
}

impl GameJudge for Game {
    fn judge_self_calls(&self, who: Wind) -> Vec<Call> {
        let mut calls = Vec::new();
        calls.extend(self.judge_tsumo(who));
        calls.extend(self.judge_riichi(who));
        calls.extend(self.judge_shouminkan(who));
        calls.extend(self.judge_ankan(who));
        calls.extend(self.judge_kyuushu(who));
        calls.extend(self.judge_discard(who));
        calls
    }

    fn judge_other_calls(&self, who: Wind, tile: u8) -> Vec<Call> {
        let mut calls = vec![Call::skip()];
        calls.extend(self.judge_daiminkan(who, tile));
        calls.extend(self.judge_pon(who, tile));
        calls.extend(self.judge_chi(who, tile));
        calls.extend(self.judge_ron(who, tile));
        if calls.len() == 1 {
            calls.clear();
        }
        calls
    }

    fn judge_discard(&self, who: Wind) -> Vec<Call> {
        let calls: Vec<Call> = self
            .pos_player(who)
            .hand_tiles
            .iter()
            .filter(|&&t| self.wall.is_discardable(t))
            .map(|&t| Call::discard(t, who))
            .collect();
        assert!(!calls.is_empty(), "{who} has no discardable tile");
        calls
    }

    fn judge_riichi(&self, who: Wind) -> Vec<Call> {
        let p = self.pos_player(who);
        if p.is_riichi
            || !p.is_menzen()
            || p.points < self.rule.riichi_cost
            || self.wall.num_remain_tiles() < 4
            || (p.shanten_num > 1 && p.jun_num > 1)
        {
            return Vec::new();
        }
        p.possible_tenpai_tiles(self.scorer.as_ref())
            .into_iter()
            .filter(|&t| self.wall.is_discardable(t))
            .map(|t| Call::riichi(t, who))
            .collect()
    }

    fn judge_tsumo(&self, who: Wind) -> Option<Call> {
        let p = self.pos_player(who);
        let (&drawn, rest) = p.hand_tiles.split_last()?;
        if p.shanten_num != 0 || !p.tenpai_slice.contains(&tile_class(drawn)) {
            return None;
        }
        self.evaluate_win(who, rest, drawn, WinKind::Tsumo)
            .map(|_| Call::tsumo(drawn, who))
    }

    fn judge_ankan(&self, who: Wind) -> Vec<Call> {
        let p = self.pos_player(who);
        if self.wall.num_remain_tiles() == 0
            || self.wall.kan_num() >= MAX_KANS
            || p.hand_tiles.len() <= 2
        {
            return Vec::new();
        }

        let mut by_class: [Vec<u8>; TILE_MAX] = std::array::from_fn(|_| Vec::new());
        for &t in &p.hand_tiles {
            by_class[tile_class(t) as usize].push(t);
        }

        let drawn_class = p.hand_tiles.last().map(|&t| tile_class(t));
        let mut calls = Vec::new();
        for (class, tiles) in by_class.iter().enumerate() {
            let Ok(quad) = <[u8; 4]>::try_from(tiles.as_slice()) else {
                continue;
            };
            let call = Call::ankan(quad, who);
            if p.is_riichi {
                // only the fresh draw, and only when the waits stay the same
                if drawn_class != Some(class as u8) {
                    continue;
                }
                let mut rest = p.hand_tiles.clone();
                rest.retain(|&t| tile_class(t) as usize != class);
                let mut melds = p.melds.clone();
                melds.push(call);
                if self.scorer.tenpai_classes(&rest, &melds) != p.tenpai_slice {
                    continue;
                }
            }
            calls.push(call);
        }
        calls
    }

    fn judge_shouminkan(&self, who: Wind) -> Vec<Call> {
        let p = self.pos_player(who);
        if p.is_riichi || self.wall.num_remain_tiles() == 0 || self.wall.kan_num() >= MAX_KANS {
            return Vec::new();
        }
        p.melds
            .iter()
            .filter(|m| m.call_type == CallType::Pon)
            .filter_map(|pon| {
                let class = pon.class()?;
                p.hand_tiles
                    .iter()
                    .find(|&&t| tile_class(t) == class && self.wall.is_discardable(t))
                    .map(|&t| Call::shouminkan(pon, t, who))
            })
            .collect()
    }

    fn judge_kyuushu(&self, who: Wind) -> Option<Call> {
        let p = self.pos_player(who);
        if p.jun_num > 1 || !p.ryuukyoku_status {
            return None;
        }
        let mut seen = [false; TILE_MAX];
        for &t in &p.hand_tiles {
            seen[tile_class(t) as usize] = true;
        }
        let kinds = (0..TILE_MAX as u8)
            .filter(|&c| seen[c as usize] && is_yaochu(c))
            .count();
        (kinds >= 9).then(Call::kyuushu)
    }

    fn judge_chi(&self, who: Wind, tile: u8) -> Vec<Call> {
        let p = self.pos_player(who);
        let from = self.position;
        let class = tile_class(tile);
        if p.is_riichi
            || who.distance_from(from) != 1
            || class >= 27
            || self.wall.is_last(tile)
            || self.wall.num_remain_tiles() == 0
        {
            return Vec::new();
        }

        let copies = |c: u8| -> Vec<u8> {
            let mut v: Vec<u8> = p
                .hand_tiles
                .iter()
                .copied()
                .filter(|&t| tile_class(t) == c)
                .collect();
            v.sort_unstable();
            v
        };

        let mut calls = Vec::new();
        for &(da, db) in chi_offsets(class % 9) {
            let ca = (class as i8 + da) as u8;
            let cb = (class as i8 + db) as u8;
            let (xs, ys) = (copies(ca), copies(cb));
            let (Some(&a), Some(&b)) = (xs.first(), ys.first()) else {
                continue;
            };
            calls.push(Call::chi(a, b, tile, who, Some(from)));
            if is_red_five(a) {
                if let Some(&a2) = xs.get(1) {
                    calls.push(Call::chi(a2, b, tile, who, Some(from)));
                }
            }
            if is_red_five(b) {
                if let Some(&b2) = ys.get(1) {
                    calls.push(Call::chi(a, b2, tile, who, Some(from)));
                }
            }
        }

        if self.rule.kuikae_forbidden {
            calls.retain(|c| leaves_discard(&p.hand_tiles, c));
        }
        calls
    }

    fn judge_pon(&self, who: Wind, tile: u8) -> Vec<Call> {
        let p = self.pos_player(who);
        if p.is_riichi || self.wall.is_last(tile) || self.wall.num_remain_tiles() == 0 {
            return Vec::new();
        }
        let class = tile_class(tile);
        let mut same: Vec<u8> = p
            .hand_tiles
            .iter()
            .copied()
            .filter(|&t| tile_class(t) == class)
            .collect();
        if same.len() < 2 {
            return Vec::new();
        }
        same.sort_unstable();

        let from = Some(self.position);
        let mut calls = vec![Call::pon(same[0], same[1], tile, who, from)];
        if same.len() == 3 && same.iter().any(|&t| is_red_five(t)) {
            calls.push(Call::pon(same[1], same[2], tile, who, from));
        }
        if self.rule.kuikae_forbidden {
            calls.retain(|c| leaves_discard(&p.hand_tiles, c));
        }
        calls
    }

    fn judge_daiminkan(&self, who: Wind, tile: u8) -> Option<Call> {
        let p = self.pos_player(who);
        if p.is_riichi
            || self.wall.is_last(tile)
            || self.wall.num_remain_tiles() == 0
            || self.wall.kan_num() >= MAX_KANS
        {
            return None;
        }
        let class = tile_class(tile);
        let same: Vec<u8> = p
            .hand_tiles
            .iter()
            .copied()
            .filter(|&t| tile_class(t) == class)
            .collect();
        let own = <[u8; 3]>::try_from(same.as_slice()).ok()?;
        Some(Call::daiminkan(own, tile, who, Some(self.position)))
    }

    fn judge_ron(&self, who: Wind, tile: u8) -> Option<Call> {
        let p = self.pos_player(who);
        if p.is_furiten() || !p.tenpai_slice.contains(&tile_class(tile)) {
            return None;
        }
        self.evaluate_win(who, &p.hand_tiles, tile, WinKind::Ron)
            .map(|_| Call::ron(tile, Some(self.position)))
    }

    fn judge_chankan(&self, who: Wind, tile: u8, is_ankan: bool) -> Option<Call> {
        let p = self.pos_player(who);
        if p.is_furiten() || !p.tenpai_slice.contains(&tile_class(tile)) {
            return None;
        }
        let result = self.evaluate_win(who, &p.hand_tiles, tile, WinKind::ChanKan)?;
        if is_ankan {
            let kokushi = result.yaku_result.as_ref().is_some_and(|y| {
                y.yakumans
                    .iter()
                    .any(|&m| matches!(m, Yakuman::Kokushi | Yakuman::Kokushi13))
            });
            if !kokushi {
                return None;
            }
        }
        Some(Call::chankan(tile, self.position))
    }

    fn win_context(&self, who: Wind, tile: u8, kind: WinKind) -> WinContext {
        let p = self.pos_player(who);
        let first_turn = kind == WinKind::Tsumo && p.jun_num == 1 && p.ippatsu_status;
        WinContext {
            win_tile: tile,
            seat_wind: who,
            round_wind: self.round_wind(),
            dora_indicators: self.wall.dora_indicators(),
            ura_indicators: self.wall.ura_dora_indicators(),
            is_tsumo: kind == WinKind::Tsumo,
            is_riichi: p.is_riichi,
            is_ippatsu: p.is_riichi && p.ippatsu_status,
            is_daburu_riichi: p.is_daburu_riichi,
            is_last_tile: kind != WinKind::ChanKan && self.wall.num_remain_tiles() == 0,
            is_rinshan: kind == WinKind::Tsumo && self.wall.is_rinshan(tile),
            is_chankan: kind == WinKind::ChanKan,
            is_tenhou: first_turn && who == Wind::East,
            is_chiihou: first_turn && who != Wind::East,
            honba: self.num_honba,
        }
    }

    fn evaluate_win(&self, who: Wind, hand: &[u8], tile: u8, kind: WinKind) -> Option<RoundResult> {
        let ctx = self.win_context(who, tile, kind);
        self.scorer
            .evaluate(hand, &self.pos_player(who).melds, &ctx, &self.rule)
    }
}
