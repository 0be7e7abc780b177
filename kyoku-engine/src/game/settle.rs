//! Point settlement and round bookkeeping at the end of a round.

use std::collections::BTreeMap;

use log::debug;

use crate::call::CallType;
use crate::errors::{EngineResult, GameError};
use crate::event::Event;
use crate::game::Game;
use crate::result::{RoundResult, RyuuKyokuReason};
use crate::types::{Wind, NP};

/// Nagashi mangan is paid like a mangan tsumo.
const NAGASHI_DEALER: i32 = 4000;
const NAGASHI_OTHER: i32 = 2000;
/// Noten penalty pool on an exhaustive draw.
const NOTEN_POOL: i32 = 3000;

/// How the seats move on after a round. Held on the game until the next
/// round is dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rotation {
    /// Dealer keeps the seat, one more honba.
    Stay,
    /// Dealer passes the seat and the honba count resets.
    Pass,
    /// Dealer passes the seat on a draw; honba still grows.
    PassOnDraw,
}

impl Game {
    pub(super) fn settle(&mut self, results: &BTreeMap<Wind, RoundResult>) -> EngineResult<()> {
        let (delta, rotation) = if results.values().any(RoundResult::is_win) {
            self.settle_wins(results)?
        } else {
            let (&who, first) = results
                .iter()
                .next()
                .ok_or_else(|| GameError::invalid_state("round ended without a result"))?;
            match first.ryuukyoku_reason {
                RyuuKyokuReason::Normal => self.settle_exhaustive_draw(),
                RyuuKyokuReason::KyuuShuKyuuHai => self.settle_abort(Some(who), RyuuKyokuReason::KyuuShuKyuuHai),
                reason => self.settle_abort(None, reason),
            }
        };

        for w in Wind::ALL {
            let i = self.pidx(w);
            self.players[i].points += delta[w.index()];
        }
        self.emit_all(Event::End {
            points_change: delta,
        });

        self.pending_rotation = Some(rotation);
        self.num_game += 1;
        let (next_round, next_honba) = self.advanced_counters();
        debug!(
            "settled {:?} ({:?}), next round {} honba {} sticks {}",
            delta, rotation, next_round, next_honba, self.num_riichi
        );
        Ok(())
    }

    /// Round index and honba the next round will be dealt with.
    pub(crate) fn advanced_counters(&self) -> (u8, u32) {
        match self.pending_rotation {
            None => (self.wind_round, self.num_honba),
            Some(Rotation::Stay) => (self.wind_round, self.num_honba + 1),
            Some(Rotation::Pass) => (self.wind_round + 1, 0),
            Some(Rotation::PassOnDraw) => (self.wind_round + 1, self.num_honba + 1),
        }
    }

    /// Moves the seats on. Seat views stay on the settled round until this runs.
    pub(super) fn apply_rotation(&mut self) {
        let (wind_round, num_honba) = self.advanced_counters();
        self.wind_round = wind_round;
        self.num_honba = num_honba;
        self.pending_rotation = None;
    }

    fn settle_wins(&mut self, results: &BTreeMap<Wind, RoundResult>) -> EngineResult<([i32; NP], Rotation)> {
        let payer = self.position;
        let mut winners: Vec<(Wind, &RoundResult)> = results
            .iter()
            .filter(|(_, r)| r.is_win())
            .map(|(&w, r)| (w, r))
            .collect();
        // the seat closest after the discarder takes the sticks
        winners.sort_by_key(|&(w, _)| w.distance_from(payer));

        let mut delta = [0i32; NP];
        let mut sticks = self.num_riichi as i32;
        for &(who, result) in &winners {
            let score = result
                .score_result
                .ok_or_else(|| GameError::invalid_state("win without a score"))?;
            let call = result
                .ron_call
                .ok_or_else(|| GameError::invalid_state("win without its call"))?;
            let win_tile = call
                .first_tile()
                .ok_or_else(|| GameError::invalid_state("winning call without a tile"))?;
            let is_tsumo = call.call_type == CallType::Tsumo;

            let change = score.changes(
                who,
                (!is_tsumo).then_some(payer),
                sticks,
                self.rule.riichi_cost,
            );
            sticks = 0;
            for (d, c) in delta.iter_mut().zip(change) {
                *d += c;
            }

            let mut hand_tiles = self.pos_player(who).hand_tiles.clone();
            if is_tsumo {
                hand_tiles.pop();
            }
            let event = match call.call_type {
                CallType::Tsumo => Event::Tsumo {
                    who,
                    hand_tiles,
                    win_tile,
                    result: result.clone(),
                },
                CallType::ChanKan => Event::ChanKan {
                    who,
                    from_who: payer,
                    hand_tiles,
                    win_tile,
                    result: result.clone(),
                },
                _ => Event::Ron {
                    who,
                    from_who: payer,
                    hand_tiles,
                    win_tile,
                    result: result.clone(),
                },
            };
            self.emit_all(event);
        }
        self.num_riichi = 0;

        let rotation = if winners.iter().any(|&(w, _)| w == Wind::East) {
            Rotation::Stay
        } else {
            Rotation::Pass
        };
        Ok((delta, rotation))
    }

    fn settle_exhaustive_draw(&mut self) -> ([i32; NP], Rotation) {
        let mut delta = [0i32; NP];
        let nagashi: Vec<Wind> = if self.rule.is_nagashi_mangan {
            Wind::ALL
                .into_iter()
                .filter(|&w| self.pos_player(w).is_nagashi_mangan())
                .collect()
        } else {
            Vec::new()
        };

        if let Some(&first) = nagashi.first() {
            let honba = self.rule.honba_value * self.num_honba as i32;
            for &who in &nagashi {
                for other in who.others() {
                    let base = if who == Wind::East || other == Wind::East {
                        NAGASHI_DEALER
                    } else {
                        NAGASHI_OTHER
                    };
                    delta[other.index()] -= base + honba;
                    delta[who.index()] += base + honba;
                }
                self.emit_all(Event::NagashiMangan { who });
            }
            delta[first.index()] += self.num_riichi as i32 * self.rule.riichi_cost;
            self.num_riichi = 0;
        } else {
            let tenpai: Vec<Wind> = Wind::ALL
                .into_iter()
                .filter(|&w| self.pos_player(w).is_tenpai())
                .collect();
            let n = tenpai.len() as i32;
            if (1..NP as i32).contains(&n) {
                let gain = NOTEN_POOL / n;
                let loss = NOTEN_POOL / (NP as i32 - n);
                for w in Wind::ALL {
                    delta[w.index()] += if tenpai.contains(&w) { gain } else { -loss };
                }
            }
            for who in tenpai {
                let p = self.pos_player(who);
                let event = Event::TenpaiEnd {
                    who,
                    hand_tiles: p.hand_tiles.clone(),
                    tenpai_slice: p.tenpai_slice.clone(),
                };
                self.emit_all(event);
            }
        }

        self.emit_all(Event::RyuuKyoku {
            who: None,
            hand_tiles: Vec::new(),
            reason: RyuuKyokuReason::Normal,
        });

        let rotation = if self.pos_player(Wind::East).is_tenpai() {
            Rotation::Stay
        } else {
            Rotation::PassOnDraw
        };
        (delta, rotation)
    }

    fn settle_abort(&mut self, who: Option<Wind>, reason: RyuuKyokuReason) -> ([i32; NP], Rotation) {
        let hand_tiles = who
            .map(|w| self.pos_player(w).hand_tiles.clone())
            .unwrap_or_default();
        self.emit_all(Event::RyuuKyoku {
            who,
            hand_tiles,
            reason,
        });
        ([0; NP], Rotation::Stay)
    }
}
