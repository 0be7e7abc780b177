//! Per-state `step` (emit events, build the menu) and `next` (apply the
//! chosen calls, pick the following state).

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};

use crate::call::{Call, CallType};
use crate::errors::{EngineResult, GameError};
use crate::event::Event;
use crate::game::judge::GameJudge;
use crate::game::{CallMenu, Game, RoundStart};
use crate::result::{FuritenReason, RoundResult, RyuuKyokuReason};
use crate::types::{tile_class, Wind, WindRound, NP};
use crate::wall::MAX_KANS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameState {
    /// Between rounds; the next step deals a fresh one.
    Init,
    /// `position` draws (from the dead wall after a kan).
    Deal { rinshan: bool },
    /// `position` discarded `tile`; the others may react.
    Discard { tile: u8, tsumogiri: bool },
    /// `position` just called chi or pon and must discard.
    ChiPon { call: Call },
    /// `position` declared a kan; chankan may follow.
    Kan { call: Call },
    /// Round over; `results` are settled exactly once.
    End {
        results: BTreeMap<Wind, RoundResult>,
        settled: bool,
    },
}

impl GameState {
    pub fn name(&self) -> &'static str {
        match self {
            GameState::Init => "Init",
            GameState::Deal { .. } => "Deal",
            GameState::Discard { .. } => "Discard",
            GameState::ChiPon { .. } => "ChiPon",
            GameState::Kan { .. } => "Kan",
            GameState::End { .. } => "End",
        }
    }
}

/// Same outcome recorded for all four seats (abortive and exhaustive draws).
fn all_seats(reason: RyuuKyokuReason) -> BTreeMap<Wind, RoundResult> {
    Wind::ALL
        .iter()
        .map(|&w| (w, RoundResult::ryuukyoku(reason)))
        .collect()
}

impl Game {
    pub(super) fn state_step(&mut self) -> EngineResult<CallMenu> {
        match self.state.clone() {
            GameState::Init => self.step_init(),
            GameState::Deal { rinshan } => self.step_deal(rinshan),
            GameState::Discard { tile, tsumogiri } => Ok(self.step_discard(tile, tsumogiri)),
            GameState::ChiPon { call } => Ok(self.step_chi_pon(call)),
            GameState::Kan { call } => Ok(self.step_kan(call)),
            GameState::End { results, settled } => self.step_end(results, settled),
        }
    }

    pub(super) fn state_next(&mut self, calls: &HashMap<Wind, Call>) -> EngineResult<()> {
        let from = self.state.name();
        match self.state.clone() {
            GameState::Init => {
                self.state = GameState::Deal { rinshan: false };
            }
            GameState::Deal { .. } => self.next_deal(calls)?,
            GameState::Discard { tile, .. } => self.next_discard(tile, calls)?,
            GameState::ChiPon { .. } => self.next_chi_pon(calls)?,
            GameState::Kan { call } => self.next_kan(call, calls)?,
            GameState::End { .. } => {
                if self.check_game_end() {
                    return Err(GameError::GameEnd);
                }
                self.state = GameState::Init;
            }
        }
        trace!("{from} -> {} at {}", self.state.name(), self.position);
        Ok(())
    }

    fn end_round(&mut self, results: BTreeMap<Wind, RoundResult>) {
        self.state = GameState::End {
            results,
            settled: false,
        };
    }

    fn step_init(&mut self) -> EngineResult<CallMenu> {
        self.apply_rotation();
        let wind_round = WindRound::from_index(self.wind_round).ok_or_else(|| {
            GameError::invalid_state(format!("no round after index {}", self.wind_round))
        })?;
        for w in Wind::ALL {
            let p = self.pos_player_mut(w);
            p.wind = w;
            p.reset_for_round();
        }
        self.position = Wind::East;
        self.wall.reset(self.num_game, self.num_honba);
        let hands = self.wall.setup(self.fixed_wall.take());

        for w in Wind::ALL {
            let i = self.pidx(w);
            let p = &mut self.players[i];
            p.hand_tiles = hands[w.index()].clone();
            p.hand_tiles.sort_unstable();
            p.refresh_waits(self.scorer.as_ref());
        }

        let points_by_wind: [i32; NP] = std::array::from_fn(|w| self.pos_player(Wind::from(w as u8)).points);
        self.round_start = Some(RoundStart {
            all_tiles: *self.wall.tiles(),
            wind_round,
            num_game: self.num_game,
            num_honba: self.num_honba,
            num_riichi: self.num_riichi,
            points: self.scores(),
        });

        self.pos_events = Default::default();
        let init_dora_indicator = self.wall.current_indicator();
        for w in Wind::ALL {
            let start = Event::Start {
                wind_round,
                init_wind: w,
                seed: self.seed,
                num_game: self.num_game,
                num_honba: self.num_honba,
                num_riichi: self.num_riichi,
                init_dora_indicator,
                init_tiles: self.pos_player(w).hand_tiles.clone(),
                players_points: points_by_wind,
                rule: self.rule,
            };
            self.emit_to(w, start);
        }

        debug!(
            "round {wind_round} honba {} sticks {} points {:?}",
            self.num_honba, self.num_riichi, points_by_wind
        );
        Ok(CallMenu::new())
    }

    fn step_deal(&mut self, rinshan: bool) -> EngineResult<CallMenu> {
        if self.wall.num_remain_tiles() == 0 {
            return Ok(CallMenu::new());
        }
        if rinshan && self.wall.kan_num() >= MAX_KANS {
            return Err(GameError::invalid_state("no replacement tile left"));
        }
        let who = self.position;
        let tile = self.wall.deal_tile(rinshan);
        if rinshan {
            self.emit_all(Event::NewIndicator {
                tile: self.wall.current_indicator(),
            });
        }
        self.process_get(who, tile);
        for w in Wind::ALL {
            let shown = (w == who).then_some(tile);
            self.emit_to(w, Event::Get { who, tile: shown });
        }

        let calls = self.judge_self_calls(who);
        trace!("{who} draws {tile}: {} options", calls.len());
        Ok(CallMenu::from([(who, calls)]))
    }

    fn next_deal(&mut self, calls: &HashMap<Wind, Call>) -> EngineResult<()> {
        let who = self.position;
        let Some(&call) = calls.get(&who) else {
            if self.wall.num_remain_tiles() == 0 {
                self.end_round(all_seats(RyuuKyokuReason::Normal));
                return Ok(());
            }
            return Err(GameError::invalid_state(format!("{who} must act after drawing")));
        };

        let drawn = self.pos_player(who).hand_tiles.last().copied();
        match call.call_type {
            CallType::Discard | CallType::Riichi => {
                let tile = call
                    .first_tile()
                    .ok_or_else(|| GameError::invalid_call("discard without a tile"))?;
                let tsumogiri = drawn == Some(tile);
                if call.call_type == CallType::Riichi {
                    self.process_riichi(who, tile, tsumogiri)?;
                } else {
                    self.process_discard(who, tile, tsumogiri)?;
                }
                self.state = GameState::Discard { tile, tsumogiri };
            }
            CallType::AnKan | CallType::ShouMinKan => {
                if call.call_type == CallType::AnKan {
                    self.process_ankan(who, &call)?;
                } else {
                    self.process_shouminkan(who, &call)?;
                }
                self.break_first_turn();
                self.state = GameState::Kan { call };
            }
            CallType::Tsumo => {
                let result = self.process_tsumo(who)?;
                self.end_round(BTreeMap::from([(who, result)]));
            }
            CallType::KyuuShuKyuuHai => {
                self.end_round(BTreeMap::from([(
                    who,
                    RoundResult::ryuukyoku(RyuuKyokuReason::KyuuShuKyuuHai),
                )]));
            }
            other => {
                return Err(GameError::invalid_call(format!("{other:?} after a draw")));
            }
        }
        Ok(())
    }

    fn step_discard(&mut self, tile: u8, tsumogiri: bool) -> CallMenu {
        let who = self.position;
        let event = if tsumogiri {
            Event::TsumoGiri { who, tile }
        } else {
            Event::Discard { who, tile }
        };
        self.emit_all(event);

        let mut menu = CallMenu::new();
        for other in who.others() {
            let calls = self.judge_other_calls(other, tile);
            if !calls.is_empty() {
                menu.insert(other, calls);
            }
        }
        menu
    }

    /// Seats that let a winning tile pass become temporarily (or, in riichi,
    /// permanently) furiten.
    fn mark_passed_wins(&mut self, calls: &HashMap<Wind, Call>) {
        let who = self.position;
        for other in who.others() {
            let took_it = calls
                .get(&other)
                .is_some_and(|c| c.call_type == CallType::Ron);
            let p = self.pos_player_mut(other);
            if !p.furiten_status || took_it {
                continue;
            }
            let reason = if p.is_riichi {
                if p.riichi_furiten {
                    continue;
                }
                p.riichi_furiten = true;
                FuritenReason::Riichi
            } else {
                if p.jun_furiten {
                    continue;
                }
                p.jun_furiten = true;
                FuritenReason::Jun
            };
            self.emit_to(other, Event::Furiten { who: other, reason });
        }
    }

    fn is_four_wind_abort(&self) -> bool {
        if self.position != Wind::North {
            return false;
        }
        let Some(first) = self.players[0].discard_tiles.first().map(|&t| tile_class(t)) else {
            return false;
        };
        (27..=30).contains(&first)
            && self.players.iter().all(|p| {
                p.ryuukyoku_status
                    && p.discard_tiles.len() == 1
                    && tile_class(p.discard_tiles[0]) == first
            })
    }

    fn next_discard(&mut self, tile: u8, calls: &HashMap<Wind, Call>) -> EngineResult<()> {
        let who = self.position;
        self.mark_passed_wins(calls);

        let best = calls
            .values()
            .map(|c| c.call_type)
            .max()
            .unwrap_or(CallType::Skip);

        match best {
            CallType::Skip => {
                if self.accept_riichi(who) {
                    self.end_round(all_seats(RyuuKyokuReason::SuuChaRiichi));
                    return Ok(());
                }
                if self.is_four_wind_abort() {
                    self.end_round(all_seats(RyuuKyokuReason::SuuFonRenDa));
                    return Ok(());
                }
                self.position = who.next();
                self.state = GameState::Deal { rinshan: false };
            }
            CallType::Ron => {
                let winners: Vec<(Wind, Call)> = calls
                    .iter()
                    .filter(|(_, c)| c.call_type == CallType::Ron)
                    .map(|(&w, &c)| (w, c))
                    .collect();
                if winners.len() == 3 && !self.rule.is_san_cha_hou {
                    self.end_round(all_seats(RyuuKyokuReason::SanChaHou));
                    return Ok(());
                }
                let mut results = BTreeMap::new();
                for (w, call) in winners {
                    results.insert(w, self.process_ron(w, &call)?);
                }
                self.end_round(results);
            }
            CallType::Chi | CallType::Pon | CallType::DaiMinKan => {
                let (&caller, &call) = calls
                    .iter()
                    .find(|(_, c)| c.call_type == best)
                    .ok_or_else(|| GameError::invalid_state("lost the winning call"))?;
                if self.accept_riichi(who) {
                    self.end_round(all_seats(RyuuKyokuReason::SuuChaRiichi));
                    return Ok(());
                }
                if best == CallType::DaiMinKan {
                    self.process_daiminkan(caller, &call)?;
                } else {
                    self.process_chi_pon(caller, &call)?;
                }
                self.break_first_turn();
                self.position = caller;
                self.state = if best == CallType::DaiMinKan {
                    GameState::Kan { call }
                } else {
                    GameState::ChiPon { call }
                };
            }
            other => {
                return Err(GameError::invalid_call(format!(
                    "{other:?} in reply to discard {tile}"
                )));
            }
        }
        Ok(())
    }

    fn step_chi_pon(&mut self, call: Call) -> CallMenu {
        let who = self.position;
        let event = if call.call_type == CallType::Chi {
            Event::Chi { who, call }
        } else {
            Event::Pon { who, call }
        };
        self.emit_all(event);
        CallMenu::from([(who, self.judge_discard(who))])
    }

    fn next_chi_pon(&mut self, calls: &HashMap<Wind, Call>) -> EngineResult<()> {
        let who = self.position;
        let tile = calls
            .get(&who)
            .filter(|c| c.call_type == CallType::Discard)
            .and_then(Call::first_tile)
            .ok_or_else(|| GameError::invalid_call(format!("{who} must discard after a call")))?;
        self.process_discard(who, tile, false)?;
        self.state = GameState::Discard {
            tile,
            tsumogiri: false,
        };
        Ok(())
    }

    fn step_kan(&mut self, call: Call) -> CallMenu {
        let who = self.position;
        let event = match call.call_type {
            CallType::AnKan => Event::AnKan { who, call },
            CallType::ShouMinKan => Event::ShouMinKan { who, call },
            _ => Event::DaiMinKan { who, call },
        };
        self.emit_all(event);

        let robbable = match call.call_type {
            CallType::ShouMinKan => call.tile(3).map(|t| (t, false)),
            CallType::AnKan => call.first_tile().map(|t| (t, true)),
            _ => None,
        };
        let mut menu = CallMenu::new();
        if let Some((tile, is_ankan)) = robbable {
            for other in who.others() {
                if let Some(chankan) = self.judge_chankan(other, tile, is_ankan) {
                    menu.insert(other, vec![Call::skip(), chankan]);
                }
            }
        }
        menu
    }

    fn next_kan(&mut self, call: Call, calls: &HashMap<Wind, Call>) -> EngineResult<()> {
        let robbers: Vec<(Wind, Call)> = calls
            .iter()
            .filter(|(_, c)| c.call_type == CallType::ChanKan)
            .map(|(&w, &c)| (w, c))
            .collect();
        if !robbers.is_empty() {
            let mut results = BTreeMap::new();
            for (w, c) in robbers {
                results.insert(w, self.process_ron(w, &c)?);
            }
            self.end_round(results);
            return Ok(());
        }

        let who = self.position;
        self.pos_player_mut(who).kan_num += 1;
        let total: u32 = self.players.iter().map(|p| p.kan_num).sum();
        let single_owner = self.players.iter().any(|p| p.kan_num == total);
        if total >= MAX_KANS && !single_owner {
            debug!("fourth kan by {who} ({call}) splits across seats");
            self.end_round(all_seats(RyuuKyokuReason::SuuKaiKan));
            return Ok(());
        }
        self.state = GameState::Deal { rinshan: true };
        Ok(())
    }

    fn step_end(&mut self, results: BTreeMap<Wind, RoundResult>, settled: bool) -> EngineResult<CallMenu> {
        if !settled {
            self.settle(&results)?;
            self.state = GameState::End {
                results,
                settled: true,
            };
        }
        if self.check_game_end() {
            return Ok(CallMenu::new());
        }
        Ok(Wind::ALL.iter().map(|&w| (w, vec![Call::next()])).collect())
    }
}
