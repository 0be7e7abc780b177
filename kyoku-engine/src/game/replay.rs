//! Deterministic replay of a global event log.
//!
//! A log starts with `GlobalInit`, which pins the wall permutation and the
//! counters. Every later event is turned back into the submission that
//! produced it and fed through [`Game::step`]; events that are a consequence
//! of an earlier submission (draws, indicators, settlement) are passed over.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::call::{Call, CallType};
use crate::errors::{EngineResult, GameError};
use crate::event::Event;
use crate::game::{CallMenu, Game, GameState};
use crate::result::RyuuKyokuReason;
use crate::scoring::{ScoringAdapter, StandardScorer};
use crate::types::{Wind, NUM_TILES};
use crate::wall::Wall;

type Submission = HashMap<Wind, Call>;

fn find_call(menu: &CallMenu, who: Wind, pred: impl Fn(&Call) -> bool) -> Option<Call> {
    menu.get(&who)?.iter().copied().find(|c| pred(c))
}

/// Skip for every seat in the menu, or `None` when some seat cannot skip.
fn all_skip(menu: &CallMenu) -> Option<Submission> {
    menu.iter()
        .map(|(&w, calls)| {
            calls
                .iter()
                .any(|c| c.call_type == CallType::Skip)
                .then_some((w, Call::skip()))
        })
        .collect()
}

/// `chosen` plus a skip for every other seat that may skip.
fn with_skips(menu: &CallMenu, chosen: Submission) -> Submission {
    let mut out = chosen;
    for (&w, calls) in menu {
        if !out.contains_key(&w) && calls.iter().any(|c| c.call_type == CallType::Skip) {
            out.insert(w, Call::skip());
        }
    }
    out
}

impl Game {
    /// Rebuilds a game from its global log with the standard scorer.
    pub fn reconstruct(events: &[Event]) -> EngineResult<Game> {
        Self::reconstruct_with_scorer(events, Arc::new(StandardScorer))
    }

    pub fn reconstruct_with_scorer(events: &[Event], scorer: Arc<dyn ScoringAdapter>) -> EngineResult<Game> {
        let Some(Event::GlobalInit { seed, rule, .. }) = events.first() else {
            return Err(GameError::invalid_state("a replay must start with GlobalInit"));
        };
        let mut game = Game::with_scorer(*seed, *rule, scorer);
        game.replay(events)?;
        Ok(game)
    }

    /// Resets the table to the round described by a `GlobalInit` and deals it.
    fn restore_round(&mut self, init: &Event) -> EngineResult<()> {
        let Event::GlobalInit {
            all_tiles,
            wind_round,
            seed,
            num_game,
            num_honba,
            num_riichi,
            rule,
            init_points,
        } = init
        else {
            return Err(GameError::invalid_state(format!("{} is not GlobalInit", init.name())));
        };
        let tiles = <[u8; NUM_TILES]>::try_from(all_tiles.as_slice()).map_err(|_| {
            GameError::invalid_state(format!("wall has {} tiles", all_tiles.len()))
        })?;

        if *seed != self.seed {
            self.seed = *seed;
            self.wall = Wall::new(*seed);
        }
        self.rule = *rule;
        self.wind_round = wind_round.index();
        self.num_game = *num_game;
        self.num_honba = *num_honba;
        self.num_riichi = *num_riichi;
        self.pending_rotation = None;
        for (p, &points) in self.players.iter_mut().zip(init_points) {
            p.reset_for_game(points);
        }
        self.fixed_wall = Some(tiles);
        self.state = GameState::Init;
        self.current_menu.clear();
        self.step(&HashMap::new())?;
        debug!("restored {wind_round} from log");
        Ok(())
    }

    fn replay(&mut self, events: &[Event]) -> EngineResult<()> {
        let mut i = 0;
        while i < events.len() {
            let event = &events[i];
            if let Event::GlobalInit { .. } = event {
                self.restore_round(event)?;
                i += 1;
                continue;
            }
            if self.current_menu.is_empty() {
                break;
            }

            let (submission, consumed) = self.submission_for(events, i);
            if let Some(calls) = submission {
                self.step(&calls)?;
            }
            i += consumed;
        }
        Ok(())
    }

    /// The submission that produced `events[at]`, and how many events it covers.
    fn submission_for(&self, events: &[Event], at: usize) -> (Option<Submission>, usize) {
        let menu = &self.current_menu;
        let event = &events[at];
        let unmatched = || {
            warn!(
                "replay: {} by {:?} does not match the pending menu",
                event.name(),
                event.who()
            );
            (None, 1)
        };

        match event {
            Event::Discard { who, tile } | Event::TsumoGiri { who, tile } => {
                match find_call(menu, *who, |c| {
                    c.call_type == CallType::Discard && c.first_tile() == Some(*tile)
                }) {
                    Some(call) => (Some(Submission::from([(*who, call)])), 1),
                    None => unmatched(),
                }
            }
            Event::Riichi { who, step: 1 } => {
                // the declaring discard follows, possibly after private events
                let Some(offset) = events[at + 1..]
                    .iter()
                    .position(|e| !matches!(e, Event::Furiten { .. }))
                else {
                    return unmatched();
                };
                let declared = &events[at + 1 + offset];
                let tile = match declared {
                    Event::Discard { tile, .. } | Event::TsumoGiri { tile, .. } if declared.who() == Some(*who) => {
                        *tile
                    }
                    _ => return unmatched(),
                };
                match find_call(menu, *who, |c| {
                    c.call_type == CallType::Riichi && c.first_tile() == Some(tile)
                }) {
                    Some(call) => (Some(Submission::from([(*who, call)])), offset + 2),
                    None => unmatched(),
                }
            }
            Event::Chi { who, call }
            | Event::Pon { who, call }
            | Event::DaiMinKan { who, call }
            | Event::ShouMinKan { who, call }
            | Event::AnKan { who, call } => {
                if find_call(menu, *who, |c| c == call).is_some() {
                    (Some(with_skips(menu, Submission::from([(*who, *call)]))), 1)
                } else {
                    unmatched()
                }
            }
            Event::Ron { .. } | Event::ChanKan { .. } => {
                let mut chosen = Submission::new();
                let mut n = 0;
                for e in &events[at..] {
                    let (who, wanted) = match e {
                        Event::Ron { who, .. } => (*who, CallType::Ron),
                        Event::ChanKan { who, .. } => (*who, CallType::ChanKan),
                        _ => break,
                    };
                    match find_call(menu, who, |c| c.call_type == wanted) {
                        Some(call) => {
                            chosen.insert(who, call);
                        }
                        None => return unmatched(),
                    }
                    n += 1;
                }
                (Some(with_skips(menu, chosen)), n)
            }
            Event::Tsumo { who, .. } => match find_call(menu, *who, |c| c.call_type == CallType::Tsumo) {
                Some(call) => (Some(Submission::from([(*who, call)])), 1),
                None => unmatched(),
            },
            Event::RyuuKyoku {
                who: Some(who),
                reason: RyuuKyokuReason::KyuuShuKyuuHai,
                ..
            } => match find_call(menu, *who, |c| c.call_type == CallType::KyuuShuKyuuHai) {
                Some(call) => (Some(Submission::from([(*who, call)])), 1),
                None => unmatched(),
            },
            Event::RyuuKyoku {
                reason: RyuuKyokuReason::SanChaHou,
                ..
            } => {
                let rons: Submission = menu
                    .iter()
                    .filter_map(|(&w, calls)| {
                        calls
                            .iter()
                            .find(|c| c.call_type == CallType::Ron)
                            .map(|&c| (w, c))
                    })
                    .collect();
                if rons.is_empty() {
                    return unmatched();
                }
                (Some(with_skips(menu, rons)), 1)
            }
            // a draw (or any abort) right after a discard means nobody called
            Event::Get { .. } | Event::RyuuKyoku { .. } => (all_skip(menu), 1),
            // an accepted stick may still be followed by a chi or pon
            Event::Riichi { .. }
            | Event::Start { .. }
            | Event::NewIndicator { .. }
            | Event::End { .. }
            | Event::Furiten { .. }
            | Event::NagashiMangan { .. }
            | Event::TenpaiEnd { .. }
            | Event::GlobalInit { .. } => (None, 1),
        }
    }
}
