//! The round state machine.
//!
//! A [`Game`] alternates between `step` (emit events, build the call menu)
//! and `next` (apply the chosen calls, pick the following state). Drivers
//! only see [`Game::step`]: submit the chosen call per seat, get back the
//! next menu.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::board_state::{BoardState, PlayerState};
use crate::call::{Call, CallType};
use crate::errors::{EngineResult, GameError};
use crate::event::{merge_pos_events, Event};
use crate::player::Player;
use crate::rule::GameRule;
use crate::scoring::{ScoringAdapter, StandardScorer};
use crate::types::{EndType, Wind, WindRound, NP, NUM_TILES};
use crate::wall::Wall;
pub(crate) use settle::Rotation;

pub mod judge;
mod process;
pub mod replay;
mod settle;
mod state;

pub use judge::GameJudge;
pub use state::GameState;

/// Legal calls per seat. Seats without a choice are absent.
pub type CallMenu = BTreeMap<Wind, Vec<Call>>;

/// Wall and counters at the start of the current round.
#[derive(Debug, Clone)]
pub(crate) struct RoundStart {
    pub all_tiles: [u8; NUM_TILES],
    pub wind_round: WindRound,
    pub num_game: u32,
    pub num_honba: u32,
    pub num_riichi: u32,
    /// By player index.
    pub points: [i32; NP],
}

#[derive(Clone)]
pub struct Game {
    pub(crate) rule: GameRule,
    pub(crate) seed: u64,
    pub(crate) scorer: Arc<dyn ScoringAdapter>,
    pub(crate) players: [Player; NP],
    pub(crate) wall: Wall,
    pub(crate) wind_round: u8,
    pub(crate) num_game: u32,
    pub(crate) num_honba: u32,
    pub(crate) num_riichi: u32,
    pub(crate) position: Wind,
    pub(crate) state: GameState,
    /// Per-seat logs, indexed by wind.
    pub(crate) pos_events: [Vec<Event>; NP],
    pub(crate) current_menu: CallMenu,
    pub(crate) fixed_wall: Option<[u8; NUM_TILES]>,
    pub(crate) round_start: Option<RoundStart>,
    /// Set by settlement, applied when the next round is dealt.
    pub(crate) pending_rotation: Option<Rotation>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("seed", &self.seed)
            .field("wind_round", &self.wind_round)
            .field("num_game", &self.num_game)
            .field("num_honba", &self.num_honba)
            .field("num_riichi", &self.num_riichi)
            .field("position", &self.position)
            .field("state", &self.state.name())
            .finish_non_exhaustive()
    }
}

impl Game {
    pub fn new(seed: u64, rule: GameRule) -> Self {
        Self::with_scorer(seed, rule, Arc::new(StandardScorer))
    }

    pub fn with_scorer(seed: u64, rule: GameRule, scorer: Arc<dyn ScoringAdapter>) -> Self {
        Self {
            rule,
            seed,
            scorer,
            players: std::array::from_fn(|_| Player::new(rule.starting_points)),
            wall: Wall::new(seed),
            wind_round: 0,
            num_game: 0,
            num_honba: 0,
            num_riichi: 0,
            position: Wind::East,
            state: GameState::Init,
            pos_events: Default::default(),
            current_menu: CallMenu::new(),
            fixed_wall: None,
            round_start: None,
            pending_rotation: None,
        }
    }

    /// Starts a new match and returns the dealer's first menu. `fixed_wall`
    /// replaces the seeded shuffle for the first round.
    pub fn reset(&mut self, fixed_wall: Option<[u8; NUM_TILES]>) -> EngineResult<CallMenu> {
        self.wind_round = 0;
        self.num_game = 0;
        self.num_honba = 0;
        self.num_riichi = 0;
        for p in self.players.iter_mut() {
            p.reset_for_game(self.rule.starting_points);
        }
        self.fixed_wall = fixed_wall;
        self.state = GameState::Init;
        self.current_menu.clear();
        self.pos_events = Default::default();
        self.round_start = None;
        self.pending_rotation = None;
        let (menu, _) = self.step(&HashMap::new())?;
        Ok(menu)
    }

    /// Advances the game with the calls chosen from the current menu.
    ///
    /// An empty submission returns the pending menu, or runs the machine
    /// until one appears. Seats whose menu offers `Skip` may be omitted.
    pub fn step(&mut self, calls: &HashMap<Wind, Call>) -> EngineResult<(CallMenu, EndType)> {
        if calls.is_empty() && !self.current_menu.is_empty() {
            return Ok((self.current_menu.clone(), EndType::None));
        }

        let mut pending = if calls.is_empty() {
            None
        } else {
            Some(self.validate(calls)?)
        };

        loop {
            if let Some(chosen) = pending.take() {
                match self.state_next(&chosen) {
                    Ok(()) => {}
                    Err(GameError::GameEnd) => {
                        self.current_menu.clear();
                        return Ok((CallMenu::new(), EndType::Game));
                    }
                    Err(e) => return Err(e),
                }
            }

            let menu = self.state_step()?;
            if !menu.is_empty() {
                let end_type = if menu.len() == NP {
                    EndType::Round
                } else {
                    EndType::None
                };
                self.current_menu = menu.clone();
                return Ok((menu, end_type));
            }
            pending = Some(HashMap::new());
        }
    }

    /// Checks a submission against the menu and fills in omitted skips.
    fn validate(&mut self, calls: &HashMap<Wind, Call>) -> EngineResult<HashMap<Wind, Call>> {
        for (who, call) in calls {
            let offered = self
                .current_menu
                .get(who)
                .ok_or_else(|| GameError::invalid_call(format!("{who} has no pending choice")))?;
            if !offered.contains(call) {
                return Err(GameError::invalid_call(format!(
                    "{call} is not offered to {who}"
                )));
            }
        }

        let mut chosen = calls.clone();
        for (who, offered) in &self.current_menu {
            if chosen.contains_key(who) {
                continue;
            }
            if offered.iter().any(|c| c.call_type == CallType::Skip) {
                chosen.insert(*who, Call::skip());
            } else {
                return Err(GameError::invalid_call(format!("missing call for {who}")));
            }
        }
        self.current_menu.clear();
        Ok(chosen)
    }

    /// Physical player index for a seat.
    #[inline]
    pub(crate) fn pidx(&self, wind: Wind) -> usize {
        (wind.index() + self.wind_round as usize) % NP
    }

    pub fn pos_player(&self, wind: Wind) -> &Player {
        &self.players[self.pidx(wind)]
    }

    pub(crate) fn pos_player_mut(&mut self, wind: Wind) -> &mut Player {
        let i = self.pidx(wind);
        &mut self.players[i]
    }

    pub(crate) fn round_wind(&self) -> Wind {
        Wind::from(self.wind_round / 4)
    }

    pub(crate) fn emit_all(&mut self, event: Event) {
        for log in self.pos_events.iter_mut() {
            log.push(event.clone());
        }
    }

    pub(crate) fn emit_to(&mut self, seat: Wind, event: Event) {
        self.pos_events[seat.index()].push(event);
    }

    /// Events of `seat`'s log starting at `from`.
    pub fn get_pos_events(&self, seat: Wind, from: usize) -> &[Event] {
        let log = &self.pos_events[seat.index()];
        &log[from.min(log.len())..]
    }

    /// `GlobalInit` for the current round followed by the merged seat logs.
    pub fn get_global_events(&self) -> Vec<Event> {
        let mut out = Vec::new();
        if let Some(rs) = &self.round_start {
            out.push(Event::GlobalInit {
                all_tiles: rs.all_tiles.to_vec(),
                wind_round: rs.wind_round,
                seed: self.seed,
                num_game: rs.num_game,
                num_honba: rs.num_honba,
                num_riichi: rs.num_riichi,
                rule: self.rule,
                init_points: rs.points,
            });
        }
        out.extend(merge_pos_events(&self.pos_events));
        out
    }

    pub fn get_pos_board_state(&self, seat: Wind, valid_actions: Vec<Call>) -> BoardState {
        let player_states = Wind::ALL
            .iter()
            .map(|&w| {
                let p = self.pos_player(w);
                (
                    w,
                    PlayerState {
                        points: p.points,
                        melds: p.melds.clone(),
                        discards: p.discard_tiles.clone(),
                        tsumo_giri: p.tiles_tsumo_giri.clone(),
                        riichi: p.is_riichi,
                    },
                )
            })
            .collect();

        BoardState {
            wind_round: WindRound::from_index(self.wind_round).unwrap_or(WindRound::North4),
            num_honba: self.num_honba,
            num_riichi: self.num_riichi,
            dora_indicators: self.wall.dora_indicators(),
            player_wind: seat,
            position: self.position,
            hand_tiles: self.pos_player(seat).hand_tiles.clone(),
            valid_actions,
            remain_tiles: self.wall.num_remain_tiles(),
            player_states,
        }
    }

    /// Whether the match is over after the round just settled.
    pub fn check_game_end(&self) -> bool {
        if self.players.iter().any(|p| p.points < 0) {
            return true;
        }
        let wr = self.advanced_counters().0 as u32;
        let length = self.rule.game_length as u32;
        if wr < length {
            return false;
        }
        if wr > length + 3 || wr > 15 {
            return true;
        }
        self.players
            .iter()
            .any(|p| p.points >= self.rule.target_points)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn position(&self) -> Wind {
        self.position
    }

    pub fn num_remain_tiles(&self) -> u32 {
        self.wall.num_remain_tiles()
    }

    /// Players by physical index.
    pub fn players(&self) -> &[Player; NP] {
        &self.players
    }

    pub fn wind_round(&self) -> u8 {
        self.wind_round
    }

    pub fn num_game(&self) -> u32 {
        self.num_game
    }

    pub fn num_honba(&self) -> u32 {
        self.num_honba
    }

    pub fn num_riichi(&self) -> u32 {
        self.num_riichi
    }

    pub fn current_menu(&self) -> &CallMenu {
        &self.current_menu
    }

    pub fn rule(&self) -> &GameRule {
        &self.rule
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn wall(&self) -> &Wall {
        &self.wall
    }

    /// Points by physical player index.
    pub fn scores(&self) -> [i32; NP] {
        std::array::from_fn(|i| self.players[i].points)
    }
}
