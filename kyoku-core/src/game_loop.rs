//! Game loop runner.
//!
//! Provides `GameRunner` which drives a `kyoku_engine::Game` through every
//! round of a match: each pending menu is answered seat by seat through an
//! `ActionSelector`, and round ends are acknowledged with `Next`.

use std::collections::HashMap;

use kyoku_engine::seeding::SessionRng;
use kyoku_engine::{Call, CallMenu, CallType, EndType, EngineResult, Game, GameRule, Wind};
use log::warn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Trait for call selection policies.
/// Implemented by random agents, scripted bots, etc.
pub trait ActionSelector {
    /// Select one call for `seat` from its offered menu.
    /// `offered` is never empty.
    fn select_action(&mut self, seat: Wind, offered: &[Call]) -> Call;
}

/// Simple policy that always picks the first offered call.
///
/// Reaction menus start with `Skip`, so this policy never claims a discard;
/// on its own turn it takes a win, then riichi, before discarding.
pub struct FirstActionSelector;

impl ActionSelector for FirstActionSelector {
    fn select_action(&mut self, _seat: Wind, offered: &[Call]) -> Call {
        offered[0]
    }
}

/// Uniform choice over the offered calls, reproducible from a seed.
pub struct SeededRandomSelector {
    rng: ChaCha8Rng,
}

impl SeededRandomSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ActionSelector for SeededRandomSelector {
    fn select_action(&mut self, _seat: Wind, offered: &[Call]) -> Call {
        offered[self.rng.random_range(0..offered.len())]
    }
}

/// Hard stop for a runaway match.
const MAX_STEPS: u32 = 50_000;

/// Runs a complete match, one engine step per call.
pub struct GameRunner {
    game: Game,
    menu: CallMenu,
    done: bool,
    total_actions: u32,
    rounds_played: u32,
}

impl GameRunner {
    /// Create a runner and deal the first round.
    pub fn new(seed: u64, rule: GameRule) -> EngineResult<Self> {
        let mut game = Game::new(seed, rule);
        let menu = game.reset(None)?;
        Ok(Self {
            game,
            menu,
            done: false,
            total_actions: 0,
            rounds_played: 1,
        })
    }

    /// Create a runner whose game seed is the next one drawn from `session`.
    pub fn new_with_session(session: &mut SessionRng, rule: GameRule) -> EngineResult<Self> {
        Self::new(session.next_game_seed(), rule)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn total_actions(&self) -> u32 {
        self.total_actions
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// Points by player, in seating order of the first round.
    pub fn scores(&self) -> [i32; 4] {
        self.game.scores()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// The menu waiting for an answer.
    pub fn menu(&self) -> &CallMenu {
        &self.menu
    }
}

impl GameRunner {
    /// Advance the game by one engine step. Returns false once the match is
    /// over or the step limit is hit.
    pub fn step_once(&mut self, selector: &mut dyn ActionSelector) -> EngineResult<bool> {
        if self.done {
            return Ok(false);
        }
        if self.total_actions >= MAX_STEPS {
            warn!(
                "seed {}: stopped after {} steps in {}",
                self.game.seed(),
                self.total_actions,
                self.game.state_name()
            );
            return Ok(false);
        }

        let calls: HashMap<Wind, Call> = self
            .menu
            .iter()
            .filter(|(_, offered)| !offered.is_empty())
            .map(|(&seat, offered)| (seat, selector.select_action(seat, offered)))
            .collect();
        let round_over = self
            .menu
            .values()
            .flatten()
            .any(|c| c.call_type == CallType::Next);

        let (menu, end) = self.game.step(&calls)?;
        self.total_actions += 1;
        self.menu = menu;
        if round_over && end != EndType::Game {
            self.rounds_played += 1;
        }
        if end == EndType::Game || self.menu.is_empty() {
            self.done = true;
        }
        Ok(!self.done)
    }

    /// Run the full match to completion.
    pub fn run_to_completion(&mut self, selector: &mut dyn ActionSelector) -> EngineResult<()> {
        while self.step_once(selector)? {}
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_completes_with_first_action() {
        let mut runner = GameRunner::new(42, GameRule::default_tenhou()).unwrap();
        let mut selector = FirstActionSelector;
        runner.run_to_completion(&mut selector).unwrap();
        assert!(runner.is_done());
        assert!(
            runner.total_actions() > 20,
            "expected realistic action count, got {}",
            runner.total_actions()
        );
        assert!(runner.step_once(&mut selector).is_ok_and(|more| !more));
    }

    #[test]
    fn first_menu_is_the_dealer_turn() {
        let runner = GameRunner::new(7, GameRule::default_tenhou()).unwrap();
        assert_eq!(runner.menu().keys().copied().collect::<Vec<_>>(), vec![Wind::East]);
        assert_eq!(runner.rounds_played(), 1);
    }

    #[test]
    fn rounds_are_counted() {
        let mut runner = GameRunner::new(5, GameRule::east_only()).unwrap();
        runner.run_to_completion(&mut FirstActionSelector).unwrap();
        let busted = runner.scores().iter().any(|&p| p < 0);
        assert!(busted || runner.rounds_played() >= 4, "played {}", runner.rounds_played());
        assert_eq!(runner.rounds_played(), runner.game().num_game());
    }

    #[test]
    fn scores_are_conserved() {
        let mut runner = GameRunner::new(99, GameRule::default_tenhou()).unwrap();
        runner.run_to_completion(&mut SeededRandomSelector::new(99)).unwrap();
        let game = runner.game();
        let sum: i32 = runner.scores().iter().sum();
        let sticks = game.num_riichi() as i32 * game.rule().riichi_cost;
        assert_eq!(sum + sticks, 100_000);
    }

    #[test]
    fn random_selector_is_reproducible() {
        let menu = [Call::skip(), Call::discard(3, Wind::East), Call::discard(9, Wind::East)];
        let mut a = SeededRandomSelector::new(11);
        let mut b = SeededRandomSelector::new(11);
        for _ in 0..32 {
            assert_eq!(
                a.select_action(Wind::East, &menu),
                b.select_action(Wind::East, &menu)
            );
        }
    }

    #[test]
    fn session_seeded_games_are_deterministic() {
        let mut session_a = SessionRng::new([42u8; 32]);
        let mut session_b = SessionRng::new([42u8; 32]);

        let mut runner_a = GameRunner::new_with_session(&mut session_a, GameRule::default_tenhou()).unwrap();
        let mut runner_b = GameRunner::new_with_session(&mut session_b, GameRule::default_tenhou()).unwrap();
        assert_eq!(runner_a.game().seed(), runner_b.game().seed());

        runner_a.run_to_completion(&mut FirstActionSelector).unwrap();
        runner_b.run_to_completion(&mut FirstActionSelector).unwrap();

        assert_eq!(runner_a.scores(), runner_b.scores());
        assert_eq!(runner_a.total_actions(), runner_b.total_actions());
    }
}
