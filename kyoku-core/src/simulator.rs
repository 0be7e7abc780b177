//! Batch game simulation with rayon parallelism.
//!
//! Runs N complete matches in parallel on a dedicated rayon ThreadPool.
//! Every match is seeded from `base_seed + game_index`, so a batch is
//! reproducible regardless of thread count.

use kyoku_engine::{EngineResult, GameRule};
use log::info;
use rayon::prelude::*;

use crate::game_loop::{FirstActionSelector, GameRunner, SeededRandomSelector};

/// Configuration for a batch simulation run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of games to simulate.
    pub num_games: usize,
    /// Base seed. Each game gets seed + game_index.
    pub base_seed: u64,
    /// Number of threads in the rayon pool. None = use rayon default (num CPUs).
    pub num_threads: Option<usize>,
    /// Pick uniformly among offered calls instead of always the first one.
    pub random_play: bool,
    pub rule: GameRule,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_games: 100,
            base_seed: 0,
            num_threads: None,
            random_play: false,
            rule: GameRule::default_tenhou(),
        }
    }
}

/// Outcome of a single completed game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    /// Final points for each player (4 players).
    pub scores: [i32; 4],
    /// Riichi sticks left on the table when the match ended.
    pub sticks_left: u32,
    /// Number of rounds (kyoku) played.
    pub rounds_played: u32,
    /// Total number of engine steps across all rounds.
    pub total_actions: u32,
    /// The seed used for this game.
    pub seed: u64,
}

/// Play one complete match.
pub fn simulate_single_game(seed: u64, rule: GameRule, random_play: bool) -> EngineResult<GameSummary> {
    let mut runner = GameRunner::new(seed, rule)?;
    if random_play {
        runner.run_to_completion(&mut SeededRandomSelector::new(seed))?;
    } else {
        runner.run_to_completion(&mut FirstActionSelector)?;
    }
    Ok(GameSummary {
        scores: runner.scores(),
        sticks_left: runner.game().num_riichi(),
        rounds_played: runner.rounds_played(),
        total_actions: runner.total_actions(),
        seed,
    })
}

/// Parallel batch simulator using a dedicated rayon ThreadPool.
pub struct BatchSimulator {
    pool: rayon::ThreadPool,
}

impl BatchSimulator {
    /// Create a new batch simulator with the given thread count.
    pub fn new(num_threads: Option<usize>) -> Result<Self, rayon::ThreadPoolBuildError> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder.build()?;
        Ok(Self { pool })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run a batch of games in parallel. Results come back in seed order.
    pub fn run_batch(&self, config: &BatchConfig) -> EngineResult<Vec<GameSummary>> {
        info!(
            "simulating {} games from seed {} on {} threads",
            config.num_games,
            config.base_seed,
            self.num_threads()
        );
        let results: EngineResult<Vec<GameSummary>> = self.pool.install(|| {
            (0..config.num_games)
                .into_par_iter()
                .map(|i| {
                    let seed = config.base_seed.wrapping_add(i as u64);
                    simulate_single_game(seed, config.rule, config.random_play)
                })
                .collect()
        });
        let results = results?;
        let actions: u64 = results.iter().map(|r| r.total_actions as u64).sum();
        let rounds: u64 = results.iter().map(|r| r.rounds_played as u64).sum();
        info!(
            "finished {} games: {} rounds, {} actions",
            results.len(),
            rounds,
            actions
        );
        Ok(results)
    }
}

/// Convenience: build a pool sized by `config.num_threads` and run one batch.
pub fn simulate_batch(config: &BatchConfig) -> EngineResult<Vec<GameSummary>> {
    let sim = BatchSimulator::new(config.num_threads).map_err(|e| {
        kyoku_engine::GameError::invalid_state(format!("failed to build thread pool: {e}"))
    })?;
    sim.run_batch(config)
}
