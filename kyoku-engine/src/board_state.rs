use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::call::Call;
use crate::errors::EngineResult;
use crate::tile;
use crate::types::{Wind, WindRound};

/// Public view of one seat, as shown to every other seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub points: i32,
    pub melds: Vec<Call>,
    #[serde(with = "tile::names")]
    pub discards: Vec<u8>,
    pub tsumo_giri: Vec<bool>,
    pub riichi: bool,
}

/// Snapshot of the table from one seat's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub wind_round: WindRound,
    pub num_honba: u32,
    pub num_riichi: u32,
    #[serde(with = "tile::names")]
    pub dora_indicators: Vec<u8>,
    pub player_wind: Wind,
    pub position: Wind,
    #[serde(with = "tile::names")]
    pub hand_tiles: Vec<u8>,
    pub valid_actions: Vec<Call>,
    pub remain_tiles: u32,
    pub player_states: BTreeMap<Wind, PlayerState>,
}

impl BoardState {
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn player(&self, wind: Wind) -> Option<&PlayerState> {
        self.player_states.get(&wind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_state_json() {
        let mut player_states = BTreeMap::new();
        for w in Wind::ALL {
            player_states.insert(
                w,
                PlayerState {
                    points: 25000,
                    melds: vec![],
                    discards: vec![108],
                    tsumo_giri: vec![true],
                    riichi: w == Wind::West,
                },
            );
        }
        let state = BoardState {
            wind_round: WindRound::South2,
            num_honba: 1,
            num_riichi: 0,
            dora_indicators: vec![135],
            player_wind: Wind::North,
            position: Wind::East,
            hand_tiles: vec![0, 4, 8],
            valid_actions: vec![Call::skip()],
            remain_tiles: 60,
            player_states,
        };
        let json = state.to_json().unwrap();
        assert!(json.contains("\"South2\""));
        assert!(json.contains("\"Ton1\""));
        assert!(json.contains("\"Chun4\""));
        let back = BoardState::from_json(&json).unwrap();
        assert_eq!(back, state);
        assert!(back.player(Wind::West).unwrap().riichi);
    }
}
