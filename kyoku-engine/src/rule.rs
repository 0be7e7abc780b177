use serde::{Deserialize, Serialize};

use crate::errors::EngineResult;

/// Cap applied to renhou and similar limited hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Limit {
    #[default]
    None,
    Mangan,
    Haneman,
    Baiman,
    Sanbaiman,
    Yakuman,
}

/// Table rules, fixed for the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRule {
    /// 1 for a single round, 4 for tonpuusen, 8 for hanchan.
    pub game_length: u8,

    pub is_open_tanyao: bool,
    pub has_aka_dora: bool,
    pub is_ura: bool,
    pub is_ippatsu: bool,
    pub is_rinshan_fu: bool,
    /// Haitei/houtei only on the last live tile, never on a rinshan draw.
    pub is_haitei_from_live_only: bool,

    /// Round 4 han 30 fu and 3 han 60 fu up to mangan (kiriage).
    pub is_mangan_round: bool,
    /// 13+ han without a yakuman counts as yakuman.
    pub is_kazoe_yakuman: bool,
    /// Kokushi 13-wait, suuankou tanki, junsei chuuren and daisuushii count double.
    pub has_double_yakumans: bool,
    /// Multiple yakuman in one hand add up.
    pub is_yakuman_sum: bool,
    pub honba_value: i32,

    /// `false`: a triple ron becomes an abortive draw.
    pub is_san_cha_hou: bool,
    pub is_nagashi_mangan: bool,
    pub kuikae_forbidden: bool,

    pub starting_points: i32,
    pub riichi_cost: i32,
    /// Leading score that ends the match once regulation length is reached.
    pub target_points: i32,
}

impl Default for GameRule {
    fn default() -> Self {
        Self::default_tenhou()
    }
}

impl GameRule {
    pub fn default_tenhou() -> Self {
        Self {
            game_length: 8,

            is_open_tanyao: true,
            has_aka_dora: true,
            is_ura: true,
            is_ippatsu: true,
            is_rinshan_fu: true,
            is_haitei_from_live_only: true,

            is_mangan_round: false,
            is_kazoe_yakuman: true,
            has_double_yakumans: false,
            is_yakuman_sum: true,
            honba_value: 100,

            is_san_cha_hou: false,
            is_nagashi_mangan: true,
            kuikae_forbidden: true,

            starting_points: 25000,
            riichi_cost: 1000,
            target_points: 30000,
        }
    }

    pub fn default_mjsoul() -> Self {
        Self {
            is_mangan_round: true,
            has_double_yakumans: true,
            is_san_cha_hou: true,
            ..Self::default_tenhou()
        }
    }

    /// Tonpuusen variant of the default rule.
    pub fn east_only() -> Self {
        Self {
            game_length: 4,
            ..Self::default_tenhou()
        }
    }

    pub fn from_json(s: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
