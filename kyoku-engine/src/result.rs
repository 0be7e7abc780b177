use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::call::Call;
use crate::rule::Limit;
use crate::types::{Wind, NP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Yaku {
    Riichi,
    DaburuRiichi,
    Ippatsu,
    MenzenTsumo,
    Pinfu,
    Tanyao,
    Iipeikou,
    Ryanpeikou,
    Haku,
    Hatsu,
    Chun,
    SeatWind,
    RoundWind,
    Haitei,
    Houtei,
    Rinshan,
    Chankan,
    Chanta,
    Junchan,
    Ittsu,
    SanshokuDoujun,
    SanshokuDoukou,
    Toitoi,
    Sanankou,
    Sankantsu,
    Shousangen,
    Honroutou,
    Chiitoitsu,
    Honitsu,
    Chinitsu,
    // bonuses, never enough on their own
    Dora,
    UraDora,
    AkaDora,
}

impl Yaku {
    pub fn is_bonus(self) -> bool {
        matches!(self, Yaku::Dora | Yaku::UraDora | Yaku::AkaDora)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Yakuman {
    Kokushi,
    Kokushi13,
    Suuankou,
    SuuankouTanki,
    Daisangen,
    Shousuushii,
    Daisuushii,
    Tsuuiisou,
    Ryuuiisou,
    Chinroutou,
    Chuurenpoutou,
    ChuurenpoutouJunsei,
    Suukantsu,
    Tenhou,
    Chiihou,
}

impl Yakuman {
    /// Variants that count twice under `has_double_yakumans`.
    pub fn is_double(self) -> bool {
        matches!(
            self,
            Yakuman::Kokushi13
                | Yakuman::SuuankouTanki
                | Yakuman::ChuurenpoutouJunsei
                | Yakuman::Daisuushii
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fu {
    Base,
    BaseClosedRon,
    Base7,
    Set,
    Tsumo,
    Meld,
    NoOpenFu,
    BadWait,
    Pair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuInfo {
    pub fu: Fu,
    pub points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YakuResult {
    pub yaku: BTreeMap<Yaku, u32>,
    pub yakumans: Vec<Yakuman>,
    pub bonuses: BTreeMap<Yaku, u32>,
    pub fus: Vec<FuInfo>,
    pub is_closed: bool,
}

impl YakuResult {
    pub fn han(&self) -> u32 {
        self.yaku.values().sum::<u32>() + self.bonuses.values().sum::<u32>()
    }

    pub fn fu(&self) -> u32 {
        self.fus.iter().map(|f| f.points).sum()
    }
}

/// Payment table of one win; every amount already includes honba.
///
/// * `pay_ron`: paid by the discarder.
/// * `pay_tsumo`: paid by each non-dealer on a tsumo.
/// * `pay_tsumo_dealer`: paid by the dealer on a non-dealer tsumo; on a
///   dealer tsumo every other seat pays this amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub pay_ron: i32,
    pub pay_tsumo: i32,
    pub pay_tsumo_dealer: i32,
    pub special: Limit,
    pub han: u32,
    pub fu: u32,
}

impl ScoreResult {
    /// Per-wind point deltas for `winner`. `payer` is the discarder on a ron
    /// and `None` on a tsumo. `sticks` are riichi sticks the winner collects.
    pub fn changes(&self, winner: Wind, payer: Option<Wind>, sticks: i32, stick_value: i32) -> [i32; NP] {
        let mut delta = [0i32; NP];
        match payer {
            Some(p) => {
                delta[p.index()] -= self.pay_ron;
                delta[winner.index()] += self.pay_ron;
            }
            None => {
                for other in winner.others() {
                    let pay = if winner == Wind::East || other == Wind::East {
                        self.pay_tsumo_dealer
                    } else {
                        self.pay_tsumo
                    };
                    delta[other.index()] -= pay;
                    delta[winner.index()] += pay;
                }
            }
        }
        delta[winner.index()] += sticks * stick_value;
        delta
    }

    /// Total the winner receives, sticks excluded.
    pub fn total(&self, winner: Wind, tsumo: bool) -> i32 {
        if !tsumo {
            self.pay_ron
        } else if winner == Wind::East {
            self.pay_tsumo_dealer * 3
        } else {
            self.pay_tsumo_dealer + self.pay_tsumo * 2
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RyuuKyokuReason {
    #[default]
    None,
    Normal,
    KyuuShuKyuuHai,
    SuuChaRiichi,
    SuuKaiKan,
    SuuFonRenDa,
    SanChaHou,
}

impl RyuuKyokuReason {
    /// Abortive draws keep the dealer and pay nothing.
    pub fn is_abortive(self) -> bool {
        !matches!(self, RyuuKyokuReason::None | RyuuKyokuReason::Normal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FuritenReason {
    #[default]
    None,
    Jun,
    Discard,
    Riichi,
}

/// Outcome for one seat at the end of a round: a win (yaku + score + the
/// winning call) or a draw reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub yaku_result: Option<YakuResult>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub score_result: Option<ScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ron_call: Option<Call>,
    pub ryuukyoku_reason: RyuuKyokuReason,
}

impl RoundResult {
    pub fn win(yaku_result: YakuResult, score_result: ScoreResult) -> Self {
        Self {
            yaku_result: Some(yaku_result),
            score_result: Some(score_result),
            ron_call: None,
            ryuukyoku_reason: RyuuKyokuReason::None,
        }
    }

    pub fn ryuukyoku(reason: RyuuKyokuReason) -> Self {
        Self {
            ryuukyoku_reason: reason,
            ..Self::default()
        }
    }

    pub fn is_win(&self) -> bool {
        self.score_result.is_some()
    }
}
