use crate::result::{Fu, ScoreResult, YakuResult, Yakuman};
use crate::rule::{GameRule, Limit};

fn ceil_100(val: i32) -> i32 {
    (val + 99) / 100 * 100
}

/// Number of yakuman the hand is worth under `rule`.
pub fn yakuman_count(yakumans: &[Yakuman], rule: &GameRule) -> u32 {
    let weight = |y: &Yakuman| {
        if rule.has_double_yakumans && y.is_double() {
            2
        } else {
            1
        }
    };
    if rule.is_yakuman_sum {
        yakumans.iter().map(weight).sum()
    } else {
        yakumans.iter().map(weight).max().unwrap_or(0)
    }
}

/// Fu rounded up to ten; chiitoitsu stays at 25.
pub fn rounded_fu(result: &YakuResult) -> u32 {
    if result.fus.iter().any(|f| f.fu == Fu::Base7) {
        return 25;
    }
    result.fu().div_ceil(10) * 10
}

/// Base points and the limit name for a hand.
pub fn base_points(han: u32, fu: u32, yakuman: u32, rule: &GameRule) -> (i32, Limit) {
    if yakuman > 0 {
        return (8000 * yakuman as i32, Limit::Yakuman);
    }
    match han {
        13.. if rule.is_kazoe_yakuman => (8000, Limit::Yakuman),
        11.. => (6000, Limit::Sanbaiman),
        8..=10 => (4000, Limit::Baiman),
        6 | 7 => (3000, Limit::Haneman),
        5 => (2000, Limit::Mangan),
        _ => {
            let bp = fu as i32 * 2i32.pow(han + 2);
            if bp >= 2000 || (rule.is_mangan_round && bp >= 1920) {
                (2000, Limit::Mangan)
            } else {
                (bp, Limit::None)
            }
        }
    }
}

/// Payment table of a win, honba included.
pub fn calculate(result: &YakuResult, is_dealer: bool, honba: u32, rule: &GameRule) -> ScoreResult {
    let yakuman = yakuman_count(&result.yakumans, rule);
    let (han, fu) = if yakuman > 0 {
        (13 * yakuman, 0)
    } else {
        (result.han(), rounded_fu(result))
    };
    let (base, special) = base_points(han, fu, yakuman, rule);
    let honba_pts = rule.honba_value * honba as i32;

    let (pay_ron, pay_tsumo, pay_tsumo_dealer) = if is_dealer {
        let each = ceil_100(base * 2) + honba_pts;
        (ceil_100(base * 6) + 3 * honba_pts, each, each)
    } else {
        (
            ceil_100(base * 4) + 3 * honba_pts,
            ceil_100(base) + honba_pts,
            ceil_100(base * 2) + honba_pts,
        )
    };

    ScoreResult {
        pay_ron,
        pay_tsumo,
        pay_tsumo_dealer,
        special,
        han,
        fu,
    }
}
