//! Hand evaluation behind a narrow seam.
//!
//! The state machine only needs three questions answered: how far a hand is
//! from tenpai, which classes complete it, and what a complete hand is worth.
//! [`ScoringAdapter`] asks exactly those; [`StandardScorer`] answers them with
//! the block-search shanten, agari division and yaku tables in this module.

pub mod agari;
pub mod score;
pub mod shanten;
pub mod yaku;

use crate::call::Call;
use crate::result::{RoundResult, Yaku};
use crate::rule::GameRule;
use crate::types::{is_red_five, next_dora_class, tile_class, Hand, Wind, TILE_MAX};

/// Everything about a win that is not visible in the tiles themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WinContext {
    pub win_tile: u8,
    pub seat_wind: Wind,
    pub round_wind: Wind,
    pub dora_indicators: Vec<u8>,
    pub ura_indicators: Vec<u8>,
    pub is_tsumo: bool,
    pub is_riichi: bool,
    pub is_ippatsu: bool,
    pub is_daburu_riichi: bool,
    /// The wall is exhausted (haitei on a tsumo, houtei on a ron).
    pub is_last_tile: bool,
    pub is_rinshan: bool,
    pub is_chankan: bool,
    pub is_tenhou: bool,
    pub is_chiihou: bool,
    pub honba: u32,
}

pub trait ScoringAdapter: Send + Sync {
    /// `0` tenpai, `-1` complete.
    fn shanten(&self, hand: &[u8], melds: &[Call]) -> i32;

    /// Classes that would complete a tenpai hand, ascending.
    fn tenpai_classes(&self, hand: &[u8], melds: &[Call]) -> Vec<u8>;

    /// Scores `hand + ctx.win_tile`; `None` when it is not a win with a yaku.
    fn evaluate(&self, hand: &[u8], melds: &[Call], ctx: &WinContext, rule: &GameRule) -> Option<RoundResult>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScorer;

impl StandardScorer {
    fn bonuses(all_tiles: &[u8], ctx: &WinContext, rule: &GameRule) -> Vec<(Yaku, u32)> {
        let count_for = |indicators: &[u8]| -> u32 {
            indicators
                .iter()
                .map(|&ind| {
                    let dora = next_dora_class(tile_class(ind));
                    all_tiles.iter().filter(|&&t| tile_class(t) == dora).count() as u32
                })
                .sum()
        };

        let mut out = vec![(Yaku::Dora, count_for(&ctx.dora_indicators))];
        if ctx.is_riichi && rule.is_ura {
            out.push((Yaku::UraDora, count_for(&ctx.ura_indicators)));
        }
        if rule.has_aka_dora {
            let aka = all_tiles.iter().filter(|&&t| is_red_five(t)).count() as u32;
            out.push((Yaku::AkaDora, aka));
        }
        out.retain(|&(_, n)| n > 0);
        out
    }
}

impl ScoringAdapter for StandardScorer {
    fn shanten(&self, hand: &[u8], _melds: &[Call]) -> i32 {
        shanten::calculate_shanten(hand)
    }

    fn tenpai_classes(&self, hand: &[u8], melds: &[Call]) -> Vec<u8> {
        let mut counts = Hand::from_tiles(hand);
        let len_div3 = (counts.len() / 3) as u8;
        let mut held = counts.counts;
        for m in melds {
            for t in m.tile_ids() {
                held[tile_class(t) as usize] += 1;
            }
        }

        let mut waits = Vec::new();
        for class in 0..TILE_MAX as u8 {
            if held[class as usize] >= 4 {
                continue;
            }
            counts.add(class);
            if shanten::calc_shanten_from_counts(&counts.counts, len_div3) == -1 {
                waits.push(class);
            }
            counts.remove(class);
        }
        waits
    }

    fn evaluate(&self, hand: &[u8], melds: &[Call], ctx: &WinContext, rule: &GameRule) -> Option<RoundResult> {
        let mut concealed: Vec<u8> = hand.to_vec();
        concealed.push(ctx.win_tile);
        let closed = Hand::from_tiles(&concealed);
        if !agari::is_agari(&closed) {
            return None;
        }

        let win_class = tile_class(ctx.win_tile);
        let mut yaku_result = yaku::evaluate(&closed, melds, win_class, ctx, rule)?;
        if yaku_result.yakumans.is_empty() {
            let mut all_tiles = concealed;
            all_tiles.extend(melds.iter().flat_map(|m| m.tile_ids()));
            yaku_result
                .bonuses
                .extend(Self::bonuses(&all_tiles, ctx, rule));
        }

        let is_dealer = ctx.seat_wind == Wind::East;
        let score_result = score::calculate(&yaku_result, is_dealer, ctx.honba, rule);
        Some(RoundResult::win(yaku_result, score_result))
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::WinContext;
    use crate::types::{Hand, TILE_MAX};

    /// Class counts from a compact `"123m456p11z"` string (`0` is a red five).
    pub fn counts(hand: &str) -> [u8; TILE_MAX] {
        let mut out = [0u8; TILE_MAX];
        for id in ids(hand) {
            out[id as usize / 4] += 1;
        }
        out
    }

    pub fn hand(tiles: &str) -> Hand {
        Hand { counts: counts(tiles) }
    }

    /// Physical ids for a compact hand string. Copies are handed out in the
    /// order 1, 2, 3, 0 so that plain fives are never red; `0` asks for the
    /// red copy explicitly.
    pub fn ids(hand: &str) -> Vec<u8> {
        const COPY_ORDER: [u8; 4] = [1, 2, 3, 0];
        let mut used = [0usize; TILE_MAX];
        let mut pending: Vec<u8> = Vec::new();
        let mut out = Vec::new();
        for ch in hand.chars() {
            match ch {
                '0'..='9' => pending.push(ch as u8 - b'0'),
                'm' | 'p' | 's' | 'z' => {
                    let base = match ch {
                        'm' => 0,
                        'p' => 9,
                        's' => 18,
                        _ => 27,
                    };
                    for n in pending.drain(..) {
                        if n == 0 {
                            out.push(((base + 4) * 4) as u8);
                            continue;
                        }
                        let class = base + n as usize - 1;
                        let copy = COPY_ORDER[used[class] % 4];
                        used[class] += 1;
                        out.push(class as u8 * 4 + copy);
                    }
                }
                _ => {}
            }
        }
        out
    }

    pub fn ctx(win_tile: u8) -> WinContext {
        WinContext {
            win_tile,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::{ctx, ids};
    use super::*;
    use crate::rule::Limit;

    #[test]
    fn test_tenpai_classes() {
        let scorer = StandardScorer;
        assert_eq!(scorer.tenpai_classes(&ids("123m456p789s23s11z"), &[]), vec![18, 21]);
        assert_eq!(scorer.tenpai_classes(&ids("1112345678999m"), &[]), (0..9).collect::<Vec<u8>>());
        assert!(scorer.tenpai_classes(&ids("159m159p159s1234z"), &[]).is_empty());
    }

    #[test]
    fn test_evaluate_with_dora() {
        let scorer = StandardScorer;
        let hand = ids("234m567p345s888s6p");
        let mut c = ctx(ids("6p")[0]);
        c.seat_wind = Wind::South;
        // indicator 7s makes 8s dora
        c.dora_indicators = vec![ids("7s")[0]];
        let res = scorer.evaluate(&hand, &[], &c, &GameRule::default()).unwrap();
        let yaku = res.yaku_result.unwrap();
        assert_eq!(yaku.bonuses.get(&Yaku::Dora), Some(&3));
        let score = res.score_result.unwrap();
        // tanyao + dora 3 at 40 fu: mangan
        assert_eq!(score.special, Limit::Mangan);
        assert_eq!(score.pay_ron, 8000);
    }

    #[test]
    fn test_red_five_counts_only_with_rule() {
        let scorer = StandardScorer;
        let hand = ids("234m067p345s888s6p");
        let c = ctx(ids("6p")[0]);
        let mut rule = GameRule::default();
        let yaku = scorer.evaluate(&hand, &[], &c, &rule).unwrap().yaku_result.unwrap();
        assert_eq!(yaku.bonuses.get(&Yaku::AkaDora), Some(&1));
        rule.has_aka_dora = false;
        let yaku = scorer.evaluate(&hand, &[], &c, &rule).unwrap().yaku_result.unwrap();
        assert!(yaku.bonuses.is_empty());
    }

    #[test]
    fn test_not_a_win() {
        let scorer = StandardScorer;
        let hand = ids("123m456p789s23s11z");
        assert!(scorer.evaluate(&hand, &[], &ctx(ids("9s")[0]), &GameRule::default()).is_none());
    }
}
