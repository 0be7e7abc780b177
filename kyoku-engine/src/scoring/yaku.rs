//! Yaku, yakuman and fu detection for a complete hand.
//!
//! Every head/set division of the concealed part is tried together with
//! every set the winning tile could have completed; the highest scoring
//! reading wins.

use std::collections::BTreeMap;

use super::agari::{self, Division, Mentsu};
use super::score;
use super::WinContext;
use crate::call::{Call, CallType};
use crate::result::{Fu, FuInfo, Yaku, YakuResult, Yakuman};
use crate::rule::GameRule;
use crate::types::{is_honor, is_terminal, is_yaochu, tile_class, Hand};

const HAKU: u8 = 31;
const HATSU: u8 = 32;
const CHUN: u8 = 33;
const GREEN_CLASSES: [u8; 6] = [19, 20, 21, 23, 25, HATSU];
const CHUUREN_SHAPE: [u8; 9] = [3, 1, 1, 1, 1, 1, 1, 1, 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetKind {
    Sequence,
    Triplet,
    Quad,
}

#[derive(Debug, Clone, Copy)]
struct Set {
    kind: SetKind,
    /// Lowest class of the set.
    class: u8,
    /// Counts as an ankou (closed triplet or ankan).
    concealed: bool,
    /// Came from a call rather than the concealed part.
    called: bool,
}

impl Set {
    fn is_sequence(&self) -> bool {
        self.kind == SetKind::Sequence
    }

    fn is_triplet(&self) -> bool {
        matches!(self.kind, SetKind::Triplet | SetKind::Quad)
    }

    fn has_yaochu(&self) -> bool {
        match self.kind {
            SetKind::Sequence => self.class % 9 == 0 || self.class % 9 == 6,
            _ => is_yaochu(self.class),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wait {
    Tanki,
    Kanchan,
    Penchan,
    Ryanmen,
    Shanpon,
}

/// One reading of a winning hand: head, four sets and the wait.
struct Shape {
    head: u8,
    sets: Vec<Set>,
    wait: Wait,
}

fn meld_set(call: &Call) -> Set {
    let class = call
        .tile_ids()
        .into_iter()
        .map(tile_class)
        .min()
        .unwrap_or_default();
    let kind = match call.call_type {
        CallType::Chi => SetKind::Sequence,
        CallType::Pon => SetKind::Triplet,
        _ => SetKind::Quad,
    };
    Set {
        kind,
        class,
        concealed: call.call_type == CallType::AnKan,
        called: true,
    }
}

fn win_groups(div: &Division, win_class: u8) -> Vec<Option<usize>> {
    let mut out = Vec::new();
    if div.head == win_class {
        out.push(None);
    }
    for (idx, m) in div.body.iter().enumerate() {
        let hit = match *m {
            Mentsu::Koutsu(c) => c == win_class,
            Mentsu::Shuntsu(c) => (c..=c + 2).contains(&win_class),
        };
        if hit {
            out.push(Some(idx));
        }
    }
    out
}

fn build_shape(div: &Division, win_group: Option<usize>, melds: &[Call], win_class: u8, is_tsumo: bool) -> Shape {
    let wait = match win_group.map(|idx| div.body[idx]) {
        None => Wait::Tanki,
        Some(Mentsu::Koutsu(_)) => Wait::Shanpon,
        Some(Mentsu::Shuntsu(t)) => {
            if win_class == t + 1 {
                Wait::Kanchan
            } else if (win_class == t && t % 9 == 6) || (win_class == t + 2 && t % 9 == 0) {
                Wait::Penchan
            } else {
                Wait::Ryanmen
            }
        }
    };

    let mut sets: Vec<Set> = div
        .body
        .iter()
        .enumerate()
        .map(|(idx, m)| match *m {
            Mentsu::Koutsu(c) => Set {
                kind: SetKind::Triplet,
                class: c,
                // a triplet completed by ron counts as open
                concealed: is_tsumo || win_group != Some(idx),
                called: false,
            },
            Mentsu::Shuntsu(c) => Set {
                kind: SetKind::Sequence,
                class: c,
                concealed: false,
                called: false,
            },
        })
        .collect();
    sets.extend(melds.iter().map(meld_set));

    Shape {
        head: div.head,
        sets,
        wait,
    }
}

fn classes_present(all: &Hand) -> impl Iterator<Item = u8> + '_ {
    all.counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c > 0)
        .map(|(i, _)| i as u8)
}

fn suits_used(all: &Hand) -> (usize, bool) {
    let mut suits = [false; 3];
    let mut honors = false;
    for class in classes_present(all) {
        if is_honor(class) {
            honors = true;
        } else {
            suits[class as usize / 9] = true;
        }
    }
    (suits.iter().filter(|&&s| s).count(), honors)
}

/// `Some(junsei)` when the closed hand is a nine gates.
fn chuuren(closed: &Hand, win_class: u8) -> Option<bool> {
    let base = [0usize, 9, 18]
        .into_iter()
        .find(|&b| closed.counts[b..b + 9].iter().map(|&c| c as usize).sum::<usize>() == 14)?;
    let counts = &closed.counts[base..base + 9];
    if counts.iter().zip(CHUUREN_SHAPE).any(|(&n, s)| n < s) {
        return None;
    }
    let mut before = [0u8; 9];
    before.copy_from_slice(counts);
    let offset = (win_class as usize).checked_sub(base).filter(|&o| o < 9)?;
    before[offset] -= 1;
    Some(before == CHUUREN_SHAPE)
}

fn hand_yakumans(closed: &Hand, all: &Hand, melds: &[Call], win_class: u8, ctx: &WinContext) -> Vec<Yakuman> {
    let mut out = Vec::new();
    if ctx.is_tenhou {
        out.push(Yakuman::Tenhou);
    } else if ctx.is_chiihou {
        out.push(Yakuman::Chiihou);
    }
    if classes_present(all).all(is_honor) {
        out.push(Yakuman::Tsuuiisou);
    }
    if classes_present(all).all(|c| GREEN_CLASSES.contains(&c)) {
        out.push(Yakuman::Ryuuiisou);
    }
    if classes_present(all).all(is_terminal) {
        out.push(Yakuman::Chinroutou);
    }
    if melds.iter().filter(|m| m.call_type.is_kan()).count() == 4 {
        out.push(Yakuman::Suukantsu);
    }
    if melds.is_empty() {
        match chuuren(closed, win_class) {
            Some(true) => out.push(Yakuman::ChuurenpoutouJunsei),
            Some(false) => out.push(Yakuman::Chuurenpoutou),
            None => {}
        }
    }
    out
}

fn shape_yakumans(shape: &Shape) -> Vec<Yakuman> {
    let mut out = Vec::new();
    let ankou = shape.sets.iter().filter(|s| s.is_triplet() && s.concealed).count();
    if ankou == 4 {
        out.push(if shape.wait == Wait::Tanki {
            Yakuman::SuuankouTanki
        } else {
            Yakuman::Suuankou
        });
    }
    let dragons = shape
        .sets
        .iter()
        .filter(|s| s.is_triplet() && s.class >= HAKU)
        .count();
    if dragons == 3 {
        out.push(Yakuman::Daisangen);
    }
    let winds = shape
        .sets
        .iter()
        .filter(|s| s.is_triplet() && (27..HAKU).contains(&s.class))
        .count();
    if winds == 4 {
        out.push(Yakuman::Daisuushii);
    } else if winds == 3 && (27..HAKU).contains(&shape.head) {
        out.push(Yakuman::Shousuushii);
    }
    out
}

/// Yaku that depend on how the hand was won, not on its shape.
fn situational_yaku(yaku: &mut BTreeMap<Yaku, u32>, ctx: &WinContext, rule: &GameRule, is_closed: bool) {
    if ctx.is_daburu_riichi {
        yaku.insert(Yaku::DaburuRiichi, 2);
    } else if ctx.is_riichi {
        yaku.insert(Yaku::Riichi, 1);
    }
    if ctx.is_ippatsu && rule.is_ippatsu {
        yaku.insert(Yaku::Ippatsu, 1);
    }
    if is_closed && ctx.is_tsumo {
        yaku.insert(Yaku::MenzenTsumo, 1);
    }
    if ctx.is_last_tile {
        if !ctx.is_tsumo {
            yaku.insert(Yaku::Houtei, 1);
        } else if !(ctx.is_rinshan && rule.is_haitei_from_live_only) {
            yaku.insert(Yaku::Haitei, 1);
        }
    }
    if ctx.is_rinshan {
        yaku.insert(Yaku::Rinshan, 1);
    }
    if ctx.is_chankan {
        yaku.insert(Yaku::Chankan, 1);
    }
}

/// Yaku read off the tile set alone (valid for chiitoitsu too).
fn tile_yaku(yaku: &mut BTreeMap<Yaku, u32>, all: &Hand, rule: &GameRule, is_closed: bool) {
    let closed_bonus = is_closed as u32;
    let (suits, honors) = suits_used(all);
    if suits == 1 && !honors {
        yaku.insert(Yaku::Chinitsu, 5 + closed_bonus);
    } else if suits == 1 {
        yaku.insert(Yaku::Honitsu, 2 + closed_bonus);
    }
    if classes_present(all).all(is_yaochu) {
        yaku.insert(Yaku::Honroutou, 2);
    }
    if (is_closed || rule.is_open_tanyao) && !classes_present(all).any(is_yaochu) {
        yaku.insert(Yaku::Tanyao, 1);
    }
}

fn is_value_class(class: u8, ctx: &WinContext) -> bool {
    class >= HAKU || class == ctx.seat_wind.class() || class == ctx.round_wind.class()
}

fn is_pinfu(shape: &Shape, ctx: &WinContext, is_closed: bool, has_melds: bool) -> bool {
    is_closed
        && !has_melds
        && shape.sets.iter().all(|s| s.kind == SetKind::Sequence)
        && !is_value_class(shape.head, ctx)
        && shape.wait == Wait::Ryanmen
}

fn shape_yaku(yaku: &mut BTreeMap<Yaku, u32>, shape: &Shape, ctx: &WinContext, pinfu: bool, is_closed: bool) {
    let closed_bonus = is_closed as u32;
    let sets = &shape.sets;

    if pinfu {
        yaku.insert(Yaku::Pinfu, 1);
    }

    if is_closed {
        let mut seqs: Vec<u8> = sets
            .iter()
            .filter(|s| s.kind == SetKind::Sequence && !s.called)
            .map(|s| s.class)
            .collect();
        seqs.sort_unstable();
        let mut identical = 0;
        let mut i = 0;
        while i + 1 < seqs.len() {
            if seqs[i] == seqs[i + 1] {
                identical += 1;
                i += 2;
            } else {
                i += 1;
            }
        }
        if identical == 2 {
            yaku.insert(Yaku::Ryanpeikou, 3);
        } else if identical == 1 {
            yaku.insert(Yaku::Iipeikou, 1);
        }
    }

    for s in sets.iter().filter(|s| s.is_triplet()) {
        match s.class {
            HAKU => {
                yaku.insert(Yaku::Haku, 1);
            }
            HATSU => {
                yaku.insert(Yaku::Hatsu, 1);
            }
            CHUN => {
                yaku.insert(Yaku::Chun, 1);
            }
            _ => {}
        }
        if s.class == ctx.seat_wind.class() {
            yaku.insert(Yaku::SeatWind, 1);
        }
        if s.class == ctx.round_wind.class() {
            yaku.insert(Yaku::RoundWind, 1);
        }
    }

    let triplets = sets.iter().filter(|s| s.is_triplet()).count();
    if triplets == 4 {
        yaku.insert(Yaku::Toitoi, 2);
    }
    if sets.iter().filter(|s| s.is_triplet() && s.concealed).count() == 3 {
        yaku.insert(Yaku::Sanankou, 2);
    }
    if sets.iter().filter(|s| s.kind == SetKind::Quad).count() == 3 {
        yaku.insert(Yaku::Sankantsu, 2);
    }

    let has = |kind: fn(&Set) -> bool, class: u8| sets.iter().any(|s| kind(s) && s.class == class);
    let seq: fn(&Set) -> bool = Set::is_sequence;
    let trip: fn(&Set) -> bool = Set::is_triplet;
    if (0..7).any(|r| has(seq, r) && has(seq, r + 9) && has(seq, r + 18)) {
        yaku.insert(Yaku::SanshokuDoujun, 1 + closed_bonus);
    }
    if (0..9).any(|r| has(trip, r) && has(trip, r + 9) && has(trip, r + 18)) {
        yaku.insert(Yaku::SanshokuDoukou, 2);
    }
    if [0u8, 9, 18]
        .iter()
        .any(|&b| has(seq, b) && has(seq, b + 3) && has(seq, b + 6))
    {
        yaku.insert(Yaku::Ittsu, 1 + closed_bonus);
    }

    let dragon_sets = sets.iter().filter(|s| s.is_triplet() && s.class >= HAKU).count();
    if dragon_sets == 2 && shape.head >= HAKU {
        yaku.insert(Yaku::Shousangen, 2);
    }

    let any_sequence = sets.iter().any(|s| s.kind == SetKind::Sequence);
    if any_sequence && is_yaochu(shape.head) && sets.iter().all(Set::has_yaochu) {
        let honors = is_honor(shape.head) || sets.iter().any(|s| is_honor(s.class));
        if honors {
            yaku.insert(Yaku::Chanta, 1 + closed_bonus);
        } else {
            yaku.insert(Yaku::Junchan, 2 + closed_bonus);
        }
    }
}

fn shape_fu(shape: &Shape, ctx: &WinContext, rule: &GameRule, pinfu: bool, is_closed: bool) -> Vec<FuInfo> {
    let mut fus = vec![FuInfo { fu: Fu::Base, points: 20 }];
    if is_closed && !ctx.is_tsumo {
        fus.push(FuInfo {
            fu: Fu::BaseClosedRon,
            points: 10,
        });
    }
    if pinfu {
        return fus;
    }
    if ctx.is_tsumo && !(ctx.is_rinshan && !rule.is_rinshan_fu) {
        fus.push(FuInfo { fu: Fu::Tsumo, points: 2 });
    }

    for s in shape.sets.iter().filter(|s| s.is_triplet()) {
        let mut points = 2;
        if s.concealed {
            points *= 2;
        }
        if is_yaochu(s.class) {
            points *= 2;
        }
        if s.kind == SetKind::Quad {
            points *= 4;
        }
        let fu = if s.called { Fu::Meld } else { Fu::Set };
        fus.push(FuInfo { fu, points });
    }

    let mut pair = 0;
    if shape.head >= HAKU {
        pair += 2;
    }
    if shape.head == ctx.seat_wind.class() {
        pair += 2;
    }
    if shape.head == ctx.round_wind.class() {
        pair += 2;
    }
    if pair > 0 {
        fus.push(FuInfo {
            fu: Fu::Pair,
            points: pair,
        });
    }

    if matches!(shape.wait, Wait::Tanki | Wait::Kanchan | Wait::Penchan) {
        fus.push(FuInfo {
            fu: Fu::BadWait,
            points: 2,
        });
    }

    let total: u32 = fus.iter().map(|f| f.points).sum();
    if !is_closed && total == 20 {
        fus.push(FuInfo {
            fu: Fu::NoOpenFu,
            points: 10,
        });
    }
    fus
}

fn yakuman_result(yakumans: Vec<Yakuman>, is_closed: bool) -> YakuResult {
    YakuResult {
        yakumans,
        is_closed,
        ..Default::default()
    }
}

fn result_key(result: &YakuResult, rule: &GameRule) -> (u32, u32, u32) {
    (
        score::yakuman_count(&result.yakumans, rule),
        result.han(),
        score::rounded_fu(result),
    )
}

/// Best yaku reading of a complete hand, `None` when it has no yaku.
///
/// `closed` is the concealed part including the winning tile; called sets
/// are passed in `melds`. Dora bonuses are not counted here.
pub fn evaluate(
    closed: &Hand,
    melds: &[Call],
    win_class: u8,
    ctx: &WinContext,
    rule: &GameRule,
) -> Option<YakuResult> {
    let is_closed = melds.iter().all(|m| !m.is_open());
    let mut all = closed.clone();
    for m in melds {
        for t in m.tile_ids() {
            all.add(tile_class(t));
        }
    }
    let hand_yakuman = hand_yakumans(closed, &all, melds, win_class, ctx);

    if agari::is_kokushi(closed) {
        let mut yakumans = hand_yakuman;
        yakumans.push(if closed.counts[win_class as usize] == 2 {
            Yakuman::Kokushi13
        } else {
            Yakuman::Kokushi
        });
        return Some(yakuman_result(yakumans, is_closed));
    }

    let mut candidates: Vec<YakuResult> = Vec::new();

    for div in agari::find_divisions(closed) {
        for win_group in win_groups(&div, win_class) {
            let shape = build_shape(&div, win_group, melds, win_class, ctx.is_tsumo);
            let mut yakumans = hand_yakuman.clone();
            yakumans.extend(shape_yakumans(&shape));
            if !yakumans.is_empty() {
                candidates.push(yakuman_result(yakumans, is_closed));
                continue;
            }

            let pinfu = is_pinfu(&shape, ctx, is_closed, !melds.is_empty());
            let mut yaku = BTreeMap::new();
            situational_yaku(&mut yaku, ctx, rule, is_closed);
            tile_yaku(&mut yaku, &all, rule, is_closed);
            shape_yaku(&mut yaku, &shape, ctx, pinfu, is_closed);
            if yaku.contains_key(&Yaku::Honroutou) {
                yaku.remove(&Yaku::Chanta);
            }
            if yaku.contains_key(&Yaku::Ryanpeikou) {
                yaku.remove(&Yaku::Iipeikou);
            }
            if yaku.is_empty() {
                continue;
            }
            candidates.push(YakuResult {
                yaku,
                fus: shape_fu(&shape, ctx, rule, pinfu, is_closed),
                is_closed,
                ..Default::default()
            });
        }
    }

    if agari::is_chiitoitsu(closed) {
        if !hand_yakuman.is_empty() {
            candidates.push(yakuman_result(hand_yakuman, is_closed));
        } else {
            let mut yaku = BTreeMap::new();
            yaku.insert(Yaku::Chiitoitsu, 2);
            situational_yaku(&mut yaku, ctx, rule, is_closed);
            tile_yaku(&mut yaku, &all, rule, is_closed);
            candidates.push(YakuResult {
                yaku,
                fus: vec![FuInfo {
                    fu: Fu::Base7,
                    points: 25,
                }],
                is_closed,
                ..Default::default()
            });
        }
    }

    candidates
        .into_iter()
        .max_by_key(|r| result_key(r, rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::test_utils::{ctx, hand};
    use crate::types::Wind;

    fn eval(tiles: &str, win_class: u8, tsumo: bool) -> Option<YakuResult> {
        let mut c = ctx(win_class * 4 + 1);
        c.is_tsumo = tsumo;
        evaluate(&hand(tiles), &[], win_class, &c, &GameRule::default())
    }

    #[test]
    fn test_no_yaku_is_none() {
        // kanchan ron, haku pair, terminals: nothing counts
        assert!(eval("123m456p789s234s55z", 1, false).is_none());
    }

    #[test]
    fn test_pinfu_tsumo() {
        // 23m waiting on 1m/4m, drew 1m
        let r = eval("123m456p789s234s55p", 0, true).unwrap();
        assert!(r.yaku.contains_key(&Yaku::Pinfu));
        assert!(r.yaku.contains_key(&Yaku::MenzenTsumo));
        assert_eq!(score::rounded_fu(&r), 20);
    }

    #[test]
    fn test_tanyao_and_fu_rounding() {
        // 20 + 10 closed ron + 4 closed simple triplet + 2 tanki = 36
        let r = eval("234m567p345s888s66p", 14, false).unwrap();
        assert_eq!(r.yaku.get(&Yaku::Tanyao), Some(&1));
        assert_eq!(r.fu(), 36);
        assert_eq!(score::rounded_fu(&r), 40);
    }

    #[test]
    fn test_chiitoitsu() {
        let r = eval("1122m3344p5566s77z", 33, false).unwrap();
        assert_eq!(r.yaku.get(&Yaku::Chiitoitsu), Some(&2));
        assert_eq!(score::rounded_fu(&r), 25);
    }

    #[test]
    fn test_ryanpeikou_beats_chiitoitsu() {
        let r = eval("223344m556677p99s", 26, false).unwrap();
        assert_eq!(r.yaku.get(&Yaku::Ryanpeikou), Some(&3));
        assert!(!r.yaku.contains_key(&Yaku::Chiitoitsu));
        assert!(!r.yaku.contains_key(&Yaku::Iipeikou));
    }

    #[test]
    fn test_kokushi_waits() {
        let r = eval("19m19p19s12345677z", 0, false).unwrap();
        assert_eq!(r.yakumans, vec![Yakuman::Kokushi]);
        // the winning tile completed the pair: thirteen-sided wait
        let r = eval("19m19p19s12345677z", 33, false).unwrap();
        assert_eq!(r.yakumans, vec![Yakuman::Kokushi13]);
    }

    #[test]
    fn test_shape_yakumans() {
        let r = eval("111m555z666z777z99p", 33, true).unwrap();
        assert!(r.yakumans.contains(&Yakuman::Daisangen));
        assert!(r.yakumans.contains(&Yakuman::Suuankou));
        assert!(r.yaku.is_empty());

        let r = eval("11123455678999m", 4, false).unwrap();
        assert!(r.yakumans.contains(&Yakuman::ChuurenpoutouJunsei));
    }

    #[test]
    fn test_open_hand_with_pon() {
        let pon = Call::pon(132, 133, 134, Wind::East, Some(Wind::North));
        let c = ctx(5);
        let r = evaluate(&hand("123m456p789s22m"), &[pon], 1, &c, &GameRule::default()).unwrap();
        assert_eq!(r.yaku.get(&Yaku::Chun), Some(&1));
        assert!(!r.is_closed);
        // 20 + open dragon triplet 4 + tanki 2 = 26
        assert_eq!(score::rounded_fu(&r), 30);
    }

    #[test]
    fn test_open_tanyao_rule() {
        let chi = Call::chi(4, 8, 12, Wind::South, Some(Wind::East));
        let mut rule = GameRule::default();
        // ron on 6p completing 456p
        let c = ctx(57);
        let closed = hand("456p678s345s55s");
        assert!(evaluate(&closed, &[chi], 14, &c, &rule).is_some());
        rule.is_open_tanyao = false;
        assert!(evaluate(&closed, &[chi], 14, &c, &rule).is_none());
    }
}
