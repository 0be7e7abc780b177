use crate::types::{Hand, TILE_MAX, YAOCHU_CLASSES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mentsu {
    Koutsu(u8),
    Shuntsu(u8),
}

/// One way of splitting a complete concealed part into a head and sets.
#[derive(Debug, Clone)]
pub struct Division {
    pub head: u8,
    pub body: Vec<Mentsu>,
}

pub fn is_agari(hand: &Hand) -> bool {
    is_kokushi(hand) || is_chiitoitsu(hand) || is_standard_agari(hand)
}

/// Every head + sets split of `hand`. The concealed part may hold fewer than
/// four sets when melds were called.
pub fn find_divisions(hand: &Hand) -> Vec<Division> {
    let mut divisions = Vec::new();
    for i in 0..TILE_MAX {
        if hand.counts[i] < 2 {
            continue;
        }
        let mut rest = hand.clone();
        rest.counts[i] -= 2;
        let mut bodies = Vec::new();
        decompose_all(&mut rest, 0, &mut Vec::new(), &mut bodies);
        divisions.extend(bodies.into_iter().map(|body| Division {
            head: i as u8,
            body,
        }));
    }
    divisions
}

fn decompose_all(
    hand: &mut Hand,
    start_idx: usize,
    current_body: &mut Vec<Mentsu>,
    results: &mut Vec<Vec<Mentsu>>,
) {
    let mut i = start_idx;
    while i < TILE_MAX && hand.counts[i] == 0 {
        i += 1;
    }
    if i == TILE_MAX {
        results.push(current_body.clone());
        return;
    }

    if hand.counts[i] >= 3 {
        hand.counts[i] -= 3;
        current_body.push(Mentsu::Koutsu(i as u8));
        decompose_all(hand, i, current_body, results);
        current_body.pop();
        hand.counts[i] += 3;
    }

    if is_sequence_start(i) && hand.counts[i + 1] > 0 && hand.counts[i + 2] > 0 {
        hand.counts[i] -= 1;
        hand.counts[i + 1] -= 1;
        hand.counts[i + 2] -= 1;
        current_body.push(Mentsu::Shuntsu(i as u8));
        decompose_all(hand, i, current_body, results);
        current_body.pop();
        hand.counts[i] += 1;
        hand.counts[i + 1] += 1;
        hand.counts[i + 2] += 1;
    }
}

/// 1..7 of a numbered suit.
fn is_sequence_start(class: usize) -> bool {
    class < 27 && class % 9 <= 6
}

pub fn is_kokushi(hand: &Hand) -> bool {
    let mut pair_found = false;
    for &idx in &YAOCHU_CLASSES {
        match hand.counts[idx as usize] {
            1 => {}
            2 if !pair_found => pair_found = true,
            _ => return false,
        }
    }
    pair_found && hand.len() == 14
}

pub fn is_chiitoitsu(hand: &Hand) -> bool {
    let mut pairs = 0;
    for &c in hand.counts.iter() {
        match c {
            0 => {}
            2 => pairs += 1,
            _ => return false,
        }
    }
    pairs == 7
}

pub fn is_standard_agari(hand: &Hand) -> bool {
    if hand.len() % 3 != 2 {
        return false;
    }
    let mut work = hand.clone();
    for i in 0..TILE_MAX {
        if work.counts[i] >= 2 {
            work.counts[i] -= 2;
            let ok = decompose(&mut work, 0);
            work.counts[i] += 2;
            if ok {
                return true;
            }
        }
    }
    false
}

fn decompose(hand: &mut Hand, start_idx: usize) -> bool {
    let mut i = start_idx;
    while i < TILE_MAX && hand.counts[i] == 0 {
        i += 1;
    }
    if i == TILE_MAX {
        return true;
    }

    if hand.counts[i] >= 3 {
        hand.counts[i] -= 3;
        let ok = decompose(hand, i);
        hand.counts[i] += 3;
        if ok {
            return true;
        }
    }

    if is_sequence_start(i) && hand.counts[i + 1] > 0 && hand.counts[i + 2] > 0 {
        hand.counts[i] -= 1;
        hand.counts[i + 1] -= 1;
        hand.counts[i + 2] -= 1;
        let ok = decompose(hand, i);
        hand.counts[i] += 1;
        hand.counts[i + 1] += 1;
        hand.counts[i + 2] += 1;
        if ok {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::test_utils::hand;

    #[test]
    fn test_standard() {
        assert!(is_agari(&hand("123m456p789s11122z")));
        assert!(!is_agari(&hand("123m456p789s11123z")));
        // after four calls only the pair is left
        assert!(is_agari(&hand("77z")));
    }

    #[test]
    fn test_divisions_ambiguous() {
        // 111222333m: three triplets or three runs
        let divs = find_divisions(&hand("111222333m456p77z"));
        assert_eq!(divs.len(), 2);
        assert!(divs.iter().all(|d| d.head == 33));
    }

    #[test]
    fn test_special_forms() {
        assert!(is_chiitoitsu(&hand("1122m3344p5566s77z")));
        assert!(!is_chiitoitsu(&hand("1111m3344p5566s77z")));
        assert!(is_kokushi(&hand("19m19p19s12345677z")));
        assert!(!is_kokushi(&hand("19m19p19s1234566z")));
    }
}
