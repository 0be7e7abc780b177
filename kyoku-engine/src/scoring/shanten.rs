use crate::types::{tile_class, TILE_MAX, YAOCHU_CLASSES};

/// Best taatsu count reachable for each mentsu count (0..=4) inside one
/// suit, `-1` when that mentsu count cannot be formed.
type BlockTable = [i8; 5];

const UNREACHABLE: BlockTable = [-1; 5];

fn block_search(c: &mut [u8], i: usize, honors: bool, mentsu: i8, taatsu: i8, table: &mut BlockTable) {
    let mut i = i;
    while i < c.len() && c[i] == 0 {
        i += 1;
    }
    if i == c.len() {
        let m = mentsu.min(4) as usize;
        table[m] = table[m].max(taatsu.min(8));
        return;
    }

    if c[i] >= 3 {
        c[i] -= 3;
        block_search(c, i, honors, mentsu + 1, taatsu, table);
        c[i] += 3;
    }
    if !honors && i + 2 < c.len() && c[i + 1] > 0 && c[i + 2] > 0 {
        c[i] -= 1;
        c[i + 1] -= 1;
        c[i + 2] -= 1;
        block_search(c, i, honors, mentsu + 1, taatsu, table);
        c[i] += 1;
        c[i + 1] += 1;
        c[i + 2] += 1;
    }
    if c[i] >= 2 {
        c[i] -= 2;
        block_search(c, i, honors, mentsu, taatsu + 1, table);
        c[i] += 2;
    }
    if !honors && i + 1 < c.len() && c[i + 1] > 0 {
        c[i] -= 1;
        c[i + 1] -= 1;
        block_search(c, i, honors, mentsu, taatsu + 1, table);
        c[i] += 1;
        c[i + 1] += 1;
    }
    if !honors && i + 2 < c.len() && c[i + 2] > 0 {
        c[i] -= 1;
        c[i + 2] -= 1;
        block_search(c, i, honors, mentsu, taatsu + 1, table);
        c[i] += 1;
        c[i + 2] += 1;
    }
    // leave one copy isolated
    c[i] -= 1;
    block_search(c, i, honors, mentsu, taatsu, table);
    c[i] += 1;
}

/// Tables for one suit: without a head, and with the head taken from it.
fn suit_tables(tiles: &[u8], honors: bool) -> (BlockTable, BlockTable) {
    let mut c = tiles.to_vec();
    let mut plain = UNREACHABLE;
    block_search(&mut c, 0, honors, 0, 0, &mut plain);

    let mut headed = UNREACHABLE;
    for i in 0..c.len() {
        if c[i] >= 2 {
            c[i] -= 2;
            block_search(&mut c, 0, honors, 0, 0, &mut headed);
            c[i] += 2;
        }
    }
    (plain, headed)
}

/// Merges per-suit tables into `[head][mentsu] -> taatsu`.
fn merge(acc: [BlockTable; 2], plain: BlockTable, headed: BlockTable) -> [BlockTable; 2] {
    let mut out = [UNREACHABLE; 2];
    for head in 0..2 {
        for m in 0..5 {
            if acc[head][m] < 0 {
                continue;
            }
            for (add_head, table) in [(0usize, &plain), (1usize, &headed)] {
                if head + add_head > 1 {
                    continue;
                }
                for (m2, &t2) in table.iter().enumerate() {
                    if t2 < 0 {
                        continue;
                    }
                    let mm = (m + m2).min(4);
                    let tt = (acc[head][m] + t2).min(8);
                    let slot = &mut out[head + add_head][mm];
                    *slot = (*slot).max(tt);
                }
            }
        }
    }
    out
}

/// Normal-form shanten (`len_div3` sets + one pair) by per-suit block search.
///
/// `shanten = 2k - 2m - min(t, k - m) - p` over every decomposition into
/// `m` mentsu, `t` taatsu and `p` heads. `0` is tenpai, `-1` a complete hand.
pub fn calc_normal(tiles: &[u8; TILE_MAX], len_div3: u8) -> i8 {
    let k = len_div3 as i8;
    let mut acc = [UNREACHABLE; 2];
    acc[0][0] = 0;
    for (range, honors) in [(0..9, false), (9..18, false), (18..27, false), (27..34, true)] {
        let (plain, headed) = suit_tables(&tiles[range], honors);
        acc = merge(acc, plain, headed);
    }

    let mut best = 2 * k;
    for (head, table) in acc.iter().enumerate() {
        for (m, &t) in table.iter().enumerate() {
            if t < 0 {
                continue;
            }
            let m = (m as i8).min(k);
            let s = 2 * k - 2 * m - t.min(k - m) - head as i8;
            best = best.min(s);
        }
    }
    best
}

pub fn calc_chitoi(tiles: &[u8; TILE_MAX]) -> i8 {
    let mut pairs = 0u8;
    let mut kinds = 0u8;
    for &c in tiles.iter() {
        if c > 0 {
            kinds += 1;
            if c >= 2 {
                pairs += 1;
            }
        }
    }
    let redunct = 7u8.saturating_sub(kinds) as i8;
    7 - pairs as i8 + redunct - 1
}

pub fn calc_kokushi(tiles: &[u8; TILE_MAX]) -> i8 {
    let mut kinds = 0i8;
    let mut has_pair = false;
    for &idx in &YAOCHU_CLASSES {
        let c = tiles[idx as usize];
        if c > 0 {
            kinds += 1;
            if c >= 2 {
                has_pair = true;
            }
        }
    }
    14 - kinds - has_pair as i8 - 1
}

/// Shanten over all three forms. Chiitoitsu and kokushi only apply to a
/// full closed hand (13 or 14 tiles, no melds).
pub fn calc_shanten_from_counts(tehai: &[u8; TILE_MAX], tehai_len_div3: u8) -> i8 {
    let mut shanten = calc_normal(tehai, tehai_len_div3);
    if shanten <= 0 || tehai_len_div3 < 4 {
        return shanten;
    }
    shanten = shanten.min(calc_chitoi(tehai));
    if shanten > 0 {
        shanten.min(calc_kokushi(tehai))
    } else {
        shanten
    }
}

/// Shanten of a hand given as physical tile ids.
pub fn calculate_shanten(hand_tiles: &[u8]) -> i32 {
    let mut tile_counts = [0u8; TILE_MAX];
    for &tile in hand_tiles {
        let class = tile_class(tile) as usize;
        if class < TILE_MAX {
            tile_counts[class] += 1;
        }
    }
    let num_tiles: u8 = tile_counts.iter().sum();
    calc_shanten_from_counts(&tile_counts, num_tiles / 3) as i32
}
