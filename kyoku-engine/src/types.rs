use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of tile classes (suit + rank, reds folded in).
pub const TILE_MAX: usize = 34;
/// Number of physical tiles in the wall.
pub const NUM_TILES: usize = 136;
/// Number of seats at the table.
pub const NP: usize = 4;

/// Physical ids of the three red fives (5m, 5p, 5s copy 0).
pub const RED_FIVES: [u8; 3] = [16, 52, 88];

/// Terminal and honor classes.
pub const YAOCHU_CLASSES: [u8; 13] = [0, 8, 9, 17, 18, 26, 27, 28, 29, 30, 31, 32, 33];

#[inline]
pub fn tile_class(tile: u8) -> u8 {
    tile / 4
}

#[inline]
pub fn is_red_five(tile: u8) -> bool {
    RED_FIVES.contains(&tile)
}

#[inline]
pub fn is_honor(class: u8) -> bool {
    class >= 27
}

#[inline]
pub fn is_terminal(class: u8) -> bool {
    class < 27 && (class % 9 == 0 || class % 9 == 8)
}

#[inline]
pub fn is_yaochu(class: u8) -> bool {
    is_honor(class) || is_terminal(class)
}

/// Next class in the dora cycle (9 -> 1 within a suit, N -> E, Chun -> Haku).
pub fn next_dora_class(class: u8) -> u8 {
    match class {
        0..=8 => (class + 1) % 9,
        9..=17 => 9 + (class - 9 + 1) % 9,
        18..=26 => 18 + (class - 18 + 1) % 9,
        27..=30 => 27 + (class - 27 + 1) % 4,
        31..=33 => 31 + (class - 31 + 1) % 3,
        _ => class,
    }
}

/// Maps a dora indicator tile id to the tile id it designates as dora.
///
/// The copy index is preserved, so `indicator_to_dora(t) / 4` is the dora class.
pub fn indicator_to_dora(tile: u8) -> u8 {
    next_dora_class(tile_class(tile)) * 4 + tile % 4
}

/// A hand representation using a histogram of tile classes (0-33).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    pub counts: [u8; TILE_MAX],
}

impl Hand {
    /// Builds a histogram from physical tile ids.
    pub fn from_tiles(tiles: &[u8]) -> Self {
        let mut h = Hand::default();
        for &t in tiles {
            h.add(tile_class(t));
        }
        h
    }

    pub fn add(&mut self, class: u8) {
        if (class as usize) < TILE_MAX {
            self.counts[class as usize] += 1;
        }
    }

    pub fn remove(&mut self, class: u8) {
        if (class as usize) < TILE_MAX && self.counts[class as usize] > 0 {
            self.counts[class as usize] -= 1;
        }
    }

    pub fn len(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}

impl Default for Hand {
    fn default() -> Self {
        Hand {
            counts: [0; TILE_MAX],
        }
    }
}

/// Seat orientation; doubles as the turn-order index (mod 4).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Wind {
    #[default]
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl Wind {
    pub const ALL: [Wind; NP] = [Wind::East, Wind::South, Wind::West, Wind::North];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Wind {
        Wind::from(self as u8 + 1)
    }

    /// Seats after `self` in turn order, excluding `self`.
    pub fn others(self) -> [Wind; 3] {
        [
            Wind::from(self as u8 + 1),
            Wind::from(self as u8 + 2),
            Wind::from(self as u8 + 3),
        ]
    }

    /// How many seats `self` sits after `from` in turn order (0..4).
    pub fn distance_from(self, from: Wind) -> u8 {
        (self as u8 + 4 - from as u8) % 4
    }

    /// Honor class of this wind (East = 27).
    pub fn class(self) -> u8 {
        27 + self as u8
    }
}

impl From<u8> for Wind {
    fn from(val: u8) -> Self {
        match val % 4 {
            0 => Wind::East,
            1 => Wind::South,
            2 => Wind::West,
            _ => Wind::North,
        }
    }
}

impl fmt::Display for Wind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Wind::East => "East",
            Wind::South => "South",
            Wind::West => "West",
            Wind::North => "North",
        };
        f.write_str(s)
    }
}

/// Round counter: `East1` is index 0, `North4` index 15.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum WindRound {
    #[default]
    East1,
    East2,
    East3,
    East4,
    South1,
    South2,
    South3,
    South4,
    West1,
    West2,
    West3,
    West4,
    North1,
    North2,
    North3,
    North4,
}

impl WindRound {
    const ALL: [WindRound; 16] = [
        WindRound::East1,
        WindRound::East2,
        WindRound::East3,
        WindRound::East4,
        WindRound::South1,
        WindRound::South2,
        WindRound::South3,
        WindRound::South4,
        WindRound::West1,
        WindRound::West2,
        WindRound::West3,
        WindRound::West4,
        WindRound::North1,
        WindRound::North2,
        WindRound::North3,
        WindRound::North4,
    ];

    /// `None` past North4.
    pub fn from_index(index: u8) -> Option<WindRound> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Prevailing wind of the round.
    pub fn round_wind(self) -> Wind {
        Wind::from(self as u8 / 4)
    }

    /// Hand number inside the wind (0 for East1, South1, ...).
    pub fn hand_number(self) -> u8 {
        self as u8 % 4
    }
}

impl fmt::Display for WindRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.round_wind(), self.hand_number() + 1)
    }
}

/// How far a `Game::step` call advanced the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndType {
    None,
    Round,
    Game,
}
