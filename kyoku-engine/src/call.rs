use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tile;
use crate::types::{tile_class, Wind};

/// Call kinds, declared in priority order: comparing two values tells which
/// reaction wins (`Ron > kans > Pon > Chi > Discard > Skip`).
#[repr(i8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CallType {
    Get = -1,
    Skip = 0,
    Discard = 1,
    Chi = 2,
    Pon = 3,
    DaiMinKan = 4,
    ShouMinKan = 5,
    AnKan = 6,
    Riichi = 7,
    Ron = 8,
    Tsumo = 9,
    KyuuShuKyuuHai = 10,
    ChanKan = 11,
    Next = 12,
}

impl CallType {
    pub fn is_kan(self) -> bool {
        matches!(
            self,
            CallType::DaiMinKan | CallType::ShouMinKan | CallType::AnKan
        )
    }
}

/// One legal (or chosen) action: a type, up to four tiles and the seat each
/// tile came from. Unused slots are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Call {
    pub call_type: CallType,
    pub tiles: [Option<u8>; 4],
    pub from_who: [Option<Wind>; 4],
}

pub type Calls = Vec<Call>;

impl Call {
    pub fn new(call_type: CallType, tiles: [Option<u8>; 4], from_who: [Option<Wind>; 4]) -> Self {
        Self {
            call_type,
            tiles,
            from_who,
        }
    }

    fn single(call_type: CallType, tile: u8, who: Option<Wind>) -> Self {
        Self::new(call_type, [Some(tile), None, None, None], [who, None, None, None])
    }

    pub fn skip() -> Self {
        Self::new(CallType::Skip, [None; 4], [None; 4])
    }

    pub fn next() -> Self {
        Self::new(CallType::Next, [None; 4], [None; 4])
    }

    pub fn kyuushu() -> Self {
        Self::new(CallType::KyuuShuKyuuHai, [None; 4], [None; 4])
    }

    pub fn discard(tile: u8, who: Wind) -> Self {
        Self::single(CallType::Discard, tile, Some(who))
    }

    pub fn riichi(tile: u8, who: Wind) -> Self {
        Self::single(CallType::Riichi, tile, Some(who))
    }

    pub fn tsumo(tile: u8, who: Wind) -> Self {
        Self::single(CallType::Tsumo, tile, Some(who))
    }

    pub fn ron(tile: u8, from: Option<Wind>) -> Self {
        Self::single(CallType::Ron, tile, from)
    }

    pub fn chankan(tile: u8, from: Wind) -> Self {
        Self::single(CallType::ChanKan, tile, Some(from))
    }

    /// `[own, own, claimed]`
    pub fn chi(a: u8, b: u8, claimed: u8, who: Wind, from: Option<Wind>) -> Self {
        Self::new(
            CallType::Chi,
            [Some(a), Some(b), Some(claimed), None],
            [Some(who), Some(who), from, None],
        )
    }

    /// `[own, own, claimed]`
    pub fn pon(a: u8, b: u8, claimed: u8, who: Wind, from: Option<Wind>) -> Self {
        Self::new(
            CallType::Pon,
            [Some(a), Some(b), Some(claimed), None],
            [Some(who), Some(who), from, None],
        )
    }

    /// `[own, own, own, claimed]`
    pub fn daiminkan(own: [u8; 3], claimed: u8, who: Wind, from: Option<Wind>) -> Self {
        Self::new(
            CallType::DaiMinKan,
            [Some(own[0]), Some(own[1]), Some(own[2]), Some(claimed)],
            [Some(who), Some(who), Some(who), from],
        )
    }

    pub fn ankan(tiles: [u8; 4], who: Wind) -> Self {
        Self::new(CallType::AnKan, tiles.map(Some), [Some(who); 4])
    }

    /// Upgrades a pon: keeps its three tiles/origins and adds `added` in slot 3.
    pub fn shouminkan(pon: &Call, added: u8, who: Wind) -> Self {
        let mut tiles = pon.tiles;
        let mut from_who = pon.from_who;
        tiles[3] = Some(added);
        from_who[3] = Some(who);
        Self::new(CallType::ShouMinKan, tiles, from_who)
    }

    pub fn tile(&self, i: usize) -> Option<u8> {
        self.tiles.get(i).copied().flatten()
    }

    /// The first tile; every call that carries tiles has one here.
    pub fn first_tile(&self) -> Option<u8> {
        self.tiles[0]
    }

    pub fn tile_ids(&self) -> Vec<u8> {
        self.tiles.iter().flatten().copied().collect()
    }

    /// Class of the meld (first tile); `None` for tile-less calls.
    pub fn class(&self) -> Option<u8> {
        self.tiles[0].map(tile_class)
    }

    /// Seat the claimed tile of a meld came from.
    pub fn claimed_from(&self) -> Option<Wind> {
        match self.call_type {
            CallType::Chi | CallType::Pon | CallType::ShouMinKan => self.from_who[2],
            CallType::DaiMinKan => self.from_who[3],
            _ => None,
        }
    }

    /// Melds that expose the hand (everything but an ankan).
    pub fn is_open(&self) -> bool {
        matches!(
            self.call_type,
            CallType::Chi | CallType::Pon | CallType::DaiMinKan | CallType::ShouMinKan
        )
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(", self.call_type)?;
        let names: Vec<String> = self.tile_ids().into_iter().map(tile::tile_name).collect();
        write!(f, "{})", names.join(" "))
    }
}

impl Serialize for Call {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let tiles: Vec<String> = self
            .tiles
            .iter()
            .map(|t| t.map_or_else(|| tile::DUMMY.to_string(), tile::tile_name))
            .collect();
        let from_who: Vec<String> = self
            .from_who
            .iter()
            .map(|w| w.map_or_else(|| tile::DUMMY.to_string(), |w| w.to_string()))
            .collect();
        let mut s = serializer.serialize_struct("Call", 3)?;
        s.serialize_field("call_type", &self.call_type)?;
        s.serialize_field("call_tiles", &tiles)?;
        s.serialize_field("call_tiles_from_who", &from_who)?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for Call {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        #[derive(Deserialize)]
        struct CallHelper {
            call_type: CallType,
            call_tiles: Vec<String>,
            call_tiles_from_who: Vec<String>,
        }
        let h = CallHelper::deserialize(deserializer)?;
        let mut tiles = [None; 4];
        for (slot, name) in tiles.iter_mut().zip(&h.call_tiles) {
            if name != tile::DUMMY {
                *slot = Some(tile::parse_tile(name).map_err(D::Error::custom)?);
            }
        }
        let mut from_who = [None; 4];
        for (slot, name) in from_who.iter_mut().zip(&h.call_tiles_from_who) {
            *slot = match name.as_str() {
                "East" => Some(Wind::East),
                "South" => Some(Wind::South),
                "West" => Some(Wind::West),
                "North" => Some(Wind::North),
                "Dummy" => None,
                other => return Err(D::Error::custom(format!("unknown wind '{other}'"))),
            };
        }
        Ok(Call::new(h.call_type, tiles, from_who))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(CallType::Ron > CallType::DaiMinKan);
        assert!(CallType::DaiMinKan > CallType::Pon);
        assert!(CallType::Pon > CallType::Chi);
        assert!(CallType::Chi > CallType::Discard);
        assert!(CallType::Discard > CallType::Skip);
        assert!(CallType::Skip > CallType::Get);
    }

    #[test]
    fn test_shouminkan_from_pon() {
        let pon = Call::pon(36, 37, 38, Wind::South, Some(Wind::East));
        let kan = Call::shouminkan(&pon, 39, Wind::South);
        assert_eq!(kan.call_type, CallType::ShouMinKan);
        assert_eq!(kan.tile_ids(), vec![36, 37, 38, 39]);
        assert_eq!(kan.from_who[2], Some(Wind::East));
        assert_eq!(kan.from_who[3], Some(Wind::South));
        assert_eq!(kan.claimed_from(), Some(Wind::East));
        assert_eq!(Call::ankan([0, 1, 2, 3], Wind::East).claimed_from(), None);
    }

    #[test]
    fn test_call_json_names() {
        let call = Call::chi(16, 24, 20, Wind::South, Some(Wind::East));
        let json = serde_json::to_string(&call).unwrap();
        assert!(json.contains("\"Man51\""));
        assert!(json.contains("\"Dummy\""));
        let back: Call = serde_json::from_str(&json).unwrap();
        assert_eq!(back, call);
    }
}
