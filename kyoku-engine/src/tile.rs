//! Human-readable tile names used on the wire.
//!
//! A physical tile `id` is written as its class name followed by the copy
//! number (1-based): `Man11` .. `Man14`, `Pin53`, `Chun4`. Class names are
//! `Man1`..`Sou9`, `Ton`, `Nan`, `Shaa`, `Pei`, `Haku`, `Hatsu`, `Chun`; the
//! red fives additionally answer to `RedMan5`, `RedPin5`, `RedSou5`.
//! An empty slot (padding inside a [`Call`](crate::call::Call)) is `Dummy`.

use crate::errors::{EngineResult, GameError};
use crate::types::{tile_class, NUM_TILES, TILE_MAX};

pub const DUMMY: &str = "Dummy";

const CLASS_NAMES: [&str; TILE_MAX] = [
    "Man1", "Man2", "Man3", "Man4", "Man5", "Man6", "Man7", "Man8", "Man9", //
    "Pin1", "Pin2", "Pin3", "Pin4", "Pin5", "Pin6", "Pin7", "Pin8", "Pin9", //
    "Sou1", "Sou2", "Sou3", "Sou4", "Sou5", "Sou6", "Sou7", "Sou8", "Sou9", //
    "Ton", "Nan", "Shaa", "Pei", "Haku", "Hatsu", "Chun",
];

pub fn class_name(class: u8) -> &'static str {
    CLASS_NAMES.get(class as usize).copied().unwrap_or(DUMMY)
}

/// Class name, or the red synonym for the three red fives.
pub fn class_name_of_tile(tile: u8) -> &'static str {
    match tile {
        16 => "RedMan5",
        52 => "RedPin5",
        88 => "RedSou5",
        t => class_name(tile_class(t)),
    }
}

pub fn tile_name(tile: u8) -> String {
    if tile as usize >= NUM_TILES {
        return DUMMY.to_string();
    }
    format!("{}{}", class_name(tile_class(tile)), tile % 4 + 1)
}

pub fn parse_tile(name: &str) -> EngineResult<u8> {
    let err = |message: &str| GameError::Parse {
        input: name.to_string(),
        message: message.to_string(),
    };
    if !name.is_ascii() || name.len() < 2 {
        return Err(err("malformed tile name"));
    }
    let (class_part, copy_part) = name.split_at(name.len() - 1);
    let copy: u8 = copy_part
        .parse()
        .map_err(|_| err("missing copy number"))?;
    if !(1..=4).contains(&copy) {
        return Err(err("copy number must be 1-4"));
    }
    let class = parse_class(class_part)?;
    Ok(class * 4 + copy - 1)
}

pub fn parse_class(name: &str) -> EngineResult<u8> {
    match name {
        "RedMan5" => return Ok(4),
        "RedPin5" => return Ok(13),
        "RedSou5" => return Ok(22),
        _ => {}
    }
    CLASS_NAMES
        .iter()
        .position(|&n| n == name)
        .map(|p| p as u8)
        .ok_or_else(|| GameError::Parse {
            input: name.to_string(),
            message: "unknown tile class".to_string(),
        })
}

pub fn tiles_to_string(tiles: &[u8]) -> String {
    tiles.iter().map(|&t| tile_name(t)).collect::<Vec<_>>().join(" ")
}

/// `#[serde(with = "crate::tile::name")]` for a single tile id.
pub mod name {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tile: &u8, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::tile_name(*tile))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_tile(&raw).map_err(D::Error::custom)
    }
}

/// `#[serde(with = "crate::tile::opt_name")]`: `None` is written as `Dummy`.
pub mod opt_name {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tile: &Option<u8>, s: S) -> Result<S::Ok, S::Error> {
        match tile {
            Some(t) => s.serialize_str(&super::tile_name(*t)),
            None => s.serialize_str(super::DUMMY),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u8>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw == super::DUMMY {
            return Ok(None);
        }
        super::parse_tile(&raw).map(Some).map_err(D::Error::custom)
    }
}

/// `#[serde(with = "crate::tile::names")]` for a list of tile ids.
pub mod names {
    use serde::{de::Error, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tiles: &[u8], s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(tiles.len()))?;
        for &t in tiles {
            seq.serialize_element(&super::tile_name(t))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let raw = Vec::<String>::deserialize(d)?;
        raw.iter()
            .map(|n| super::parse_tile(n).map_err(D::Error::custom))
            .collect()
    }
}

/// `#[serde(with = "crate::tile::class_names")]` for a list of tile classes.
pub mod class_names {
    use serde::{de::Error, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(classes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(classes.len()))?;
        for &c in classes {
            seq.serialize_element(super::class_name(c))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let raw = Vec::<String>::deserialize(d)?;
        raw.iter()
            .map(|n| super::parse_class(n).map_err(D::Error::custom))
            .collect()
    }
}
