//! Round events as seen from each seat, and the merged global log.
//!
//! Events are serialized as `{"type": "<Variant>", "event": {...}}` with
//! tiles written by name (see [`crate::tile`]).

use std::mem;

use serde::{Deserialize, Serialize};

use crate::call::Call;
use crate::errors::EngineResult;
use crate::result::{FuritenReason, RoundResult, RyuuKyokuReason};
use crate::rule::GameRule;
use crate::tile;
use crate::types::{Wind, WindRound, NP};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "event")]
pub enum Event {
    /// Per-seat round start; `init_tiles` are the receiving seat's 13 tiles.
    Start {
        wind_round: WindRound,
        init_wind: Wind,
        seed: u64,
        num_game: u32,
        num_honba: u32,
        num_riichi: u32,
        #[serde(with = "tile::name")]
        init_dora_indicator: u8,
        #[serde(with = "tile::names")]
        init_tiles: Vec<u8>,
        /// Indexed by wind.
        players_points: [i32; NP],
        rule: GameRule,
    },
    /// A draw; the tile is hidden (`Dummy`) in other seats' logs.
    Get {
        who: Wind,
        #[serde(with = "tile::opt_name")]
        tile: Option<u8>,
    },
    Discard {
        who: Wind,
        #[serde(with = "tile::name")]
        tile: u8,
    },
    TsumoGiri {
        who: Wind,
        #[serde(with = "tile::name")]
        tile: u8,
    },
    Chi {
        who: Wind,
        call: Call,
    },
    Pon {
        who: Wind,
        call: Call,
    },
    DaiMinKan {
        who: Wind,
        call: Call,
    },
    ShouMinKan {
        who: Wind,
        call: Call,
    },
    AnKan {
        who: Wind,
        call: Call,
    },
    /// Step 1 is the declaration, step 2 the accepted stick.
    Riichi {
        who: Wind,
        step: u8,
    },
    Ron {
        who: Wind,
        from_who: Wind,
        #[serde(with = "tile::names")]
        hand_tiles: Vec<u8>,
        #[serde(with = "tile::name")]
        win_tile: u8,
        result: RoundResult,
    },
    Tsumo {
        who: Wind,
        #[serde(with = "tile::names")]
        hand_tiles: Vec<u8>,
        #[serde(with = "tile::name")]
        win_tile: u8,
        result: RoundResult,
    },
    ChanKan {
        who: Wind,
        from_who: Wind,
        #[serde(with = "tile::names")]
        hand_tiles: Vec<u8>,
        #[serde(with = "tile::name")]
        win_tile: u8,
        result: RoundResult,
    },
    NewIndicator {
        #[serde(with = "tile::name")]
        tile: u8,
    },
    /// `who` is set only for a kyuushu kyuuhai declaration.
    RyuuKyoku {
        who: Option<Wind>,
        #[serde(with = "tile::names")]
        hand_tiles: Vec<u8>,
        reason: RyuuKyokuReason,
    },
    /// Indexed by wind.
    End {
        points_change: [i32; NP],
    },
    /// Private to the seat that became furiten.
    Furiten {
        who: Wind,
        reason: FuritenReason,
    },
    NagashiMangan {
        who: Wind,
    },
    TenpaiEnd {
        who: Wind,
        #[serde(with = "tile::names")]
        hand_tiles: Vec<u8>,
        #[serde(with = "tile::class_names")]
        tenpai_slice: Vec<u8>,
    },
    /// Everything needed to replay a round: the full wall permutation and the
    /// counters and points at its start (`init_points` by player index).
    GlobalInit {
        #[serde(with = "tile::names")]
        all_tiles: Vec<u8>,
        wind_round: WindRound,
        seed: u64,
        num_game: u32,
        num_honba: u32,
        num_riichi: u32,
        rule: GameRule,
        init_points: [i32; NP],
    },
}

impl Event {
    /// Acting seat, when the event has one.
    pub fn who(&self) -> Option<Wind> {
        match self {
            Event::Get { who, .. }
            | Event::Discard { who, .. }
            | Event::TsumoGiri { who, .. }
            | Event::Chi { who, .. }
            | Event::Pon { who, .. }
            | Event::DaiMinKan { who, .. }
            | Event::ShouMinKan { who, .. }
            | Event::AnKan { who, .. }
            | Event::Riichi { who, .. }
            | Event::Ron { who, .. }
            | Event::Tsumo { who, .. }
            | Event::ChanKan { who, .. }
            | Event::Furiten { who, .. }
            | Event::NagashiMangan { who }
            | Event::TenpaiEnd { who, .. } => Some(*who),
            Event::RyuuKyoku { who, .. } => *who,
            Event::Start { init_wind, .. } => Some(*init_wind),
            Event::NewIndicator { .. } | Event::End { .. } | Event::GlobalInit { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::Start { .. } => "Start",
            Event::Get { .. } => "Get",
            Event::Discard { .. } => "Discard",
            Event::TsumoGiri { .. } => "TsumoGiri",
            Event::Chi { .. } => "Chi",
            Event::Pon { .. } => "Pon",
            Event::DaiMinKan { .. } => "DaiMinKan",
            Event::ShouMinKan { .. } => "ShouMinKan",
            Event::AnKan { .. } => "AnKan",
            Event::Riichi { .. } => "Riichi",
            Event::Ron { .. } => "Ron",
            Event::Tsumo { .. } => "Tsumo",
            Event::ChanKan { .. } => "ChanKan",
            Event::NewIndicator { .. } => "NewIndicator",
            Event::RyuuKyoku { .. } => "RyuuKyoku",
            Event::End { .. } => "End",
            Event::Furiten { .. } => "Furiten",
            Event::NagashiMangan { .. } => "NagashiMangan",
            Event::TenpaiEnd { .. } => "TenpaiEnd",
            Event::GlobalInit { .. } => "GlobalInit",
        }
    }

    pub fn same_kind(&self, other: &Event) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    fn is_private(&self) -> bool {
        matches!(self, Event::Furiten { .. })
    }
}

/// Merges the four per-seat logs into one.
///
/// `Start` events are dropped (the caller prefixes a `GlobalInit`). Private
/// events are emitted on their own, in wind order; every other event is
/// broadcast and appears once, taking the copy of a `Get` that shows the tile.
pub fn merge_pos_events(logs: &[Vec<Event>; NP]) -> Vec<Event> {
    let mut idx = [0usize; NP];
    let mut out = Vec::new();

    loop {
        for (seat, log) in logs.iter().enumerate() {
            while matches!(log.get(idx[seat]), Some(Event::Start { .. })) {
                idx[seat] += 1;
            }
        }

        let current: Vec<(usize, &Event)> = (0..NP)
            .filter_map(|seat| logs[seat].get(idx[seat]).map(|e| (seat, e)))
            .collect();
        let Some(&(_, first)) = current.first() else {
            break;
        };

        if current.iter().any(|(_, e)| e.is_private()) {
            for &(seat, e) in current.iter().filter(|(_, e)| e.is_private()) {
                out.push(e.clone());
                idx[seat] += 1;
            }
            continue;
        }

        let shared = match first {
            Event::Get { .. } => current
                .iter()
                .map(|&(_, e)| e)
                .find(|e| matches!(e, Event::Get { tile: Some(_), .. }))
                .unwrap_or(first),
            _ => first,
        };
        out.push(shared.clone());
        for &(seat, e) in &current {
            if e.same_kind(shared) {
                idx[seat] += 1;
            }
        }
    }
    out
}

pub fn events_to_json(events: &[Event]) -> EngineResult<String> {
    Ok(serde_json::to_string(events)?)
}

pub fn events_from_json(s: &str) -> EngineResult<Vec<Event>> {
    Ok(serde_json::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(who: Wind, tile: Option<u8>) -> Event {
        Event::Get { who, tile }
    }

    fn start(who: Wind) -> Event {
        Event::Start {
            wind_round: WindRound::East1,
            init_wind: who,
            seed: 0,
            num_game: 0,
            num_honba: 0,
            num_riichi: 0,
            init_dora_indicator: 0,
            init_tiles: vec![],
            players_points: [25000; NP],
            rule: GameRule::default(),
        }
    }

    #[test]
    fn test_event_json_shape() {
        let e = Event::Discard {
            who: Wind::South,
            tile: 16,
        };
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#"{"type":"Discard","event":{"who":"South","tile":"Man51"}}"#);

        let hidden = get(Wind::East, None);
        let json = serde_json::to_string(&hidden).unwrap();
        assert!(json.contains("Dummy"));
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hidden);
    }

    #[test]
    fn test_merge_reveals_draw_and_skips_start() {
        let logs: [Vec<Event>; NP] = std::array::from_fn(|seat| {
            let w = Wind::from(seat as u8);
            let tile = (w == Wind::East).then_some(7);
            vec![start(w), get(Wind::East, tile)]
        });
        let merged = merge_pos_events(&logs);
        assert_eq!(merged, vec![get(Wind::East, Some(7))]);
    }

    #[test]
    fn test_merge_private_furiten() {
        let discard = Event::Discard { who: Wind::East, tile: 3 };
        let fur = |who| Event::Furiten {
            who,
            reason: FuritenReason::Jun,
        };
        let logs: [Vec<Event>; NP] = [
            vec![discard.clone(), get(Wind::South, None)],
            vec![discard.clone(), fur(Wind::South), get(Wind::South, Some(9))],
            vec![discard.clone(), fur(Wind::West), get(Wind::South, None)],
            vec![discard.clone(), get(Wind::South, None)],
        ];
        let merged = merge_pos_events(&logs);
        assert_eq!(
            merged,
            vec![
                discard,
                fur(Wind::South),
                fur(Wind::West),
                get(Wind::South, Some(9)),
            ]
        );
    }

    #[test]
    fn test_json_helpers() {
        let events = vec![Event::NewIndicator { tile: 135 }, Event::End { points_change: [0; NP] }];
        let json = events_to_json(&events).unwrap();
        assert_eq!(events_from_json(&json).unwrap(), events);
        assert!(events_from_json("[{\"type\":\"Nope\"}]").is_err());
    }

    #[test]
    fn test_acting_seat() {
        assert_eq!(get(Wind::West, None).who(), Some(Wind::West));
        assert_eq!(start(Wind::North).who(), Some(Wind::North));
        assert_eq!(Event::NewIndicator { tile: 130 }.who(), None);
        let abort = Event::RyuuKyoku {
            who: None,
            hand_tiles: vec![],
            reason: RyuuKyokuReason::SuuKaiKan,
        };
        assert_eq!(abort.who(), None);
    }
}
