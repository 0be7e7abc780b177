//! Hand and table mutations applied once a call has been chosen.

use crate::call::{Call, CallType};
use crate::errors::{EngineResult, GameError};
use crate::event::Event;
use crate::game::judge::{kuikae_classes, GameJudge, WinKind};
use crate::game::Game;
use crate::player::{remove_tile, sorted_insert};
use crate::result::{FuritenReason, RoundResult};
use crate::types::{tile_class, Wind};

impl Game {
    pub(super) fn process_get(&mut self, who: Wind, tile: u8) {
        let i = self.pidx(who);
        let p = &mut self.players[i];
        let locked = p.is_riichi;
        for &t in &p.hand_tiles {
            self.wall.set_discardable(t, !locked);
        }
        self.wall.set_discardable(tile, true);
        p.hand_tiles.push(tile);
        p.jun_num += 1;
        p.jun_furiten = false;
    }

    pub(super) fn process_discard(&mut self, who: Wind, tile: u8, tsumogiri: bool) -> EngineResult<()> {
        if !self.wall.is_discardable(tile) {
            return Err(GameError::invalid_call(format!("{who} may not discard tile {tile}")));
        }
        let i = self.pidx(who);
        let p = &mut self.players[i];
        if !remove_tile(&mut p.hand_tiles, tile) {
            return Err(GameError::invalid_state(format!("{who} does not hold tile {tile}")));
        }
        // the fresh draw still sits at the end
        if let Some(last) = p.hand_tiles.pop() {
            sorted_insert(&mut p.hand_tiles, last);
        }
        p.discard_tiles.push(tile);
        p.board_tiles.push(tile);
        p.tiles_tsumo_giri.push(tsumogiri);
        p.ippatsu_status = false;
        for &t in &p.hand_tiles {
            self.wall.set_discardable(t, true);
        }
        self.wall.set_discard_wind(tile, who);

        p.refresh_waits(self.scorer.as_ref());
        let was_furiten = p.discard_furiten;
        p.discard_furiten = p.discards_hit_waits();
        if p.discard_furiten && !was_furiten {
            self.emit_to(
                who,
                Event::Furiten {
                    who,
                    reason: FuritenReason::Discard,
                },
            );
        }

        let class = tile_class(tile);
        for other in who.others() {
            let q = self.pos_player_mut(other);
            q.furiten_status = q.tenpai_slice.contains(&class);
        }
        Ok(())
    }

    /// Riichi step 1: the declaration and its discard.
    pub(super) fn process_riichi(&mut self, who: Wind, tile: u8, tsumogiri: bool) -> EngineResult<()> {
        let p = self.pos_player_mut(who);
        if p.jun_num == 1 && p.ippatsu_status {
            p.is_daburu_riichi = true;
        }
        p.is_riichi = true;
        p.riichi_step = 1;
        self.emit_all(Event::Riichi { who, step: 1 });
        self.process_discard(who, tile, tsumogiri)?;
        self.pos_player_mut(who).ippatsu_status = true;
        Ok(())
    }

    /// Riichi step 2 once the declaring discard passes without a ron.
    /// Returns whether all four seats are now in riichi.
    pub(super) fn accept_riichi(&mut self, who: Wind) -> bool {
        let cost = self.rule.riichi_cost;
        let p = self.pos_player_mut(who);
        if p.riichi_step != 1 {
            return false;
        }
        p.riichi_step = 2;
        p.points -= cost;
        self.num_riichi += 1;
        self.emit_all(Event::Riichi { who, step: 2 });
        self.players.iter().all(|p| p.is_riichi)
    }

    /// Any call interrupts the turn order: no more ippatsu, first-turn
    /// aborts or tenhou/chiihou for anyone.
    pub(super) fn break_first_turn(&mut self) {
        for p in self.players.iter_mut() {
            p.ippatsu_status = false;
            p.ryuukyoku_status = false;
        }
    }

    /// Removes all of `tiles` from the hand, or none of them.
    fn take_from_hand(&mut self, who: Wind, tiles: &[u8]) -> EngineResult<()> {
        let p = self.pos_player_mut(who);
        let mut hand = p.hand_tiles.clone();
        for &t in tiles {
            if !remove_tile(&mut hand, t) {
                return Err(GameError::invalid_state(format!("{who} does not hold tile {t}")));
            }
        }
        p.hand_tiles = hand;
        Ok(())
    }

    /// Seat whose pond holds `claimed`.
    fn discarder(&self, who: Wind, call: &Call, claimed: u8) -> EngineResult<Wind> {
        let from = self
            .wall
            .discard_wind(claimed)
            .ok_or_else(|| GameError::invalid_call(format!("{call}: tile {claimed} was not discarded")))?;
        if from == who || call.claimed_from().is_some_and(|w| w != from) {
            return Err(GameError::invalid_call(format!("{call}: tile {claimed} came from {from}")));
        }
        Ok(from)
    }

    fn take_from_board(&mut self, from: Wind, tile: u8) {
        remove_tile(&mut self.pos_player_mut(from).board_tiles, tile);
    }

    pub(super) fn process_chi_pon(&mut self, who: Wind, call: &Call) -> EngineResult<()> {
        let (Some(a), Some(b), Some(claimed)) = (call.tile(0), call.tile(1), call.tile(2)) else {
            return Err(GameError::invalid_call(format!("malformed {call}")));
        };
        let from = self.discarder(who, call, claimed)?;
        self.take_from_hand(who, &[a, b])?;
        self.take_from_board(from, claimed);

        let kuikae = self.rule.kuikae_forbidden;
        let i = self.pidx(who);
        let p = &mut self.players[i];
        p.melds.push(*call);
        p.jun_num += 1;
        if kuikae {
            let forbidden = kuikae_classes(call);
            let any_left = p
                .hand_tiles
                .iter()
                .any(|&t| !forbidden.contains(&tile_class(t)));
            if any_left {
                for &t in &p.hand_tiles {
                    if forbidden.contains(&tile_class(t)) {
                        self.wall.set_discardable(t, false);
                    }
                }
            }
        }
        p.refresh_waits(self.scorer.as_ref());
        Ok(())
    }

    pub(super) fn process_daiminkan(&mut self, who: Wind, call: &Call) -> EngineResult<()> {
        let own: Vec<u8> = (0..3).filter_map(|i| call.tile(i)).collect();
        let claimed = call
            .tile(3)
            .ok_or_else(|| GameError::invalid_call(format!("malformed {call}")))?;
        if own.len() != 3 {
            return Err(GameError::invalid_call(format!("malformed {call}")));
        }
        let from = self.discarder(who, call, claimed)?;
        self.take_from_hand(who, &own)?;
        self.take_from_board(from, claimed);
        let scorer = self.scorer.clone();
        let p = self.pos_player_mut(who);
        p.melds.push(*call);
        p.refresh_waits(scorer.as_ref());
        Ok(())
    }

    pub(super) fn process_ankan(&mut self, who: Wind, call: &Call) -> EngineResult<()> {
        self.take_from_hand(who, &call.tile_ids())?;
        let scorer = self.scorer.clone();
        let p = self.pos_player_mut(who);
        p.hand_tiles.sort_unstable();
        p.melds.push(*call);
        p.refresh_waits(scorer.as_ref());
        Ok(())
    }

    pub(super) fn process_shouminkan(&mut self, who: Wind, call: &Call) -> EngineResult<()> {
        let added = call
            .tile(3)
            .ok_or_else(|| GameError::invalid_call(format!("malformed {call}")))?;
        self.take_from_hand(who, &[added])?;
        let scorer = self.scorer.clone();
        let p = self.pos_player_mut(who);
        let pon = p
            .melds
            .iter_mut()
            .find(|m| m.call_type == CallType::Pon && m.class() == call.class())
            .ok_or_else(|| GameError::invalid_state(format!("{who} has no pon to extend")))?;
        *pon = *call;
        p.hand_tiles.sort_unstable();
        p.refresh_waits(scorer.as_ref());
        Ok(())
    }

    fn finish_win(&mut self, who: Wind, kind: WinKind, tile: u8, call: Call, mut result: RoundResult) -> RoundResult {
        let ctx = self.win_context(who, tile, kind);
        let p = self.pos_player_mut(who);
        p.clear_win_flags();
        p.is_tsumo = ctx.is_tsumo;
        p.is_ippatsu = ctx.is_ippatsu;
        p.is_rinshan = ctx.is_rinshan;
        p.is_chankan = ctx.is_chankan;
        p.is_haitei = ctx.is_tsumo && ctx.is_last_tile;
        p.is_houtei = !ctx.is_tsumo && ctx.is_last_tile;
        p.is_tenhou = ctx.is_tenhou;
        p.is_chiihou = ctx.is_chiihou;
        result.ron_call = Some(call);
        result
    }

    pub(super) fn process_tsumo(&mut self, who: Wind) -> EngineResult<RoundResult> {
        let hand = self.pos_player(who).hand_tiles.clone();
        let (&tile, rest) = hand
            .split_last()
            .ok_or_else(|| GameError::invalid_state(format!("{who} has an empty hand")))?;
        let result = self
            .evaluate_win(who, rest, tile, WinKind::Tsumo)
            .ok_or_else(|| GameError::invalid_state(format!("{who} cannot tsumo on {tile}")))?;
        Ok(self.finish_win(who, WinKind::Tsumo, tile, Call::tsumo(tile, who), result))
    }

    /// Ron or chankan by `who` on `tile`.
    pub(super) fn process_ron(&mut self, who: Wind, call: &Call) -> EngineResult<RoundResult> {
        let tile = call
            .first_tile()
            .ok_or_else(|| GameError::invalid_call(format!("malformed {call}")))?;
        let kind = if call.call_type == CallType::ChanKan {
            WinKind::ChanKan
        } else {
            WinKind::Ron
        };
        let hand = self.pos_player(who).hand_tiles.clone();
        let result = self
            .evaluate_win(who, &hand, tile, kind)
            .ok_or_else(|| GameError::invalid_state(format!("{who} cannot ron on {tile}")))?;
        Ok(self.finish_win(who, kind, tile, *call, result))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::call::{Call, CallType};
    use crate::errors::GameError;
    use crate::game::Game;
    use crate::rule::GameRule;
    use crate::types::Wind;

    /// East discards its first option; returns the game and the discarded tile.
    fn after_first_discard() -> (Game, u8) {
        let mut game = Game::new(3, GameRule::default());
        let menu = game.reset(None).unwrap();
        let discard = *menu[&Wind::East]
            .iter()
            .find(|c| c.call_type == CallType::Discard)
            .unwrap();
        let tile = discard.first_tile().unwrap();
        game.step(&HashMap::from([(Wind::East, discard)])).unwrap();
        (game, tile)
    }

    #[test]
    fn unheld_meld_tile_leaves_hand_untouched() {
        let (mut game, tile) = after_first_discard();
        let held = game.pos_player(Wind::South).hand_tiles.clone();
        let board = game.pos_player(Wind::East).board_tiles.clone();
        let missing = game.pos_player(Wind::East).hand_tiles[0];

        let pon = Call::pon(held[0], missing, tile, Wind::South, Some(Wind::East));
        let err = game.process_chi_pon(Wind::South, &pon).unwrap_err();
        assert!(matches!(err, GameError::InvalidState { .. }));
        assert_eq!(game.pos_player(Wind::South).hand_tiles, held);
        assert_eq!(game.pos_player(Wind::East).board_tiles, board);
        assert!(game.pos_player(Wind::South).melds.is_empty());

        let kan = Call::daiminkan([held[0], held[1], missing], tile, Wind::South, Some(Wind::East));
        assert!(game.process_daiminkan(Wind::South, &kan).is_err());
        assert_eq!(game.pos_player(Wind::South).hand_tiles, held);
        assert_eq!(game.pos_player(Wind::East).board_tiles, board);
    }

    #[test]
    fn claimed_tile_must_come_from_a_pond() {
        let (mut game, tile) = after_first_discard();
        let held = game.pos_player(Wind::South).hand_tiles.clone();
        let undiscarded = game.pos_player(Wind::West).hand_tiles[0];

        let pon = Call::pon(held[0], held[1], undiscarded, Wind::South, Some(Wind::East));
        let err = game.process_chi_pon(Wind::South, &pon).unwrap_err();
        assert!(matches!(err, GameError::InvalidCall { .. }));

        let misattributed = Call::pon(held[0], held[1], tile, Wind::South, Some(Wind::North));
        assert!(game.process_chi_pon(Wind::South, &misattributed).is_err());

        // East cannot claim its own discard
        let east = game.pos_player(Wind::East).hand_tiles.clone();
        let own = Call::pon(east[0], east[1], tile, Wind::East, Some(Wind::East));
        assert!(game.process_chi_pon(Wind::East, &own).is_err());
        assert_eq!(game.pos_player(Wind::South).hand_tiles, held);
        assert_eq!(game.pos_player(Wind::East).hand_tiles, east);
    }
}
