#[cfg(test)]
mod unit_tests {
    use std::collections::HashMap;

    use crate::call::{Call, CallType};
    use crate::errors::GameError;
    use crate::event::{events_from_json, events_to_json, Event};
    use crate::game::{CallMenu, Game, Rotation};
    use crate::result::{FuritenReason, RyuuKyokuReason, Yakuman};
    use crate::rule::GameRule;
    use crate::types::{tile_class, EndType, Wind, NUM_TILES};

    /// A wall with the given ids at the given positions; every other
    /// position takes the lowest unused id.
    fn build_wall(fixed: &[(usize, u8)]) -> [u8; NUM_TILES] {
        let mut wall: [Option<u8>; NUM_TILES] = [None; NUM_TILES];
        let mut used = [false; NUM_TILES];
        for &(pos, id) in fixed {
            wall[pos] = Some(id);
            used[id as usize] = true;
        }
        let mut spare = (0..NUM_TILES as u8).filter(|&t| !used[t as usize]);
        std::array::from_fn(|pos| wall[pos].unwrap_or_else(|| spare.next().unwrap()))
    }

    /// Positions for a seat's 13 starting tiles.
    fn hand_at(seat: Wind, ids: &[u8]) -> Vec<(usize, u8)> {
        assert_eq!(ids.len(), 13);
        ids.iter()
            .enumerate()
            .map(|(i, &id)| (seat.index() * 13 + i, id))
            .collect()
    }

    fn one(who: Wind, call: Call) -> HashMap<Wind, Call> {
        HashMap::from([(who, call)])
    }

    fn first_of(menu: &CallMenu, who: Wind, call_type: CallType) -> Call {
        *menu[&who]
            .iter()
            .find(|c| c.call_type == call_type)
            .unwrap_or_else(|| panic!("{who} was not offered {call_type:?}"))
    }

    fn total_points(game: &Game) -> i32 {
        game.scores().iter().sum::<i32>() + game.num_riichi() as i32 * game.rule().riichi_cost
    }

    /// Plays with the first option everywhere (skip on reactions) until the
    /// round ends.
    fn play_out_round(game: &mut Game, mut menu: CallMenu) -> CallMenu {
        for _ in 0..1000 {
            if menu.values().flatten().all(|c| c.call_type == CallType::Next) {
                return menu;
            }
            let calls: HashMap<Wind, Call> = menu.iter().map(|(&w, c)| (w, c[0])).collect();
            let (next, end) = game.step(&calls).unwrap();
            menu = next;
            if end != EndType::None {
                return menu;
            }
        }
        panic!("round did not finish");
    }

    /// Acknowledges a finished round and returns the next dealer's menu.
    fn next_round(game: &mut Game) -> CallMenu {
        let calls: HashMap<Wind, Call> = Wind::ALL.iter().map(|&w| (w, Call::next())).collect();
        let (menu, end) = game.step(&calls).unwrap();
        assert_eq!(end, EndType::None);
        menu
    }

    fn end_deltas(game: &Game) -> [i32; 4] {
        game.get_global_events()
            .into_iter()
            .find_map(|e| match e {
                Event::End { points_change } => Some(points_change),
                _ => None,
            })
            .expect("round has not ended")
    }

    #[test]
    fn test_first_menu_is_dealer_only() {
        let mut game = Game::new(14, GameRule::default());
        let menu = game.reset(None).unwrap();
        assert_eq!(menu.keys().copied().collect::<Vec<_>>(), vec![Wind::East]);
        let discards = menu[&Wind::East]
            .iter()
            .filter(|c| c.call_type == CallType::Discard)
            .count();
        assert_eq!(discards, 14);
        assert_eq!(game.state_name(), "Deal");
        assert_eq!(game.num_remain_tiles(), 69);

        let mut again = Game::new(14, GameRule::default());
        assert_eq!(again.reset(None).unwrap(), menu);
    }

    #[test]
    fn test_invalid_submissions() {
        let mut game = Game::new(3, GameRule::default());
        game.reset(None).unwrap();
        let err = game.step(&one(Wind::South, Call::skip())).unwrap_err();
        assert!(matches!(err, GameError::InvalidCall { .. }));

        let held: Vec<u8> = game.pos_player(Wind::East).hand_tiles.clone();
        let foreign = (0..NUM_TILES as u8).find(|t| !held.contains(t)).unwrap();
        let err = game
            .step(&one(Wind::East, Call::discard(foreign, Wind::East)))
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidCall { .. }));
        // the menu survives a rejected submission
        assert!(!game.current_menu().is_empty());
    }

    #[test]
    fn test_ankan_draws_replacement_and_flips_indicator() {
        let mut fixed = hand_at(
            Wind::East,
            &[0, 1, 2, 3, 40, 48, 56, 76, 84, 92, 108, 116, 124],
        );
        fixed.push((52, 132));
        let mut game = Game::new(1, GameRule::default());
        let menu = game.reset(Some(build_wall(&fixed))).unwrap();

        let ankan = first_of(&menu, Wind::East, CallType::AnKan);
        assert_eq!(ankan.tile_ids(), vec![0, 1, 2, 3]);
        let (menu, end) = game.step(&one(Wind::East, ankan)).unwrap();
        assert_eq!(end, EndType::None);
        assert_eq!(menu.keys().copied().collect::<Vec<_>>(), vec![Wind::East]);
        assert_eq!(game.wall().kan_num(), 1);
        assert_eq!(game.wall().dora_indicators().len(), 2);
        assert_eq!(game.num_remain_tiles(), 68);

        let names: Vec<&str> = game
            .get_pos_events(Wind::South, 0)
            .iter()
            .map(Event::name)
            .collect();
        assert_eq!(names, vec!["Start", "Get", "AnKan", "NewIndicator", "Get"]);
        let is_ankan = |e: &&Event| matches!(e, Event::AnKan { .. });
        for w in Wind::ALL {
            assert_eq!(game.get_pos_events(w, 0).iter().filter(is_ankan).count(), 1, "{w}");
        }
        assert_eq!(game.get_global_events().iter().filter(is_ankan).count(), 1);
        let east = game.pos_player(Wind::East);
        assert_eq!(east.melds.len(), 1);
        assert_eq!(east.hand_tiles.len(), 11);
        // the replacement tile came off the back of the dead wall
        assert!(game.wall().is_rinshan(*east.hand_tiles.last().unwrap()));
    }

    /// East holds the fourth 9m; South, West and North all wait on it.
    fn triple_ron_wall() -> [u8; NUM_TILES] {
        let mut fixed = hand_at(
            Wind::East,
            &[0, 4, 8, 12, 20, 24, 28, 108, 112, 116, 120, 124, 32],
        );
        fixed.extend(hand_at(
            Wind::South,
            &[36, 37, 40, 41, 44, 45, 48, 49, 56, 57, 60, 61, 33],
        ));
        fixed.extend(hand_at(
            Wind::West,
            &[38, 39, 42, 43, 46, 47, 50, 51, 58, 59, 62, 63, 34],
        ));
        fixed.extend(hand_at(
            Wind::North,
            &[72, 73, 76, 77, 80, 81, 92, 93, 96, 97, 100, 101, 35],
        ));
        fixed.push((52, 128));
        build_wall(&fixed)
    }

    #[test]
    fn test_triple_ron_aborts() {
        let mut game = Game::new(7, GameRule::default_tenhou());
        game.reset(Some(triple_ron_wall())).unwrap();
        let (menu, _) = game.step(&one(Wind::East, Call::discard(32, Wind::East))).unwrap();
        assert_eq!(menu.len(), 3);

        let rons: HashMap<Wind, Call> = menu
            .keys()
            .map(|&w| (w, first_of(&menu, w, CallType::Ron)))
            .collect();
        let (menu, end) = game.step(&rons).unwrap();
        assert_eq!(end, EndType::Round);
        assert!(menu.values().all(|c| c == &vec![Call::next()]));
        assert_eq!(game.scores(), [25000; 4]);
        assert_eq!(end_deltas(&game), [0; 4]);
        assert_eq!(game.num_honba(), 0);

        let global = game.get_global_events();
        assert!(global.iter().any(|e| matches!(
            e,
            Event::RyuuKyoku {
                reason: RyuuKyokuReason::SanChaHou,
                ..
            }
        )));

        // the dealer keeps the seat with one more honba
        next_round(&mut game);
        assert_eq!(game.num_honba(), 1);
        assert_eq!(game.wind_round(), 0);
    }

    #[test]
    fn test_triple_ron_pays_when_allowed() {
        let mut game = Game::new(7, GameRule::default_mjsoul());
        game.reset(Some(triple_ron_wall())).unwrap();
        let (menu, _) = game.step(&one(Wind::East, Call::discard(32, Wind::East))).unwrap();
        let rons: HashMap<Wind, Call> = menu
            .keys()
            .map(|&w| (w, first_of(&menu, w, CallType::Ron)))
            .collect();
        let (_, end) = game.step(&rons).unwrap();
        assert_eq!(end, EndType::Round);

        assert_eq!(end_deltas(&game), [-8400, 1600, 1600, 5200]);
        assert_eq!(game.pos_player(Wind::East).points, 25000 - 8400);
        assert_eq!(game.pos_player(Wind::North).points, 25000 + 5200);
        assert_eq!(total_points(&game), 100_000);
        assert_eq!(game.wind_round(), 0);

        // dealer lost, so the seat passes once the next round is dealt
        next_round(&mut game);
        assert_eq!(game.wind_round(), 1);
        assert_eq!(game.num_honba(), 0);
        assert_eq!(game.pos_player(Wind::North).points, 25000 - 8400);
    }

    #[test]
    fn test_seat_views_hold_until_next_deal() {
        let mut game = Game::new(7, GameRule::default_mjsoul());
        game.reset(Some(triple_ron_wall())).unwrap();
        let dealt: Vec<Vec<u8>> = Wind::ALL
            .iter()
            .map(|&w| game.pos_player(w).hand_tiles.clone())
            .collect();
        let (menu, _) = game.step(&one(Wind::East, Call::discard(32, Wind::East))).unwrap();
        let rons: HashMap<Wind, Call> = menu
            .keys()
            .map(|&w| (w, first_of(&menu, w, CallType::Ron)))
            .collect();
        let (menu, _) = game.step(&rons).unwrap();
        assert!(menu.values().all(|c| c == &vec![Call::next()]));

        for w in Wind::ALL {
            let view = game.get_pos_board_state(w, vec![]);
            assert_eq!(view.player_wind, w);
            assert_eq!(view.wind_round.index(), 0);
            let mut expected = dealt[w.index()].clone();
            expected.retain(|&t| t != 32);
            assert_eq!(view.hand_tiles, expected, "{w} sees another seat's hand");
        }
        for e in game.get_global_events() {
            if let Event::Ron { who, hand_tiles, .. } = e {
                assert_eq!(game.get_pos_board_state(who, vec![]).hand_tiles, hand_tiles);
            }
        }
        let table = game.get_pos_board_state(Wind::South, vec![]);
        assert_eq!(table.player_states[&Wind::East].points, 25000 - 8400);
        assert_eq!(table.player_states[&Wind::East].discards, vec![32]);
    }

    #[test]
    fn test_passing_a_win_is_furiten_until_own_draw() {
        let mut game = Game::new(7, GameRule::default());
        game.reset(Some(triple_ron_wall())).unwrap();
        game.step(&one(Wind::East, Call::discard(32, Wind::East))).unwrap();

        // everyone skips
        let (menu, _) = game.step(&HashMap::new()).unwrap();
        assert_eq!(menu.len(), 3);
        let skips: HashMap<Wind, Call> = menu.keys().map(|&w| (w, Call::skip())).collect();
        let (menu, _) = game.step(&skips).unwrap();
        assert_eq!(menu.keys().copied().collect::<Vec<_>>(), vec![Wind::South]);

        // South drew and is clear again; West and North stay furiten
        assert!(!game.pos_player(Wind::South).jun_furiten);
        assert!(game.pos_player(Wind::West).jun_furiten);
        assert!(game.pos_player(Wind::North).jun_furiten);
        let furiten = |seat: Wind| {
            game.get_pos_events(seat, 0).iter().any(|e| {
                matches!(e, Event::Furiten { who, reason: FuritenReason::Jun } if *who == seat)
            })
        };
        assert!(furiten(Wind::West));
        assert!(!game
            .get_pos_events(Wind::East, 0)
            .iter()
            .any(|e| matches!(e, Event::Furiten { .. })));

        // a furiten seat is not offered ron on the same wait
        assert!(game.pos_player(Wind::West).is_furiten());
    }

    #[test]
    fn test_chi_locks_kuikae_tiles() {
        let mut fixed = hand_at(
            Wind::East,
            &[4, 108, 109, 110, 112, 113, 114, 116, 117, 118, 120, 121, 122],
        );
        fixed.extend(hand_at(
            Wind::South,
            &[9, 13, 5, 17, 21, 40, 44, 48, 76, 80, 84, 100, 101],
        ));
        fixed.push((52, 124));
        let mut game = Game::new(5, GameRule::default());
        game.reset(Some(build_wall(&fixed))).unwrap();

        let (menu, _) = game.step(&one(Wind::East, Call::discard(4, Wind::East))).unwrap();
        let chi = first_of(&menu, Wind::South, CallType::Chi);
        assert_eq!(chi.tile_ids(), vec![9, 13, 4]);

        let (menu, _) = game.step(&one(Wind::South, chi)).unwrap();
        assert_eq!(game.position(), Wind::South);
        assert_eq!(game.state_name(), "ChiPon");
        let offered: Vec<u8> = menu[&Wind::South]
            .iter()
            .filter_map(Call::first_tile)
            .collect();
        assert_eq!(offered.len(), 9);
        assert!(offered.iter().all(|&t| tile_class(t) != 1 && tile_class(t) != 4));

        game.step(&one(Wind::South, Call::discard(21, Wind::South))).unwrap();
        assert!(game.wall().is_discardable(17));
        let south = game.pos_player(Wind::South);
        assert_eq!(south.melds, vec![chi]);
        assert_eq!(south.tiles_tsumo_giri, vec![false]);
        // the claimed tile left East's pond but stays in the discard record
        let east = game.pos_player(Wind::East);
        assert_eq!(east.discard_tiles, vec![4]);
        assert!(east.board_tiles.is_empty());
    }

    #[test]
    fn test_dealer_first_draw_is_tenhou() {
        let mut fixed = hand_at(
            Wind::East,
            &[0, 4, 8, 12, 17, 20, 24, 28, 32, 36, 40, 44, 72],
        );
        fixed.push((52, 73));
        let mut game = Game::new(9, GameRule::default());
        let menu = game.reset(Some(build_wall(&fixed))).unwrap();
        let tsumo = menu[&Wind::East][0];
        assert_eq!(tsumo.call_type, CallType::Tsumo);

        let (_, end) = game.step(&one(Wind::East, tsumo)).unwrap();
        assert_eq!(end, EndType::Round);
        assert_eq!(game.pos_player(Wind::East).points, 25000 + 48000);
        for w in Wind::East.others() {
            assert_eq!(game.pos_player(w).points, 25000 - 16000);
        }
        assert_eq!(end_deltas(&game), [48000, -16000, -16000, -16000]);
        assert_eq!(game.num_honba(), 0);

        let win = game
            .get_global_events()
            .into_iter()
            .find_map(|e| match e {
                Event::Tsumo { result, hand_tiles, .. } => Some((result, hand_tiles)),
                _ => None,
            })
            .unwrap();
        assert_eq!(win.1.len(), 13);
        assert!(win.0.yaku_result.unwrap().yakumans.contains(&Yakuman::Tenhou));

        next_round(&mut game);
        assert_eq!(game.num_honba(), 1);
        assert_eq!(game.wind_round(), 0);
    }

    #[test]
    fn test_round_points_are_conserved() {
        for seed in 0..8 {
            let mut game = Game::new(seed, GameRule::default());
            let menu = game.reset(None).unwrap();
            play_out_round(&mut game, menu);
            assert_eq!(total_points(&game), 100_000, "seed {seed}");
            assert_eq!(game.state_name(), "End");
        }
    }

    #[test]
    fn test_replay_rebuilds_round() {
        let mut game = Game::new(2024, GameRule::default());
        let menu = game.reset(None).unwrap();
        play_out_round(&mut game, menu);

        let events = game.get_global_events();
        assert!(matches!(events[0], Event::GlobalInit { .. }));
        let json = events_to_json(&events).unwrap();
        let parsed = events_from_json(&json).unwrap();
        assert_eq!(parsed, events);

        let replayed = Game::reconstruct(&parsed).unwrap();
        assert_eq!(replayed.scores(), game.scores());
        assert_eq!(replayed.state_name(), game.state_name());
        assert_eq!(replayed.num_honba(), game.num_honba());
        assert_eq!(replayed.wind_round(), game.wind_round());
        for w in Wind::ALL {
            assert_eq!(
                replayed.pos_player(w).discard_tiles,
                game.pos_player(w).discard_tiles
            );
            assert_eq!(replayed.pos_player(w).melds, game.pos_player(w).melds);
        }
        assert_eq!(replayed.get_global_events(), events);
    }

    #[test]
    fn test_replay_across_rounds() {
        let mut game = Game::new(77, GameRule::default());
        let menu = game.reset(None).unwrap();
        let menu = play_out_round(&mut game, menu);
        let mut log = game.get_global_events();

        let next: HashMap<Wind, Call> = menu.keys().map(|&w| (w, Call::next())).collect();
        let (menu, _) = game.step(&next).unwrap();
        play_out_round(&mut game, menu);
        log.extend(game.get_global_events());

        let replayed = Game::reconstruct(&log).unwrap();
        assert_eq!(replayed.scores(), game.scores());
        assert_eq!(replayed.num_game(), game.num_game());
        assert_eq!(replayed.get_global_events(), game.get_global_events());
    }

    #[test]
    fn test_replay_needs_global_init() {
        let err = Game::reconstruct(&[Event::NewIndicator { tile: 0 }]).unwrap_err();
        assert!(matches!(err, GameError::InvalidState { .. }));
    }

    #[test]
    fn test_board_state_view() {
        let mut game = Game::new(11, GameRule::default());
        let menu = game.reset(None).unwrap();
        let state = game.get_pos_board_state(Wind::East, menu[&Wind::East].clone());
        assert_eq!(state.hand_tiles.len(), 14);
        assert_eq!(state.remain_tiles, 69);
        assert_eq!(state.player_states.len(), 4);
        assert_eq!(state.dora_indicators.len(), 1);
        let hidden = game.get_pos_board_state(Wind::South, vec![]);
        assert_eq!(hidden.hand_tiles.len(), 13);
    }

    #[test]
    fn test_game_end_on_negative_points() {
        let mut game = Game::new(1, GameRule::default());
        game.reset(None).unwrap();
        assert!(!game.check_game_end());
        game.players[2].points = -100;
        assert!(game.check_game_end());
    }

    #[test]
    fn test_game_end_after_regulation() {
        let mut game = Game::new(1, GameRule::east_only());
        game.reset(None).unwrap();
        game.wind_round = 4;
        // nobody has reached the target yet
        assert!(!game.check_game_end());
        game.players[0].points = 31000;
        assert!(game.check_game_end());
        game.players[0].points = 25000;
        game.wind_round = 8;
        assert!(game.check_game_end());

        // the last regulation round has settled but the seats have not moved yet
        game.players[0].points = 31000;
        game.wind_round = 3;
        assert!(!game.check_game_end());
        game.pending_rotation = Some(Rotation::Stay);
        assert!(!game.check_game_end());
        game.pending_rotation = Some(Rotation::Pass);
        assert!(game.check_game_end());
        game.pending_rotation = Some(Rotation::PassOnDraw);
        assert!(game.check_game_end());
    }
}
