use super::state::GameState;
use crate::board::{BoardLayout, Tile};
use crate::error::ReduceError;
use crate::protocol::{GameEndReason, GameHistory, PlayState, ServerMessage, Turn, TurnKind};
use crate::tiles::alphabet::Alphabet;
use crate::tiles::letter::Letter;

/// Apply one decoded server message to a state, producing the next state.
///
/// Pure and deterministic. On error the prior state is untouched; the
/// caller logs and discards the message.
pub fn apply(prior: &GameState, msg: &ServerMessage) -> Result<GameState, ReduceError> {
    check_game(prior, msg)?;
    match msg {
        ServerMessage::GameHistoryRefresher {
            history,
            time_player1,
            time_player2,
            time_bank_player1,
            time_bank_player2,
            max_overtime_minutes,
        } => {
            let mut next = from_history(history)?;
            let times = [*time_player1, *time_player2];
            let banks = [*time_bank_player1, *time_bank_player2];
            for (i, p) in next.players.iter_mut().enumerate() {
                p.time_millis = times[i];
                p.time_bank_millis = Some(banks[i]).filter(|b| *b > 0);
            }
            next.max_overtime_minutes = *max_overtime_minutes;
            next.refreshers = prior.refreshers + 1;
            Ok(next)
        }

        ServerMessage::ServerGameplayEvent {
            event,
            new_rack,
            time_remaining,
            time_bank,
            playing,
            turn_index,
            ..
        } => {
            if let Some(idx) = turn_index {
                if *idx != prior.turns.len() {
                    return Err(ReduceError::Desync { expected: prior.turns.len(), got: *idx });
                }
            }
            let mut next = prior.clone();
            if event.kind == TurnKind::PhonyTilesReturned && confirms_last_reversal(prior, event) {
                // A challenge result already took the tiles off; adopt the server's record.
                let last = next.turns.len() - 1;
                next.turns[last] = event.clone();
                next.players[event.player_index].score = event.cumulative;
            } else {
                apply_turn(&mut next, event)?;
            }
            let pi = event.player_index;
            if matches!(event.kind, TurnKind::TilePlacement | TurnKind::Exchange) {
                check_letters(next.alphabet, new_rack)?;
                next.players[pi].rack = new_rack.clone();
            }
            let timed = timed_player(&next, event);
            next.players[timed].time_millis = *time_remaining;
            if let Some(bank) = time_bank {
                next.players[timed].time_bank_millis = Some(*bank).filter(|b| *b > 0);
            }
            next.play_state = *playing;
            next.recompute_pool();
            Ok(next)
        }

        ServerMessage::ServerChallengeResultEvent { valid, time_remaining, .. } => {
            let mut next = prior.clone();
            if *valid {
                // The play stands. Bonuses and turn loss arrive as their own turns.
                return Ok(next);
            }
            let last = prior
                .turns
                .last()
                .filter(|t| t.kind == TurnKind::TilePlacement)
                .ok_or_else(|| ReduceError::Malformed("challenge without a placement to reverse".into()))?;
            let pi = last.player_index;
            let reversal = Turn {
                kind: TurnKind::PhonyTilesReturned,
                player_index: pi,
                rack: last.rack.clone(),
                score: -last.score,
                cumulative: prior.players[pi].score - last.score,
                lost_score: last.score,
                millis_remaining: time_remaining.unwrap_or(0),
                ..Default::default()
            };
            apply_turn(&mut next, &reversal)?;
            if let Some(t) = time_remaining {
                let challenger = next.players.len() - 1 - pi;
                next.players[challenger].time_millis = *t;
            }
            next.recompute_pool();
            Ok(next)
        }

        ServerMessage::TimeUpdate { player_index, time_remaining, .. } => {
            let mut next = prior.clone();
            let p = next
                .players
                .get_mut(*player_index)
                .ok_or_else(|| ReduceError::UnknownPlayer(player_index.to_string()))?;
            p.time_millis = *time_remaining;
            Ok(next)
        }

        ServerMessage::TimedOut { user_id, .. } => {
            let pi = prior
                .player_index(user_id)
                .ok_or_else(|| ReduceError::UnknownPlayer(user_id.clone()))?;
            let mut next = prior.clone();
            next.players[pi].timed_out = true;
            next.play_state = PlayState::GameOver;
            next.end_reason = GameEndReason::Time;
            next.set_on_turn(None);
            Ok(next)
        }

        ServerMessage::GameEndedEvent { history, end_reason, final_scores, winner, .. } => {
            let mut next = match history {
                Some(h) => {
                    let mut rebuilt = from_history(h)?;
                    for (p, old) in rebuilt.players.iter_mut().zip(&prior.players) {
                        p.time_millis = old.time_millis;
                        p.time_bank_millis = old.time_bank_millis;
                        p.timed_out = old.timed_out;
                    }
                    rebuilt.refreshers = prior.refreshers;
                    rebuilt.max_overtime_minutes = prior.max_overtime_minutes;
                    rebuilt
                }
                None => prior.clone(),
            };
            if !final_scores.is_empty() {
                if final_scores.len() != next.players.len() {
                    return Err(ReduceError::Malformed("final score count".into()));
                }
                for (p, s) in next.players.iter_mut().zip(final_scores) {
                    p.score = *s;
                }
            }
            next.play_state = PlayState::GameOver;
            next.end_reason = *end_reason;
            next.winner = winner.clone();
            next.set_on_turn(None);
            Ok(next)
        }

        ServerMessage::GameMetaEvent(_) => Ok(prior.clone()),
    }
}

/// Append one turn to the log and update board, score and turn.
///
/// This is the single transition every path goes through: live gameplay
/// events, history refreshers, and history examination.
pub fn apply_turn(state: &mut GameState, turn: &Turn) -> Result<(), ReduceError> {
    let pi = turn.player_index;
    if pi >= state.players.len() {
        return Err(ReduceError::UnknownPlayer(pi.to_string()));
    }
    check_letters(state.alphabet, &turn.rack)?;

    match turn.kind {
        TurnKind::TilePlacement => {
            check_letters(state.alphabet, &turn.played_tiles)?;
            if !turn.fits_on(state.board.dim()) {
                return Err(ReduceError::Malformed("placement runs off the board".into()));
            }
            let tiles: Vec<Tile> = turn
                .placed_cells()
                .filter(|&(r, c, l)| state.board.letter_at(r, c) != Some(l))
                .map(|(r, c, l)| Tile::new(r, c, l))
                .collect();
            if tiles.is_empty() {
                return Err(ReduceError::Malformed("placement without tiles".into()));
            }
            state.board = state.board.place_tiles(&tiles)?;
            state.last_played = tiles.iter().map(|t| (t.row, t.col)).collect();
            for t in &tiles {
                state.set_player_of_tile(t.row, t.col, pi);
            }
        }
        TurnKind::PhonyTilesReturned => {
            let placed = state
                .turns
                .last()
                .filter(|t| t.kind == TurnKind::TilePlacement)
                .ok_or_else(|| ReduceError::Malformed("phony tiles returned without a placement".into()))?;
            let cells: Vec<(usize, usize)> = placed
                .placed_cells()
                .filter(|&(r, c, _)| state.last_played.contains(&(r, c)))
                .map(|(r, c, _)| (r, c))
                .collect();
            state.board = state.board.remove_tiles(&cells)?;
            state.last_played.clear();
            state.players[pi].rack = placed.rack.clone();
        }
        TurnKind::TimedOut => {
            state.players[pi].timed_out = true;
        }
        TurnKind::Pass
        | TurnKind::ChallengeBonus
        | TurnKind::Exchange
        | TurnKind::EndRackPoints
        | TurnKind::TimePenalty
        | TurnKind::EndRackPenalty
        | TurnKind::UnsuccessfulChallengeTurnLoss
        | TurnKind::Challenge => {}
    }

    state.players[pi].score = turn.cumulative;
    state.turns.push(turn.clone());
    let next = (pi + 1) % state.players.len();
    state.set_on_turn(Some(next));
    log::debug!("turn {} applied: {:?} by player {}", state.turns.len() - 1, turn.kind, pi);
    Ok(())
}

/// Fold a slice of turns onto a state.
pub fn fold(mut state: GameState, turns: &[Turn]) -> Result<GameState, ReduceError> {
    for turn in turns {
        apply_turn(&mut state, turn)?;
    }
    state.recompute_pool();
    Ok(state)
}

/// Rebuild a full state from a history snapshot, folding from an empty board.
pub fn from_history(history: &GameHistory) -> Result<GameState, ReduceError> {
    if history.players.len() != 2 {
        return Err(ReduceError::Malformed(format!(
            "expected two players, got {}",
            history.players.len()
        )));
    }
    let alphabet = Alphabet::from_name(&history.letter_distribution);
    let layout = BoardLayout::from_name(&history.board_layout);
    let mut base = GameState::new(&history.game_id, alphabet, layout, &history.players);
    base.challenge_rule = history.challenge_rule;
    base.initial_time_millis = history.initial_time_millis;

    let mut gs = fold(base, &history.events)?;
    for (p, rack) in gs.players.iter_mut().zip(&history.last_known_racks) {
        check_letters(alphabet, rack)?;
        p.rack = rack.clone();
    }
    gs.play_state = history.play_state;
    gs.end_reason = history.end_reason;
    if gs.play_state == PlayState::GameOver {
        gs.set_on_turn(None);
        if history.final_scores.len() == gs.players.len() {
            for (p, s) in gs.players.iter_mut().zip(&history.final_scores) {
                p.score = *s;
            }
        }
    }
    gs.recompute_pool();
    Ok(gs)
}

fn check_game(prior: &GameState, msg: &ServerMessage) -> Result<(), ReduceError> {
    let got = msg.game_id();
    let fresh_session = prior.game_id.is_empty() && matches!(msg, ServerMessage::GameHistoryRefresher { .. });
    if got != prior.game_id && !fresh_session {
        return Err(ReduceError::WrongGame { expected: prior.game_id.clone(), got: got.to_string() });
    }
    Ok(())
}

fn check_letters(alphabet: &Alphabet, letters: &[Letter]) -> Result<(), ReduceError> {
    match letters
        .iter()
        .find(|l| **l != Letter::EMPTY_RACK_SLOT && !alphabet.contains(**l))
    {
        Some(bad) => Err(ReduceError::Malformed(format!("letter {} not in {}", bad.0, alphabet.name))),
        None => Ok(()),
    }
}

/// Whether a server-sent reversal repeats one already applied from a challenge result.
fn confirms_last_reversal(prior: &GameState, event: &Turn) -> bool {
    prior
        .turns
        .last()
        .is_some_and(|t| t.kind == TurnKind::PhonyTilesReturned && t.player_index == event.player_index)
}

/// The player whose clock a gameplay event's time snapshot belongs to.
fn timed_player(state: &GameState, event: &Turn) -> usize {
    if event.kind.time_belongs_to_challenger() {
        (event.player_index + 1) % state.players.len()
    } else {
        event.player_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Direction;
    use crate::protocol::PlayerInfo;
    use crate::tiles::alphabet::ENGLISH;

    fn history(events: Vec<Turn>) -> GameHistory {
        GameHistory {
            game_id: "g".into(),
            players: vec![
                PlayerInfo { user_id: "a".into(), nickname: "alice".into() },
                PlayerInfo { user_id: "b".into(), nickname: "bob".into() },
            ],
            events,
            letter_distribution: "english".into(),
            ..Default::default()
        }
    }

    fn placement(player: usize, row: usize, col: usize, word: &str, rack: &str, score: i32, cumulative: i32) -> Turn {
        Turn {
            kind: TurnKind::TilePlacement,
            player_index: player,
            row,
            column: col,
            direction: Direction::Horizontal,
            played_tiles: ENGLISH.letters(word).unwrap(),
            rack: ENGLISH.letters(rack).unwrap(),
            score,
            cumulative,
            ..Default::default()
        }
    }

    fn start() -> GameState {
        from_history(&history(vec![])).unwrap()
    }

    fn gameplay(event: Turn, new_rack: &str) -> ServerMessage {
        ServerMessage::ServerGameplayEvent {
            game_id: "g".into(),
            event,
            new_rack: ENGLISH.letters(new_rack).unwrap(),
            time_remaining: 1000,
            time_bank: None,
            playing: PlayState::Playing,
            turn_index: None,
        }
    }

    #[test]
    fn placement_past_the_edge_is_rejected() {
        let gs = start();
        for (row, col) in [(7, usize::MAX), (7, 14), (usize::MAX, 0)] {
            let msg = gameplay(placement(0, row, col, "AT", "ATE", 2, 2), "");
            assert!(matches!(apply(&gs, &msg), Err(ReduceError::Malformed(_))), "anchor {row},{col}");
        }
    }

    #[test]
    fn placement_writes_board_and_flips_turn() {
        let gs = start();
        let msg = gameplay(placement(0, 7, 7, "CARES", "CESAR", 16, 16), "ABCDEFG");
        let next = apply(&gs, &msg).unwrap();
        assert_eq!(next.turns.len(), 1);
        assert_eq!(next.board.tile_count(), 5);
        assert_eq!(next.players[0].score, 16);
        assert_eq!(next.on_turn, Some(1));
        assert_eq!(next.players[0].time_millis, 1000);
        assert_eq!(next.player_of_tile(7, 9), Some(0));
        assert_eq!(next.pool.total(), 100 - 5 - 7);
    }

    #[test]
    fn played_through_squares_are_not_rewritten() {
        let gs = fold(start(), &[placement(0, 7, 7, "CARES", "CESAR", 16, 16)]).unwrap();
        let through = Turn {
            direction: Direction::Vertical,
            ..placement(1, 6, 8, "T.X", "TX", 10, 10)
        };
        let next = fold(gs, &[through]).unwrap();
        assert_eq!(next.board.tile_count(), 7);
        assert_eq!(next.last_played.len(), 2);
    }

    #[test]
    fn wrong_game_is_rejected_without_change() {
        let gs = start();
        let msg = ServerMessage::TimeUpdate { game_id: "other".into(), player_index: 0, time_remaining: 5 };
        assert!(matches!(apply(&gs, &msg), Err(ReduceError::WrongGame { .. })));
    }

    #[test]
    fn unknown_player_index_is_rejected() {
        let gs = start();
        let msg = gameplay(placement(5, 7, 7, "CARES", "CESAR", 16, 16), "");
        assert!(matches!(apply(&gs, &msg), Err(ReduceError::UnknownPlayer(_))));
    }

    #[test]
    fn off_board_placement_is_rejected() {
        let gs = start();
        let msg = gameplay(placement(0, 7, 12, "CARES", "CESAR", 16, 16), "");
        assert!(matches!(apply(&gs, &msg), Err(ReduceError::Board(_))));
    }

    #[test]
    fn desync_is_detected() {
        let gs = start();
        let msg = ServerMessage::ServerGameplayEvent {
            game_id: "g".into(),
            event: Turn { kind: TurnKind::Pass, ..Default::default() },
            new_rack: vec![],
            time_remaining: 0,
            time_bank: None,
            playing: PlayState::Playing,
            turn_index: Some(3),
        };
        assert_eq!(apply(&gs, &msg), Err(ReduceError::Desync { expected: 0, got: 3 }));
    }

    #[test]
    fn time_update_touches_only_the_clock() {
        let gs = start();
        let msg = ServerMessage::TimeUpdate { game_id: "g".into(), player_index: 1, time_remaining: 4242 };
        let next = apply(&gs, &msg).unwrap();
        assert_eq!(next.players[1].time_millis, 4242);
        assert_eq!(next.turns, gs.turns);
        assert_eq!(next.on_turn, gs.on_turn);
    }

    #[test]
    fn challenge_bonus_time_goes_to_challenger() {
        let gs = fold(start(), &[placement(0, 7, 7, "CARES", "CESAR", 16, 16)]).unwrap();
        let bonus = Turn { kind: TurnKind::ChallengeBonus, player_index: 0, score: 5, cumulative: 21, ..Default::default() };
        let next = apply(&gs, &gameplay(bonus, "")).unwrap();
        assert_eq!(next.players[0].score, 21);
        assert_eq!(next.players[1].time_millis, 1000);
        assert_eq!(next.board.tile_count(), 5);
    }

    #[test]
    fn challenging_a_pass_is_malformed() {
        let gs = fold(start(), &[Turn { kind: TurnKind::Pass, ..Default::default() }]).unwrap();
        let msg = ServerMessage::ServerChallengeResultEvent {
            game_id: "g".into(),
            valid: false,
            challenger: "b".into(),
            challenge_rule: Default::default(),
            time_remaining: None,
        };
        assert!(matches!(apply(&gs, &msg), Err(ReduceError::Malformed(_))));
    }

    #[test]
    fn server_reversal_after_challenge_result_is_not_applied_twice() {
        let gs = fold(start(), &[placement(0, 7, 7, "CARES", "CESAR", 16, 16)]).unwrap();
        let result = ServerMessage::ServerChallengeResultEvent {
            game_id: "g".into(),
            valid: false,
            challenger: "b".into(),
            challenge_rule: Default::default(),
            time_remaining: None,
        };
        let reversed = apply(&gs, &result).unwrap();
        let server_turn = Turn {
            kind: TurnKind::PhonyTilesReturned,
            player_index: 0,
            cumulative: 0,
            lost_score: 16,
            ..Default::default()
        };
        let confirmed = apply(&reversed, &gameplay(server_turn.clone(), "")).unwrap();
        assert_eq!(confirmed.turns.len(), 2);
        assert_eq!(confirmed.turns[1], server_turn);
        assert!(confirmed.board.is_empty());
        assert_eq!(confirmed.players[0].rack, ENGLISH.letters("CESAR").unwrap());
    }

    #[test]
    fn timed_out_ends_the_game() {
        let gs = start();
        let msg = ServerMessage::TimedOut { game_id: "g".into(), user_id: "b".into() };
        let next = apply(&gs, &msg).unwrap();
        assert!(next.players[1].timed_out);
        assert!(next.is_over());
        assert_eq!(next.end_reason, GameEndReason::Time);
        assert_eq!(next.on_turn, None);
    }

    #[test]
    fn game_end_freezes_turn_and_stores_scores() {
        let gs = start();
        let msg = ServerMessage::GameEndedEvent {
            game_id: "g".into(),
            history: None,
            end_reason: GameEndReason::Resigned,
            final_scores: vec![120, 80],
            winner: Some("a".into()),
        };
        let next = apply(&gs, &msg).unwrap();
        assert!(next.is_over());
        assert_eq!(next.players[0].score, 120);
        assert!(next.players.iter().all(|p| !p.on_turn));
        assert_eq!(next.winner.as_deref(), Some("a"));
    }

    #[test]
    fn refresher_replaces_log_wholesale() {
        let gs = fold(start(), &[placement(0, 7, 7, "CARES", "CESAR", 16, 16)]).unwrap();
        let msg = ServerMessage::GameHistoryRefresher {
            history: history(vec![Turn { kind: TurnKind::Pass, ..Default::default() }]),
            time_player1: 60_000,
            time_player2: 55_000,
            time_bank_player1: 0,
            time_bank_player2: 30_000,
            max_overtime_minutes: 1,
        };
        let next = apply(&gs, &msg).unwrap();
        assert_eq!(next.turns.len(), 1);
        assert!(next.board.is_empty());
        assert_eq!(next.players[1].time_millis, 55_000);
        assert_eq!(next.players[0].time_bank_millis, None);
        assert_eq!(next.players[1].time_bank_millis, Some(30_000));
        assert_eq!(next.refreshers, gs.refreshers + 1);
    }
}
