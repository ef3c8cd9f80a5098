use super::board::{BOARD_WIDTH, Board};
use super::error::{GameRuleError, ReplayError};
use super::types::{GameStatus, Move, Player};
use super::win_detector::is_winning_cell;

/// Board, move history and winner of one game. Does not track turns:
/// the caller's player tag is trusted.
#[derive(Debug, Clone, Default)]
pub struct Connect4Game {
    board: Board,
    moves: Vec<Move>,
    winner: Option<Player>,
}

impl Connect4Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a game by playing `moves` in order, checking each one lands
    /// on its recorded row.
    pub fn replay(moves: &[Move]) -> Result<Self, ReplayError> {
        let mut game = Self::new();
        for (index, recorded) in moves.iter().enumerate() {
            let row = game
                .play(recorded.player, recorded.column as i64)
                .map_err(|source| ReplayError::Rejected { index, source })?;
            if row != recorded.row {
                return Err(ReplayError::RowMismatch {
                    index,
                    recorded: recorded.row,
                    actual: row,
                });
            }
        }
        Ok(game)
    }

    /// Drops `player`'s piece into `column` and returns the row it landed on.
    /// A rejected move leaves the game untouched.
    pub fn play(&mut self, player: Player, column: i64) -> Result<usize, GameRuleError> {
        if self.winner.is_some() {
            return Err(GameRuleError::GameOver);
        }

        let column_index = usize::try_from(column)
            .ok()
            .filter(|&c| c < BOARD_WIDTH)
            .ok_or(GameRuleError::InvalidColumn(column))?;

        if self.board.is_column_full(column_index) {
            return Err(GameRuleError::ColumnFull(column_index));
        }

        let row = self.board.drop_piece(column_index, player);
        self.moves.push(Move::new(player, column_index, row));

        if is_winning_cell(&self.board, column_index, row) {
            self.winner = Some(player);
        }

        Ok(row)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn last_player(&self) -> Option<Player> {
        self.moves.last().map(|m| m.player)
    }

    pub fn status(&self) -> GameStatus {
        match self.winner {
            Some(player) => GameStatus::Won(player),
            None if self.moves.is_empty() => GameStatus::NotStarted,
            None => GameStatus::InProgress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::connect4::BOARD_HEIGHT;

    fn play_all(game: &mut Connect4Game, moves: &[(Player, i64)]) {
        for &(player, column) in moves {
            game.play(player, column).unwrap();
        }
    }

    #[test]
    fn test_column_overflow_scenario() {
        let mut game = Connect4Game::new();
        let mut player = Player::Red;

        for expected_row in 0..BOARD_HEIGHT {
            assert_eq!(game.play(player, 3).unwrap(), expected_row);
            player = player.opponent();
        }

        assert_eq!(game.play(player, 3), Err(GameRuleError::ColumnFull(3)));
        assert_eq!(game.moves().len(), BOARD_HEIGHT);
        assert_eq!(game.board().column_height(3), Some(BOARD_HEIGHT));
    }

    #[test]
    fn test_vertical_win_scenario() {
        let mut game = Connect4Game::new();
        play_all(
            &mut game,
            &[
                (Player::Red, 0),
                (Player::Yellow, 1),
                (Player::Red, 0),
                (Player::Yellow, 1),
                (Player::Red, 0),
                (Player::Yellow, 1),
            ],
        );
        assert_eq!(game.winner(), None);

        assert_eq!(game.play(Player::Red, 0), Ok(3));

        assert_eq!(game.winner(), Some(Player::Red));
        assert_eq!(game.status(), GameStatus::Won(Player::Red));
    }

    #[test]
    fn test_play_after_win_fails_for_both_players() {
        let mut game = Connect4Game::new();
        play_all(
            &mut game,
            &[
                (Player::Yellow, 0),
                (Player::Yellow, 1),
                (Player::Yellow, 2),
                (Player::Yellow, 3),
            ],
        );

        assert_eq!(game.play(Player::Red, 5), Err(GameRuleError::GameOver));
        assert_eq!(game.play(Player::Yellow, 5), Err(GameRuleError::GameOver));
        assert_eq!(game.moves().len(), 4);
        assert_eq!(game.winner(), Some(Player::Yellow));
    }

    #[test]
    fn test_game_over_reported_before_invalid_column() {
        let mut game = Connect4Game::new();
        play_all(
            &mut game,
            &[(Player::Red, 6), (Player::Red, 6), (Player::Red, 6), (Player::Red, 6)],
        );

        assert_eq!(game.play(Player::Red, -1), Err(GameRuleError::GameOver));
    }

    #[test]
    fn test_invalid_columns_are_rejected_without_mutation() {
        let mut game = Connect4Game::new();

        assert_eq!(game.play(Player::Red, -1), Err(GameRuleError::InvalidColumn(-1)));
        assert_eq!(game.play(Player::Red, 7), Err(GameRuleError::InvalidColumn(7)));
        assert_eq!(
            game.play(Player::Red, i64::MAX),
            Err(GameRuleError::InvalidColumn(i64::MAX))
        );
        assert!(game.moves().is_empty());
        assert_eq!(game.status(), GameStatus::NotStarted);
    }

    #[test]
    fn test_status_moves_to_in_progress_after_first_move() {
        let mut game = Connect4Game::new();
        game.play(Player::Red, 0).unwrap();

        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.last_player(), Some(Player::Red));
    }

    #[test]
    fn test_engine_does_not_enforce_turns() {
        let mut game = Connect4Game::new();

        assert_eq!(game.play(Player::Yellow, 0), Ok(0));
        assert_eq!(game.play(Player::Yellow, 0), Ok(1));
    }

    #[test]
    fn test_winner_is_set_once_and_stays() {
        let mut game = Connect4Game::new();
        play_all(
            &mut game,
            &[(Player::Red, 0), (Player::Red, 1), (Player::Red, 2), (Player::Red, 3)],
        );

        assert_eq!(game.winner(), Some(Player::Red));
        let _ = game.play(Player::Yellow, 4);
        assert_eq!(game.winner(), Some(Player::Red));
        assert_eq!(game.winner(), Some(Player::Red));
    }

    #[test]
    fn test_history_length_matches_accepted_moves() {
        let mut game = Connect4Game::new();
        let mut accepted = 0;

        // Columns -1..=7, so some moves are off the board.
        let mut seed: u64 = 42;
        let mut player = Player::Red;
        for _ in 0..120 {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let column = ((seed >> 33) % 9) as i64 - 1;
            if game.play(player, column).is_ok() {
                accepted += 1;
                player = player.opponent();
            }
            for c in 0..BOARD_WIDTH {
                assert!(game.board().column_height(c).unwrap() <= BOARD_HEIGHT);
            }
        }

        assert_eq!(game.moves().len(), accepted);
    }

    #[test]
    fn test_replay_of_every_prefix_reproduces_board_and_winner() {
        let mut game = Connect4Game::new();
        let mut snapshots = vec![game.clone()];
        #[rustfmt::skip]
        let script = [
            (Player::Red, 3), (Player::Yellow, 3), (Player::Red, 4), (Player::Yellow, 4),
            (Player::Red, 2), (Player::Yellow, 2), (Player::Red, 5),
        ];
        for (player, column) in script {
            game.play(player, column).unwrap();
            snapshots.push(game.clone());
        }
        assert_eq!(game.winner(), Some(Player::Red));

        for (length, snapshot) in snapshots.iter().enumerate() {
            let replayed = Connect4Game::replay(&game.moves()[..length]).unwrap();
            assert_eq!(replayed.board(), snapshot.board());
            assert_eq!(replayed.winner(), snapshot.winner());
            assert_eq!(replayed.moves(), snapshot.moves());
        }
    }

    #[test]
    fn test_full_board_without_winner_rejects_every_column() {
        let mut game = Connect4Game::new();
        let bottom = [
            Player::Red,
            Player::Red,
            Player::Yellow,
            Player::Yellow,
            Player::Red,
            Player::Red,
            Player::Yellow,
        ];
        for (column, &first) in bottom.iter().enumerate() {
            for row in 0..BOARD_HEIGHT {
                let player = if row % 2 == 0 { first } else { first.opponent() };
                assert_eq!(game.play(player, column as i64), Ok(row));
            }
        }

        assert!(game.board().is_full());
        assert_eq!(game.winner(), None);
        for column in 0..BOARD_WIDTH {
            assert_eq!(
                game.play(Player::Red, column as i64),
                Err(GameRuleError::ColumnFull(column))
            );
        }
        assert_eq!(game.moves().len(), BOARD_WIDTH * BOARD_HEIGHT);
    }

    #[test]
    fn test_replay_rejects_inconsistent_rows() {
        let moves = [Move::new(Player::Red, 0, 0), Move::new(Player::Yellow, 0, 0)];

        assert_eq!(
            Connect4Game::replay(&moves).unwrap_err(),
            ReplayError::RowMismatch { index: 1, recorded: 0, actual: 1 }
        );
    }

    #[test]
    fn test_replay_rejects_illegal_moves() {
        let moves = [Move::new(Player::Red, 9, 0)];

        assert_eq!(
            Connect4Game::replay(&moves).unwrap_err(),
            ReplayError::Rejected { index: 0, source: GameRuleError::InvalidColumn(9) }
        );
    }
}
