use super::board::Board;
use super::types::Player;

pub const WIN_COUNT: usize = 4;

/// Horizontal, vertical, diagonal up-right, diagonal down-right.
const AXES: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Whether the piece at (`column`, `row`) completes a line of `WIN_COUNT`.
/// Only lines through that cell are inspected.
pub fn is_winning_cell(board: &Board, column: usize, row: usize) -> bool {
    let Some(player) = board.cell(column, row) else {
        return false;
    };

    AXES.iter().any(|&(dc, dr)| {
        let run = 1
            + count_run(board, column, row, dc, dr, player)
            + count_run(board, column, row, -dc, -dr, player);
        run >= WIN_COUNT
    })
}

fn count_run(
    board: &Board,
    column: usize,
    row: usize,
    dc: isize,
    dr: isize,
    player: Player,
) -> usize {
    let mut count = 0;
    let mut c = column as isize + dc;
    let mut r = row as isize + dr;

    while c >= 0 && r >= 0 && board.cell(c as usize, r as usize) == Some(player) {
        count += 1;
        c += dc;
        r += dr;
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(pieces: &[(usize, Player)]) -> Board {
        let mut board = Board::new();
        for &(column, player) in pieces {
            board.drop_piece(column, player);
        }
        board
    }

    #[test]
    fn test_horizontal_win_through_middle_cell() {
        let board = board_from(&[
            (1, Player::Red),
            (2, Player::Red),
            (4, Player::Red),
            (3, Player::Red),
        ]);

        assert!(is_winning_cell(&board, 3, 0));
        assert!(is_winning_cell(&board, 1, 0));
    }

    #[test]
    fn test_vertical_win() {
        let board = board_from(&[
            (5, Player::Yellow),
            (5, Player::Yellow),
            (5, Player::Yellow),
            (5, Player::Yellow),
        ]);

        assert!(is_winning_cell(&board, 5, 3));
    }

    #[test]
    fn test_diagonal_up_right_win() {
        #[rustfmt::skip]
        let board = board_from(&[
            (0, Player::Red),
            (1, Player::Yellow), (1, Player::Red),
            (2, Player::Yellow), (2, Player::Yellow), (2, Player::Red),
            (3, Player::Yellow), (3, Player::Yellow), (3, Player::Yellow), (3, Player::Red),
        ]);

        assert!(is_winning_cell(&board, 3, 3));
        assert!(is_winning_cell(&board, 0, 0));
    }

    #[test]
    fn test_diagonal_down_right_win() {
        #[rustfmt::skip]
        let board = board_from(&[
            (6, Player::Red),
            (5, Player::Yellow), (5, Player::Red),
            (4, Player::Yellow), (4, Player::Yellow), (4, Player::Red),
            (3, Player::Yellow), (3, Player::Yellow), (3, Player::Yellow), (3, Player::Red),
        ]);

        assert!(is_winning_cell(&board, 3, 3));
        assert!(is_winning_cell(&board, 6, 0));
    }

    #[test]
    fn test_three_in_a_row_is_not_a_win() {
        let board = board_from(&[(0, Player::Red), (1, Player::Red), (2, Player::Red)]);

        assert!(!is_winning_cell(&board, 2, 0));
    }

    #[test]
    fn test_broken_line_is_not_a_win() {
        let board = board_from(&[
            (0, Player::Red),
            (1, Player::Red),
            (2, Player::Yellow),
            (3, Player::Red),
            (4, Player::Red),
        ]);

        assert!(!is_winning_cell(&board, 4, 0));
    }

    #[test]
    fn test_empty_cell_never_wins() {
        let board = Board::new();

        assert!(!is_winning_cell(&board, 0, 0));
    }
}
