use super::types::Player;

pub const BOARD_WIDTH: usize = 7;
pub const BOARD_HEIGHT: usize = 6;

/// Column-major grid; `columns[c][r]` with row 0 at the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: [[Option<Player>; BOARD_HEIGHT]; BOARD_WIDTH],
    heights: [usize; BOARD_WIDTH],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            columns: [[None; BOARD_HEIGHT]; BOARD_WIDTH],
            heights: [0; BOARD_WIDTH],
        }
    }

    /// `None` for empty cells and for coordinates off the board.
    pub fn cell(&self, column: usize, row: usize) -> Option<Player> {
        self.columns.get(column)?.get(row).copied().flatten()
    }

    pub fn column_height(&self, column: usize) -> Option<usize> {
        self.heights.get(column).copied()
    }

    pub fn is_column_full(&self, column: usize) -> bool {
        self.column_height(column)
            .is_some_and(|height| height >= BOARD_HEIGHT)
    }

    pub fn is_full(&self) -> bool {
        self.heights.iter().all(|&height| height >= BOARD_HEIGHT)
    }

    /// Callers check bounds and fullness first.
    pub(super) fn drop_piece(&mut self, column: usize, player: Player) -> usize {
        let row = self.heights[column];
        self.columns[column][row] = Some(player);
        self.heights[column] += 1;
        row
    }
}
