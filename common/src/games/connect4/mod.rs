mod board;
mod error;
mod game_state;
mod types;
mod win_detector;

pub use board::{BOARD_HEIGHT, BOARD_WIDTH, Board};
pub use error::{GameRuleError, ReplayError};
pub use game_state::Connect4Game;
pub use types::{GameStatus, Move, Player};
pub use win_detector::{WIN_COUNT, is_winning_cell};
