mod board;
mod moves;
mod rules;

pub use board::{Board, Piece, Side, Square, BOARD_SIZE};
pub use moves::{Direction, Move};
pub use rules::{Match, Outcome};
