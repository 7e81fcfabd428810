use crate::game::board::Side::{Red, White};
use anyhow::{Error, Result};
use bincode::{Decode, Encode};

pub const BOARD_SIZE: usize = 8;

/// A match participant.
///
/// `Unknown` marks an unassigned seat (and a refused join on the wire),
/// `Both` is only ever a tie-outcome sentinel, never a participant.
#[derive(Clone, PartialEq, Eq, Copy, Debug, Encode, Decode)]
#[repr(u8)]
pub enum Side {
    Red = 1,
    White = 2,
    Unknown = 3,
    Both = 4,
}

impl Side {
    /// the other seat; sentinels map to themselves
    pub fn opponent(&self) -> Self {
        match self {
            Red => White,
            White => Red,
            other => *other,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Red | White)
    }
}

/// A board coordinate. Signed so that geometric projections may run off
/// the board; only `is_playable` squares can ever hold a piece.
#[derive(Clone, PartialEq, Eq, Hash, Copy, Debug, Encode, Decode)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    #[inline(always)]
    pub fn new(row: i8, col: i8) -> Self {
        Square { row, col }
    }

    /// on the 8x8 board and on the dark lattice (row and col share
    /// parity). Placement and move legality both go through this one
    /// predicate.
    #[inline]
    pub fn is_playable(&self) -> bool {
        (0..BOARD_SIZE as i8).contains(&self.row)
            && (0..BOARD_SIZE as i8).contains(&self.col)
            && self.row % 2 == self.col % 2
    }
}

/// A checker. `id` is handed out sequentially by the board at placement
/// and carries no gameplay meaning; it only tags log lines.
#[derive(Clone, PartialEq, Eq, Copy, Debug)]
pub struct Piece {
    pub owner: Side,
    pub crowned: bool,
    pub square: Square,
    pub id: u32,
}

/// 8x8 occupancy. At most one piece per square, dark squares only, and
/// every stored `Piece.square` matches its array position.
#[derive(Debug, PartialEq, Eq)]
pub struct Board {
    inner: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
    next_piece_id: u32,
}

impl Board {
    #[inline(always)]
    pub fn empty() -> Self {
        Board {
            inner: [[None; BOARD_SIZE]; BOARD_SIZE],
            next_piece_id: 0,
        }
    }

    /// standard setup: White on the dark squares of rows 0..=2, Red on
    /// rows 5..=7, twelve each, none crowned
    pub fn standard() -> Self {
        let mut board = Board::empty();
        for row in 0..BOARD_SIZE as i8 {
            for col in 0..BOARD_SIZE as i8 {
                let square = Square::new(row, col);
                if !square.is_playable() {
                    continue;
                }
                if row <= 2 {
                    board.spawn(square, White);
                } else if row >= 5 {
                    board.spawn(square, Red);
                }
            }
        }
        board
    }

    /// put a new piece on the board
    pub fn place(&mut self, square: Square, owner: Side) -> Result<()> {
        if !owner.is_player() {
            unlikely_error(Err(Error::msg("owner is not a player side")))
        } else if !square.is_playable() {
            unlikely_error(Err(Error::msg("square is not playable")))
        } else if self.piece_at(square).is_some() {
            unlikely_error(Err(Error::msg("square already occupied")))
        } else {
            self.spawn(square, owner);
            Ok(())
        }
    }

    /// take a piece off the board
    pub fn remove(&mut self, square: Square) -> Result<Piece> {
        match self.slot_mut(square) {
            None => unlikely_error(Err(Error::msg("square is not playable"))),
            Some(slot) => match slot.take() {
                None => unlikely_error(Err(Error::msg("square already empty"))),
                Some(piece) => Ok(piece),
            },
        }
    }

    /// move the occupant of `from` to `to`, keeping its stored square
    /// in sync
    pub fn relocate(&mut self, from: Square, to: Square) -> Result<()> {
        if !to.is_playable() {
            unlikely_error(Err(Error::msg("destination is not playable")))
        } else if self.piece_at(to).is_some() {
            unlikely_error(Err(Error::msg("destination occupied")))
        } else {
            let mut piece = self.remove(from)?;
            piece.square = to;
            self.inner[to.row as usize][to.col as usize] = Some(piece);
            Ok(())
        }
    }

    /// occupant lookup, total over all coordinates: off-board and light
    /// squares read as empty
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        if square.is_playable() {
            self.inner[square.row as usize][square.col as usize].as_ref()
        } else {
            None
        }
    }

    pub(crate) fn piece_at_mut(&mut self, square: Square) -> Option<&mut Piece> {
        self.slot_mut(square).and_then(|slot| slot.as_mut())
    }

    /// every piece on the board, row by row
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.inner.iter().flatten().filter_map(|slot| slot.as_ref())
    }

    fn slot_mut(&mut self, square: Square) -> Option<&mut Option<Piece>> {
        if square.is_playable() {
            Some(&mut self.inner[square.row as usize][square.col as usize])
        } else {
            None
        }
    }

    fn spawn(&mut self, square: Square, owner: Side) {
        let id = self.next_piece_id;
        self.next_piece_id += 1;
        self.inner[square.row as usize][square.col as usize] = Some(Piece {
            owner,
            crowned: false,
            square,
            id,
        });
    }
}

#[cold]
fn unlikely_error<T>(e: T) -> T {
    e
}

#[cfg(test)]
mod test_board {
    use super::Side::{Both, Red, Unknown, White};
    use super::*;

    fn render(board: &Board) -> [[char; 8]; 8] {
        let mut grid = [['.'; 8]; 8];
        for piece in board.pieces() {
            grid[piece.square.row as usize][piece.square.col as usize] =
                match (piece.owner, piece.crowned) {
                    (Red, false) => 'r',
                    (Red, true) => 'R',
                    (White, false) => 'w',
                    (White, true) => 'W',
                    _ => '?',
                };
        }
        grid
    }

    #[test]
    fn test_playable_squares() {
        for row in 0..8i8 {
            for col in 0..8i8 {
                assert_eq!(
                    Square::new(row, col).is_playable(),
                    row % 2 == col % 2,
                    "disagreement at ({}, {})",
                    row,
                    col
                );
            }
        }
        assert!(!Square::new(-1, 1).is_playable());
        assert!(!Square::new(1, -1).is_playable());
        assert!(!Square::new(8, 0).is_playable());
        assert!(!Square::new(0, 8).is_playable());
        assert!(!Square::new(-2, -2).is_playable());
    }

    #[test]
    fn test_standard_setup() {
        let board = Board::standard();
        assert_eq!(
            render(&board),
            [
                ['w', '.', 'w', '.', 'w', '.', 'w', '.'],
                ['.', 'w', '.', 'w', '.', 'w', '.', 'w'],
                ['w', '.', 'w', '.', 'w', '.', 'w', '.'],
                ['.', '.', '.', '.', '.', '.', '.', '.'],
                ['.', '.', '.', '.', '.', '.', '.', '.'],
                ['.', 'r', '.', 'r', '.', 'r', '.', 'r'],
                ['r', '.', 'r', '.', 'r', '.', 'r', '.'],
                ['.', 'r', '.', 'r', '.', 'r', '.', 'r'],
            ]
        );
        assert_eq!(board.pieces().filter(|p| p.owner == Red).count(), 12);
        assert_eq!(board.pieces().filter(|p| p.owner == White).count(), 12);
        assert!(board.pieces().all(|p| !p.crowned));
    }

    #[test]
    fn test_piece_ids_sequential() {
        let mut board = Board::empty();
        board.place(Square::new(0, 0), White).unwrap();
        board.place(Square::new(2, 2), White).unwrap();
        board.place(Square::new(5, 1), Red).unwrap();
        let mut ids: Vec<u32> = board.pieces().map(|p| p.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_place_errors() {
        let mut board = Board::empty();
        board.place(Square::new(2, 2), Red).unwrap();
        assert!(board.place(Square::new(2, 2), White).is_err());
        assert!(board.place(Square::new(2, 3), White).is_err());
        assert!(board.place(Square::new(8, 0), White).is_err());
        assert!(board.place(Square::new(-1, 1), White).is_err());
        assert!(board.place(Square::new(4, 4), Unknown).is_err());
        assert!(board.place(Square::new(4, 4), Both).is_err());
        assert_eq!(board.pieces().count(), 1);
    }

    #[test]
    fn test_remove_and_relocate() {
        let mut board = Board::empty();
        board.place(Square::new(3, 3), Red).unwrap();
        board.relocate(Square::new(3, 3), Square::new(2, 2)).unwrap();
        let piece = board.piece_at(Square::new(2, 2)).unwrap();
        assert_eq!(piece.square, Square::new(2, 2));
        assert!(board.piece_at(Square::new(3, 3)).is_none());

        // relocation guards
        board.place(Square::new(4, 4), White).unwrap();
        assert!(board.relocate(Square::new(2, 2), Square::new(4, 4)).is_err());
        assert!(board.relocate(Square::new(5, 5), Square::new(6, 6)).is_err());
        assert!(board.relocate(Square::new(2, 2), Square::new(8, 8)).is_err());

        let removed = board.remove(Square::new(2, 2)).unwrap();
        assert_eq!(removed.owner, Red);
        assert!(board.remove(Square::new(2, 2)).is_err());
    }

    #[test]
    fn test_lookup_total() {
        let board = Board::standard();
        assert!(board.piece_at(Square::new(-1, -1)).is_none());
        assert!(board.piece_at(Square::new(9, 3)).is_none());
        assert!(board.piece_at(Square::new(0, 1)).is_none());
        assert!(board.piece_at(Square::new(0, 0)).is_some());
    }
}
