use crate::game::board::Square;
use bincode::{Decode, Encode};

/// The four diagonal rays. "Up" is the direction of increasing row:
/// White's forward. Red advances down toward row 0.
#[derive(Clone, PartialEq, Eq, Copy, Debug)]
pub enum Direction {
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// fixed enumeration order; move generation relies on it being
    /// stable
    pub const ALL: [Direction; 4] = [
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    #[inline(always)]
    fn delta(&self) -> (i8, i8) {
        match self {
            Direction::UpLeft => (1, -1),
            Direction::UpRight => (1, 1),
            Direction::DownLeft => (-1, -1),
            Direction::DownRight => (-1, 1),
        }
    }

    /// adjacent square along this ray; may land off the board
    #[inline]
    pub fn step_from(&self, square: Square) -> Square {
        let (dr, dc) = self.delta();
        Square::new(square.row + dr, square.col + dc)
    }

    /// square two diagonals along this ray; may land off the board
    #[inline]
    pub fn jump_from(&self, square: Square) -> Square {
        let (dr, dc) = self.delta();
        Square::new(square.row + 2 * dr, square.col + 2 * dc)
    }
}

/// One step, or one hop of a jump chain.
#[derive(Clone, PartialEq, Eq, Copy, Debug, Encode, Decode)]
pub struct Move {
    pub start: Square,
    pub end: Square,
}

impl Move {
    #[inline(always)]
    pub fn new(start: Square, end: Square) -> Self {
        Move { start, end }
    }

    /// any move spanning more than one row is a jump
    #[inline]
    pub fn is_jump(&self) -> bool {
        (self.start.row - self.end.row).abs() > 1
    }

    /// the square a jump passes over; None for a plain step
    pub fn captured_square(&self) -> Option<Square> {
        if self.is_jump() {
            Some(Square::new(
                (self.start.row + self.end.row) / 2,
                (self.start.col + self.end.col) / 2,
            ))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test_moves {
    use super::Direction::{DownLeft, DownRight, UpLeft, UpRight};
    use super::*;

    fn sq(row: i8, col: i8) -> Square {
        Square::new(row, col)
    }

    #[test]
    fn test_enumeration_order() {
        assert_eq!(Direction::ALL, [UpLeft, UpRight, DownLeft, DownRight]);
    }

    #[test]
    fn test_step_projection() {
        let from = sq(4, 4);
        assert_eq!(UpLeft.step_from(from), sq(5, 3));
        assert_eq!(UpRight.step_from(from), sq(5, 5));
        assert_eq!(DownLeft.step_from(from), sq(3, 3));
        assert_eq!(DownRight.step_from(from), sq(3, 5));
    }

    #[test]
    fn test_jump_projection() {
        let from = sq(4, 4);
        assert_eq!(UpLeft.jump_from(from), sq(6, 2));
        assert_eq!(UpRight.jump_from(from), sq(6, 6));
        assert_eq!(DownLeft.jump_from(from), sq(2, 2));
        assert_eq!(DownRight.jump_from(from), sq(2, 6));
    }

    #[test]
    fn test_projection_runs_off_board() {
        // no bounds check here, downstream filters on is_playable
        assert_eq!(DownLeft.step_from(sq(0, 0)), sq(-1, -1));
        assert_eq!(UpRight.jump_from(sq(7, 7)), sq(9, 9));
        assert!(!DownLeft.step_from(sq(0, 0)).is_playable());
        assert!(!UpRight.jump_from(sq(7, 7)).is_playable());
    }

    #[test]
    fn test_captured_square_is_midpoint() {
        assert_eq!(
            Move::new(sq(2, 2), sq(4, 4)).captured_square(),
            Some(sq(3, 3))
        );
        assert_eq!(
            Move::new(sq(4, 4), sq(2, 2)).captured_square(),
            Some(sq(3, 3))
        );
        assert_eq!(
            Move::new(sq(5, 1), sq(3, 3)).captured_square(),
            Some(sq(4, 2))
        );
        assert_eq!(
            Move::new(sq(3, 5), sq(5, 3)).captured_square(),
            Some(sq(4, 4))
        );
    }

    #[test]
    fn test_step_captures_nothing() {
        assert_eq!(Move::new(sq(2, 2), sq(3, 3)).captured_square(), None);
        assert_eq!(Move::new(sq(5, 1), sq(4, 0)).captured_square(), None);
        // degenerate spans are not jumps either
        assert_eq!(Move::new(sq(2, 2), sq(2, 4)).captured_square(), None);
        assert_eq!(Move::new(sq(2, 2), sq(2, 2)).captured_square(), None);
    }

    #[test]
    fn test_is_jump_by_row_span() {
        assert!(Move::new(sq(2, 2), sq(4, 4)).is_jump());
        assert!(Move::new(sq(4, 4), sq(2, 2)).is_jump());
        assert!(!Move::new(sq(2, 2), sq(3, 3)).is_jump());
        assert!(!Move::new(sq(2, 2), sq(2, 6)).is_jump());
    }
}
