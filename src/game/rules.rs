use crate::game::board::Side::{Red, White};
use crate::game::board::{Board, Piece, Side, Square};
use crate::game::moves::{Direction, Move};
use anyhow::Result;

/// Verdict on a position. `Draw` means neither side can move;
/// `Undecided` means play continues.
#[derive(Clone, PartialEq, Eq, Copy, Debug)]
pub enum Outcome {
    RedWins,
    WhiteWins,
    Draw,
    Undecided,
}

/// The authoritative match state: occupancy, the side to move, and the
/// square of a piece that must keep jumping mid-chain.
///
/// All mutation goes through `apply_move`. Red moves first and advances
/// toward row 0, White toward row 7.
#[derive(Debug)]
pub struct Match {
    board: Board,
    turn: Side,
    forced: Option<Square>,
}

impl Match {
    /// standard setup, Red to move
    pub fn new() -> Self {
        Match {
            board: Board::standard(),
            turn: Red,
            forced: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(board: Board, turn: Side, forced: Option<Square>) -> Match {
        Match {
            board,
            turn,
            forced,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    /// square of the piece that must continue its jump chain, if any
    pub fn forced(&self) -> Option<Square> {
        self.forced
    }

    /// Legality of one step or one hop, checked in rule order: forced
    /// piece identity, source occupancy and destination vacancy, capture
    /// geometry for jumps (steps cannot continue a chain), and finally
    /// direction rules. Crowned pieces use all four diagonals, uncrowned
    /// pieces only their forward pair.
    pub fn is_legal_partial_move(&self, mv: Move) -> bool {
        self.legal_partial_move(mv, self.forced)
    }

    fn legal_partial_move(&self, mv: Move, forced: Option<Square>) -> bool {
        if let Some(forced_square) = forced {
            if mv.start != forced_square {
                return false;
            }
        }
        let piece = match self.board.piece_at(mv.start) {
            None => return false,
            Some(piece) => piece,
        };
        if !mv.end.is_playable() || self.board.piece_at(mv.end).is_some() {
            return false;
        }
        match mv.captured_square() {
            Some(captured) => match self.board.piece_at(captured) {
                None => return false,
                Some(target) => {
                    if target.owner == piece.owner {
                        return false;
                    }
                }
            },
            // a plain step may not continue a chain
            None => {
                if forced.is_some() {
                    return false;
                }
            }
        }
        Direction::ALL.iter().any(|direction| {
            if !allowed_direction(piece, *direction) {
                return false;
            }
            let projected = if mv.is_jump() {
                direction.jump_from(mv.start)
            } else {
                direction.step_from(mv.start)
            };
            projected == mv.end
        })
    }

    /// All legal partial moves from a square: steps first (skipped when
    /// `only_jumps`), then jumps, each pass in the fixed direction order.
    pub fn partial_moves_from(&self, square: Square, only_jumps: bool) -> Vec<Move> {
        self.partial_moves(square, only_jumps, self.forced)
    }

    fn partial_moves(&self, square: Square, only_jumps: bool, forced: Option<Square>) -> Vec<Move> {
        let mut moves = Vec::new();
        if self.board.piece_at(square).is_none() {
            return moves;
        }
        if !only_jumps {
            for direction in Direction::ALL {
                let candidate = Move::new(square, direction.step_from(square));
                if self.legal_partial_move(candidate, forced) {
                    moves.push(candidate);
                }
            }
        }
        for direction in Direction::ALL {
            let candidate = Move::new(square, direction.jump_from(square));
            if self.legal_partial_move(candidate, forced) {
                moves.push(candidate);
            }
        }
        moves
    }

    /// Apply a legal partial move: capture removal, relocation, crowning,
    /// then either force the moved piece to keep jumping or flip the
    /// turn. Crowning happens before the continuation check, so a piece
    /// crowned mid-chain continues under crowned direction rules.
    ///
    /// Callers must validate with `is_legal_partial_move` first.
    pub fn apply_move(&mut self, mv: Move) -> Result<()> {
        let was_jump = match mv.captured_square() {
            Some(captured) => {
                self.board.remove(captured)?;
                true
            }
            None => false,
        };
        self.board.relocate(mv.start, mv.end)?;
        self.crown_on_far_row(mv.end);
        if was_jump {
            self.forced = Some(mv.end);
            if !self.partial_moves(mv.end, true, self.forced).is_empty() {
                return Ok(());
            }
        }
        self.forced = None;
        self.turn = self.turn.opponent();
        Ok(())
    }

    fn crown_on_far_row(&mut self, square: Square) {
        if let Some(piece) = self.board.piece_at_mut(square) {
            if crowning_row(piece.owner) == Some(square.row) {
                piece.crowned = true;
            }
        }
    }

    /// Verdict on the current position. A side with no pieces or with no
    /// mobile piece loses; both sides immobile is a draw. Mobility here
    /// judges the board alone and ignores any pending forced
    /// continuation.
    ///
    /// Panics if a placed piece has no player owner; that can only mean
    /// the board was corrupted.
    pub fn outcome(&self) -> Outcome {
        let mut red_pieces = 0usize;
        let mut white_pieces = 0usize;
        for piece in self.board.pieces() {
            match piece.owner {
                Red => red_pieces += 1,
                White => white_pieces += 1,
                owner => panic!("piece {} has no player owner: {:?}", piece.id, owner),
            }
        }
        if red_pieces == 0 {
            return Outcome::WhiteWins;
        }
        if white_pieces == 0 {
            return Outcome::RedWins;
        }
        match (self.side_can_move(Red), self.side_can_move(White)) {
            (false, false) => Outcome::Draw,
            (false, true) => Outcome::WhiteWins,
            (true, false) => Outcome::RedWins,
            (true, true) => Outcome::Undecided,
        }
    }

    fn side_can_move(&self, side: Side) -> bool {
        self.board
            .pieces()
            .filter(|piece| piece.owner == side)
            .any(|piece| !self.partial_moves(piece.square, false, None).is_empty())
    }
}

/// crowned pieces move along all four diagonals, uncrowned only forward:
/// Red toward row 0, White toward row 7
fn allowed_direction(piece: &Piece, direction: Direction) -> bool {
    if piece.crowned {
        return true;
    }
    match piece.owner {
        Red => matches!(direction, Direction::DownLeft | Direction::DownRight),
        White => matches!(direction, Direction::UpLeft | Direction::UpRight),
        _ => false,
    }
}

fn crowning_row(side: Side) -> Option<i8> {
    match side {
        Red => Some(0),
        White => Some(7),
        _ => None,
    }
}
