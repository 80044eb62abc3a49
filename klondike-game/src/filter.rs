use crate::moves::Move;
use crate::pile::{STOCK, WASTE, is_tableau};

/// Returns true if `trial` cannot be part of a minimum solution.
///
/// Consider a move at time T0 from pile A to pile B, and the next move
/// from B, which goes to pile C at time Tn. The move at Tn is
/// redundant if the same result could have been had at T0 by moving
/// the same cards directly from A to C.
///
/// Looking back from Tn, B is the trial's from pile and C its to pile.
/// A candidate T0 move is one that moved to B. The two moves move the
/// same set of cards if no intervening move changed pile B and both
/// move the same number of cards; the direct A-to-C move was possible
/// at T0 if neither the candidate nor any intervening move changed
/// pile C. Since nothing says A cannot equal C, this also catches
/// moves that exactly reverse a previous move -- except that a flip of
/// a face-down card counts as a change of pile A, so unpiling a card
/// that flipped something stays allowed.
///
/// Moves out of the talon are never redundant this way.
pub fn abc_move(trial: Move, moves_made: &[Move]) -> bool {
    let b = trial.from();
    if b == STOCK || b == WASTE {
        return false;
    }
    let c = trial.to();
    for &mv in moves_made.iter().rev() {
        if mv.to() == b {
            // candidate T0 move
            if mv.from() == c {
                // If A = C and the A-to-B move flipped a tableau card
                // face up, then it changed C.
                if is_tableau(c) && mv.n_cards() == mv.from_up_count() {
                    return false;
                }
            }
            return mv.n_cards() == trial.n_cards();
        } else {
            // intervening move
            if mv.to() == c || mv.from() == c {
                return false; // trial move's to pile (C) has changed
            }
            if mv.from() == b {
                return false; // trial move's from pile (B) has changed
            }
        }
    }
    false
}

/// Generates available moves and drops the ones `abc_move` rejects.
pub fn filtered_available_moves(
    game: &crate::game::Game,
    moves_made: &[Move],
) -> crate::movegen::QMoves {
    let mut moves = game.available_moves();
    moves.retain(|mv| !abc_move(*mv, moves_made));
    moves
}
