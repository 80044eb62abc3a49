//! The Klondike Solitaire game model: cards, piles, moves, the
//! selective available-move generator, the redundant-move filter, and
//! the lower bound on moves remaining. Solvers are built on top of
//! these objects.
//!
//! The stock and waste piles considered as a single entity are called
//! the talon. A single solver-level [`Move`] around the talon stands
//! for several actual moves; [`move_count`] and [`expand_moves`]
//! account for that.

mod card;
mod filter;
mod game;
mod movegen;
mod moves;
mod pile;

pub use crate::card::{
    ACE, Card, CardDeck, CLUBS, DIAMONDS, HEARTS, KING, RANK_CHARS, SPADES, SUIT_CHARS,
    numbered_deal, parse_deck,
};
pub use crate::filter::{abc_move, filtered_available_moves};
pub use crate::game::{FULL_LOOKAHEAD, Game};
pub use crate::movegen::QMoves;
pub use crate::moves::{Move, XMove, expand_moves, format_moves, move_count};
pub use crate::pile::{
    FOUNDATION_BASE, FOUNDATION_COUNT, MAX_PILE, PILE_COUNT, PILE_NAMES, Pile, STOCK,
    TABLEAU_BASE, TABLEAU_COUNT, WASTE, is_foundation, is_tableau,
};
