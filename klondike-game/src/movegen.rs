use smallvec::SmallVec;

use crate::card::{Card, KING};
use crate::game::Game;
use crate::moves::Move;
use crate::pile::{FOUNDATION_BASE, STOCK, WASTE};

pub type QMoves = SmallVec<[Move; 64]>;

/// A card that some number of draws (and possibly a recycle) would
/// expose on top of the waste pile.
#[derive(Debug, Clone, Copy)]
struct TalonFuture {
    card: Card,
    n_moves: usize,
    draw_count: i32,
    recycle: bool,
}

// Simulates draws and recycles of the talon without touching any cards.
struct TalonSim {
    waste: usize,
    stock: usize,
}

impl TalonSim {
    fn draw(&mut self, n: usize) {
        let n = n.min(self.stock);
        self.waste += n;
        self.stock -= n;
    }

    fn cycle(&mut self) {
        self.stock += self.waste;
        self.waste = 0;
    }
}

impl Game {
    /// If any short-foundation moves exist, returns one of those.
    /// Otherwise, returns the legal moves not known to be wasted.
    /// Rather than generating individual draws from stock to waste, it
    /// generates moves that represent one or more draws exposing a
    /// playable waste card, and then play that card.
    pub fn available_moves(&self) -> QMoves {
        let mut moves = QMoves::new();

        let min_foundation = self.min_foundation_size();
        if min_foundation == 13 {
            return moves; // game over
        }
        self.moves_to_short_foundation(&mut moves, min_foundation);
        if !moves.is_empty() {
            return moves;
        }

        self.moves_from_tableau(&mut moves);
        // moves_from_talon returns true when it found a short-foundation
        // move and no other move had been found.
        if !self.moves_from_talon(&mut moves, min_foundation) {
            self.moves_from_foundation(&mut moves, min_foundation);
        }
        moves
    }

    // Looks in the waste, the tableau tops, and (for draw setting 1) the
    // top of the stock for a card that can go to a foundation pile than
    // which no foundation pile is more than one card shorter. Appends at
    // most one such move.
    //
    // Such a move is dominant: if the game can be won from this
    // position, some minimum sequence starts with it.
    fn moves_to_short_foundation(&self, moves: &mut QMoves, min_foundation: usize) {
        let end = if self.draw_setting() == 1 { STOCK } else { STOCK - 1 };
        for code in WASTE..=end {
            if !moves.is_empty() {
                return;
            }
            let pile = self.pile(code);
            if pile.is_empty() {
                continue;
            }
            let card = pile.back();
            let suit = card.suit();
            if card.rank() as usize <= min_foundation + 1
                && self.foundation()[suit as usize].len() == card.rank() as usize
            {
                if code == STOCK {
                    // Talon move: draw one card, play it on its foundation.
                    moves.push(Move::talon(FOUNDATION_BASE + suit, 2, 1));
                } else {
                    let up = if code == WASTE {
                        0
                    } else {
                        pile.up_count()
                    };
                    moves.push(Move::new(code, FOUNDATION_BASE + suit, 1, up));
                }
            }
        }
    }

    // Appends the available moves out of tableau piles. Moves between
    // tableau piles are emitted only to
    // (a) move all the face-up cards and
    //     (1) flip a face-down card, or
    //     (2) make an empty pile while a king can use one, or
    // (b) uncover a face-up card that can go to its foundation pile.
    fn moves_from_tableau(&self, moves: &mut QMoves) {
        for from_pile in self.tableau() {
            if from_pile.is_empty() {
                continue;
            }

            let from_tip = from_pile.back();
            let from_base = from_pile.first_up();
            let up_count = from_pile.up_count();

            let foundation = &self.foundation()[from_tip.suit() as usize];
            if foundation.len() == from_tip.rank() as usize {
                moves.push(Move::new(
                    from_pile.code(),
                    foundation.code(),
                    1,
                    up_count,
                ));
            }

            let mut king_moved = false; // move a king to only one space
            for to_pile in self.tableau() {
                if from_pile.code() == to_pile.code() {
                    continue;
                }

                if to_pile.is_empty() {
                    if !king_moved
                        && from_base.rank() == KING
                        && from_pile.len() > up_count
                    {
                        // A king tops this pile's face-up run and covers
                        // at least one face-down card.
                        moves.push(Move::new(
                            from_pile.code(),
                            to_pile.code(),
                            up_count,
                            up_count,
                        ));
                        king_moved = true;
                    }
                    continue;
                }

                let card_to_cover = to_pile.back();
                let to_rank = card_to_cover.rank();
                if from_tip.rank() < to_rank
                    && to_rank <= from_base.rank() + 1
                    && from_tip.odd_red() == card_to_cover.odd_red()
                {
                    // Some face-up card in the from pile goes on the to
                    // pile's top card.
                    let move_count = (to_rank - from_tip.rank()) as usize;
                    debug_assert!(move_count <= up_count);
                    if move_count == up_count
                        && (up_count < from_pile.len() || self.need_king_space())
                    {
                        debug_assert!(from_base.covers(card_to_cover));
                        moves.push(Move::new(
                            from_pile.code(),
                            to_pile.code(),
                            up_count,
                            up_count,
                        ));
                    } else if move_count < up_count || up_count < from_pile.len() {
                        let uncovered = from_pile.card(from_pile.len() - move_count - 1);
                        if self.foundation()[uncovered.suit() as usize].len()
                            == uncovered.rank() as usize
                        {
                            moves.push(Move::new(
                                from_pile.code(),
                                to_pile.code(),
                                move_count,
                                up_count,
                            ));
                        }
                    }
                }
            }
        }
    }

    // True when some king could use an empty tableau pile: a king that
    // is neither finished on a foundation nor already at the base of a
    // tableau pile.
    fn need_king_space(&self) -> bool {
        let mut placed = self
            .foundation()
            .iter()
            .filter(|pile| pile.len() == 13)
            .count();
        placed += self
            .tableau()
            .iter()
            .filter(|pile| !pile.is_empty() && pile.card(0).rank() == KING)
            .count();
        placed < 4
    }

    // The card currently at 1-based waste position `waste_size`, were
    // the talon advanced to that size.
    fn talon_card_at(&self, waste_size: usize) -> Card {
        let waste = self.waste();
        if waste_size <= waste.len() {
            waste.card(waste_size - 1)
        } else {
            let stock = self.stock();
            stock.card(stock.len() - (waste_size - waste.len()))
        }
    }

    // Enumerates the cards that draws and at most one recycle would
    // expose on the waste pile, with the number of moves and the signed
    // draw count needed to expose each.
    fn talon_cards(&self) -> SmallVec<[TalonFuture; 24]> {
        let mut result = SmallVec::new();
        if self.waste().len() + self.stock().len() == 0 {
            return result;
        }

        let mut talon = TalonSim {
            waste: self.waste().len(),
            stock: self.stock().len(),
        };
        let original_waste = talon.waste;
        let draw_setting = self.draw_setting();
        let mut n_moves = 0usize;
        let mut n_recycles = 0u32;
        let max_recycles = 1u32.min(self.recycle_limit() - self.recycle_count());

        loop {
            if talon.waste > 0 {
                result.push(TalonFuture {
                    card: self.talon_card_at(talon.waste),
                    n_moves,
                    draw_count: talon.waste as i32 - original_waste as i32,
                    recycle: n_recycles > 0,
                });
            }
            if talon.stock > 0 {
                n_moves += 1;
                talon.draw(draw_setting);
            } else {
                n_recycles += 1;
                talon.cycle();
            }
            if talon.waste == original_waste || n_recycles > max_recycles {
                break;
            }
        }
        result
    }

    // Appends the available moves of cards that draws would expose on
    // the waste pile. Returns true if its one move is a dominant
    // short-foundation play.
    fn moves_from_talon(&self, moves: &mut QMoves, min_foundation: usize) -> bool {
        for future in self.talon_cards() {
            // Stop generating talon moves once they require too many
            // draws and alternatives exist. The ungenerated moves get
            // their chance later if the search gets that far.
            if moves.len() > 1 && future.n_moves > self.talon_lookahead_limit() {
                break;
            }

            let suit = future.card.suit();
            let rank = future.card.rank();
            if self.foundation()[suit as usize].len() == rank as usize {
                push_talon_move(moves, &future, FOUNDATION_BASE + suit);
                if rank as usize <= min_foundation + 1 {
                    if self.draw_setting() == 1 {
                        if moves.len() == 1 {
                            return true;
                        }
                        break; // best among the remaining talon cards
                    } else {
                        continue; // best move for this card, but keep looking
                    }
                }
            }

            for t_pile in self.tableau() {
                if !t_pile.is_empty() {
                    if future.card.covers(t_pile.back()) {
                        push_talon_move(moves, &future, t_pile.code());
                    }
                } else if rank == KING {
                    push_talon_move(moves, &future, t_pile.code());
                    break; // move that king to just one empty pile
                }
            }
        }
        false
    }

    // Appends moves from foundation piles back to the tableau. Cards a
    // short foundation pile might soon need stay where they are.
    fn moves_from_foundation(&self, moves: &mut QMoves, min_foundation: usize) {
        for f_pile in self.foundation() {
            if f_pile.len() <= min_foundation + 1 {
                continue;
            }
            let top = f_pile.back();
            for t_pile in self.tableau() {
                if !t_pile.is_empty() {
                    if top.covers(t_pile.back()) {
                        moves.push(Move::new(f_pile.code(), t_pile.code(), 1, 0));
                    }
                } else if top.rank() == KING {
                    moves.push(Move::new(f_pile.code(), t_pile.code(), 1, 0));
                    break; // don't move the same king to another space
                }
            }
        }
    }
}

fn push_talon_move(moves: &mut QMoves, future: &TalonFuture, to: u8) {
    moves.push(
        Move::talon(to, future.n_moves + 1, future.draw_count).with_recycle(future.recycle),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::parse_deck;

    // The trivial deal plays out with nothing but dominant moves.
    const TRIVIAL: &str = "ca h2 d4 s5 s6 d7 h7 da c3 s4 h5 h6 \
                           s7 sa d3 h4 c6 c7 ha s3 c5 d6 c2 h3 \
                           d5 d2 c4 s2 c8 d8 s8 h8 c9 d9 s9 h9 \
                           ct dt st ht cj dj sj hj cq dq sq hq \
                           ck dk sk hk";

    #[test]
    fn test_dominant_move_is_single() {
        let game = Game::new(parse_deck(TRIVIAL).unwrap(), 1);
        // Aces are dealt face up; the generator returns exactly one move.
        let moves = game.available_moves();
        assert_eq!(moves.len(), 1);
        let mv = moves[0];
        assert!(crate::pile::is_foundation(mv.to()));
        assert_eq!(mv.n_cards(), 1);
    }

    #[test]
    fn test_dominant_cascade() {
        let mut game = Game::new(parse_deck(TRIVIAL).unwrap(), 1);
        // The four dealt-up aces play in pile order, one dominant move
        // at a time.
        for expected in ["t1>cbu1", "t2>diu1", "t3>spu1", "t4>htu1"] {
            let moves = game.available_moves();
            assert_eq!(moves.len(), 1);
            assert_eq!(moves[0].to_string(), expected);
            game.make_move(moves[0]);
        }
    }

    #[test]
    fn test_talon_cards_draw1() {
        let game = Game::new(parse_deck(TRIVIAL).unwrap(), 1);
        let futures = game.talon_cards();
        // All 24 stock cards become reachable, one draw apiece.
        assert_eq!(futures.len(), 24);
        assert_eq!(futures[0].n_moves, 1);
        assert_eq!(futures[0].draw_count, 1);
        assert_eq!(futures[23].n_moves, 24);
        assert_eq!(futures[23].draw_count, 24);
        assert!(futures.iter().all(|f| !f.recycle));
    }

    #[test]
    fn test_talon_cards_respects_recycle_limit() {
        let mut game = Game::with_limits(parse_deck(TRIVIAL).unwrap(), 3, 24, 0);
        // Draw twice so the waste holds cards to recycle for.
        game.make_move(Move::talon(WASTE, 1, 3));
        game.make_move(Move::talon(WASTE, 1, 3));
        let reachable = game.talon_cards().len();

        let mut unlimited = Game::with_limits(parse_deck(TRIVIAL).unwrap(), 3, 24, 1);
        unlimited.make_move(Move::talon(WASTE, 1, 3));
        unlimited.make_move(Move::talon(WASTE, 1, 3));
        // With a recycle allowed, cards behind the current waste top
        // become reachable again.
        assert!(unlimited.talon_cards().len() > reachable);
    }
}
