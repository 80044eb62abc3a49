use std::fmt;

use crate::card::{Card, CardDeck, KING};
use crate::moves::{Move, XMove};
use crate::pile::{
    FOUNDATION_BASE, FOUNDATION_COUNT, PILE_COUNT, Pile, STOCK, TABLEAU_BASE, TABLEAU_COUNT, WASTE,
    is_tableau,
};

/// A talon look-ahead limit that never stops the look-ahead.
pub const FULL_LOOKAHEAD: usize = 24;

/// A Klondike game in progress.
///
/// All thirteen piles are owned in one array indexed by pile code, so a
/// move directive's `from` and `to` identify piles without pointers.
#[derive(Debug, Clone)]
pub struct Game {
    piles: [Pile; PILE_COUNT],
    deck: CardDeck,
    draw_setting: usize,
    talon_lookahead_limit: usize,
    recycle_limit: u32,
    recycle_count: u32,
    king_spaces: u32,
}

impl Game {
    pub fn new(deck: CardDeck, draw_setting: usize) -> Self {
        Self::with_limits(deck, draw_setting, FULL_LOOKAHEAD, u32::MAX)
    }

    pub fn with_limits(
        deck: CardDeck,
        draw_setting: usize,
        talon_lookahead_limit: usize,
        recycle_limit: u32,
    ) -> Self {
        debug_assert!(deck.len() == 52);
        debug_assert!((1..=12).contains(&draw_setting));
        let mut game = Game {
            piles: std::array::from_fn(|code| Pile::new(code as u8)),
            deck,
            draw_setting,
            talon_lookahead_limit,
            recycle_limit,
            recycle_count: 0,
            king_spaces: 0,
        };
        game.deal();
        game
    }

    #[inline]
    pub fn pile(&self, code: u8) -> &Pile {
        &self.piles[code as usize]
    }

    #[inline]
    pub fn waste(&self) -> &Pile {
        &self.piles[WASTE as usize]
    }

    #[inline]
    pub fn stock(&self) -> &Pile {
        &self.piles[STOCK as usize]
    }

    #[inline]
    pub fn tableau(&self) -> &[Pile] {
        &self.piles[TABLEAU_BASE as usize..TABLEAU_BASE as usize + TABLEAU_COUNT]
    }

    #[inline]
    pub fn foundation(&self) -> &[Pile] {
        &self.piles[FOUNDATION_BASE as usize..FOUNDATION_BASE as usize + FOUNDATION_COUNT]
    }

    #[inline]
    pub fn deck(&self) -> &CardDeck {
        &self.deck
    }

    #[inline]
    pub fn draw_setting(&self) -> usize {
        self.draw_setting
    }

    #[inline]
    pub fn talon_lookahead_limit(&self) -> usize {
        self.talon_lookahead_limit
    }

    #[inline]
    pub fn recycle_limit(&self) -> u32 {
        self.recycle_limit
    }

    #[inline]
    pub fn recycle_count(&self) -> u32 {
        self.recycle_count
    }

    /// The number of empty tableau piles.
    #[inline]
    pub fn king_spaces(&self) -> u32 {
        self.king_spaces
    }

    /// Deals the cards for Klondike Solitaire: 28 cards to the tableau
    /// in triangular fashion with each pile's top card turned up, the
    /// remaining 24 to the stock.
    pub fn deal(&mut self) {
        debug_assert!(self.deck.len() == 52);
        self.king_spaces = 0;
        self.recycle_count = 0;

        for pile in self.piles.iter_mut() {
            pile.clear();
        }

        let mut next = 0;
        for row in 0..TABLEAU_COUNT {
            for pile in row..TABLEAU_COUNT {
                let card = self.deck[next];
                next += 1;
                self.piles[TABLEAU_BASE as usize + pile].push(card);
            }
            self.piles[TABLEAU_BASE as usize + row].set_up_count(1);
        }
        for &card in self.deck[28..].iter().rev() {
            self.piles[STOCK as usize].push(card);
        }
    }

    pub fn game_over(&self) -> bool {
        self.foundation().iter().all(|pile| pile.len() == 13)
    }

    /// The height of the shortest foundation pile.
    pub fn min_foundation_size(&self) -> usize {
        self.foundation()
            .iter()
            .map(|pile| pile.len())
            .min()
            .unwrap_or(0)
    }

    fn pile_pair_mut(&mut self, a: u8, b: u8) -> (&mut Pile, &mut Pile) {
        let (a, b) = (a as usize, b as usize);
        debug_assert!(a != b);
        if a < b {
            let (left, right) = self.piles.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.piles.split_at_mut(a);
            (&mut right[0], &mut left[b])
        }
    }

    // Draws `n` cards from stock to waste; negative `n` sends cards back.
    fn advance_talon(&mut self, n: i32) {
        if n >= 0 {
            let (waste, stock) = self.pile_pair_mut(WASTE, STOCK);
            waste.draw_from(stock, n as usize);
        } else {
            let (stock, waste) = self.pile_pair_mut(STOCK, WASTE);
            stock.draw_from(waste, (-n) as usize);
        }
    }

    pub fn make_move(&mut self, mv: Move) {
        if mv.is_talon() {
            self.advance_talon(mv.draw());
            if mv.to() != WASTE {
                let to = mv.to();
                {
                    let (waste, to_pile) = self.pile_pair_mut(WASTE, to);
                    let card = waste.pop();
                    to_pile.push(card);
                }
                if is_tableau(to) {
                    let to_pile = &mut self.piles[to as usize];
                    to_pile.set_up_count(to_pile.up_count() + 1);
                    if to_pile.len() == 1 {
                        self.king_spaces -= 1;
                    }
                }
            }
            if mv.recycle() {
                self.recycle_count += 1;
            }
        } else {
            let (from, to, n) = (mv.from(), mv.to(), mv.n_cards());
            {
                let (from_pile, to_pile) = self.pile_pair_mut(from, to);
                to_pile.take_from(from_pile, n);
            }
            if is_tableau(to) {
                let to_pile = &mut self.piles[to as usize];
                to_pile.set_up_count(to_pile.up_count() + n);
                if to_pile.len() == n {
                    self.king_spaces -= 1;
                }
            }
            if is_tableau(from) {
                let from_pile = &mut self.piles[from as usize];
                let up = from_pile.up_count() - n;
                if from_pile.is_empty() {
                    from_pile.set_up_count(0);
                    self.king_spaces += 1;
                } else {
                    // flip the top card when the whole face-up run left
                    from_pile.set_up_count(up.max(1));
                }
            }
        }
    }

    /// Exactly reverses `make_move`, including the from pile's face-up
    /// count, which only the move's `from_up_count` field remembers
    /// across a flip.
    pub fn unmake_move(&mut self, mv: Move) {
        if mv.is_talon() {
            if mv.recycle() {
                self.recycle_count -= 1;
            }
            if mv.to() != WASTE {
                let to = mv.to();
                if is_tableau(to) {
                    let to_pile = &mut self.piles[to as usize];
                    to_pile.set_up_count(to_pile.up_count() - 1);
                    if to_pile.len() == 1 {
                        self.king_spaces += 1;
                    }
                }
                let (waste, to_pile) = self.pile_pair_mut(WASTE, to);
                let card = to_pile.pop();
                waste.push(card);
            }
            self.advance_talon(-mv.draw());
        } else {
            let (from, to, n) = (mv.from(), mv.to(), mv.n_cards());
            if is_tableau(from) && self.piles[from as usize].is_empty() {
                self.king_spaces -= 1;
            }
            {
                let (from_pile, to_pile) = self.pile_pair_mut(from, to);
                from_pile.take_from(to_pile, n);
            }
            if is_tableau(from) {
                self.piles[from as usize].set_up_count(mv.from_up_count());
            }
            if is_tableau(to) {
                let to_pile = &mut self.piles[to as usize];
                to_pile.set_up_count(to_pile.up_count() - n);
                if to_pile.is_empty() {
                    self.king_spaces += 1;
                }
            }
        }
    }

    /// Applies one atomic playback move.
    pub fn make_xmove(&mut self, xmv: &XMove) {
        let (from, to, n) = (xmv.from, xmv.to, xmv.n_cards);
        {
            let (from_pile, to_pile) = self.pile_pair_mut(from, to);
            if from == STOCK || to == STOCK {
                to_pile.draw_from(from_pile, n);
            } else {
                to_pile.take_from(from_pile, n);
            }
        }
        if is_tableau(from) {
            let from_pile = &mut self.piles[from as usize];
            if from_pile.is_empty() {
                from_pile.set_up_count(0);
                self.king_spaces += 1;
            } else {
                let up = from_pile.up_count() - n;
                from_pile.set_up_count(if xmv.flip { 1 } else { up });
            }
        }
        if is_tableau(to) {
            let to_pile = &mut self.piles[to as usize];
            to_pile.set_up_count(to_pile.up_count() + n);
            if to_pile.len() == n {
                self.king_spaces -= 1;
            }
        }
    }

    /// A lower bound on the number of moves required to complete this
    /// game. After any single move directive `m`, the result decreases
    /// by at most `m.n_moves()`, so the bound is monotone: the sum of
    /// moves made and moves left never decreases along a line of play.
    ///
    /// The waste misorder term is counted only for a draw setting of 1;
    /// for larger settings it can jump by more than one per move, which
    /// would break monotonicity.
    pub fn minimum_moves_left(&self) -> usize {
        let draw = self.draw_setting;
        let stock_size = self.stock().len();
        let talon_count = self.waste().len() + stock_size;

        let mut result = talon_count + stock_size.div_ceil(draw);

        if draw == 1 {
            result += misorder_count(self.waste().cards());
        }

        for pile in self.tableau() {
            if !pile.is_empty() {
                let covered = (pile.down_count() + 1).min(pile.len());
                result += pile.len() + misorder_count(&pile.cards()[..covered]);
            }
        }
        result
    }

    /// True when no pile among the stock, waste, and tableau holds a
    /// card above a lower-ranked card. Every remaining card can then be
    /// exposed in foundation order, which is what lets an endgame play
    /// out in exactly `minimum_moves_left()` moves.
    pub fn piles_in_rank_order(&self) -> bool {
        sorted_back_to_front(self.stock().cards())
            && sorted_back_to_front(self.waste().cards())
            && self.tableau().iter().all(|p| sorted_back_to_front(p.cards()))
    }

    /// Checks a move directive against the current position: the moved
    /// card must exist and be playable on its destination.
    pub fn is_valid(&self, mv: Move) -> bool {
        if mv.is_talon() {
            let draw = mv.draw();
            if mv.to() == WASTE {
                // pure draw
                return draw > 0 && draw as usize <= self.stock().len();
            }
            if draw > 0 {
                self.valid(STOCK, mv.to(), draw as usize)
            } else {
                // after un-drawing, the waste top is this far down today
                self.valid(WASTE, mv.to(), (1 - draw) as usize)
            }
        } else {
            self.valid(mv.from(), mv.to(), mv.n_cards())
        }
    }

    fn valid(&self, from: u8, to: u8, which: usize) -> bool {
        if from as usize >= PILE_COUNT || to as usize >= PILE_COUNT {
            return false;
        }
        let from_pile = self.pile(from);
        let to_pile = self.pile(to);
        if which == 0 || which > from_pile.len() {
            return false;
        }
        let cover = from_pile.card(from_pile.len() - which);
        if to_pile.is_tableau() {
            if to_pile.is_empty() {
                cover.rank() == KING
            } else {
                cover.covers(to_pile.back())
            }
        } else if to_pile.is_foundation() {
            cover.suit() == to - FOUNDATION_BASE && cover.rank() as usize == to_pile.len()
        } else {
            true
        }
    }
}

// Counts the cards lying above a lower card of the same suit. Pile tops
// are at the back of the slice.
fn misorder_count(cards: &[Card]) -> usize {
    let mut mins = [KING + 2; 4];
    let mut result = 0;
    for card in cards {
        let rank = card.rank();
        let suit = card.suit() as usize;
        if rank < mins[suit] {
            mins[suit] = rank;
        } else {
            result += 1;
        }
    }
    result
}

fn sorted_back_to_front(cards: &[Card]) -> bool {
    cards.windows(2).all(|w| w[0].rank() >= w[1].rank())
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pile in &self.piles {
            write!(f, "{}:", crate::pile::PILE_NAMES[pile.code() as usize])?;
            for (i, card) in pile.cards().iter().enumerate() {
                let sep = if pile.is_tableau() && i == pile.down_count() {
                    '|'
                } else {
                    ' '
                };
                write!(f, "{}{}", sep, card.as_string())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::parse_deck;
    use crate::pile::FOUNDATION_BASE;

    const DECK: &str = "sq c5 s5 ha c9 ca s6 cq s8 ck dt d3 c8 \
                        h3 dk s3 dj sk c7 h8 h4 c6 hj c4 sj da \
                        st c2 d8 dq s7 d6 ct s2 cj d7 ht hk d2 \
                        h2 h9 s9 h5 h7 c3 d4 h6 sa s4 hq d9 d5";

    #[test]
    fn test_deal() {
        let deck = parse_deck(DECK).unwrap();
        let game = Game::new(deck.clone(), 1);

        assert_eq!(game.tableau()[5].len(), 6);
        assert_eq!(game.stock().card(0).as_string(), "d5");
        assert_eq!(game.tableau()[6].card(6), deck[27]);
        assert_eq!(game.tableau()[6].card(5), deck[26]);
        assert_eq!(game.tableau()[5].card(5), deck[25]);
        assert_eq!(game.tableau()[5].up_count(), 1);
        assert_eq!(game.stock().len(), 24);
        assert_eq!(game.king_spaces(), 0);
    }

    #[test]
    fn test_make_move() {
        let deck = parse_deck(DECK).unwrap();
        let mut game = Game::new(deck, 1);

        game.make_move(Move::new(TABLEAU_BASE, TABLEAU_BASE + 1, 1, 1));
        assert_eq!(game.tableau()[0].len(), 0);
        assert_eq!(game.tableau()[1].len(), 3);
        assert_eq!(game.tableau()[0].up_count(), 0);
        assert_eq!(game.tableau()[1].up_count(), 2);
        assert_eq!(game.king_spaces(), 1);

        // Draw 4, then move the new waste top to the diamonds pile.
        game.make_move(Move::talon(FOUNDATION_BASE + 1, 4, 4));
        assert_eq!(game.stock().len(), 20);
        assert_eq!(game.waste().len(), 3);
        assert_eq!(game.foundation()[1].back().as_string(), "d6");
        assert_eq!(game.waste().back().as_string(), "s7");
        assert_eq!(game.stock().back().as_string(), "ct");

        game.make_move(Move::new(WASTE, TABLEAU_BASE, 1, 0));
        assert_eq!(game.tableau()[0].up_count(), 1);
        assert_eq!(game.king_spaces(), 0);
    }

    #[test]
    fn test_unmake_restores_flip() {
        let deck = parse_deck(DECK).unwrap();
        let mut game = Game::new(deck, 1);
        let before = game.clone();

        // Moving tableau 2's only up card flips the face-down card
        // under it; unmaking must put the flip back.
        let mv = Move::new(TABLEAU_BASE + 1, TABLEAU_BASE + 4, 1, 1);
        game.make_move(mv);
        assert_eq!(game.tableau()[1].up_count(), 1);
        assert_eq!(game.tableau()[1].len(), 1);
        game.unmake_move(mv);
        assert_eq!(game.tableau()[1].up_count(), 1);
        assert_eq!(game.tableau()[1].len(), 2);
        assert_eq!(format!("{before}"), format!("{game}"));
    }

    #[test]
    fn test_misorder_count() {
        let cards: Vec<Card> = ["c4", "c5", "h2", "c6"]
            .iter()
            .map(|s| Card::parse(s).unwrap())
            .collect();
        // c5 lies above the lower c4: one misorder; c6 is another.
        assert_eq!(misorder_count(&cards[..2]), 1);
        assert_eq!(misorder_count(&cards), 2);
        assert_eq!(misorder_count(&[]), 0);
    }

    #[test]
    fn test_minimum_moves_left_on_deal() {
        let deck = parse_deck(DECK).unwrap();
        let game = Game::new(deck, 1);
        // At least one move per talon card, one draw per stock card,
        // and one move per tableau card.
        assert!(game.minimum_moves_left() >= 24 + 24 + 28);
    }
}
