use smallvec::SmallVec;

use crate::card::Card;

// Pile codes. Every pile a game owns is addressed by one of these
// small integers; nothing else identifies a pile.
pub const WASTE: u8 = 0;
pub const TABLEAU_BASE: u8 = 1;
pub const STOCK: u8 = 8;
pub const FOUNDATION_BASE: u8 = 9;

pub const TABLEAU_COUNT: usize = 7;
pub const FOUNDATION_COUNT: usize = 4;
pub const PILE_COUNT: usize = 13;

// No pile ever holds more than the stock's 24 cards.
pub const MAX_PILE: usize = 24;

#[inline]
pub fn is_tableau(code: u8) -> bool {
    (TABLEAU_BASE..TABLEAU_BASE + TABLEAU_COUNT as u8).contains(&code)
}

#[inline]
pub fn is_foundation(code: u8) -> bool {
    (FOUNDATION_BASE..FOUNDATION_BASE + FOUNDATION_COUNT as u8).contains(&code)
}

pub const PILE_NAMES: [&str; PILE_COUNT] = [
    "wa", "t1", "t2", "t3", "t4", "t5", "t6", "t7", "st", "cb", "di", "sp", "ht",
];

/// An ordered pile of cards. The back of the pile is its top.
///
/// `up_count` is the number of face-up cards at the top and is
/// meaningful for tableau piles only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pile {
    code: u8,
    up_count: usize,
    cards: SmallVec<[Card; MAX_PILE]>,
}

impl Pile {
    pub fn new(code: u8) -> Self {
        Pile {
            code,
            up_count: 0,
            cards: SmallVec::new(),
        }
    }

    #[inline]
    pub fn code(&self) -> u8 {
        self.code
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[inline]
    pub fn is_tableau(&self) -> bool {
        is_tableau(self.code)
    }

    #[inline]
    pub fn is_foundation(&self) -> bool {
        is_foundation(self.code)
    }

    #[inline]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[inline]
    pub fn card(&self, index: usize) -> Card {
        self.cards[index]
    }

    /// The top card. Panics on an empty pile.
    #[inline]
    pub fn back(&self) -> Card {
        self.cards[self.cards.len() - 1]
    }

    /// The bottom face-up card. Panics unless `up_count` is valid.
    #[inline]
    pub fn first_up(&self) -> Card {
        self.cards[self.cards.len() - self.up_count]
    }

    #[inline]
    pub fn up_count(&self) -> usize {
        self.up_count
    }

    #[inline]
    pub fn down_count(&self) -> usize {
        self.cards.len() - self.up_count
    }

    #[inline]
    pub fn set_up_count(&mut self, up_count: usize) {
        self.up_count = up_count;
    }

    #[inline]
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    #[inline]
    pub fn pop(&mut self) -> Card {
        self.cards.pop().unwrap()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.up_count = 0;
    }

    /// Moves the last `n` cards of `from` onto this pile, preserving
    /// their order.
    pub fn take_from(&mut self, from: &mut Pile, n: usize) {
        let split = from.cards.len() - n;
        self.cards.extend_from_slice(&from.cards[split..]);
        from.cards.truncate(split);
    }

    /// Draws `n` cards from `from` one at a time, so that they arrive
    /// in reversed order. This is how stock and waste exchange cards.
    pub fn draw_from(&mut self, from: &mut Pile, n: usize) {
        for _ in 0..n {
            let card = from.pop();
            self.cards.push(card);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;

    fn pile_of(code: u8, cards: &[&str]) -> Pile {
        let mut pile = Pile::new(code);
        for s in cards {
            pile.push(Card::parse(s).unwrap());
        }
        pile
    }

    #[test]
    fn test_take_preserves_order() {
        let mut from = pile_of(TABLEAU_BASE, &["c4", "h9", "s8", "d7"]);
        let mut to = pile_of(TABLEAU_BASE + 1, &["c9"]);
        to.take_from(&mut from, 3);
        assert_eq!(from.len(), 1);
        assert_eq!(to.len(), 4);
        assert_eq!(to.back().as_string(), "d7");
        assert_eq!(to.card(1).as_string(), "h9");
    }

    #[test]
    fn test_draw_reverses_order() {
        let mut stock = pile_of(STOCK, &["c4", "h9", "s8"]);
        let mut waste = pile_of(WASTE, &[]);
        waste.draw_from(&mut stock, 3);
        assert_eq!(stock.len(), 0);
        assert_eq!(
            waste.cards().iter().map(|c| c.as_string()).collect::<Vec<_>>(),
            ["s8", "h9", "c4"]
        );
        // drawing back restores the original order
        stock.draw_from(&mut waste, 3);
        assert_eq!(
            stock.cards().iter().map(|c| c.as_string()).collect::<Vec<_>>(),
            ["c4", "h9", "s8"]
        );
    }

    #[test]
    fn test_first_up() {
        let mut pile = pile_of(TABLEAU_BASE, &["c4", "h9", "s8", "d7"]);
        pile.set_up_count(2);
        assert_eq!(pile.first_up().as_string(), "s8");
        assert_eq!(pile.down_count(), 2);
    }
}
