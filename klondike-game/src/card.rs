use anyhow::{Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const CLUBS: u8 = 0;
pub const DIAMONDS: u8 = 1;
pub const SPADES: u8 = 2;
pub const HEARTS: u8 = 3;

pub const ACE: u8 = 0;
pub const KING: u8 = 12;

pub const SUIT_CHARS: [char; 4] = ['c', 'd', 's', 'h'];
pub const RANK_CHARS: [char; 13] = [
    'a', '2', '3', '4', '5', '6', '7', '8', '9', 't', 'j', 'q', 'k',
];

/// A playing card, packed as `4 * rank + suit`.
///
/// Suits order clubs, diamonds, spades, hearts; ranks run ace (0) to
/// king (12). Spades and hearts are the "major" suits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card(u8);

impl Card {
    pub fn new(suit: u8, rank: u8) -> Self {
        debug_assert!(suit < 4 && rank <= KING);
        Card(4 * rank + suit)
    }

    pub fn from_value(value: u8) -> Self {
        debug_assert!(value < 52);
        Card(value)
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn suit(self) -> u8 {
        self.0 % 4
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.0 / 4
    }

    #[inline]
    pub fn is_major(self) -> bool {
        self.suit() >> 1 != 0
    }

    /// True for cards that fit on tableau stacks whose odd-rank cards are red.
    #[inline]
    pub fn odd_red(self) -> bool {
        (self.rank() ^ self.suit()) & 1 != 0
    }

    #[inline]
    pub fn is_red(self) -> bool {
        self.suit() & 1 != 0
    }

    /// Can this card be laid on `other` in a tableau pile?
    #[inline]
    pub fn covers(self, other: Card) -> bool {
        self.odd_red() == other.odd_red() && self.rank() + 1 == other.rank()
    }

    /// Renders suit then rank, e.g. "d7" or "st".
    pub fn as_string(self) -> String {
        let mut s = String::with_capacity(2);
        s.push(SUIT_CHARS[self.suit() as usize]);
        s.push(RANK_CHARS[self.rank() as usize]);
        s
    }

    /// Parses a string like "ah", "s8", "D10", or "tc" ("10" equals "t").
    /// The suit may come before or after the rank, in either case.
    /// Characters that cannot appear in a valid card string are ignored.
    pub fn parse(s: &str) -> Result<Card> {
        let filtered: String = s
            .chars()
            .map(|c| c.to_ascii_lowercase())
            .filter(|c| SUIT_CHARS.contains(c) || RANK_CHARS.contains(c) || *c == '1' || *c == '0')
            .collect();
        if filtered.len() != 2 && filtered.len() != 3 {
            bail!("Invalid card '{s}'");
        }
        let first = filtered.chars().next().unwrap();
        let last = filtered.chars().next_back().unwrap();
        let (suit, rank_str) = if let Some(suit) = SUIT_CHARS.iter().position(|&c| c == first) {
            (suit, &filtered[1..])
        } else if let Some(suit) = SUIT_CHARS.iter().position(|&c| c == last) {
            (suit, &filtered[..filtered.len() - 1])
        } else {
            bail!("Invalid card '{s}'");
        };
        let rank_str = if rank_str == "10" { "t" } else { rank_str };
        if rank_str.len() != 1 {
            bail!("Invalid card '{s}'");
        }
        let rank_char = rank_str.chars().next().unwrap();
        match RANK_CHARS.iter().position(|&c| c == rank_char) {
            Some(rank) => Ok(Card::new(suit as u8, rank as u8)),
            None => bail!("Invalid card '{s}'"),
        }
    }
}

pub type CardDeck = Vec<Card>;

/// Deals a deck from a seed, reproducibly on every target.
///
/// Each position in a sorted deck is swapped with a uniformly random one.
/// Any given seed always produces the same deck, but the decks do not
/// match those of other solvers' seeded shuffles.
pub fn numbered_deal(seed: u32) -> CardDeck {
    let mut deck: CardDeck = (0..52).map(Card::from_value).collect();
    let mut rng = StdRng::seed_from_u64(seed as u64);
    for i in 0..52 {
        let j = rng.random_range(0..52);
        deck.swap(i, j);
    }
    deck
}

/// Parses a whitespace- or comma-separated list of 52 card strings into
/// a deck, rejecting duplicates.
pub fn parse_deck(s: &str) -> Result<CardDeck> {
    let mut deck = CardDeck::with_capacity(52);
    let mut used = [false; 52];
    for token in s.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }
        let card = Card::parse(token)?;
        if used[card.value() as usize] {
            bail!("The {} appears twice", card.as_string());
        }
        used[card.value() as usize] = true;
        deck.push(card);
    }
    if deck.len() != 52 {
        bail!("Only {} cards found in input string", deck.len());
    }
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_basics() {
        let card = Card::new(HEARTS, 2);
        assert_eq!(card.as_string(), "h3");

        let card = Card::parse("S10").unwrap();
        assert_eq!(card.as_string(), "st");

        let card = Card::parse("7d").unwrap();
        assert_eq!(card.as_string(), "d7");
        assert!(card.odd_red());
        assert_eq!(card.value(), 25);
        assert!(!card.is_major());

        assert!(Card::parse("x5").is_err());
        assert!(Card::parse("hh").is_err());
        assert!(Card::parse("").is_err());
    }

    #[test]
    fn test_covers() {
        // 6s goes on 7d or 7h, not on 7c or 8d
        let six_spades = Card::parse("s6").unwrap();
        assert!(six_spades.covers(Card::parse("d7").unwrap()));
        assert!(six_spades.covers(Card::parse("h7").unwrap()));
        assert!(!six_spades.covers(Card::parse("c7").unwrap()));
        assert!(!six_spades.covers(Card::parse("d8").unwrap()));
    }

    #[test]
    fn test_numbered_deal() {
        let deck = numbered_deal(174985);
        assert_eq!(deck.len(), 52);
        let mut values: Vec<u8> = deck.iter().map(|c| c.value()).collect();
        values.sort_unstable();
        assert_eq!(values, (0..52).collect::<Vec<u8>>());
        // reproducible
        assert_eq!(deck, numbered_deal(174985));
        assert_ne!(deck, numbered_deal(174986));
    }

    #[test]
    fn test_parse_deck() {
        let deck: String = (0..52)
            .map(|v| Card::from_value(v).as_string())
            .collect::<Vec<_>>()
            .join(" ");
        let deck = parse_deck(&deck).unwrap();
        assert_eq!(deck.len(), 52);

        assert!(parse_deck("ca ca").is_err());
        assert!(parse_deck("ca cb").is_err());
    }
}
