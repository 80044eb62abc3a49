use anyhow::{Context, Result, bail};
use klondike_game::{Card, CardDeck, numbered_deal, parse_deck};

// Deal positions in the order a Pysol layout lists cards: the 24 talon
// cards first, then each tableau pile bottom-up.
const PYSOL_ORDER: [usize; 52] = [
    28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50,
    51, 0, 1, 7, 2, 8, 13, 3, 9, 14, 18, 4, 10, 15, 19, 22, 5, 11, 16, 20, 23, 25, 6, 12, 17, 21,
    24, 26, 27,
];

// In reversed Pysol, each pile's cards come in the order a player would
// discover them.
const REVERSED_PYSOL_ORDER: [usize; 52] = [
    28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50,
    51, 0, 7, 1, 13, 8, 2, 18, 14, 9, 3, 22, 19, 15, 10, 4, 25, 23, 20, 16, 11, 5, 27, 26, 24,
    21, 17, 12, 6,
];

/// Parses the numeric deck format: 52 three-character codes, a rank
/// from "01" to "13" followed by a suit digit (1 clubs, 2 diamonds,
/// 4 spades, 3 hearts).
pub fn parse_numeric_deck(s: &str) -> Result<CardDeck> {
    let s = s.trim();
    if s.len() < 156 {
        bail!(
            "Card string must be at least 156 bytes long. This one is {} bytes long.",
            s.len()
        );
    }
    const SUIT_DIGITS: [char; 4] = ['1', '2', '4', '3'];
    let mut deck = CardDeck::with_capacity(52);
    let mut used = [false; 52];
    for i in 0..52 {
        let code = &s[i * 3..i * 3 + 3];
        let context = || format!("Invalid card code '{code}'");
        let rank: usize = code[..2].parse().with_context(context)?;
        if !(1..=13).contains(&rank) {
            bail!("Invalid card code '{code}'");
        }
        let suit_digit = code.chars().nth(2).unwrap();
        let suit = SUIT_DIGITS
            .iter()
            .position(|&c| c == suit_digit)
            .with_context(context)?;
        let card = Card::new(suit as u8, (rank - 1) as u8);
        if used[card.value() as usize] {
            bail!("The {} appears twice", card.as_string());
        }
        used[card.value() as usize] = true;
        deck.push(card);
    }
    Ok(deck)
}

/// Parses a Pysol layout: a "Talon:" line of 24 cards and seven pile
/// lines. With `reversed`, the pile cards are listed in the order a
/// player would discover them ("nolaT").
pub fn parse_pysol(s: &str, reversed: bool) -> Result<CardDeck> {
    let order = if reversed {
        &REVERSED_PYSOL_ORDER
    } else {
        &PYSOL_ORDER
    };
    let mut deck = vec![Card::new(0, 0); 52];
    let mut used = [false; 52];
    let body = s.get(7..).unwrap_or(""); // skip "Talon: " or "nolaT: "
    let mut count = 0;
    let mut chars = body.chars().peekable();
    while let Some(&c) = chars.peek() {
        if "<> \t\n\r:-".contains(c) {
            chars.next();
            continue;
        }
        let a = chars.next().unwrap();
        let Some(b) = chars.next() else { break };
        if count >= 52 {
            bail!("More than 52 cards in Pysol input");
        }
        let card = Card::parse(&format!("{a}{b}"))?;
        if used[card.value() as usize] {
            bail!("The {} appears twice", card.as_string());
        }
        used[card.value() as usize] = true;
        deck[order[count]] = card;
        count += 1;
    }
    if count < 52 {
        bail!("Only {count} cards found in input string");
    }
    Ok(deck)
}

/// Parses one deck argument: the numeric format if it leads with a
/// digit, otherwise a list of card strings.
pub fn parse_deck_arg(s: &str) -> Result<CardDeck> {
    match s.trim().chars().next() {
        Some(c) if c.is_ascii_digit() => parse_numeric_deck(s),
        _ => parse_deck(s),
    }
}

/// Loads every deal in a file. Blank lines and `#` comments are
/// skipped; "Talon:"/"nolaT:" open an eight-line Pysol block; "Game: N"
/// names a seeded deal; any other line holds one deck.
pub fn load_deals(content: &str) -> Result<Vec<CardDeck>> {
    let mut decks = Vec::new();
    let mut lines = content.lines();
    while let Some(line) = lines.next() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('T') || line.starts_with('t') || line.starts_with('n') {
            let reversed = line.starts_with('n');
            let mut block = String::from(line);
            for _ in 0..7 {
                if let Some(next) = lines.next() {
                    block.push('\n');
                    block.push_str(next);
                }
            }
            decks.push(parse_pysol(&block, reversed)?);
        } else if line.starts_with('G') || line.starts_with('g') {
            let seed = line
                .split_whitespace()
                .nth(1)
                .context("Missing game seed")?
                .parse::<u32>()
                .context("Invalid game seed")?;
            decks.push(numbered_deal(seed));
        } else {
            decks.push(parse_deck_arg(line)?);
        }
    }
    Ok(decks)
}
