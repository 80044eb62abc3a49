use klondike_game::{
    CLUBS, DIAMONDS, FOUNDATION_BASE, Game, HEARTS, SPADES, STOCK, TABLEAU_BASE, WASTE, XMove,
    is_foundation, is_tableau,
};

const UP_RANKS: [char; 13] = [
    'A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K',
];
const UP_SUITS: [char; 4] = ['C', 'D', 'S', 'H'];

const DIAGRAM_ORDER: [u8; 13] = [
    STOCK,
    WASTE,
    TABLEAU_BASE,
    TABLEAU_BASE + 1,
    TABLEAU_BASE + 2,
    TABLEAU_BASE + 3,
    TABLEAU_BASE + 4,
    TABLEAU_BASE + 5,
    TABLEAU_BASE + 6,
    FOUNDATION_BASE + CLUBS,
    FOUNDATION_BASE + DIAMONDS,
    FOUNDATION_BASE + SPADES,
    FOUNDATION_BASE + HEARTS,
];

const DIAGRAM_LABELS: [&str; 13] = [
    "STOCK    ",
    "WASTE    ",
    "TABLEAU 1",
    "TABLEAU 2",
    "TABLEAU 3",
    "TABLEAU 4",
    "TABLEAU 5",
    "TABLEAU 6",
    "TABLEAU 7",
    "CLUBS    ",
    "DIAMONDS ",
    "SPADES   ",
    "HEARTS   ",
];

fn card_string(card: klondike_game::Card) -> String {
    format!(
        "{}{}",
        UP_RANKS[card.rank() as usize],
        UP_SUITS[card.suit() as usize]
    )
}

fn prose_pile_name(code: u8) -> &'static str {
    match code {
        WASTE => "waste",
        STOCK => "stock",
        c if is_tableau(c) => {
            const NAMES: [&str; 7] = [
                "tableau 1",
                "tableau 2",
                "tableau 3",
                "tableau 4",
                "tableau 5",
                "tableau 6",
                "tableau 7",
            ];
            NAMES[(c - TABLEAU_BASE) as usize]
        }
        c => {
            const NAMES: [&str; 4] = ["clubs", "diamonds", "spades", "hearts"];
            NAMES[(c - FOUNDATION_BASE) as usize]
        }
    }
}

/// Renders every pile, top card first, with face-down cards marked by
/// a leading dash, plus the heuristic's bound.
pub fn game_diagram(game: &Game) -> String {
    let mut out = String::new();
    for (label, &code) in DIAGRAM_LABELS.iter().zip(DIAGRAM_ORDER.iter()) {
        out.push_str(label);
        out.push_str(": ");
        let pile = game.pile(code);
        let down_size = if pile.is_tableau() { pile.down_count() } else { 0 };
        for j in (0..pile.len()).rev() {
            let card = card_string(pile.card(j));
            if j >= down_size {
                out.push_str(&card);
                out.push(' ');
            } else {
                out.push('-');
                out.push_str(&card);
            }
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "Minimum Moves Needed: {}",
        game.minimum_moves_left()
    ));
    out
}

fn foundation_char(game: &Game, suit: u8) -> char {
    match game.foundation()[suit as usize].len() {
        0 => '0',
        n => UP_RANKS[n - 1],
    }
}

/// Renders the Pysol-style layout: foundations, the talon from the top
/// of the waste through the bottom of the stock, and each tableau pile
/// bottom-up with face-down cards in angle brackets.
pub fn game_diagram_pysol(game: &Game) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Foundations: H-{} C-{} D-{} S-{}",
        foundation_char(game, HEARTS),
        foundation_char(game, CLUBS),
        foundation_char(game, DIAMONDS),
        foundation_char(game, SPADES),
    ));
    out.push_str("\nTalon: ");
    for j in (0..game.waste().len()).rev() {
        out.push_str(&card_string(game.waste().card(j)));
        out.push(' ');
    }
    for j in (0..game.stock().len()).rev() {
        out.push_str(&card_string(game.stock().card(j)));
        out.push(' ');
    }
    for pile in game.tableau() {
        out.push_str("\n:");
        for (j, &card) in pile.cards().iter().enumerate() {
            if j < pile.down_count() {
                out.push_str(&format!(" <{}>", card_string(card)));
            } else {
                out.push_str(&format!(" {}", card_string(card)));
            }
        }
    }
    out
}

/// Describes one atomic move against the game state it applies to.
pub fn move_info(xmove: &XMove, game: &Game) -> String {
    if xmove.to == STOCK {
        format!(
            "Recycle {} cards from the waste pile to stock.",
            xmove.n_cards
        )
    } else if xmove.to == WASTE {
        let what = if xmove.n_cards == 1 {
            card_string(game.stock().back())
        } else {
            format!("{} cards", xmove.n_cards)
        };
        format!("Draw {what} from the stock pile.")
    } else {
        let what = if xmove.n_cards == 1 {
            card_string(game.pile(xmove.from).back())
        } else {
            format!("{} cards", xmove.n_cards)
        };
        let mut out = format!(
            "Move {what} from {} to {}",
            prose_pile_name(xmove.from),
            prose_pile_name(xmove.to)
        );
        if xmove.flip {
            out.push_str(&format!(" and flip {}", prose_pile_name(xmove.from)));
        }
        out.push('.');
        out
    }
}

fn terse_pile_char(code: u8) -> char {
    match code {
        WASTE => 'W',
        c if is_tableau(c) => (b'1' + (c - TABLEAU_BASE)) as char,
        c if is_foundation(c) => UP_SUITS[(c - FOUNDATION_BASE) as usize],
        _ => '?',
    }
}

/// The compact one-line move list: "NEW" recycles, "DR<n>" draws, and
/// pile-pair codes with "F<pile>" marking flips.
pub fn moves_made(xmoves: &[XMove]) -> String {
    let mut out = String::new();
    for mv in xmoves {
        if mv.to == STOCK {
            out.push_str("NEW ");
        } else if mv.from == STOCK {
            out.push_str(&format!("DR{} ", mv.n_cards));
        } else {
            out.push(terse_pile_char(mv.from));
            out.push(terse_pile_char(mv.to));
            if mv.n_cards > 1 {
                out.push_str(&format!("-{}", mv.n_cards));
            }
            out.push(' ');
            if mv.flip {
                out.push_str(&format!("F{} ", terse_pile_char(mv.from)));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use klondike_game::{expand_moves, numbered_deal};

    #[test]
    fn test_game_diagram() {
        let game = Game::new(numbered_deal(3), 1);
        let diagram = game_diagram(&game);
        assert!(diagram.starts_with("STOCK    : "));
        assert!(diagram.contains("TABLEAU 7"));
        assert!(diagram.contains("Minimum Moves Needed: "));
        // 21 face-down markers in a fresh deal
        assert_eq!(diagram.matches('-').count(), 21);
    }

    #[test]
    fn test_pysol_diagram_shape() {
        let game = Game::new(numbered_deal(3), 1);
        let diagram = game_diagram_pysol(&game);
        assert!(diagram.starts_with("Foundations: H-0 C-0 D-0 S-0\nTalon: "));
        assert_eq!(diagram.lines().count(), 9);
        // 52 cards rendered in all
        assert_eq!(diagram.matches(|c| c == 'A').count(), 4);
    }

    #[test]
    fn test_move_info_draw() {
        let game = Game::new(numbered_deal(3), 1);
        let xmoves = expand_moves(&[klondike_game::Move::talon(WASTE, 1, 1)], 1);
        let info = move_info(&xmoves[0], &game);
        assert!(info.starts_with("Draw "));
        assert!(info.ends_with("from the stock pile."));
    }
}
