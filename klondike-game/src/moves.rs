use std::fmt;

use crate::pile::{PILE_NAMES, STOCK, WASTE, is_tableau};

const RECYCLE_BIT: u8 = 0x80;

/// A move directive, packed into four bytes. Two flavors share the
/// representation, discriminated by `from == STOCK`:
///
/// * A non-talon move carries `{from, to, n_cards, from_up_count}` and
///   always counts as one move. `from_up_count` records the face-up
///   count of the from pile before the move; `unmake_move` needs it to
///   restore the pile across an auto-flip.
/// * A talon move carries `{to, n_moves, draw}` and represents
///   `n_moves - 1` draws (and possibly one recycle, flagged separately)
///   whose cumulative effect is to draw `draw` cards from stock --
///   negative when the shortest path is to recycle and draw past the
///   starting point -- followed by playing the new top of waste on `to`.
///   A talon move with `to == WASTE` is a pure draw of `draw` cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Move {
    from: u8,
    to: u8,
    n_moves: u8,
    extra: u8,
}

impl Move {
    /// A non-talon move of `n_cards` cards.
    pub fn new(from: u8, to: u8, n_cards: usize, from_up_count: usize) -> Self {
        debug_assert!(from != STOCK);
        debug_assert!(n_cards < 16 && from_up_count < 16);
        Move {
            from,
            to,
            n_moves: 1,
            extra: (n_cards | (from_up_count << 4)) as u8,
        }
    }

    /// A talon move: `n_moves - 1` draws/recycles, then play the waste
    /// top on `to`.
    pub fn talon(to: u8, n_moves: usize, draw: i32) -> Self {
        debug_assert!(n_moves < RECYCLE_BIT as usize);
        debug_assert!((-128..128).contains(&draw));
        Move {
            from: STOCK,
            to,
            n_moves: n_moves as u8,
            extra: (draw as i8) as u8,
        }
    }

    pub fn with_recycle(mut self, recycle: bool) -> Self {
        debug_assert!(self.is_talon());
        if recycle {
            self.n_moves |= RECYCLE_BIT;
        }
        self
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.n_moves == 0
    }

    #[inline]
    pub fn is_talon(self) -> bool {
        self.from == STOCK
    }

    #[inline]
    pub fn from(self) -> u8 {
        self.from
    }

    #[inline]
    pub fn to(self) -> u8 {
        self.to
    }

    #[inline]
    pub fn n_cards(self) -> usize {
        if self.is_talon() {
            1
        } else {
            (self.extra & 0x0f) as usize
        }
    }

    #[inline]
    pub fn from_up_count(self) -> usize {
        debug_assert!(!self.is_talon());
        (self.extra >> 4) as usize
    }

    /// The number of actual moves this directive stands for.
    #[inline]
    pub fn n_moves(self) -> usize {
        (self.n_moves & !RECYCLE_BIT) as usize
    }

    #[inline]
    pub fn draw(self) -> i32 {
        debug_assert!(self.is_talon());
        (self.extra as i8) as i32
    }

    #[inline]
    pub fn recycle(self) -> bool {
        self.is_talon() && self.n_moves & RECYCLE_BIT != 0
    }
}

// Compact rendering, e.g. "+6d5>t3" (talon: 6 moves, draw 5, play on
// tableau 3), "+6d-4c>t3" (net un-draw of 4 with a recycle), or
// "t1>t6x4u1" (4 cards, 1 was face-up).
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_talon() {
            write!(f, "+{}d{}", self.n_moves(), self.draw())?;
            if self.recycle() {
                write!(f, "c")?;
            }
            write!(f, ">{}", PILE_NAMES[self.to as usize])
        } else {
            write!(
                f,
                "{}>{}",
                PILE_NAMES[self.from as usize], PILE_NAMES[self.to as usize]
            )?;
            if self.n_cards() != 1 {
                write!(f, "x{}", self.n_cards())?;
            }
            if self.from_up_count() != 0 {
                write!(f, "u{}", self.from_up_count())?;
            }
            Ok(())
        }
    }
}

/// The number of actual moves implied by a series of move directives.
pub fn move_count(moves: &[Move]) -> usize {
    moves.iter().map(|mv| mv.n_moves()).sum()
}

pub fn format_moves(moves: &[Move]) -> String {
    let strs: Vec<String> = moves.iter().map(|mv| mv.to_string()).collect();
    format!("({})", strs.join(","))
}

/// One atomic move for playback. Unlike `Move`, an `XMove` never stands
/// for more than one motion of cards, so a sequence of them can simply
/// be listed or animated.
///
/// Moves are numbered from 1. The numbers are often not consecutive:
/// drawing several cards from the stock pile in one batch is a single
/// `XMove` spanning several move numbers, and a recycle shares its
/// number with the draw that follows it. Flips of tableau cards are not
/// moves, but are flagged on the move that exposes the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XMove {
    pub move_num: usize,
    pub from: u8,
    pub to: u8,
    pub n_cards: usize,
    pub flip: bool,
}

/// Unrolls solver moves from the initial deal into atomic draw, recycle,
/// and play moves.
pub fn expand_moves(moves: &[Move], draw_setting: usize) -> Vec<XMove> {
    let mut stock: usize = 24;
    let mut waste: usize = 0;
    let mut move_num: usize = 0;
    let mut up_count: [usize; 7] = [1; 7];
    let mut total_count: [usize; 7] = [1, 2, 3, 4, 5, 6, 7];
    let mut result = Vec::new();

    for &mv in moves {
        let from = mv.from();
        let to = mv.to();

        if !mv.is_talon() {
            let n = mv.n_cards();
            let mut flip = false;
            if is_tableau(from) {
                let i = (from - 1) as usize;
                total_count[i] -= n;
                up_count[i] -= n;
                if total_count[i] > 0 && up_count[i] == 0 {
                    flip = true;
                    up_count[i] = 1;
                }
            }
            if is_tableau(to) {
                let i = (to - 1) as usize;
                total_count[i] += n;
                up_count[i] += n;
            }
            move_num += 1;
            result.push(XMove {
                move_num,
                from,
                to,
                n_cards: n,
                flip,
            });
            if from == WASTE {
                waste -= 1;
            }
        } else if to == WASTE {
            // Pure draw, as appended by the solution finisher.
            let n = mv.draw() as usize;
            move_num += 1;
            result.push(XMove {
                move_num,
                from: STOCK,
                to: WASTE,
                n_cards: n,
                flip: false,
            });
            stock -= n;
            waste += n;
        } else {
            let mut n_talon_moves = mv.n_moves() - 1;
            let stock_moves_left = stock.div_ceil(draw_setting);
            if n_talon_moves > stock_moves_left && stock > 0 {
                // Draw all remaining cards from stock.
                move_num += 1;
                result.push(XMove {
                    move_num,
                    from: STOCK,
                    to: WASTE,
                    n_cards: stock,
                    flip: false,
                });
                move_num += stock_moves_left - 1;
                waste += stock;
                stock = 0;
                n_talon_moves -= stock_moves_left;
            }
            if n_talon_moves > 0 {
                move_num += 1;
                if stock == 0 {
                    // A recycle shares its number with the next draw.
                    result.push(XMove {
                        move_num,
                        from: WASTE,
                        to: STOCK,
                        n_cards: waste,
                        flip: false,
                    });
                    stock = waste;
                    waste = 0;
                }
                let n_moved = stock.min(n_talon_moves * draw_setting);
                result.push(XMove {
                    move_num,
                    from: STOCK,
                    to: WASTE,
                    n_cards: n_moved,
                    flip: false,
                });
                stock -= n_moved;
                waste += n_moved;
                move_num += n_talon_moves - 1;
            }
            move_num += 1;
            result.push(XMove {
                move_num,
                from: WASTE,
                to,
                n_cards: 1,
                flip: false,
            });
            waste -= 1;
            if is_tableau(to) {
                let i = (to - 1) as usize;
                total_count[i] += 1;
                up_count[i] += 1;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pile::{FOUNDATION_BASE, TABLEAU_BASE};

    #[test]
    fn test_move_packing() {
        let a = Move::talon(TABLEAU_BASE + 2, 6, 5);
        let b = Move::new(WASTE, FOUNDATION_BASE + 1, 1, 0);
        let c = Move::new(TABLEAU_BASE, TABLEAU_BASE + 5, 4, 1);
        let d = Move::talon(TABLEAU_BASE + 2, 6, -4).with_recycle(true);

        assert!(a.is_talon());
        assert_eq!(a.n_moves(), 6);
        assert_eq!(a.draw(), 5);
        assert_eq!(a.n_cards(), 1);
        assert!(!a.recycle());

        assert!(!b.is_talon());
        assert_eq!(b.n_moves(), 1);

        assert_eq!(c.n_cards(), 4);
        assert_eq!(c.from_up_count(), 1);

        assert_eq!(d.draw(), -4);
        assert!(d.recycle());
        assert_eq!(d.n_moves(), 6);

        assert_eq!(a.to_string(), "+6d5>t3");
        assert_eq!(b.to_string(), "wa>di");
        assert_eq!(c.to_string(), "t1>t6x4u1");
        assert_eq!(d.to_string(), "+6d-4c>t3");
        assert_eq!(format_moves(&[a, b, c]), "(+6d5>t3,wa>di,t1>t6x4u1)");

        assert_eq!(move_count(&[a, b, c, d]), 14);
        assert!(Move::default().is_null());
        assert!(!a.is_null());
    }

    #[test]
    fn test_expand_draws() {
        // Draw twice (draw 3), then play the waste top on tableau 1.
        let mv = Move::talon(TABLEAU_BASE, 3, 6);
        let xmoves = expand_moves(&[mv], 3);
        assert_eq!(xmoves.len(), 2);
        assert_eq!(
            xmoves[0],
            XMove {
                move_num: 1,
                from: STOCK,
                to: WASTE,
                n_cards: 6,
                flip: false
            }
        );
        assert_eq!(
            xmoves[1],
            XMove {
                move_num: 3,
                from: WASTE,
                to: TABLEAU_BASE,
                n_cards: 1,
                flip: false
            }
        );
    }

    #[test]
    fn test_expand_flags_flip() {
        // Tableau 2 starts with two cards, one up. Moving its top card
        // exposes a face-down card.
        let mv = Move::new(TABLEAU_BASE + 1, TABLEAU_BASE + 2, 1, 1);
        let xmoves = expand_moves(&[mv], 1);
        assert_eq!(xmoves.len(), 1);
        assert!(xmoves[0].flip);
    }
}
