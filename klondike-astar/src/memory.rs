use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::BuildHasher;
use std::sync::Mutex;

use ahash::RandomState;
use klondike_game::Game;

const SHARD_COUNT: usize = 128;

/// A 192-bit fingerprint of a game state, identical for game states
/// that are equal up to a permutation of the tableau piles.
///
/// The rules for moving to a tableau pile guarantee that all the
/// face-up cards in one can be identified by its bottom face-up card
/// plus, for each other face-up card, whether it is from a major suit
/// (spades or hearts): the alternating-color rule and the rank ladder
/// leave one choice per bit. A pile's descriptor packs that card, that
/// bitmap, and the face-up count into 21 bits; face-up runs never
/// exceed 12 cards, since no ace is ever moved onto a tableau pile.
/// The seven descriptors are sorted to collapse pile order, then packed
/// into three words along with the stock size and the four foundation
/// sizes.
///
/// Face-down cards are deliberately absent: distinct deals of them
/// rarely share a face-up configuration, and a collision only costs an
/// occasional over-eager prune, never a wrong solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GameState([u64; 3]);

impl GameState {
    pub fn new(game: &Game) -> Self {
        let mut descriptors = [0u32; 7];
        for (descriptor, pile) in descriptors.iter_mut().zip(game.tableau()) {
            let up_count = pile.up_count();
            if up_count == 0 {
                continue;
            }
            let cards = pile.cards();
            let mut is_major = 0u32;
            for card in &cards[cards.len() - up_count + 1..] {
                is_major = is_major << 1 | card.is_major() as u32;
            }
            let bottom = pile.first_up();
            let code = (bottom.suit() << 4 | bottom.rank()) as u32;
            *descriptor = (code << 11 | is_major) << 4 | up_count as u32;
        }
        descriptors.sort_unstable();

        let d = |i: usize| descriptors[i] as u64;
        let part0 = (d(0) << 21 | d(1)) << 21 | d(2);
        let part1 = (d(3) << 21 | d(4)) << 21 | d(5);
        let foundation = game.foundation();
        let mut part2 = d(6) << 5 | game.stock().len() as u64;
        for pile in foundation {
            part2 = part2 << 4 | pile.len() as u64;
        }
        GameState([part0, part1, part2])
    }
}

/// Remembers the fewest moves in which each game state seen so far has
/// been reached. Thread-safe: the table is striped into many small
/// partitions, each behind its own mutex, so threads rarely contend.
pub struct GameStateCache {
    shards: Vec<Mutex<HashMap<GameState, u32, RandomState>>>,
    picker: RandomState,
}

impl GameStateCache {
    pub fn new() -> Self {
        GameStateCache {
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(HashMap::default())).collect(),
            picker: RandomState::new(),
        }
    }

    /// Returns true if `state` has not been seen before, or if
    /// `move_count` beats the fewest moves previously known to reach
    /// it; either way the record is updated atomically. Returns false
    /// when some earlier path reaches the state at least as quickly.
    pub fn is_short_path(&self, state: GameState, move_count: u32) -> bool {
        let shard = self.picker.hash_one(state) as usize % SHARD_COUNT;
        let mut map = self.shards[shard].lock().unwrap();
        match map.entry(state) {
            Entry::Occupied(mut entry) => {
                if move_count < *entry.get() {
                    entry.insert(move_count);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(move_count);
                true
            }
        }
    }

    /// The number of states stored. Tolerates shards a dead worker
    /// left poisoned.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.lock().unwrap_or_else(|e| e.into_inner()).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GameStateCache {
    fn default() -> Self {
        Self::new()
    }
}
