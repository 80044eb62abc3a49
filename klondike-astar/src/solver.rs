use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use klondike_game::{
    FOUNDATION_BASE, FULL_LOOKAHEAD, Game, KING, Move, QMoves, TABLEAU_BASE, TABLEAU_COUNT, WASTE,
    filtered_available_moves, move_count,
};

use crate::memory::{GameState, GameStateCache};
use crate::storage::{MoveStorage, SharedMoveStorage};

const NO_SOLUTION: u32 = u32::MAX;
const SPAWN_STAGGER: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveCode {
    /// A solution was found and no shorter one exists.
    SolvedMinimal,
    /// A solution was found, but a budget cap or the talon look-ahead
    /// limit leaves open whether a shorter one exists.
    Solved,
    /// The search space drained with no solution: the deal cannot be won.
    Impossible,
    /// The move tree hit its size cap before the search could finish.
    GaveUp,
    /// A worker ran out of memory; the search stopped cooperatively.
    MemoryExceeded,
}

#[derive(Debug, Clone)]
pub struct SolveResult {
    pub code: SolveCode,
    pub solution: Vec<Move>,
    /// Unique game states recorded in the closed list.
    pub state_count: usize,
    /// Move specifications stored in the move tree.
    pub move_tree_size: usize,
    /// Move specifications left in the fringe; zero for unsolvable deals.
    pub final_fringe_size: usize,
    /// Trips through the main loop, across all workers.
    pub advances: usize,
}

pub fn default_threads() -> usize {
    num_cpus::get()
}

struct Shared {
    storage: SharedMoveStorage,
    cache: GameStateCache,
    best: Mutex<Vec<Move>>,
    best_count: AtomicU32,
    blew_memory: AtomicBool,
    advances: AtomicUsize,
    busy: AtomicUsize,
}

/// Solves a Klondike game for minimum moves if possible.
///
/// The returned solution is minimal when the code is `SolvedMinimal`;
/// with code `Solved` it is some solution, not necessarily minimal;
/// otherwise it is empty.
///
/// The search uses an unpredictable amount of memory, controllable to
/// a degree through `move_tree_limit`. `threads == 0` runs one worker
/// per hardware thread.
pub fn solve(game: &Game, move_tree_limit: usize, threads: usize) -> SolveResult {
    let threads = if threads == 0 { default_threads() } else { threads }.max(1);
    let shared = Shared {
        storage: SharedMoveStorage::new(move_tree_limit, game.minimum_moves_left()),
        cache: GameStateCache::new(),
        best: Mutex::new(Vec::new()),
        best_count: AtomicU32::new(NO_SOLUTION),
        blew_memory: AtomicBool::new(false),
        advances: AtomicUsize::new(0),
        busy: AtomicUsize::new(0),
    };

    std::thread::scope(|scope| {
        for _ in 0..threads - 1 {
            scope.spawn(|| worker(&shared, game));
            // stagger the spawns to ease the initial contention
            std::thread::sleep(SPAWN_STAGGER);
        }
        worker(&shared, game);
    });

    // a worker that died mid-record leaves the lock poisoned
    let mut solution = shared.best.into_inner().unwrap_or_else(|e| e.into_inner());
    let best_count = shared.best_count.load(Ordering::Relaxed);
    let over_limit = shared.storage.over_limit();
    let code = if shared.blew_memory.load(Ordering::Relaxed) {
        SolveCode::MemoryExceeded
    } else if best_count != NO_SOLUTION {
        complete_solution(game, &mut solution, best_count);
        if over_limit || game.talon_lookahead_limit() < FULL_LOOKAHEAD {
            SolveCode::Solved
        } else {
            SolveCode::SolvedMinimal
        }
    } else if over_limit {
        SolveCode::GaveUp
    } else {
        SolveCode::Impossible
    };

    SolveResult {
        code,
        solution,
        state_count: shared.cache.len(),
        move_tree_size: shared.storage.move_tree_size(),
        final_fringe_size: shared.storage.fringe_size(),
        advances: shared.advances.load(Ordering::Relaxed),
    }
}

fn worker(shared: &Shared, initial: &Game) {
    let mut game = initial.clone();
    // An allocation failure surfaces as a panic; flag it and let the
    // other workers drain out.
    let outcome = catch_unwind(AssertUnwindSafe(|| worker_loop(shared, &mut game)));
    if outcome.is_err() {
        shared.blew_memory.store(true, Ordering::Relaxed);
    }
}

fn worker_loop(shared: &Shared, game: &mut Game) {
    let mut storage = MoveStorage::new(&shared.storage);
    loop {
        if shared.blew_memory.load(Ordering::Relaxed) {
            return;
        }
        if shared.storage.over_limit() {
            return;
        }
        // Count as busy across the pop so a peer seeing an empty fringe
        // while we hold or are about to push work keeps waiting.
        shared.busy.fetch_add(1, Ordering::AcqRel);
        let Some(min_moves) = storage.pop_next_branch(game) else {
            let peers = shared.busy.fetch_sub(1, Ordering::AcqRel) - 1;
            if peers == 0 {
                return; // fringe empty and every peer idle
            }
            std::thread::sleep(Duration::from_millis(1));
            continue;
        };
        if min_moves as u32 >= shared.best_count.load(Ordering::Relaxed) {
            // Nothing on the fringe can beat the recorded solution.
            shared.busy.fetch_sub(1, Ordering::AcqRel);
            return;
        }
        shared.advances.fetch_add(1, Ordering::Relaxed);
        expand(shared, &mut storage, game, min_moves);
        shared.busy.fetch_sub(1, Ordering::AcqRel);
    }
}

// Expands one popped branch: makes the forced moves, records a finished
// game, or files the filtered next moves onto the fringe.
fn expand(shared: &Shared, storage: &mut MoveStorage, game: &mut Game, min_moves: usize) {
    let available = make_auto_moves(game, storage);

    if min_move_seq_exists(game) {
        check_for_min_solution(shared, storage, game);
        return;
    }
    if available.is_empty() {
        return; // dead end
    }

    let made_count = move_count(storage.sequence());
    for &mv in available.iter() {
        debug_assert!(game.is_valid(mv), "generated an illegal move {mv}");
        game.make_move(mv);
        let made = made_count + mv.n_moves();
        let total = made + game.minimum_moves_left();
        // the heuristic is monotone, so f never decreases along a path
        debug_assert!(total >= min_moves);
        if (total as u32) < shared.best_count.load(Ordering::Relaxed)
            && shared.cache.is_short_path(GameState::new(game), made as u32)
        {
            storage.push_branch(mv, total);
        }
        game.unmake_move(mv);
    }
    storage.share_moves();
}

// Makes available moves until a branching or empty node is found. If
// more than one move is available but the order cannot matter (as when
// two aces are dealt face up), the filtered generator returns them one
// at a time, so they land here too.
fn make_auto_moves(game: &mut Game, storage: &mut MoveStorage) -> QMoves {
    loop {
        let available = filtered_available_moves(game, storage.sequence());
        if available.len() != 1 {
            return available;
        }
        debug_assert!(game.is_valid(available[0]));
        storage.push_stem(available[0]);
        game.make_move(available[0]);
    }
}

// A solution has been found. If it is the first, or shorter than the
// current champion, it becomes the champion. The stored sequence stops
// where the mechanical finish takes over; its count already includes
// that tail.
fn check_for_min_solution(shared: &Shared, storage: &MoveStorage, game: &Game) {
    let total = (move_count(storage.sequence()) + game.minimum_moves_left()) as u32;
    let mut best = shared.best.lock().unwrap();
    if total < shared.best_count.load(Ordering::Relaxed) {
        *best = storage.sequence().to_vec();
        shared.best_count.store(total, Ordering::Relaxed);
    }
}

// True when the rest of the game plays out mechanically in exactly
// `minimum_moves_left()` moves. Every pile must be free of cards lying
// above lower-ranked cards; with more than one card per draw that is
// necessary but not sufficient (a draw can bury a needed card under
// the rest of its batch), so the mechanical finish is simulated.
fn min_move_seq_exists(game: &Game) -> bool {
    if !game.piles_in_rank_order() {
        return false;
    }
    if game.draw_setting() == 1 {
        return true;
    }
    let mut probe = game.clone();
    finish_mechanically(&mut probe, &mut Vec::new())
}

// Plays the endgame a solved branch leaves behind: drains the stock
// onto the waste whenever that keeps the waste ordered, and plays every
// exposed card whose rank matches its foundation pile. Returns true if
// this wins the game.
fn finish_mechanically(game: &mut Game, moves: &mut Vec<Move>) -> bool {
    let draw_setting = game.draw_setting();
    for rank in game.min_foundation_size() as u8..=KING {
        loop {
            let stock_size = game.stock().len();
            let draw = draw_setting.min(stock_size);
            if draw == 0 {
                break;
            }
            let waste_top = game.waste().cards().last().map_or(KING + 1, |c| c.rank());
            if game.stock().card(stock_size - draw).rank() > waste_top {
                break;
            }
            let mv = Move::talon(WASTE, 1, draw as i32);
            moves.push(mv);
            game.make_move(mv);
        }
        play_top_on_match(game, rank, WASTE, moves);
        for t in 0..TABLEAU_COUNT as u8 {
            play_top_on_match(game, rank, TABLEAU_BASE + t, moves);
        }
    }
    game.game_over()
}

// While the pile's top card has the given rank and extends its
// foundation pile, moves it there.
fn play_top_on_match(game: &mut Game, rank: u8, pile_code: u8, moves: &mut Vec<Move>) {
    loop {
        let pile = game.pile(pile_code);
        if pile.is_empty() || pile.back().rank() != rank {
            return;
        }
        let suit = pile.back().suit();
        if game.foundation()[suit as usize].len() != rank as usize {
            return;
        }
        let mv = Move::new(pile_code, FOUNDATION_BASE + suit, 1, pile.up_count());
        moves.push(mv);
        game.make_move(mv);
    }
}

// The recorded solution usually ends before the game is actually won:
// once the rest is mechanically playable, the heuristic counts the
// tail exactly. This appends that tail.
fn complete_solution(initial: &Game, solution: &mut Vec<Move>, expected_count: u32) {
    let mut game = initial.clone();
    game.deal();
    for &mv in solution.iter() {
        game.make_move(mv);
    }
    let won = finish_mechanically(&mut game, solution);
    debug_assert!(won);
    debug_assert_eq!(move_count(solution) as u32, expected_count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use klondike_game::parse_deck;

    // All four aces dealt face up; everything cascades.
    const TRIVIAL: &str = "ca h2 d4 s5 s6 d7 h7 da c3 s4 h5 h6 \
                           s7 sa d3 h4 c6 c7 ha s3 c5 d6 c2 h3 \
                           d5 d2 c4 s2 c8 d8 s8 h8 c9 d9 s9 h9 \
                           ct dt st ht cj dj sj hj cq dq sq hq \
                           ck dk sk hk";

    #[test]
    fn test_trivial_deal_single_thread() {
        let game = Game::new(parse_deck(TRIVIAL).unwrap(), 1);
        let result = solve(&game, 100_000, 1);
        assert_eq!(result.code, SolveCode::SolvedMinimal);

        // The solution replays to a won game.
        let mut replay = game.clone();
        replay.deal();
        for &mv in &result.solution {
            replay.make_move(mv);
        }
        assert!(replay.game_over());
    }

    #[test]
    fn test_gave_up_on_tiny_tree() {
        let game = Game::new(klondike_game::numbered_deal(43), 1);
        let result = solve(&game, 10, 1);
        // With a ten-node move tree the search cannot get anywhere.
        assert!(matches!(
            result.code,
            SolveCode::GaveUp | SolveCode::Solved | SolveCode::SolvedMinimal
        ));
    }
}
