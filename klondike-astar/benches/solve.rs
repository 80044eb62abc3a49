use criterion::{Criterion, criterion_group, criterion_main};

use klondike_astar::solve;
use klondike_game::{Game, numbered_deal, parse_deck};

const QUICK: &str = "ca c8 da d6 dt dk s2 c2 c9 d2 d7 dj sa c3 ct d3 d8 dq c4 cj d4 d9 c5 cq d5 \
                     c6 ck c7 s3 s4 s5 s6 s7 s8 s9 st sj sq sk ha h2 h3 h4 h5 h6 h7 h8 h9 ht hj \
                     hq hk";

pub fn bench_game_model(c: &mut Criterion) {
    let game = Game::new(numbered_deal(174985), 1);
    c.bench_function("available_moves", |b| b.iter(|| game.available_moves()));
    c.bench_function("minimum_moves_left", |b| b.iter(|| game.minimum_moves_left()));
    c.bench_function("deal", |b| {
        b.iter(|| {
            let mut fresh = game.clone();
            fresh.deal();
            fresh
        })
    });
}

pub fn bench_solve(c: &mut Criterion) {
    let game = Game::new(parse_deck(QUICK).unwrap(), 1);
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);
    group.bench_function("quick_deal", |b| b.iter(|| solve(&game, 3_000_000, 1)));
    group.finish();
}

criterion_group!(benches, bench_game_model, bench_solve);
criterion_main!(benches);
