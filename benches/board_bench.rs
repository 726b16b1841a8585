use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rand::rngs::SmallRng;
use rand::SeedableRng;

use matchboard::autoplay::{play_game, AutoplayConfig};
use matchboard::board::Board;
use matchboard::config::GameConfig;
use matchboard::game::Game;
use matchboard::protocol::layout::parse_layout;
use matchboard::resolve::{clear_start_matches, collapse, find_matches, refill, remove_matches};

const STRIPED: &str = "aaabbbccc/bbbcccaaa/cccaaabbb/aaabbbccc/bbbcccaaa/cccaaabbb/aaabbbccc/bbbcccaaa/cccaaabbb";

fn bench_find_matches(c: &mut Criterion) {
    let config = GameConfig {
        seed: 1,
        ..GameConfig::default()
    };
    let game = Game::new(&config).unwrap();
    c.bench_function("find_matches_quiescent_9x9", |b| {
        b.iter(|| find_matches(black_box(game.board())))
    });

    let striped = parse_layout(STRIPED, 6, 1).unwrap();
    c.bench_function("find_matches_striped_9x9", |b| {
        b.iter(|| find_matches(black_box(&striped)))
    });
}

fn bench_cascade_pass(c: &mut Criterion) {
    c.bench_function("remove_collapse_refill_9x9", |b| {
        b.iter_batched(
            || parse_layout(STRIPED, 6, 1).unwrap(),
            |mut board: Board| {
                let matches = find_matches(&board);
                remove_matches(&mut board, &matches).unwrap();
                collapse(&mut board).unwrap();
                refill(&mut board).unwrap();
                board
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_new_board(c: &mut Criterion) {
    c.bench_function("new_board_9x9", |b| {
        let mut seed = 1u64;
        b.iter(|| {
            seed += 1;
            let config = GameConfig {
                seed,
                ..GameConfig::default()
            };
            Game::new(black_box(&config)).unwrap()
        })
    });

    c.bench_function("clear_start_matches_striped", |b| {
        b.iter_batched(
            || parse_layout(STRIPED, 6, 1).unwrap(),
            |mut board: Board| clear_start_matches(&mut board).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_autoplay_game(c: &mut Criterion) {
    let config = AutoplayConfig {
        games: 1,
        moves: 50,
        threads: 1,
        quiet: true,
        ..AutoplayConfig::default()
    };
    c.bench_function("autoplay_50_moves_9x9", |b| {
        b.iter(|| {
            let mut rng = SmallRng::seed_from_u64(7);
            play_game(black_box(&config), 0, &mut rng)
        })
    });
}

criterion_group!(
    benches,
    bench_find_matches,
    bench_cascade_pass,
    bench_new_board,
    bench_autoplay_game
);
criterion_main!(benches);
