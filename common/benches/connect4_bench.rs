use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use common::games::connect4::{BOARD_HEIGHT, BOARD_WIDTH, Connect4Game, Move, Player};

/// Fills the whole board without a four-in-a-row: column colours run
/// R R Y Y R R Y along the bottom and alternate upwards.
fn long_game_moves() -> Vec<(Player, i64)> {
    let bottom = [
        Player::Red,
        Player::Red,
        Player::Yellow,
        Player::Yellow,
        Player::Red,
        Player::Red,
        Player::Yellow,
    ];
    let mut moves = Vec::new();
    for (column, &first) in bottom.iter().enumerate() {
        for row in 0..BOARD_HEIGHT {
            let player = if row % 2 == 0 { first } else { first.opponent() };
            moves.push((player, column as i64));
        }
    }
    moves
}

fn bench_play_long_game() {
    let mut game = Connect4Game::new();
    for (player, column) in long_game_moves() {
        let _ = game.play(player, column);
    }
    black_box(game.winner());
}

fn bench_rejected_moves() {
    let mut game = Connect4Game::new();
    for column in -2..(BOARD_WIDTH as i64 + 2) {
        let _ = black_box(game.play(Player::Red, column));
    }
}

fn connect4_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("connect4");

    group.bench_function("long_game", |b| b.iter(bench_play_long_game));

    group.bench_function("rejected_moves", |b| b.iter(bench_rejected_moves));

    let mut history = Connect4Game::new();
    for (player, column) in long_game_moves() {
        let _ = history.play(player, column);
    }
    let moves: Vec<Move> = history.moves().to_vec();
    group.bench_function("replay_history", |b| {
        b.iter(|| Connect4Game::replay(black_box(&moves)))
    });

    group.finish();
}

criterion_group!(benches, connect4_bench);
criterion_main!(benches);
