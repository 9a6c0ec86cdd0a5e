//! Performance benchmarks for the hot paths of the game core

use server::game::{GameState, MoveOutcome};
use server::map::MapGrid;
use shared::protocol::{Command, Response};
use shared::{Direction, Position, LOOK_RADIUS};
use std::time::Instant;

fn big_map() -> MapGrid {
    let width = 64;
    let mut text = String::from("name Big\nwin 3\n");
    text.push_str(&"#".repeat(width));
    text.push('\n');
    for row in 0..62 {
        let mut line = String::from("#");
        for col in 1..width - 1 {
            line.push(if (row * 7 + col) % 13 == 0 { 'G' } else { '.' });
        }
        line.push('#');
        text.push_str(&line);
        text.push('\n');
    }
    text.push_str(&"#".repeat(width));
    text.push('\n');
    MapGrid::load(&text).unwrap()
}

/// Benchmarks look window computation with a crowd of players
#[test]
fn benchmark_compute_view() {
    let map = big_map();
    let occupied: Vec<Position> = (0..10).map(|i| Position::new(10 + i, 10 + i)).collect();

    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let center = Position::new(1 + (i % 60), 1 + ((i / 60) % 60));
        let view = map.compute_view(center, LOOK_RADIUS, &occupied);
        assert_eq!(view.len(), LOOK_RADIUS);
    }

    let duration = start.elapsed();
    println!(
        "Look window: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(duration.as_secs() < 5);
}

/// Benchmarks moves with collision checks against a full house of players
#[test]
fn benchmark_moves() {
    let mut state = GameState::with_seed(big_map(), 99);
    for slot in 0..10 {
        state.spawn(slot).unwrap();
    }

    let iterations = 100_000;
    let start = Instant::now();
    let mut moved = 0;

    for i in 0..iterations {
        let direction = Direction::ALL[i % 4];
        if let Ok(MoveOutcome::Moved { .. }) = state.move_player((i % 10) as u32, direction) {
            moved += 1;
        }
        state.take_events();
    }

    let duration = start.elapsed();
    println!(
        "Moves: {} attempts ({} moved) in {:?} ({:.2} ns/iter)",
        iterations,
        moved,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(moved > 0);
    assert!(duration.as_secs() < 5);
}

/// Benchmarks parsing requests and rendering replies
#[test]
fn benchmark_protocol_round_trip() {
    let lines = ["HELLO", "move n", "MOVE W", "PICKUP", "look", "MOVE X"];
    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let reply = match Command::parse(lines[i % lines.len()]) {
            Ok(Command::Hello) => Response::GoldNeeded(3),
            Ok(Command::Move(_)) => Response::Success,
            Ok(Command::Pickup) => Response::NothingToPickUp,
            Ok(Command::Look) => Response::Success,
            Err(_) => Response::Fail,
        };
        assert!(!reply.to_wire().is_empty());
    }

    let duration = start.elapsed();
    println!(
        "Protocol: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(duration.as_secs() < 5);
}
