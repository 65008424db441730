//! Criterion benchmarks for the electric grid.
//!
//! Two benchmark groups:
//! - `rail_network`: 64 parallel lines of 64 tracks fed by wires below
//! - `block_cube`: a 16x16x16 cube of blocks, every node charged

use criterion::{criterion_group, criterion_main, Criterion};
use railcraft_core::grid::ElectricGrid;
use railcraft_core::test_utils::*;

/// 64 lines of 64 tracks, with a feeder wire under every eighth track.
fn build_rail_network() -> ElectricGrid {
    let mut grid = seeded_grid();
    for z in 0..64 {
        for x in 0..64 {
            let t = track(&mut grid, x, 1, z * 2);
            set_charge(&mut grid, t, 500.0);
            if x % 8 == 0 {
                let w = wire(&mut grid, x, 0, z * 2);
                set_charge(&mut grid, w, 5000.0);
            }
        }
    }
    connect_all(&mut grid);
    grid
}

fn build_block_cube() -> ElectricGrid {
    let mut grid = lossless_grid();
    for x in 0..16 {
        for y in 0..16 {
            for z in 0..16 {
                let b = block(&mut grid, x, y, z);
                set_charge(&mut grid, b, f64::from(x * y + z));
            }
        }
    }
    connect_all(&mut grid);
    grid
}

fn bench_rail_network(c: &mut Criterion) {
    let mut grid = build_rail_network();
    c.bench_function("rail_network_tick", |b| {
        b.iter(|| {
            grid.tick();
        })
    });
}

fn bench_block_cube(c: &mut Criterion) {
    let mut grid = build_block_cube();
    c.bench_function("block_cube_tick", |b| {
        b.iter(|| {
            grid.tick();
        })
    });
}

criterion_group!(benches, bench_rail_network, bench_block_cube);
criterion_main!(benches);
