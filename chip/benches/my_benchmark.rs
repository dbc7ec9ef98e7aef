use chip::{chip8::ChipSet, Config};
use criterion::{criterion_group, criterion_main, Criterion};

/// counts V0 up, draws the digit and starts over
const PROGRAM: [u8; 14] = [
    0x60, 0x00, // V0 = 0
    0x70, 0x01, // V0 += 1
    0x40, 0x0F, // skip if V0 != 15
    0x12, 0x00, // jump to the start
    0xF0, 0x29, // I = sprite(V0)
    0xD1, 0x15, // draw at (V1, V1)
    0x12, 0x02, // jump to the increment
];

/// will setup the default configured chip
fn get_default_chip() -> ChipSet {
    ChipSet::with_program(Config::new().seed(0x00C8), &PROGRAM)
        .expect("The benchmark program fits into memory.")
}

pub fn step_bench(c: &mut Criterion) {
    let mut chip = get_default_chip();
    c.bench_function("step_bench", |b| {
        b.iter(|| {
            let _ = chip.step();
        });
    });
}

pub fn print_bench(c: &mut Criterion) {
    let chip = get_default_chip();
    c.bench_function("print_bench", |b| {
        b.iter(|| {
            let _ = format!("{}", chip);
        });
    });
}

criterion_group!(benches, step_bench, print_bench);
criterion_main!(benches);
