use std::path::PathBuf;

use criterion::{criterion_group, criterion_main, Criterion};

use bmpm::*;

const DM_RULES: &str = include_str!("../Data/dmrules.txt");

pub fn bench_beider_morse_approx(c: &mut Criterion) {
    let config_files = ConfigFiles::new(&PathBuf::from("./Data")).unwrap();
    let encoder = BeiderMorseBuilder::new(&config_files).build();
    c.bench_function("Beider Morse (approx)", |b| {
        b.iter(|| encoder.try_encode("Schwarzenegger"))
    });
}

pub fn bench_beider_morse_exact(c: &mut Criterion) {
    let config_files = ConfigFiles::new(&PathBuf::from("./Data")).unwrap();
    let encoder = BeiderMorseBuilder::new(&config_files)
        .accuracy(Accuracy::Exact)
        .build();
    c.bench_function("Beider Morse (exact)", |b| {
        b.iter(|| encoder.try_encode("Schwarzenegger"))
    });
}

pub fn bench_beider_morse_multi_word(c: &mut Criterion) {
    let config_files = ConfigFiles::new(&PathBuf::from("./Data")).unwrap();
    let encoder = BeiderMorseBuilder::new(&config_files).build();
    c.bench_function("Beider Morse (multi word)", |b| {
        b.iter(|| encoder.try_encode("Van Der Berg"))
    });
}

pub fn bench_daitch_mokotoff_soundex(c: &mut Criterion) {
    let daitch_mokotoff = DaitchMokotoffSoundexBuilder::with_rules(DM_RULES)
        .build()
        .unwrap();
    c.bench_function("Daitch Mokotoff Soundex", |b| {
        b.iter(|| daitch_mokotoff.soundex("Rosochowaciec"))
    });
}

criterion_group!(
    name = beider_morse;
    config = Criterion::default().sample_size(300);
    targets = bench_beider_morse_approx, bench_beider_morse_exact, bench_beider_morse_multi_word
);
criterion_group!(
    name = daitch_mokotoff;
    config = Criterion::default().sample_size(300);
    targets = bench_daitch_mokotoff_soundex
);
criterion_main!(beider_morse, daitch_mokotoff);
