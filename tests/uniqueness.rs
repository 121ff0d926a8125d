use std::collections::HashSet;
use std::thread;

use pwseal::{Config, ScryptParams, envelope, random};

#[test]
fn one_million_salts_never_repeat() {
    let mut grains: HashSet<[u8; 32]> = HashSet::with_capacity(1_000_000);
    for _ in 0..1_000_000 {
        grains.insert(random::array::<32>().unwrap());
    }
    assert_eq!(grains.len(), 1_000_000, "salts repeating");
}

#[test]
fn concurrent_generation_never_repeats() {
    let per_thread = 20_000;
    let batches: Vec<Vec<Vec<u8>>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    (0..per_thread)
                        .map(|_| random::generate(16).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let all: HashSet<Vec<u8>> = batches.into_iter().flatten().collect();
    assert_eq!(all.len(), 8 * per_thread);
}

#[test]
fn concurrent_create_and_verify() {
    let config = Config::default().with_params(ScryptParams::new(1 << 6, 1, 1).unwrap());

    thread::scope(|s| {
        for t in 0..8 {
            let config = &config;
            s.spawn(move || {
                let password = format!("password-{t}");
                let sealed = envelope::create_with(&password, 32, config).unwrap();
                assert!(envelope::verify_with(&password, &sealed, config).unwrap());
                assert!(!envelope::verify_with("other", &sealed, config).unwrap());
            });
        }
    });
}
