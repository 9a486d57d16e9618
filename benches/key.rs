#![feature(test)]

extern crate test;

use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use rsa_engine::{
    pkcs1::DecodeRsaPrivateKey, EngineConfig, KeyPair, ModExpAlgorithm, Padding, RsaEngine,
    RsaPrivateKey,
};
use test::Bencher;

fn get_key() -> KeyPair {
    // 2048 bits
    KeyPair::from(
        RsaPrivateKey::from_pkcs1_der(include_bytes!("../tests/data/rsa2048-priv.der")).unwrap(),
    )
}

fn engine(padding: Padding, algorithm: ModExpAlgorithm) -> RsaEngine {
    RsaEngine::new(
        EngineConfig::new()
            .with_padding(padding)
            .with_algorithm(algorithm),
    )
}

#[bench]
fn bench_rsa_2048_gen_key(b: &mut Bencher) {
    let mut rng = ChaCha8Rng::from_seed([42; 32]);

    b.iter(|| {
        let key = KeyPair::generate(&mut rng, 2048).unwrap();
        test::black_box(key);
    });
}

macro_rules! bench_decrypt {
    ($name:ident, $padding:expr, $algorithm:expr) => {
        #[bench]
        fn $name(b: &mut Bencher) {
            let mut rng = ChaCha8Rng::from_seed([42; 32]);
            let key = get_key();
            let engine = engine($padding, $algorithm);
            let x = engine.encrypt(&mut rng, &key, b"testing").unwrap();

            b.iter(|| {
                let res = engine.decrypt(&key, &x).unwrap();
                test::black_box(res);
            });
        }
    };
}

bench_decrypt!(
    bench_rsa_2048_pkcsv1_decrypt,
    Padding::Pkcs1v15,
    ModExpAlgorithm::Baseline
);
bench_decrypt!(
    bench_rsa_2048_pkcsv1_decrypt_montgomery,
    Padding::Pkcs1v15,
    ModExpAlgorithm::Montgomery
);
bench_decrypt!(
    bench_rsa_2048_oaep_decrypt,
    Padding::default(),
    ModExpAlgorithm::Baseline
);
bench_decrypt!(
    bench_rsa_2048_oaep_decrypt_montgomery,
    Padding::default(),
    ModExpAlgorithm::Montgomery
);

#[bench]
fn bench_rsa_2048_oaep_decrypt_blinded(b: &mut Bencher) {
    let mut rng = ChaCha8Rng::from_seed([42; 32]);
    let key = get_key();
    let engine = engine(Padding::default(), ModExpAlgorithm::Baseline);
    let x = engine.encrypt(&mut rng, &key, b"testing").unwrap();

    b.iter(|| {
        let res = engine.decrypt_blinded(&mut rng, &key, &x).unwrap();
        test::black_box(res);
    });
}

#[bench]
fn bench_rsa_2048_oaep_encrypt(b: &mut Bencher) {
    let mut rng = ChaCha8Rng::from_seed([42; 32]);
    let key = get_key();
    let engine = engine(Padding::default(), ModExpAlgorithm::Baseline);

    b.iter(|| {
        let res = engine.encrypt(&mut rng, &key, b"testing").unwrap();
        test::black_box(res);
    });
}
