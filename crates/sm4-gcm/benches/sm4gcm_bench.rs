use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use sm4_core::Sm4;
use sm4_gcm::{GaloisHasher, Sm4Gcm, Sm4Key};

fn bench_block_cipher(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
    let mut key = [0u8; 16];
    rng.fill_bytes(&mut key);
    let cipher = Sm4::new(&Sm4Key::from(key));

    let mut group = c.benchmark_group("sm4");
    group.throughput(Throughput::Bytes(16));
    group.bench_function("encrypt_block", |b| {
        let mut block = [0u8; 16];
        rng.fill_bytes(&mut block);
        b.iter(|| cipher.encrypt_block(black_box(&block)));
    });
    group.bench_function("decrypt_block", |b| {
        let block = [0x5au8; 16];
        b.iter(|| cipher.decrypt_block(black_box(&block)));
    });
    group.finish();
}

fn bench_ghash(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([2u8; 32]);
    let mut h = [0u8; 16];
    rng.fill_bytes(&mut h);
    let mut data = vec![0u8; 4096];
    rng.fill_bytes(&mut data);

    let mut group = c.benchmark_group("ghash");
    group.bench_function("table_build", |b| {
        b.iter(|| GaloisHasher::portable(black_box(&h)));
    });
    group.throughput(Throughput::Bytes(data.len() as u64));
    let portable = GaloisHasher::portable(&h);
    group.bench_function("hash_4k_table", |b| {
        b.iter(|| portable.hash(black_box(&data)));
    });
    let preferred = GaloisHasher::new(&h);
    group.bench_function(format!("hash_4k_{}", preferred.backend_name()), |b| {
        b.iter(|| preferred.hash(black_box(&data)));
    });
    group.finish();
}

fn bench_aead(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
    let mut key = [0u8; 16];
    rng.fill_bytes(&mut key);
    let gcm = Sm4Gcm::new(&Sm4Key::from(key));
    let nonce = [7u8; 12];
    let aad = [0u8; 20];

    let mut group = c.benchmark_group("sm4_gcm");
    group.sample_size(20);
    group.bench_function("session_init", |b| {
        b.iter(|| Sm4Gcm::new(black_box(&Sm4Key::from(key))));
    });
    for size in [64usize, 1024, 16 * 1024] {
        let mut plaintext = vec![0u8; size];
        rng.fill_bytes(&mut plaintext);
        let sealed = gcm.seal(&nonce, &aad, &plaintext).expect("seal");
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("seal_{size}"), |b| {
            b.iter(|| gcm.seal(&nonce, &aad, black_box(&plaintext)));
        });
        group.bench_function(format!("open_{size}"), |b| {
            b.iter(|| gcm.open(&nonce, &aad, black_box(&sealed)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_block_cipher, bench_ghash, bench_aead);
criterion_main!(benches);
