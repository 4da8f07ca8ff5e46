use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Builds a reproducible generator from a plain integer seed.
pub fn deterministic_rng(seed: u64) -> ChaCha8Rng {
    let mut bytes = [0u8; 32];
    bytes[24..32].copy_from_slice(&seed.to_be_bytes());
    ChaCha8Rng::from_seed(bytes)
}

/// Mixes a stream index into a base seed so sibling runs (one per trial,
/// one per policy) draw from unrelated streams.
pub fn derive_seed(base: u64, stream: u64) -> u64 {
    // splitmix64 finalizer
    let mut z = base ^ stream.wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
