use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

#[cfg(feature = "deterministic_zobrist")]
const ZOBRIST_SEED: u64 = 0x51A6_1C0D_7E83_AF29;

fn make_zobrist_rng() -> StdRng {
    #[cfg(feature = "deterministic_zobrist")]
    {
        StdRng::seed_from_u64(ZOBRIST_SEED)
    }
    #[cfg(not(feature = "deterministic_zobrist"))]
    {
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);
        StdRng::from_seed(seed)
    }
}

pub struct ZobristKeys {
    /// [color][piece][square] with {White=0, Black=1} and {P,N,B,R,Q,K}={0..5}
    pub piece: [[[u64; 64]; 6]; 2],
    /// XORed in when Black is to move.
    pub side_to_move: u64,
    /// One key per castling-rights nibble (bit order K,Q,k,q).
    pub castling: [u64; 16],
    /// a..h => 0..7
    pub ep_file: [u64; 8],
}

/// Global keys, created on first use.
pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_zobrist_keys(make_zobrist_rng()))
}

fn generate_zobrist_keys(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(r: &mut StdRng) -> u64 {
        // zero keys would make distinct states indistinguishable
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[[0u64; 64]; 6]; 2],
        side_to_move: 0,
        castling: [0u64; 16],
        ep_file: [0u64; 8],
    };

    for color in 0..2 {
        for piece in 0..6 {
            for sq in 0..64 {
                keys.piece[color][piece][sq] = non_zero(&mut rng);
            }
        }
    }

    keys.side_to_move = non_zero(&mut rng);

    for rights in 0..16 {
        keys.castling[rights] = non_zero(&mut rng);
    }

    for file in 0..8 {
        keys.ep_file[file] = non_zero(&mut rng);
    }

    keys
}
