pub mod context;
pub mod eval;
pub mod ordering;
pub mod search;
pub mod see;
pub mod time;
pub mod tt;

/// Iterative-deepening depth cap.
pub const MAX_DEPTH: i32 = 64;
/// Ply cap for per-ply arrays; extensions and quiescence stay below it.
pub const MAX_PLY: usize = 128;

pub const SCORE_INF: i32 = 32_000;
/// Scores at or beyond this are mate scores carrying a ply distance.
pub const MIN_MATE: i32 = SCORE_INF - 512;
