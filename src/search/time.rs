use crate::board::Color;
use std::time::{Duration, Instant};

/// Cooperative stop predicate polled by the search. Once true it must stay
/// true until the next `go`.
pub trait SearchClock {
    fn time_up(&mut self) -> bool;
}

/// Wall-clock budget with a sticky stop flag.
pub struct TimeManager {
    start: Instant,
    allotted: Option<Duration>,
    stopped: bool,
}

impl TimeManager {
    pub fn new(allotted: Option<Duration>) -> Self {
        TimeManager {
            start: Instant::now(),
            allotted,
            stopped: false,
        }
    }

    pub fn infinite() -> Self {
        TimeManager::new(None)
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl SearchClock for TimeManager {
    #[inline]
    fn time_up(&mut self) -> bool {
        if !self.stopped
            && let Some(limit) = self.allotted
            && self.start.elapsed() >= limit
        {
            self.stopped = true;
        }
        self.stopped
    }
}

/// Limits parsed from a UCI `go` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoLimits {
    pub depth: Option<i32>,
    pub movetime: Option<u64>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u64>,
}

const DEFAULT_MOVES_TO_GO: u64 = 25;
const SAFETY_MARGIN_MS: u64 = 50;

/// Turn `go` limits into a wall-clock budget; None means search forever
/// (depth-limited or until interrupted).
pub fn allocate_time(limits: &GoLimits, side: Color) -> Option<Duration> {
    if let Some(ms) = limits.movetime {
        return Some(Duration::from_millis(ms));
    }

    let remaining = match side {
        Color::White => limits.wtime,
        Color::Black => limits.btime,
    }?;
    let increment = match side {
        Color::White => limits.winc,
        Color::Black => limits.binc,
    }
    .unwrap_or(0);

    let moves_to_go = limits.movestogo.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);
    let budget = remaining / moves_to_go + increment / 2;
    let capped = budget.min(remaining.saturating_sub(SAFETY_MARGIN_MS)).max(1);
    Some(Duration::from_millis(capped))
}
