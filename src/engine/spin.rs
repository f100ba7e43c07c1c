//! Server-side spin plan: the frame sequence the UI animates through and the
//! weighted winner it lands on.

use rand::Rng;
use serde::Serialize;

use crate::db::models::PersonRecord;
use crate::engine::selection::{Selection, Wheel};

/// Delay between animation frames.
pub const TICK_MS: u64 = 100;
/// Every spin runs at least this many frames.
pub const MIN_CYCLES: u32 = 60;
/// Extra frames drawn uniformly from `0..CYCLE_JITTER`.
pub const CYCLE_JITTER: u32 = 20;

/// Display backgrounds. A name always maps to the same entry.
pub const GRADIENTS: [&str; 12] = [
    "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
    "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
    "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
    "linear-gradient(135deg, #43e97b 0%, #38f9d7 100%)",
    "linear-gradient(135deg, #fa709a 0%, #fee140 100%)",
    "linear-gradient(135deg, #a8edea 0%, #fed6e3 100%)",
    "linear-gradient(135deg, #ff9a9e 0%, #fecfef 100%)",
    "linear-gradient(135deg, #ffecd2 0%, #fcb69f 100%)",
    "linear-gradient(135deg, #ff9a9e 0%, #fad0c4 100%)",
    "linear-gradient(135deg, #a18cd1 0%, #fbc2eb 100%)",
    "linear-gradient(135deg, #fad0c4 0%, #ffd1ff 100%)",
    "linear-gradient(135deg, #ffecd2 0%, #fcb69f 100%)",
];

/// Classic `h = c + (h << 5) - h` string hash over UTF-16 code units.
///
/// The shift wraps at 32 bits while the subtraction does not, so the
/// accumulator is kept in an i64 and only truncated for the shift. This keeps
/// colors identical to the ones the browser UI computes for the same name.
fn name_hash(name: &str) -> i64 {
    name.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = ((hash as i32).wrapping_shl(5)) as i64;
        i64::from(unit) + shifted - hash
    })
}

/// Gradient for a name; stable across calls and processes.
pub fn name_gradient(name: &str) -> &'static str {
    let index = (name_hash(name).unsigned_abs() % GRADIENTS.len() as u64) as usize;
    GRADIENTS[index]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinPlan {
    pub winner: String,
    pub frames: Vec<String>,
    pub tick_ms: u64,
    pub cycles: u32,
    pub gradient: &'static str,
}

/// Draw a full spin. Frames are uniform over the candidates; the final
/// winner is a weighted draw. With no candidates the winner is the sentinel
/// and there are no frames.
pub fn plan_spin<R: Rng + ?Sized>(wheel: &Wheel, records: &[PersonRecord], rng: &mut R) -> SpinPlan {
    let candidates = wheel.candidates(records);
    if candidates.is_empty() {
        let winner = Selection::NoCandidates.display_name().to_string();
        return SpinPlan {
            gradient: name_gradient(&winner),
            winner,
            frames: Vec::new(),
            tick_ms: TICK_MS,
            cycles: 0,
        };
    }

    let cycles = MIN_CYCLES + rng.gen_range(0..CYCLE_JITTER);
    let frames = (0..cycles)
        .map(|_| candidates[rng.gen_range(0..candidates.len())].name.clone())
        .collect();
    let winner = wheel.pick(records, rng).display_name().to_string();

    SpinPlan {
        gradient: name_gradient(&winner),
        winner,
        frames,
        tick_ms: TICK_MS,
        cycles,
    }
}
