use rand::seq::SliceRandom;
use rand::Rng;

/// Short lines shown next to the coach.
pub const QUOTES: &[&str] = &[
    "Emotion is data. Use it.",
    "Optimization in progress. Do not halt.",
    "Vitals stable. Velocity increasing.",
    "The weakness is not in the system but in the execution.",
    "Consistent input builds the core.",
    "Sync complete. Proceed to the next objective.",
];

/// Pick a quote deterministically from a seed.
pub fn quote_for(seed: u64) -> &'static str {
    QUOTES[(seed % QUOTES.len() as u64) as usize]
}

/// Pick a quote using the given generator.
pub fn choose_quote<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    QUOTES.choose(rng).copied().unwrap_or(QUOTES[0])
}

pub fn random_quote() -> &'static str {
    choose_quote(&mut rand::thread_rng())
}
