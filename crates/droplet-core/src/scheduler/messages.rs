//! Fixed reminder message catalog.

use rand::Rng;

/// The reminder copy, as shipped. Not user-configurable.
pub const MESSAGES: [&str; 3] = [
    "一小时过去了，喝口水吧。",
    "现在喝点水，会舒服些。",
    "别忘了补点水。",
];

/// Pick one message uniformly at random.
///
/// The RNG is injected so shells and tests can seed it deterministically.
pub fn pick_message<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    MESSAGES[rng.gen_range(0..MESSAGES.len())]
}
