use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Standard typists' constant: one "word" is five characters.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Metrics snapshot derived from a session. Always recomputed from scratch,
/// never patched incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TypingStats {
    /// Net words per minute: correct characters only.
    pub wpm: u32,
    /// Gross words per minute: every typed character, errors included.
    pub gross_wpm: u32,
    /// Percentage of typed characters matching the reference, 2-decimal.
    pub accuracy: f64,
    pub errors: usize,
    /// Elapsed seconds, rounded to the nearest whole second.
    pub time_elapsed: u64,
    pub characters_typed: usize,
    pub correct_characters: usize,
}

/// Score `input` against `reference` over the given wall-clock span.
///
/// Pure and deterministic: identical arguments always produce identical
/// stats. Degenerate timing (zero or negative span) yields zero WPM rather
/// than a division error, and an empty input scores 100% accuracy.
pub fn compute_stats(
    input: &str,
    reference: &str,
    started_at: SystemTime,
    ended_at: SystemTime,
) -> TypingStats {
    // duration_since errors when the clock span is negative; clamp to zero.
    let elapsed_secs = ended_at
        .duration_since(started_at)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);

    let mut characters_typed = 0;
    let mut correct_characters = 0;
    let mut errors = 0;

    // Characters past the end of the reference count as errors. The
    // controller rejects over-length input, so this only matters for direct
    // callers handing us arbitrary strings.
    let mut expected = reference.chars();
    for typed in input.chars() {
        characters_typed += 1;
        match expected.next() {
            Some(c) if c == typed => correct_characters += 1,
            _ => errors += 1,
        }
    }

    let accuracy = if characters_typed > 0 {
        round2(correct_characters as f64 / characters_typed as f64 * 100.0)
    } else {
        100.0
    };

    let minutes = elapsed_secs / 60.0;
    TypingStats {
        wpm: whole_wpm(correct_characters, minutes),
        gross_wpm: whole_wpm(characters_typed, minutes),
        accuracy,
        errors,
        time_elapsed: elapsed_secs.round() as u64,
        characters_typed,
        correct_characters,
    }
}

fn whole_wpm(chars: usize, minutes: f64) -> u32 {
    if minutes > 0.0 {
        ((chars as f64 / CHARS_PER_WORD) / minutes).max(0.0).round() as u32
    } else {
        0
    }
}

/// Round half-up to two decimal places, matching `round(x * 100) / 100`.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Number of whitespace-delimited non-empty tokens in the trimmed input.
/// Drives the word-limit stop condition.
pub fn word_count(input: &str) -> usize {
    input.split_whitespace().count()
}
