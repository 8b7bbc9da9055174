//! Guess scoring
//!
//! Titles and guesses are normalized (punctuation stripped, lower-cased,
//! spaces removed) and compared by Levenshtein distance. Partial credit
//! scales linearly with similarity.

use crate::types::Tier;

/// Non-ASCII characters stripped alongside ASCII punctuation
const EXTRA_PUNCTUATION: &[char] = &['’', '«', '»', '—'];

/// Result of scoring one guess against the correct title
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuessScore {
    pub points_awarded: u32,
    pub tier: Tier,
    pub distance: usize,
    /// Similarity in [0, 1]
    pub partial_factor: f64,
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || EXTRA_PUNCTUATION.contains(&c)
}

/// Remove punctuation and special characters from a string
pub fn remove_punctuation(text: &str) -> String {
    text.chars().filter(|c| !is_punctuation(*c)).collect()
}

/// Normalize text for comparison: strip punctuation, lower-case, drop spaces.
///
/// Only the ASCII space is removed; tabs and newlines are compared as typed.
pub fn normalize(text: &str) -> String {
    remove_punctuation(text).to_lowercase().replace(' ', "")
}

/// Levenshtein edit distance over Unicode scalar values
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // Keep the shorter string in the row to bound memory
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut row: Vec<usize> = (0..=short.len()).collect();
    for (j, lc) in long.iter().enumerate() {
        let mut prev_diag = row[0];
        row[0] = j + 1;
        for (i, sc) in short.iter().enumerate() {
            let above = row[i + 1];
            row[i + 1] = if sc == lc {
                prev_diag
            } else {
                1 + prev_diag.min(above).min(row[i])
            };
            prev_diag = above;
        }
    }

    row[short.len()]
}

/// Score a guess against the correct title.
///
/// Callers must reject blank guesses before scoring; a blank guess is a
/// validation failure, not a zero score.
pub fn score_guess(correct_title: &str, guess_text: &str, points_max: u32) -> GuessScore {
    let norm_correct = normalize(correct_title);
    let norm_guess = normalize(guess_text);

    let distance = levenshtein(&norm_correct, &norm_guess);
    let max_len = norm_correct.chars().count().max(norm_guess.chars().count());

    if max_len == 0 {
        return GuessScore {
            points_awarded: points_max,
            tier: Tier::Exact,
            distance,
            partial_factor: 1.0,
        };
    }

    // distance never exceeds max_len, so similar >= 0 and the integer floor is exact
    let similar = max_len.saturating_sub(distance);
    let points_awarded = (u64::from(points_max) * similar as u64 / max_len as u64) as u32;
    let partial_factor = similar as f64 / max_len as f64;

    let tier = if similar == max_len {
        Tier::Exact
    } else if similar * 2 >= max_len {
        Tier::Close
    } else {
        Tier::Wrong
    };

    GuessScore {
        points_awarded,
        tier,
        distance,
        partial_factor,
    }
}

/// Difficulty from popularity: popular movies are easier.
///
/// Only clamped from below; the formula tops out at 10 on its own.
pub fn difficulty(vote_count: u64) -> f64 {
    let raw = 10.0 - (vote_count as f64 / 2000.0).min(9.0);
    let rounded = (raw * 10.0).round() / 10.0;
    rounded.max(1.0)
}

/// First letter of the title followed by one underscore per remaining character
pub fn title_hint(title: &str) -> String {
    let clean = remove_punctuation(title);
    let mut chars = clean.chars();
    match chars.next() {
        Some(first) => {
            let mut hint = String::with_capacity(clean.len());
            hint.push(first);
            hint.extend(chars.map(|_| '_'));
            hint
        }
        None => String::new(),
    }
}

/// Player-facing feedback line for a scored guess
pub fn feedback_message(tier: Tier, correct_title: &str) -> String {
    match tier {
        Tier::Exact => format!("Correct! It was {}!", correct_title),
        Tier::Close => format!("Almost! It was {}.", correct_title),
        Tier::Wrong => format!("Wrong! The movie was {}.", correct_title),
    }
}
