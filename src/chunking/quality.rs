// Chunk quality heuristics
// Completeness rewards well-terminated, well-sized, topically coherent text;
// readability penalizes run-on sentences.
use ahash::{HashMap, HashMapExt};

/// Preferred chunk length band for the completeness bonus
const IDEAL_LENGTH: std::ops::RangeInclusive<usize> = 200..=800;

/// Structural completeness of a chunk, 0-100.
///
/// +30 for terminal punctuation, +25 for a length within the ideal band,
/// +25 when more than 2 distinct longer words repeat (a crude topical
/// coherence proxy).
pub fn completeness_score(text: &str) -> u8 {
    let mut score: u32 = 0;

    if matches!(text.chars().last(), Some('.' | '!' | '?')) {
        score += 30;
    }

    if IDEAL_LENGTH.contains(&text.chars().count()) {
        score += 25;
    }

    let lowered = text.to_lowercase();
    let mut frequencies: HashMap<&str, u32> = HashMap::new();
    for word in lowered.split_whitespace() {
        if word.chars().count() > 3 {
            *frequencies.entry(word).or_insert(0) += 1;
        }
    }
    let repeated = frequencies.values().filter(|&&count| count >= 2).count();
    if repeated > 2 {
        score += 25;
    }

    score.min(100) as u8
}

/// Readability of a chunk, 0-100, driven by average sentence length.
///
/// Starts at 100; −20 when the average exceeds 20 words per sentence, a
/// further −10 when it exceeds 30 (cumulative −30), +20 when the average
/// sits in the comfortable 10-20 band.
pub fn readability_score(text: &str) -> u8 {
    let mut score: i32 = 100;

    let word_count = text.split_whitespace().count();
    let sentence_count = text
        .chars()
        .filter(|c| matches!(c, '.' | '!' | '?'))
        .count();

    // No terminators means the whole text reads as one sentence.
    let average = if sentence_count == 0 {
        word_count as f64
    } else {
        word_count as f64 / sentence_count as f64
    };

    if average > 20.0 {
        score -= 20;
    }
    if average > 30.0 {
        score -= 10;
    }
    if (10.0..=20.0).contains(&average) {
        score += 20;
    }

    score.clamp(0, 100) as u8
}
