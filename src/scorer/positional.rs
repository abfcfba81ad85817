use crate::consts::{
    EXPECTED_WINDOW_VOWEL_PROFILE, MAX_POSITIONAL_PERIOD, MIN_POSITIONAL_PERIOD, VOWELS,
};

/// Positional letter deviation, normalized so that 1.0 is a perfect match with English.
///
/// For each window width `w` in `2..=period`, every run of `w` consecutive letters is
/// classified by how many vowels it holds. The resulting histogram is compared with the
/// expected English profile by total-variation distance, and the score is one minus the
/// mean distance. Shuffling a sample keeps its letters but breaks the vowel spacing, so
/// the score separates real text from anagrams of it.
///
/// `period` is the widest sliding window considered, not a modulus over letter
/// positions: no letter index is reduced modulo `period`, so reversing a text leaves
/// its score unchanged.
pub fn positional_letter_deviation(text: &[u8], period: usize) -> f64 {
    let period = period.clamp(MIN_POSITIONAL_PERIOD, MAX_POSITIONAL_PERIOD);
    let is_vowel: Vec<bool> = text
        .iter()
        .filter(|b| b.is_ascii_uppercase())
        .map(|b| VOWELS.contains(b))
        .collect();

    if is_vowel.len() < MIN_POSITIONAL_PERIOD {
        return 0.0;
    }

    let mut total_distance = 0.0;
    let mut widths = 0;
    for w in MIN_POSITIONAL_PERIOD..=period {
        if is_vowel.len() < w {
            break;
        }
        total_distance += window_distance(&is_vowel, w);
        widths += 1;
    }

    if widths == 0 {
        return 0.0;
    }
    (1.0 - total_distance / widths as f64).clamp(0.0, 1.0)
}

fn window_distance(is_vowel: &[bool], w: usize) -> f64 {
    let expected = EXPECTED_WINDOW_VOWEL_PROFILE[w - MIN_POSITIONAL_PERIOD];
    let mut hist = vec![0usize; w + 1];

    let mut vowels_in_window = is_vowel[..w].iter().filter(|&&v| v).count();
    hist[vowels_in_window] += 1;
    for i in w..is_vowel.len() {
        if is_vowel[i] {
            vowels_in_window += 1;
        }
        if is_vowel[i - w] {
            vowels_in_window -= 1;
        }
        hist[vowels_in_window] += 1;
    }

    let windows = (is_vowel.len() - w + 1) as f64;
    let distance: f64 = hist
        .iter()
        .zip(expected.iter())
        .map(|(&h, &e)| (h as f64 / windows - e).abs())
        .sum();
    0.5 * distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_zero() {
        assert_eq!(positional_letter_deviation(b"", 3), 0.0);
        assert_eq!(positional_letter_deviation(b"A", 3), 0.0);
    }

    #[test]
    fn degenerate_text_scores_low() {
        let all_vowels = positional_letter_deviation(b"AAAAAAAAAAAAAAAAAAAA", 3);
        let english = positional_letter_deviation(b"THEQUICKBROWNFOXJUMPSOVERTHELAZYDOG", 3);
        assert!(all_vowels < english);
    }
}
