/// The plaintext/ciphertext symbol set. Everything else is stripped by `alphabet::normalize`.
pub const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of symbols in the working alphabet.
pub const ALPHABET_LEN: usize = 26;

/// English monogram frequencies in percent, A..Z.
pub const ENGLISH_MONOGRAM_FREQS: [f64; ALPHABET_LEN] = [
    8.167, 1.492, 2.782, 4.253, 12.702, 2.228, 2.015, 6.094, 6.966, 0.153, 0.772, 4.025, 2.406,
    6.749, 7.507, 1.929, 0.095, 5.987, 6.327, 9.056, 2.758, 0.978, 2.360, 0.150, 1.974, 0.074,
];

/// Letters counted as vowels by the positional profile (Y included).
pub const VOWELS: &[u8] = b"AEIOUY";

/// Smallest and largest window width supported by the positional profile.
pub const MIN_POSITIONAL_PERIOD: usize = 2;
pub const MAX_POSITIONAL_PERIOD: usize = 6;

/// Expected share of windows holding 0..=w vowels, for window widths 2..=6.
/// Measured over ~54k letters of English prose.
pub const EXPECTED_WINDOW_VOWEL_PROFILE: [&[f64]; 5] = [
    &[0.2488, 0.6834, 0.0678],
    &[0.0711, 0.6397, 0.2790, 0.0103],
    &[0.0137, 0.4096, 0.5039, 0.0703, 0.0024],
    &[0.0027, 0.1949, 0.5716, 0.2141, 0.0162, 0.0005],
    &[0.0010, 0.0684, 0.4758, 0.3878, 0.0616, 0.0054, 0.0000],
];

/// Probability mass assigned to an unseen n-gram, relative to the table total.
pub const NGRAM_FLOOR_MASS: f64 = 0.01;

/// Words shorter than this never count towards dictionary coverage.
pub const MIN_DICTIONARY_WORD_LEN: usize = 3;

/// Fallback reference wordlist used when none is loaded.
pub const COMMON_WORDS: &[&str] = &[
    "THE", "AND", "THAT", "HAVE", "FOR", "NOT", "WITH", "YOU", "THIS", "BUT", "HIS", "FROM",
    "THEY", "SAY", "HER", "SHE", "WILL", "ONE", "ALL", "WOULD", "THERE", "THEIR", "WHAT", "OUT",
    "ABOUT", "WHO", "GET", "WHICH", "WHEN", "MAKE", "CAN", "LIKE", "TIME", "JUST", "HIM", "KNOW",
    "TAKE", "PEOPLE", "INTO", "YEAR", "YOUR", "GOOD", "SOME", "COULD", "THEM", "SEE", "OTHER",
    "THAN", "THEN", "NOW", "LOOK", "ONLY", "COME", "ITS", "OVER", "THINK", "ALSO", "BACK",
    "AFTER", "USE", "TWO", "HOW", "OUR", "WORK", "FIRST", "WELL", "WAY", "EVEN", "NEW", "WANT",
    "BECAUSE", "ANY", "THESE", "GIVE", "DAY", "MOST", "WERE", "WAS", "HAD", "HAS", "BEEN", "ARE",
    "WHERE", "UNDER", "NEAR", "RIVER", "WATER", "LIGHT", "NIGHT", "MORNING", "EVENING", "NORTH",
    "SOUTH", "EAST", "WEST", "CLOCK", "STONE", "FIELD", "HOUSE", "ROAD", "CITY", "TOWN", "OLD",
    "LONG", "GREAT", "LITTLE", "OWN", "MAN", "MEN", "WOMAN", "CHILD", "WORLD", "LIFE", "HAND",
    "PART", "PLACE", "CASE", "WEEK", "POINT", "NUMBER", "GROUP", "PROBLEM", "FACT", "BEFORE",
    "THROUGH", "WHILE", "SHOULD", "NEVER", "AGAIN", "UNTIL", "ALONG", "TOWARD", "BETWEEN",
];
