use crate::consts::{ALPHABET, ALPHABET_LEN};
use crate::error::{CfResult, CipherForgeError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Uppercases and strips everything outside A-Z.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Position of an uppercase letter in the standard alphabet.
#[inline(always)]
pub fn letter_index(b: u8) -> Option<usize> {
    if b.is_ascii_uppercase() {
        Some((b - b'A') as usize)
    } else {
        None
    }
}

/// A substitution ordering of the 26 letters used as the tableau for periodic keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedAlphabet {
    symbols: [u8; ALPHABET_LEN],
    // Standard letter index -> position in `symbols`
    positions: [u8; ALPHABET_LEN],
}

impl Default for KeyedAlphabet {
    fn default() -> Self {
        Self::standard()
    }
}

impl KeyedAlphabet {
    pub fn standard() -> Self {
        Self::from_symbols(*ALPHABET)
    }

    /// Keyword letters first (deduplicated), then the rest of A-Z in order.
    pub fn from_keyword(keyword: &str) -> Self {
        let mut symbols = [0u8; ALPHABET_LEN];
        let mut seen = [false; ALPHABET_LEN];
        let mut n = 0;

        let keyword = normalize(keyword);
        for &b in keyword.as_bytes().iter().chain(ALPHABET.iter()) {
            let i = (b - b'A') as usize;
            if !seen[i] {
                seen[i] = true;
                symbols[n] = b;
                n += 1;
            }
        }
        Self::from_symbols(symbols)
    }

    /// Accepts an explicit ordering; it must be a permutation of A-Z.
    pub fn parse(order: &str) -> CfResult<Self> {
        let norm = normalize(order);
        let bytes = norm.as_bytes();
        if bytes.len() != ALPHABET_LEN {
            return Err(CipherForgeError::Config(format!(
                "Keyed alphabet '{}' has {} letters, expected {}",
                order,
                bytes.len(),
                ALPHABET_LEN
            )));
        }

        let mut seen = [false; ALPHABET_LEN];
        let mut symbols = [0u8; ALPHABET_LEN];
        for (i, &b) in bytes.iter().enumerate() {
            let idx = (b - b'A') as usize;
            if seen[idx] {
                return Err(CipherForgeError::Config(format!(
                    "Keyed alphabet '{}' repeats '{}'",
                    order, b as char
                )));
            }
            seen[idx] = true;
            symbols[i] = b;
        }
        Ok(Self::from_symbols(symbols))
    }

    fn from_symbols(symbols: [u8; ALPHABET_LEN]) -> Self {
        let mut positions = [0u8; ALPHABET_LEN];
        for (pos, &b) in symbols.iter().enumerate() {
            positions[(b - b'A') as usize] = pos as u8;
        }
        Self { symbols, positions }
    }

    pub fn len(&self) -> usize {
        ALPHABET_LEN
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    #[inline(always)]
    pub fn symbol(&self, pos: usize) -> u8 {
        self.symbols[pos % ALPHABET_LEN]
    }

    #[inline(always)]
    pub fn position(&self, letter: u8) -> Option<usize> {
        letter_index(letter).map(|i| self.positions[i] as usize)
    }

    /// Decrypts one letter under one key symbol. Non-letters pass through.
    #[inline(always)]
    pub fn decrypt_letter(&self, c: u8, k: u8) -> u8 {
        match (self.position(c), self.position(k)) {
            (Some(ci), Some(ki)) => self.symbols[(ci + ALPHABET_LEN - ki) % ALPHABET_LEN],
            _ => c,
        }
    }

    #[inline(always)]
    pub fn encrypt_letter(&self, p: u8, k: u8) -> u8 {
        match (self.position(p), self.position(k)) {
            (Some(pi), Some(ki)) => self.symbols[(pi + ki) % ALPHABET_LEN],
            _ => p,
        }
    }

    /// Periodic tableau encryption. Both inputs are normalized first.
    pub fn encrypt(&self, plaintext: &str, key: &str) -> CfResult<String> {
        self.apply(plaintext, key, |p, k| self.encrypt_letter(p, k))
    }

    pub fn decrypt(&self, ciphertext: &str, key: &str) -> CfResult<String> {
        self.apply(ciphertext, key, |c, k| self.decrypt_letter(c, k))
    }

    fn apply<F: Fn(u8, u8) -> u8>(&self, text: &str, key: &str, f: F) -> CfResult<String> {
        let key = normalize(key);
        if key.is_empty() {
            return Err(CipherForgeError::InputShape(
                "Key must contain at least one letter".to_string(),
            ));
        }
        let key = key.as_bytes();
        let out: Vec<u8> = normalize(text)
            .bytes()
            .enumerate()
            .map(|(i, b)| f(b, key[i % key.len()]))
            .collect();
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

impl fmt::Display for KeyedAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.symbols))
    }
}

impl Serialize for KeyedAlphabet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for KeyedAlphabet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        KeyedAlphabet::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_alphabet_places_keyword_first() {
        let a = KeyedAlphabet::from_keyword("kryptos");
        assert_eq!(a.to_string(), "KRYPTOSABCDEFGHIJLMNQUVWXZ");
    }

    #[test]
    fn parse_rejects_repeats() {
        assert!(KeyedAlphabet::parse("AACDEFGHIJKLMNOPQRSTUVWXYZ").is_err());
        assert!(KeyedAlphabet::parse("ABC").is_err());
    }

    #[test]
    fn tableau_decrypt_inverts_encrypt() {
        let a = KeyedAlphabet::from_keyword("KRYPTOS");
        let ct = a.encrypt("attack at dawn", "LEMON").unwrap();
        assert_eq!(a.decrypt(&ct, "LEMON").unwrap(), "ATTACKATDAWN");
    }

    #[test]
    fn empty_key_is_rejected() {
        let a = KeyedAlphabet::standard();
        assert!(matches!(
            a.decrypt("ABC", "123"),
            Err(CipherForgeError::InputShape(_))
        ));
    }
}
