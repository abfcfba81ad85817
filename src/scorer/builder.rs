use super::cribs::{Crib, CribSet};
use super::dictionary::Wordlist;
use super::loader::{
    load_cribs_from_path, load_ngrams, load_ngrams_from_path, load_wordlist_from_path, RawNgrams,
};
use super::LanguageModel;
use crate::alphabet::normalize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Assembles the read-only `LanguageModel` from files, readers or in-memory data.
#[derive(Default)]
pub struct LanguageModelBuilder {
    ngrams: RawNgrams,
    cribs: Vec<Crib>,
    wordlist: Option<Vec<String>>,
}

impl LanguageModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ngrams(mut self, raw: RawNgrams) -> Self {
        self.ngrams.entries.extend(raw.entries);
        self
    }

    pub fn with_ngrams_from_reader<R: Read>(self, reader: R) -> Self {
        self.with_ngrams(load_ngrams(reader))
    }

    pub fn with_ngrams_from_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.with_ngrams(load_ngrams_from_path(path))
    }

    /// Counts 2-, 3- and 4-grams straight from sample text.
    pub fn with_corpus_text(mut self, corpus: &str) -> Self {
        let text = normalize(corpus);
        let bytes = text.as_bytes();
        for n in 2..=4 {
            for w in bytes.windows(n) {
                self.ngrams
                    .entries
                    .push((String::from_utf8_lossy(w).into_owned(), 1.0));
            }
        }
        self
    }

    pub fn with_cribs(mut self, cribs: Vec<Crib>) -> Self {
        self.cribs.extend(cribs);
        self
    }

    pub fn with_crib_words<S: AsRef<str>>(self, words: &[S]) -> Self {
        let cribs = words.iter().map(|w| Crib::new(w.as_ref(), 1.0)).collect();
        self.with_cribs(cribs)
    }

    pub fn with_cribs_from_file<P: AsRef<Path>>(self, path: P) -> Self {
        let cribs = load_cribs_from_path(path);
        self.with_cribs(cribs)
    }

    pub fn with_wordlist<S: AsRef<str>>(mut self, words: &[S]) -> Self {
        self.wordlist = Some(words.iter().map(|w| w.as_ref().to_string()).collect());
        self
    }

    pub fn with_wordlist_from_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let words = load_wordlist_from_path(path);
        if !words.is_empty() {
            self.wordlist = Some(words);
        }
        self
    }

    pub fn build(self) -> LanguageModel {
        let bigrams = self.ngrams.table(2);
        let trigrams = self.ngrams.table(3);
        let quadgrams = self.ngrams.table(4);
        let cribs = CribSet::new(self.cribs);
        let wordlist = match self.wordlist {
            Some(words) => Wordlist::new(&words),
            None => Wordlist::default(),
        };

        debug!(
            "Language model: {} bigrams, {} trigrams, {} quadgrams, {} cribs, {} words",
            bigrams.len(),
            trigrams.len(),
            quadgrams.len(),
            cribs.cribs().len(),
            wordlist.len()
        );

        LanguageModel {
            bigrams,
            trigrams,
            quadgrams,
            cribs,
            wordlist,
        }
    }
}
