use super::cribs::Crib;
use super::ngram::NgramTable;
use crate::alphabet::normalize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Parsed `token<ws>weight` entries, before they are split into per-order tables.
#[derive(Debug, Clone, Default)]
pub struct RawNgrams {
    pub entries: Vec<(String, f64)>,
}

impl RawNgrams {
    pub fn table(&self, n: usize) -> NgramTable {
        NgramTable::from_counts(
            n,
            self.entries
                .iter()
                .filter(|(t, _)| t.len() == n)
                .map(|(t, w)| (t.as_str(), *w)),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One non-empty input line, split into trimmed non-empty fields.
struct Record {
    fields: Vec<String>,
    // Fields came from tab separation rather than a whitespace split
    tabbed: bool,
}

impl Record {
    fn token(&self) -> &str {
        &self.fields[0]
    }

    fn weight(&self) -> Option<&str> {
        self.fields.get(1).map(String::as_str)
    }
}

/// Reads tab separated records. A tab-free line is split on whitespace instead.
fn read_records<R: Read>(reader: R) -> Vec<Record> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let mut out = Vec::new();
    let mut skipped = 0;
    for result in rdr.records() {
        let rec = match result {
            Ok(rec) => rec,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        let tabbed = rec.len() >= 2;
        let fields: Vec<String> = if tabbed {
            rec.iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect()
        } else {
            rec.get(0)
                .unwrap_or("")
                .split_whitespace()
                .map(str::to_string)
                .collect()
        };

        if fields.is_empty() {
            skipped += 1;
        } else {
            out.push(Record { fields, tabbed });
        }
    }

    if skipped > 0 {
        debug!("   Skipped {} unreadable rows.", skipped);
    }
    out
}

/// N-gram tables in `token<ws>weight` form. Malformed lines are skipped and only
/// tokens of 2-4 letters are kept.
pub fn load_ngrams<R: Read>(reader: R) -> RawNgrams {
    let mut entries = Vec::new();
    for rec in read_records(reader) {
        let Some(weight) = rec.weight().and_then(|w| w.parse::<f64>().ok()) else {
            continue;
        };
        let token = rec.token();
        if !weight.is_finite() || weight <= 0.0 {
            continue;
        }
        // Header rows and tokens with digits or punctuation are not n-grams.
        if !token.chars().all(|c| c.is_ascii_alphabetic()) {
            continue;
        }
        let token = normalize(token);
        if (2..=4).contains(&token.len()) {
            entries.push((token, weight));
        }
    }
    RawNgrams { entries }
}

/// A missing or unreadable file gives an empty table set, never an error.
pub fn load_ngrams_from_path<P: AsRef<Path>>(path: P) -> RawNgrams {
    let path = path.as_ref();
    match File::open(path) {
        Ok(file) => {
            let raw = load_ngrams(file);
            info!(
                "📚 Loaded {} n-gram entries from {}",
                raw.entries.len(),
                path.display()
            );
            raw
        }
        Err(e) => {
            warn!(
                "⚠️  N-gram table '{}' unavailable ({}). Using an empty table.",
                path.display(),
                e
            );
            RawNgrams::default()
        }
    }
}

/// Cribs use the same format; the frequency column is optional.
///
/// Without a tab, a trailing number is the frequency and every word before it belongs
/// to one crib phrase (`BERLIN CLOCK` is the single crib `BERLINCLOCK`).
pub fn load_cribs<R: Read>(reader: R) -> Vec<Crib> {
    read_records(reader)
        .into_iter()
        .filter(|rec| !rec.token().starts_with('#'))
        .map(|rec| {
            if rec.tabbed {
                let freq = rec.weight().and_then(|w| w.parse::<f64>().ok()).unwrap_or(1.0);
                return Crib::new(rec.token(), freq);
            }
            let trailing = match rec.fields.split_last() {
                Some((last, words)) if !words.is_empty() => {
                    last.parse::<f64>().ok().map(|f| (words, f))
                }
                _ => None,
            };
            match trailing {
                Some((words, freq)) => Crib::new(&words.concat(), freq),
                None => Crib::new(&rec.fields.concat(), 1.0),
            }
        })
        .filter(|c| !c.text.is_empty())
        .collect()
}

pub fn load_cribs_from_path<P: AsRef<Path>>(path: P) -> Vec<Crib> {
    let path = path.as_ref();
    match File::open(path) {
        Ok(file) => load_cribs(file),
        Err(e) => {
            warn!("⚠️  Crib list '{}' unavailable ({}).", path.display(), e);
            Vec::new()
        }
    }
}

/// One word per line; anything after the first field is ignored.
pub fn load_wordlist<R: Read>(reader: R) -> Vec<String> {
    read_records(reader)
        .into_iter()
        .map(|rec| normalize(rec.token()))
        .filter(|w| !w.is_empty())
        .collect()
}

pub fn load_wordlist_from_path<P: AsRef<Path>>(path: P) -> Vec<String> {
    let path = path.as_ref();
    match File::open(path) {
        Ok(file) => load_wordlist(file),
        Err(e) => {
            warn!("⚠️  Wordlist '{}' unavailable ({}).", path.display(), e);
            Vec::new()
        }
    }
}
