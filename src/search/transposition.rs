use crate::alphabet::normalize;
use crate::candidate::{sort_by_score, Candidate, Meta};
use crate::config::SearchParams;
use crate::error::{CfResult, CipherForgeError};
use crate::scorer::Scorer;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

/// Crib text -> acceptable start offsets in the reconstructed plaintext.
pub type PositionalCribs = BTreeMap<String, Vec<usize>>;

/// Path along which plaintext is written into the grid.
#[derive(
    Debug, Clone, Copy, Default, EnumIter, EnumString, Display, PartialEq, Eq, Hash, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Route {
    #[default]
    Rows,
    Serpentine,
    Spiral,
}

#[derive(Debug, Clone)]
pub struct TranspositionOptions {
    pub window: usize,
    pub max_perms: usize,
    pub limit: usize,
    pub route: Route,
    /// `pos_bonus` per letter of every satisfied positional crib
    pub bonus_per_letter: f64,
}

impl Default for TranspositionOptions {
    fn default() -> Self {
        Self::from(&SearchParams::default())
    }
}

impl From<&SearchParams> for TranspositionOptions {
    fn from(p: &SearchParams) -> Self {
        Self {
            window: p.window,
            max_perms: p.max_perms,
            limit: p.limit,
            route: Route::Rows,
            bonus_per_letter: p.positional_crib_bonus,
        }
    }
}

/// Grid cells (`r * n_cols + c`) in route order. Only cells below `n` are visited.
pub fn route_cells(n: usize, n_cols: usize, route: Route) -> Vec<usize> {
    if n == 0 || n_cols == 0 {
        return Vec::new();
    }
    let rows = n.div_ceil(n_cols);
    let mut cells = Vec::with_capacity(n);
    match route {
        Route::Rows => cells.extend(0..n),
        Route::Serpentine => {
            for r in 0..rows {
                let row = (0..n_cols).map(|c| r * n_cols + c);
                if r % 2 == 0 {
                    cells.extend(row.filter(|&i| i < n));
                } else {
                    cells.extend(row.rev().filter(|&i| i < n));
                }
            }
        }
        Route::Spiral => {
            let (mut top, mut bottom) = (0isize, rows as isize - 1);
            let (mut left, mut right) = (0isize, n_cols as isize - 1);
            let mut push = |r: isize, c: isize| {
                let i = r as usize * n_cols + c as usize;
                if i < n {
                    cells.push(i);
                }
            };
            while top <= bottom && left <= right {
                for c in left..=right {
                    push(top, c);
                }
                for r in top + 1..=bottom {
                    push(r, right);
                }
                if top < bottom {
                    for c in (left..right).rev() {
                        push(bottom, c);
                    }
                }
                if left < right {
                    for r in (top + 1..bottom).rev() {
                        push(r, left);
                    }
                }
                top += 1;
                bottom -= 1;
                left += 1;
                right -= 1;
            }
        }
    }
    cells
}

fn check_order(order: &[usize]) -> CfResult<()> {
    let mut seen = vec![false; order.len()];
    for &c in order {
        if c >= order.len() || seen[c] {
            return Err(CipherForgeError::InputShape(format!(
                "Column order {:?} is not a permutation of 0..{}",
                order,
                order.len()
            )));
        }
        seen[c] = true;
    }
    if order.is_empty() {
        return Err(CipherForgeError::InputShape(
            "Column order must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Writes the plaintext along `route`, then reads the columns in `order`.
pub fn encrypt_columnar(plaintext: &str, order: &[usize], route: Route) -> CfResult<String> {
    check_order(order)?;
    let text = normalize(plaintext);
    let bytes = text.as_bytes();
    let n = bytes.len();
    let n_cols = order.len();

    let mut grid = vec![0u8; n];
    for (&cell, &b) in route_cells(n, n_cols, route).iter().zip(bytes) {
        grid[cell] = b;
    }

    let mut out = Vec::with_capacity(n);
    for &c in order {
        out.extend((c..n).step_by(n_cols).map(|i| grid[i]));
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Inverse of [`encrypt_columnar`].
pub fn decrypt_columnar(ciphertext: &str, order: &[usize], route: Route) -> CfResult<String> {
    check_order(order)?;
    let text = normalize(ciphertext);
    Ok(decrypt_letters(text.as_bytes(), order, &route_cells(text.len(), order.len(), route)))
}

/// Hot-path decryption over pre-normalized letters and a precomputed route.
pub(crate) fn decrypt_letters(letters: &[u8], order: &[usize], cells: &[usize]) -> String {
    let n = letters.len();
    let n_cols = order.len();
    let mut grid = vec![0u8; n];
    let mut src = letters.iter();
    for &c in order {
        for i in (c..n).step_by(n_cols) {
            if let Some(&b) = src.next() {
                grid[i] = b;
            }
        }
    }
    let plain: Vec<u8> = cells.iter().map(|&i| grid[i]).collect();
    String::from_utf8_lossy(&plain).into_owned()
}

/// Sum of `per_letter * len(crib)` over cribs found within `window` of an expected offset.
pub fn positional_crib_bonus(
    text: &str,
    cribs: &PositionalCribs,
    window: usize,
    per_letter: f64,
) -> f64 {
    cribs
        .iter()
        .filter(|(crib, _)| !crib.is_empty())
        .filter(|(crib, offsets)| {
            text.match_indices(crib.as_str())
                .any(|(start, _)| offsets.iter().any(|&o| start.abs_diff(o) <= window))
        })
        .map(|(crib, _)| per_letter * crib.len() as f64)
        .sum::<f64>()
        .max(0.0)
}

fn normalize_cribs(cribs: &PositionalCribs) -> PositionalCribs {
    cribs
        .iter()
        .map(|(k, v)| (normalize(k), v.clone()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

fn check_geometry(letters: usize, n_cols: usize) -> CfResult<()> {
    if n_cols < 2 {
        return Err(CipherForgeError::InputShape(format!(
            "Transposition needs at least 2 columns, got {}",
            n_cols
        )));
    }
    if letters < 2 * n_cols {
        return Err(CipherForgeError::InputShape(format!(
            "Ciphertext has {} letters, too short for {} columns",
            letters, n_cols
        )));
    }
    Ok(())
}

/// Scores every column order (lexicographic, capped at `max_perms`) and keeps the top `limit`.
pub fn search_columnar(
    ciphertext: &str,
    n_cols: usize,
    cribs: &PositionalCribs,
    opts: &TranspositionOptions,
    scorer: &Scorer,
) -> CfResult<Vec<Candidate>> {
    let text = normalize(ciphertext);
    check_geometry(text.len(), n_cols)?;
    let cribs = normalize_cribs(cribs);
    let cells = route_cells(text.len(), n_cols, opts.route);

    let mut candidates: Vec<Candidate> = (0..n_cols)
        .permutations(n_cols)
        .take(opts.max_perms)
        .map(|order| {
            let plain = decrypt_letters(text.as_bytes(), &order, &cells);
            let pos_bonus = positional_crib_bonus(&plain, &cribs, opts.window, opts.bonus_per_letter);
            let mut meta = Meta::new();
            meta.insert("n_cols".to_string(), Value::from(n_cols));
            meta.insert("order".to_string(), Value::from(order));
            meta.insert("route".to_string(), Value::from(opts.route.to_string()));
            meta.insert("pos_bonus".to_string(), Value::from(pos_bonus));
            Candidate::scored(plain, scorer, pos_bonus, meta)
        })
        .collect();

    sort_by_score(&mut candidates);
    candidates.truncate(opts.limit);
    debug!(
        "Columnar {} cols / {}: best {:.3}",
        n_cols,
        opts.route,
        candidates.first().map(Candidate::score).unwrap_or(f64::NEG_INFINITY)
    );
    Ok(candidates)
}

/// Like [`search_columnar`], but an empty crib mapping is a legal no-op returning no candidates.
pub fn search_with_multiple_cribs_positions(
    ciphertext: &str,
    cribs: &PositionalCribs,
    n_cols: usize,
    opts: &TranspositionOptions,
    scorer: &Scorer,
) -> CfResult<Vec<Candidate>> {
    if cribs.is_empty() {
        return Ok(Vec::new());
    }
    search_columnar(ciphertext, n_cols, cribs, opts, scorer)
}

/// Every geometry in `cols` crossed with every route. Geometries the text cannot
/// fill are skipped; if none fits the result is an input-shape error.
pub fn sweep_columns(
    ciphertext: &str,
    cols: RangeInclusive<usize>,
    routes: &[Route],
    cribs: &PositionalCribs,
    opts: &TranspositionOptions,
    scorer: &Scorer,
) -> CfResult<Vec<Candidate>> {
    let letters = normalize(ciphertext).len();
    let mut merged = Vec::new();
    let mut ran = 0usize;

    for n_cols in cols.clone() {
        if let Err(e) = check_geometry(letters, n_cols) {
            debug!("Skipping {} columns: {}", n_cols, e);
            continue;
        }
        for &route in routes {
            let local = TranspositionOptions {
                route,
                ..opts.clone()
            };
            merged.extend(search_columnar(ciphertext, n_cols, cribs, &local, scorer)?);
            ran += 1;
        }
    }

    if ran == 0 {
        return Err(CipherForgeError::InputShape(format!(
            "No geometry in {}..={} columns fits {} letters",
            cols.start(),
            cols.end(),
            letters
        )));
    }

    sort_by_score(&mut merged);
    merged.truncate(opts.limit);
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn routes_visit_every_valid_cell_once() {
        for route in Route::iter() {
            for n in [7usize, 12, 13] {
                let mut cells = route_cells(n, 4, route);
                cells.sort_unstable();
                assert_eq!(cells, (0..n).collect::<Vec<_>>(), "{route} n={n}");
            }
        }
    }

    #[test]
    fn spiral_order_on_full_grid() {
        // 3x3: 0 1 2 / 3 4 5 / 6 7 8
        assert_eq!(route_cells(9, 3, Route::Spiral), vec![0, 1, 2, 5, 8, 7, 6, 3, 4]);
    }

    #[test]
    fn order_must_be_permutation() {
        assert!(encrypt_columnar("HELLOWORLD", &[0, 0, 1], Route::Rows).is_err());
        assert!(encrypt_columnar("HELLOWORLD", &[], Route::Rows).is_err());
    }
}
