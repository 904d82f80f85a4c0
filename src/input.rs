//! # Input — CSV Modulus Loader
//!
//! Reads a two-column CSV (`id,modulus`) into the ordered `(Vec<Bignum>,
//! Vec<String>)` pair the core engine expects (spec §6: the core receives
//! an ordered vector of bignums plus a parallel vector of opaque ID
//! strings; it does not parse input itself). Grounded on the teacher
//! crate's habit of a `serde`-derived row struct per external record shape
//! (seen throughout its database layer for SQL rows), applied here to CSV
//! rows instead.

use crate::bignum::Bignum;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct Row {
    id: String,
    modulus: String,
}

/// One successfully parsed input record.
pub struct Loaded {
    pub ids: Vec<String>,
    pub moduli: Vec<Bignum>,
}

/// Load moduli from a CSV file at `path`. Expects a header row `id,modulus`.
/// `hex` selects hex parsing for fields without a `0x` prefix; fields that
/// already carry `0x`/`0X` are always parsed as hex regardless of `hex`.
///
/// Every row is parsed before any row is handed to the engine — a malformed
/// row is an input-shape error (spec §7.1), reported with its 1-based row
/// number, not a panic mid-load.
pub fn load(path: &Path, hex: bool) -> Result<Loaded> {
    let mut reader = csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;

    let mut ids = Vec::new();
    let mut moduli = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    for (row_num, result) in reader.deserialize::<Row>().enumerate() {
        let line = row_num + 2; // header is line 1
        match result {
            Ok(row) => match parse_modulus(&row.modulus, hex) {
                Ok(n) => {
                    ids.push(row.id);
                    moduli.push(n);
                }
                Err(e) => errors.push(format!("line {line}: {e}")),
            },
            Err(e) => errors.push(format!("line {line}: malformed row: {e}")),
        }
    }

    if !errors.is_empty() {
        bail!("CSV input had {} invalid row(s):\n{}", errors.len(), errors.join("\n"));
    }

    if ids.is_empty() {
        bail!("input file {} contained no data rows", path.display());
    }

    Ok(Loaded { ids, moduli })
}

fn parse_modulus(field: &str, hex: bool) -> Result<Bignum> {
    let trimmed = field.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") || hex {
        Bignum::from_hex(trimmed)
    } else {
        Bignum::from_decimal(trimmed)
    }
}
