//! Row fingerprints for exact-duplicate detection.
//!
//! A fingerprint is the BLAKE3 digest of a canonical byte encoding of the
//! row's values, taken in the aligned schema's column order. The encoding is
//! self-delimiting: each value starts with a tag byte and text carries its
//! length, so adjacent values cannot run together.
//!
//! Normalization rules:
//! - Null has its own tag; it never collides with `""` or `0`.
//! - A finite float with no fractional part that fits in `i64` is encoded as
//!   that integer, so `5` and `5.0` (and `0` and `-0.0`) are the same value.
//! - Text is compared byte for byte: no trimming, no case folding.
//! - Every NaN (any sign or payload) encodes as one NaN tag, so a row holding
//!   NaN still matches its own copy.
//!
//! The row must be as wide as the column list it is hashed under; anything
//! else fails with [`FingerprintError`].

use std::fmt;

use blake3::Hasher;
use sheetmerge_engine::{Number, Value};

use crate::error::FingerprintError;

const TAG_NULL: u8 = b'n';
const TAG_BOOL: u8 = b'b';
const TAG_INT: u8 = b'i';
const TAG_FLOAT: u8 = b'f';
const TAG_TEXT: u8 = b's';
const TAG_NAN: u8 = b'N';

// 2^63 as f64; every integral float in [-2^63, 2^63) converts to i64 exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Digest identifying a row's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowFingerprint([u8; 32]);

impl RowFingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for RowFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Fingerprint a positional row laid out over `columns`.
pub fn fingerprint_row(row: &[Value], columns: &[String]) -> Result<RowFingerprint, FingerprintError> {
    if row.len() != columns.len() {
        return Err(FingerprintError::SchemaMismatch {
            expected: columns.len(),
            found: row.len(),
        });
    }

    let mut hasher = Hasher::new();
    hasher.update(&(row.len() as u64).to_le_bytes());
    for value in row {
        encode_value(&mut hasher, value);
    }
    Ok(RowFingerprint(*hasher.finalize().as_bytes()))
}

fn encode_value(hasher: &mut Hasher, value: &Value) {
    match value {
        Value::Null => {
            hasher.update(&[TAG_NULL]);
        }
        Value::Boolean(b) => {
            hasher.update(&[TAG_BOOL, *b as u8]);
        }
        Value::Number(n) => encode_number(hasher, *n),
        Value::Text(s) => {
            hasher.update(&[TAG_TEXT]);
            hasher.update(&(s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }
    }
}

/// Integral floats collapse onto integers; NaN collapses onto one tag.
fn encode_number(hasher: &mut Hasher, n: Number) {
    match n {
        Number::Int(i) => {
            hasher.update(&[TAG_INT]);
            hasher.update(&i.to_le_bytes());
        }
        Number::Float(f) if f.is_nan() => {
            hasher.update(&[TAG_NAN]);
        }
        Number::Float(f) if f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f) => {
            hasher.update(&[TAG_INT]);
            hasher.update(&(f as i64).to_le_bytes());
        }
        Number::Float(f) => {
            hasher.update(&[TAG_FLOAT]);
            hasher.update(&f.to_bits().to_le_bytes());
        }
    }
}
