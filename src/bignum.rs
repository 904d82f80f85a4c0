//! # Bignum — Arbitrary-Precision Integer Primitives
//!
//! Thin wrapper around `rug::Integer` (GMP-backed) exposing exactly the
//! operations the batch-GCD engine needs: construction from decimal/hex,
//! multiplication, modular reduction, exact division, gcd, and a compact
//! byte form for the level store. Division-by-zero and modulus-by-zero are
//! never reachable from the engine's own call graph; they are rejected
//! explicitly rather than left to panic inside GMP.

use anyhow::{anyhow, Result};
use rug::Integer;
use std::cmp::Ordering;
use std::fmt;

/// A non-negative arbitrary-precision integer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bignum(Integer);

impl Bignum {
    /// Parse a non-negative decimal string.
    pub fn from_decimal(s: &str) -> Result<Self> {
        let s = s.trim();
        let n = Integer::parse(s)
            .map_err(|e| anyhow!("invalid decimal modulus {:?}: {}", s, e))?
            .complete();
        Self::from_integer(n)
    }

    /// Parse a non-negative hexadecimal string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let n = Integer::parse_radix(s, 16)
            .map_err(|e| anyhow!("invalid hex modulus {:?}: {}", s, e))?
            .complete();
        Self::from_integer(n)
    }

    fn from_integer(n: Integer) -> Result<Self> {
        if n.cmp0() == Ordering::Less {
            return Err(anyhow!("modulus must be non-negative, got {}", n));
        }
        Ok(Bignum(n))
    }

    /// Construct from a small unsigned value (used in tests and fixtures).
    pub fn from_u64(v: u64) -> Self {
        Bignum(Integer::from(v))
    }

    pub fn is_zero(&self) -> bool {
        self.0.cmp0() == Ordering::Equal
    }

    pub fn is_one(&self) -> bool {
        self.0 == 1u32
    }

    /// `self * other`, with no modular reduction.
    pub fn checked_mul(&self, other: &Bignum) -> Bignum {
        Bignum(Integer::from(&self.0 * &other.0))
    }

    /// `self.pow(2)`.
    pub fn squared(&self) -> Bignum {
        Bignum(Integer::from(&self.0 * &self.0))
    }

    /// `self % modulus`. `modulus` must be positive; the caller (the
    /// remainder-tree descender) never constructs a zero modulus, so this
    /// panics rather than silently misbehaving if that invariant is ever
    /// broken — the same "unreachable, but checked" posture as
    /// `finalize::InvariantViolation`.
    pub fn rem(&self, modulus: &Bignum) -> Bignum {
        assert!(!modulus.is_zero(), "batch-gcd core invariant violated: mod-by-zero");
        Bignum(self.0.clone().rem_euc(modulus.0.clone()))
    }

    /// Exact division `self / divisor`. Returns `None` if `divisor` does not
    /// evenly divide `self` — callers turn that into `Error::InvariantViolation`,
    /// never a panic.
    pub fn checked_div_exact(&self, divisor: &Bignum) -> Option<Bignum> {
        if divisor.is_zero() {
            return None;
        }
        if !self.0.is_divisible(&divisor.0) {
            return None;
        }
        Some(Bignum(Integer::from(&self.0 / &divisor.0)))
    }

    /// `true` if `self` divides `other` evenly.
    pub fn divides(&self, other: &Bignum) -> bool {
        !self.is_zero() && other.0.is_divisible(&self.0)
    }

    /// Greatest common divisor of `self` and `other`.
    pub fn gcd(&self, other: &Bignum) -> Bignum {
        Bignum(self.0.clone().gcd(&other.0))
    }

    pub fn bit_length(&self) -> u32 {
        self.0.significant_bits()
    }

    /// Little-endian byte serialization for the level store.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_digits::<u8>(rug::integer::Order::Lsf)
    }

    /// Inverse of [`to_bytes`]. An empty slice decodes to zero.
    pub fn from_bytes(bytes: &[u8]) -> Bignum {
        if bytes.is_empty() {
            return Bignum(Integer::new());
        }
        Bignum(Integer::from_digits(bytes, rug::integer::Order::Lsf))
    }

    pub fn as_integer(&self) -> &Integer {
        &self.0
    }
}

impl fmt::Display for Bignum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Integer> for Bignum {
    fn from(n: Integer) -> Self {
        Bignum(n)
    }
}
