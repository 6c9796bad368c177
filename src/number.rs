//! Adaptive number decoder (C4).
//!
//! A pure function of its input slice: [`decode_number`] scans a JSON
//! number literal starting at `bytes[0]` and returns the decoded value
//! plus the number of bytes consumed. Three tiers, strictly monotone:
//! 64-bit fast path, 128-bit overflow path, NaN terminal. Never panics,
//! never returns infinity.
//!
//! Rust has no native binary128; [`DecimalQuad`] stands in for the
//! spec's "number128" tier as a sign/128-bit-mantissa/decimal-exponent
//! triple (value = ±mantissa × 10^exponent). This is not a literal
//! software float128 — it is a fixed-precision decimal, which is exactly
//! what tier 2 needs: a mantissa wider than `f64`'s 53 bits and a decimal
//! exponent range that doesn't saturate the way stacking two `f64`s
//! (a true double-double) would. See DESIGN.md for why.

/// The magnitude ceiling (decimal exponent) before even the 128-bit path
/// gives up. Matches binary128's exponent range (~10^4932), so a
/// genuinely enormous literal (`1e5000`) still terminates in tier 3.
const MAX_DECIMAL_EXPONENT: i64 = 4932;

/// Sign + 128-bit integer mantissa + decimal exponent: `value = (negative
/// ? -1 : 1) * mantissa * 10^exponent`. Used for numbers whose precision
/// or magnitude overflows both `f64` and signed/unsigned 128-bit integers
/// but not the 128-bit decimal tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalQuad {
    pub negative: bool,
    pub mantissa: u128,
    pub exponent: i32,
}

impl DecimalQuad {
    /// Lossy projection to `f64`, used by [`crate::value::Value::as_f64`]
    /// for the zero/NaN-on-mismatch accessor contract. May saturate to
    /// infinity for exponents beyond `f64`'s range; that is a property of
    /// the projection, not of the stored value.
    pub fn to_f64_lossy(self) -> f64 {
        let magnitude = self.mantissa as f64 * 10f64.powi(self.exponent);
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// The decoded result of one of the three tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodedNumber {
    /// Tier 1 (and the NaN terminal of tier 3, which is also an `f64`).
    F64(f64),
    /// Tier 2: pure integer, negative, fits in `i128`.
    I128(i128),
    /// Tier 2: pure integer, positive, exceeds `i128::MAX` but fits `u128`.
    U128(u128),
    /// Tier 2: fraction/exponent too wide for `f64` but within the
    /// 128-bit decimal tier.
    Quad(DecimalQuad),
}

/// Why [`decode_number`] rejected a literal (grammar violations only;
/// tier overflow never errors, it falls through to NaN).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberError {
    pub reason: &'static str,
}

impl core::fmt::Display for NumberError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NumberError {}

fn err(reason: &'static str) -> NumberError {
    NumberError { reason }
}

struct Components<'a> {
    negative: bool,
    int_digits: &'a [u8],
    frac_digits: &'a [u8],
    exp_value: i64,
    has_fraction: bool,
    has_exponent: bool,
}

fn scan(bytes: &[u8]) -> Result<(Components<'_>, usize), NumberError> {
    let mut i = 0usize;
    let negative = bytes.first() == Some(&b'-');
    if negative {
        i += 1;
    }

    let int_start = i;
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            i += 1;
            while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }
        _ => return Err(err("expected digit in integer part")),
    }
    let int_digits = &bytes[int_start..i];
    if int_digits.len() > 1 && int_digits[0] == b'0' {
        return Err(err("leading zero"));
    }

    let mut frac_digits: &[u8] = &[];
    let mut has_fraction = false;
    if bytes.get(i) == Some(&b'.') {
        has_fraction = true;
        i += 1;
        let frac_start = i;
        if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
            return Err(err("expected digit after decimal point"));
        }
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        frac_digits = &bytes[frac_start..i];
    }

    let mut exp_value: i64 = 0;
    let mut has_exponent = false;
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        has_exponent = true;
        i += 1;
        let exp_negative = match bytes.get(i) {
            Some(b'+') => {
                i += 1;
                false
            }
            Some(b'-') => {
                i += 1;
                true
            }
            _ => false,
        };
        if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
            return Err(err("expected digit in exponent"));
        }
        let exp_start = i;
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        for &d in &bytes[exp_start..i] {
            exp_value = exp_value.saturating_mul(10).saturating_add((d - b'0') as i64);
            if exp_value > MAX_DECIMAL_EXPONENT * 2 {
                exp_value = MAX_DECIMAL_EXPONENT * 2; // clamp; still overflows tier 2 below
            }
        }
        if exp_negative {
            exp_value = -exp_value;
        }
    }

    Ok((
        Components { negative, int_digits, frac_digits, exp_value, has_fraction, has_exponent },
        i,
    ))
}

/// Accumulates a run of ASCII digits into a `u128`, returning `None` on
/// overflow (the caller's cue to fall through to the NaN terminal).
fn accumulate_u128(digits: &[u8]) -> Option<u128> {
    let mut value: u128 = 0;
    for &d in digits {
        value = value.checked_mul(10)?.checked_add((d - b'0') as u128)?;
    }
    Some(value)
}

/// Round-trips `magnitude` through `f64` and back; `true` iff the integer
/// is exactly representable (no precision lost).
fn fits_f64_exactly(magnitude: u128) -> bool {
    let as_f64 = magnitude as f64;
    if !as_f64.is_finite() || as_f64 < 0.0 {
        return false;
    }
    as_f64 as u128 == magnitude
}

/// Decodes a JSON number literal starting at `bytes[0]`.
///
/// Returns the decoded value and the number of bytes consumed (so the
/// caller — the sequential or parallel parser — knows where the next
/// token begins). Grammar violations (leading zeros, missing digits)
/// are reported as [`NumberError`]; capacity overflow past the 128-bit
/// tier is never an error, it decodes to a NaN-carrying [`DecodedNumber::F64`].
pub fn decode_number(bytes: &[u8]) -> Result<(DecodedNumber, usize), NumberError> {
    let (c, consumed) = scan(bytes)?;

    if !c.has_fraction && !c.has_exponent {
        return Ok((decode_pure_integer(&c), consumed));
    }

    // Tier 1: fast path. The spec's individual 18-digit / 15-digit
    // thresholds can jointly describe a 33-digit mantissa that would not
    // fit a 64-bit accumulator; we additionally require the *combined*
    // digit count to fit u64 exactly (<=19 digits, mirroring the
    // combined-mantissa cap real fast-float decoders such as simdjson's
    // Eisel-Lemire path use). The 18/15 bounds are still enforced.
    let combined_digits = c.int_digits.len() + c.frac_digits.len();
    if c.int_digits.len() <= 18
        && c.frac_digits.len() <= 15
        && combined_digits <= 19
        && c.exp_value.unsigned_abs() <= 22
    {
        let mut mantissa: u64 = 0;
        for &d in c.int_digits.iter().chain(c.frac_digits.iter()) {
            mantissa = mantissa * 10 + (d - b'0') as u64;
        }
        let net_exponent = c.exp_value - c.frac_digits.len() as i64;
        let magnitude = mantissa as f64 * 10f64.powi(net_exponent as i32);
        let value = if c.negative { -magnitude } else { magnitude };
        return Ok((DecodedNumber::F64(value), consumed));
    }

    // Tier 2 / 3: accumulate the full mantissa into a 128-bit integer and
    // track the residual decimal exponent.
    let mut mantissa: u128 = 0;
    let mut overflowed = false;
    for &d in c.int_digits.iter().chain(c.frac_digits.iter()) {
        match mantissa.checked_mul(10).and_then(|m| m.checked_add((d - b'0') as u128)) {
            Some(m) => mantissa = m,
            None => {
                overflowed = true;
                break;
            }
        }
    }
    let net_exponent = c.exp_value - c.frac_digits.len() as i64;
    if overflowed || net_exponent.unsigned_abs() > MAX_DECIMAL_EXPONENT as u64 {
        return Ok((DecodedNumber::F64(f64::NAN), consumed));
    }

    Ok((
        DecodedNumber::Quad(DecimalQuad { negative: c.negative, mantissa, exponent: net_exponent as i32 }),
        consumed,
    ))
}

fn decode_pure_integer(c: &Components<'_>) -> DecodedNumber {
    let Some(magnitude) = accumulate_u128(c.int_digits) else {
        return DecodedNumber::F64(f64::NAN);
    };

    if fits_f64_exactly(magnitude) {
        let value = magnitude as f64;
        return DecodedNumber::F64(if c.negative { -value } else { value });
    }

    if c.negative {
        if magnitude <= i128::MAX as u128 + 1 {
            // i128::MIN's magnitude is i128::MAX + 1.
            let as_i128 = if magnitude == i128::MAX as u128 + 1 { i128::MIN } else { -(magnitude as i128) };
            DecodedNumber::I128(as_i128)
        } else {
            DecodedNumber::F64(f64::NAN)
        }
    } else if magnitude <= i128::MAX as u128 {
        DecodedNumber::I128(magnitude as i128)
    } else {
        DecodedNumber::U128(magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(s: &str) -> DecodedNumber {
        decode_number(s.as_bytes()).unwrap().0
    }

    #[test]
    fn small_integer_is_f64() {
        assert_eq!(decode("42"), DecodedNumber::F64(42.0));
    }

    #[test]
    fn negative_zero() {
        match decode("-0") {
            DecodedNumber::F64(v) => assert!(v.is_sign_negative() && v == 0.0),
            other => panic!("expected f64, got {other:?}"),
        }
    }

    #[test]
    fn two_pow_53_is_f64() {
        assert_eq!(decode("9007199254740992"), DecodedNumber::F64(9007199254740992.0));
    }

    #[test]
    fn two_pow_53_plus_one_promotes() {
        match decode("9007199254740993") {
            DecodedNumber::I128(v) => assert_eq!(v, 9007199254740993),
            other => panic!("expected i128, got {other:?}"),
        }
    }

    #[test]
    fn two_pow_63_minus_one_promotes() {
        match decode("9223372036854775807") {
            DecodedNumber::I128(v) => assert_eq!(v, 9223372036854775807),
            other => panic!("expected i128, got {other:?}"),
        }
    }

    #[test]
    fn two_pow_64_promotes() {
        match decode("18446744073709551616") {
            DecodedNumber::I128(v) => assert_eq!(v, 18446744073709551616),
            other => panic!("expected i128, got {other:?}"),
        }
    }

    #[test]
    fn thirty_digit_integer_promotes() {
        let v = "123456789012345678901234567890";
        match decode(v) {
            DecodedNumber::I128(got) => assert_eq!(got.to_string(), v),
            DecodedNumber::U128(got) => assert_eq!(got.to_string(), v),
            other => panic!("expected 128-bit integer, got {other:?}"),
        }
    }

    #[test]
    fn forty_two_digit_integer_is_nan() {
        let v = "1".repeat(42);
        match decode(&v) {
            DecodedNumber::F64(f) => assert!(f.is_nan()),
            other => panic!("expected NaN f64, got {other:?}"),
        }
    }

    #[test]
    fn huge_exponent_is_nan() {
        match decode("1e5000") {
            DecodedNumber::F64(f) => assert!(f.is_nan()),
            other => panic!("expected NaN f64, got {other:?}"),
        }
    }

    #[test]
    fn leading_zero_rejected() {
        assert!(decode_number(b"01").is_err());
    }

    #[test]
    fn zero_itself_accepted() {
        assert_eq!(decode("0"), DecodedNumber::F64(0.0));
    }

    #[test]
    fn trailing_bytes_not_consumed() {
        let (_, consumed) = decode_number(b"123,456").unwrap();
        assert_eq!(consumed, 3);
    }

    #[test]
    fn simple_fraction_fast_path() {
        assert_eq!(decode("3.14"), DecodedNumber::F64(3.14));
    }

    #[test]
    fn wide_fraction_promotes_to_quad() {
        match decode("1.123456789012345678901234") {
            DecodedNumber::Quad(q) => assert!(!q.negative),
            other => panic!("expected Quad, got {other:?}"),
        }
    }

    #[test]
    fn large_exponent_promotes_to_quad() {
        match decode("1e100") {
            DecodedNumber::Quad(q) => {
                assert_eq!(q.mantissa, 1);
                assert_eq!(q.exponent, 100);
            }
            other => panic!("expected Quad, got {other:?}"),
        }
    }

    #[test]
    fn missing_exponent_digit_errors() {
        assert!(decode_number(b"1e").is_err());
    }

    #[test]
    fn missing_fraction_digit_errors() {
        assert!(decode_number(b"1.").is_err());
    }
}
