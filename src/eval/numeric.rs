//! Decimal arithmetic for the numeric functions.
//!
//! Operands arrive as text and are parsed into arbitrary-precision decimals
//! with the decimal separator captured when the function was parsed. Every
//! accumulator is a local of the evaluation call, so one node can be
//! evaluated from any number of threads at once.

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};
use tracing::debug;

use super::context::Values;
use crate::ast::{CompareMode, Division, FunctionRef, NumericOp, Value};

/// Stand-in for `.` while parsing with a different separator. Not a digit, so
/// a stray grouping dot makes the number malformed instead of fractional.
const PLACEHOLDER: char = 'ß';

/// Largest accepted power of ten, in either direction, of a parsed number.
pub const DEFAULT_SCALE_LIMIT: u32 = 4096;

/// Decimal separator handling for parsing and printing numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalFormat {
    separator: char,
    scale_limit: u32,
}

impl Default for DecimalFormat {
    fn default() -> Self {
        Self::new('.')
    }
}

impl DecimalFormat {
    pub fn new(separator: char) -> Self {
        Self {
            separator,
            scale_limit: DEFAULT_SCALE_LIMIT,
        }
    }

    pub fn with_scale_limit(mut self, scale_limit: u32) -> Self {
        self.scale_limit = scale_limit;
        self
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn scale_limit(&self) -> u32 {
        self.scale_limit
    }

    /// `None` for malformed text and for numbers whose exponent exceeds the
    /// scale limit. Printing those would need an unbounded number of zeros.
    pub fn parse(&self, text: &str) -> Option<BigDecimal> {
        let parsed = if self.separator == '.' {
            BigDecimal::from_str(text)
        } else {
            let canonical = text
                .replace('.', &PLACEHOLDER.to_string())
                .replace(self.separator, ".");
            BigDecimal::from_str(&canonical)
        };
        match parsed {
            Ok(number) if number.is_zero() => Some(BigDecimal::zero()),
            Ok(number) => {
                let (_, scale) = number.as_bigint_and_exponent();
                if scale.unsigned_abs() > u64::from(self.scale_limit) {
                    debug!(
                        "number out of range: {:?} (scale {}, limit {})",
                        text, scale, self.scale_limit
                    );
                    return None;
                }
                Some(number)
            }
            Err(e) => {
                debug!("not a number: {:?} ({})", text, e);
                None
            }
        }
    }

    /// Shortest plain representation; exact zero is always `"0"`.
    pub fn format(&self, number: &BigDecimal) -> String {
        if number.is_zero() {
            return "0".to_string();
        }
        self.localize(plain_string(&number.normalized()))
    }

    fn localize(&self, text: String) -> String {
        if self.separator == '.' {
            text
        } else {
            text.replace('.', &self.separator.to_string())
        }
    }
}

/// Renders without exponent notation, keeping the scale as is.
fn plain_string(number: &BigDecimal) -> String {
    let (digits, scale) = number.as_bigint_and_exponent();
    let mut text = digits.magnitude().to_string();
    if scale <= 0 {
        text.extend(std::iter::repeat('0').take(scale.unsigned_abs() as usize));
    } else {
        let scale = scale as usize;
        if text.len() <= scale {
            let padding = "0".repeat(scale + 1 - text.len());
            text.insert_str(0, &padding);
        }
        text.insert(text.len() - scale, '.');
    }
    if digits.sign() == Sign::Minus {
        text.insert(0, '-');
    }
    text
}

fn read_decimal(
    operand: &FunctionRef,
    format: &DecimalFormat,
    values: &dyn Values,
) -> Option<BigDecimal> {
    let value = operand.eval_string(values);
    if value.is_error() {
        return None;
    }
    format.parse(value.as_str())
}

fn sign_text(sign: i32) -> Value {
    Value::text(match sign.signum() {
        -1 => "-1",
        1 => "1",
        _ => "true",
    })
}

pub(crate) fn accumulate(
    op: NumericOp,
    operands: &[FunctionRef],
    format: &DecimalFormat,
    values: &dyn Values,
) -> Value {
    let mut total: Option<BigDecimal> = None;
    for operand in operands {
        let Some(number) = read_decimal(operand, format, values) else {
            return Value::Error;
        };
        total = Some(match total {
            None => number,
            Some(acc) => match op {
                NumericOp::Product => acc * number,
                NumericOp::Diff => acc - number,
                _ => acc + number,
            },
        });
    }

    let total = total.unwrap_or_else(|| match op {
        NumericOp::Product => BigDecimal::one(),
        _ => BigDecimal::zero(),
    });

    match op {
        NumericOp::Sum | NumericOp::Diff | NumericOp::Product => Value::text(format.format(&total)),
        NumericOp::Minus => Value::text(format.format(&-total)),
        NumericOp::Abs => Value::text(format.format(&total.abs())),
        NumericOp::Sign => Value::text(match total.sign() {
            Sign::Minus => "-1",
            Sign::NoSign => "0",
            Sign::Plus => "1",
        }),
    }
}

/// `dividend / divisor` rounded half-up to `scale` fractional digits.
/// `None` for a zero divisor.
fn divide_half_up(dividend: &BigDecimal, divisor: &BigDecimal, scale: u32) -> Option<BigDecimal> {
    let (a, a_scale) = dividend.as_bigint_and_exponent();
    let (b, b_scale) = divisor.as_bigint_and_exponent();
    if b.is_zero() {
        return None;
    }

    let shift = i64::from(scale) + b_scale - a_scale;
    let ten = BigInt::from(10u32);
    let (numerator, denominator) = if shift >= 0 {
        (a * num_traits::pow(ten, shift as usize), b)
    } else {
        (a, b * num_traits::pow(ten, shift.unsigned_abs() as usize))
    };

    let mut quotient = &numerator / &denominator;
    let remainder = &numerator % &denominator;
    let twice: BigUint = remainder.magnitude() + remainder.magnitude();
    if !remainder.is_zero() && twice >= *denominator.magnitude() {
        if (numerator.sign() == Sign::Minus) != (denominator.sign() == Sign::Minus) {
            quotient -= BigInt::one();
        } else {
            quotient += BigInt::one();
        }
    }
    Some(BigDecimal::new(quotient, i64::from(scale)))
}

pub(crate) fn divide(division: &Division, values: &dyn Values) -> Value {
    let dividend = division.dividend.eval_string(values);
    if dividend.is_error() {
        return Value::Error;
    }
    let divisor = match &division.divisor {
        Some(divisor) => divisor.eval_string(values),
        None => Value::text("1"),
    };
    if divisor.is_error() {
        return Value::Error;
    }

    let format = &division.format;
    let (Some(dividend), Some(divisor)) = (
        format.parse(dividend.as_str()),
        format.parse(divisor.as_str()),
    ) else {
        return Value::Error;
    };
    let Some(quotient) = divide_half_up(&dividend, &divisor, division.max_scale) else {
        debug!("division by zero");
        return Value::Error;
    };

    let mut text = if quotient.is_zero() {
        "0".to_string()
    } else {
        plain_string(&quotient.normalized())
    };

    let min_scale = division.min_scale as usize;
    let decimals = match text.find('.') {
        Some(idx) => text.len() - idx - 1,
        None => {
            if min_scale > 0 {
                text.push('.');
            }
            0
        }
    };
    for _ in decimals..min_scale {
        text.push('0');
    }
    Value::text(format.localize(text))
}

impl CompareMode {
    /// Whether comparing the first operand with a later one (`first.cmp(later)`)
    /// makes the comparison fail.
    fn rejects(&self, ordering: Ordering) -> bool {
        match self {
            CompareMode::Lt => ordering != Ordering::Less,
            CompareMode::Le => ordering == Ordering::Greater,
            CompareMode::Gt => ordering != Ordering::Greater,
            CompareMode::Ge => ordering == Ordering::Less,
            CompareMode::NumCmp => false,
        }
    }
}

pub(crate) fn compare(
    mode: CompareMode,
    operands: &[FunctionRef],
    margin: Option<&FunctionRef>,
    format: &DecimalFormat,
    values: &dyn Values,
) -> Value {
    let margin = match margin {
        Some(margin) => match read_decimal(margin, format, values) {
            Some(m) => m.abs(),
            None => return Value::Error,
        },
        None => BigDecimal::zero(),
    };

    let mut iter = operands.iter();
    let reference = match iter.next() {
        Some(first) => match read_decimal(first, format, values) {
            Some(n) => n,
            None => return Value::Error,
        },
        None => return Value::text("true"),
    };
    let low = &reference - &margin;
    let high = &reference + &margin;

    let mut running: i32 = 0;
    for operand in iter {
        let Some(number) = read_decimal(operand, format, values) else {
            return Value::Error;
        };
        let ordering = if low <= number && number <= high {
            Ordering::Equal
        } else {
            reference.cmp(&number)
        };
        if mode.rejects(ordering) {
            return Value::text("false");
        }
        let res = ordering as i32;
        if res * running < 0 {
            return Value::text("0");
        }
        running += res;
    }

    match mode {
        CompareMode::NumCmp => sign_text(running),
        _ => Value::text("true"),
    }
}

/// Lexicographic comparison of neighbouring operands, by UTF-16 code unit.
pub(crate) fn compare_strings(operands: &[FunctionRef], values: &dyn Values) -> Value {
    let mut iter = operands.iter();
    let Some(first) = iter.next() else {
        return Value::text("true");
    };
    let mut previous = first.eval_string(values);
    if previous.is_error() {
        return Value::Error;
    }

    let mut running: i32 = 0;
    for operand in iter {
        let current = operand.eval_string(values);
        if current.is_error() {
            return Value::Error;
        }
        let res = previous
            .as_str()
            .encode_utf16()
            .cmp(current.as_str().encode_utf16()) as i32;
        if res * running < 0 {
            return Value::text("0");
        }
        running += res;
        previous = current;
    }
    sign_text(running)
}
