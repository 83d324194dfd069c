//! Pure arithmetic behind the calculator tools.
//!
//! Operands are `i64`. Results are widened so every valid input has an
//! exact answer: sums, differences, products and lcm are `i128`, gcd is
//! `u64`, and factorial is an arbitrary-precision [`BigUint`].

use num_bigint::BigUint;

/// Input violated a mathematical precondition of an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Cannot divide by zero.")]
    DivisionByZero,
    #[error("Cannot take the remainder of division by zero.")]
    ModulusByZero,
    #[error("The factorial of a negative number does not exist.")]
    NegativeFactorial,
    #[error("Cannot take square root of a negative number.")]
    NegativeSquareRoot,
    #[error("The least common multiple of 0 and 0 is undefined.")]
    LcmOfZeros,
}

pub fn add(a: i64, b: i64) -> i128 {
    a as i128 + b as i128
}

pub fn subtract(a: i64, b: i64) -> i128 {
    a as i128 - b as i128
}

pub fn multiply(a: i64, b: i64) -> i128 {
    a as i128 * b as i128
}

pub fn divide(a: i64, b: i64) -> Result<f64, DomainError> {
    if b == 0 {
        return Err(DomainError::DivisionByZero);
    }
    Ok(a as f64 / b as f64)
}

/// Truncated remainder: the sign follows the dividend (`-7 % 3 == -1`).
pub fn modulus(a: i64, b: i64) -> Result<i64, DomainError> {
    if b == 0 {
        return Err(DomainError::ModulusByZero);
    }
    // i64::MIN % -1 overflows in the intermediate quotient only.
    Ok(a.checked_rem(b).unwrap_or(0))
}

pub fn factorial(n: i64) -> Result<BigUint, DomainError> {
    let n = u64::try_from(n).map_err(|_| DomainError::NegativeFactorial)?;
    Ok((2..=n).fold(BigUint::from(1u32), |acc, k| acc * k))
}

pub fn square_root(a: f64) -> Result<f64, DomainError> {
    if a < 0.0 {
        return Err(DomainError::NegativeSquareRoot);
    }
    Ok(a.sqrt())
}

/// `gcd(i64::MIN, 0)` is 2^63, hence the unsigned result.
pub fn gcd(a: i64, b: i64) -> u64 {
    let (mut x, mut y) = (a.unsigned_abs(), b.unsigned_abs());
    while y != 0 {
        (x, y) = (y, x % y);
    }
    x
}

pub fn lcm(a: i64, b: i64) -> Result<i128, DomainError> {
    if a == 0 && b == 0 {
        return Err(DomainError::LcmOfZeros);
    }
    // |a| / gcd * |b| <= 2^126
    let reduced = a.unsigned_abs() / gcd(a, b);
    Ok(reduced as i128 * b.unsigned_abs() as i128)
}
