//! Modular arithmetic over arbitrary-precision unsigned integers.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::CryptoError;

/// Compute `base^exponent mod modulus` by left-to-right square-and-multiply.
///
/// Walks the exponent from its most significant bit: square on every bit,
/// multiply by `base` when the bit is set.
pub fn mod_pow(
    base: &BigUint,
    exponent: &BigUint,
    modulus: &BigUint,
) -> Result<BigUint, CryptoError> {
    if modulus.is_zero() {
        return Err(CryptoError::ZeroModulus);
    }
    if modulus.is_one() {
        return Ok(BigUint::zero());
    }

    let base = base % modulus;
    let mut result = BigUint::one();
    for byte in exponent.to_bytes_be() {
        for shift in (0..8).rev() {
            result = &result * &result % modulus;
            if (byte >> shift) & 1 == 1 {
                result = result * &base % modulus;
            }
        }
    }
    Ok(result)
}

/// Compute `a * b mod modulus`.
pub fn mod_mul(a: &BigUint, b: &BigUint, modulus: &BigUint) -> Result<BigUint, CryptoError> {
    if modulus.is_zero() {
        return Err(CryptoError::ZeroModulus);
    }
    Ok(a * b % modulus)
}

/// Compute `value^2 mod modulus`.
pub fn mod_square(value: &BigUint, modulus: &BigUint) -> Result<BigUint, CryptoError> {
    mod_pow(value, &BigUint::from(2u8), modulus)
}
