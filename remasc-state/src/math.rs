//! Checked amount arithmetic.
//!
//! Under the conservation invariant none of these can fail, but a failure
//! must abort the block rather than wrap.

use remasc_core::U256;

use crate::error::{RemascError, RemascResult};

pub(crate) fn add(a: U256, b: U256) -> RemascResult<U256> {
    a.checked_add(b).ok_or(RemascError::ArithmeticOverflow)
}

pub(crate) fn sub(a: U256, b: U256) -> RemascResult<U256> {
    a.checked_sub(b).ok_or(RemascError::ArithmeticUnderflow)
}

pub(crate) fn mul(a: U256, b: U256) -> RemascResult<U256> {
    a.checked_mul(b).ok_or(RemascError::ArithmeticOverflow)
}

/// Floor division.
pub(crate) fn div(a: U256, divisor: u64) -> RemascResult<U256> {
    Ok(div_mod(a, divisor)?.0)
}

/// Floor division and remainder.
pub(crate) fn div_mod(a: U256, divisor: u64) -> RemascResult<(U256, U256)> {
    if divisor == 0 {
        return Err(RemascError::DivisionByZero);
    }
    Ok(a.div_mod(U256::from(divisor)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_ops() {
        assert_eq!(add(U256::from(2u64), U256::from(3u64)), Ok(U256::from(5u64)));
        assert_eq!(add(U256::MAX, U256::one()), Err(RemascError::ArithmeticOverflow));
        assert_eq!(sub(U256::zero(), U256::one()), Err(RemascError::ArithmeticUnderflow));
        assert_eq!(mul(U256::MAX, U256::from(2u64)), Err(RemascError::ArithmeticOverflow));
    }

    #[test]
    fn test_div_mod() {
        assert_eq!(div_mod(U256::from(10u64), 3), Ok((U256::from(3u64), U256::one())));
        assert_eq!(div(U256::from(10u64), 0), Err(RemascError::DivisionByZero));
    }
}
