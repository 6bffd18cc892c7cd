use alloy::primitives::U256;
use fastnum::{
    D256, bint,
    decimal::{Context, RoundingMode, Sign},
};

/// Fixed-point delta formatter.
///
/// Renders the signed difference between two on-chain magnitudes as a
/// decimal string at a fixed scale: always plain notation with exactly
/// `decimals` fractional digits, at any scale.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    decimals: u32,
}

impl Converter {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals as u32,
        }
    }

    /// Sign and unsigned magnitude of `close - open`.
    fn split(close: U256, open: U256) -> (bool, U256) {
        if close >= open {
            (false, close - open)
        } else {
            (true, open - close)
        }
    }

    /// Signed delta `(close - open) / 10^decimals` as a decimal value.
    pub fn delta(&self, close: U256, open: U256) -> D256 {
        let (negative, magnitude) = Self::split(close, open);
        let unscaled = bint::UInt::<4>::from_le_slice(magnitude.as_le_slice())
            .expect("Converter: U256 -> UInt::<4>");
        D256::from_parts(
            unscaled,
            -(self.decimals as i32),
            if negative { Sign::Minus } else { Sign::Plus },
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }

    /// Delta rendered as a plain decimal string, e.g. `"-0.100000"`.
    ///
    /// Formatted from the integer magnitude directly, splitting its
    /// decimal digits around the scale point, so the output never falls
    /// into scientific notation the way a generic decimal `Display`
    /// does for small magnitudes at high scales.
    pub fn delta_string(&self, close: U256, open: U256) -> String {
        let (negative, magnitude) = Self::split(close, open);
        let sign = if negative { "-" } else { "" };
        let digits = magnitude.to_string();
        let scale = self.decimals as usize;
        if scale == 0 {
            return format!("{sign}{digits}");
        }
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            format!("{sign}{int}.{frac}")
        } else {
            format!("{sign}0.{digits:0>scale$}")
        }
    }
}
