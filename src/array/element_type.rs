//! Element types.
//!
//! Every element of a [`FlatArray`](super::FlatArray) has the same fixed-size [`ElementType`].

use derive_more::{Display, From};
use half::{bf16, f16};
use num_complex::Complex;
use thiserror::Error;

/// An element type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
#[non_exhaustive]
#[rustfmt::skip]
pub enum ElementType {
    /// `bool` Boolean, stored as a single byte.
    #[display("bool")]
    Bool,
    /// `int8` Integer in `[-2^7, 2^7-1]`.
    #[display("int8")]
    Int8,
    /// `int16` Integer in `[-2^15, 2^15-1]`.
    #[display("int16")]
    Int16,
    /// `int32` Integer in `[-2^31, 2^31-1]`.
    #[display("int32")]
    Int32,
    /// `int64` Integer in `[-2^63, 2^63-1]`.
    #[display("int64")]
    Int64,
    /// `uint8` Integer in `[0, 2^8-1]`.
    #[display("uint8")]
    UInt8,
    /// `uint16` Integer in `[0, 2^16-1]`.
    #[display("uint16")]
    UInt16,
    /// `uint32` Integer in `[0, 2^32-1]`.
    #[display("uint32")]
    UInt32,
    /// `uint64` Integer in `[0, 2^64-1]`.
    #[display("uint64")]
    UInt64,
    /// `float16` IEEE 754 half-precision floating point: sign bit, 5 bits exponent, 10 bits mantissa.
    #[display("float16")]
    Float16,
    /// `float32` IEEE 754 single-precision floating point: sign bit, 8 bits exponent, 23 bits mantissa.
    #[display("float32")]
    Float32,
    /// `float64` IEEE 754 double-precision floating point: sign bit, 11 bits exponent, 52 bits mantissa.
    #[display("float64")]
    Float64,
    /// `bfloat16` brain floating point data type: sign bit, 8 bits exponent, 7 bits mantissa.
    #[display("bfloat16")]
    BFloat16,
    /// `complex64` real and complex components are each IEEE 754 single-precision floating point.
    #[display("complex64")]
    Complex64,
    /// `complex128` real and complex components are each IEEE 754 double-precision floating point.
    #[display("complex128")]
    Complex128,
    /// `r*` raw bits, variable size given by *, limited to be a multiple of 8.
    #[display("r{}", _0 * 8)]
    RawBits(usize), // the stored usize is the size in bytes
}

/// An unsupported element type error.
#[derive(Debug, Error, From)]
#[error("unsupported element type {0}")]
pub struct UnsupportedElementTypeError(String);

impl ElementType {
    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Returns the size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 | Self::Float16 | Self::BFloat16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 | Self::Complex64 => 8,
            Self::Complex128 => 16,
            Self::RawBits(size) => *size,
        }
    }
}

impl std::str::FromStr for ElementType {
    type Err = UnsupportedElementTypeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "bool" => Ok(Self::Bool),
            "int8" => Ok(Self::Int8),
            "int16" => Ok(Self::Int16),
            "int32" => Ok(Self::Int32),
            "int64" => Ok(Self::Int64),
            "uint8" => Ok(Self::UInt8),
            "uint16" => Ok(Self::UInt16),
            "uint32" => Ok(Self::UInt32),
            "uint64" => Ok(Self::UInt64),
            "float16" => Ok(Self::Float16),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            "bfloat16" => Ok(Self::BFloat16),
            "complex64" => Ok(Self::Complex64),
            "complex128" => Ok(Self::Complex128),
            _ => {
                if let Some(bits) = name.strip_prefix('r') {
                    if let Ok(bits) = bits.parse::<usize>() {
                        if bits > 0 && bits % 8 == 0 {
                            return Ok(Self::RawBits(bits / 8));
                        }
                    }
                }
                Err(UnsupportedElementTypeError(name.to_string()))
            }
        }
    }
}

/// A fixed-size element which can be reinterpreted from the bytes of an array of a compatible [`ElementType`].
pub trait Element: bytemuck::Pod + Send + Sync {
    /// Returns true if elements of `element_type` can be reinterpreted as `Self`.
    fn is_compatible(element_type: &ElementType) -> bool;
}

macro_rules! impl_element {
    ($type:ty, $($element_type:pat),+) => {
        impl Element for $type {
            fn is_compatible(element_type: &ElementType) -> bool {
                matches!(element_type, $($element_type)|+)
            }
        }
    };
}

impl_element!(i8, ElementType::Int8, ElementType::RawBits(1));
impl_element!(i16, ElementType::Int16);
impl_element!(i32, ElementType::Int32);
impl_element!(i64, ElementType::Int64);
impl_element!(u8, ElementType::UInt8, ElementType::Bool, ElementType::RawBits(1));
impl_element!(u16, ElementType::UInt16);
impl_element!(u32, ElementType::UInt32);
impl_element!(u64, ElementType::UInt64);
impl_element!(f16, ElementType::Float16);
impl_element!(bf16, ElementType::BFloat16);
impl_element!(f32, ElementType::Float32);
impl_element!(f64, ElementType::Float64);
impl_element!(Complex<f32>, ElementType::Complex64);
impl_element!(Complex<f64>, ElementType::Complex128);

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn element_type_names() {
        for element_type in [
            ElementType::Bool,
            ElementType::Int8,
            ElementType::Int16,
            ElementType::Int32,
            ElementType::Int64,
            ElementType::UInt8,
            ElementType::UInt16,
            ElementType::UInt32,
            ElementType::UInt64,
            ElementType::Float16,
            ElementType::Float32,
            ElementType::Float64,
            ElementType::BFloat16,
            ElementType::Complex64,
            ElementType::Complex128,
            ElementType::RawBits(3),
        ] {
            assert_eq!(
                ElementType::from_str(&element_type.name()).unwrap(),
                element_type
            );
        }
        assert_eq!(ElementType::RawBits(3).name(), "r24");
    }

    #[test]
    fn element_type_sizes() {
        assert_eq!(ElementType::Bool.size(), 1);
        assert_eq!(ElementType::BFloat16.size(), 2);
        assert_eq!(ElementType::Float32.size(), 4);
        assert_eq!(ElementType::Complex64.size(), 8);
        assert_eq!(ElementType::Complex128.size(), 16);
        assert_eq!(ElementType::from_str("r16").unwrap().size(), 2);
    }

    #[test]
    fn element_type_unsupported() {
        assert!(ElementType::from_str("float8").is_err());
        assert!(ElementType::from_str("r0").is_err());
        assert!(ElementType::from_str("r7").is_err());
        assert_eq!(
            ElementType::from_str("string").unwrap_err().to_string(),
            "unsupported element type string"
        );
    }

    #[test]
    fn element_compatibility() {
        assert!(f32::is_compatible(&ElementType::Float32));
        assert!(!f32::is_compatible(&ElementType::Int32));
        assert!(u8::is_compatible(&ElementType::Bool));
        assert!(Complex::<f64>::is_compatible(&ElementType::Complex128));
        assert!(bf16::is_compatible(&ElementType::BFloat16));
        assert!(!f16::is_compatible(&ElementType::BFloat16));
    }
}
