//! Numeric element types for transition and reward arrays.
//!
//! Processes are generic over a single element type `T`, so transitions
//! and rewards of one process always share a precision. [`Precision`] is
//! the runtime selector used by configuration to pick a monomorphised
//! code path.

use std::fmt;
use std::io::{self, Write};

use ndarray::NdFloat;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A floating-point element type usable in process matrices.
///
/// Implemented for `f32` and `f64` only. The conversions are named
/// `narrow`/`widen` to stay clear of the `num_traits` cast methods the
/// `NdFloat` bound already brings into scope.
pub trait Element: NdFloat + sealed::Sealed {
    /// Human-readable dtype name (`float32` / `float64`).
    const DTYPE: &'static str;

    /// NumPy array-protocol descriptor, little-endian (`<f4` / `<f8`).
    const NPY_DESCR: &'static str;

    /// The [`Precision`] tag for this type.
    const PRECISION: Precision;

    /// Convert from `f64`, rounding to the nearest representable value.
    fn narrow(v: f64) -> Self;

    /// Widen to `f64`.
    fn widen(self) -> f64;

    /// Write the little-endian byte representation.
    fn write_le(self, w: &mut dyn Write) -> io::Result<()>;
}

impl Element for f32 {
    const DTYPE: &'static str = "float32";
    const NPY_DESCR: &'static str = "<f4";
    const PRECISION: Precision = Precision::F32;

    fn narrow(v: f64) -> Self {
        v as f32
    }

    fn widen(self) -> f64 {
        f64::from(self)
    }

    fn write_le(self, w: &mut dyn Write) -> io::Result<()> {
        w.write_all(&self.to_le_bytes())
    }
}

impl Element for f64 {
    const DTYPE: &'static str = "float64";
    const NPY_DESCR: &'static str = "<f8";
    const PRECISION: Precision = Precision::F64;

    fn narrow(v: f64) -> Self {
        v
    }

    fn widen(self) -> f64 {
        self
    }

    fn write_le(self, w: &mut dyn Write) -> io::Result<()> {
        w.write_all(&self.to_le_bytes())
    }
}

/// Runtime precision selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Precision {
    /// 32-bit floats.
    #[default]
    F32,
    /// 64-bit floats.
    F64,
}

impl Precision {
    /// The dtype name of the selected element type.
    pub fn dtype(self) -> &'static str {
        match self {
            Self::F32 => f32::DTYPE,
            Self::F64 => f64::DTYPE,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dtype())
    }
}
