//! Element kinds.
//!
//! The engine is generic over the element type, so every primitive kind gets
//! the same pipeline, sinks and cursors by monomorphisation.

use std::fmt::Debug;
use std::ops::Add;

/// One of the seven primitive element kinds.
pub trait Primitive: Copy + Debug + PartialOrd + Send + Sync + 'static {}

/// Primitive kinds with an additive identity, used by `sum`.
pub trait Numeric: Primitive + Add<Output = Self> {
    fn zero() -> Self;
}

macro_rules! primitive {
    ($ty:ty) => {
        impl Primitive for $ty {}
    };
    ($ty:ty, $zero:expr) => {
        primitive!($ty);

        impl Numeric for $ty {
            fn zero() -> Self {
                $zero
            }
        }
    };
}

primitive!(i8, 0);
primitive!(i16, 0);
primitive!(char);
primitive!(i32, 0);
primitive!(i64, 0);
primitive!(f32, 0.0);
primitive!(f64, 0.0);
