//! Elementwise arithmetic between same-shaped grids.
//!
//! Operands are borrowed and a new grid is returned. Mismatched shapes panic.

use std::ops::{Add, Div, Mul, Sub};

use super::real::RealGrid;

macro_rules! elementwise_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&RealGrid> for &RealGrid {
            type Output = RealGrid;

            fn $method(self, rhs: &RealGrid) -> RealGrid {
                self.assert_same_shape(rhs, stringify!($method));
                RealGrid::from_array(self.as_array() $op rhs.as_array())
            }
        }

        impl $trait<RealGrid> for RealGrid {
            type Output = RealGrid;

            fn $method(self, rhs: RealGrid) -> RealGrid {
                &self $op &rhs
            }
        }
    };
}

elementwise_op!(Add, add, +);
elementwise_op!(Sub, sub, -);
elementwise_op!(Mul, mul, *);
elementwise_op!(Div, div, /);
