/// Generates boilerplate operator impls for single-field tuple structs.
///
/// `op!(binary Amount, Add, add)` expands to an `impl Add for Amount` that
/// applies the operator to the inner value. `inplace` and `unary` follow the
/// same pattern for assignment and negation operators.
#[macro_export]
macro_rules! op {
    (binary $ty:ident, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $ty {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0, rhs.0))
            }
        }
    };
    (inplace $ty:ident, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $ty {
            fn $method(&mut self, rhs: Self) {
                std::ops::$trait::$method(&mut self.0, rhs.0)
            }
        }
    };
    (unary $ty:ident, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $ty {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0))
            }
        }
    };
}
