//! Macros for dispatching on `AnyArray` and `ArrayDataType` variants.

/// Dispatch on the `AnyArray` variants and evaluate an expression with the inner array bound to `$var`.
/// The result is not re-wrapped.
///
/// ```ignore
/// let len = dispatch_anyarray!(any_array, arr, arr.len());
/// ```
#[macro_export]
macro_rules! dispatch_anyarray {
    ($array:expr, $var:ident, $expr:expr) => {
        match $array {
            $crate::AnyArray::U8($var) => $expr,
            $crate::AnyArray::U16($var) => $expr,
            $crate::AnyArray::I16($var) => $expr,
            $crate::AnyArray::U32($var) => $expr,
            $crate::AnyArray::I32($var) => $expr,
            $crate::AnyArray::F32($var) => $expr,
            $crate::AnyArray::F64($var) => $expr,
        }
    };
}

/// Dispatch on `ArrayDataType` and evaluate `$expr` with `$t` bound to the concrete element type.
/// The expression must produce an `ndarray::ArrayD<$t>`, the result is wrapped in the matching `AnyArray` variant.
///
/// ```ignore
/// let pixels = dispatch_datatype!(data_type, T, ArrayD::<T>::zeros(shape));
/// ```
#[macro_export]
macro_rules! dispatch_datatype {
    ($data_type:expr, $t:ident, $expr:expr) => {
        match $data_type {
            $crate::ArrayDataType::Uint8 => {
                type $t = u8;
                $crate::AnyArray::U8($expr)
            }
            $crate::ArrayDataType::Uint16 => {
                type $t = u16;
                $crate::AnyArray::U16($expr)
            }
            $crate::ArrayDataType::Int16 => {
                type $t = i16;
                $crate::AnyArray::I16($expr)
            }
            $crate::ArrayDataType::Uint32 => {
                type $t = u32;
                $crate::AnyArray::U32($expr)
            }
            $crate::ArrayDataType::Int32 => {
                type $t = i32;
                $crate::AnyArray::I32($expr)
            }
            $crate::ArrayDataType::Float32 => {
                type $t = f32;
                $crate::AnyArray::F32($expr)
            }
            $crate::ArrayDataType::Float64 => {
                type $t = f64;
                $crate::AnyArray::F64($expr)
            }
        }
    };
}

/// Same as `dispatch_datatype!` but without wrapping the result in `AnyArray`.
#[macro_export]
macro_rules! dispatch_datatype_nowrap {
    ($data_type:expr, $t:ident, $expr:expr) => {
        match $data_type {
            $crate::ArrayDataType::Uint8 => {
                type $t = u8;
                $expr
            }
            $crate::ArrayDataType::Uint16 => {
                type $t = u16;
                $expr
            }
            $crate::ArrayDataType::Int16 => {
                type $t = i16;
                $expr
            }
            $crate::ArrayDataType::Uint32 => {
                type $t = u32;
                $expr
            }
            $crate::ArrayDataType::Int32 => {
                type $t = i32;
                $expr
            }
            $crate::ArrayDataType::Float32 => {
                type $t = f32;
                $expr
            }
            $crate::ArrayDataType::Float64 => {
                type $t = f64;
                $expr
            }
        }
    };
}

/// Defines a method on `AnyArray` that forwards to the inner array.
#[macro_export]
macro_rules! apply_anyarray_method {
    ($method:ident, $ret:ty) => {
        pub fn $method(&self) -> $ret {
            $crate::dispatch_anyarray!(self, arr, arr.$method())
        }
    };
}
