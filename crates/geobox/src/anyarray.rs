use ndarray::{Array, ArrayD, Dimension};

use crate::{ArrayDataType, ArrayNum, Error, Result};

/// Pixel array with an element type that is only known at runtime.
/// Holds 2-D `(height, width)` or 3-D `(bands, height, width)` data.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyArray {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    I16(ArrayD<i16>),
    U32(ArrayD<u32>),
    I32(ArrayD<i32>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl AnyArray {
    apply_anyarray_method!(ndim, usize);
    apply_anyarray_method!(len, usize);
    apply_anyarray_method!(is_empty, bool);

    pub fn data_type(&self) -> ArrayDataType {
        match self {
            AnyArray::U8(_) => ArrayDataType::Uint8,
            AnyArray::U16(_) => ArrayDataType::Uint16,
            AnyArray::I16(_) => ArrayDataType::Int16,
            AnyArray::U32(_) => ArrayDataType::Uint32,
            AnyArray::I32(_) => ArrayDataType::Int32,
            AnyArray::F32(_) => ArrayDataType::Float32,
            AnyArray::F64(_) => ArrayDataType::Float64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        dispatch_anyarray!(self, arr, arr.shape())
    }

    pub fn as_typed<T: ArrayNum>(&self) -> Option<&ArrayD<T>> {
        T::from_any_ref(self)
    }

    pub fn into_typed<T: ArrayNum>(self) -> Result<ArrayD<T>> {
        T::from_any(self).map_err(|other| {
            Error::InvalidArgument(format!("Expected a {} array, got {}", T::TYPE, other.data_type()))
        })
    }

    /// Converts every element to the requested data type.
    /// Fails when a value cannot be represented in the target type.
    pub fn cast(&self, data_type: ArrayDataType) -> Result<AnyArray> {
        if self.data_type() == data_type {
            return Ok(self.clone());
        }

        dispatch_anyarray!(self, arr, cast_array(arr, data_type))
    }
}

fn cast_array<S: ArrayNum>(arr: &ArrayD<S>, data_type: ArrayDataType) -> Result<AnyArray> {
    Ok(dispatch_datatype!(data_type, T, cast_elements::<S, T>(arr)?))
}

fn cast_elements<S: ArrayNum, T: ArrayNum>(arr: &ArrayD<S>) -> Result<ArrayD<T>> {
    let mut values = Vec::with_capacity(arr.len());
    for &v in arr.iter() {
        let converted: T = num::NumCast::from(v)
            .ok_or_else(|| Error::InvalidArgument(format!("Value {v:?} does not fit in data type {}", T::TYPE)))?;
        values.push(converted);
    }

    ArrayD::from_shape_vec(arr.raw_dim(), values).map_err(|e| Error::Runtime(format!("Array cast failed: {e}")))
}

impl<T: ArrayNum, D: Dimension> From<Array<T, D>> for AnyArray {
    fn from(array: Array<T, D>) -> Self {
        T::into_any(array.into_dyn())
    }
}
