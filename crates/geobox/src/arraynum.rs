use gdal::raster::GdalType;
use ndarray::ArrayD;

use crate::{AnyArray, ArrayDataType};

/// Type requirements for the elements of a pixel array
pub trait ArrayNum:
    Copy + Default + PartialEq + PartialOrd + num::NumCast + GdalType + std::fmt::Debug + Send + Sync + 'static
{
    const TYPE: ArrayDataType;

    fn into_any(array: ArrayD<Self>) -> AnyArray;
    /// Unwraps the typed array, the original is handed back on a type mismatch
    fn from_any(array: AnyArray) -> std::result::Result<ArrayD<Self>, AnyArray>;
    fn from_any_ref(array: &AnyArray) -> Option<&ArrayD<Self>>;
}

macro_rules! impl_array_num {
    ( $t:ty, $data_type:ident, $variant:ident ) => {
        impl ArrayNum for $t {
            const TYPE: ArrayDataType = ArrayDataType::$data_type;

            fn into_any(array: ArrayD<Self>) -> AnyArray {
                AnyArray::$variant(array)
            }

            fn from_any(array: AnyArray) -> std::result::Result<ArrayD<Self>, AnyArray> {
                match array {
                    AnyArray::$variant(arr) => Ok(arr),
                    other => Err(other),
                }
            }

            fn from_any_ref(array: &AnyArray) -> Option<&ArrayD<Self>> {
                match array {
                    AnyArray::$variant(arr) => Some(arr),
                    _ => None,
                }
            }
        }
    };
}

impl_array_num!(u8, Uint8, U8);
impl_array_num!(u16, Uint16, U16);
impl_array_num!(i16, Int16, I16);
impl_array_num!(u32, Uint32, U32);
impl_array_num!(i32, Int32, I32);
impl_array_num!(f32, Float32, F32);
impl_array_num!(f64, Float64, F64);
