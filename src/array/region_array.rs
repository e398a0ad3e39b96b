use std::borrow::Cow;

use super::{ArrayShape, Element, ElementType, ReadError};

/// The result of a read: a row-major array of the shape of a region.
///
/// Holds raw element bytes in native byte order, which can be reinterpreted as typed elements with [`as_elements`](RegionArray::as_elements) or [`into_elements`](RegionArray::into_elements).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionArray {
    shape: ArrayShape,
    element_type: ElementType,
    bytes: Vec<u8>,
}

impl RegionArray {
    /// Create a new region array from raw element bytes.
    ///
    /// # Errors
    /// Returns
    ///  - [`ReadError::TypeMismatch`] if the length of `bytes` is not a multiple of the element size, or
    ///  - [`ReadError::InvalidBytesLength`] if `bytes` does not hold exactly the number of elements of `shape`.
    pub fn new(
        shape: ArrayShape,
        element_type: ElementType,
        bytes: Vec<u8>,
    ) -> Result<Self, ReadError> {
        validate_element_bytes(bytes.len(), &element_type)?;
        let expected = shape.iter().product::<u64>() * element_type.size() as u64;
        if bytes.len() as u64 == expected {
            Ok(Self {
                shape,
                element_type,
                bytes,
            })
        } else {
            Err(ReadError::InvalidBytesLength(bytes.len() as u64, expected))
        }
    }

    /// Return the shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Return the element type.
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Return the number of elements.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.shape.iter().product()
    }

    /// Returns true if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Return the raw element bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Convert into the raw element bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Reinterpret the elements as `T`.
    ///
    /// The elements are borrowed if the bytes are suitably aligned for `T`, otherwise they are copied.
    ///
    /// # Errors
    /// Returns [`ReadError::IncompatibleElementType`] if `T` is not compatible with the element type.
    pub fn as_elements<T: Element>(&self) -> Result<Cow<'_, [T]>, ReadError> {
        self.validate_element::<T>()?;
        Ok(bytemuck::try_cast_slice(&self.bytes).map_or_else(
            |_| Cow::Owned(bytemuck::pod_collect_to_vec(&self.bytes)),
            Cow::Borrowed,
        ))
    }

    /// Convert into elements of type `T`.
    ///
    /// # Errors
    /// Returns [`ReadError::IncompatibleElementType`] if `T` is not compatible with the element type.
    pub fn into_elements<T: Element>(self) -> Result<Vec<T>, ReadError> {
        self.validate_element::<T>()?;
        Ok(bytemuck::pod_collect_to_vec(&self.bytes))
    }

    #[cfg(feature = "ndarray")]
    /// Convert into an [`ndarray::ArrayD`] of elements of type `T`.
    ///
    /// # Errors
    /// Returns [`ReadError::IncompatibleElementType`] if `T` is not compatible with the element type.
    /// Returns [`ReadError::InvalidBytesLength`] if the shape cannot be represented on this platform.
    pub fn into_ndarray<T: Element>(self) -> Result<ndarray::ArrayD<T>, ReadError> {
        let num_elements = self.num_elements();
        let shape = super::iter_u64_to_usize(self.shape.iter())
            .map_err(|_| ReadError::InvalidBytesLength(self.bytes.len() as u64, num_elements))?;
        let elements = self.into_elements::<T>()?;
        ndarray::ArrayD::<T>::from_shape_vec(shape, elements).map_err(|_| {
            ReadError::InvalidBytesLength(num_elements * std::mem::size_of::<T>() as u64, num_elements)
        })
    }

    fn validate_element<T: Element>(&self) -> Result<(), ReadError> {
        if T::is_compatible(&self.element_type) && std::mem::size_of::<T>() == self.element_type.size() {
            Ok(())
        } else {
            Err(ReadError::IncompatibleElementType(
                std::mem::size_of::<T>(),
                self.element_type,
            ))
        }
    }
}

/// Check that `num_bytes` is a whole number of elements of `element_type`.
///
/// # Errors
/// Returns [`ReadError::TypeMismatch`] if `num_bytes` is not a multiple of the element size.
pub(crate) fn validate_element_bytes(
    num_bytes: usize,
    element_type: &ElementType,
) -> Result<(), ReadError> {
    let element_size = element_type.size();
    if element_size != 0 && num_bytes % element_size == 0 {
        Ok(())
    } else {
        Err(ReadError::TypeMismatch(num_bytes as u64, element_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_array_elements() -> Result<(), Box<dyn std::error::Error>> {
        let elements: Vec<u16> = (0..6).collect();
        let bytes = bytemuck::cast_slice::<u16, u8>(&elements).to_vec();
        let array = RegionArray::new(vec![2, 3], ElementType::UInt16, bytes)?;
        assert_eq!(array.shape(), &[2, 3]);
        assert_eq!(array.num_elements(), 6);
        assert_eq!(array.as_elements::<u16>()?.as_ref(), elements.as_slice());
        assert!(matches!(
            array.as_elements::<i16>(),
            Err(ReadError::IncompatibleElementType(2, ElementType::UInt16))
        ));
        assert!(array.clone().into_elements::<u32>().is_err());
        assert_eq!(array.into_elements::<u16>()?, elements);
        Ok(())
    }

    #[test]
    fn region_array_invalid_bytes() {
        assert!(matches!(
            RegionArray::new(vec![2], ElementType::Float32, vec![0; 7]),
            Err(ReadError::TypeMismatch(7, 4))
        ));
        assert!(matches!(
            RegionArray::new(vec![2], ElementType::Float32, vec![0; 12]),
            Err(ReadError::InvalidBytesLength(12, 8))
        ));
        assert!(RegionArray::new(vec![0, 2], ElementType::Float32, vec![])
            .unwrap()
            .is_empty());
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn region_array_ndarray() -> Result<(), Box<dyn std::error::Error>> {
        let elements: Vec<f64> = (0..6).map(f64::from).collect();
        let bytes = bytemuck::cast_slice::<f64, u8>(&elements).to_vec();
        let array = RegionArray::new(vec![3, 2], ElementType::Float64, bytes)?;
        let array = array.into_ndarray::<f64>()?;
        assert_eq!(array.shape(), &[3, 2]);
        assert_eq!(array[[2, 1]], 5.0);
        Ok(())
    }
}
