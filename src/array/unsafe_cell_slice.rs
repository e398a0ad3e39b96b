use std::{cell::UnsafeCell, ops::Range};

/// An unsafe cell slice.
///
/// It can be used to acquire multiple mutable references to disjoint parts of a slice, enabling writing from multiple threads.
/// This is inherently unsafe and it is the responsibility of the caller to ensure safety.
#[derive(Copy, Clone)]
pub struct UnsafeCellSlice<'a, T>(&'a [UnsafeCell<T>]);

unsafe impl<'a, T: Send + Sync> Send for UnsafeCellSlice<'a, T> {}
unsafe impl<'a, T: Send + Sync> Sync for UnsafeCellSlice<'a, T> {}

impl<'a, T: Copy> UnsafeCellSlice<'a, T> {
    /// Create a new [`UnsafeCellSlice`].
    #[must_use]
    pub fn new(slice: &'a mut [T]) -> Self {
        let ptr = slice as *mut [T] as *const [UnsafeCell<T>];
        Self(unsafe { &*ptr })
    }

    /// Create a new [`UnsafeCellSlice`] from the spare capacity in a [`Vec`].
    #[must_use]
    pub fn new_from_vec_with_spare_capacity(vec: &'a mut Vec<T>) -> Self {
        Self::new(unsafe { vec_spare_capacity_to_mut_slice(vec) })
    }

    /// Get a mutable reference to the elements of `range`.
    ///
    /// # Safety
    /// This returns a mutable reference to part of the underlying slice despite `self` being a non-mutable reference.
    /// It is the responsibility of the caller not to hold overlapping ranges at the same time, in particular from more than one thread.
    ///
    /// # Panics
    /// Panics if `range` is out of bounds.
    #[must_use]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn index_mut(&self, range: Range<usize>) -> &mut [T] {
        let cells = &self.0[range];
        std::slice::from_raw_parts_mut(UnsafeCell::raw_get(cells.as_ptr()), cells.len())
    }

    /// Get the length of the slice.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the slice has a length of 0.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Get a mutable slice of the spare capacity in a vector.
unsafe fn vec_spare_capacity_to_mut_slice<T>(vec: &mut Vec<T>) -> &mut [T] {
    let spare_capacity = vec.spare_capacity_mut();
    unsafe {
        std::slice::from_raw_parts_mut(
            spare_capacity.as_mut_ptr().cast::<T>(),
            spare_capacity.len(),
        )
    }
}
