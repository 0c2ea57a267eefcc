use alloc::vec::Vec;
use core::ops::{Index, IndexMut};
use core::ptr::NonNull;

use crate::{DefaultDelete, Deleter, HandleError, UniquePtr};

// -----------------------------------------------------------------------------
// UniqueArray

/// An owning pointer to a whole array.
///
/// This is [`UniquePtr`] over a `[T]` pointee. It shares every ownership
/// operation with the single-object form and adds indexed access. The
/// default deleter releases the entire array.
///
/// The element count is part of the raw `*mut [T]` the handle is built
/// from. The handle stores nothing beyond that pointer and its deleter.
///
/// # Examples
///
/// ```
/// use solo_ptr::UniqueArray;
///
/// let mut array = UniqueArray::from(vec![0u32; 5]);
///
/// array[2] = 7;
/// assert_eq!(array[2], 7);
/// assert_eq!(&*array, &[0, 0, 7, 0, 0]);
///
/// assert!(array.try_get(5).is_err());
/// ```
pub type UniqueArray<T, D = DefaultDelete> = UniquePtr<[T], D>;

impl<T> From<Vec<T>> for UniqueArray<T> {
    #[inline]
    fn from(value: Vec<T>) -> Self {
        Self::from(value.into_boxed_slice())
    }
}

impl<T, D: Deleter<[T]>> UniqueArray<T, D> {
    /// Returns the owned elements, or `None` if the handle is empty.
    #[inline]
    pub fn as_slice(&self) -> Option<&[T]> {
        self.as_ref()
    }

    /// Returns the owned elements mutably, or `None` if the handle is empty.
    #[inline]
    pub fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        self.as_mut()
    }

    /// Returns the element at `index`.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::{HandleError, UniqueArray};
    ///
    /// let array = UniqueArray::from(vec![1, 2, 3]);
    /// assert_eq!(array.try_get(1), Ok(&2));
    /// assert_eq!(array.try_get(3), Err(HandleError::OutOfBounds { index: 3, len: 3 }));
    ///
    /// let empty = UniqueArray::<i32>::null();
    /// assert_eq!(empty.try_get(0), Err(HandleError::Empty));
    /// ```
    pub fn try_get(&self, index: usize) -> Result<&T, HandleError> {
        let slice = self.as_slice().ok_or(HandleError::Empty)?;
        let len = slice.len();
        slice.get(index).ok_or(HandleError::OutOfBounds { index, len })
    }

    /// Returns the element at `index` mutably.
    pub fn try_get_mut(&mut self, index: usize) -> Result<&mut T, HandleError> {
        let slice = self.as_mut_slice().ok_or(HandleError::Empty)?;
        let len = slice.len();
        slice.get_mut(index).ok_or(HandleError::OutOfBounds { index, len })
    }

    /// Returns the element at `index` without any checks.
    ///
    /// # Safety
    ///
    /// The handle must be owning and `index` must be in-bounds.
    #[cfg_attr(debug_assertions, track_caller)]
    #[cfg_attr(not(debug_assertions), inline(always))]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        // SAFETY: the caller guarantees the handle is owning and the index is
        // in-bounds, so the element is valid while `self` is borrowed.
        unsafe { self.element(index).as_ref() }
    }

    /// Returns the element at `index` mutably without any checks.
    ///
    /// # Safety
    ///
    /// The handle must be owning and `index` must be in-bounds.
    #[cfg_attr(debug_assertions, track_caller)]
    #[cfg_attr(not(debug_assertions), inline(always))]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        // SAFETY: as above, and `self` is borrowed mutably.
        unsafe { self.element(index).as_mut() }
    }

    /// # Safety
    ///
    /// The handle must be owning and `index` must be in-bounds.
    #[cfg_attr(debug_assertions, track_caller)]
    #[cfg_attr(not(debug_assertions), inline(always))]
    unsafe fn element(&self, index: usize) -> NonNull<T> {
        // SAFETY: the caller guarantees the handle is owning.
        let array = unsafe { self.get().unwrap_unchecked() };

        // debug_assert! uses an if branch to decide whether to run,
        // the length is only read under #[cfg].
        #[cfg(debug_assertions)]
        assert!(index < array.len(), "tried to index out-of-bounds of an array");

        // SAFETY: `index` is in-bounds of the owned allocation.
        unsafe { array.cast::<T>().add(index) }
    }
}

impl<T, D: Deleter<[T]>> Index<usize> for UniqueArray<T, D> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if the handle is empty or `index` is out of bounds.
    #[inline]
    #[track_caller]
    fn index(&self, index: usize) -> &T {
        &(**self)[index]
    }
}

impl<T, D: Deleter<[T]>> IndexMut<usize> for UniqueArray<T, D> {
    /// # Panics
    ///
    /// Panics if the handle is empty or `index` is out of bounds.
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut (**self)[index]
    }
}

#[cfg(test)]
mod tests {
    use super::UniqueArray;
    use crate::{Deleter, HandleError};
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use core::mem::size_of;
    use core::ptr::{self, NonNull};
    use core::sync::atomic::{AtomicUsize, Ordering};

    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[derive(Clone, Default)]
    struct CountingDelete(Rc<Cell<usize>>);

    impl<T> Deleter<[T]> for CountingDelete {
        unsafe fn delete(&mut self, ptr: NonNull<[T]>) {
            self.0.set(self.0.get() + 1);
            drop(unsafe { Box::from_raw(ptr.as_ptr()) });
        }
    }

    fn raw_array(len: usize) -> *mut [i32] {
        Box::into_raw(vec![0; len].into_boxed_slice())
    }

    #[test]
    fn size_optimization() {
        assert_eq!(size_of::<UniqueArray<u8>>(), size_of::<*mut [u8]>());
        assert_eq!(
            size_of::<UniqueArray<u8, CountingDelete>>(),
            size_of::<*mut [u8]>() + size_of::<CountingDelete>()
        );
    }

    #[test]
    fn indexed_write_touches_one_slot() {
        let deleter = CountingDelete::default();
        {
            let mut array = unsafe { UniqueArray::from_raw_with_deleter(raw_array(5), deleter.clone()) };

            array[2] = 7;
            assert_eq!(array[2], 7);
            assert_eq!(array.as_slice(), Some(&[0, 0, 7, 0, 0][..]));
            assert_eq!(deleter.0.get(), 0);
        }
        assert_eq!(deleter.0.get(), 1);
    }

    #[test]
    fn releases_whole_array() {
        let drops = Rc::new(Cell::new(0));
        let elements: Vec<Tracked> = (0..5).map(|_| Tracked(drops.clone())).collect();

        let array = UniqueArray::from(elements);
        assert_eq!(drops.get(), 0);

        drop(array);
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn shared_state_machine() {
        let drops = Rc::new(Cell::new(0));
        let make = |n: usize| -> UniqueArray<Tracked> {
            (0..n).map(|_| Tracked(drops.clone())).collect::<Vec<_>>().into()
        };

        let mut a = make(2);
        let mut b = a.take();
        assert!(a.is_null());
        assert_eq!(b.as_slice().map(<[_]>::len), Some(2));

        b.assign(make(3));
        assert_eq!(drops.get(), 2);

        let raw = b.release().unwrap();
        assert_eq!(drops.get(), 2);

        unsafe { a.reset(raw.as_ptr()) };
        a.swap(&mut b);
        assert!(a.is_null());

        b.clear();
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn zero_sized_arrays_are_distinct() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct Unit;

        impl Drop for Unit {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::Relaxed);
            }
        }

        let mut array = UniqueArray::from(vec![Unit, Unit]);
        array.assign(UniqueArray::from(vec![Unit, Unit, Unit]));
        assert_eq!(DROPS.load(Ordering::Relaxed), 2);
        assert_eq!(array.as_slice().map(<[_]>::len), Some(3));

        let raw = Box::into_raw(vec![Unit].into_boxed_slice());
        unsafe { array.reset(raw) };
        assert_eq!(DROPS.load(Ordering::Relaxed), 5);

        array.assign(UniqueArray::from(Vec::<Unit>::new()));
        assert_eq!(DROPS.load(Ordering::Relaxed), 6);
        assert!(array.is_owning());

        drop(array);
        assert_eq!(DROPS.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn empty_arrays_are_distinct() {
        let deleter = CountingDelete::default();
        let empty = || unsafe { UniqueArray::from_raw_with_deleter(raw_array(0), deleter.clone()) };

        let mut array = empty();
        array.assign(empty());
        assert_eq!(deleter.0.get(), 1);

        unsafe { array.reset(raw_array(0)) };
        assert_eq!(deleter.0.get(), 2);

        drop(array);
        assert_eq!(deleter.0.get(), 3);
    }

    #[test]
    fn checked_access() {
        let mut array = UniqueArray::from(vec![1, 2, 3]);

        assert_eq!(array.try_get(0), Ok(&1));
        *array.try_get_mut(2).unwrap() = 30;
        assert_eq!(array[2], 30);
        assert_eq!(
            array.try_get_mut(3),
            Err(HandleError::OutOfBounds { index: 3, len: 3 })
        );

        array.clear();
        assert_eq!(array.try_get(0), Err(HandleError::Empty));
        assert!(array.as_mut_slice().is_none());
    }

    #[test]
    fn unchecked_access() {
        let mut array = UniqueArray::from(vec![5, 6, 7]);

        unsafe {
            *array.get_unchecked_mut(1) = 60;
            assert_eq!(*array.get_unchecked(1), 60);
            assert_eq!(*array.get_unchecked(2), 7);
        }
    }

    #[test]
    fn empty_allocation_is_owning() {
        let array = UniqueArray::from(Vec::<u64>::new());
        assert!(array.is_owning());
        assert_eq!(array.try_get(0), Err(HandleError::OutOfBounds { index: 0, len: 0 }));

        let null: UniqueArray<u64> = unsafe { UniqueArray::from_raw(ptr::slice_from_raw_parts_mut(ptr::null_mut(), 0)) };
        assert!(null.is_null());
    }

    #[test]
    #[should_panic(expected = "dereferenced an empty `UniquePtr`")]
    fn index_empty_panics() {
        let array = UniqueArray::<u8>::null();
        assert_eq!(array[0], 0);
    }

    #[test]
    #[should_panic]
    fn index_out_of_bounds_panics() {
        let array = UniqueArray::from(vec![1u8]);
        assert_eq!(array[1], 0);
    }
}
