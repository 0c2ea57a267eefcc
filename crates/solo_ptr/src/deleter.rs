use alloc::boxed::Box;
use core::ptr::{self, NonNull};

// -----------------------------------------------------------------------------
// Deleter

/// A release strategy for an owned pointer.
///
/// A [`UniquePtr`](crate::UniquePtr) hands its pointer to the deleter exactly
/// once, when the pointer stops being owned by the handle.
///
/// Any `FnMut(NonNull<T>)` is a deleter, so closures and function pointers
/// can be used directly.
///
/// # Examples
///
/// ```
/// use core::cell::Cell;
/// use core::ptr::NonNull;
/// use solo_ptr::UniquePtr;
///
/// let released = Cell::new(0);
/// let mut slot = 5;
///
/// {
///     let deleter = |_: NonNull<i32>| released.set(released.get() + 1);
///     let ptr = unsafe { UniquePtr::from_raw_with_deleter(&raw mut slot, deleter) };
///     assert_eq!(*ptr, 5);
/// }
///
/// assert_eq!(released.get(), 1);
/// ```
pub trait Deleter<T: ?Sized> {
    /// Releases the object behind `ptr`.
    ///
    /// # Safety
    ///
    /// - `ptr` must be a pointer this deleter is able to release
    ///   (e.g. one produced by `Box::into_raw` for [`DefaultDelete`]).
    /// - The caller must own `ptr` and must not use it afterwards.
    /// - It is called at most once for each pointer.
    unsafe fn delete(&mut self, ptr: NonNull<T>);
}

impl<T: ?Sized, F: FnMut(NonNull<T>)> Deleter<T> for F {
    #[inline]
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        self(ptr);
    }
}

// -----------------------------------------------------------------------------
// DefaultDelete

/// The default deleter, which gives the pointer back to [`Box`].
///
/// It drops the pointee and frees its memory. For a `[T]` pointee this drops
/// every element and frees the whole array at once.
///
/// Pointers released by this deleter must come from the global allocator
/// with the layout `Box<T>` would use, typically through [`Box::into_raw`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct DefaultDelete;

impl<T: ?Sized> Deleter<T> for DefaultDelete {
    #[inline]
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        // SAFETY: the caller guarantees `ptr` came from a `Box<T>`.
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
    }
}

// -----------------------------------------------------------------------------
// DropInPlace

/// A deleter that runs the destructor but leaves the memory alone.
///
/// Useful when the storage is owned by someone else, e.g. an arena or a
/// `ManuallyDrop` slot on the stack.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct DropInPlace;

impl<T: ?Sized> Deleter<T> for DropInPlace {
    #[inline]
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        // SAFETY: the caller guarantees `ptr` points to a live, owned value.
        unsafe { ptr::drop_in_place(ptr.as_ptr()) };
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultDelete, Deleter, DropInPlace};
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;
    use core::mem::{ManuallyDrop, size_of};
    use core::ptr::NonNull;

    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn zero_sized() {
        assert_eq!(size_of::<DefaultDelete>(), 0);
        assert_eq!(size_of::<DropInPlace>(), 0);
    }

    #[test]
    fn default_delete_single() {
        let drops = Rc::new(Cell::new(0));
        let ptr = Box::into_raw(Box::new(Tracked(drops.clone())));

        unsafe { DefaultDelete.delete(NonNull::new_unchecked(ptr)) };
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn default_delete_array() {
        let drops = Rc::new(Cell::new(0));
        let array: Box<[Tracked]> = (0..4).map(|_| Tracked(drops.clone())).collect();
        let ptr = Box::into_raw(array);

        unsafe { DefaultDelete.delete(NonNull::new_unchecked(ptr)) };
        assert_eq!(drops.get(), 4);
    }

    #[test]
    fn drop_in_place_keeps_storage() {
        let drops = Rc::new(Cell::new(0));
        let mut slot = ManuallyDrop::new(vec![Tracked(drops.clone()), Tracked(drops.clone())]);

        unsafe { DropInPlace.delete(NonNull::from_mut(&mut *slot)) };
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn closure_deleter() {
        let seen = Cell::new(None);
        let mut value = 3u8;
        let mut deleter = |ptr: NonNull<u8>| seen.set(Some(ptr));

        let ptr = NonNull::from_mut(&mut value);
        unsafe { Deleter::delete(&mut deleter, ptr) };
        assert_eq!(seen.get(), Some(ptr));
    }
}
