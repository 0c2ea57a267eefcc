use alloc::boxed::Box;
use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, ManuallyDrop};
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use solo_pair::CompressedPair;

use crate::{DefaultDelete, Deleter, HandleError};

// -----------------------------------------------------------------------------
// UniquePtr

/// An owning pointer that releases its pointee through a deleter.
///
/// A `UniquePtr` is either *empty* or *owning*. When an owning handle is
/// dropped, cleared, reset or reassigned, its deleter `D` is invoked on the
/// old pointer exactly once. Ownership is never duplicated: the handle is
/// not `Clone`, and every transfer leaves at most one owner behind.
///
/// # Layout
///
/// The pointer and the deleter share a [`CompressedPair`], so with a
/// zero-sized deleter (e.g. [`DefaultDelete`]) the handle is exactly as
/// large as `*mut T`.
///
/// # Arrays
///
/// With a `[T]` pointee the handle owns a whole array, see
/// [`UniqueArray`](crate::UniqueArray).
///
/// # Examples
///
/// ```
/// use solo_ptr::UniquePtr;
///
/// let mut a = UniquePtr::new(String::from("a"));
/// let mut b = a.take();
///
/// assert!(a.is_null());
/// assert_eq!(b.as_str(), "a");
///
/// b.push('b');
/// assert_eq!(*b, "ab");
/// ```
pub struct UniquePtr<T: ?Sized, D: Deleter<T> = DefaultDelete> {
    pair: CompressedPair<Option<NonNull<T>>, D>,
    _marker: PhantomData<T>,
}

// SAFETY: `UniquePtr` owns its pointee the same way `Box` does.
unsafe impl<T: ?Sized + Send, D: Deleter<T> + Send> Send for UniquePtr<T, D> {}

// SAFETY: shared access only hands out `&T` and `&D`.
unsafe impl<T: ?Sized + Sync, D: Deleter<T> + Sync> Sync for UniquePtr<T, D> {}

impl<T: ?Sized, D: Deleter<T>> Drop for UniquePtr<T, D> {
    fn drop(&mut self) {
        let (slot, deleter) = self.pair.split_mut();
        if let Some(ptr) = slot.take() {
            trace_handle!("UniquePtr dropped, deleting {ptr:p}");
            // SAFETY: `ptr` was owned by this handle and is released only here.
            unsafe { deleter.delete(ptr) };
        }
    }
}

impl<T: ?Sized, D: Deleter<T> + Default> Default for UniquePtr<T, D> {
    /// Creates an empty handle, see [`UniquePtr::null`].
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T> UniquePtr<T> {
    /// Moves `value` to the heap and takes ownership of it.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::UniquePtr;
    ///
    /// let ptr = UniquePtr::new(7);
    /// assert!(ptr.is_owning());
    /// assert_eq!(*ptr, 7);
    /// ```
    #[inline]
    pub fn new(value: T) -> Self {
        Self::from(Box::new(value))
    }
}

impl<T: ?Sized> UniquePtr<T> {
    /// Gives the object back to a [`Box`].
    ///
    /// Fails with [`HandleError::Empty`] if the handle is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::{HandleError, UniquePtr};
    ///
    /// let boxed = UniquePtr::new(3).try_into_box().unwrap();
    /// assert_eq!(*boxed, 3);
    ///
    /// let empty = UniquePtr::<i32>::null();
    /// assert_eq!(empty.try_into_box(), Err(HandleError::Empty));
    /// ```
    pub fn try_into_box(mut self) -> Result<Box<T>, HandleError> {
        let ptr = self.release().ok_or(HandleError::Empty)?;
        // SAFETY: `DefaultDelete` only accepts pointers that came from a `Box`.
        Ok(unsafe { Box::from_raw(ptr.as_ptr()) })
    }
}

impl<T: ?Sized> From<Box<T>> for UniquePtr<T> {
    #[inline]
    fn from(value: Box<T>) -> Self {
        // SAFETY: `Box::into_raw` yields a pointer `DefaultDelete` can release.
        unsafe { Self::from_raw(Box::into_raw(value)) }
    }
}

impl<T: ?Sized, D: Deleter<T> + Default> UniquePtr<T, D> {
    /// Creates an empty handle with a default deleter.
    #[inline]
    pub fn null() -> Self {
        Self::null_with_deleter(D::default())
    }

    /// Takes ownership of `ptr` with a default deleter.
    ///
    /// A null `ptr` creates an empty handle.
    ///
    /// # Safety
    ///
    /// - A non-null `ptr` must be releasable by `D` (see [`Deleter::delete`]).
    /// - No other handle may own `ptr`, and the caller must not release it.
    #[inline]
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        // SAFETY: guaranteed by the caller.
        unsafe { Self::from_raw_with_deleter(ptr, D::default()) }
    }

    /// Moves the contents out, leaving this handle empty.
    ///
    /// This is the observable form of a move: the returned handle owns what
    /// `self` owned, together with its deleter, and `self` is left with a
    /// default deleter.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::UniquePtr;
    ///
    /// let mut a = UniquePtr::new(1);
    /// let b = a.take();
    ///
    /// assert!(a.is_null());
    /// assert_eq!(*b, 1);
    /// ```
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }
}

impl<T: ?Sized, D: Deleter<T>> UniquePtr<T, D> {
    /// Creates an empty handle that will use `deleter` once it owns something.
    #[inline]
    pub const fn null_with_deleter(deleter: D) -> Self {
        Self {
            pair: CompressedPair::new(None, deleter),
            _marker: PhantomData,
        }
    }

    /// Takes ownership of `ptr`, released later through `deleter`.
    ///
    /// A null `ptr` creates an empty handle that keeps `deleter`.
    ///
    /// # Safety
    ///
    /// - A non-null `ptr` must be releasable by `deleter`
    ///   (see [`Deleter::delete`]).
    /// - No other handle may own `ptr`, and the caller must not release it.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::ptr::NonNull;
    /// use solo_ptr::UniquePtr;
    ///
    /// let raw = Box::into_raw(Box::new([1u8; 4]));
    /// let free = |ptr: NonNull<[u8; 4]>| drop(unsafe { Box::from_raw(ptr.as_ptr()) });
    ///
    /// let ptr = unsafe { UniquePtr::from_raw_with_deleter(raw, free) };
    /// assert_eq!(ptr[3], 1);
    /// ```
    #[inline]
    pub unsafe fn from_raw_with_deleter(ptr: *mut T, deleter: D) -> Self {
        Self {
            pair: CompressedPair::new(NonNull::new(ptr), deleter),
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the handle owns an object.
    #[inline(always)]
    pub const fn is_owning(&self) -> bool {
        self.pair.first().is_some()
    }

    /// Returns `true` if the handle is empty.
    #[inline(always)]
    pub const fn is_null(&self) -> bool {
        self.pair.first().is_none()
    }

    /// Returns the owned pointer without giving up ownership.
    #[inline(always)]
    pub const fn get(&self) -> Option<NonNull<T>> {
        *self.pair.first()
    }

    /// Returns the deleter.
    #[inline(always)]
    pub const fn get_deleter(&self) -> &D {
        self.pair.second()
    }

    /// Returns the deleter mutably.
    #[inline(always)]
    pub const fn get_deleter_mut(&mut self) -> &mut D {
        self.pair.second_mut()
    }

    /// Returns a reference to the pointee, or `None` if the handle is empty.
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        // SAFETY: an owned pointer is valid for as long as `self` is borrowed.
        self.get().map(|ptr| unsafe { ptr.as_ref() })
    }

    /// Returns a mutable reference to the pointee, or `None` if the handle is
    /// empty.
    #[inline]
    pub fn as_mut(&mut self) -> Option<&mut T> {
        // SAFETY: an owned pointer is valid and unaliased while `self` is
        // mutably borrowed.
        self.get().map(|mut ptr| unsafe { ptr.as_mut() })
    }

    /// Returns `true` if both handles own the same address, or both are empty.
    ///
    /// This compares addresses only, never the pointees.
    #[inline]
    pub fn ptr_eq<U: ?Sized, E: Deleter<U>>(&self, other: &UniquePtr<U, E>) -> bool {
        match (self.get(), other.get()) {
            (Some(a), Some(b)) => ptr::addr_eq(a.as_ptr(), b.as_ptr()),
            (None, None) => true,
            _ => false,
        }
    }

    /// Gives up ownership without invoking the deleter.
    ///
    /// The caller becomes responsible for releasing the returned pointer.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::UniquePtr;
    ///
    /// let mut ptr = UniquePtr::new(9);
    /// let raw = ptr.release().unwrap();
    ///
    /// assert!(ptr.is_null());
    /// assert_eq!(*unsafe { Box::from_raw(raw.as_ptr()) }, 9);
    /// ```
    #[inline]
    pub fn release(&mut self) -> Option<NonNull<T>> {
        let ptr = self.pair.first_mut().take();
        trace_handle!("UniquePtr released {ptr:?} to the caller");
        ptr
    }

    /// Takes ownership of `ptr` and releases the previously owned object.
    ///
    /// The handle already owns `ptr` when the deleter runs on the old one.
    /// Resetting to the object that is already owned does nothing.
    ///
    /// # Safety
    ///
    /// Same requirements as [`from_raw_with_deleter`](Self::from_raw_with_deleter)
    /// for the current deleter.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::UniquePtr;
    ///
    /// let mut ptr = UniquePtr::new(1);
    /// unsafe { ptr.reset(Box::into_raw(Box::new(2))) };
    /// assert_eq!(*ptr, 2);
    ///
    /// unsafe { ptr.reset(core::ptr::null_mut()) };
    /// assert!(ptr.is_null());
    /// ```
    #[inline]
    pub unsafe fn reset(&mut self, ptr: *mut T) {
        let new = NonNull::new(ptr);
        if let Some(new) = new
            && self.owns(new)
        {
            log::warn!("UniquePtr reset to the address it already owns ({ptr:p}), ignored");
            return;
        }
        // SAFETY: guaranteed by the caller.
        unsafe { self.adopt(new) };
    }

    /// Releases the owned object, leaving the handle empty.
    ///
    /// Returns `self` so calls can be chained.
    #[inline]
    pub fn clear(&mut self) -> &mut Self {
        // SAFETY: adopting nothing has no requirements.
        unsafe { self.adopt(None) };
        self
    }

    /// Moves `other` into this handle, releasing what was owned before.
    ///
    /// The deleter of `other` is converted with [`From`], so a handle can be
    /// assigned from one with a different but compatible deleter type.
    ///
    /// If `other` claims the object `self` already owns, nothing is released
    /// and `self` keeps owning it. Zero-sized objects share an address and
    /// are never mistaken for one another.
    ///
    /// Returns `self` so calls can be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::UniquePtr;
    ///
    /// let mut ptr = UniquePtr::new(1);
    /// ptr.assign(UniquePtr::new(2)).assign(UniquePtr::new(3));
    ///
    /// assert_eq!(*ptr, 3);
    /// ```
    pub fn assign<E>(&mut self, other: UniquePtr<T, E>) -> &mut Self
    where
        E: Deleter<T>,
        D: From<E>,
    {
        let (ptr, deleter) = other.into_raw_parts();
        if let Some(new) = ptr
            && self.owns(new)
        {
            log::warn!("UniquePtr assigned from another handle owning {new:p}, ignored");
            return self;
        }

        let old = mem::replace(&mut self.pair, CompressedPair::new(ptr, D::from(deleter)));
        let (old_ptr, mut old_deleter) = old.into_parts();
        if let Some(old_ptr) = old_ptr {
            trace_handle!("UniquePtr reassigned, deleting {old_ptr:p}");
            // SAFETY: `old_ptr` was owned by this handle and is no longer
            // reachable from it.
            unsafe { old_deleter.delete(old_ptr) };
        }
        self
    }

    /// Exchanges pointers and deleters with `other`.
    ///
    /// No deleter is invoked.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        self.pair.swap(&mut other.pair);
    }

    /// Converts the handle into one with deleter type `E`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::ptr::NonNull;
    /// use solo_ptr::{DefaultDelete, Deleter, UniquePtr};
    ///
    /// #[derive(Default)]
    /// struct Counted(usize);
    ///
    /// impl From<DefaultDelete> for Counted {
    ///     fn from(_: DefaultDelete) -> Self {
    ///         Counted(0)
    ///     }
    /// }
    ///
    /// impl<T: ?Sized> Deleter<T> for Counted {
    ///     unsafe fn delete(&mut self, ptr: NonNull<T>) {
    ///         self.0 += 1;
    ///         unsafe { DefaultDelete.delete(ptr) };
    ///     }
    /// }
    ///
    /// let ptr: UniquePtr<i32, Counted> = UniquePtr::new(5).convert();
    /// assert_eq!(*ptr, 5);
    /// ```
    #[inline]
    pub fn convert<E>(self) -> UniquePtr<T, E>
    where
        E: Deleter<T> + From<D>,
    {
        let (ptr, deleter) = self.into_raw_parts();
        UniquePtr {
            pair: CompressedPair::new(ptr, E::from(deleter)),
            _marker: PhantomData,
        }
    }

    /// Transfers ownership to a handle of a related pointee type.
    ///
    /// `f` maps the owned pointer, typically with an unsizing cast. The
    /// deleter is converted with [`From`].
    ///
    /// # Safety
    ///
    /// The pointer returned by `f` must be releasable by the converted
    /// deleter, i.e. it must address the same allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::fmt::Display;
    /// use core::ptr::NonNull;
    /// use solo_ptr::UniquePtr;
    ///
    /// let ptr = UniquePtr::new(12);
    /// let ptr: UniquePtr<dyn Display> = unsafe { ptr.map_raw(|p| p as NonNull<dyn Display>) };
    ///
    /// assert_eq!(ptr.to_string(), "12");
    /// ```
    #[inline]
    pub unsafe fn map_raw<U, E>(self, f: impl FnOnce(NonNull<T>) -> NonNull<U>) -> UniquePtr<U, E>
    where
        U: ?Sized,
        E: Deleter<U> + From<D>,
    {
        let (ptr, deleter) = self.into_raw_parts();
        UniquePtr {
            pair: CompressedPair::new(ptr.map(f), E::from(deleter)),
            _marker: PhantomData,
        }
    }

    /// Splits the handle into its pointer and deleter, invoking neither.
    #[inline]
    pub fn into_raw_parts(self) -> (Option<NonNull<T>>, D) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never used or dropped again, so the pair is
        // moved out exactly once.
        let pair = unsafe { ptr::read(&this.pair) };
        pair.into_parts()
    }

    /// Returns `true` if `candidate` addresses the object this handle owns.
    ///
    /// Every zero-sized object lives at the same dangling address, so an
    /// address match identifies the owned object only when it has a size.
    fn owns(&self, candidate: NonNull<T>) -> bool {
        let Some(owned) = self.get() else {
            return false;
        };
        // SAFETY: an owned pointer is valid while `self` is borrowed.
        let size = mem::size_of_val(unsafe { owned.as_ref() });
        size != 0 && ptr::addr_eq(owned.as_ptr(), candidate.as_ptr())
    }

    /// Installs `new` and releases the previous pointer, in that order.
    ///
    /// # Safety
    ///
    /// `new` must satisfy the requirements of `from_raw_with_deleter`.
    unsafe fn adopt(&mut self, new: Option<NonNull<T>>) {
        let (slot, deleter) = self.pair.split_mut();
        if let Some(old) = mem::replace(slot, new) {
            trace_handle!("UniquePtr reset, deleting {old:p}");
            // SAFETY: `old` was owned by this handle and is no longer
            // reachable from it.
            unsafe { deleter.delete(old) };
        }
    }
}

impl<T, D: Deleter<T>> UniquePtr<T, D> {
    /// Returns the owned pointer as a raw pointer, null if empty.
    #[inline(always)]
    pub fn as_ptr(&self) -> *mut T {
        self.get().map_or(ptr::null_mut(), NonNull::as_ptr)
    }
}

impl<T: ?Sized, D: Deleter<T>> Deref for UniquePtr<T, D> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the handle is empty.
    #[inline]
    #[track_caller]
    fn deref(&self) -> &T {
        match self.as_ref() {
            Some(value) => value,
            None => empty_deref(),
        }
    }
}

impl<T: ?Sized, D: Deleter<T>> DerefMut for UniquePtr<T, D> {
    /// # Panics
    ///
    /// Panics if the handle is empty.
    #[inline]
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        match self.as_mut() {
            Some(value) => value,
            None => empty_deref(),
        }
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn empty_deref() -> ! {
    panic!("dereferenced an empty `UniquePtr`")
}

impl<T: ?Sized, D: Deleter<T>> fmt::Pointer for UniquePtr<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(ptr) => fmt::Pointer::fmt(&ptr, f),
            None => fmt::Pointer::fmt(&ptr::null::<u8>(), f),
        }
    }
}

impl<T: ?Sized, D: Deleter<T>> fmt::Debug for UniquePtr<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(ptr) => write!(f, "UniquePtr({ptr:p})"),
            None => f.write_str("UniquePtr(null)"),
        }
    }
}
