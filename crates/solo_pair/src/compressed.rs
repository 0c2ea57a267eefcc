use core::mem;

// -----------------------------------------------------------------------------
// CompressedPair

/// A pair of values that are always accessed together.
///
/// The first slot usually holds a resource (e.g. a pointer) and the second
/// one the policy that manages it (e.g. a deleter).
///
/// # Layout
///
/// When `S` is a zero-sized type the pair takes exactly as much space as `F`.
/// Rust never reserves storage for zero-sized fields, so the elision is
/// decided per type at compile time and needs no specialization.
///
/// The pair never calls into its slots. Dropping it only drops both values.
///
/// # Examples
///
/// ```
/// use solo_pair::CompressedPair;
///
/// let mut pair = CompressedPair::new(1u32, "one");
///
/// *pair.first_mut() += 1;
/// assert_eq!(*pair.first(), 2);
/// assert_eq!(*pair.second(), "one");
///
/// let (first, second) = pair.into_parts();
/// assert_eq!((first, second), (2, "one"));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct CompressedPair<F, S> {
    first: F,
    second: S,
}

impl<F, S> CompressedPair<F, S> {
    /// Creates a pair from its two values.
    #[inline(always)]
    pub const fn new(first: F, second: S) -> Self {
        Self { first, second }
    }

    /// Returns a reference to the first slot.
    #[inline(always)]
    pub const fn first(&self) -> &F {
        &self.first
    }

    /// Returns a mutable reference to the first slot.
    #[inline(always)]
    pub const fn first_mut(&mut self) -> &mut F {
        &mut self.first
    }

    /// Returns a reference to the second slot.
    ///
    /// For a zero-sized `S` this is a dangling but valid reference,
    /// callers cannot tell it apart from a stored field.
    #[inline(always)]
    pub const fn second(&self) -> &S {
        &self.second
    }

    /// Returns a mutable reference to the second slot.
    #[inline(always)]
    pub const fn second_mut(&mut self) -> &mut S {
        &mut self.second
    }

    /// Borrows both slots mutably at the same time.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_pair::CompressedPair;
    ///
    /// let mut pair = CompressedPair::new(Some(3), |x: i32| x * 2);
    ///
    /// let (value, double) = pair.split_mut();
    /// let doubled = value.take().map(|v| double(v));
    ///
    /// assert_eq!(doubled, Some(6));
    /// assert_eq!(*pair.first(), None);
    /// ```
    #[inline(always)]
    pub const fn split_mut(&mut self) -> (&mut F, &mut S) {
        (&mut self.first, &mut self.second)
    }

    /// Consumes the pair, returning both values.
    #[inline]
    pub fn into_parts(self) -> (F, S) {
        (self.first, self.second)
    }

    /// Exchanges both slots with `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<F, S> From<(F, S)> for CompressedPair<F, S> {
    #[inline]
    fn from((first, second): (F, S)) -> Self {
        Self::new(first, second)
    }
}
