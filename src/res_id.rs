use std::fmt;

/// Stable, integer backed reference to an interned resource.
///
/// An id is only meaningful against the [`IdentityTable`](crate::IdentityTable) that issued it.
/// The raw value `-1` is reserved for "not assigned".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResId {
    raw: i32,
}

impl ResId {
    pub const INVALID: ResId = ResId { raw: -1 };

    /// Creates an id pointing at `index` in the owning table.
    pub fn new(index: usize) -> Self {
        // Tables never grow anywhere close to `i32::MAX` entries in a single session.
        debug_assert!(index <= i32::MAX as usize);
        ResId { raw: index as i32 }
    }

    #[inline]
    pub fn raw(self) -> i32 {
        self.raw
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.raw >= 0
    }

    /// Position in the owning table, or `None` for the invalid id.
    #[inline]
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.raw).ok()
    }
}

impl Default for ResId {
    fn default() -> Self {
        ResId::INVALID
    }
}

impl fmt::Display for ResId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
