use crate::hash::HashSet;

// -----------------------------------------------------------------------------
// IdentitySet

/// A set of object identities.
///
/// An identity is the address of a shared allocation, as returned by
/// `Arc::as_ptr(..) as *const () as usize`. Two handles to the same
/// allocation share an identity, structurally equal copies do not.
///
/// Addresses are aligned, so their low bits carry little entropy;
/// they are hashed with [`FixedHashState`](crate::hash::FixedHashState)
/// rather than passed through.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use marshal_utils::IdentitySet;
///
/// let a = Arc::new(1);
/// let b = Arc::new(1);
///
/// let mut set = IdentitySet::new();
/// assert!(set.insert(Arc::as_ptr(&a) as usize));
/// assert!(!set.contains(Arc::as_ptr(&b) as usize));
/// assert!(!set.insert(Arc::as_ptr(&a) as usize));
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdentitySet(HashSet<usize>);

impl IdentitySet {
    /// Creates an empty set.
    #[inline]
    pub fn new() -> Self {
        Self(HashSet::default())
    }

    /// Adds an identity, returning `false` if it was already present.
    #[inline]
    pub fn insert(&mut self, identity: usize) -> bool {
        self.0.insert(identity)
    }

    /// Returns `true` if the identity is present.
    #[inline]
    pub fn contains(&self, identity: usize) -> bool {
        self.0.contains(&identity)
    }

    /// Removes an identity, returning `true` if it was present.
    #[inline]
    pub fn remove(&mut self, identity: usize) -> bool {
        self.0.remove(&identity)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }
}
