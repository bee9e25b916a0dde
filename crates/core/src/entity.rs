//! Entity trait: identity that survives state changes.

/// An object with a store-assigned identity.
///
/// Products and sales are both entities: a product keeps its id while its
/// price and quantity change, and two sales with equal totals are still
/// different sales.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
