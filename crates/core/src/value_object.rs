//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. In this
/// workspace the polymorphic `(type, id)` references to resources and authors
/// are value objects: two references naming the same type and id are the same
/// reference, regardless of where they were built.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
