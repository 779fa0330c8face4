//! Filtering traits.

/// immutable, pure filter (2 successive equal inputs -> 2 equal outputs)
///
/// [Default] gives the criterion-free filter, which passes everything.
pub trait Filter<T>: Default {
    fn is_passing(&self, item: T) -> bool;
}
