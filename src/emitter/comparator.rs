//! Ordering predicates for the emitter's heap
//!
//! A comparator answers "does `a` sort strictly before `b`?". It must be a
//! strict weak ordering (irreflexive, transitive) or heap order is lost.
//!
//! Closures work directly:
//! ```ignore
//! let emitter = OrderedEmitter::new(100, tx, |a: &Hit, b: &Hit| a.ts < b.ts)?;
//! ```

use std::cmp::Ordering;

/// Strict "less than" predicate over two events
pub trait Comparator<T> {
    fn less(&self, a: &T, b: &T) -> bool;
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// Order by `T`'s own `Ord`
pub fn natural_order<T: Ord>() -> impl Fn(&T, &T) -> bool + Copy {
    |a: &T, b: &T| a < b
}

/// Order by an extracted key
pub fn by_key<T, K, F>(key: F) -> impl Fn(&T, &T) -> bool
where
    K: Ord,
    F: Fn(&T) -> K,
{
    move |a: &T, b: &T| key(a) < key(b)
}

/// Order with a three-way compare function, e.g. `f64::total_cmp` on a field
pub fn by_cmp<T, F>(cmp: F) -> impl Fn(&T, &T) -> bool
where
    F: Fn(&T, &T) -> Ordering,
{
    move |a: &T, b: &T| cmp(a, b) == Ordering::Less
}

/// Invert another comparator (min-heap becomes max-heap)
pub fn reverse<T, C>(inner: C) -> impl Fn(&T, &T) -> bool
where
    C: Comparator<T>,
{
    move |a: &T, b: &T| inner.less(b, a)
}
