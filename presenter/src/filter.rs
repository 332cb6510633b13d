//! Distinctness filters applied before any side effect.

use std::fmt;

use crate::Location;

/// Whether a move of `distance` meters is too small to count.
///
/// The comparison is strict: a move of exactly `threshold` passes.
#[must_use]
pub fn within_threshold(distance: f64, threshold: f64) -> bool {
    distance < threshold
}

/// Equivalence over the nullable location channel.
///
/// Two absent values are equivalent, presence changes never are, and two
/// fixes are equivalent when they lie closer than `threshold` meters apart.
#[must_use]
pub fn locations_equivalent(
    previous: Option<&Location>,
    next: Option<&Location>,
    threshold: f64,
) -> bool {
    match (previous, next) {
        (None, None) => true,
        (Some(previous), Some(next)) => within_threshold(previous.distance_to(next), threshold),
        _ => false,
    }
}

/// Drops values equivalent to the last value that passed.
///
/// The first value always passes. Comparison is against the last *accepted*
/// value, so a slow drift is accepted once it accumulates past the threshold.
pub struct RemoveDuplicates<T, F> {
    last: Option<T>,
    equivalent: F,
}

impl<T, F> RemoveDuplicates<T, F>
where
    T: Clone,
    F: FnMut(&T, &T) -> bool,
{
    /// Creates a filter using `equivalent` to compare the last accepted value
    /// with the next one.
    pub const fn new(equivalent: F) -> Self {
        Self {
            last: None,
            equivalent,
        }
    }

    /// Returns `true` and remembers `value` if it is distinct.
    pub fn admit(&mut self, value: &T) -> bool {
        if let Some(last) = &self.last {
            if (self.equivalent)(last, value) {
                return false;
            }
        }
        self.last = Some(value.clone());
        true
    }

    /// Forgets the last accepted value so the next one passes.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl<T: fmt::Debug, F> fmt::Debug for RemoveDuplicates<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveDuplicates")
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}
