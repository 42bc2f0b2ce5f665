//! Shared type definitions.

use std::fmt;

/// A boxed iterator, used where the traversal direction is chosen at runtime.
///
/// # Example
/// ```rust,ignore
/// let iter: BoxedIterator<u32> = if forward {
///     Box::new(0..10)
/// } else {
///     Box::new((0..10).rev())
/// };
/// ```
pub type BoxedIterator<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Planar machine axis.
///
/// Per-axis configuration values are stored as `[T; 2]` and indexed with
/// [`Axis::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Scan axis
    X,
    /// Step axis
    Y,
}

impl Axis {
    /// Both axes in index order.
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    /// Array index of this axis.
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Y => write!(f, "Y"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_iterator() {
        let forward = true;
        let iter: BoxedIterator<u32> = if forward {
            Box::new(0..3)
        } else {
            Box::new((0..3).rev())
        };
        assert_eq!(iter.collect::<Vec<_>>(), vec![0, 1, 2]);

        let reverse: BoxedIterator<u32> = Box::new((0..3).rev());
        assert_eq!(reverse.collect::<Vec<_>>(), vec![2, 1, 0]);
    }

    #[test]
    fn test_axis_index() {
        let values = [1.5, 2.5];
        assert_eq!(values[Axis::X.index()], 1.5);
        assert_eq!(values[Axis::Y.index()], 2.5);
        assert_eq!(Axis::ALL.len(), 2);
        assert_eq!(Axis::Y.to_string(), "Y");
    }
}
