//! Two-dimensional scalar grids holding one channel of simulation state.

use serde::{Deserialize, Serialize};

/// Row-major 2D grid of `f32` values.
///
/// Indexing is `[y * width + x]`. Row 0 is the first row of data; with
/// [`Origin::Lower`](crate::render::Origin::Lower) it is drawn at the bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Grid {
    /// Create a grid filled with `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Create a zero-filled grid.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    /// Wrap existing row-major data.
    ///
    /// Returns `None` if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == width * height).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Grid shape as `(width, height)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Convert (x, y) coordinates to flat index.
    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let i = self.idx(x, y);
        self.data[i] = value;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Copy of this grid with every strictly negative entry replaced by zero.
    ///
    /// Idempotent: `g.clamp_non_negative().clamp_non_negative() == g.clamp_non_negative()`.
    /// NaN entries are not negative and pass through unchanged.
    pub fn clamp_non_negative(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .map(|&v| if v < 0.0 { 0.0 } else { v })
                .collect(),
        }
    }

    /// Minimum and maximum over finite entries, or `None` if there are none.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Index of the first non-finite entry, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.data.iter().position(|v| !v.is_finite())
    }

    /// Sum of all entries.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(Grid::from_vec(3, 2, vec![0.0; 5]).is_none());
        assert!(Grid::from_vec(3, 2, vec![0.0; 6]).is_some());
    }

    #[test]
    fn test_row_major_indexing() {
        let grid = Grid::from_fn(3, 2, |x, y| (y * 10 + x) as f32);
        assert_eq!(grid.get(2, 0), 2.0);
        assert_eq!(grid.get(0, 1), 10.0);
        assert_eq!(grid.as_slice()[4], 11.0);
    }

    #[test]
    fn test_clamp_replaces_negatives() {
        let grid = Grid::from_vec(2, 2, vec![-1.5, 0.0, 2.0, -0.001]).unwrap();
        let clamped = grid.clamp_non_negative();
        assert_eq!(clamped.as_slice(), &[0.0, 0.0, 2.0, 0.0]);
        assert_eq!(clamped.shape(), grid.shape());
    }

    #[test]
    fn test_min_max_skips_non_finite() {
        let grid = Grid::from_vec(2, 2, vec![f32::NAN, -3.0, 4.0, f32::INFINITY]).unwrap();
        assert_eq!(grid.min_max(), Some((-3.0, 4.0)));
        assert_eq!(grid.first_non_finite(), Some(0));
        assert_eq!(Grid::zeros(0, 0).min_max(), None);
    }

    proptest! {
        #[test]
        fn prop_clamp_idempotent_and_non_negative(
            data in proptest::collection::vec(-1.0e6f32..1.0e6, 1..64)
        ) {
            let len = data.len();
            let grid = Grid::from_vec(len, 1, data).unwrap();
            let once = grid.clamp_non_negative();
            let twice = once.clamp_non_negative();
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.as_slice().iter().all(|&v| v >= 0.0));
        }
    }
}
