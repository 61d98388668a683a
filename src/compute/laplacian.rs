//! Discrete Laplacian on periodic grids.

use crate::system::Grid;

/// Five-point Laplacian with periodic boundaries, written into `out`.
///
/// `out` must have the same shape as `grid`.
pub fn laplacian_into(grid: &Grid, dx: f32, out: &mut [f32]) {
    let (width, height) = grid.shape();
    debug_assert_eq!(out.len(), width * height);
    let data = grid.as_slice();
    let inv_dx_sq = 1.0 / (dx * dx);

    for y in 0..height {
        let up = if y == 0 { height - 1 } else { y - 1 };
        let down = if y + 1 == height { 0 } else { y + 1 };
        for x in 0..width {
            let left = if x == 0 { width - 1 } else { x - 1 };
            let right = if x + 1 == width { 0 } else { x + 1 };

            let c = data[y * width + x];
            let sum = data[y * width + left]
                + data[y * width + right]
                + data[up * width + x]
                + data[down * width + x];
            out[y * width + x] = (sum - 4.0 * c) * inv_dx_sq;
        }
    }
}

/// Allocating variant of [`laplacian_into`].
pub fn laplacian(grid: &Grid, dx: f32) -> Vec<f32> {
    let mut out = vec![0.0f32; grid.len()];
    laplacian_into(grid, dx, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_field_has_zero_laplacian() {
        let grid = Grid::filled(5, 4, 3.0);
        assert!(laplacian(&grid, 1.0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_point_source() {
        let mut grid = Grid::zeros(5, 5);
        grid.set(2, 2, 1.0);
        let lap = laplacian(&grid, 1.0);
        assert_eq!(lap[grid.idx(2, 2)], -4.0);
        assert_eq!(lap[grid.idx(1, 2)], 1.0);
        assert_eq!(lap[grid.idx(2, 3)], 1.0);
        assert_eq!(lap[grid.idx(0, 0)], 0.0);
    }

    #[test]
    fn test_periodic_wrap() {
        let mut grid = Grid::zeros(4, 3);
        grid.set(0, 0, 1.0);
        let lap = laplacian(&grid, 1.0);
        assert_eq!(lap[grid.idx(3, 0)], 1.0);
        assert_eq!(lap[grid.idx(0, 2)], 1.0);
    }

    #[test]
    fn test_sum_is_conserved() {
        let grid = Grid::from_fn(6, 6, |x, y| (x * 7 + y * 3) as f32 % 5.0);
        let total: f32 = laplacian(&grid, 0.5).iter().sum();
        assert!(total.abs() < 1e-3);
    }

    #[test]
    fn test_spacing_scales_result() {
        let mut grid = Grid::zeros(3, 3);
        grid.set(1, 1, 1.0);
        assert_eq!(laplacian(&grid, 0.5)[grid.idx(1, 1)], -16.0);
    }
}
