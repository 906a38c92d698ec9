//! Parameter grid generation.
//!
//! Seasonal ARMA coefficients are estimated by a deterministic grid search:
//! a coarse product grid first, then progressively finer grids centred on the
//! best candidate. The same inputs always produce the same candidate order.

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
///
/// A single step yields the midpoint.
pub fn linear_space(min: f64, max: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![(min + max) / 2.0],
        _ => {
            let step = (max - min) / (steps as f64 - 1.0);
            (0..steps).map(|i| min + step * i as f64).collect()
        }
    }
}

/// Cartesian product of the given axes, last axis varying fastest.
pub fn product_grid(axes: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut out: Vec<Vec<f64>> = vec![Vec::new()];
    for axis in axes {
        let mut next = Vec::with_capacity(out.len() * axis.len());
        for prefix in &out {
            for &v in axis {
                let mut row = prefix.clone();
                row.push(v);
                next.push(row);
            }
        }
        out = next;
    }
    out
}

/// A finer product grid of `steps` points per axis spanning
/// `center ± half_width`, clamped into `[-bound, bound]`.
pub fn refine_grid(center: &[f64], half_width: f64, steps: usize, bound: f64) -> Vec<Vec<f64>> {
    let axes: Vec<Vec<f64>> = center
        .iter()
        .map(|&c| {
            let lo = (c - half_width).max(-bound);
            let hi = (c + half_width).min(bound);
            linear_space(lo, hi, steps)
        })
        .collect();
    product_grid(&axes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_space_includes_endpoints() {
        let v = linear_space(-0.9, 0.9, 7);
        assert_eq!(v.len(), 7);
        assert!((v[0] + 0.9).abs() < 1e-12);
        assert!((v[6] - 0.9).abs() < 1e-12);
        assert!(v[3].abs() < 1e-12);
    }

    #[test]
    fn product_grid_enumerates_every_combination() {
        let grid = product_grid(&[vec![0.0, 1.0], vec![2.0, 3.0, 4.0]]);
        assert_eq!(grid.len(), 6);
        assert_eq!(grid[0], vec![0.0, 2.0]);
        assert_eq!(grid[5], vec![1.0, 4.0]);
    }

    #[test]
    fn refine_grid_stays_inside_bound() {
        let grid = refine_grid(&[0.95, -0.95], 0.1, 5, 0.98);
        assert_eq!(grid.len(), 25);
        for point in grid {
            assert!(point.iter().all(|v| v.abs() <= 0.98));
        }
    }
}
