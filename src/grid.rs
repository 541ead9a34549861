//! Contains the Grid struct, which describes a relationship between a
//! rectangle on the integral plane with an origin at 0,0 and a
//! rectangle on the complex plane with an arbitrary pair of corners
//! defining its left-lower and right-upper extent.
use crate::error::Error;
use crate::partition::Axis;
use num::Complex;

/// The immutable sample lattice.  Built once at startup and shared
/// read-only by every worker.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    lower_left: Complex<f64>,
    upper_right: Complex<f64>,
    // The distance between neighbouring samples along x and y.
    steps: (f64, f64),
}

impl Grid {
    /// Takes the integral size of the lattice and the two corners of
    /// the complex plane it samples.
    pub fn new(
        width: usize,
        height: usize,
        lower_left: Complex<f64>,
        upper_right: Complex<f64>,
    ) -> Result<Grid, Error> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyGrid { width, height });
        }

        if width.checked_mul(height).is_none() {
            return Err(Error::GridTooLarge { width, height });
        }

        if upper_right.re < lower_left.re {
            return Err(Error::BadBounds(
                "the left lower corner is not to the left of the right upper corner".to_string(),
            ));
        }

        if upper_right.im < lower_left.im {
            return Err(Error::BadBounds(
                "the left lower corner is not lower than the right upper corner".to_string(),
            ));
        }

        let steps = (
            (upper_right.re - lower_left.re) / (width as f64),
            (upper_right.im - lower_left.im) / (height as f64),
        );

        Ok(Grid {
            width,
            height,
            lower_left,
            upper_right,
            steps,
        })
    }

    /// Samples per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Samples per column.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Left-lower corner of the complex plane.
    pub fn lower_left(&self) -> Complex<f64> {
        self.lower_left
    }

    /// Right-upper corner of the complex plane.
    pub fn upper_right(&self) -> Complex<f64> {
        self.upper_right
    }

    /// `(x_step, y_step)`
    pub fn steps(&self) -> (f64, f64) {
        self.steps
    }

    /// The total number of points in the grid.  `new` guarantees the
    /// product fits in a `usize`.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True if the grid holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many units a planner divides along `axis`.
    pub fn units(&self, axis: Axis) -> usize {
        match axis {
            Axis::Rows => self.height,
            Axis::Columns => self.width,
        }
    }

    /// How many samples each unit along `axis` holds.
    pub fn span(&self, axis: Axis) -> usize {
        match axis {
            Axis::Rows => self.width,
            Axis::Columns => self.height,
        }
    }

    /// The sample point at a global row and column.
    #[inline]
    pub fn point(&self, row: usize, col: usize) -> Complex<f64> {
        Complex::new(
            self.lower_left.re + (col as f64) * self.steps.0,
            self.lower_left.im + (row as f64) * self.steps.1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_fails_on_bad_shape() {
        let g = Grid::new(4, 4, Complex::new(-1.0, 1.0), Complex::new(1.0, -1.0));
        assert!(g.is_err());
        let g = Grid::new(4, 4, Complex::new(1.0, -1.0), Complex::new(-1.0, 1.0));
        assert!(g.is_err());
    }

    #[test]
    fn grid_fails_when_empty() {
        let g = Grid::new(0, 4, Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0));
        match g {
            Err(Error::EmptyGrid { width: 0, height: 4 }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn grid_fails_when_the_size_overflows() {
        let g = Grid::new(1 << 63, 2, Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0));
        match g {
            Err(Error::GridTooLarge { height: 2, .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        let g = Grid::new(usize::max_value(), 1, Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0));
        assert_eq!(g.unwrap().len(), usize::max_value());
    }

    #[test]
    fn steps_divide_the_plane() {
        let g = Grid::new(801, 800, Complex::new(-2.0, -1.5), Complex::new(1.0, 1.5)).unwrap();
        assert_eq!(g.steps(), (3.0 / 801.0, 3.0 / 800.0));
        assert_eq!(g.len(), 801 * 800);
        assert_eq!(g.units(Axis::Columns), 801);
        assert_eq!(g.span(Axis::Columns), 800);
    }

    #[test]
    fn point_maps_row_and_column() {
        let g = Grid::new(4, 4, Complex::new(-2.0, -2.0), Complex::new(2.0, 2.0)).unwrap();
        assert_eq!(g.point(0, 0), Complex::new(-2.0, -2.0));
        assert_eq!(g.point(2, 2), Complex::new(0.0, 0.0));
        assert_eq!(g.point(1, 3), Complex::new(1.0, -1.0));
    }
}
