//! The escape-time function.  Both variants use `z <- z^2 + c` and
//! stop at the first iteration where `|z|^2 > 4`.

use num::Complex;

/// Default iteration bound.
pub const MAX_ITER: u32 = 1000;

/// Where the orbit starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Seed {
    /// `z = c`; the magnitude is tested before each update.
    Point,
    /// `z = 0`; the magnitude is tested after each update.
    Origin,
}

/// A pure, copyable escape-time evaluator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Kernel {
    max_iter: u32,
    seed: Seed,
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel::new(MAX_ITER, Seed::Point)
    }
}

impl Kernel {
    /// A kernel that gives up after `max_iter` iterations.
    pub fn new(max_iter: u32, seed: Seed) -> Self {
        Kernel { max_iter, seed }
    }

    /// The iteration bound.
    pub fn max_iter(&self) -> u32 {
        self.max_iter
    }

    /// The orbit's starting point.
    pub fn seed(&self) -> Seed {
        self.seed
    }

    /// Returns the 0-based iteration at which the orbit of `c` escaped,
    /// or `max_iter` if it never did.
    #[inline]
    pub fn iterate(&self, c: Complex<f64>) -> u32 {
        match self.seed {
            Seed::Point => {
                let mut z = c;
                for n in 0..self.max_iter {
                    if z.norm_sqr() > 4.0 {
                        return n;
                    }
                    z = z * z + c;
                }
            }
            Seed::Origin => {
                let mut z = Complex::new(0.0_f64, 0.0_f64);
                for n in 0..self.max_iter {
                    z = z * z + c;
                    if z.norm_sqr() > 4.0 {
                        return n;
                    }
                }
            }
        }
        self.max_iter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    const SEEDS: [Seed; 2] = [Seed::Point, Seed::Origin];

    #[test]
    fn far_points_escape_immediately() {
        for seed in &SEEDS {
            let k = Kernel::new(MAX_ITER, *seed);
            assert_eq!(k.iterate(Complex::new(5.0, 0.0)), 0);
            assert_eq!(k.iterate(Complex::new(0.0, -3.0)), 0);
        }
    }

    #[test]
    fn origin_never_escapes() {
        for seed in &SEEDS {
            let k = Kernel::new(MAX_ITER, *seed);
            assert_eq!(k.iterate(Complex::new(0.0, 0.0)), MAX_ITER);
            assert_eq!(k.iterate(Complex::new(-1.0, 0.0)), MAX_ITER);
        }
    }

    #[test]
    fn seeds_agree_on_the_real_axis() {
        // c = 1 visits 1, 2, 5 under either seed.
        let c = Complex::new(1.0, 0.0);
        assert_eq!(Kernel::new(MAX_ITER, Seed::Point).iterate(c), 2);
        assert_eq!(Kernel::new(MAX_ITER, Seed::Origin).iterate(c), 2);
        let c = Complex::new(2.0, 0.0);
        assert_eq!(Kernel::new(MAX_ITER, Seed::Point).iterate(c), 1);
        assert_eq!(Kernel::new(MAX_ITER, Seed::Origin).iterate(c), 1);
    }

    #[test]
    fn zero_bound_is_always_max() {
        let k = Kernel::new(0, Seed::Origin);
        assert_eq!(k.iterate(Complex::new(5.0, 5.0)), 0);
    }

    #[test]
    fn results_stay_in_bounds() {
        let mut rng = rand::thread_rng();
        for seed in &SEEDS {
            let k = Kernel::new(64, *seed);
            for _ in 0..2000 {
                let c = Complex::new(rng.gen_range(-3.0, 3.0), rng.gen_range(-3.0, 3.0));
                let n = k.iterate(c);
                assert!(n <= 64);
                assert_eq!(n, k.iterate(c));
            }
        }
    }
}
