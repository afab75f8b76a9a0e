//! Dense per-pixel velocity grid precomputed from a [`SeedSet`].
//!
//! The grid stores one `(vx, vy)` vector per integer pixel in row-major
//! layout. Building it costs `O(width * height * seeds)` once; afterwards
//! every particle lookup is `O(1)`. Access outside `[0, width) x [0, height)`
//! is a caller bug and panics; [`FieldGrid::try_lookup`] reports it instead.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FlowError;
use crate::seed::SeedSet;
use crate::strength::Falloff;

/// How a continuous particle position is turned into a velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    /// Velocity of the containing cell, `floor(x), floor(y)`.
    #[default]
    Nearest,
    /// Bilinear blend of the four cells around the position.
    Bilinear,
}

impl Sampling {
    pub const NAMES: &'static [&'static str] = &["nearest", "bilinear"];

    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        match name {
            "nearest" => Ok(Sampling::Nearest),
            "bilinear" => Ok(Sampling::Bilinear),
            other => Err(FlowError::InvalidConfiguration(format!(
                "unknown sampling '{other}' (expected one of: {})",
                Self::NAMES.join(", ")
            ))),
        }
    }
}

/// True when both components of `velocity` are within `epsilon` of zero.
///
/// Particles sampling a calm velocity would never move again.
pub fn is_calm(velocity: (f64, f64), epsilon: f64) -> bool {
    velocity.0.abs() <= epsilon && velocity.1.abs() <= epsilon
}

/// Precomputed velocity field, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid {
    width: usize,
    height: usize,
    data: Vec<(f64, f64)>,
}

impl FieldGrid {
    /// Builds the grid with the default quadratic falloff.
    pub fn build(seeds: &SeedSet, width: usize, height: usize) -> Result<Self, FlowError> {
        Self::build_with(seeds, width, height, Falloff::default())
    }

    /// Builds the grid, summing every in-range seed's weighted velocity at
    /// each integer pixel.
    ///
    /// Returns `FlowError::InvalidDimensions` if either dimension is zero or
    /// `width * height` overflows.
    pub fn build_with(
        seeds: &SeedSet,
        width: usize,
        height: usize,
        falloff: Falloff,
    ) -> Result<Self, FlowError> {
        if width == 0 || height == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .ok_or(FlowError::InvalidDimensions)?;
        let mut grid = Self {
            width,
            height,
            data: vec![(0.0, 0.0); len],
        };
        grid.rebuild(seeds, falloff);
        Ok(grid)
    }

    /// Creates a grid from pre-computed row-major velocities, validating that
    /// `data.len() == width * height`.
    pub fn from_data(
        width: usize,
        height: usize,
        data: Vec<(f64, f64)>,
    ) -> Result<Self, FlowError> {
        if width == 0 || height == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        let expected = width
            .checked_mul(height)
            .ok_or(FlowError::InvalidDimensions)?;
        if data.len() != expected {
            return Err(FlowError::InvalidConfiguration(format!(
                "field data has {} cells, expected {width}x{height} = {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Recomputes every cell from `seeds` in place, keeping the dimensions.
    ///
    /// This is the only way a grid changes after construction.
    pub fn rebuild(&mut self, seeds: &SeedSet, falloff: Falloff) {
        let started = Instant::now();
        let w = self.width;
        for (idx, cell) in self.data.iter_mut().enumerate() {
            let x = (idx % w) as f64;
            let y = (idx / w) as f64;
            *cell = seeds
                .iter()
                .filter_map(|s| s.contribution(x, y, falloff))
                .fold((0.0, 0.0), |(ax, ay), (vx, vy)| (ax + vx, ay + vy));
        }
        debug!(
            width = self.width,
            height = self.height,
            seeds = seeds.len(),
            ?falloff,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "built field grid"
        );
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cell data.
    pub fn data(&self) -> &[(f64, f64)] {
        &self.data
    }

    fn index(&self, x: isize, y: isize) -> Result<usize, FlowError> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Err(FlowError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width + x as usize)
    }

    /// Velocity at integer cell `(x, y)`, or `FlowError::OutOfBounds`.
    pub fn try_lookup(&self, x: isize, y: isize) -> Result<(f64, f64), FlowError> {
        self.index(x, y).map(|i| self.data[i])
    }

    /// Velocity at integer cell `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the grid. Callers guard positions
    /// before looking them up; clamping here would hide a particle bug.
    pub fn lookup(&self, x: isize, y: isize) -> (f64, f64) {
        match self.try_lookup(x, y) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }

    /// Velocity at a continuous in-bounds position.
    ///
    /// # Panics
    ///
    /// Panics if `floor(px), floor(py)` lies outside the grid.
    pub fn sample(&self, px: f64, py: f64, sampling: Sampling) -> (f64, f64) {
        let x0 = px.floor() as isize;
        let y0 = py.floor() as isize;
        match sampling {
            Sampling::Nearest => self.lookup(x0, y0),
            Sampling::Bilinear => {
                let c00 = self.lookup(x0, y0);
                // Upper neighbours clamp at the last row/column.
                let x1 = (x0 + 1).min(self.width as isize - 1);
                let y1 = (y0 + 1).min(self.height as isize - 1);
                let c10 = self.lookup(x1, y0);
                let c01 = self.lookup(x0, y1);
                let c11 = self.lookup(x1, y1);
                let tx = px - x0 as f64;
                let ty = py - y0 as f64;
                let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
                let top = (lerp(c00.0, c10.0, tx), lerp(c00.1, c10.1, tx));
                let bottom = (lerp(c01.0, c11.0, tx), lerp(c01.1, c11.1, tx));
                (lerp(top.0, bottom.0, ty), lerp(top.1, bottom.1, ty))
            }
        }
    }

    /// Largest velocity magnitude in the grid (0 for an empty field).
    pub fn max_speed(&self) -> f64 {
        self.data
            .iter()
            .map(|&(vx, vy)| (vx * vx + vy * vy).sqrt())
            .fold(0.0, f64::max)
    }

    /// Iterates over all cells yielding `(x, y, velocity)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, (f64, f64))> + '_ {
        self.data.iter().enumerate().map(|(i, &v)| {
            let x = i % self.width;
            let y = i / self.width;
            (x, y, v)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::Xorshift64;
    use crate::seed::{Seed, SpeedRange};

    fn single(position: (f64, f64), velocity: (f64, f64), radius: f64) -> SeedSet {
        SeedSet::from_seeds(vec![Seed::new(position, velocity, radius)])
    }

    // -- Construction --

    #[test]
    fn zero_dimensions_are_rejected() {
        let seeds = SeedSet::default();
        assert!(matches!(
            FieldGrid::build(&seeds, 0, 10),
            Err(FlowError::InvalidDimensions)
        ));
        assert!(matches!(
            FieldGrid::build(&seeds, 10, 0),
            Err(FlowError::InvalidDimensions)
        ));
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        let seeds = SeedSet::default();
        assert!(FieldGrid::build(&seeds, usize::MAX, 2).is_err());
    }

    #[test]
    fn no_seeds_yields_all_zero_grid() {
        let grid = FieldGrid::build(&SeedSet::default(), 16, 9).unwrap();
        assert_eq!(grid.data().len(), 16 * 9);
        assert!(grid.data().iter().all(|&v| v == (0.0, 0.0)));
        assert_eq!(grid.max_speed(), 0.0);
    }

    // -- Single-seed exactness --

    #[test]
    fn single_seed_exact_at_centre_and_boundary() {
        let seeds = single((100.0, 100.0), (20.0, 30.0), 500.0);
        let grid = FieldGrid::build_with(&seeds, 700, 200, Falloff::Linear).unwrap();
        assert_eq!(grid.lookup(100, 100), (20.0, 30.0));
        assert_eq!(grid.lookup(600, 100), (0.0, 0.0));
    }

    #[test]
    fn single_seed_halfway_is_half_velocity_linear() {
        let seeds = single((0.0, 0.0), (10.0, -4.0), 100.0);
        let grid = FieldGrid::build_with(&seeds, 101, 1, Falloff::Linear).unwrap();
        let (vx, vy) = grid.lookup(50, 0);
        assert!((vx - 5.0).abs() < 1e-12);
        assert!((vy + 2.0).abs() < 1e-12);
    }

    #[test]
    fn pixels_beyond_radius_are_calm() {
        let seeds = single((5.0, 5.0), (1.0, 1.0), 3.0);
        let grid = FieldGrid::build(&seeds, 20, 20).unwrap();
        assert!(is_calm(grid.lookup(15, 15), 0.0));
        assert!(!is_calm(grid.lookup(5, 5), 0.0));
    }

    #[test]
    fn calm_threshold_is_inclusive_per_component() {
        assert!(is_calm((1e-9, -1e-9), 1e-9));
        assert!(!is_calm((1e-9, 2e-9), 1e-9));
        assert!(!is_calm((0.0, f64::NAN), 1.0));
    }

    // -- Superposition --

    #[test]
    fn overlapping_seeds_sum_componentwise() {
        let a = Seed::new((10.0, 10.0), (3.0, 0.0), 50.0);
        let b = Seed::new((20.0, 10.0), (0.0, -7.0), 50.0);
        let both = SeedSet::from_seeds(vec![a, b]);
        let grid = FieldGrid::build(&both, 32, 32).unwrap();
        for (x, y) in [(10, 10), (15, 12), (0, 31), (31, 0)] {
            let (fx, fy) = (x as f64, y as f64);
            let ca = a.contribution(fx, fy, Falloff::Quadratic).unwrap_or((0.0, 0.0));
            let cb = b.contribution(fx, fy, Falloff::Quadratic).unwrap_or((0.0, 0.0));
            let (gx, gy) = grid.lookup(x, y);
            assert!((gx - (ca.0 + cb.0)).abs() < 1e-12);
            assert!((gy - (ca.1 + cb.1)).abs() < 1e-12);
        }
    }

    #[test]
    fn opposing_seeds_can_cancel_exactly() {
        let seeds = SeedSet::from_seeds(vec![
            Seed::new((4.0, 4.0), (10.0, 0.0), 20.0),
            Seed::new((4.0, 4.0), (-10.0, 0.0), 20.0),
        ]);
        let grid = FieldGrid::build(&seeds, 8, 8).unwrap();
        assert!(grid.data().iter().all(|&(vx, vy)| vx == 0.0 && vy == 0.0));
    }

    // -- Determinism --

    #[test]
    fn build_twice_is_bit_identical() {
        let seeds = SeedSet::generate(12, 64.0, 48.0, SpeedRange::default(), 30.0, &mut Xorshift64::new(5));
        let a = FieldGrid::build(&seeds, 64, 48).unwrap();
        let b = FieldGrid::build(&seeds, 64, 48).unwrap();
        assert!(a
            .data()
            .iter()
            .zip(b.data())
            .all(|(p, q)| p.0.to_bits() == q.0.to_bits() && p.1.to_bits() == q.1.to_bits()));
    }

    #[test]
    fn rebuild_replaces_previous_field() {
        let mut grid = FieldGrid::build(&single((2.0, 2.0), (1.0, 0.0), 10.0), 8, 8).unwrap();
        grid.rebuild(&SeedSet::default(), Falloff::Quadratic);
        assert!(grid.data().iter().all(|&v| v == (0.0, 0.0)));
    }

    #[test]
    fn from_data_rejects_wrong_length() {
        let result = FieldGrid::from_data(2, 2, vec![(0.0, 0.0); 3]);
        assert!(matches!(result, Err(FlowError::InvalidConfiguration(_))));
        assert!(FieldGrid::from_data(0, 2, Vec::new()).is_err());
    }

    #[test]
    fn from_data_is_row_major() {
        let grid = FieldGrid::from_data(2, 2, vec![(1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)])
            .unwrap();
        assert_eq!(grid.lookup(1, 0), (2.0, 0.0));
        assert_eq!(grid.lookup(0, 1), (3.0, 0.0));
    }

    // -- Bounds --

    #[test]
    fn try_lookup_out_of_bounds_errors() {
        let grid = FieldGrid::build(&SeedSet::default(), 4, 3).unwrap();
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 3)] {
            assert!(matches!(
                grid.try_lookup(x, y),
                Err(FlowError::OutOfBounds { width: 4, height: 3, .. })
            ));
        }
        assert!(grid.try_lookup(3, 2).is_ok());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn lookup_out_of_bounds_panics() {
        let grid = FieldGrid::build(&SeedSet::default(), 4, 4).unwrap();
        grid.lookup(4, 0);
    }

    // -- Sampling --

    #[test]
    fn nearest_sampling_floors_position() {
        let seeds = single((0.0, 0.0), (10.0, 0.0), 10.0);
        let grid = FieldGrid::build_with(&seeds, 10, 1, Falloff::Linear).unwrap();
        assert_eq!(grid.sample(2.9, 0.5, Sampling::Nearest), grid.lookup(2, 0));
    }

    #[test]
    fn bilinear_sampling_interpolates_between_cells() {
        let seeds = single((0.0, 0.0), (10.0, 0.0), 10.0);
        let grid = FieldGrid::build_with(&seeds, 10, 1, Falloff::Linear).unwrap();
        // lookup(2,0) = 8, lookup(3,0) = 7
        let (vx, vy) = grid.sample(2.25, 0.0, Sampling::Bilinear);
        assert!((vx - 7.75).abs() < 1e-12, "vx = {vx}");
        assert_eq!(vy, 0.0);
    }

    #[test]
    fn bilinear_sampling_at_integer_matches_lookup() {
        let seeds = SeedSet::generate(4, 32.0, 32.0, SpeedRange::default(), 16.0, &mut Xorshift64::new(9));
        let grid = FieldGrid::build(&seeds, 32, 32).unwrap();
        assert_eq!(grid.sample(7.0, 11.0, Sampling::Bilinear), grid.lookup(7, 11));
    }

    #[test]
    fn bilinear_sampling_clamps_at_last_cell() {
        let seeds = single((0.0, 0.0), (10.0, 10.0), 100.0);
        let grid = FieldGrid::build(&seeds, 5, 5).unwrap();
        let v = grid.sample(4.9, 4.9, Sampling::Bilinear);
        assert_eq!(v, grid.lookup(4, 4));
    }

    #[test]
    fn sampling_names_parse() {
        assert_eq!(Sampling::from_name("nearest").unwrap(), Sampling::Nearest);
        assert_eq!(Sampling::from_name("bilinear").unwrap(), Sampling::Bilinear);
        assert!(Sampling::from_name("cubic").is_err());
    }

    #[test]
    fn iter_yields_row_major_coordinates() {
        let grid = FieldGrid::build(&SeedSet::default(), 3, 2).unwrap();
        let coords: Vec<(usize, usize)> = grid.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn seed() -> impl Strategy<Value = Seed> {
            (0.0_f64..40.0, 0.0_f64..30.0, -80.0_f64..80.0, -80.0_f64..80.0, 1.0_f64..25.0)
                .prop_map(|(x, y, vx, vy, r)| Seed::new((x, y), (vx, vy), r))
        }

        proptest! {
            #[test]
            fn grid_equals_sum_of_contributions(
                seeds in prop::collection::vec(seed(), 0..6),
                x in 0_usize..40,
                y in 0_usize..30,
            ) {
                let set = SeedSet::from_seeds(seeds.clone());
                let grid = FieldGrid::build(&set, 40, 30).unwrap();
                let expected = seeds
                    .iter()
                    .filter_map(|s| s.contribution(x as f64, y as f64, Falloff::Quadratic))
                    .fold((0.0, 0.0), |(ax, ay), (vx, vy)| (ax + vx, ay + vy));
                let got = grid.lookup(x as isize, y as isize);
                prop_assert_eq!(got.0.to_bits(), expected.0.to_bits());
                prop_assert_eq!(got.1.to_bits(), expected.1.to_bits());
            }

            #[test]
            fn build_is_deterministic(seeds in prop::collection::vec(seed(), 0..6)) {
                let set = SeedSet::from_seeds(seeds);
                let a = FieldGrid::build(&set, 40, 30).unwrap();
                let b = FieldGrid::build(&set, 40, 30).unwrap();
                prop_assert_eq!(a, b);
            }
        }
    }
}
