use std::collections::HashMap;

use crate::geometry::EARTH_RADIUS_M;

/// Coarse lat/lon bucket index over record positions.
///
/// Longitude buckets wrap at the antimeridian, so positions either side of
/// ±180° are still neighbours.
pub struct Grid {
    cell_deg: f64,
    /// Buckets in one full turn of longitude.
    lon_cells: i64,
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl Grid {
    pub fn new(cell_deg: f64) -> Self {
        Self {
            cell_deg,
            lon_cells: ((360.0 / cell_deg).round() as i64).max(1),
            buckets: HashMap::new(),
        }
    }

    /// `(ix, iy)` from longitude and latitude respectively.
    pub fn bucket(&self, lat: f64, lon: f64) -> (i64, i64) {
        (
            (lon / self.cell_deg).floor() as i64,
            (lat / self.cell_deg).floor() as i64,
        )
    }

    pub fn insert(&mut self, lat: f64, lon: f64, index: usize) {
        let key = self.bucket(lat, lon);
        self.buckets.entry(key).or_default().push(index);
    }

    /// Everything in the 3x3 block of buckets around `(ix, iy)`.
    pub fn nearby(&self, ix: i64, iy: i64) -> Vec<usize> {
        self.around(ix, iy, 1, 1)
    }

    /// Every index that could lie within `radius_m` of the position.
    ///
    /// Longitude cells narrow towards the poles, so the block widens until
    /// it spans the radius; at low latitudes and small radii this is the
    /// 3x3 block of [`Grid::nearby`].
    pub fn within(&self, lat: f64, lon: f64, radius_m: f64) -> Vec<usize> {
        let (ix, iy) = self.bucket(lat, lon);
        let cell_m = (self.cell_deg.to_radians() * EARTH_RADIUS_M).max(f64::MIN_POSITIVE);
        let cos_lat = lat.to_radians().cos().max(0.01);
        let span = |m: f64| ((radius_m / m).ceil() as i64).clamp(1, 1 << 16);
        match (span(cell_m * cos_lat), span(cell_m)) {
            (1, 1) => self.nearby(ix, iy),
            (dx, dy) => self.around(ix, iy, dx, dy),
        }
    }

    fn around(&self, ix: i64, iy: i64, dx: i64, dy: i64) -> Vec<usize> {
        // a block wider than one turn would visit buckets twice
        let dx = dx.min((self.lon_cells - 1) / 2).max(0);
        let mut found = Vec::new();
        for y in iy.saturating_sub(dy)..=iy.saturating_add(dy) {
            for x in ix.saturating_sub(dx)..=ix.saturating_add(dx) {
                let wrapped = [x.checked_sub(self.lon_cells), x.checked_add(self.lon_cells)];
                for x in [Some(x)].into_iter().chain(wrapped).flatten() {
                    if let Some(bucket) = self.buckets.get(&(x, y)) {
                        found.extend_from_slice(bucket);
                    }
                }
            }
        }
        found
    }
}
