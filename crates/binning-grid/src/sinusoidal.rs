//! Integerized sinusoidal grid implementation.
//!
//! The grid divides the globe into `num_rows` rows of equal latitude
//! height. Row `r` is centered at `(r + 0.5) * 180 / num_rows - 90`
//! degrees and holds `round(2 * num_rows * cos(lat))` columns, giving
//! every cell an approximately equal area. Bin indices count columns
//! west-to-east within a row, rows south-to-north, starting at zero.

use binning_common::{BinningError, Result};

/// Default row count, yielding a ~4 km global grid.
pub const DEFAULT_NUM_ROWS: usize = 2160;

/// Deterministic lat/lon to bin-index mapping over an equal-area
/// sinusoidal grid.
///
/// Holds no aggregation state; a single instance is shared across all
/// slices and passes of a binning job.
#[derive(Debug, Clone)]
pub struct SinusoidalGrid {
    num_rows: usize,
    /// Center latitude per row, south to north.
    lat_centers: Vec<f64>,
    /// Running sum of column counts of all prior rows.
    row_base: Vec<usize>,
    /// Column count per row.
    num_cols: Vec<usize>,
    total_bins: usize,
}

impl SinusoidalGrid {
    /// Create a grid with the given number of rows.
    ///
    /// `num_rows` must be even and at least 2, otherwise
    /// [`BinningError::InvalidNumRows`] is returned.
    pub fn new(num_rows: usize) -> Result<Self> {
        if num_rows < 2 || num_rows % 2 != 0 {
            return Err(BinningError::InvalidNumRows(num_rows));
        }
        Ok(Self::build(num_rows))
    }

    /// Create the default ~4 km grid with [`DEFAULT_NUM_ROWS`] rows.
    pub fn default_grid() -> Self {
        Self::build(DEFAULT_NUM_ROWS)
    }

    fn build(num_rows: usize) -> Self {
        let mut lat_centers = Vec::with_capacity(num_rows);
        let mut row_base = Vec::with_capacity(num_rows);
        let mut num_cols = Vec::with_capacity(num_rows);
        let mut base = 0usize;
        for row in 0..num_rows {
            let lat = ((row as f64 + 0.5) * 180.0 / num_rows as f64) - 90.0;
            let cols = (2.0 * num_rows as f64 * lat.to_radians().cos()).round() as usize;
            lat_centers.push(lat);
            row_base.push(base);
            num_cols.push(cols);
            base += cols;
        }
        Self {
            num_rows,
            lat_centers,
            row_base,
            num_cols,
            total_bins: base,
        }
    }

    /// Number of latitude rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns in a row.
    pub fn num_cols(&self, row: usize) -> usize {
        self.num_cols[row]
    }

    /// Total number of bins in the grid.
    pub fn total_bins(&self) -> usize {
        self.total_bins
    }

    /// Map a latitude to its row index.
    ///
    /// Latitudes at or beyond the poles clamp to the first/last row.
    pub fn row_index(&self, lat: f64) -> usize {
        if lat <= -90.0 {
            return 0;
        }
        if lat >= 90.0 {
            return self.num_rows - 1;
        }
        let row = ((lat + 90.0) * self.num_rows as f64 / 180.0) as usize;
        row.min(self.num_rows - 1)
    }

    /// Map a longitude to its column index within a row.
    ///
    /// Longitudes at or beyond the antimeridian clamp to the first/last
    /// column.
    pub fn col_index(&self, lon: f64, row: usize) -> usize {
        let cols = self.num_cols[row];
        if lon <= -180.0 {
            return 0;
        }
        if lon >= 180.0 {
            return cols - 1;
        }
        let col = ((lon + 180.0) * cols as f64 / 360.0) as usize;
        col.min(cols - 1)
    }

    /// Map geographic coordinates to a bin index.
    pub fn bin_index(&self, lat: f64, lon: f64) -> usize {
        let row = self.row_index(lat);
        self.row_base[row] + self.col_index(lon, row)
    }

    /// Find the row containing a bin index.
    ///
    /// Binary search over the monotonic row-base table: the greatest row
    /// whose base offset does not exceed the index. O(log num_rows).
    pub fn row_of_bin(&self, bin_index: usize) -> usize {
        match self.row_base.binary_search(&bin_index) {
            Ok(row) => row,
            Err(insertion) => insertion - 1,
        }
    }

    /// Center latitude of a row.
    pub fn center_lat(&self, row: usize) -> f64 {
        self.lat_centers[row]
    }

    /// Center longitude of a column within a row.
    pub fn center_lon(&self, row: usize, col: usize) -> f64 {
        360.0 * (col as f64 + 0.5) / self.num_cols[row] as f64 - 180.0
    }

    /// Geographic center of a bin's cell.
    pub fn center_lat_lon(&self, bin_index: usize) -> (f64, f64) {
        let row = self.row_of_bin(bin_index);
        let col = bin_index - self.row_base[row];
        (self.lat_centers[row], self.center_lon(row, col))
    }
}

impl Default for SinusoidalGrid {
    fn default() -> Self {
        Self::default_grid()
    }
}
