use calamine::{Data, Range};

static EMPTY: Data = Data::Empty;

/// Read-only cell access into one sheet, 1-indexed.
pub trait CellGrid {
    /// Returns the raw value at `row`/`col`, or an empty cell when out of range.
    fn cell(&self, row: u32, col: u32) -> &Data;
}

impl CellGrid for Range<Data> {
    fn cell(&self, row: u32, col: u32) -> &Data {
        if row == 0 || col == 0 {
            return &EMPTY;
        }
        // calamine works with absolute 0-based positions
        self.get_value((row - 1, col - 1)).unwrap_or(&EMPTY)
    }
}
