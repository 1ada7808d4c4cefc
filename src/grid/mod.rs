mod grouper;

pub use grouper::{group_for_display, Cells, DisplayRow, GroupRows, RowGrouper};
