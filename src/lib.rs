mod anchor;
mod block;
mod debug;
mod error;
mod fragment;
mod geometry;
mod measure;
mod paginator;
mod table;
mod types;

pub use anchor::create_anchored_table_fragment;
pub use block::{
    AnchorAttrs, CellAttrs, CellBlock, CellPadding, FloatingTableProps, OtherBlock,
    ParagraphContent, RowAttrs, TableAttrs, TableBlock, TableCell, TableIndent, TableRow,
    TableRowProperties, VerticalAlign,
};
pub use debug::DebugLogger;
pub use error::GalleyError;
pub use fragment::{
    ColumnBoundary, CoordinateSystem, FragmentMetadata, PartialRowInfo, TableFragment,
};
pub use geometry::{
    apply_table_indent, column_boundaries, column_min_width, count_header_rows, sum_row_heights,
    table_indent_width, DEFAULT_MIN_COLUMN_WIDTH_PX, MAX_MIN_COLUMN_WIDTH_PX,
};
pub use measure::{
    BlockMeasure, CellMeasure, LineMeasure, ParagraphMeasure, RowMeasure, TableMeasure,
};
pub use paginator::{ColumnPager, PageState, Paginator};
pub use table::{
    compute_partial_row, find_split_point, layout_table, SplitPoint, TableLayout,
    TableLayoutMetrics, MIN_PARTIAL_ROW_HEIGHT_PX,
};
pub use types::Px;
