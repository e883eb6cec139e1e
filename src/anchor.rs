use crate::block::TableBlock;
use crate::fragment::{CoordinateSystem, FragmentMetadata, TableFragment};
use crate::geometry::column_boundaries;
use crate::measure::TableMeasure;
use crate::types::Px;

// Hand-off point for anchored tables: the float manager computes the
// placement and calls this once, bypassing the pagination loop entirely.
pub fn create_anchored_table_fragment(
    block: &TableBlock,
    measure: &TableMeasure,
    x: Px,
    y: Px,
) -> TableFragment {
    TableFragment {
        block_id: block.id.clone(),
        from_row: 0,
        to_row: block.rows.len(),
        x,
        y,
        width: measure.total_width,
        height: measure.total_height,
        continues_from_prev: false,
        continues_on_next: false,
        repeat_header_count: 0,
        partial_row: None,
        metadata: FragmentMetadata {
            column_boundaries: column_boundaries(measure),
            coordinate_system: CoordinateSystem::Fragment,
        },
    }
}
