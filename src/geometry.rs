use crate::block::{TableAttrs, TableBlock};
use crate::fragment::ColumnBoundary;
use crate::measure::TableMeasure;
use crate::types::Px;

pub const DEFAULT_MIN_COLUMN_WIDTH_PX: i32 = 25;
pub const MAX_MIN_COLUMN_WIDTH_PX: i32 = 200;

// Header rows are a contiguous prefix; the first non-header row ends it.
pub fn count_header_rows(block: &TableBlock) -> usize {
    block
        .rows
        .iter()
        .take_while(|row| row.repeat_header())
        .count()
}

pub fn sum_row_heights(measure: &TableMeasure, from: usize, to: usize) -> Px {
    let to = to.min(measure.rows.len());
    if from >= to {
        return Px::ZERO;
    }
    measure.rows[from..to]
        .iter()
        .fold(Px::ZERO, |acc, row| acc + row.height)
}

pub fn column_min_width(measure: &TableMeasure, column_index: usize) -> Px {
    let width = measure
        .column_widths
        .get(column_index)
        .copied()
        .unwrap_or(Px::ZERO);
    width.clamp(
        Px::from_i32(DEFAULT_MIN_COLUMN_WIDTH_PX),
        Px::from_i32(MAX_MIN_COLUMN_WIDTH_PX),
    )
}

pub fn column_boundaries(measure: &TableMeasure) -> Vec<ColumnBoundary> {
    let mut boundaries = Vec::with_capacity(measure.column_widths.len());
    let mut x = Px::ZERO;
    for (index, width) in measure.column_widths.iter().enumerate() {
        boundaries.push(ColumnBoundary {
            index,
            x,
            width: *width,
            min_width: column_min_width(measure, index),
            resizable: true,
        });
        x += *width;
    }
    boundaries
}

pub fn table_indent_width(attrs: &TableAttrs) -> Px {
    attrs
        .table_indent
        .map(|indent| Px::from_f64(indent.width))
        .unwrap_or(Px::ZERO)
}

pub fn apply_table_indent(x: Px, width: Px, indent: Px) -> (Px, Px) {
    (x + indent, (width - indent).max(Px::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{TableIndent, TableRow};
    use crate::measure::RowMeasure;

    fn px(value: i32) -> Px {
        Px::from_i32(value)
    }

    fn block_with_header_flags(flags: &[bool]) -> TableBlock {
        TableBlock::new("t").with_rows(
            flags
                .iter()
                .map(|flag| TableRow::new(Vec::new()).with_repeat_header(*flag))
                .collect(),
        )
    }

    fn measure_with_heights(heights: &[i32]) -> TableMeasure {
        TableMeasure::new(
            heights
                .iter()
                .map(|h| RowMeasure {
                    height: px(*h),
                    cells: Vec::new(),
                })
                .collect(),
            Vec::new(),
        )
    }

    #[test]
    fn header_count_stops_at_first_body_row() {
        assert_eq!(count_header_rows(&block_with_header_flags(&[])), 0);
        assert_eq!(
            count_header_rows(&block_with_header_flags(&[true, true, false, true])),
            2
        );
        assert_eq!(
            count_header_rows(&block_with_header_flags(&[false, true])),
            0
        );
    }

    #[test]
    fn row_height_sum_tolerates_out_of_range_bounds() {
        let measure = measure_with_heights(&[10, 20, 30]);
        assert_eq!(sum_row_heights(&measure, 0, 3), px(60));
        assert_eq!(sum_row_heights(&measure, 1, 99), px(50));
        assert_eq!(sum_row_heights(&measure, 2, 1), Px::ZERO);
        assert_eq!(sum_row_heights(&measure, 7, 9), Px::ZERO);
    }

    #[test]
    fn min_column_width_clamps_into_the_resize_band() {
        let measure = TableMeasure::new(Vec::new(), vec![px(10), px(80), px(500)]);
        assert_eq!(column_min_width(&measure, 0), px(25));
        assert_eq!(column_min_width(&measure, 1), px(80));
        assert_eq!(column_min_width(&measure, 2), px(200));
        assert_eq!(column_min_width(&measure, 9), px(25));
    }

    #[test]
    fn boundaries_walk_cumulative_x() {
        let measure = TableMeasure::new(Vec::new(), vec![px(100), px(150), px(50)]);
        let boundaries = column_boundaries(&measure);
        assert_eq!(boundaries.len(), 3);
        assert_eq!(boundaries[0].x, Px::ZERO);
        assert_eq!(boundaries[1].x, px(100));
        assert_eq!(boundaries[2].x, px(250));
        assert_eq!(boundaries[2].width, px(50));
        assert_eq!(boundaries[2].min_width, px(50));
        assert!(boundaries.iter().all(|b| b.resizable));

        assert!(column_boundaries(&TableMeasure::default()).is_empty());
    }

    #[test]
    fn indent_width_rejects_non_finite_values() {
        let mut attrs = TableAttrs::default();
        assert_eq!(table_indent_width(&attrs), Px::ZERO);
        attrs.table_indent = Some(TableIndent { width: 36.0 });
        assert_eq!(table_indent_width(&attrs), px(36));
        attrs.table_indent = Some(TableIndent { width: f64::NAN });
        assert_eq!(table_indent_width(&attrs), Px::ZERO);
        attrs.table_indent = Some(TableIndent {
            width: f64::INFINITY,
        });
        assert_eq!(table_indent_width(&attrs), Px::ZERO);
    }

    #[test]
    fn indent_shifts_x_and_never_leaves_negative_width() {
        assert_eq!(
            apply_table_indent(px(100), px(400), px(30)),
            (px(130), px(370))
        );
        assert_eq!(
            apply_table_indent(px(100), px(20), px(30)),
            (px(130), Px::ZERO)
        );
    }
}
