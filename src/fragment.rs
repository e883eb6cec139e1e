use crate::measure::TableMeasure;
use crate::types::Px;

// One rectangular slice of the table placed on a page. Coordinates are in the
// paginator's document space; `y + height` equals the cursor position after
// emission.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFragment {
    pub block_id: String,
    pub from_row: usize,
    pub to_row: usize,
    pub x: Px,
    pub y: Px,
    pub width: Px,
    pub height: Px,
    pub continues_from_prev: bool,
    pub continues_on_next: bool,
    pub repeat_header_count: usize,
    pub partial_row: Option<PartialRowInfo>,
    pub metadata: FragmentMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentMetadata {
    pub column_boundaries: Vec<ColumnBoundary>,
    pub coordinate_system: CoordinateSystem,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinateSystem {
    #[default]
    Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnBoundary {
    pub index: usize,
    pub x: Px,
    pub width: Px,
    pub min_width: Px,
    pub resizable: bool,
}

// Line cutoffs for a row emitted across several fragments. Indices are global
// line positions per cell (all paragraph blocks flattened); `to` is exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRowInfo {
    pub row_index: usize,
    pub from_line_by_cell: Vec<usize>,
    pub to_line_by_cell: Vec<usize>,
    pub is_first_part: bool,
    pub is_last_part: bool,
    pub partial_height: Px,
}

impl PartialRowInfo {
    pub fn made_progress(&self) -> bool {
        self.to_line_by_cell
            .iter()
            .zip(&self.from_line_by_cell)
            .any(|(to, from)| to > from)
    }

    pub fn has_more(&self, measure: &TableMeasure) -> bool {
        let Some(row) = measure.rows.get(self.row_index) else {
            return false;
        };
        row.cells
            .iter()
            .enumerate()
            .any(|(cell_index, cell)| {
                self.to_line_by_cell
                    .get(cell_index)
                    .is_some_and(|to| *to < cell.line_count())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{BlockMeasure, CellMeasure, ParagraphMeasure, RowMeasure};

    fn partial(from: Vec<usize>, to: Vec<usize>) -> PartialRowInfo {
        PartialRowInfo {
            row_index: 0,
            from_line_by_cell: from,
            to_line_by_cell: to,
            is_first_part: true,
            is_last_part: false,
            partial_height: Px::ZERO,
        }
    }

    fn one_row_measure(line_counts: &[usize]) -> TableMeasure {
        let cells = line_counts
            .iter()
            .map(|count| CellMeasure {
                blocks: vec![BlockMeasure::Paragraph(ParagraphMeasure::from_line_heights(
                    &vec![Px::from_i32(10); *count],
                ))],
            })
            .collect();
        TableMeasure::new(
            vec![RowMeasure {
                height: Px::from_i32(10),
                cells,
            }],
            Vec::new(),
        )
    }

    #[test]
    fn progress_requires_at_least_one_advanced_cell() {
        assert!(partial(vec![0, 1], vec![1, 1]).made_progress());
        assert!(!partial(vec![2, 3], vec![2, 3]).made_progress());
    }

    #[test]
    fn has_more_compares_against_cell_line_counts() {
        let measure = one_row_measure(&[4, 2]);
        assert!(partial(vec![0, 0], vec![2, 2]).has_more(&measure));
        assert!(!partial(vec![2, 1], vec![4, 2]).has_more(&measure));
    }
}
