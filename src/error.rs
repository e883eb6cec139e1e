use std::fmt;

// Variants signal programmer error: they cannot be produced by valid block
// and measure trees. Degenerate-but-valid inputs (non-finite indents, missing
// padding, empty column lists) take documented defaults instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleyError {
    RowIndexOutOfBounds {
        row_index: usize,
        row_count: usize,
    },
    LineRangeOutOfBounds {
        row_index: usize,
        cell_index: usize,
        from_line: usize,
        line_count: usize,
    },
}

impl fmt::Display for GalleyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GalleyError::RowIndexOutOfBounds {
                row_index,
                row_count,
            } => {
                write!(
                    f,
                    "row index {} out of bounds for table with {} measured rows",
                    row_index, row_count
                )
            }
            GalleyError::LineRangeOutOfBounds {
                row_index,
                cell_index,
                from_line,
                line_count,
            } => {
                write!(
                    f,
                    "line cursor {} exceeds {} lines in row {} cell {}",
                    from_line, line_count, row_index, cell_index
                )
            }
        }
    }
}

impl std::error::Error for GalleyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_indices() {
        let err = GalleyError::RowIndexOutOfBounds {
            row_index: 7,
            row_count: 3,
        };
        assert!(err.to_string().contains("row index 7"));

        let err = GalleyError::LineRangeOutOfBounds {
            row_index: 1,
            cell_index: 2,
            from_line: 9,
            line_count: 4,
        };
        let text = err.to_string();
        assert!(text.contains("line cursor 9"));
        assert!(text.contains("row 1 cell 2"));
    }
}
