use crate::types::Px;

// Output of the measurement pass, consumed read-only by pagination. Row and
// cell order mirrors the block tree; indices are the join key.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableMeasure {
    pub rows: Vec<RowMeasure>,
    pub column_widths: Vec<Px>,
    pub total_width: Px,
    pub total_height: Px,
}

impl TableMeasure {
    // Builds the summary fields from the parts; tests and simple callers use
    // this, a real measurement pass fills the struct directly.
    pub fn new(rows: Vec<RowMeasure>, column_widths: Vec<Px>) -> Self {
        let total_height = rows
            .iter()
            .fold(Px::ZERO, |acc, row| acc + row.height);
        let total_width = column_widths
            .iter()
            .fold(Px::ZERO, |acc, width| acc + *width);
        Self {
            rows,
            column_widths,
            total_width,
            total_height,
        }
    }

    pub fn row_height(&self, row_index: usize) -> Px {
        self.rows
            .get(row_index)
            .map(|row| row.height)
            .unwrap_or(Px::ZERO)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMeasure {
    pub height: Px,
    pub cells: Vec<CellMeasure>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellMeasure {
    pub blocks: Vec<BlockMeasure>,
}

impl CellMeasure {
    // Global line sequence for the cell: paragraph blocks flattened in order,
    // non-paragraph blocks contributing nothing.
    pub fn line_heights(&self) -> Vec<Px> {
        let mut heights = Vec::new();
        for block in &self.blocks {
            if let BlockMeasure::Paragraph(paragraph) = block {
                heights.extend(paragraph.lines.iter().map(|line| line.line_height));
            }
        }
        heights
    }

    pub fn line_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| match block {
                BlockMeasure::Paragraph(paragraph) => paragraph.lines.len(),
                BlockMeasure::Other => 0,
            })
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockMeasure {
    Paragraph(ParagraphMeasure),
    Other,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphMeasure {
    pub lines: Vec<LineMeasure>,
    pub total_height: Px,
}

impl ParagraphMeasure {
    pub fn from_line_heights(heights: &[Px]) -> Self {
        let total_height = heights.iter().fold(Px::ZERO, |acc, h| acc + *h);
        Self {
            lines: heights
                .iter()
                .map(|h| LineMeasure { line_height: *h })
                .collect(),
            total_height,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineMeasure {
    pub line_height: Px,
}
