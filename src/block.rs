use crate::types::Px;

// Input document tree for one table block. The tree is immutable during
// layout; all geometry comes from the companion measure tree.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableBlock {
    pub id: String,
    pub rows: Vec<TableRow>,
    pub attrs: TableAttrs,
}

impl TableBlock {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rows: Vec::new(),
            attrs: TableAttrs::default(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<TableRow>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_attrs(mut self, attrs: TableAttrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn is_anchored(&self) -> bool {
        self.attrs
            .anchor
            .as_ref()
            .is_some_and(|anchor| anchor.is_anchored)
    }

    pub fn has_floating_properties(&self) -> bool {
        self.attrs
            .floating
            .as_ref()
            .is_some_and(|props| !props.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableAttrs {
    pub table_indent: Option<TableIndent>,
    pub floating: Option<FloatingTableProps>,
    pub anchor: Option<AnchorAttrs>,
}

// Raw attribute value; sanitized through geometry::table_indent_width, which
// maps non-finite widths to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableIndent {
    pub width: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatingTableProps {
    pub horizontal_anchor: Option<String>,
    pub vertical_anchor: Option<String>,
    pub table_x: Option<f64>,
    pub table_y: Option<f64>,
}

impl FloatingTableProps {
    // An attribute bag with nothing set does not make the table float.
    pub fn is_empty(&self) -> bool {
        self.horizontal_anchor.is_none()
            && self.vertical_anchor.is_none()
            && self.table_x.is_none()
            && self.table_y.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnchorAttrs {
    pub is_anchored: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    pub attrs: RowAttrs,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            attrs: RowAttrs::default(),
        }
    }

    pub fn with_repeat_header(mut self, repeat: bool) -> Self {
        self.attrs
            .row_properties
            .get_or_insert_with(TableRowProperties::default)
            .repeat_header = repeat;
        self
    }

    pub fn with_cant_split(mut self, cant_split: bool) -> Self {
        self.attrs
            .row_properties
            .get_or_insert_with(TableRowProperties::default)
            .cant_split = cant_split;
        self
    }

    pub fn repeat_header(&self) -> bool {
        self.attrs
            .row_properties
            .as_ref()
            .is_some_and(|props| props.repeat_header)
    }

    pub fn cant_split(&self) -> bool {
        self.attrs
            .row_properties
            .as_ref()
            .is_some_and(|props| props.cant_split)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowAttrs {
    pub row_properties: Option<TableRowProperties>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TableRowProperties {
    pub repeat_header: bool,
    pub cant_split: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub blocks: Vec<CellBlock>,
    pub attrs: CellAttrs,
}

impl TableCell {
    pub fn new(blocks: Vec<CellBlock>) -> Self {
        Self {
            blocks,
            attrs: CellAttrs::default(),
        }
    }

    // Legacy single-paragraph cell shape; normalized here so the layout core
    // only ever sees a block sequence.
    pub fn from_paragraph(paragraph: ParagraphContent) -> Self {
        Self::new(vec![CellBlock::Paragraph(paragraph)])
    }

    pub fn with_padding(mut self, padding: CellPadding) -> Self {
        self.attrs.padding = padding;
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.attrs.background = Some(background.into());
        self
    }

    pub fn with_vertical_align(mut self, align: VerticalAlign) -> Self {
        self.attrs.vertical_align = align;
        self
    }
}

// Cell content is a polymorphic block sequence. Pagination only distinguishes
// paragraph blocks (they contribute lines) from everything else; the payloads
// are carried for the measurement pass and the painter.
#[derive(Debug, Clone, PartialEq)]
pub enum CellBlock {
    Paragraph(ParagraphContent),
    Other(OtherBlock),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphContent {
    pub text: String,
}

impl ParagraphContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OtherBlock {
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellAttrs {
    pub padding: CellPadding,
    pub background: Option<String>,
    pub vertical_align: VerticalAlign,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPadding {
    pub top: Px,
    pub left: Px,
    pub right: Px,
    pub bottom: Px,
}

impl CellPadding {
    pub fn uniform(value: Px) -> Self {
        Self {
            top: value,
            left: value,
            right: value,
            bottom: value,
        }
    }

    pub fn vertical(&self) -> Px {
        self.top + self.bottom
    }
}

impl Default for CellPadding {
    fn default() -> Self {
        Self {
            top: Px::from_i32(2),
            left: Px::from_i32(4),
            right: Px::from_i32(4),
            bottom: Px::from_i32(2),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_padding_is_two_four_four_two() {
        let padding = CellPadding::default();
        assert_eq!(padding.top, Px::from_i32(2));
        assert_eq!(padding.left, Px::from_i32(4));
        assert_eq!(padding.right, Px::from_i32(4));
        assert_eq!(padding.bottom, Px::from_i32(2));
        assert_eq!(padding.vertical(), Px::from_i32(4));
    }

    #[test]
    fn single_paragraph_cell_normalizes_to_one_block() {
        let cell = TableCell::from_paragraph(ParagraphContent::new("legacy"));
        assert_eq!(cell.blocks.len(), 1);
        assert!(matches!(cell.blocks[0], CellBlock::Paragraph(_)));
    }

    #[test]
    fn row_properties_default_to_plain_body_rows() {
        let row = TableRow::new(Vec::new());
        assert!(!row.repeat_header());
        assert!(!row.cant_split());
        let row = row.with_repeat_header(true).with_cant_split(true);
        assert!(row.repeat_header());
        assert!(row.cant_split());
    }

    #[test]
    fn empty_floating_bag_does_not_float() {
        let block = TableBlock::new("t1").with_attrs(TableAttrs {
            floating: Some(FloatingTableProps::default()),
            ..TableAttrs::default()
        });
        assert!(!block.has_floating_properties());

        let block = TableBlock::new("t2").with_attrs(TableAttrs {
            floating: Some(FloatingTableProps {
                horizontal_anchor: Some("margin".to_string()),
                ..FloatingTableProps::default()
            }),
            ..TableAttrs::default()
        });
        assert!(block.has_floating_properties());
    }

    #[test]
    fn anchored_flag_requires_explicit_true() {
        let block = TableBlock::new("t").with_attrs(TableAttrs {
            anchor: Some(AnchorAttrs { is_anchored: false }),
            ..TableAttrs::default()
        });
        assert!(!block.is_anchored());
    }
}
