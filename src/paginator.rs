use crate::fragment::TableFragment;
use crate::types::Px;

// Mutable cursor state for the column the layout is currently filling.
// Fragments are appended here; cursor_y advances by exactly the height of
// each appended fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub fragments: Vec<TableFragment>,
    pub cursor_y: Px,
    pub content_bottom: Px,
    pub column_index: usize,
    pub margin_top: Option<Px>,
}

impl PageState {
    pub fn has_fragments(&self) -> bool {
        !self.fragments.is_empty()
    }
}

pub trait Paginator {
    // Idempotent: creates a page if none exists, or advances past one whose
    // cursor has reached the content bottom.
    fn ensure_page(&mut self) -> &mut PageState;
    fn advance_column(&mut self) -> &mut PageState;
    fn column_x(&self, column_index: usize) -> Px;
    fn column_width(&self) -> Px;
}

// Reference paginator: uniform pages of `columns_per_page` equal columns.
// Each column slot keeps its own cursor and fragment list; slots are created
// lazily in reading order.
#[derive(Debug, Clone)]
pub struct ColumnPager {
    content_height: Px,
    column_width: Px,
    column_gap: Px,
    columns_per_page: usize,
    margin_top: Option<Px>,
    slots: Vec<PageState>,
}

impl ColumnPager {
    pub fn new(content_height: Px, column_width: Px) -> Self {
        Self {
            content_height,
            column_width,
            column_gap: Px::ZERO,
            columns_per_page: 1,
            margin_top: None,
            slots: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns_per_page: usize, gap: Px) -> Self {
        self.columns_per_page = columns_per_page.max(1);
        self.column_gap = gap;
        self
    }

    pub fn with_margin_top(mut self, margin_top: Px) -> Self {
        self.margin_top = Some(margin_top);
        self
    }

    pub fn slots(&self) -> &[PageState] {
        &self.slots
    }

    pub fn fragments(&self) -> impl Iterator<Item = &TableFragment> {
        self.slots.iter().flat_map(|slot| slot.fragments.iter())
    }

    fn start_cursor(&self) -> Px {
        self.margin_top.unwrap_or(Px::ZERO)
    }

    fn push_slot(&mut self, column_index: usize) {
        let start = self.start_cursor();
        self.slots.push(PageState {
            fragments: Vec::new(),
            cursor_y: start,
            content_bottom: start + self.content_height,
            column_index,
            margin_top: self.margin_top,
        });
    }
}

impl Paginator for ColumnPager {
    fn ensure_page(&mut self) -> &mut PageState {
        if self.slots.is_empty() {
            self.push_slot(0);
        } else {
            let last = self.slots.len() - 1;
            if self.slots[last].cursor_y >= self.slots[last].content_bottom {
                return self.advance_column();
            }
        }
        let last = self.slots.len() - 1;
        &mut self.slots[last]
    }

    fn advance_column(&mut self) -> &mut PageState {
        let next_column = self
            .slots
            .last()
            .map(|slot| (slot.column_index + 1) % self.columns_per_page)
            .unwrap_or(0);
        self.push_slot(next_column);
        let last = self.slots.len() - 1;
        &mut self.slots[last]
    }

    fn column_x(&self, column_index: usize) -> Px {
        (self.column_width + self.column_gap) * (column_index as i32)
    }

    fn column_width(&self) -> Px {
        self.column_width
    }
}
