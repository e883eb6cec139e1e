use crate::block::{TableBlock, TableCell};
use crate::debug::{json_escape, DebugLogger};
use crate::error::GalleyError;
use crate::fragment::{CoordinateSystem, FragmentMetadata, PartialRowInfo, TableFragment};
use crate::geometry::{
    apply_table_indent, column_boundaries, count_header_rows, sum_row_heights, table_indent_width,
};
use crate::measure::TableMeasure;
use crate::paginator::Paginator;
use crate::types::Px;
use std::sync::Arc;

// A mid-row split is only attempted when at least this much vertical space
// remains; smaller leftovers break at the row boundary instead.
pub const MIN_PARTIAL_ROW_HEIGHT_PX: i32 = 20;

fn table_debug_enabled() -> bool {
    static ENABLED: std::sync::OnceLock<bool> = std::sync::OnceLock::new();
    *ENABLED.get_or_init(|| {
        std::env::var("GALLEY_TABLE_DEBUG")
            .ok()
            .map(|v| {
                let v = v.trim();
                v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
            })
            .unwrap_or(false)
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableLayoutMetrics {
    pub fragments: usize,
    pub column_advances: usize,
    pub forced_splits: usize,
    pub header_repeats: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitPoint {
    pub end_row: usize,
    pub partial_row: Option<PartialRowInfo>,
}

pub fn layout_table(
    block: &TableBlock,
    measure: &TableMeasure,
    ctx: &mut dyn Paginator,
) -> Result<(), GalleyError> {
    TableLayout::new(block, measure).run(ctx)
}

pub struct TableLayout<'a> {
    block: &'a TableBlock,
    measure: &'a TableMeasure,
    debug: Option<Arc<DebugLogger>>,
}

impl<'a> TableLayout<'a> {
    pub fn new(block: &'a TableBlock, measure: &'a TableMeasure) -> Self {
        Self {
            block,
            measure,
            debug: None,
        }
    }

    pub fn with_debug(mut self, logger: Arc<DebugLogger>) -> Self {
        self.debug = Some(logger);
        self
    }

    pub fn run(self, ctx: &mut dyn Paginator) -> Result<(), GalleyError> {
        self.run_with_metrics(ctx).map(|_| ())
    }

    pub fn run_with_metrics(
        self,
        ctx: &mut dyn Paginator,
    ) -> Result<TableLayoutMetrics, GalleyError> {
        let mut metrics = TableLayoutMetrics::default();
        let result = self.run_inner(ctx, &mut metrics);
        if let Some(logger) = self.debug.as_deref() {
            logger.emit_summary("layout_table");
            logger.flush();
        }
        result.map(|_| metrics)
    }

    fn run_inner(
        &self,
        ctx: &mut dyn Paginator,
        metrics: &mut TableLayoutMetrics,
    ) -> Result<(), GalleyError> {
        // Anchored tables are placed by the float manager, which calls
        // create_anchored_table_fragment once it knows the position.
        if self.block.is_anchored() {
            return Ok(());
        }
        if self.block.has_floating_properties() {
            self.layout_monolithic(ctx, metrics);
            return Ok(());
        }
        // A zero-row table cannot split; whatever measured height it carries
        // collapses to the clipped placeholder slot.
        if self.block.rows.is_empty() {
            self.layout_monolithic(ctx, metrics);
            return Ok(());
        }
        let page_content_height = {
            let state = ctx.ensure_page();
            state.content_bottom - state.margin_top.unwrap_or(Px::ZERO)
        };
        // A table that fits one page is never split, even if the current page
        // has less room; the start-of-table preflight may advance first.
        if self.measure.total_height <= page_content_height {
            self.layout_monolithic(ctx, metrics);
            return Ok(());
        }
        self.layout_split(ctx, metrics)
    }

    fn layout_monolithic(&self, ctx: &mut dyn Paginator, metrics: &mut TableLayoutMetrics) {
        if self.block.rows.is_empty() && self.measure.total_height <= Px::ZERO {
            return;
        }
        let must_advance = {
            let state = ctx.ensure_page();
            state.cursor_y + self.measure.total_height > state.content_bottom
                && state.has_fragments()
        };
        if must_advance {
            self.log_break("monolithic_no_fit", 0);
            ctx.advance_column();
            metrics.column_advances += 1;
        }
        let (cursor_y, content_bottom, column_index) = {
            let state = ctx.ensure_page();
            (state.cursor_y, state.content_bottom, state.column_index)
        };
        let height = self.measure.total_height.min(content_bottom - cursor_y);
        let (x, width) = self.fragment_frame(&*ctx, column_index);
        let fragment = TableFragment {
            block_id: self.block.id.clone(),
            from_row: 0,
            to_row: self.block.rows.len(),
            x,
            y: cursor_y,
            width,
            height,
            continues_from_prev: false,
            continues_on_next: false,
            repeat_header_count: 0,
            partial_row: None,
            metadata: self.metadata(),
        };
        self.emit(ctx, fragment, metrics);
    }

    fn layout_split(
        &self,
        ctx: &mut dyn Paginator,
        metrics: &mut TableLayoutMetrics,
    ) -> Result<(), GalleyError> {
        let row_count = self.block.rows.len();
        let header_count = count_header_rows(self.block);
        let header_height = sum_row_heights(self.measure, 0, header_count);

        self.preflight(ctx, metrics)?;

        let mut current_row = 0usize;
        let mut pending: Option<PartialRowInfo> = None;
        let mut is_continuation = false;

        while current_row < row_count || pending.is_some() {
            let (cursor_y, content_bottom, column_index, has_fragments) = {
                let state = ctx.ensure_page();
                (
                    state.cursor_y,
                    state.content_bottom,
                    state.column_index,
                    state.has_fragments(),
                )
            };
            let available_height = content_bottom - cursor_y;

            // Headers never repeat on the first fragment, and are suppressed
            // rather than overflowing when they no longer fit.
            let repeat_header_count = if current_row == 0 && pending.is_none() {
                0
            } else if header_count > 0 && header_height <= available_height {
                header_count
            } else {
                0
            };
            let repeated_height = if repeat_header_count > 0 {
                header_height
            } else {
                Px::ZERO
            };
            let available_for_body = available_height - repeated_height;

            if let Some(prev) = pending.clone() {
                let next = compute_partial_row(
                    self.block,
                    self.measure,
                    prev.row_index,
                    available_for_body,
                    Some(&prev.to_line_by_cell),
                )?;
                let has_more = next.has_more(self.measure);
                if next.made_progress() {
                    if next.partial_height > Px::ZERO {
                        let (x, width) = self.fragment_frame(&*ctx, column_index);
                        let fragment = TableFragment {
                            block_id: self.block.id.clone(),
                            from_row: prev.row_index,
                            to_row: prev.row_index + 1,
                            x,
                            y: cursor_y,
                            width,
                            height: next.partial_height + repeated_height,
                            continues_from_prev: true,
                            continues_on_next: has_more || prev.row_index + 1 < row_count,
                            repeat_header_count,
                            partial_row: Some(next.clone()),
                            metadata: self.metadata(),
                        };
                        self.emit(ctx, fragment, metrics);
                    }
                    if has_more {
                        pending = Some(next);
                    } else {
                        current_row = prev.row_index + 1;
                        pending = None;
                    }
                } else if has_fragments {
                    self.log_break("partial_no_fit", prev.row_index);
                    ctx.advance_column();
                    metrics.column_advances += 1;
                } else {
                    // Nothing fits even a fresh column: force one line per
                    // unexhausted cell, letting the slice overflow the column.
                    // Every line stays accounted for and progress is strict.
                    let forced = force_minimal_advance(
                        self.block,
                        self.measure,
                        prev.row_index,
                        Some(&prev.to_line_by_cell),
                    )?;
                    let has_more = forced.has_more(self.measure);
                    metrics.forced_splits += 1;
                    self.log_break("partial_stall", prev.row_index);
                    let (x, width) = self.fragment_frame(&*ctx, column_index);
                    let fragment = TableFragment {
                        block_id: self.block.id.clone(),
                        from_row: prev.row_index,
                        to_row: prev.row_index + 1,
                        x,
                        y: cursor_y,
                        width,
                        height: forced.partial_height + repeated_height,
                        continues_from_prev: true,
                        continues_on_next: has_more || prev.row_index + 1 < row_count,
                        repeat_header_count,
                        partial_row: Some(forced.clone()),
                        metadata: self.metadata(),
                    };
                    self.emit(ctx, fragment, metrics);
                    if has_more {
                        pending = Some(forced);
                    } else {
                        current_row = prev.row_index + 1;
                        pending = None;
                    }
                }
                continue;
            }

            let split = find_split_point(
                self.block,
                self.measure,
                current_row,
                available_for_body,
                content_bottom,
            )?;
            let mut end_row = split.end_row;
            let mut partial = split.partial_row;

            if end_row == current_row && partial.is_none() {
                if has_fragments {
                    self.log_break("no_fit", current_row);
                    ctx.advance_column();
                    metrics.column_advances += 1;
                    continue;
                }
                // Over-tall escape: on an empty page the row is cut mid-content
                // regardless of cant_split, otherwise the loop would spin.
                partial = Some(compute_partial_row(
                    self.block,
                    self.measure,
                    current_row,
                    available_for_body,
                    None,
                )?);
                end_row = current_row + 1;
                metrics.forced_splits += 1;
                self.log_break("forced_split", current_row);
            }

            let full_rows_end = match &partial {
                Some(p) => p.row_index,
                None => end_row,
            };
            let body_height = sum_row_heights(self.measure, current_row, full_rows_end)
                + partial
                    .as_ref()
                    .map_or(Px::ZERO, |p| p.partial_height);
            let continues_on_next = end_row < row_count
                || partial.as_ref().is_some_and(|p| !p.is_last_part);
            let (x, width) = self.fragment_frame(&*ctx, column_index);
            let fragment = TableFragment {
                block_id: self.block.id.clone(),
                from_row: current_row,
                to_row: end_row,
                x,
                y: cursor_y,
                width,
                height: body_height + repeated_height,
                continues_from_prev: is_continuation,
                continues_on_next,
                repeat_header_count,
                partial_row: partial.clone(),
                metadata: self.metadata(),
            };
            self.emit(ctx, fragment, metrics);

            match partial {
                Some(p) if !p.is_last_part => {
                    current_row = p.row_index;
                    pending = Some(p);
                }
                _ => {
                    current_row = end_row;
                    pending = None;
                }
            }
            is_continuation = true;
        }
        Ok(())
    }

    // Start-of-table decision on a page that already holds content: stay when
    // the first row (or a first slice of it) fits, advance otherwise.
    fn preflight(
        &self,
        ctx: &mut dyn Paginator,
        metrics: &mut TableLayoutMetrics,
    ) -> Result<(), GalleyError> {
        let (cursor_y, content_bottom, has_fragments) = {
            let state = ctx.ensure_page();
            (state.cursor_y, state.content_bottom, state.has_fragments())
        };
        if !has_fragments {
            return Ok(());
        }
        let available = content_bottom - cursor_y;
        let advance = if !self.measure.rows.is_empty() {
            if self.block.rows.first().is_some_and(|row| row.cant_split()) {
                self.measure.row_height(0) > available
            } else {
                let plan = compute_partial_row(self.block, self.measure, 0, available, None)?;
                !plan.made_progress() && plan.partial_height <= Px::ZERO
            }
        } else {
            self.measure.total_height > available
        };
        if advance {
            self.log_break("preflight", 0);
            ctx.advance_column();
            metrics.column_advances += 1;
        }
        Ok(())
    }

    fn fragment_frame(&self, ctx: &dyn Paginator, column_index: usize) -> (Px, Px) {
        let column_width = ctx.column_width();
        let base = if self.measure.total_width > Px::ZERO {
            column_width.min(self.measure.total_width)
        } else {
            column_width
        };
        let indent = table_indent_width(&self.block.attrs);
        apply_table_indent(ctx.column_x(column_index), base, indent)
    }

    fn metadata(&self) -> FragmentMetadata {
        FragmentMetadata {
            column_boundaries: column_boundaries(self.measure),
            coordinate_system: CoordinateSystem::Fragment,
        }
    }

    fn emit(
        &self,
        ctx: &mut dyn Paginator,
        fragment: TableFragment,
        metrics: &mut TableLayoutMetrics,
    ) {
        self.log_fragment(&fragment);
        if fragment.repeat_header_count > 0 {
            metrics.header_repeats += 1;
        }
        let height = fragment.height;
        let state = ctx.ensure_page();
        state.fragments.push(fragment);
        state.cursor_y += height;
        metrics.fragments += 1;
    }

    fn log_break(&self, reason: &str, row: usize) {
        if let Some(logger) = self.debug.as_deref() {
            logger.log_json(&format!(
                "{{\"type\":\"table.page_break\",\"block_id\":\"{}\",\"reason\":\"{}\",\"row\":{}}}",
                json_escape(&self.block.id),
                reason,
                row
            ));
            logger.increment("table.page_break", 1);
        }
        if table_debug_enabled() {
            eprintln!(
                "[table.debug.break] id={} reason={} row={}",
                self.block.id, reason, row
            );
        }
    }

    fn log_fragment(&self, fragment: &TableFragment) {
        if let Some(logger) = self.debug.as_deref() {
            logger.log_json(&format!(
                "{{\"type\":\"table.fragment\",\"block_id\":\"{}\",\"from_row\":{},\"to_row\":{},\"height\":{:.3},\"partial\":{},\"repeat_header_count\":{}}}",
                json_escape(&fragment.block_id),
                fragment.from_row,
                fragment.to_row,
                fragment.height.to_f64(),
                fragment.partial_row.is_some(),
                fragment.repeat_header_count
            ));
            logger.increment("table.fragment", 1);
        }
        if table_debug_enabled() {
            eprintln!(
                "[table.debug.fragment] id={} rows={}..{} height={:.3} partial={}",
                fragment.block_id,
                fragment.from_row,
                fragment.to_row,
                fragment.height.to_f64(),
                fragment.partial_row.is_some()
            );
        }
    }
}

pub fn find_split_point(
    block: &TableBlock,
    measure: &TableMeasure,
    start_row: usize,
    available_height: Px,
    full_page_height: Px,
) -> Result<SplitPoint, GalleyError> {
    let row_count = block.rows.len();
    let mut accumulated = Px::ZERO;
    let mut last_fit = start_row;
    for row_index in start_row..row_count {
        let row_height = measure.row_height(row_index);
        if accumulated + row_height <= available_height {
            accumulated += row_height;
            last_fit = row_index + 1;
            continue;
        }
        let remaining = available_height - accumulated;
        if row_height > full_page_height {
            // A row taller than a full page can never fit whole anywhere; cut
            // it mid-content even when the row is marked cant_split.
            let plan = compute_partial_row(block, measure, row_index, remaining, None)?;
            return Ok(SplitPoint {
                end_row: row_index + 1,
                partial_row: Some(plan),
            });
        }
        if block.rows[row_index].cant_split() {
            return Ok(SplitPoint {
                end_row: last_fit,
                partial_row: None,
            });
        }
        if remaining >= Px::from_i32(MIN_PARTIAL_ROW_HEIGHT_PX) {
            let plan = compute_partial_row(block, measure, row_index, remaining, None)?;
            if plan.made_progress() {
                return Ok(SplitPoint {
                    end_row: row_index + 1,
                    partial_row: Some(plan),
                });
            }
        }
        return Ok(SplitPoint {
            end_row: last_fit,
            partial_row: None,
        });
    }
    Ok(SplitPoint {
        end_row: row_count,
        partial_row: None,
    })
}

// Minimal escape plan: advance every cell that still has lines by exactly one
// line, ignoring the available height. The resulting slice may overflow its
// column; the cursor still advances by the emitted height.
fn force_minimal_advance(
    block: &TableBlock,
    measure: &TableMeasure,
    row_index: usize,
    from_line_by_cell: Option<&[usize]>,
) -> Result<PartialRowInfo, GalleyError> {
    let measure_row =
        measure
            .rows
            .get(row_index)
            .ok_or(GalleyError::RowIndexOutOfBounds {
                row_index,
                row_count: measure.rows.len(),
            })?;
    let block_cells: &[TableCell] = block
        .rows
        .get(row_index)
        .map(|row| row.cells.as_slice())
        .unwrap_or(&[]);

    let cell_count = measure_row.cells.len();
    let mut start_lines = Vec::with_capacity(cell_count);
    let mut cut_lines = Vec::with_capacity(cell_count);
    let mut partial_height = Px::ZERO;
    let mut max_padding = Px::ZERO;
    for (cell_index, cell) in measure_row.cells.iter().enumerate() {
        let line_heights = cell.line_heights();
        let line_count = line_heights.len();
        let pad_vertical = block_cells
            .get(cell_index)
            .map(|cell| cell.attrs.padding)
            .unwrap_or_default()
            .vertical();
        let start = from_line_by_cell
            .and_then(|from| from.get(cell_index).copied())
            .unwrap_or(0);
        if start > line_count {
            return Err(GalleyError::LineRangeOutOfBounds {
                row_index,
                cell_index,
                from_line: start,
                line_count,
            });
        }
        let cut = (start + 1).min(line_count);
        let height = line_heights[start..cut]
            .iter()
            .fold(Px::ZERO, |acc, h| acc + *h);
        partial_height = partial_height.max(height + pad_vertical);
        max_padding = max_padding.max(pad_vertical);
        start_lines.push(start);
        cut_lines.push(cut);
    }

    let is_first_part = start_lines.iter().all(|start| *start == 0);
    let made_progress = cut_lines
        .iter()
        .zip(&start_lines)
        .any(|(cut, start)| cut > start);
    let all_exhausted = cut_lines
        .iter()
        .zip(measure_row.cells.iter())
        .all(|(cut, cell)| *cut >= cell.line_count());
    let is_last_part = all_exhausted || !made_progress;

    if partial_height == Px::ZERO && is_first_part {
        partial_height = max_padding;
    }

    Ok(PartialRowInfo {
        row_index,
        from_line_by_cell: start_lines,
        to_line_by_cell: cut_lines,
        is_first_part,
        is_last_part,
        partial_height,
    })
}

pub fn compute_partial_row(
    block: &TableBlock,
    measure: &TableMeasure,
    row_index: usize,
    available_height: Px,
    from_line_by_cell: Option<&[usize]>,
) -> Result<PartialRowInfo, GalleyError> {
    let measure_row =
        measure
            .rows
            .get(row_index)
            .ok_or(GalleyError::RowIndexOutOfBounds {
                row_index,
                row_count: measure.rows.len(),
            })?;
    let block_cells: &[TableCell] = block
        .rows
        .get(row_index)
        .map(|row| row.cells.as_slice())
        .unwrap_or(&[]);

    let cell_count = measure_row.cells.len();
    let mut start_lines = Vec::with_capacity(cell_count);
    let mut cut_lines = Vec::with_capacity(cell_count);
    let mut cell_heights = Vec::with_capacity(cell_count);
    let mut line_counts = Vec::with_capacity(cell_count);
    let mut pad_verticals = Vec::with_capacity(cell_count);
    let mut lines_by_cell = Vec::with_capacity(cell_count);

    // Pass 1: greedy fit per cell, cutting on line boundaries.
    for (cell_index, cell) in measure_row.cells.iter().enumerate() {
        let line_heights = cell.line_heights();
        let line_count = line_heights.len();
        let padding = block_cells
            .get(cell_index)
            .map(|cell| cell.attrs.padding)
            .unwrap_or_default();
        let pad_vertical = padding.vertical();
        let start = from_line_by_cell
            .and_then(|from| from.get(cell_index).copied())
            .unwrap_or(0);
        if start > line_count {
            return Err(GalleyError::LineRangeOutOfBounds {
                row_index,
                cell_index,
                from_line: start,
                line_count,
            });
        }
        let available_for_lines = (available_height - pad_vertical).max(Px::ZERO);
        let mut cut = start;
        let mut used = Px::ZERO;
        while cut < line_count {
            let line_height = line_heights[cut];
            if used + line_height > available_for_lines {
                break;
            }
            used += line_height;
            cut += 1;
        }
        start_lines.push(start);
        cut_lines.push(cut);
        cell_heights.push(used);
        line_counts.push(line_count);
        pad_verticals.push(pad_vertical);
        lines_by_cell.push(line_heights);
    }

    // Pass 2: align by line advancement, not by height, so cells with
    // different line heights stay structurally synchronized across fragments.
    // When pass 1 already exhausted every cell the natural cutoffs stand and
    // the last slice keeps its natural heights.
    let all_complete = cut_lines
        .iter()
        .zip(&line_counts)
        .all(|(cut, count)| cut >= count);
    if !all_complete {
        let min_advance = cut_lines
            .iter()
            .zip(&start_lines)
            .map(|(cut, start)| cut - start)
            .filter(|advance| *advance > 0)
            .min()
            .unwrap_or(0);
        for cell_index in 0..cell_count {
            let new_cut =
                (start_lines[cell_index] + min_advance).min(line_counts[cell_index]);
            if new_cut != cut_lines[cell_index] {
                cut_lines[cell_index] = new_cut;
                cell_heights[cell_index] = lines_by_cell[cell_index]
                    [start_lines[cell_index]..new_cut]
                    .iter()
                    .fold(Px::ZERO, |acc, h| acc + *h);
            }
        }
    }

    // Cells share the row height, so the slice is as tall as its tallest cell.
    let mut partial_height = Px::ZERO;
    for cell_index in 0..cell_count {
        partial_height = partial_height.max(cell_heights[cell_index] + pad_verticals[cell_index]);
    }

    let is_first_part = start_lines.iter().all(|start| *start == 0);
    let made_progress = cut_lines
        .iter()
        .zip(&start_lines)
        .any(|(cut, start)| cut > start);
    let all_exhausted = cut_lines
        .iter()
        .zip(&line_counts)
        .all(|(cut, count)| cut >= count);
    let is_last_part = all_exhausted || !made_progress;

    if partial_height == Px::ZERO && is_first_part {
        // An empty first slice still occupies its padding space.
        partial_height = pad_verticals
            .iter()
            .fold(Px::ZERO, |acc, pad| acc.max(*pad));
    }

    Ok(PartialRowInfo {
        row_index,
        from_line_by_cell: start_lines,
        to_line_by_cell: cut_lines,
        is_first_part,
        is_last_part,
        partial_height,
    })
}
