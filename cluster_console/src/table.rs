/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The selection model: a table of rows keyed by [`ResourceId`] and a
//! [`Cursor`] over them.

use std::cmp::Ordering;

use crate::identity::ResourceId;

/// Navigation cursor over a bounded list.
///
/// Invariant: `pos < len` (or `pos == 0` when `len == 0`).
/// Movement methods return `true` when the position changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pos: usize,
    len: usize,
}

impl Cursor {
    /// Create a new cursor for a list of the given length.
    pub fn new(len: usize) -> Self {
        Self { pos: 0, len }
    }

    /// Move up (decrement). Returns true if position changed.
    pub fn move_up(&mut self) -> bool {
        if self.pos > 0 {
            self.pos -= 1;
            true
        } else {
            false
        }
    }

    /// Move down (increment). Returns true if position changed.
    pub fn move_down(&mut self) -> bool {
        if self.pos + 1 < self.len {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Jump to start. Returns true if position changed.
    pub fn home(&mut self) -> bool {
        if self.pos != 0 {
            self.pos = 0;
            true
        } else {
            false
        }
    }

    /// Jump to end. Returns true if position changed.
    pub fn end(&mut self) -> bool {
        let new_pos = self.len.saturating_sub(1);
        if self.pos != new_pos {
            self.pos = new_pos;
            true
        } else {
            false
        }
    }

    /// Page down by `amount`. Returns true if position changed.
    pub fn page_down(&mut self, amount: usize) -> bool {
        let new_pos = (self.pos + amount).min(self.len.saturating_sub(1));
        if self.pos != new_pos {
            self.pos = new_pos;
            true
        } else {
            false
        }
    }

    /// Page up by `amount`. Returns true if position changed.
    pub fn page_up(&mut self, amount: usize) -> bool {
        let new_pos = self.pos.saturating_sub(amount);
        if self.pos != new_pos {
            self.pos = new_pos;
            true
        } else {
            false
        }
    }

    /// Update length and clamp position to remain valid.
    pub fn update_len(&mut self, new_len: usize) {
        self.len = new_len;
        if new_len == 0 {
            self.pos = 0;
        } else {
            self.pos = self.pos.min(new_len - 1);
        }
    }

    /// Set position directly. Clamps to valid range.
    pub fn set_pos(&mut self, new_pos: usize) {
        if self.len == 0 {
            self.pos = 0;
        } else {
            self.pos = new_pos.min(self.len - 1);
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Identity of the resource backing this row.
    pub id: ResourceId,
    /// Cell text, one per header.
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SortState {
    column: usize,
    ascending: bool,
}

/// Rows of one resource kind plus the highlighted row.
///
/// `generation` counts refresh requests; a listing started for an
/// older generation must not overwrite a newer one.
#[derive(Debug, Clone)]
pub struct ResourceTable {
    headers: Vec<&'static str>,
    rows: Vec<Row>,
    cursor: Cursor,
    sort: Option<SortState>,
    generation: u64,
    error: Option<String>,
    scroll_offset: usize,
}

impl ResourceTable {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
            cursor: Cursor::new(0),
            sort: None,
            generation: 0,
            error: None,
            scroll_offset: 0,
        }
    }

    pub fn headers(&self) -> &[&'static str] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    /// Identity of the highlighted row, `None` when nothing is
    /// selected.
    pub fn selected_item(&self) -> Option<&ResourceId> {
        self.rows.get(self.cursor.pos()).map(|row| &row.id)
    }

    /// Highlight the row for `id`. Returns false if it is not listed.
    pub fn select(&mut self, id: &ResourceId) -> bool {
        match self.rows.iter().position(|row| &row.id == id) {
            Some(pos) => {
                self.cursor.set_pos(pos);
                true
            }
            None => false,
        }
    }

    /// Replace the rows, keeping the current sort and, when still
    /// present, the current selection.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        let prev = self.selected_item().cloned();
        self.rows = rows;
        self.error = None;
        self.apply_sort();
        self.cursor.update_len(self.rows.len());
        if let Some(prev) = prev {
            self.select(&prev);
        }
    }

    /// Sort by the named column. Sorting again by the same column
    /// flips the direction. Returns false for an unknown column.
    pub fn sort_by(&mut self, column: &str, ascending: bool) -> bool {
        let Some(idx) = self.headers.iter().position(|h| *h == column) else {
            return false;
        };
        self.sort = Some(match self.sort {
            Some(s) if s.column == idx => SortState {
                column: idx,
                ascending: !s.ascending,
            },
            _ => SortState {
                column: idx,
                ascending,
            },
        });
        let prev = self.selected_item().cloned();
        self.apply_sort();
        if let Some(prev) = prev {
            self.select(&prev);
        }
        true
    }

    /// Current sort column name and direction.
    pub fn sort_column(&self) -> Option<(&'static str, bool)> {
        self.sort
            .and_then(|s| self.headers.get(s.column).map(|h| (*h, s.ascending)))
    }

    fn apply_sort(&mut self) {
        let Some(SortState { column, ascending }) = self.sort else {
            return;
        };
        self.rows.sort_by(|a, b| {
            let ord = compare_cells(
                a.cells.get(column).map(String::as_str).unwrap_or_default(),
                b.cells.get(column).map(String::as_str).unwrap_or_default(),
            );
            if ascending { ord } else { ord.reverse() }
        });
    }

    /// Record a refresh request and return its generation.
    pub fn request_refresh(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Listing error shown in place of the rows' freshness.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: String) {
        self.error = Some(error);
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Adjust the scroll offset so the cursor stays inside a viewport
    /// of `height` rows.
    pub fn ensure_cursor_visible(&mut self, height: usize) {
        let pos = self.cursor.pos();
        if pos < self.scroll_offset {
            self.scroll_offset = pos;
        } else if height > 0 && pos >= self.scroll_offset + height {
            self.scroll_offset = pos.saturating_sub(height - 1);
        }
    }
}

// Numeric cells compare as numbers, everything else lexically.
fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, desired: &str) -> Row {
        Row {
            id: ResourceId::namespaced("default", name),
            cells: vec![name.to_string(), desired.to_string()],
        }
    }

    fn table() -> ResourceTable {
        let mut t = ResourceTable::new(vec!["NAME", "DESIRED"]);
        t.set_rows(vec![row("a", "10"), row("b", "2"), row("c", "7")]);
        t
    }

    // Cursor movements stay within bounds.
    #[test]
    fn cursor_maintains_invariant_after_operations() {
        let mut cursor = Cursor::new(5);
        assert!(!cursor.move_up());
        assert!(cursor.move_down());
        assert!(cursor.page_down(10));
        assert_eq!(cursor.pos(), 4);
        assert!(!cursor.move_down());
        assert!(cursor.page_up(2));
        assert_eq!(cursor.pos(), 2);
        cursor.update_len(2);
        assert_eq!(cursor.pos(), 1);
        cursor.set_pos(100);
        assert_eq!(cursor.pos(), 1);
        cursor.update_len(0);
        assert_eq!(cursor.pos(), 0);
        assert!(!cursor.end());
        assert!(!cursor.home());
    }

    // Empty table has no selection.
    #[test]
    fn empty_table_has_no_selection() {
        let t = ResourceTable::new(vec!["NAME"]);
        assert_eq!(t.selected_item(), None);
    }

    // Selection survives a reload when the row is still listed.
    #[test]
    fn set_rows_preserves_selection_by_identity() {
        let mut t = table();
        t.cursor_mut().set_pos(2);
        assert_eq!(t.selected_item().unwrap().name, "c");

        t.set_rows(vec![row("c", "7"), row("a", "10")]);
        assert_eq!(t.selected_item().unwrap().name, "c");
        assert_eq!(t.cursor().pos(), 0);
    }

    // Selection clamps when the selected row disappears.
    #[test]
    fn set_rows_clamps_when_selection_vanishes() {
        let mut t = table();
        t.cursor_mut().set_pos(2);
        t.set_rows(vec![row("a", "10")]);
        assert_eq!(t.selected_item().unwrap().name, "a");
    }

    // Sort is numeric-aware and toggles on repeat.
    #[test]
    fn sort_by_column_numeric_and_toggle() {
        let mut t = table();
        assert!(t.sort_by("DESIRED", true));
        let names: Vec<_> = t.rows().iter().map(|r| r.id.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "a"]);
        assert_eq!(t.sort_column(), Some(("DESIRED", true)));

        assert!(t.sort_by("DESIRED", true));
        let names: Vec<_> = t.rows().iter().map(|r| r.id.name.as_str()).collect();
        assert_eq!(names, ["a", "c", "b"]);
        assert_eq!(t.sort_column(), Some(("DESIRED", false)));

        assert!(!t.sort_by("AGE", true));
    }

    // Sorting keeps the highlighted resource highlighted.
    #[test]
    fn sort_keeps_selected_resource() {
        let mut t = table();
        t.cursor_mut().set_pos(0);
        t.sort_by("DESIRED", true);
        assert_eq!(t.selected_item().unwrap().name, "a");
        assert_eq!(t.cursor().pos(), 2);
    }

    // Refresh requests bump the generation.
    #[test]
    fn request_refresh_bumps_generation() {
        let mut t = table();
        assert_eq!(t.generation(), 0);
        assert_eq!(t.request_refresh(), 1);
        assert_eq!(t.request_refresh(), 2);
        assert_eq!(t.generation(), 2);
    }

    // Scroll offset follows the cursor.
    #[test]
    fn ensure_cursor_visible_scrolls() {
        let mut t = ResourceTable::new(vec!["NAME", "DESIRED"]);
        t.set_rows((0..20).map(|i| row(&format!("r{i:02}"), "1")).collect());
        t.cursor_mut().set_pos(12);
        t.ensure_cursor_visible(5);
        assert_eq!(t.scroll_offset(), 8);
        t.cursor_mut().set_pos(3);
        t.ensure_cursor_visible(5);
        assert_eq!(t.scroll_offset(), 3);
    }
}
