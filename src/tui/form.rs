//! Form cursor and cell editing.
//!
//! Kept free of any terminal types so the editing rules can be unit tested.
//! The grid is `rows` observation lines plus one unknown-sample line at the
//! bottom; the unknown line has no water column.

use crate::domain::{ExperimentConfig, SheetInput};

pub const COL_WATER: usize = 0;
pub const COL_DIS: usize = 1;
pub const COL_APP: usize = 2;
const COLS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub row: usize,
    pub col: usize,
    /// Text being typed into the current cell.
    pub editing: Option<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            row: 0,
            col: COL_DIS,
            editing: None,
        }
    }

    /// Index of the unknown-sample line.
    pub fn unknown_row(sheet: &SheetInput) -> usize {
        sheet.observations.len()
    }

    pub fn on_unknown(&self, sheet: &SheetInput) -> bool {
        self.row == Self::unknown_row(sheet)
    }

    pub fn up(&mut self, sheet: &SheetInput) {
        self.row = self.row.saturating_sub(1);
        self.fix_col(sheet);
    }

    pub fn down(&mut self, sheet: &SheetInput) {
        self.row = (self.row + 1).min(Self::unknown_row(sheet));
        self.fix_col(sheet);
    }

    pub fn left(&mut self, sheet: &SheetInput) {
        let min = self.min_col(sheet);
        if self.col > min {
            self.col -= 1;
        }
    }

    pub fn right(&mut self) {
        if self.col + 1 < COLS {
            self.col += 1;
        }
    }

    /// Tab order: left to right, then wrap to the next line.
    pub fn next(&mut self, sheet: &SheetInput) {
        if self.col + 1 < COLS {
            self.col += 1;
        } else if self.row < Self::unknown_row(sheet) {
            self.row += 1;
            self.col = self.min_col(sheet);
        }
    }

    pub fn prev(&mut self, sheet: &SheetInput) {
        if self.col > self.min_col(sheet) {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = COL_APP;
        }
    }

    fn min_col(&self, sheet: &SheetInput) -> usize {
        if self.on_unknown(sheet) { COL_DIS } else { COL_WATER }
    }

    fn fix_col(&mut self, sheet: &SheetInput) {
        self.col = self.col.max(self.min_col(sheet));
    }

    /// Current value of the selected cell.
    pub fn value(&self, sheet: &SheetInput) -> Option<f64> {
        cell_value(sheet, self.row, self.col)
    }

    /// Start editing, pre-filled with the current value.
    pub fn begin_edit(&mut self, sheet: &SheetInput) {
        let text = self.value(sheet).map(format_value).unwrap_or_default();
        self.editing = Some(text);
    }

    /// Start editing with an empty buffer (typing over the cell).
    pub fn begin_overwrite(&mut self) {
        self.editing = Some(String::new());
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(buf) = self.editing.as_mut() {
            if c.is_ascii_digit() || c == '.' || (c == '-' && buf.is_empty()) {
                buf.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(buf) = self.editing.as_mut() {
            buf.pop();
        }
    }

    pub fn cancel(&mut self) {
        self.editing = None;
    }

    /// Apply the edit buffer to the sheet.
    ///
    /// Blank input clears a temperature (or restores the default water volume).
    /// On a parse error the buffer is kept so the user can fix it.
    pub fn commit(&mut self, sheet: &mut SheetInput, config: &ExperimentConfig) -> Result<(), String> {
        let Some(buf) = self.editing.as_ref() else {
            return Ok(());
        };
        let trimmed = buf.trim();
        let value = if trimmed.is_empty() {
            None
        } else {
            Some(
                trimmed
                    .parse::<f64>()
                    .map_err(|_| format!("'{trimmed}' is not a number"))?,
            )
        };
        set_cell(sheet, self.row, self.col, value, config);
        self.editing = None;
        Ok(())
    }

    pub fn clear(&mut self, sheet: &mut SheetInput, config: &ExperimentConfig) {
        self.editing = None;
        set_cell(sheet, self.row, self.col, None, config);
    }
}

/// Value of a cell; `row == observations.len()` addresses the unknown sample.
pub fn cell_value(sheet: &SheetInput, row: usize, col: usize) -> Option<f64> {
    if row == sheet.observations.len() {
        return match col {
            COL_DIS => sheet.unknown.disappearance_temp,
            COL_APP => sheet.unknown.appearance_temp,
            _ => None,
        };
    }
    let obs = sheet.observations.get(row)?;
    match col {
        COL_WATER => Some(obs.water_volume_ml),
        COL_DIS => obs.disappearance_temp,
        COL_APP => obs.appearance_temp,
        _ => None,
    }
}

pub fn set_cell(sheet: &mut SheetInput, row: usize, col: usize, value: Option<f64>, config: &ExperimentConfig) {
    if row == sheet.observations.len() {
        match col {
            COL_DIS => sheet.unknown.disappearance_temp = value,
            COL_APP => sheet.unknown.appearance_temp = value,
            _ => {}
        }
        return;
    }
    let Some(obs) = sheet.observations.get_mut(row) else {
        return;
    };
    match col {
        COL_WATER => obs.water_volume_ml = value.unwrap_or_else(|| config.default_water_volume(row)),
        COL_DIS => obs.disappearance_temp = value,
        COL_APP => obs.appearance_temp = value,
        _ => {}
    }
}

/// Cell text: integers without decimals, otherwise as typed.
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e9 {
        format!("{v:.0}")
    } else {
        v.to_string()
    }
}
