use std::fmt;
use crate::forecast::ForecastGrid;
use crate::slots::TimeSlot;

/// Width of the first column holding metric names
const LABEL_WIDTH: usize = 12;

/// Minimum width of a slot column
const MIN_CELL_WIDTH: usize = 10;

/// A run of consecutive slots on the same day, rendered as one day header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayGroup {
    pub label: String,
    pub span: usize,
}

/// Groups consecutive slots sharing a day label
///
/// # Arguments
///
/// * 'slots' - slots in slot order
pub fn day_groups(slots: &[TimeSlot]) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();

    for slot in slots {
        match groups.last_mut() {
            Some(g) if g.label == slot.day_label => g.span += 1,
            _ => groups.push(DayGroup { label: slot.day_label.clone(), span: 1 }),
        }
    }

    groups
}

/// Returns the width of every slot column, wide enough for the time label and all values
///
/// # Arguments
///
/// * 'grid' - the grid to lay out
pub fn column_widths(grid: &ForecastGrid) -> Vec<usize> {
    grid.slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            grid.metrics
                .values()
                .filter_map(|values| values.get(i))
                .map(|v| display_width(&v.display))
                .chain(std::iter::once(display_width(&slot.time_label)))
                .max()
                .unwrap_or(0)
                .max(MIN_CELL_WIDTH)
        })
        .collect()
}

/// A grid rendered as a plain text table: a day header row, a time row and one row per metric
pub struct Table<'a> {
    pub name: &'a str,
    pub grid: &'a ForecastGrid,
}

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let caption = format!("{} ({}) ", self.name, self.grid.units);
        writeln!(f, "{:=<80}", caption)?;

        if self.grid.is_empty() {
            return writeln!(f, "no forecast data available");
        }

        let widths = column_widths(self.grid);

        write!(f, "{:<LABEL_WIDTH$}", "")?;
        let mut col = 0;
        for group in day_groups(&self.grid.slots) {
            let width = widths[col..col + group.span].iter().map(|w| w + 1).sum::<usize>() - 1;
            write!(f, "|{}", pad(&group.label, width))?;
            col += group.span;
        }
        writeln!(f)?;

        write!(f, "{:<LABEL_WIDTH$}", "")?;
        for (slot, width) in self.grid.slots.iter().zip(&widths) {
            write!(f, "|{}", pad(&slot.time_label, *width))?;
        }
        writeln!(f)?;

        for (id, values) in &self.grid.metrics {
            write!(f, "{:<LABEL_WIDTH$}", id.to_string())?;
            for (value, width) in values.iter().zip(&widths) {
                write!(f, "|{}", pad(&value.display, *width))?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Renders a grid as a plain text table
///
/// # Arguments
///
/// * 'name' - name of the location, used as caption
/// * 'grid' - the grid to render
pub fn render_table(name: &str, grid: &ForecastGrid) -> String {
    Table { name, grid }.to_string()
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(fill))
}
