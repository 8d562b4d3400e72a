//! Table output for retrieved passages
//!
//! Uses comfy-table with automatic column sizing. Colors are dropped when
//! `NO_COLOR` is set or the terminal is dumb.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::RetrievedPassage;

const TEXT_PREVIEW_CHARS: usize = 80;

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format passages in rank order
    pub fn format_passages(&self, passages: &[RetrievedPassage]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Text").add_attribute(Attribute::Bold),
        ]);

        for (rank, passage) in passages.iter().enumerate() {
            let score = Cell::new(format!("{:.4}", passage.score)).set_alignment(CellAlignment::Right);
            let score = if self.use_colors {
                score.fg(score_color(passage.score))
            } else {
                score
            };

            table.add_row(vec![
                Cell::new(rank + 1),
                score,
                Cell::new(&passage.id),
                Cell::new(passage.source.as_deref().unwrap_or("-")),
                Cell::new(truncate(&passage.text.replace('\n', " "), TEXT_PREVIEW_CHARS)),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }

    !matches!(env::var("TERM"), Ok(term) if term == "dumb")
}

fn score_color(score: f32) -> Color {
    if score >= 0.75 {
        Color::Green
    } else if score >= 0.4 {
        Color::Yellow
    } else {
        Color::DarkGrey
    }
}
