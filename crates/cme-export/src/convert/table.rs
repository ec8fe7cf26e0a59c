//! GFM tables with colspan/rowspan expansion.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::Converter;
use super::context::Context;
use super::elements::has_class;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());

/// HTML caps `colspan` at this value.
const MAX_COLSPAN: usize = 1000;

impl Converter<'_> {
    pub(super) fn convert_table(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        if has_class(el, "metadata-summary-macro") {
            return self.properties_report(el, ctx);
        }
        self.table(el, ctx)
    }

    /// Page properties report. The view only carries a placeholder; the
    /// export view holds the populated table with the same CQL.
    fn properties_report(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let Some(cql) = el.value().attr("data-cql").filter(|cql| !cql.is_empty()) else {
            return String::new();
        };

        let page = self.page;
        let export_view = Html::parse_fragment(&page.body_export);
        let report = export_view
            .select(&TABLE)
            .find(|table| table.value().attr("data-cql") == Some(cql));

        match report {
            Some(table) => self.table(table, ctx),
            None => String::new(),
        }
    }

    fn table(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let rows = table_rows(el);
        let mut grid = Grid::default();

        for (index, row) in rows.iter().enumerate() {
            let cells = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "th" | "td"));

            for cell in cells {
                let text = escape_cell(&self.convert_children(cell, ctx));
                let colspan = span(cell, "colspan").min(MAX_COLSPAN);
                let rowspan = span(cell, "rowspan").min(rows.len() - index);
                grid.place(index, text, colspan, rowspan);
            }
        }

        render_table(&grid.into_rows())
    }
}

/// Rows of a table, looking through row groups but not into nested tables.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|row| row.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn span(cell: ElementRef<'_>, attr: &str) -> usize {
    cell.value()
        .attr(attr)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

/// Cell grid; positions covered by a span hold empty strings.
#[derive(Default)]
struct Grid {
    rows: Vec<Vec<Option<String>>>,
}

impl Grid {
    fn place(&mut self, row: usize, text: String, colspan: usize, rowspan: usize) {
        if self.rows.len() < row + rowspan {
            self.rows.resize_with(row + rowspan, Vec::new);
        }

        let col = self.rows[row]
            .iter()
            .position(Option::is_none)
            .unwrap_or(self.rows[row].len());

        let mut text = Some(text);
        for r in row..row + rowspan {
            let cells = &mut self.rows[r];
            if cells.len() < col + colspan {
                cells.resize(col + colspan, None);
            }
            for cell in &mut cells[col..col + colspan] {
                *cell = Some(text.take().unwrap_or_default());
            }
        }
    }

    fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
            .into_iter()
            .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
            .collect()
    }
}

/// Make converted content fit on one table line.
pub(super) fn escape_cell(text: &str) -> String {
    text.trim().replace('\n', "<br/>").replace('|', r"\|")
}

/// Render rows as a GFM table; the first row is the header.
pub(super) fn render_table(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let line = |row: &[String]| {
        let cells: Vec<&str> = (0..width)
            .map(|i| row.get(i).map_or("", String::as_str))
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(line(&rows[0]));
    lines.push(format!("|{}", " --- |".repeat(width)));
    lines.extend(rows[1..].iter().map(|row| line(row)));

    format!("\n\n{}\n\n", lines.join("\n"))
}
