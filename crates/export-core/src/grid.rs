//! Maps absolutely positioned elements onto a table grid.
//!
//! Office formats have no free positioning, so every distinct element edge
//! becomes a grid line and each element covers a rectangle of cells.

use folio_types::PrintElement;

// Geometry is compared in hundredths of a point.
fn quantize(value: f32) -> i64 {
    (value * 100.0).round() as i64
}

/// One element placed on the grid.
#[derive(Debug, Clone, Copy)]
pub struct GridCell<'a> {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub element: &'a PrintElement,
}

#[derive(Debug, Clone)]
pub struct Grid<'a> {
    columns: Vec<i64>,
    rows: Vec<i64>,
    cells: Vec<GridCell<'a>>,
}

impl<'a> Grid<'a> {
    /// Builds the grid for one page. With `collapse_row_span`, elements keep
    /// a single row each and rows in which no element starts are dropped.
    ///
    /// Elements whose top-left cell is already covered by an earlier element
    /// are left out.
    pub fn build(elements: &'a [PrintElement], collapse_row_span: bool) -> Self {
        let mut columns: Vec<i64> = elements
            .iter()
            .flat_map(|e| [quantize(e.frame.x), quantize(e.frame.right())])
            .collect();
        columns.sort_unstable();
        columns.dedup();

        let mut rows: Vec<i64> = if collapse_row_span {
            elements.iter().map(|e| quantize(e.frame.y)).collect()
        } else {
            elements
                .iter()
                .flat_map(|e| [quantize(e.frame.y), quantize(e.frame.bottom())])
                .collect()
        };
        if collapse_row_span && let Some(bottom) = elements.iter().map(|e| quantize(e.frame.bottom())).max() {
            rows.push(bottom);
        }
        rows.sort_unstable();
        rows.dedup();

        let index = |lines: &[i64], value: i64| lines.partition_point(|l| *l < value);

        let mut placed: Vec<GridCell<'a>> = elements
            .iter()
            .map(|element| {
                let col = index(&columns, quantize(element.frame.x));
                let col_end = index(&columns, quantize(element.frame.right()));
                let row = index(&rows, quantize(element.frame.y));
                let row_span = if collapse_row_span {
                    1
                } else {
                    index(&rows, quantize(element.frame.bottom())) - row
                };
                GridCell {
                    row,
                    col,
                    row_span: row_span.max(1),
                    col_span: (col_end - col).max(1),
                    element,
                }
            })
            .collect();
        placed.sort_by_key(|c| (c.row, c.col));

        let mut cells: Vec<GridCell<'a>> = Vec::with_capacity(placed.len());
        for cell in placed {
            let covered = cells.iter().any(|c| {
                cell.row >= c.row
                    && cell.row < c.row + c.row_span
                    && cell.col >= c.col
                    && cell.col < c.col + c.col_span
            });
            if covered {
                log::debug!("Dropping overlapping element at row {} col {}", cell.row, cell.col);
            } else {
                cells.push(cell);
            }
        }

        Self { columns, rows, cells }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len().saturating_sub(1)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Widths of the grid columns in points.
    pub fn column_widths(&self) -> Vec<f32> {
        self.columns.windows(2).map(|w| (w[1] - w[0]) as f32 / 100.0).collect()
    }

    /// Heights of the grid rows in points.
    pub fn row_heights(&self) -> Vec<f32> {
        self.rows.windows(2).map(|w| (w[1] - w[0]) as f32 / 100.0).collect()
    }

    /// Placed cells, ordered by row then column.
    pub fn cells(&self) -> &[GridCell<'a>] {
        &self.cells
    }

    pub fn cells_in_row(&self, row: usize) -> impl Iterator<Item = &GridCell<'a>> {
        self.cells.iter().filter(move |c| c.row == row)
    }

    /// The cell that starts at (`row`, `col`).
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&GridCell<'a>> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    /// The cell whose span covers (`row`, `col`), including its origin.
    pub fn covering(&self, row: usize, col: usize) -> Option<&GridCell<'a>> {
        self.cells.iter().find(|c| {
            row >= c.row && row < c.row + c.row_span && col >= c.col && col < c.col + c.col_span
        })
    }

    /// Whether (`row`, `col`) lies inside a cell's span without being its origin.
    pub fn is_spanned(&self, row: usize, col: usize) -> bool {
        self.covering(row, col)
            .is_some_and(|c| (row, col) != (c.row, c.col))
    }
}

/// Formats a length in points with at most two decimals.
pub fn format_points(value: f32) -> String {
    let hundredths = quantize(value);
    if hundredths % 100 == 0 {
        format!("{}", hundredths / 100)
    } else {
        let text = format!("{:.2}", hundredths as f64 / 100.0);
        text.trim_end_matches('0').to_string()
    }
}
