//! Cell-level frame differencing and connected-component merging.

use rayon::prelude::*;

use crate::frame::PixelBuffer;

/// Active/inactive flags for a `cols × rows` grid, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityGrid {
    cols: usize,
    rows: usize,
    active: Vec<bool>,
}

/// Grid-space extent and size of one 4-connected group of active cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blob {
    pub min_col: usize,
    pub min_row: usize,
    pub max_col: usize,
    pub max_row: usize,
    pub cells: usize,
}

impl ActivityGrid {
    /// Grid with exactly the listed `(col, row)` cells active.
    /// Out-of-range cells are ignored.
    pub fn from_cells<I>(cols: usize, rows: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut active = vec![false; cols * rows];
        for (col, row) in cells {
            if col < cols && row < rows {
                active[row * cols + col] = true;
            }
        }
        Self { cols, rows, active }
    }

    /// Compare two frames over their common area.
    ///
    /// Each `cell × cell` block is sampled every `sample_step` pixels; the
    /// per-sample difference is the summed absolute channel delta. A cell is
    /// active when the mean difference exceeds `threshold`. Partial cells at the
    /// right and bottom edges are dropped.
    pub fn diff(
        prev: &PixelBuffer,
        curr: &PixelBuffer,
        cell: u32,
        sample_step: u32,
        threshold: f64,
    ) -> Self {
        let cell = cell.max(1);
        let step = sample_step.max(1) as usize;
        let width = prev.width().min(curr.width());
        let height = prev.height().min(curr.height());
        let cols = (width / cell) as usize;
        let rows = (height / cell) as usize;

        // Cells are independent; rows are evaluated in parallel and collected in order.
        let active: Vec<bool> = (0..rows)
            .into_par_iter()
            .map(|row| {
                (0..cols)
                    .map(|col| {
                        let (x0, y0) = (col as u32 * cell, row as u32 * cell);
                        mean_cell_delta(prev, curr, x0, y0, cell, step) > threshold
                    })
                    .collect::<Vec<bool>>()
            })
            .collect::<Vec<Vec<bool>>>()
            .into_iter()
            .flatten()
            .collect();

        Self { cols, rows, active }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_active(&self, col: usize, row: usize) -> bool {
        col < self.cols && row < self.rows && self.active[row * self.cols + col]
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    /// Merge 4-connected active cells.
    ///
    /// Seeds are taken in row-major order, so blobs come out ordered by their
    /// first (top-most, then left-most) cell.
    pub fn blobs(&self) -> Vec<Blob> {
        let mut visited = vec![false; self.active.len()];
        let mut blobs = Vec::new();
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for row in 0..self.rows {
            for col in 0..self.cols {
                let idx = row * self.cols + col;
                if !self.active[idx] || visited[idx] {
                    continue;
                }

                visited[idx] = true;
                stack.push((col, row));
                let mut blob = Blob {
                    min_col: col,
                    min_row: row,
                    max_col: col,
                    max_row: row,
                    cells: 0,
                };

                while let Some((cx, cy)) = stack.pop() {
                    blob.cells += 1;
                    blob.min_col = blob.min_col.min(cx);
                    blob.max_col = blob.max_col.max(cx);
                    blob.min_row = blob.min_row.min(cy);
                    blob.max_row = blob.max_row.max(cy);

                    for (nx, ny) in self.neighbors(cx, cy) {
                        let n_idx = ny * self.cols + nx;
                        if self.active[n_idx] && !visited[n_idx] {
                            visited[n_idx] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
                blobs.push(blob);
            }
        }
        blobs
    }

    fn neighbors(&self, col: usize, row: usize) -> impl Iterator<Item = (usize, usize)> {
        let (cols, rows) = (self.cols, self.rows);
        [(1i64, 0i64), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .filter_map(move |(dx, dy)| {
                let nx = col as i64 + dx;
                let ny = row as i64 + dy;
                if nx >= 0 && ny >= 0 && (nx as usize) < cols && (ny as usize) < rows {
                    Some((nx as usize, ny as usize))
                } else {
                    None
                }
            })
    }
}

fn mean_cell_delta(
    prev: &PixelBuffer,
    curr: &PixelBuffer,
    x0: u32,
    y0: u32,
    cell: u32,
    step: usize,
) -> f64 {
    let mut sum = 0u64;
    let mut count = 0u64;
    for y in (y0..y0 + cell).step_by(step) {
        for x in (x0..x0 + cell).step_by(step) {
            let a = prev.pixel_at(x, y);
            let b = curr.pixel_at(x, y);
            sum += a
                .iter()
                .zip(b.iter())
                .map(|(&p, &c)| (p as i32 - c as i32).unsigned_abs() as u64)
                .sum::<u64>();
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
