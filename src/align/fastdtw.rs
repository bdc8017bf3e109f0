//! Coarse-to-fine dynamic time warping (FastDTW).
//!
//! Both sequences are halved recursively until they are short enough for
//! exact DTW. The coarse path is then projected onto the next resolution,
//! widened by `radius` cells, and exact DTW runs only inside that band. Time
//! and memory grow linearly with the sequence length instead of with the
//! product of the two lengths.

use super::AlignmentPath;

#[derive(Clone, Copy, PartialEq)]
enum Step {
    Start,
    Diagonal,
    Up,
    Left,
    Unreachable,
}

/// Inclusive column range searched for each row of the cost matrix.
#[derive(Debug, Clone)]
struct Window {
    rows: Vec<(usize, usize)>,
}

impl Window {
    fn full(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![(0, cols - 1); rows],
        }
    }

    /// Project a coarse path onto a grid twice its size, widened by `radius`.
    fn expand(coarse: &AlignmentPath, rows: usize, cols: usize, radius: usize) -> Self {
        let mut bounds: Vec<Option<(usize, usize)>> = vec![None; rows];
        let r = radius as isize;

        for &(i, j) in coarse {
            let col_lo = 2 * (j as isize - r).max(0) as usize;
            let col_hi = (2 * (j + radius) + 1).min(cols - 1);
            if col_lo > col_hi {
                continue;
            }
            for di in -r..=r {
                let ci = i as isize + di;
                if ci < 0 {
                    continue;
                }
                for row in [2 * ci as usize, 2 * ci as usize + 1] {
                    if row >= rows {
                        continue;
                    }
                    let b = bounds[row].get_or_insert((col_lo, col_hi));
                    b.0 = b.0.min(col_lo);
                    b.1 = b.1.max(col_hi);
                }
            }
        }

        // Keep every row connected to the one above it, so a monotonic path
        // from (0, 0) to the far corner always exists inside the band.
        let mut out: Vec<(usize, usize)> = Vec::with_capacity(rows);
        for (i, b) in bounds.into_iter().enumerate() {
            let (lo, hi) = match (i, out.last()) {
                (0, _) | (_, None) => {
                    let (_, hi) = b.unwrap_or((0, 0));
                    (0, hi)
                }
                (_, Some(&(prev_lo, prev_hi))) => {
                    let (lo, hi) = b.unwrap_or((prev_hi, prev_hi));
                    let lo = lo.clamp(prev_lo, (prev_hi + 1).min(cols - 1));
                    (lo, hi.max(lo).max(prev_hi).min(cols - 1))
                }
            };
            out.push((lo, hi));
        }
        if let Some(last) = out.last_mut() {
            last.1 = cols - 1;
        }

        Self { rows: out }
    }

    fn contains(&self, i: usize, j: usize) -> bool {
        self.rows
            .get(i)
            .is_some_and(|&(lo, hi)| j >= lo && j <= hi)
    }
}

/// Align `x` and `y` with FastDTW. Returns (distance, path).
///
/// Both slices must be non-empty. The distance is the sum of `dist` over the
/// returned path.
pub fn fastdtw<F>(x: &[f32], y: &[f32], radius: usize, dist: &F) -> (f32, AlignmentPath)
where
    F: Fn(f32, f32) -> f32,
{
    let min_size = radius + 2;
    if x.len() < min_size || y.len() < min_size {
        return dtw(x, y, &Window::full(x.len(), y.len()), dist);
    }

    let (_, coarse) = fastdtw(&reduce_by_half(x), &reduce_by_half(y), radius, dist);
    let window = Window::expand(&coarse, x.len(), y.len(), radius);
    dtw(x, y, &window, dist)
}

/// Average neighbouring pairs. An odd trailing element is dropped.
fn reduce_by_half(values: &[f32]) -> Vec<f32> {
    values
        .chunks_exact(2)
        .map(|pair| (pair[0] + pair[1]) / 2.0)
        .collect()
}

/// Exact DTW restricted to `window`.
///
/// On cost ties the diagonal step wins, so identical sequences align
/// frame-for-frame.
fn dtw<F>(x: &[f32], y: &[f32], window: &Window, dist: &F) -> (f32, AlignmentPath)
where
    F: Fn(f32, f32) -> f32,
{
    let n = x.len();
    let mut cost: Vec<Vec<f32>> = Vec::with_capacity(n);
    let mut steps: Vec<Vec<Step>> = Vec::with_capacity(n);

    let lookup = |cost: &[Vec<f32>], i: usize, j: usize| -> f32 {
        if !window.contains(i, j) {
            return f32::INFINITY;
        }
        cost.get(i)
            .map(|row| row[j - window.rows[i].0])
            .unwrap_or(f32::INFINITY)
    };

    for i in 0..n {
        let (lo, hi) = window.rows[i];
        let mut row_cost = Vec::with_capacity(hi - lo + 1);
        let mut row_steps = Vec::with_capacity(hi - lo + 1);

        for j in lo..=hi {
            let d = dist(x[i], y[j]);
            if i == 0 && j == 0 {
                row_cost.push(d);
                row_steps.push(Step::Start);
                continue;
            }

            let mut best = (f32::INFINITY, Step::Unreachable);
            if i > 0 && j > 0 {
                best = pick(best, lookup(&cost, i - 1, j - 1), Step::Diagonal);
            }
            if i > 0 {
                best = pick(best, lookup(&cost, i - 1, j), Step::Up);
            }
            if j > lo {
                best = pick(best, row_cost[j - lo - 1], Step::Left);
            }

            row_cost.push(best.0 + d);
            row_steps.push(best.1);
        }

        cost.push(row_cost);
        steps.push(row_steps);
    }

    let path = backtrack(&steps, window, n - 1, y.len() - 1);
    let distance = path.iter().map(|&(i, j)| dist(x[i], y[j])).sum();
    (distance, path)
}

fn pick(best: (f32, Step), candidate: f32, step: Step) -> (f32, Step) {
    if candidate < best.0 {
        (candidate, step)
    } else {
        best
    }
}

fn backtrack(steps: &[Vec<Step>], window: &Window, mut i: usize, mut j: usize) -> AlignmentPath {
    let mut path = vec![(i, j)];

    while i > 0 || j > 0 {
        let step = if window.contains(i, j) {
            steps[i][j - window.rows[i].0]
        } else {
            Step::Unreachable
        };

        match step {
            Step::Diagonal => {
                i -= 1;
                j -= 1;
            }
            Step::Up => i -= 1,
            Step::Left => j -= 1,
            // Never hit with a connected window; head for the origin anyway.
            Step::Start | Step::Unreachable => {
                if i > 0 && j > 0 {
                    i -= 1;
                    j -= 1;
                } else if i > 0 {
                    i -= 1;
                } else {
                    j -= 1;
                }
            }
        }
        path.push((i, j));
    }

    path.reverse();
    path
}
