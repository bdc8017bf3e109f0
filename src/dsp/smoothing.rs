/// Savitzky-Golay smoothing.
///
/// Each output point is the value, at that point, of a least-squares
/// polynomial of degree `order` fitted over a `window`-frame neighbourhood.
/// Near the edges, where a centered window would run off the contour, the
/// polynomial fitted to the first (or last) full window is evaluated at the
/// edge positions instead of padding the signal.
///
/// Returns `None` when the input is shorter than the window, when the window
/// is even, or when the polynomial order does not fit in the window. Callers
/// keep the unsmoothed values in that case.
pub fn savgol(values: &[f32], window: usize, order: usize) -> Option<Vec<f32>> {
    if window % 2 == 0 || order >= window || values.len() < window {
        return None;
    }

    let half = window / 2;
    let n = values.len();

    let centered = fit_weights(window, order, 0.0)?;
    let mut out = vec![0.0_f32; n];

    for i in half..n - half {
        out[i] = apply(&centered, &values[i - half..=i + half]);
    }

    for i in 0..half {
        let head = fit_weights(window, order, i as f64 - half as f64)?;
        out[i] = apply(&head, &values[..window]);

        let tail = fit_weights(window, order, half as f64 - i as f64)?;
        out[n - 1 - i] = apply(&tail, &values[n - window..]);
    }

    Some(out)
}

fn apply(weights: &[f64], window: &[f32]) -> f32 {
    weights
        .iter()
        .zip(window)
        .map(|(&w, &v)| w * v as f64)
        .sum::<f64>() as f32
}

/// Weights that, dotted with a window of samples, give the fitted
/// polynomial's value at offset `at` from the window centre.
///
/// With design matrix A (rows `[1, x, x^2, ...]` for x in -half..=half), the
/// fitted value at `at` is p(at)ᵀ (AᵀA)⁻¹ Aᵀ y, so we solve (AᵀA) b = p(at)
/// once and expand b back over the window positions.
fn fit_weights(window: usize, order: usize, at: f64) -> Option<Vec<f64>> {
    let half = (window / 2) as f64;
    let xs: Vec<f64> = (0..window).map(|j| j as f64 - half).collect();
    let terms = order + 1;

    let mut normal = vec![vec![0.0_f64; terms]; terms];
    for (r, row) in normal.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = xs.iter().map(|x| x.powi((r + c) as i32)).sum();
        }
    }
    let rhs: Vec<f64> = (0..terms).map(|k| at.powi(k as i32)).collect();

    let b = solve(normal, rhs)?;

    Some(
        xs.iter()
            .map(|x| b.iter().enumerate().map(|(k, bk)| bk * x.powi(k as i32)).sum())
            .collect(),
    )
}

/// Gaussian elimination with partial pivoting. None if the system is singular.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
