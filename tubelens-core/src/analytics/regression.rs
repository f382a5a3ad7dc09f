//! Least-squares curve fitting for the forecaster.
//!
//! Points are `(x, y)` pairs where x is elapsed days since the first
//! observation. Degree 1 uses the closed form; degree 2 solves the 3×3
//! normal equations.

use serde::Serialize;

/// Shape of a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    Polynomial,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Polynomial => "polynomial",
        }
    }
}

/// A fitted curve `y = intercept + c1·x (+ c2·x²)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedModel {
    #[serde(rename = "type")]
    pub kind: ModelKind,
    /// Coefficients by ascending power of x, intercept excluded
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Coefficient of determination on the fitted points
    pub r_squared: f64,
}

impl FittedModel {
    /// Evaluate the curve at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .fold(self.intercept, |acc, (i, c)| acc + c * x.powi(i as i32 + 1))
    }

    /// In-sample residuals `y - ŷ`.
    pub fn residuals(&self, points: &[(f64, f64)]) -> Vec<f64> {
        points.iter().map(|(x, y)| y - self.predict(*x)).collect()
    }

    fn with_r_squared(mut self, points: &[(f64, f64)]) -> Self {
        self.r_squared = r_squared(&self, points);
        self
    }
}

/// Ordinary least squares line.
///
/// With a single distinct x the slope is 0 and the line passes the mean.
pub fn fit_linear(points: &[(f64, f64)]) -> FittedModel {
    let n = points.len() as f64;
    if points.is_empty() {
        return FittedModel {
            kind: ModelKind::Linear,
            coefficients: vec![0.0],
            intercept: 0.0,
            r_squared: 0.0,
        };
    }

    let sum_x: f64 = points.iter().map(|p| p.0).sum();
    let sum_y: f64 = points.iter().map(|p| p.1).sum();
    let sum_xx: f64 = points.iter().map(|p| p.0 * p.0).sum();
    let sum_xy: f64 = points.iter().map(|p| p.0 * p.1).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    let slope = if denominator.abs() < f64::EPSILON {
        0.0
    } else {
        (n * sum_xy - sum_x * sum_y) / denominator
    };
    let intercept = (sum_y - slope * sum_x) / n;

    FittedModel {
        kind: ModelKind::Linear,
        coefficients: vec![slope],
        intercept,
        r_squared: 0.0,
    }
    .with_r_squared(points)
}

/// Least squares parabola, or `None` when the system is singular.
pub fn fit_quadratic(points: &[(f64, f64)]) -> Option<FittedModel> {
    if points.len() < 3 {
        return None;
    }

    // Power sums Σx^k for k = 0..=4, and Σx^k·y for k = 0..=2
    let mut sx = [0.0f64; 5];
    let mut sxy = [0.0f64; 3];
    for (x, y) in points {
        let mut p = 1.0;
        for k in 0..5 {
            sx[k] += p;
            if k < 3 {
                sxy[k] += p * y;
            }
            p *= x;
        }
    }

    let mut system = [
        [sx[0], sx[1], sx[2], sxy[0]],
        [sx[1], sx[2], sx[3], sxy[1]],
        [sx[2], sx[3], sx[4], sxy[2]],
    ];
    let [c0, c1, c2] = solve3(&mut system)?;

    Some(
        FittedModel {
            kind: ModelKind::Polynomial,
            coefficients: vec![c1, c2],
            intercept: c0,
            r_squared: 0.0,
        }
        .with_r_squared(points),
    )
}

/// Gaussian elimination with partial pivoting on an augmented 3×4 matrix.
fn solve3(m: &mut [[f64; 4]; 3]) -> Option<[f64; 3]> {
    let scale = m
        .iter()
        .flat_map(|row| row[..3].iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 {
        return None;
    }

    for col in 0..3 {
        let pivot = (col..3).max_by(|a, b| m[*a][col].abs().total_cmp(&m[*b][col].abs()))?;
        if m[pivot][col].abs() <= scale * 1e-12 {
            return None;
        }
        m.swap(col, pivot);

        for row in (col + 1)..3 {
            let factor = m[row][col] / m[col][col];
            for k in col..4 {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut solution = [0.0f64; 3];
    for row in (0..3).rev() {
        let tail: f64 = ((row + 1)..3).map(|k| m[row][k] * solution[k]).sum();
        solution[row] = (m[row][3] - tail) / m[row][row];
    }
    solution.iter().all(|v| v.is_finite()).then_some(solution)
}

/// R² = 1 − SS_res / SS_tot; for constant y, 1 on a perfect fit else 0.
fn r_squared(model: &FittedModel, points: &[(f64, f64)]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / points.len() as f64;
    let ss_tot: f64 = points.iter().map(|p| (p.1 - mean_y).powi(2)).sum();
    let ss_res: f64 = model.residuals(points).iter().map(|r| r * r).sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res < 1e-9 {
        1.0
    } else {
        0.0
    }
}
