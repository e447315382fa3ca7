//! Small dense least-squares solver

use crate::{MathError, Result};

/// Ridge added to the normal-equation diagonal
const RIDGE: f64 = 1e-8;

/// Solve `min ||X b - y||²` through the normal equations.
///
/// `design` holds one row per observation; every row must have the same
/// number of columns.
pub fn least_squares(design: &[Vec<f64>], target: &[f64]) -> Result<Vec<f64>> {
    if design.len() != target.len() {
        return Err(MathError::InvalidInput(format!(
            "Design rows ({}) doesn't match target length ({})",
            design.len(),
            target.len()
        )));
    }

    let columns = match design.first() {
        Some(row) => row.len(),
        None => {
            return Err(MathError::InsufficientData(
                "Empty design matrix".to_string(),
            ))
        }
    };

    if columns == 0 {
        return Ok(Vec::new());
    }

    if design.len() < columns {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} rows for {} unknowns, got {}",
            columns,
            columns,
            design.len()
        )));
    }

    let mut normal = vec![vec![0.0; columns]; columns];
    let mut rhs = vec![0.0; columns];

    for (row, &y) in design.iter().zip(target.iter()) {
        if row.len() != columns {
            return Err(MathError::InvalidInput(
                "Design matrix rows have different lengths".to_string(),
            ));
        }
        for i in 0..columns {
            rhs[i] += row[i] * y;
            for j in i..columns {
                normal[i][j] += row[i] * row[j];
            }
        }
    }

    for i in 0..columns {
        for j in 0..i {
            normal[i][j] = normal[j][i];
        }
        normal[i][i] += RIDGE;
    }

    solve(normal, rhs)
}

/// Gaussian elimination with partial pivoting
pub fn solve(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Result<Vec<f64>> {
    let n = rhs.len();
    if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(
            "Matrix must be square and match the right-hand side".to_string(),
        ));
    }

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))
            .unwrap_or(col);

        if matrix[pivot][col].abs() < 1e-12 {
            return Err(MathError::CalculationError(
                "Singular system in least squares".to_string(),
            ));
        }

        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = matrix[row][col] / matrix[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| matrix[row][k] * solution[k]).sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }

    if solution.iter().any(|v| !v.is_finite()) {
        return Err(MathError::CalculationError(
            "Least squares produced non-finite coefficients".to_string(),
        ));
    }

    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_two_by_two() {
        let solution = solve(vec![vec![2.0, 1.0], vec![1.0, 3.0]], vec![5.0, 10.0]).unwrap();
        assert_relative_eq!(solution[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(solution[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_least_squares_recovers_coefficients() {
        let design: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, ((i * 7) % 5) as f64])
            .collect();
        let target: Vec<f64> = design.iter().map(|r| 0.5 * r[0] - 2.0 * r[1]).collect();

        let coefficients = least_squares(&design, &target).unwrap();

        assert_relative_eq!(coefficients[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(coefficients[1], -2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_least_squares_rejects_bad_shapes() {
        assert!(least_squares(&[], &[]).is_err());
        assert!(least_squares(&[vec![1.0, 2.0]], &[1.0]).is_err());
        assert!(least_squares(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_solve_singular() {
        let result = solve(vec![vec![1.0, 2.0], vec![2.0, 4.0]], vec![1.0, 2.0]);
        assert!(matches!(result, Err(MathError::CalculationError(_))));
    }
}
