//! Dense symmetric solver for the model's normal equations

/// Row-major square matrix
#[derive(Debug, Clone)]
pub(crate) struct SquareMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    pub(crate) fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    pub(crate) fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n + col]
    }

    pub(crate) fn add(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.n + col] += value;
    }

    /// Accumulate `x xᵀ` (the Gram matrix contribution of one design row)
    pub(crate) fn add_outer(&mut self, x: &[f64]) {
        for (i, xi) in x.iter().enumerate() {
            if *xi == 0.0 {
                continue;
            }
            for (j, xj) in x.iter().enumerate() {
                self.data[i * self.n + j] += xi * xj;
            }
        }
    }

    /// Solve `A x = b` for symmetric positive definite `A` via Cholesky
    ///
    /// Returns `None` when the matrix is not positive definite or the
    /// result is not finite.
    pub(crate) fn cholesky_solve(&self, b: &[f64]) -> Option<Vec<f64>> {
        let n = self.n;
        let mut l = vec![0.0; n * n];

        for i in 0..n {
            for j in 0..=i {
                let mut sum = self.get(i, j);
                for k in 0..j {
                    sum -= l[i * n + k] * l[j * n + k];
                }
                if i == j {
                    if sum <= 0.0 || !sum.is_finite() {
                        return None;
                    }
                    l[i * n + i] = sum.sqrt();
                } else {
                    l[i * n + j] = sum / l[j * n + j];
                }
            }
        }

        // Forward substitution: L z = b
        let mut z = vec![0.0; n];
        for i in 0..n {
            let mut sum = b[i];
            for k in 0..i {
                sum -= l[i * n + k] * z[k];
            }
            z[i] = sum / l[i * n + i];
        }

        // Back substitution: Lᵀ x = z
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = z[i];
            for k in (i + 1)..n {
                sum -= l[k * n + i] * x[k];
            }
            x[i] = sum / l[i * n + i];
        }

        x.iter().all(|v| v.is_finite()).then_some(x)
    }
}
