//! L2-regularized, class-weighted logistic regression

use crate::error::{Result, TrainingError};
use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How per-sample loss weights are derived from the labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// Weight each class by `n_samples / (2 * n_class)`
    #[default]
    Balanced,
    /// Every sample weighs 1
    None,
}

/// Optimizer used by [`LogisticRegression::fit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Solver {
    /// Damped Newton-Raphson with a Cholesky solve per step
    #[default]
    Newton,
    /// Full-batch gradient descent with a fixed learning rate
    GradientDescent,
}

/// Binary logistic regression.
///
/// Minimizes `sum_i s_i * logloss_i + ||w||^2 / (2C)` where `s_i` are the class
/// weights. The intercept is not penalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Inverse regularization strength
    pub c: f64,
    pub class_weight: ClassWeight,
    pub solver: Solver,
    pub max_iter: usize,
    /// Convergence tolerance on the mean absolute gradient
    pub tol: f64,
    /// Step size for [`Solver::GradientDescent`]
    pub learning_rate: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
    n_iter: usize,
    converged: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            c: 1.0,
            class_weight: ClassWeight::Balanced,
            solver: Solver::Newton,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.5,
            coefficients: None,
            intercept: 0.0,
            n_iter: 0,
            converged: false,
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Per-sample weights for labels in {0, 1}
    pub fn sample_weights(&self, y: &Array1<f64>) -> Result<Array1<f64>> {
        match self.class_weight {
            ClassWeight::None => Ok(Array1::ones(y.len())),
            ClassWeight::Balanced => {
                let n = y.len() as f64;
                let n_pos = y.iter().filter(|&&v| v >= 0.5).count();
                let n_neg = y.len() - n_pos;
                let distinct = usize::from(n_pos > 0) + usize::from(n_neg > 0);
                if distinct < 2 {
                    return Err(TrainingError::DegenerateLabels(distinct).into());
                }
                let w_pos = n / (2.0 * n_pos as f64);
                let w_neg = n / (2.0 * n_neg as f64);
                Ok(y.mapv(|v| if v >= 0.5 { w_pos } else { w_neg }))
            }
        }
    }

    /// Fit on a design matrix and labels in {0, 1}
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(TrainingError::Shape {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            }
            .into());
        }
        if n_samples == 0 {
            return Err(TrainingError::Shape {
                expected: "at least one sample".to_string(),
                actual: "0 samples".to_string(),
            }
            .into());
        }

        let weights = self.sample_weights(y)?;
        let xa = with_intercept_column(x);
        let penalty = self.penalty_diagonal(xa.ncols());

        let (beta, n_iter, converged) = match self.solver {
            Solver::Newton => self.fit_newton(&xa, y, &weights, &penalty),
            Solver::GradientDescent => self.fit_gradient_descent(&xa, y, &weights, &penalty),
        };

        if !converged {
            warn!(
                solver = ?self.solver,
                max_iter = self.max_iter,
                "Logistic regression did not converge"
            );
        }
        debug!(solver = ?self.solver, n_iter, converged, "Logistic regression fitted");

        let p = x.ncols();
        self.coefficients = Some(beta.slice(s![..p]).to_owned());
        self.intercept = beta[p];
        self.n_iter = n_iter;
        self.converged = converged;
        Ok(self)
    }

    /// Positive-class probability per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(TrainingError::NotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(TrainingError::Shape {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            }
            .into());
        }
        let linear = x.dot(coefficients) + self.intercept;
        Ok(linear.mapv(sigmoid))
    }

    /// Class labels: 1 where the positive-class probability is strictly above `threshold`
    pub fn predict(&self, x: &Array2<f64>, threshold: f64) -> Result<Array1<u8>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| u8::from(p > threshold)))
    }

    fn penalty_diagonal(&self, n_params: usize) -> Array1<f64> {
        let mut penalty = Array1::from_elem(n_params, 1.0 / self.c);
        // intercept gets a tiny ridge so the Hessian stays positive definite
        penalty[n_params - 1] = 1e-10;
        penalty
    }

    fn fit_newton(
        &self,
        xa: &Array2<f64>,
        y: &Array1<f64>,
        weights: &Array1<f64>,
        penalty: &Array1<f64>,
    ) -> (Array1<f64>, usize, bool) {
        let n = xa.nrows() as f64;
        let mut beta = Array1::zeros(xa.ncols());
        let mut current = objective(xa, y, weights, penalty, &beta);

        for iter in 0..self.max_iter {
            let proba = xa.dot(&beta).mapv(sigmoid);
            let grad = gradient(xa, y, weights, penalty, &beta, &proba);
            if grad.iter().map(|g| g.abs()).sum::<f64>() / (n * grad.len() as f64) < self.tol {
                return (beta, iter, true);
            }

            // H = Xa^T diag(s * p * (1 - p)) Xa + diag(penalty)
            let curvature = (&proba * &proba.mapv(|p| 1.0 - p)) * weights;
            let weighted = xa * &curvature.insert_axis(Axis(1));
            let mut hessian = xa.t().dot(&weighted);
            for (k, r) in penalty.iter().enumerate() {
                hessian[[k, k]] += r;
            }

            let direction = match cholesky_solve(&hessian, &grad) {
                Some(d) => d,
                None => {
                    debug!(iter, "Hessian not positive definite, taking a gradient step");
                    grad.mapv(|g| g * self.learning_rate / n)
                }
            };

            // Halve the step until the objective stops increasing
            let mut step = 1.0;
            let mut accepted = false;
            for _ in 0..30 {
                let candidate = &beta - &(direction.mapv(|d| d * step));
                let value = objective(xa, y, weights, penalty, &candidate);
                if value <= current {
                    beta = candidate;
                    current = value;
                    accepted = true;
                    break;
                }
                step *= 0.5;
            }
            if !accepted {
                // No descent possible along this direction: we are at the optimum
                // up to floating-point precision.
                return (beta, iter + 1, true);
            }
        }

        (beta, self.max_iter, false)
    }

    fn fit_gradient_descent(
        &self,
        xa: &Array2<f64>,
        y: &Array1<f64>,
        weights: &Array1<f64>,
        penalty: &Array1<f64>,
    ) -> (Array1<f64>, usize, bool) {
        let n = xa.nrows() as f64;
        let mut beta = Array1::zeros(xa.ncols());

        for iter in 0..self.max_iter {
            let proba = xa.dot(&beta).mapv(sigmoid);
            let grad = gradient(xa, y, weights, penalty, &beta, &proba) / n;
            if grad.iter().map(|g| g.abs()).sum::<f64>() / (grad.len() as f64) < self.tol {
                return (beta, iter, true);
            }
            beta = beta - grad * self.learning_rate;
        }

        (beta, self.max_iter, false)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn with_intercept_column(x: &Array2<f64>) -> Array2<f64> {
    let mut xa = Array2::ones((x.nrows(), x.ncols() + 1));
    xa.slice_mut(s![.., ..x.ncols()]).assign(x);
    xa
}

fn objective(
    xa: &Array2<f64>,
    y: &Array1<f64>,
    weights: &Array1<f64>,
    penalty: &Array1<f64>,
    beta: &Array1<f64>,
) -> f64 {
    let z = xa.dot(beta);
    let loss: f64 = z
        .iter()
        .zip(y.iter())
        .zip(weights.iter())
        .map(|((&z, &y), &s)| s * (softplus(z) - y * z))
        .sum();
    let reg: f64 = beta
        .iter()
        .zip(penalty.iter())
        .map(|(b, r)| 0.5 * r * b * b)
        .sum();
    loss + reg
}

fn gradient(
    xa: &Array2<f64>,
    y: &Array1<f64>,
    weights: &Array1<f64>,
    penalty: &Array1<f64>,
    beta: &Array1<f64>,
    proba: &Array1<f64>,
) -> Array1<f64> {
    let residual = (proba - y) * weights;
    xa.t().dot(&residual) + penalty * beta
}

/// Solve the symmetric positive-definite system `a * x = b` via Cholesky.
/// Returns `None` when `a` is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L * z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * z[j];
        }
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T * x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let x = array![[-2.0], [-1.5], [-1.0], [-0.5], [0.5], [1.0], [1.5], [2.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_newton_learns_direction() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        assert!(model.converged());
        assert!(model.coefficients().unwrap()[0] > 0.0);

        let proba = model.predict_proba(&array![[-2.0], [2.0]]).unwrap();
        assert!(proba[0] < 0.5);
        assert!(proba[1] > 0.5);
    }

    #[test]
    fn test_gradient_descent_agrees_with_newton() {
        let (x, y) = separable();
        let mut newton = LogisticRegression::new();
        newton.fit(&x, &y).unwrap();

        let mut gd = LogisticRegression::new()
            .with_solver(Solver::GradientDescent)
            .with_learning_rate(0.5)
            .with_max_iter(20_000)
            .with_tol(1e-9);
        gd.fit(&x, &y).unwrap();

        assert_abs_diff_eq!(
            newton.coefficients().unwrap()[0],
            gd.coefficients().unwrap()[0],
            epsilon = 1e-3
        );
        assert_abs_diff_eq!(newton.intercept(), gd.intercept(), epsilon = 1e-3);
    }

    #[test]
    fn test_balanced_weights() {
        let y = array![1.0, 0.0, 0.0, 0.0];
        let weights = LogisticRegression::new().sample_weights(&y).unwrap();
        assert_abs_diff_eq!(weights[0], 2.0);
        assert_abs_diff_eq!(weights[1], 4.0 / 6.0);
        // Each class carries half the total weight
        assert_abs_diff_eq!(weights.sum(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_balanced_weighting_lifts_minority_probability() {
        let x = array![[0.0], [0.1], [0.2], [0.3], [0.4], [0.5], [0.6], [0.7], [0.8], [0.9]];
        let y = array![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0];

        let mut plain = LogisticRegression::new().with_class_weight(ClassWeight::None);
        plain.fit(&x, &y).unwrap();
        let mut balanced = LogisticRegression::new();
        balanced.fit(&x, &y).unwrap();

        let minority = array![[0.8]];
        assert!(
            balanced.predict_proba(&minority).unwrap()[0]
                > plain.predict_proba(&minority).unwrap()[0]
        );
    }

    #[test]
    fn test_single_class_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![0.0, 0.0];
        let err = LogisticRegression::new().fit(&x, &y).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AttritionError::Training(TrainingError::DegenerateLabels(1))
        ));
    }

    #[test]
    fn test_even_odds_predict_negative_class() {
        let x = Array2::<f64>::zeros((4, 1));
        let y = array![1.0, 0.0, 1.0, 0.0];
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert_abs_diff_eq!(proba[0], 0.5, epsilon = 1e-12);
        assert_eq!(model.predict(&x, 0.5).unwrap().to_vec(), vec![0, 0, 0, 0]);
        assert_eq!(model.predict(&x, 0.49).unwrap().to_vec(), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_fitted_model_survives_json() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let restored: LogisticRegression = serde_json::from_str(&json).unwrap();
        assert_abs_diff_eq!(restored.coefficients().unwrap()[0], model.coefficients().unwrap()[0], epsilon = 1e-12);
        assert_abs_diff_eq!(restored.intercept(), model.intercept(), epsilon = 1e-12);
        let before = model.predict_proba(&x).unwrap();
        let after = restored.predict_proba(&x).unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LogisticRegression::new();
        assert!(model.predict_proba(&array![[1.0]]).is_err());
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert_abs_diff_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(softplus(800.0).is_finite());
    }
}
