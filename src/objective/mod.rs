//! Kernel angle-based margin objective
//!
//! The optimization variable is a flattened (n+1) x (k-1) matrix stored as
//! k-1 column blocks of length n+1. Entry 0 of block q is the intercept of
//! simplex axis q; entry p >= 1 is the coefficient of sample p-1.
//!
//! For sample i with class rank r_i the alignment score is
//!
//! ```text
//! u_i = Σ_q W[r_i, q] * (x[q, 0] + Σ_l K[i, l] * x[q, l+1])
//! ```
//!
//! and the objective is `f = Σ_i |resp_i| * loss(resp_i, u_i)`, where the
//! sign of `resp_i` picks `loss_p` or `loss_m`.

use crate::core::{
    ABCError, ClassifierConfig, Dataset, DerivativeWeighting, Objective, Result,
};
use crate::data::validate_dataset;
use crate::encoding::{LabelEncoder, SimplexVertices};
use crate::kernel::{FeatureMatrix, GramMatrix, KernelSpec};
use crate::loss::MarginLoss;
use crate::parallel::ParallelExecutor;
use log::{debug, warn};

/// Everything derived from one dataset; replaced wholesale on rebind
#[derive(Debug)]
struct BoundData {
    nsample: usize,
    labels: LabelEncoder,
    ranks: Vec<usize>,
    resp: Vec<f64>,
    simplex: SimplexVertices,
    gram: GramMatrix,
}

impl BoundData {
    fn naxis(&self) -> usize {
        self.simplex.naxis()
    }

    fn dimension(&self) -> usize {
        (self.nsample + 1) * self.naxis()
    }
}

/// Objective evaluator with its own fixed worker pool
#[derive(Debug)]
pub struct AngleObjective {
    loss: MarginLoss,
    lambda: f64,
    kernel: KernelSpec,
    weighting: DerivativeWeighting,
    executor: ParallelExecutor,
    bound: Option<BoundData>,
}

impl AngleObjective {
    /// Create an unbound objective
    ///
    /// # Errors
    /// Fails on an unsupported or malformed kernel string, a non-positive
    /// robustness constant, or a worker count of zero.
    pub fn new(c: f64, lambda: f64, kernel: &str, nthreads: usize) -> Result<Self> {
        let loss = MarginLoss::new(c)?;
        let kernel: KernelSpec = kernel.parse()?;
        let executor = ParallelExecutor::new(nthreads)?;

        Ok(Self {
            loss,
            lambda,
            kernel,
            weighting: DerivativeWeighting::default(),
            executor,
            bound: None,
        })
    }

    /// Create an unbound objective from a classifier configuration
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Ok(
            Self::new(config.c, config.lambda, &config.kernel, config.threads)?
                .with_derivative_weighting(config.derivative_weighting),
        )
    }

    /// Select how loss derivatives are scaled in the gradient
    pub fn with_derivative_weighting(mut self, weighting: DerivativeWeighting) -> Self {
        if weighting == DerivativeWeighting::Unweighted {
            warn!("Unweighted derivatives: the gradient ignores |resp| and is not the exact derivative of the value");
        }
        self.weighting = weighting;
        self
    }

    /// Bind a dataset: encode labels, scale responses, build the simplex
    /// and the Gram matrix
    ///
    /// On error the previous binding, if any, is left untouched.
    pub fn bind<D: Dataset + ?Sized>(&mut self, data: &D) -> Result<()> {
        validate_dataset(data)?;

        let nsample = data.nsample();
        let labels = LabelEncoder::fit(data.act());
        let simplex = SimplexVertices::new(labels.k())?;
        let ranks = labels.transform(data.act())?;

        let resp: Vec<f64> = data
            .resp()
            .iter()
            .zip(data.prob())
            .map(|(r, p)| r / p)
            .collect();

        let features = FeatureMatrix::from_dataset(data);
        debug!(
            "Binding {} samples, {} categories, {} features ({} numeric), kernel {}",
            nsample,
            labels.k(),
            features.nvar(),
            features.ncomp(),
            self.kernel
        );
        let gram = GramMatrix::build(&features, &self.kernel, &self.executor);

        self.bound = Some(BoundData {
            nsample,
            labels,
            ranks,
            resp,
            simplex,
            gram,
        });
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    fn state(&self) -> Result<&BoundData> {
        self.bound.as_ref().ok_or(ABCError::NotBound)
    }

    fn check_len(&self, state: &BoundData, len: usize) -> Result<()> {
        let expected = state.dimension();
        if len == expected {
            Ok(())
        } else {
            Err(ABCError::DimensionMismatch {
                expected,
                actual: len,
            })
        }
    }

    /// Number of bound samples
    pub fn nsample(&self) -> Result<usize> {
        Ok(self.state()?.nsample)
    }

    /// Number of categories of the bound dataset
    pub fn k(&self) -> Result<usize> {
        Ok(self.state()?.labels.k())
    }

    /// Sorted raw labels; position = rank
    pub fn categories(&self) -> Result<&[i32]> {
        Ok(self.state()?.labels.categories())
    }

    /// Rank of every bound sample
    pub fn ranks(&self) -> Result<&[usize]> {
        Ok(&self.state()?.ranks)
    }

    /// Signed response weights resp / prob
    pub fn response_weights(&self) -> Result<&[f64]> {
        Ok(&self.state()?.resp)
    }

    pub fn gram(&self) -> Result<&GramMatrix> {
        Ok(&self.state()?.gram)
    }

    pub fn simplex(&self) -> Result<&SimplexVertices> {
        Ok(&self.state()?.simplex)
    }

    pub fn kernel(&self) -> &KernelSpec {
        &self.kernel
    }

    pub fn loss(&self) -> &MarginLoss {
        &self.loss
    }

    /// Regularization weight; carried for callers, not used by the loss
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn derivative_weighting(&self) -> DerivativeWeighting {
        self.weighting
    }

    /// Worker count after clamping
    pub fn threads(&self) -> usize {
        self.executor.threads()
    }

    /// Alignment score u_i of every sample at `x`
    pub fn alignment_scores(&self, x: &[f64]) -> Result<Vec<f64>> {
        let state = self.state()?;
        self.check_len(state, x.len())?;
        Ok(self.scores(state, x))
    }

    fn scores(&self, state: &BoundData, x: &[f64]) -> Vec<f64> {
        let n = state.nsample;
        let block = n + 1;
        let naxis = state.naxis();
        let mut u = vec![0.0; n];

        self.executor.for_each_range(&mut u, |range, out| {
            for (ui, i) in out.iter_mut().zip(range) {
                let row = state.gram.row(i);
                let vertex = state.simplex.vertex(state.ranks[i]);

                *ui = (0..naxis)
                    .map(|q| {
                        let coef = &x[q * block..(q + 1) * block];
                        let proj = coef[0] + dot(row, &coef[1..]);
                        vertex[q] * proj
                    })
                    .sum();
            }
        });
        u
    }

    fn value_from_scores(&self, state: &BoundData, u: &[f64]) -> f64 {
        state
            .resp
            .iter()
            .zip(u)
            .map(|(&r, &ui)| r.abs() * self.loss.loss(r, ui))
            .sum()
    }

    fn derivative_weights(&self, state: &BoundData, u: &[f64]) -> Vec<f64> {
        state
            .resp
            .iter()
            .zip(u)
            .map(|(&r, &ui)| {
                let d = self.loss.dloss(r, ui);
                match self.weighting {
                    DerivativeWeighting::Weighted => r.abs() * d,
                    DerivativeWeighting::Unweighted => d,
                }
            })
            .collect()
    }

    /// g[q, 0] = Σ_i du_i W[r_i, q]; g[q, p] = Σ_i du_i W[r_i, q] K[i, p-1]
    fn accumulate_gradient(&self, state: &BoundData, du: &[f64], g: &mut [f64]) {
        let n = state.nsample;
        let block = n + 1;

        // s[q*n + i] = du_i * W'[q, r_i]
        let mut s = vec![0.0; n * state.naxis()];
        self.executor.for_each_range(&mut s, |range, out| {
            for (si, idx) in out.iter_mut().zip(range) {
                let (q, i) = (idx / n, idx % n);
                *si = du[i] * state.simplex.axis(q)[state.ranks[i]];
            }
        });

        let s = &s;
        self.executor.for_each_range(g, |range, out| {
            for (gi, idx) in out.iter_mut().zip(range) {
                let (q, p) = (idx / block, idx % block);
                let sq = &s[q * n..(q + 1) * n];
                *gi = if p == 0 {
                    sq.iter().sum()
                } else {
                    dot(state.gram.row(p - 1), sq)
                };
            }
        });
    }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl Objective for AngleObjective {
    /// (n+1)(k-1) once bound, 0 before
    fn dimension(&self) -> usize {
        self.bound.as_ref().map_or(0, BoundData::dimension)
    }

    fn value(&self, x: &[f64]) -> Result<f64> {
        let state = self.state()?;
        self.check_len(state, x.len())?;
        let u = self.scores(state, x);
        Ok(self.value_from_scores(state, &u))
    }

    fn gradient(&self, x: &[f64], g: &mut [f64]) -> Result<()> {
        let state = self.state()?;
        self.check_len(state, x.len())?;
        self.check_len(state, g.len())?;
        let u = self.scores(state, x);
        let du = self.derivative_weights(state, &u);
        self.accumulate_gradient(state, &du, g);
        Ok(())
    }

    fn value_and_gradient(&self, x: &[f64], g: &mut [f64]) -> Result<f64> {
        let state = self.state()?;
        self.check_len(state, x.len())?;
        self.check_len(state, g.len())?;
        let u = self.scores(state, x);
        let f = self.value_from_scores(state, &u);
        let du = self.derivative_weights(state, &u);
        self.accumulate_gradient(state, &du, g);
        Ok(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColumnDataset;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_dataset(rng: &mut StdRng, n: usize, k: i32, unit_weights: bool) -> ColumnDataset {
        let resp = (0..n)
            .map(|_| {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                if unit_weights {
                    sign
                } else {
                    sign * rng.gen_range(0.5..3.0)
                }
            })
            .collect();
        let prob = (0..n)
            .map(|_| if unit_weights { 1.0 } else { rng.gen_range(0.2..1.0) })
            .collect();
        // every category appears at least once
        let act = (0..n as i32).map(|i| 10 * (i % k)).collect();

        ColumnDataset::new(resp, prob, act)
            .with_continuous((0..n).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .with_continuous((0..n).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .with_ordinal((0..n).map(|_| rng.gen_range(0..3)).collect())
            .with_nominal((0..n).map(|_| rng.gen_range(0..2)).collect())
    }

    fn finite_difference(obj: &AngleObjective, x: &[f64]) -> Vec<f64> {
        let h = 1e-6;
        let mut xp = x.to_vec();
        (0..x.len())
            .map(|i| {
                xp[i] = x[i] + h;
                let fp = obj.value(&xp).unwrap();
                xp[i] = x[i] - h;
                let fm = obj.value(&xp).unwrap();
                xp[i] = x[i];
                (fp - fm) / (2.0 * h)
            })
            .collect()
    }

    fn check_gradient(kernel: &str, k: i32, weighting: DerivativeWeighting, unit: bool) {
        let mut rng = StdRng::seed_from_u64(17 + k as u64);
        for trial in 0..3 {
            let data = random_dataset(&mut rng, 7 + trial, k, unit);
            let mut obj = AngleObjective::new(0.8, 1.0, kernel, 3)
                .unwrap()
                .with_derivative_weighting(weighting);
            obj.bind(&data).unwrap();

            let x: Vec<f64> = (0..obj.dimension())
                .map(|_| rng.gen_range(-0.3..0.3))
                .collect();
            let mut g = vec![0.0; obj.dimension()];
            obj.gradient(&x, &mut g).unwrap();
            let fd = finite_difference(&obj, &x);
            let scale = 1.0 + fd.iter().fold(0.0_f64, |m, v| m.max(v.abs()));

            for (a, b) in g.iter().zip(&fd) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-5 * scale);
            }
        }
    }

    #[test]
    fn test_gradient_matches_finite_differences_two_classes() {
        check_gradient("RBF 0.9", 2, DerivativeWeighting::Weighted, false);
    }

    #[test]
    fn test_gradient_matches_finite_differences_three_classes() {
        check_gradient("RBF 1.5", 3, DerivativeWeighting::Weighted, false);
        check_gradient("POLY 1.0 2", 3, DerivativeWeighting::Weighted, false);
    }

    #[test]
    fn test_unweighted_gradient_exact_for_unit_weights() {
        check_gradient("RBF 1.0", 3, DerivativeWeighting::Unweighted, true);
    }

    #[test]
    fn test_unweighted_gradient_ignores_magnitude() {
        let data = ColumnDataset::new(vec![4.0, -2.0], vec![1.0, 0.5], vec![0, 1])
            .with_continuous(vec![0.0, 1.0]);
        let mut weighted = AngleObjective::new(1.0, 1.0, "RBF 1.0", 1).unwrap();
        let mut unweighted = AngleObjective::new(1.0, 1.0, "RBF 1.0", 1)
            .unwrap()
            .with_derivative_weighting(DerivativeWeighting::Unweighted);
        weighted.bind(&data).unwrap();
        unweighted.bind(&data).unwrap();

        let x = vec![0.0; 3];
        let mut gw = vec![0.0; 3];
        let mut gu = vec![0.0; 3];
        let fw = weighted.value_and_gradient(&x, &mut gw).unwrap();
        let fu = unweighted.value_and_gradient(&x, &mut gu).unwrap();

        // value is weighted either way: |4| + |-4|
        assert_abs_diff_eq!(fw, 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fu, 8.0, epsilon = 1e-12);

        // du = (-4, 4) weighted, (-1, 1) unweighted; W' = (1, -1)
        assert_abs_diff_eq!(gw[0], -8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(gu[0], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_three_modes_agree() {
        let mut rng = StdRng::seed_from_u64(5);
        let data = random_dataset(&mut rng, 11, 4, false);
        let mut obj = AngleObjective::new(1.2, 0.0, "RBF 1.0", 4).unwrap();
        obj.bind(&data).unwrap();

        let x: Vec<f64> = (0..obj.dimension()).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let f = obj.value(&x).unwrap();
        let mut g1 = vec![0.0; obj.dimension()];
        let mut g2 = vec![0.0; obj.dimension()];
        obj.gradient(&x, &mut g1).unwrap();
        let f2 = obj.value_and_gradient(&x, &mut g2).unwrap();

        assert_eq!(f, f2);
        assert_eq!(g1, g2);
    }

    #[test]
    fn test_alignment_scores_two_classes() {
        // vertex of rank 0 is +1, of rank 1 is -1; K off-diagonal = e^-0.5
        let data = ColumnDataset::new(vec![1.0, -1.0], vec![1.0; 2], vec![4, 9])
            .with_continuous(vec![0.0, 1.0]);
        let mut obj = AngleObjective::new(1.0, 1.0, "RBF 1.0", 2).unwrap();
        obj.bind(&data).unwrap();

        let e = (-0.5_f64).exp();
        let u = obj.alignment_scores(&[0.5, 1.0, -2.0]).unwrap();
        assert_abs_diff_eq!(u[0], 1.5 - 2.0 * e, epsilon = 1e-12);
        assert_abs_diff_eq!(u[1], 1.5 - e, epsilon = 1e-12);

        assert!(matches!(
            obj.alignment_scores(&[0.0; 2]),
            Err(ABCError::DimensionMismatch { .. })
        ));
    }

    /// Wraps a dataset but reports one response fewer than samples
    struct ShortResponse(ColumnDataset);

    impl Dataset for ShortResponse {
        fn nsample(&self) -> usize {
            self.0.nsample()
        }
        fn ncont(&self) -> usize {
            self.0.ncont()
        }
        fn nord(&self) -> usize {
            self.0.nord()
        }
        fn nnom(&self) -> usize {
            self.0.nnom()
        }
        fn cont(&self, i: usize) -> &[f64] {
            self.0.cont(i)
        }
        fn ord(&self, i: usize) -> &[i32] {
            self.0.ord(i)
        }
        fn nom(&self, i: usize) -> &[i32] {
            self.0.nom(i)
        }
        fn resp(&self) -> &[f64] {
            let resp = self.0.resp();
            &resp[..resp.len() - 1]
        }
        fn prob(&self) -> &[f64] {
            self.0.prob()
        }
        fn act(&self) -> &[i32] {
            self.0.act()
        }
    }

    #[test]
    fn test_short_response_rejected_at_bind() {
        let data = ShortResponse(
            ColumnDataset::new(vec![1.0; 4], vec![1.0; 4], vec![0, 0, 1, 1])
                .with_continuous(vec![0.0, 0.5, 1.0, 1.5]),
        );
        let mut obj = AngleObjective::new(1.0, 1.0, "RBF 1.0", 2).unwrap();
        assert!(matches!(
            obj.bind(&data),
            Err(ABCError::InvalidDataset(_))
        ));
        assert!(!obj.is_bound());
    }

    #[test]
    fn test_results_independent_of_worker_count() {
        let mut rng = StdRng::seed_from_u64(9);
        let data = random_dataset(&mut rng, 10, 3, false);
        let x: Vec<f64> = (0..22).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let mut reference: Option<(f64, Vec<f64>)> = None;
        for threads in 1..5 {
            let mut obj = AngleObjective::new(0.5, 1.0, "POLY 0.5 2", threads).unwrap();
            obj.bind(&data).unwrap();
            assert_eq!(obj.dimension(), 22);
            let mut g = vec![0.0; 22];
            let f = obj.value_and_gradient(&x, &mut g).unwrap();
            match &reference {
                None => reference = Some((f, g)),
                Some((f0, g0)) => {
                    assert_eq!(*f0, f);
                    assert_eq!(g0, &g);
                }
            }
        }
    }

    #[test]
    fn test_evaluate_before_bind() {
        let obj = AngleObjective::new(1.0, 1.0, "RBF 1.0", 2).unwrap();
        assert!(!obj.is_bound());
        assert_eq!(obj.dimension(), 0);
        assert!(matches!(obj.value(&[]), Err(ABCError::NotBound)));
        assert!(matches!(obj.k(), Err(ABCError::NotBound)));
    }

    #[test]
    fn test_dimension_mismatch() {
        let data = ColumnDataset::new(vec![1.0, 1.0, 1.0], vec![1.0; 3], vec![0, 1, 2])
            .with_continuous(vec![0.0, 1.0, 2.0]);
        let mut obj = AngleObjective::new(1.0, 1.0, "RBF 1.0", 2).unwrap();
        obj.bind(&data).unwrap();
        assert_eq!(obj.dimension(), 8);

        match obj.value(&[0.0; 7]) {
            Err(ABCError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 8);
                assert_eq!(actual, 7);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }

        let mut g = vec![0.0; 9];
        assert!(matches!(
            obj.gradient(&[0.0; 8], &mut g),
            Err(ABCError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_single_category_rejected() {
        let data = ColumnDataset::new(vec![1.0, 1.0], vec![1.0; 2], vec![4, 4])
            .with_continuous(vec![0.0, 1.0]);
        let mut obj = AngleObjective::new(1.0, 1.0, "RBF 1.0", 1).unwrap();
        assert!(matches!(
            obj.bind(&data),
            Err(ABCError::InvalidParameter(_))
        ));
        assert!(!obj.is_bound());
    }

    #[test]
    fn test_failed_rebind_keeps_previous_binding() {
        let good = ColumnDataset::new(vec![1.0, -1.0], vec![1.0; 2], vec![0, 1])
            .with_continuous(vec![0.0, 1.0]);
        let bad = ColumnDataset::new(vec![1.0], vec![1.0], vec![0]);
        let mut obj = AngleObjective::new(1.0, 1.0, "RBF 1.0", 1).unwrap();
        obj.bind(&good).unwrap();
        assert!(obj.bind(&bad).is_err());
        assert_eq!(obj.dimension(), 3);
    }

    #[test]
    fn test_rebind_replaces_everything() {
        let two = ColumnDataset::new(vec![1.0, -1.0], vec![1.0; 2], vec![0, 1])
            .with_continuous(vec![0.0, 1.0]);
        let three = ColumnDataset::new(vec![1.0; 4], vec![0.5; 4], vec![5, 6, 7, 5])
            .with_continuous(vec![0.0, 1.0, 2.0, 3.0]);
        let mut obj = AngleObjective::new(1.0, 1.0, "RBF 1.0", 2).unwrap();

        obj.bind(&two).unwrap();
        assert_eq!(obj.k().unwrap(), 2);
        obj.bind(&three).unwrap();
        assert_eq!(obj.k().unwrap(), 3);
        assert_eq!(obj.categories().unwrap(), &[5, 6, 7]);
        assert_eq!(obj.ranks().unwrap(), &[0, 1, 2, 0]);
        assert_eq!(obj.response_weights().unwrap(), &[2.0; 4]);
        assert_eq!(obj.dimension(), 10);
    }

    #[test]
    fn test_constructor_errors() {
        assert!(matches!(
            AngleObjective::new(1.0, 1.0, "GAUSS 1.0", 1),
            Err(ABCError::UnsupportedKernel(_))
        ));
        assert!(matches!(
            AngleObjective::new(0.0, 1.0, "RBF 1.0", 1),
            Err(ABCError::InvalidParameter(_))
        ));
        assert!(matches!(
            AngleObjective::new(1.0, 1.0, "RBF 1.0", 0),
            Err(ABCError::InvalidParameter(_))
        ));
    }
}
