use nalgebra::*;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::fmt::{self, Display};

use super::ClassDensity;
use crate::error::Error;

// Determinant magnitudes at or below this are treated as singular: the
// QR inverse may still succeed numerically, but the density is meaningless.
const DET_TOL : f64 = 1e-12;

/// Multivariate Gaussian class model parametrized by μ (px1) and Σ (pxp),
/// estimated from the samples of a single class. The covariance inverse and
/// determinant are computed once at fit time and cached, since every density
/// evaluation needs both. The covariance estimator is the unbiased sample
/// covariance (divisor n−1), which requires at least two samples and a
/// training set spanning the full representation dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianDensity {

    mu : DVector<f64>,

    sigma : DMatrix<f64>,

    sigma_inv : DMatrix<f64>,

    det : f64,

    dim : usize

}

impl GaussianDensity {

    /// Fitted mean vector.
    pub fn mean(&self) -> &DVector<f64> {
        &self.mu
    }

    /// Fitted covariance matrix.
    pub fn cov(&self) -> &DMatrix<f64> {
        &self.sigma
    }

    /// Precision (inverse covariance) matrix.
    pub fn cov_inv(&self) -> &DMatrix<f64> {
        &self.sigma_inv
    }

    /// Covariance determinant.
    pub fn det(&self) -> f64 {
        self.det
    }

    /// Squared Mahalanobis distance (x−μ)ᵀ Σ⁻¹ (x−μ) of each row of `points`
    /// to the fitted mean.
    pub fn mahalanobis_sq(&self, points : &DMatrix<f64>) -> Result<DVector<f64>, Error> {
        if points.ncols() != self.dim {
            return Err(Error::DimensionMismatch { expected : self.dim, found : points.ncols() });
        }
        let dists = DVector::from_iterator(
            points.nrows(),
            points.row_iter().map(|row| {
                let dev = row.transpose() - &self.mu;
                (dev.transpose() * &self.sigma_inv * &dev)[0]
            })
        );
        Ok(dists)
    }

    fn sample_stats(samples : &DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
        let n = samples.nrows();
        let p = samples.ncols();
        let mut mu = DVector::zeros(p);
        for row in samples.row_iter() {
            mu += row.transpose();
        }
        mu /= n as f64;
        let mut sigma = DMatrix::zeros(p, p);
        for row in samples.row_iter() {
            let dev = row.transpose() - &mu;
            sigma += &dev * dev.transpose();
        }
        sigma /= (n - 1) as f64;
        (mu, sigma)
    }

}

impl ClassDensity for GaussianDensity {

    fn fit(samples : &DMatrix<f64>) -> Result<Self, Error> {
        let n = samples.nrows();
        if n < 2 {
            return Err(Error::InsufficientSamples(n));
        }
        let dim = samples.ncols();
        if dim == 0 {
            return Err(Error::EmptyRepresentation);
        }
        let (mu, sigma) = Self::sample_stats(samples);
        let det = LU::new(sigma.clone()).determinant();
        if !(det.abs() > DET_TOL) {
            return Err(Error::SingularCovariance(det));
        }
        let sigma_inv = QR::new(sigma.clone()).try_inverse()
            .ok_or(Error::SingularCovariance(det))?;
        Ok(Self { mu, sigma, sigma_inv, det, dim })
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn prob(&self, points : &DMatrix<f64>) -> Result<DVector<f64>, Error> {
        let mahal = self.mahalanobis_sq(points)?;
        let norm = 1. / ((2. * PI).powi(self.dim as i32) * self.det).sqrt();
        Ok(mahal.map(|m| norm * (-0.5 * m).exp() ))
    }

}

impl Display for GaussianDensity {

    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gaussian({})", self.dim)
    }

}
