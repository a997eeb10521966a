use nalgebra::*;
use serde::{Serialize, Deserialize};

use crate::density::{ClassDensity, GaussianDensity};
use crate::error::Error;

/// Coefficients of the implicit quadratic curve over which two Gaussian
/// classes have equal Bayes risk, derived analytically from the fitted
/// parameters of the pair. The curve is
///
/// x²·xx + xy·xy + y²·yy + x·x + y·y + threshold + offset = 0
///
/// with `threshold` the log-determinant constant from the risk equation and
/// `offset` the constant carried over from the expansion of the pair of
/// Mahalanobis forms. Swapping the class pair negates every coefficient,
/// which describes the same curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCoefficients {

    /// Class pair (i, j), i < j in the canonical enumeration.
    pub classes : (usize, usize),

    pub xx : f64,

    pub xy : f64,

    pub yy : f64,

    pub x : f64,

    pub y : f64,

    pub threshold : f64,

    pub offset : f64

}

impl BoundaryCoefficients {

    /// The seven coefficients in the order [x², xy, y², x, y, threshold, offset].
    pub fn as_array(&self) -> [f64; 7] {
        [self.xx, self.xy, self.yy, self.x, self.y, self.threshold, self.offset]
    }

    /// Evaluates the implicit curve at (x, y). Zero on the boundary;
    /// the sign tells which side of the boundary the point falls on.
    pub fn eval(&self, x : f64, y : f64) -> f64 {
        self.xx * x * x + self.xy * x * y + self.yy * y * y
            + self.x * x + self.y * y + self.threshold + self.offset
    }

}

fn pair_boundary(
    fst : &GaussianDensity,
    snd : &GaussianDensity,
    classes : (usize, usize)
) -> BoundaryCoefficients {
    let a = snd.cov_inv() - fst.cov_inv();
    let b = -2. * (snd.cov_inv() * snd.mean() - fst.cov_inv() * fst.mean());
    let d = -((fst.mean().transpose() * fst.cov_inv() * fst.mean())[0]
        - (snd.mean().transpose() * snd.cov_inv() * snd.mean())[0]);
    let c = -(snd.det() / fst.det()).ln();
    BoundaryCoefficients {
        classes,
        xx : a[(0, 0)],
        xy : a[(0, 1)] + a[(1, 0)],
        yy : a[(1, 1)],
        x : b[0],
        y : b[1],
        threshold : c,
        offset : d
    }
}

/// Derives the quadratic decision-boundary coefficients for every unordered
/// pair of classes from their fitted Gaussian parameters, assuming equal
/// priors and costs for the pair. Pairs are produced in combinatorial order
/// of class index ((0,1), (0,2), ..., (1,2), ...), which consumers may rely on.
///
/// The derivation is only defined over a two-dimensional representation;
/// any other dimension fails rather than producing a silently wrong curve.
pub fn gaussian_boundaries(models : &[GaussianDensity]) -> Result<Vec<BoundaryCoefficients>, Error> {
    for model in models {
        if model.dim() != 2 {
            return Err(Error::UnsupportedDimension(model.dim()));
        }
    }
    let k = models.len();
    let mut coeffs = Vec::with_capacity(k * (k.max(1) - 1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            coeffs.push(pair_boundary(&models[i], &models[j], (i, j)));
        }
    }
    Ok(coeffs)
}

/// Convenience over [`gaussian_boundaries`]: fits one Gaussian per class
/// group (class index = position in the slice), then derives the pairwise
/// boundaries from the fitted parameters.
pub fn boundaries_from_groups(groups : &[DMatrix<f64>]) -> Result<Vec<BoundaryCoefficients>, Error> {
    let models : Vec<GaussianDensity> = groups.iter()
        .map(|g| GaussianDensity::fit(g) )
        .collect::<Result<_, _>>()?;
    gaussian_boundaries(&models)
}
