use nalgebra::*;

use crate::error::Error;

mod gaussian;

pub use gaussian::*;

/// Capability shared by class-conditional density models. A model is built
/// from the samples of a single class (fitting happens at construction; there
/// is no incremental update) and can then evaluate the density of arbitrary
/// point batches under that class. The classifier composes with any
/// implementor through this seam, so a non-parametric model (e.g. a
/// two-dimensional histogram) can replace the Gaussian without touching the
/// risk-minimization logic.
///
/// Implementors must return one density value per input row, in input order,
/// and must not mutate any internal state during evaluation: `prob` is a pure
/// function of the parameters fixed at fit time, which also makes shared
/// references usable from several threads at once.
pub trait ClassDensity
where
    Self : Sized
{

    /// Fits the model from one class's samples, one row per sample.
    fn fit(samples : &DMatrix<f64>) -> Result<Self, Error>;

    /// Dimension of the representation the model was fitted over.
    fn dim(&self) -> usize;

    /// Evaluates the density of each row of `points`, preserving row order.
    /// Fails when the informed batch dimension differs from `self.dim()`.
    fn prob(&self, points : &DMatrix<f64>) -> Result<DVector<f64>, Error>;

}
