/// Class-conditional density models: the capability trait the classifier
/// composes with, and the parametric Gaussian implementation.
pub mod density;

/// Bayes-risk classification over per-class density models: prior and cost
/// configuration, minimum-risk prediction, scoring against expected labels
/// and persistence of fitted classifiers.
pub mod classify;

/// Closed-form derivation of the quadratic decision boundary between every
/// pair of Gaussian classes (two-dimensional representations only).
pub mod boundary;

mod error;

pub use error::Error;
