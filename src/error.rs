use thiserror::Error;

/// Failure modes of density fitting, classification and boundary derivation.
/// All variants signal a caller contract violation or a statistically
/// degenerate configuration; none is transient, so callers should treat any
/// of them as fatal to the current invocation and fix the inputs before
/// retrying with a fresh call.
#[derive(Debug, Clone, Error)]
pub enum Error {

    #[error("Informed prior vector has {found} entries; expected {expected}")]
    PriorLength { expected : usize, found : usize },

    #[error("Informed prior vector sums to {0}; expected unit sum with non-negative entries")]
    PriorSum(f64),

    #[error("Informed cost matrix is {found_rows}x{found_cols}; expected {expected}x{expected}")]
    CostShape { expected : usize, found_rows : usize, found_cols : usize },

    #[error("Covariance matrix is singular (determinant {0}); class density is undefined")]
    SingularCovariance(f64),

    #[error("Sample dimension {found} does not match the fitted representation dimension {expected}")]
    DimensionMismatch { expected : usize, found : usize },

    #[error("Boundary derivation is defined for two-dimensional representations; got dimension {0}")]
    UnsupportedDimension(usize),

    #[error("Gaussian fit requires at least two samples; got {0}")]
    InsufficientSamples(usize),

    #[error("Samples carry an empty (zero-dimensional) representation")]
    EmptyRepresentation,

    #[error("Class group {0} carries no samples")]
    EmptyClass(usize),

    #[error("At least one class group is required")]
    NoClasses

}
