use nalgebra::*;
use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;
use std::error::Error as StdError;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use crate::density::{ClassDensity, GaussianDensity};
use crate::error::Error;

// Tolerance for the unit-sum check on informed prior vectors.
const PRIOR_SUM_TOL : f64 = 1e-6;

/// Uniform prior vector over `k` classes (1/k each).
pub fn uniform_prior(k : usize) -> DVector<f64> {
    DVector::from_element(k, 1. / k as f64)
}

/// Zero-one loss matrix over `k` classes: unit cost everywhere except the
/// diagonal. Under this matrix (and a uniform prior) minimum-risk
/// classification reduces to maximum-likelihood classification.
pub fn zero_one_costs(k : usize) -> DMatrix<f64> {
    let mut costs = DMatrix::from_element(k, k, 1.);
    costs.set_diagonal(&DVector::from_element(k, 0.));
    costs
}

/// Counts of (true class, predicted class) pairs as a k x k matrix with one
/// row per true class and one column per predicted class. Rendering the
/// matrix is left to the caller.
pub fn confusion_counts(expected : &[usize], predicted : &[usize], n_classes : usize) -> DMatrix<f64> {
    assert!(expected.len() == predicted.len(), "Label slices must have the same length");
    let mut counts = DMatrix::zeros(n_classes, n_classes);
    for (e, p) in expected.iter().zip(predicted.iter()) {
        assert!(*e < n_classes && *p < n_classes, "Label outside 0..n_classes");
        counts[(*e, *p)] += 1.;
    }
    counts
}

/// Outcome of classifying one batch of points: the minimum-risk label of
/// each point (aligned with the input rows) and, when expected labels were
/// informed, the batch indices at which prediction and expectation differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {

    pub labels : Vec<usize>,

    pub mismatched : Vec<usize>

}

impl Prediction {

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Fraction of the batch that was misclassified. Only meaningful when
    /// the prediction was scored against expected labels.
    pub fn error_rate(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.;
        }
        self.mismatched.len() as f64 / self.labels.len() as f64
    }

}

/// Bayes-risk classifier over per-class density models. Holds one fitted
/// density per class (class index = position of the group in the training
/// slice), a prior vector and a cost matrix; classification picks, for each
/// point, the decision of minimum expected risk.
///
/// The cost convention is: `costs[(i, j)]` is the cost of declaring class i
/// when the true class is j, so the expected risk of declaring i is the
/// prior-weighted density row dotted with row i of the cost matrix.
///
/// All state is fixed at fit time; `predict` neither mutates the classifier
/// nor keeps anything between calls, so a fitted instance can serve
/// concurrent callers through shared references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesClassifier<D = GaussianDensity>
where
    D : ClassDensity
{

    densities : Vec<D>,

    prior : DVector<f64>,

    costs : DMatrix<f64>,

    dim : usize

}

fn validate_prior(prior : DVector<f64>, k : usize) -> Result<DVector<f64>, Error> {
    if prior.nrows() != k {
        return Err(Error::PriorLength { expected : k, found : prior.nrows() });
    }
    let sum = prior.sum();
    if (sum - 1.).abs() > PRIOR_SUM_TOL || prior.iter().any(|p| *p < 0. ) {
        return Err(Error::PriorSum(sum));
    }
    Ok(prior)
}

fn validate_costs(costs : DMatrix<f64>, k : usize) -> Result<DMatrix<f64>, Error> {
    if costs.nrows() != k || costs.ncols() != k {
        return Err(Error::CostShape {
            expected : k,
            found_rows : costs.nrows(),
            found_cols : costs.ncols()
        });
    }
    Ok(costs)
}

impl<D> BayesClassifier<D>
where
    D : ClassDensity
{

    /// Fits one density model per class group with a uniform prior and
    /// zero-one costs.
    pub fn fit(groups : &[DMatrix<f64>]) -> Result<Self, Error> {
        Self::fit_with(groups, None, None)
    }

    /// Fits one density model per class group. `groups` is ordered; the
    /// position of a group is its class index. A missing prior or cost
    /// matrix falls back to [`uniform_prior`] / [`zero_one_costs`]. This is
    /// the only training step: fitted models are immutable and there is no
    /// incremental update.
    pub fn fit_with(
        groups : &[DMatrix<f64>],
        prior : Option<DVector<f64>>,
        costs : Option<DMatrix<f64>>
    ) -> Result<Self, Error> {
        if groups.is_empty() {
            return Err(Error::NoClasses);
        }
        let k = groups.len();
        let dim = groups[0].ncols();
        let prior = match prior {
            Some(p) => validate_prior(p, k)?,
            None => uniform_prior(k)
        };
        let costs = match costs {
            Some(c) => validate_costs(c, k)?,
            None => zero_one_costs(k)
        };
        let mut densities = Vec::with_capacity(k);
        for (i, group) in groups.iter().enumerate() {
            if group.nrows() == 0 {
                return Err(Error::EmptyClass(i));
            }
            if group.ncols() != dim {
                return Err(Error::DimensionMismatch { expected : dim, found : group.ncols() });
            }
            densities.push(D::fit(group)?);
        }
        Ok(Self { densities, prior, costs, dim })
    }

    pub fn n_classes(&self) -> usize {
        self.densities.len()
    }

    /// Dimension of the representation the classifier was fitted over.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn prior(&self) -> &DVector<f64> {
        &self.prior
    }

    pub fn costs(&self) -> &DMatrix<f64> {
        &self.costs
    }

    /// The fitted per-class density models, in class order.
    pub fn densities(&self) -> &[D] {
        &self.densities
    }

    /// Density of each point (rows) under each class model (columns).
    fn class_densities(&self, points : &DMatrix<f64>) -> Result<DMatrix<f64>, Error> {
        if points.ncols() != self.dim {
            return Err(Error::DimensionMismatch { expected : self.dim, found : points.ncols() });
        }
        let mut dens = DMatrix::zeros(points.nrows(), self.n_classes());
        for (j, model) in self.densities.iter().enumerate() {
            dens.set_column(j, &model.prob(points)?);
        }
        Ok(dens)
    }

    /// Expected risk of each decision (columns) for each point (rows):
    /// the class densities are scaled by the prior and combined through the
    /// cost matrix. Consumers verifying decision boundaries can inspect this
    /// matrix directly; `predict` takes its row-wise minimum.
    pub fn expected_risks(&self, points : &DMatrix<f64>) -> Result<DMatrix<f64>, Error> {
        let mut weighted = self.class_densities(points)?;
        for j in 0..weighted.ncols() {
            let mut col = weighted.column_mut(j);
            col *= self.prior[j];
        }
        Ok(&weighted * self.costs.transpose())
    }

    /// Classifies each row of `points` by minimum expected risk. Ties
    /// resolve to the lowest class index as the natural result of a
    /// first-minimum-wins scan. When `expected` is informed, it must carry
    /// one label per point, and the indices where prediction and expectation
    /// differ are reported; otherwise the mismatch set is empty.
    pub fn predict(
        &self,
        points : &DMatrix<f64>,
        expected : Option<&[usize]>
    ) -> Result<Prediction, Error> {
        let risks = self.expected_risks(points)?;
        let mut labels = Vec::with_capacity(risks.nrows());
        for i in 0..risks.nrows() {
            let mut best = 0;
            for j in 1..risks.ncols() {
                if risks[(i, j)] < risks[(i, best)] {
                    best = j;
                }
            }
            labels.push(best);
        }
        let mismatched = match expected {
            Some(exp) => {
                if exp.len() != labels.len() {
                    return Err(Error::DimensionMismatch {
                        expected : labels.len(),
                        found : exp.len()
                    });
                }
                labels.iter().zip(exp.iter()).enumerate()
                    .filter(|(_, (l, e))| l != e )
                    .map(|(i, _)| i )
                    .collect()
            },
            None => Vec::new()
        };
        Ok(Prediction { labels, mismatched })
    }

    /// Maximum-likelihood shortcut: the label of highest raw class density,
    /// ignoring priors and costs. With a uniform prior and zero-one costs
    /// this agrees with [`Self::predict`] on every point.
    pub fn predict_max_likelihood(&self, points : &DMatrix<f64>) -> Result<Vec<usize>, Error> {
        let dens = self.class_densities(points)?;
        let mut labels = Vec::with_capacity(dens.nrows());
        for i in 0..dens.nrows() {
            let mut best = 0;
            for j in 1..dens.ncols() {
                if dens[(i, j)] > dens[(i, best)] {
                    best = j;
                }
            }
            labels.push(best);
        }
        Ok(labels)
    }

}

impl<D> BayesClassifier<D>
where
    D : ClassDensity + Serialize
{

    pub fn save_to_path<P>(&self, path : P) -> Result<(), Box<dyn StdError>>
    where
        P : AsRef<Path>
    {
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
        self.save(file)
    }

    pub fn save<W>(&self, mut writer : W) -> Result<(), Box<dyn StdError>>
    where
        W : Write
    {
        let content = serde_json::to_string_pretty(&self)?;
        writer.write_all(content.as_bytes())?;
        Ok(())
    }

}

impl<D> BayesClassifier<D>
where
    D : ClassDensity + DeserializeOwned
{

    pub fn load_from_path<P>(path : P) -> Result<Self, Box<dyn StdError>>
    where
        P : AsRef<Path>
    {
        let f = File::open(path)?;
        Self::load(f)
    }

    pub fn load<R>(mut reader : R) -> Result<Self, Box<dyn StdError>>
    where
        R : Read
    {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let classifier = serde_json::from_str(&content[..])?;
        Ok(classifier)
    }

}
