//! Module defining prototype selectors.
//!
//! A `PrototypeSelector<L>` reduces a labeled dataset to the subset of
//! its rows ("prototypes") that preserves the decision behavior of a
//! nearest-neighbor classifier.
//! `fit()` records the indices of the retained rows; `transform()`
//! uses them to slice a dataset.
pub mod drlsh;
pub mod enn;
pub mod icf;

use std::fmt::Debug;
use ndarray::prelude::*;

use crate::error::{Error, LearningResult};
use crate::utils::{check_dataset, select_rows};

pub use self::drlsh::{DrlshParams, DRLSH};
pub use self::enn::ENN;
pub use self::icf::{IcfParams, ICF};


/// An instance-reduction algorithm.
///
/// Labels can be of any type `L` with a total order; classes are
/// always visited in ascending label order.
pub trait PrototypeSelector {
    /// Runs the selection procedure on a dataset and records the
    /// indices of the retained rows.
    ///
    /// Fails if `inputs` and `targets` have different lengths, or if
    /// `inputs` has no rows.
    fn fit<L>(&mut self, inputs: &ArrayView2<f64>, targets: &ArrayView1<L>)
        -> LearningResult<()> where L: Clone + Ord + Debug;

    /// Indices of the rows retained by the last `fit()`, in ascending
    /// order and without duplicates.
    fn sample_indices(&self) -> LearningResult<&[usize]>;

    /// Returns the rows retained by the last `fit()`.
    ///
    /// Fails with `Untrained` if called before `fit()`.
    fn transform<L>(&self, inputs: &ArrayView2<f64>, targets: &ArrayView1<L>)
            -> LearningResult<(Array2<f64>, Array1<L>)> where L: Clone {
        let indices = self.sample_indices()?;
        check_dataset(inputs, targets)?;

        if let Some(&i) = indices.iter().find(|&&i| i >= inputs.nrows()) {
            return Err(Error::invalid(format!("selected index {} out of bounds for {} rows",
                                              i, inputs.nrows())));
        }

        Ok(select_rows(inputs, targets, indices))
    }

    /// Fits the selector and returns the reduced dataset.
    fn fit_transform<L>(&mut self, inputs: &ArrayView2<f64>, targets: &ArrayView1<L>)
            -> LearningResult<(Array2<f64>, Array1<L>)> where L: Clone + Ord + Debug {
        self.fit(inputs, targets)?;
        self.transform(inputs, targets)
    }
}

/// Returns the fitted indices, or `Untrained`.
fn fitted(sample_indices: &Option<Vec<usize>>) -> LearningResult<&[usize]> {
    sample_indices.as_ref()
                  .map(|indices| indices.as_slice())
                  .ok_or(Error::Untrained)
}
