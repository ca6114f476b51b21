//! Utility routines for validating, splitting and rescaling datasets.
use std::collections::BTreeMap;
use std::fmt::Debug;
use ndarray::prelude::*;

use crate::error::{Error, LearningResult};


/// Checks that `inputs` and `targets` describe a non-empty dataset.
///
/// Fails with `InvalidInput` if the number of rows of `inputs` differs
/// from the number of `targets`, or if `inputs` has no rows or no
/// columns.
pub fn check_dataset<L>(inputs: &ArrayView2<f64>, targets: &ArrayView1<L>)
        -> LearningResult<()> {
    if inputs.nrows() != targets.len() {
        return Err(Error::invalid(format!("{} inputs but {} targets",
                                          inputs.nrows(), targets.len())));
    }
    if inputs.nrows() == 0 {
        return Err(Error::invalid("empty dataset"));
    }
    if inputs.ncols() == 0 {
        return Err(Error::invalid("inputs have no features"));
    }

    Ok(())
}

/// Splits row indices according to their labels.
///
/// Returns, for each unique label `y` (in ascending order), the
/// ascending indices of the rows labeled `y`.
pub fn split_indices<L>(targets: &ArrayView1<L>) -> BTreeMap<L, Vec<usize>>
        where L: Clone + Ord {
    let mut classes = BTreeMap::new();

    for (i, y) in targets.iter().enumerate() {
        classes.entry(y.clone())
               .or_insert_with(Vec::new)
               .push(i);
    }

    classes
}

/// Fails with `InsufficientClassPopulation` if some class has fewer
/// than `required` members.
pub fn check_class_population<L>(classes: &BTreeMap<L, Vec<usize>>, required: usize)
        -> LearningResult<()> where L: Debug {
    match classes.iter().find(|&(_, members)| members.len() < required) {
        Some((y, members)) => Err(Error::InsufficientClassPopulation {
            class: format!("{:?}", y),
            count: members.len(),
            required: required,
        }),
        None => Ok(()),
    }
}

/// Rescales every feature (column) of `inputs` to [0, 1].
///
/// Minimum and maximum are taken from `inputs` itself. A constant
/// feature is mapped to 0.
pub fn min_max_scale(inputs: &ArrayView2<f64>) -> Array2<f64> {
    let mut scaled = inputs.to_owned();

    for mut column in scaled.axis_iter_mut(Axis(1)) {
        let min = column.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        let scale = if range > 0. { range } else { 1. };

        column.mapv_inplace(|x| (x - min) / scale);
    }

    scaled
}

/// Returns the rows of `inputs` and `targets` at `indices`, in order.
pub fn select_rows<L>(inputs: &ArrayView2<f64>, targets: &ArrayView1<L>,
                      indices: &[usize]) -> (Array2<f64>, Array1<L>)
        where L: Clone {
    (inputs.select(Axis(0), indices), targets.select(Axis(0), indices))
}

/// Fraction of the training set removed by a selection.
///
/// # Examples
///
/// ```
/// use prototype_world::utils::reduction_rate;
///
/// assert_eq!(reduction_rate(25, 100), 0.75);
/// ```
pub fn reduction_rate(n_selected: usize, n_total: usize) -> f64 {
    if n_total == 0 {
        return 0.;
    }
    1. - n_selected as f64 / n_total as f64
}
