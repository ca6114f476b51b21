//! Edited Nearest Neighbor (ENN).
use std::collections::BTreeMap;
use std::fmt::Debug;
use itertools::Itertools;
use log::{debug, trace};
use ndarray::prelude::*;
use ordered_float::OrderedFloat;

use crate::distance::Metric;
use crate::error::{Error, LearningResult};
use crate::selection::{fitted, PrototypeSelector};
use crate::utils::{check_class_population, check_dataset, split_indices};


/// Returns the `k` nearest neighbors of the `i`-th row of a distance
/// matrix, excluding `i` itself.
///
/// Neighbors are ordered by distance; ties go to the smaller index.
fn nearest_neighbors(distances: &ArrayView2<f64>, i: usize, k: usize) -> Vec<usize> {
    distances.row(i)
             .iter()
             .enumerate()
             .filter(|&(j, _)| j != i)
             .map(|(j, &d)| (OrderedFloat(d), j))
             .sorted()
             .take(k)
             .map(|(_, j)| j)
             .collect()
}

/// Majority label among `neighbors`.
///
/// Ties go to the smallest label.
fn vote<'a, L>(targets: &'a ArrayView1<L>, neighbors: &[usize]) -> Option<&'a L>
        where L: Ord {
    let mut counts = BTreeMap::new();
    for &j in neighbors {
        *counts.entry(&targets[j]).or_insert(0usize) += 1;
    }

    let mut best: Option<(&L, usize)> = None;
    for (y, count) in counts {
        match best {
            Some((_, best_count)) if best_count >= count => {},
            _ => best = Some((y, count)),
        }
    }

    best.map(|(y, _)| y)
}

/// Edited Nearest Neighbor.
///
/// Drops every instance whose label disagrees with the majority vote
/// of its `k` nearest neighbors in the rest of the dataset
/// (leave-one-out).
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use prototype_world::selection::*;
///
/// let inputs = array![[0.], [1.], [2.], [1.4], [8.], [9.], [10.]];
/// let targets = array![0, 0, 0, 1, 1, 1, 1];
///
/// let mut enn = ENN::new(1);
/// enn.fit(&inputs.view(), &targets.view()).unwrap();
/// assert_eq!(enn.sample_indices().unwrap(), &[0, 4, 5, 6]);
/// ```
pub struct ENN {
    k: usize,
    metric: Metric,
    sample_indices: Option<Vec<usize>>,
}

impl ENN {
    /// Constructs an ENN with Euclidean distance.
    ///
    /// # Arguments
    ///
    /// `k` - Number of nearest neighbors voting on each instance.
    pub fn new(k: usize) -> ENN {
        ENN::with_metric(k, Metric::Euclidean)
    }

    /// Constructs an ENN with `k` neighbors and some distance metric.
    pub fn with_metric(k: usize, metric: Metric) -> ENN {
        ENN {
            k: k,
            metric: metric,
            sample_indices: None,
        }
    }

    /// Runs the edition and returns the retained indices.
    pub(crate) fn select<L>(&self, inputs: &ArrayView2<f64>, targets: &ArrayView1<L>)
            -> LearningResult<Vec<usize>> where L: Clone + Ord + Debug {
        check_dataset(inputs, targets)?;
        if self.k == 0 {
            return Err(Error::invalid("ENN needs at least one neighbor"));
        }
        let required = self.k.checked_add(1)
                             .ok_or_else(|| Error::invalid(format!("{} neighbors are too many",
                                                                   self.k)))?;
        check_class_population(&split_indices(targets), required)?;

        debug!("ENN: k={}, metric={}, {} instances", self.k, self.metric, inputs.nrows());

        let distances = self.metric.pairwise(inputs);

        let selected = (0..inputs.nrows()).filter(|&i| {
            let neighbors = nearest_neighbors(&distances.view(), i, self.k);
            let keep = vote(targets, &neighbors) == Some(&targets[i]);
            if !keep {
                trace!("ENN: instance {} misclassified by {:?}", i, neighbors);
            }
            keep
        }).collect::<Vec<_>>();

        debug!("ENN: retained {} of {} instances", selected.len(), inputs.nrows());

        Ok(selected)
    }
}

impl PrototypeSelector for ENN {
    fn fit<L>(&mut self, inputs: &ArrayView2<f64>, targets: &ArrayView1<L>)
            -> LearningResult<()> where L: Clone + Ord + Debug {
        self.sample_indices = None;

        let selected = self.select(inputs, targets)?;
        self.sample_indices = Some(selected);

        Ok(())
    }

    fn sample_indices(&self) -> LearningResult<&[usize]> {
        fitted(&self.sample_indices)
    }
}
