//! Iterative Case Filtering (ICF).
use std::fmt::Debug;
use log::{debug, trace};
use ndarray::prelude::*;
use serde_derive::{Deserialize, Serialize};

use crate::distance::Metric;
use crate::error::LearningResult;
use crate::selection::{fitted, PrototypeSelector, ENN};
use crate::utils::check_dataset;


/// Parameters of ICF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcfParams {
    /// Number of neighbors of the ENN pre-filter.
    pub n_neighbors: usize,
    /// Distance used both by ENN and by the filtering passes.
    pub metric: Metric,
}

impl Default for IcfParams {
    fn default() -> IcfParams {
        IcfParams {
            n_neighbors: 3,
            metric: Metric::Euclidean,
        }
    }
}

/// Distance from each instance to its nearest enemy (the closest
/// instance with a different label).
///
/// Instances without enemies get `+inf`.
fn nearest_enemy_distances<L>(distances: &ArrayView2<f64>, targets: &ArrayView1<L>)
        -> Array1<f64> where L: PartialEq {
    Array::from_shape_fn(targets.len(), |i| {
        distances.row(i)
                 .iter()
                 .zip(targets.iter())
                 .filter(|&(_, y)| *y != targets[i])
                 .map(|(&d, _)| d)
                 .fold(f64::INFINITY, f64::min)
    })
}

/// Computes coverage and reachability of every instance.
///
/// `j` is adaptable to `i` when `distances[[i, j]]` is smaller than
/// the nearest enemy distance of `j`: then `i` would classify `j`
/// correctly.
/// The coverage of `i` counts the instances `i` is adaptable to, its
/// reachability the instances that are adaptable to `i`.
///
/// NOTE: adaptability is checked against the nearest enemy of the
/// second instance; this has not been validated against reference
/// results using the first instance's one.
fn coverage_reachability(distances: &ArrayView2<f64>, enemies: &ArrayView1<f64>)
        -> (Vec<usize>, Vec<usize>) {
    let n = enemies.len();
    let adaptable = |i: usize, j: usize| distances[[i, j]] < enemies[j];

    let coverage = (0..n).map(|i| (0..n).filter(|&j| j != i && adaptable(i, j))
                                        .count())
                         .collect();
    let reachability = (0..n).map(|i| (0..n).filter(|&j| j != i && adaptable(j, i))
                                            .count())
                             .collect();

    (coverage, reachability)
}

/// Iterative Case Filtering.
///
/// After an ENN pass, it repeatedly removes every instance whose
/// reachability exceeds its coverage, until a pass removes nothing.
/// Coverage and reachability are recomputed from scratch, on the
/// current surviving set, at each pass.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use prototype_world::selection::*;
///
/// let inputs = array![[0.], [1.], [2.], [3.], [4.5], [5.5], [6.5], [7.5]];
/// let targets = array![0, 0, 0, 0, 1, 1, 1, 1];
///
/// let mut icf = ICF::new(1);
/// icf.fit(&inputs.view(), &targets.view()).unwrap();
/// // Instances far from the class boundary are dropped.
/// assert_eq!(icf.sample_indices().unwrap(), &[2, 3, 4, 5]);
/// assert_eq!(icf.pass_sizes(), &[4, 4]);
/// ```
pub struct ICF {
    params: IcfParams,
    sample_indices: Option<Vec<usize>>,
    pass_sizes: Vec<usize>,
}

impl ICF {
    /// Constructs ICF with a `k`-NN ENN pre-filter and Euclidean
    /// distance.
    pub fn new(k: usize) -> ICF {
        ICF::with_metric(k, Metric::Euclidean)
    }

    /// Constructs ICF with a `k`-NN ENN pre-filter and some distance
    /// metric.
    pub fn with_metric(k: usize, metric: Metric) -> ICF {
        ICF::with_params(IcfParams {
            n_neighbors: k,
            metric: metric,
        })
    }

    /// Constructs ICF from its parameters.
    pub fn with_params(params: IcfParams) -> ICF {
        ICF {
            params: params,
            sample_indices: None,
            pass_sizes: vec![],
        }
    }

    /// Parameters of this selector.
    pub fn params(&self) -> &IcfParams {
        &self.params
    }

    /// Number of filtering passes run by the last `fit()`.
    ///
    /// The last pass is the one that removed nothing.
    pub fn passes(&self) -> usize {
        self.pass_sizes.len()
    }

    /// Number of surviving instances after each filtering pass.
    pub fn pass_sizes(&self) -> &[usize] {
        &self.pass_sizes
    }
}

impl Default for ICF {
    fn default() -> ICF {
        ICF::with_params(IcfParams::default())
    }
}

impl PrototypeSelector for ICF {
    fn fit<L>(&mut self, inputs: &ArrayView2<f64>, targets: &ArrayView1<L>)
            -> LearningResult<()> where L: Clone + Ord + Debug {
        self.sample_indices = None;
        self.pass_sizes.clear();

        check_dataset(inputs, targets)?;
        let IcfParams { n_neighbors, metric } = self.params;

        debug!("ICF: k={}, metric={}, {} instances", n_neighbors, metric, inputs.nrows());

        let mut survivors = ENN::with_metric(n_neighbors, metric).select(inputs, targets)?;
        let mut pass_sizes = vec![];

        loop {
            let inputs_s = inputs.select(Axis(0), &survivors);
            let targets_s = targets.select(Axis(0), &survivors);

            let distances = metric.pairwise(&inputs_s.view());
            let enemies = nearest_enemy_distances(&distances.view(), &targets_s.view());
            let (coverage, reachability) = coverage_reachability(&distances.view(),
                                                                 &enemies.view());

            // Removals are decided on this pass' snapshot.
            let kept = survivors.iter()
                                .enumerate()
                                .filter(|&(p, i)| {
                                    let keep = reachability[p] <= coverage[p];
                                    if !keep {
                                        trace!("ICF: removing {} (reachability {} > coverage {})",
                                               i, reachability[p], coverage[p]);
                                    }
                                    keep
                                })
                                .map(|(_, &i)| i)
                                .collect::<Vec<_>>();

            let removed = survivors.len() - kept.len();
            debug!("ICF: pass {} removed {}, {} left", pass_sizes.len() + 1, removed, kept.len());

            pass_sizes.push(kept.len());
            survivors = kept;

            if removed == 0 {
                break;
            }
        }

        self.pass_sizes = pass_sizes;
        self.sample_indices = Some(survivors);

        Ok(())
    }

    fn sample_indices(&self) -> LearningResult<&[usize]> {
        fitted(&self.sample_indices)
    }
}
