//! Distribution-sensitive random-projection reduction (DRLSH).
//!
//! Every instance is hashed into `L` tables, each keyed by `M` random
//! projections quantized with bucket width `W`:
//!     h(x) = floor((a x + b) / W),
//! where `a` is drawn from a standard normal distribution and `b` is
//! uniform in [0, W).
//! Two instances of the same class that share a bucket in at least
//! `ST` tables are considered near-duplicates, and one of them is
//! dropped.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use log::{debug, trace};
use ndarray::prelude::*;
use ndarray::s;
use pcg_rand::Pcg32;
use rand::{Rng, SeedableRng};
use serde_derive::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::error::{Error, LearningResult};
use crate::selection::{fitted, PrototypeSelector};
use crate::utils::{check_dataset, min_max_scale, split_indices};


/// Parameters of DRLSH.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrlshParams {
    /// Number of projections per table; derived from the dataset size
    /// if `None`.
    pub m: Option<usize>,
    /// Number of hash tables.
    pub l: usize,
    /// Bucket width.
    pub w: f64,
    /// Number of tables two instances must share a bucket in to be
    /// near-duplicates.
    pub st: usize,
    /// Seed of the PRNG drawing the projections.
    pub seed: u64,
    /// Maximum number of instances visited in a class before the scan
    /// window is restarted.
    pub restart_window: usize,
}

impl Default for DrlshParams {
    fn default() -> DrlshParams {
        DrlshParams {
            m: None,
            l: 30,
            w: 1.,
            st: 6,
            seed: 0,
            restart_window: 2000,
        }
    }
}

impl DrlshParams {
    fn check(&self) -> LearningResult<()> {
        if !(self.w > 0.) || !self.w.is_finite() {
            return Err(Error::invalid(format!("bucket width must be positive, got {}", self.w)));
        }
        if self.l == 0 {
            return Err(Error::invalid("at least one hash table is needed"));
        }
        if self.m == Some(0) {
            return Err(Error::invalid("at least one projection per table is needed"));
        }

        Ok(())
    }
}

/// Default number of projections per table for `n` instances:
/// floor(n^(1/7)), and at least 1.
fn auto_projections(n: usize) -> usize {
    ((n as f64).powf(1. / 7.).floor() as usize).max(1)
}

/// Largest number of projection coefficients (`M*L*D`) drawn by a fit.
const MAX_PROJECTION_ELEMENTS: usize = 1 << 27;

/// Random projections `a` and offsets `b` of all tables.
///
/// Rows `t*m..(t+1)*m` of `vectors` (and the respective `offsets`)
/// belong to table `t`.
struct Projections {
    vectors: Array2<f64>,
    offsets: Array1<f64>,
    m: usize,
    w: f64,
}

impl Projections {
    /// Draws `m*l` projection vectors of dimension `d`, then `m*l`
    /// offsets.
    fn sample<R: Rng>(m: usize, l: usize, d: usize, w: f64, rng: &mut R)
            -> LearningResult<Projections> {
        let rows = m.checked_mul(l)
                    .filter(|rows| rows.checked_mul(d)
                                       .map_or(false, |n| n <= MAX_PROJECTION_ELEMENTS))
                    .ok_or_else(|| Error::invalid(format!("{}x{}x{} projection matrix is too large",
                                                          m, l, d)))?;
        let normal = Normal::new(0., 1.)
                            .map_err(|e| Error::invalid(format!("{}", e)))?;

        let vectors = Array::from_shape_fn((rows, d), |_| rng.sample(&normal));
        let offsets = Array::from_shape_fn(rows, |_| w * rng.gen::<f64>());

        Ok(Projections { vectors: vectors, offsets: offsets, m: m, w: w })
    }

    fn tables(&self) -> usize {
        self.vectors.nrows() / self.m
    }

    /// Hashes every row of `inputs` into every table.
    ///
    /// Returns a `(n, l)` matrix whose element `[i, t]` is the bucket
    /// id of instance `i` in table `t`.
    fn buckets(&self, inputs: &ArrayView2<f64>) -> Array2<usize> {
        let mut buckets = Array2::<usize>::zeros((inputs.nrows(), self.tables()));

        for t in 0..self.tables() {
            let vectors = self.vectors.slice(s![t*self.m..(t+1)*self.m, ..]);
            let mut projected = inputs.dot(&vectors.t());
            projected += &self.offsets.slice(s![t*self.m..(t+1)*self.m]);

            let signatures = projected.mapv(|v| (v / self.w).floor() as i64);
            let ids = bucket_ids(&signatures.view());
            buckets.column_mut(t).assign(&Array::from(ids));
        }

        buckets
    }
}

/// Maps each row of a signature matrix to a dense bucket id.
///
/// Ids follow the lexicographic order of the distinct signatures.
fn bucket_ids(signatures: &ArrayView2<i64>) -> Vec<usize> {
    let mut ids = signatures.outer_iter()
                            .map(|s| (s.to_vec(), 0))
                            .collect::<BTreeMap<_, _>>();
    for (id, value) in ids.values_mut().enumerate() {
        *value = id;
    }

    signatures.outer_iter()
              .map(|s| ids[&s.to_vec()])
              .collect()
}

/// Number of tables in which instances `a` and `b` share a bucket.
fn agreement(buckets: &ArrayView2<usize>, a: usize, b: usize) -> usize {
    buckets.row(a)
           .iter()
           .zip(buckets.row(b).iter())
           .filter(|&(x, y)| x == y)
           .count()
}

/// Scans the members of a class, returning the ones flagged as
/// near-duplicates.
///
/// Members (ascending indices) are visited in order; each visited
/// instance flags every other instance in the window sharing a bucket
/// with it in at least `threshold` (and at least one) tables.
/// The window is restarted when a flagged instance is not past the
/// next one to visit, or after `restart_window` visits. A restart
/// drops the flagged instances and the ones before the current
/// instance; the current instance stays in the window only as a
/// comparison term.
/// Flagged instances are never visited, and are never unflagged.
fn scan_class(members: &[usize], buckets: &ArrayView2<usize>, threshold: usize,
              restart_window: usize) -> BTreeSet<usize> {
    let threshold = threshold.max(1);
    let mut removed = BTreeSet::new();
    let mut pending = BTreeSet::new();
    let mut window = members.to_vec();
    let mut cursor = 0;
    let mut visited = 0;

    while cursor < window.len() {
        let current = window[cursor];

        for &other in window.iter().filter(|&&other| other != current) {
            if agreement(buckets, current, other) >= threshold {
                trace!("DRLSH: {} is a near-duplicate of {}", other, current);
                removed.insert(other);
                pending.insert(other);
            }
        }
        visited += 1;

        let invalidated = match (pending.iter().next(), window.get(cursor + 1)) {
            (Some(first), Some(next)) => first <= next,
            _ => false,
        };

        if invalidated || visited > restart_window {
            window = window.split_off(cursor)
                           .into_iter()
                           .filter(|i| !pending.contains(i))
                           .collect();
            pending.clear();
            cursor = 1;
            visited = 0;
        } else {
            cursor += 1;
        }
    }

    removed
}

/// DRLSH prototype selector.
///
/// The projections are drawn from a `Pcg32` seeded at each `fit()`
/// with `params.seed`, so that selections are reproducible.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use prototype_world::selection::*;
///
/// let inputs = array![[0., 0.],
///                     [0., 0.],
///                     [1., 1.],
///                     [1., 1.]];
/// let targets = array![0, 0, 1, 1];
///
/// let mut drlsh = DRLSH::new(DrlshParams { l: 4, st: 4, ..Default::default() });
/// drlsh.fit(&inputs.view(), &targets.view()).unwrap();
/// // Duplicates always collide: the later copy is dropped.
/// assert_eq!(drlsh.sample_indices().unwrap(), &[0, 2]);
/// ```
pub struct DRLSH {
    params: DrlshParams,
    n_projections: Option<usize>,
    sample_indices: Option<Vec<usize>>,
}

impl DRLSH {
    /// Constructs a DRLSH selector.
    pub fn new(params: DrlshParams) -> DRLSH {
        DRLSH {
            params: params,
            n_projections: None,
            sample_indices: None,
        }
    }

    /// Parameters of this selector.
    pub fn params(&self) -> &DrlshParams {
        &self.params
    }

    /// Number of projections per table used by the last `fit()`.
    pub fn n_projections(&self) -> Option<usize> {
        self.n_projections
    }

    /// Runs the selection with given projections.
    fn select<L>(&self, scaled: &ArrayView2<f64>, targets: &ArrayView1<L>,
                 projections: &Projections) -> Vec<usize>
            where L: Clone + Ord + Debug {
        let buckets = projections.buckets(scaled);

        let mut removed = BTreeSet::new();
        for (y, members) in split_indices(targets) {
            let flagged = scan_class(&members, &buckets.view(), self.params.st,
                                     self.params.restart_window);
            debug!("DRLSH: class {:?}, {} of {} flagged", y, flagged.len(), members.len());
            removed.extend(flagged);
        }

        (0..targets.len()).filter(|i| !removed.contains(i))
                          .collect()
    }
}

impl Default for DRLSH {
    fn default() -> DRLSH {
        DRLSH::new(DrlshParams::default())
    }
}

impl PrototypeSelector for DRLSH {
    fn fit<L>(&mut self, inputs: &ArrayView2<f64>, targets: &ArrayView1<L>)
            -> LearningResult<()> where L: Clone + Ord + Debug {
        self.sample_indices = None;
        self.n_projections = None;

        check_dataset(inputs, targets)?;
        self.params.check()?;

        let DrlshParams { m, l, w, seed, .. } = self.params;
        let m = m.unwrap_or_else(|| auto_projections(inputs.nrows()));

        debug!("DRLSH: M={}, L={}, W={}, ST={}, {} instances", m, l, w,
               self.params.st, inputs.nrows());

        let mut rng = Pcg32::seed_from_u64(seed);
        let projections = Projections::sample(m, l, inputs.ncols(), w, &mut rng)?;

        let scaled = min_max_scale(inputs);
        let selected = self.select(&scaled.view(), targets, &projections);

        debug!("DRLSH: retained {} of {} instances", selected.len(), inputs.nrows());

        self.n_projections = Some(m);
        self.sample_indices = Some(selected);

        Ok(())
    }

    fn sample_indices(&self) -> LearningResult<&[usize]> {
        fitted(&self.sample_indices)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn projections(vectors: Array2<f64>, offsets: Array1<f64>, m: usize, w: f64)
            -> Projections {
        Projections { vectors: vectors, offsets: offsets, m: m, w: w }
    }

    #[test]
    fn auto_m() {
        assert_eq!(auto_projections(1), 1);
        assert_eq!(auto_projections(100), 1);
        assert_eq!(auto_projections(200), 2);
        assert_eq!(auto_projections(5000), 3);
    }

    #[test]
    fn dense_bucket_ids() {
        let signatures = array![[1, 0],
                                [-2, 5],
                                [1, 0],
                                [1, -1]];

        assert_eq!(bucket_ids(&signatures.view()), vec![2, 0, 2, 1]);
    }

    /// floor((a x + b) / w) for two tables of two projections each.
    #[test]
    fn hashing() {
        let p = projections(array![[1., 0.],
                                   [0., 1.],
                                   [2., 0.],
                                   [0., 0.]],
                            array![0., 0.5, 0., 0.],
                            2, 1.);
        let inputs = array![[0.2, 0.2],
                            [0.4, 0.6],
                            [0.6, 0.4]];

        // Table 0 signatures: [0, 0], [0, 1], [0, 0].
        // Table 1 signatures: [0, 0], [0, 0], [1, 0].
        let buckets = p.buckets(&inputs.view());
        assert_eq!(buckets, array![[0, 0],
                                   [1, 0],
                                   [0, 1]]);
        assert_eq!(agreement(&buckets.view(), 0, 2), 1);
        assert_eq!(agreement(&buckets.view(), 0, 1), 1);
        assert_eq!(agreement(&buckets.view(), 1, 2), 0);
    }

    /// Two near-duplicates of class 0 at 0.0 and 0.01, every other
    /// point at least 1.0 apart: only the later duplicate is dropped.
    ///
    /// The single projection is fixed to `a = 10`, `b = 0.5` so that
    /// the outcome does not depend on the seed: with a standard normal
    /// `a`, the well-separated points may collide too.
    #[test]
    fn near_duplicates() {
        let inputs = array![[0.], [0.01], [1.], [2.], [3.], [4.]];
        let targets = array![0, 0, 1, 0, 1, 0];
        let drlsh = DRLSH::new(DrlshParams { m: Some(1), l: 1, w: 1., st: 1,
                                             ..Default::default() });
        // Scaled inputs 0, 0.0025, 0.25, ..., 1 land in buckets
        // 0, 0, 3, 5, 8, 10.
        let p = projections(array![[10.]], array![0.5], 1, 1.);

        let scaled = min_max_scale(&inputs.view());
        let selected = drlsh.select(&scaled.view(), &targets.view(), &p);

        assert_eq!(selected, vec![0, 2, 3, 4, 5]);
    }

    /// With ST=1 a single shared bucket is enough; with ST > L nothing
    /// is ever removed.
    #[test]
    fn threshold_boundary() {
        // Table 0 puts everyone together, table 1 separates everyone.
        let buckets = array![[0, 0],
                             [0, 1],
                             [0, 2],
                             [0, 3]];
        let members = [0, 1, 2, 3];

        let removed = scan_class(&members, &buckets.view(), 1, 2000);
        assert_eq!(removed.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);

        let removed = scan_class(&members, &buckets.view(), 2, 2000);
        assert!(removed.is_empty());

        let removed = scan_class(&members, &buckets.view(), 3, 2000);
        assert!(removed.is_empty());
    }

    #[test]
    fn single_member_class() {
        let buckets = array![[0, 0, 0]];
        assert!(scan_class(&[0], &buckets.view(), 1, 2000).is_empty());
    }

    /// A flag on the next instance to visit restarts the window.
    #[test]
    fn window_restarts() {
        // 0 ~ 2, 1 ~ 3, 1 ~ 0.
        let buckets = array![[0, 0],
                             [1, 0],
                             [0, 5],
                             [1, 6]];
        let members = [0, 1, 2, 3];

        // ST=1: visiting 0 flags 1 and 2, 1 is next: restart with
        // window [0, 3]. Visiting 3 flags nothing else (3 and 0 share
        // no bucket).
        let removed = scan_class(&members, &buckets.view(), 1, 2000);
        assert_eq!(removed.into_iter().collect::<Vec<_>>(), vec![1, 2]);

        // ST=2 never holds: nothing is removed.
        assert!(scan_class(&members, &buckets.view(), 2, 2000).is_empty());
    }

    /// A flag beyond the next instance to visit does not restart the
    /// window until the scan reaches it.
    #[test]
    fn deferred_restart() {
        // Only 0 and 2 collide.
        let buckets = array![[0], [1], [0]];
        let members = [0, 1, 2];

        // Visiting 0 flags 2 (not next): no restart. Visiting 1 flags
        // nothing, and 2 is pending and next: restart, window [1].
        let removed = scan_class(&members, &buckets.view(), 1, 2000);
        assert_eq!(removed.into_iter().collect::<Vec<_>>(), vec![2]);

        // A window restarted at every visit behaves the same.
        let removed = scan_class(&members, &buckets.view(), 1, 0);
        assert_eq!(removed.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn invalid_params() {
        let inputs = array![[0.], [1.]];
        let targets = array![0, 1];

        for params in &[DrlshParams { w: 0., ..Default::default() },
                        DrlshParams { w: -1., ..Default::default() },
                        DrlshParams { w: f64::NAN, ..Default::default() },
                        DrlshParams { l: 0, ..Default::default() },
                        DrlshParams { m: Some(0), ..Default::default() }] {
            let mut drlsh = DRLSH::new(*params);
            match drlsh.fit(&inputs.view(), &targets.view()) {
                Err(Error::InvalidInput(_)) => {},
                other => panic!("unexpected result {:?}", other),
            }
            assert_eq!(drlsh.sample_indices(), Err(Error::Untrained));
        }

        let mut rng = Pcg32::seed_from_u64(0);
        assert!(Projections::sample(usize::MAX, 2, 1, 1., &mut rng).is_err());
        assert!(Projections::sample(2, 2, usize::MAX / 2, 1., &mut rng).is_err());
        // No overflow, but far too many coefficients to allocate.
        assert!(Projections::sample(1, 1_000_000_000, 1, 1., &mut rng).is_err());
    }

    #[test]
    fn seeded_projections() {
        let mut rng1 = Pcg32::seed_from_u64(0);
        let mut rng2 = Pcg32::seed_from_u64(0);
        let p1 = Projections::sample(3, 4, 2, 2., &mut rng1).unwrap();
        let p2 = Projections::sample(3, 4, 2, 2., &mut rng2).unwrap();

        assert_eq!(p1.vectors.dim(), (12, 2));
        assert_eq!(p1.tables(), 4);
        assert_eq!(p1.vectors, p2.vectors);
        assert_eq!(p1.offsets, p2.offsets);
        assert!(p1.offsets.iter().all(|&b| b >= 0. && b < 2.));
    }
}
