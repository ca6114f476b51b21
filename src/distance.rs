//! Distance metrics between feature vectors.
use std::fmt;
use std::str::FromStr;
use ndarray::prelude::*;
use serde_derive::{Deserialize, Serialize};

use crate::error::Error;


/// A supported pairwise distance.
///
/// Metrics are (de)serialized by their lowercase name, and can be
/// parsed from a string with `str::parse()`, which also accepts the
/// aliases `l2`, `l1` and `cityblock`.
///
/// # Examples
///
/// ```
/// use prototype_world::distance::Metric;
///
/// let metric: Metric = "l1".parse().unwrap();
/// assert_eq!(metric, Metric::Manhattan);
/// assert!("mahalanobis".parse::<Metric>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Euclidean,
    Manhattan,
    Chebyshev,
    Cosine,
}

impl Default for Metric {
    fn default() -> Metric {
        Metric::Euclidean
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(name: &str) -> Result<Metric, Error> {
        match name.trim().to_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            "manhattan" | "l1" | "cityblock" => Ok(Metric::Manhattan),
            "chebyshev" => Ok(Metric::Chebyshev),
            "cosine" => Ok(Metric::Cosine),
            other => Err(Error::invalid(format!("unsupported metric `{}`", other))),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Metric::Euclidean => "euclidean",
            Metric::Manhattan => "manhattan",
            Metric::Chebyshev => "chebyshev",
            Metric::Cosine => "cosine",
        };
        write!(f, "{}", name)
    }
}

impl Metric {
    /// Returns the distance between two vectors of equal length.
    pub fn distance(&self, v1: &ArrayView1<f64>, v2: &ArrayView1<f64>) -> f64 {
        let diffs = v1.iter().zip(v2.iter()).map(|(x, y)| x - y);

        match *self {
            Metric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Metric::Manhattan => diffs.map(f64::abs).sum(),
            Metric::Chebyshev => diffs.map(f64::abs).fold(0., f64::max),
            Metric::Cosine => {
                let norm1 = v1.dot(v1).sqrt();
                let norm2 = v2.dot(v2).sqrt();
                // A zero vector has no direction: similarity 0.
                let similarity = if norm1 > 0. && norm2 > 0. {
                    v1.dot(v2) / (norm1 * norm2)
                } else {
                    0.
                };
                (1. - similarity).max(0.).min(2.)
            }
        }
    }

    /// Computes the full (symmetric) distance matrix between the rows
    /// of `inputs`.
    ///
    /// The diagonal is exactly 0 for every metric.
    pub fn pairwise(&self, inputs: &ArrayView2<f64>) -> Array2<f64> {
        let n = inputs.nrows();
        let mut distances = Array2::<f64>::zeros((n, n));

        for i in 0..n {
            for j in (i+1)..n {
                let d = self.distance(&inputs.row(i), &inputs.row(j));
                distances[[i, j]] = d;
                distances[[j, i]] = d;
            }
        }

        distances
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn metrics() {
        let a = array![0., 0.];
        let b = array![3., 4.];

        assert_abs_diff_eq!(Metric::Euclidean.distance(&a.view(), &b.view()), 5.);
        assert_abs_diff_eq!(Metric::Manhattan.distance(&a.view(), &b.view()), 7.);
        assert_abs_diff_eq!(Metric::Chebyshev.distance(&a.view(), &b.view()), 4.);
        // Zero vector against anything.
        assert_abs_diff_eq!(Metric::Cosine.distance(&a.view(), &b.view()), 1.);

        let c = array![1., 0.];
        let d = array![0., 2.];
        let e = array![-3., 0.];
        assert_abs_diff_eq!(Metric::Cosine.distance(&c.view(), &d.view()), 1.);
        assert_abs_diff_eq!(Metric::Cosine.distance(&c.view(), &e.view()), 2.);
        assert_abs_diff_eq!(Metric::Cosine.distance(&b.view(), &(&b * 2.).view()), 0.,
                            epsilon = 1e-12);
    }

    #[test]
    fn pairwise_is_symmetric() {
        let inputs = array![[0., 0.],
                            [1., 0.],
                            [0., 2.]];
        let distances = Metric::Euclidean.pairwise(&inputs.view());

        assert_eq!(distances.dim(), (3, 3));
        for i in 0..3 {
            assert_eq!(distances[[i, i]], 0.);
            for j in 0..3 {
                assert_eq!(distances[[i, j]], distances[[j, i]]);
            }
        }
        assert_abs_diff_eq!(distances[[1, 2]], 5f64.sqrt());
    }

    #[test]
    fn parse_names() {
        assert_eq!("euclidean".parse::<Metric>(), Ok(Metric::Euclidean));
        assert_eq!(" L2 ".parse::<Metric>(), Ok(Metric::Euclidean));
        assert_eq!("cityblock".parse::<Metric>(), Ok(Metric::Manhattan));
        assert_eq!("chebyshev".parse::<Metric>(), Ok(Metric::Chebyshev));
        assert_eq!("cosine".parse::<Metric>(), Ok(Metric::Cosine));

        match "hamming".parse::<Metric>() {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("hamming")),
            other => panic!("unexpected result {:?}", other),
        }

        for m in &[Metric::Euclidean, Metric::Manhattan, Metric::Chebyshev, Metric::Cosine] {
            assert_eq!(m.to_string().parse::<Metric>(), Ok(*m));
        }
    }

    #[test]
    fn deserialize_by_name() {
        use serde::de::IntoDeserializer;
        use serde::de::value::{Error as ValueError, StrDeserializer};
        use serde::Deserialize;

        let de: StrDeserializer<ValueError> = "chebyshev".into_deserializer();
        assert_eq!(Metric::deserialize(de).ok(), Some(Metric::Chebyshev));

        let de: StrDeserializer<ValueError> = "l2".into_deserializer();
        assert!(Metric::deserialize(de).is_err());
    }
}
