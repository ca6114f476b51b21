//! The prototype-world crate.
//!
//! A crate implementing prototype selection (instance reduction)
//! methods: they reduce a labeled training set to a subset of
//! "prototypes" that preserves the decision behavior of a
//! nearest-neighbor classifier, which speeds up and compresses k-NN
//! inference.
//!
//! # Goals
//! * Fast implementation of instance-reduction algorithms sharing a
//!   common fit/transform contract (`PrototypeSelector`).
//! * Reproducible selections: randomized methods are seeded explicitly.
//!
//! Available selectors:
//! * `DRLSH`: near-duplicate removal via random-projection hashing.
//! * `ICF`: Iterative Case Filtering, driven by coverage and
//!   reachability of each instance.
//! * `ENN`: Edited Nearest Neighbor, which ICF uses as a pre-filter.
//!
//! # Examples
//!
//! Reduce a dataset with ICF (ENN pre-filter with `k=1`), and retrieve
//! both the retained indices and the reduced dataset.
//!
//! ```
//! use ndarray::array;
//! use prototype_world::selection::*;
//!
//! let inputs = array![[0.], [1.], [2.], [3.], [4.5], [5.5], [6.5], [7.5]];
//! let targets = array!["a", "a", "a", "a", "b", "b", "b", "b"];
//!
//! let mut icf = ICF::new(1);
//! let (reduced_inputs, reduced_targets) = icf.fit_transform(&inputs.view(),
//!                                                           &targets.view())
//!                                            .expect("Failed to reduce");
//!
//! assert_eq!(icf.sample_indices().unwrap(), &[2, 3, 4, 5]);
//! assert_eq!(reduced_inputs, array![[2.], [3.], [4.5], [5.5]]);
//! assert_eq!(reduced_targets, array!["a", "a", "b", "b"]);
//! ```
//!
//! More examples at [DRLSH](selection/drlsh/struct.DRLSH.html) and
//! [ENN](selection/enn/struct.ENN.html).
//#![warn(missing_docs)]

pub mod distance;
pub mod error;
pub mod selection;
pub mod utils;

pub use crate::error::{Error, LearningResult};
