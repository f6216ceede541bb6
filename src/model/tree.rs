//! CART decision tree over categorical codes
//!
//! Codes are split as ordinal values (`code <= threshold` goes left), with
//! thresholds at midpoints between adjacent observed codes and Gini impurity
//! as the split criterion. Nodes live in a flat vector; node 0 is the root.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{CricketError, Result};

/// A tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Class frequencies of the training samples that reached this leaf
        distribution: Vec<f64>,
    },
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features sampled per node
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl DecisionTree {
    /// Grow a tree on the samples at `indices` (repeats allowed, as in a bootstrap)
    pub fn fit<R: Rng>(
        x: &[Vec<u32>],
        y: &[u32],
        indices: Vec<usize>,
        n_classes: usize,
        config: &TreeConfig,
        rng: &mut R,
    ) -> Self {
        let n_features = x.first().map(Vec::len).unwrap_or(0);
        let mut builder = Builder {
            x,
            y,
            n_classes,
            n_features,
            config,
            rng,
            nodes: Vec::new(),
        };
        builder.grow(indices, 0);
        DecisionTree {
            nodes: builder.nodes,
        }
    }

    /// Class distribution of the leaf the sample falls into
    pub fn predict_proba(&self, sample: &[u32]) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if (sample[*feature] as f64) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }

    /// Check a tree read from disk before it is used for prediction
    ///
    /// Children must come after their parent, which also rules out cycles.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(CricketError::ShapeMismatch("tree has no nodes".to_string()));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(CricketError::ShapeMismatch(format!(
                            "node {} splits on feature {} of {}",
                            id, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(CricketError::ShapeMismatch(format!(
                            "node {} has threshold {}",
                            id, threshold
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= id || child >= self.nodes.len() {
                            return Err(CricketError::ShapeMismatch(format!(
                                "node {} links to node {} ({} nodes)",
                                id,
                                child,
                                self.nodes.len()
                            )));
                        }
                    }
                }
                Node::Leaf { distribution } => {
                    if distribution.len() != n_classes {
                        return Err(CricketError::ShapeMismatch(format!(
                            "leaf {} has {} classes, expected {}",
                            id,
                            distribution.len(),
                            n_classes
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn depth(&self) -> usize {
        fn depth_of(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Split { left, right, .. } => {
                    1 + depth_of(nodes, *left).max(depth_of(nodes, *right))
                }
                Node::Leaf { .. } => 0,
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            depth_of(&self.nodes, 0)
        }
    }
}

struct Builder<'a, R: Rng> {
    x: &'a [Vec<u32>],
    y: &'a [u32],
    n_classes: usize,
    n_features: usize,
    config: &'a TreeConfig,
    rng: &'a mut R,
    nodes: Vec<Node>,
}

impl<'a, R: Rng> Builder<'a, R> {
    /// Grow the subtree for `indices`, returning its node id
    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_counts(&indices);
        let id = self.nodes.len();
        self.nodes.push(leaf(&counts));

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let too_small = indices.len() < self.config.min_samples_split.max(2);
        let too_deep = self.config.max_depth.map_or(false, |d| depth >= d);
        if pure || too_small || too_deep {
            return id;
        }

        let Some(split) = self.best_split(&indices) else {
            return id;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| (self.x[i][split.feature] as f64) <= split.threshold);

        let left = self.grow(left_idx, depth + 1);
        let right = self.grow(right_idx, depth + 1);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<u32> {
        let mut counts = vec![0u32; self.n_classes];
        for &i in indices {
            counts[self.y[i] as usize] += 1;
        }
        counts
    }

    /// Visit features in random order; once `max_features` have been tried,
    /// stop at the first point where a valid split is known.
    fn best_split(&mut self, indices: &[usize]) -> Option<Candidate> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(&mut *self.rng);

        let mut best: Option<Candidate> = None;
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.config.max_features && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_split_on(feature, indices) {
                if best.map_or(true, |b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn best_split_on(&self, feature: usize, indices: &[usize]) -> Option<Candidate> {
        // code -> class counts
        let mut histogram: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for &i in indices {
            histogram
                .entry(self.x[i][feature])
                .or_insert_with(|| vec![0; self.n_classes])[self.y[i] as usize] += 1;
        }
        if histogram.len() < 2 {
            return None;
        }

        let n = indices.len() as f64;
        let mut right = self.class_counts(indices);
        let mut left = vec![0u32; self.n_classes];
        let mut best: Option<Candidate> = None;

        let values: Vec<(&u32, &Vec<u32>)> = histogram.iter().collect();
        for pair in values.windows(2) {
            let (&value, counts) = pair[0];
            let (&next, _) = pair[1];
            for (c, &k) in counts.iter().enumerate() {
                left[c] += k;
                right[c] -= k;
            }
            let n_left: u32 = left.iter().sum();
            let n_right: u32 = right.iter().sum();
            let impurity = (n_left as f64 * gini(&left, n_left)
                + n_right as f64 * gini(&right, n_right))
                / n;
            if best.map_or(true, |b| impurity < b.impurity) {
                best = Some(Candidate {
                    feature,
                    threshold: (value as f64 + next as f64) / 2.0,
                    impurity,
                });
            }
        }
        best
    }
}

fn gini(counts: &[u32], total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn leaf(counts: &[u32]) -> Node {
    let total: u32 = counts.iter().sum();
    let distribution = counts
        .iter()
        .map(|&c| if total == 0 { 0.0 } else { c as f64 / total as f64 })
        .collect();
    Node::Leaf { distribution }
}
