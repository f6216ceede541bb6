//! Random forest classifier
//!
//! Bagged CART trees with per-node feature sampling. Every tree draws its own
//! seed from the master seed before any tree is grown, so the fitted forest is
//! the same whether trees are built sequentially or in parallel.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::tree::{DecisionTree, TreeConfig};
use crate::{CricketError, Result, TrainingConfig};

/// Fixed training hyperparameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        ForestConfig {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl From<&TrainingConfig> for ForestConfig {
    fn from(config: &TrainingConfig) -> Self {
        ForestConfig {
            n_estimators: config.n_estimators,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            max_features: config.max_features,
            bootstrap: config.bootstrap,
            seed: config.seed,
        }
    }
}

impl ForestConfig {
    /// Features tried per split, floor(sqrt(n)) by default
    pub fn features_per_split(&self, n_features: usize) -> usize {
        self.max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().floor() as usize)
            .clamp(1, n_features.max(1))
    }
}

/// Trained forest over fixed-width code vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    /// Number of valid codes per input position
    domains: Vec<usize>,
    n_classes: usize,
    config: ForestConfig,
}

impl RandomForest {
    /// Fit on code vectors `x` with class labels `y` in 0..n_classes
    pub fn fit(
        x: &[Vec<u32>],
        y: &[u32],
        domains: &[usize],
        n_classes: usize,
        config: &ForestConfig,
    ) -> Result<Self> {
        if x.len() != y.len() {
            return Err(CricketError::ShapeMismatch(format!(
                "{} samples but {} labels",
                x.len(),
                y.len()
            )));
        }
        for row in x {
            check_codes(row, domains)?;
        }
        if let Some(&bad) = y.iter().find(|&&label| label as usize >= n_classes) {
            return Err(CricketError::ShapeMismatch(format!(
                "label {} outside {} classes",
                bad, n_classes
            )));
        }

        let mut distinct: Vec<u32> = y.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 2 {
            return Err(CricketError::InsufficientData {
                classes: distinct.len(),
            });
        }
        if config.n_estimators == 0 {
            return Err(CricketError::Config(
                "n_estimators must be positive".to_string(),
            ));
        }

        let tree_config = TreeConfig {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            max_features: config.features_per_split(domains.len()),
        };

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let seeds: Vec<u64> = (0..config.n_estimators).map(|_| rng.gen()).collect();

        log::info!(
            "Growing {} trees on {} samples ({} classes, {} features per split)",
            config.n_estimators,
            x.len(),
            n_classes,
            tree_config.max_features
        );

        let n = x.len();
        let trees: Vec<DecisionTree> = seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let indices: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::fit(x, y, indices, n_classes, &tree_config, &mut rng)
            })
            .collect();

        log::debug!(
            "Forest depth: max {}",
            trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
        );

        Ok(RandomForest {
            trees,
            domains: domains.to_vec(),
            n_classes,
            config: config.clone(),
        })
    }

    /// Mean class distribution over all trees
    pub fn predict_proba(&self, sample: &[u32]) -> Result<Vec<f64>> {
        check_codes(sample, &self.domains)?;
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (p, q) in proba.iter_mut().zip(tree.predict_proba(sample)) {
                *p += q;
            }
        }
        let n_trees = self.trees.len().max(1) as f64;
        for p in &mut proba {
            *p /= n_trees;
        }
        Ok(proba)
    }

    /// Most probable class; ties go to the lowest class code
    pub fn predict(&self, sample: &[u32]) -> Result<u32> {
        let proba = self.predict_proba(sample)?;
        let mut best = 0;
        for (class, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = class;
            }
        }
        Ok(best as u32)
    }

    /// Fraction of samples predicted correctly
    pub fn accuracy(&self, x: &[Vec<u32>], y: &[u32]) -> Result<f64> {
        if x.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0;
        for (sample, &label) in x.iter().zip(y) {
            if self.predict(sample)? == label {
                correct += 1;
            }
        }
        Ok(correct as f64 / x.len() as f64)
    }

    /// Check every tree against the forest's input width and class count
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(CricketError::ShapeMismatch("forest has no trees".to_string()));
        }
        for tree in &self.trees {
            tree.validate(self.domains.len(), self.n_classes)?;
        }
        Ok(())
    }

    pub fn domains(&self) -> &[usize] {
        &self.domains
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

/// Vector width and every code must match the training domains
fn check_codes(sample: &[u32], domains: &[usize]) -> Result<()> {
    if sample.len() != domains.len() {
        return Err(CricketError::ShapeMismatch(format!(
            "expected {} codes, got {}",
            domains.len(),
            sample.len()
        )));
    }
    for (position, (&code, &size)) in sample.iter().zip(domains).enumerate() {
        if code as usize >= size {
            return Err(CricketError::ShapeMismatch(format!(
                "code {} at position {} outside domain of {}",
                code, position, size
            )));
        }
    }
    Ok(())
}
