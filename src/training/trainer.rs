//! One-shot offline training
//!
//! Fits the encoders and the random forest from the decided matches of a
//! store and packages them as a serving bundle.

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::data::MatchStore;
use crate::features::{AttributeVector, EncoderRegistry, Field};
use crate::model::{ForestConfig, RandomForest};
use crate::predict::bundle::{BundleMetadata, ServingBundle};
use crate::training::metrics::{Metrics, TrainingReport};
use crate::{CricketError, Result, TrainingConfig};

/// Trainer for the outcome classifier
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Trainer { config }
    }

    /// Train on the store's decided matches
    pub fn train(&self, store: &MatchStore) -> Result<(ServingBundle, TrainingReport)> {
        let decided: Vec<_> = store.decided().cloned().collect();
        log::info!(
            "Training on {} decided matches ({} undecided skipped)",
            decided.len(),
            store.len() - decided.len()
        );

        let registry = EncoderRegistry::fit(&decided)?;
        let winners = registry.get(Field::Winner)?;
        if winners.len() < 2 {
            return Err(CricketError::InsufficientData {
                classes: winners.len(),
            });
        }

        let mut x = Vec::with_capacity(decided.len());
        let mut y = Vec::with_capacity(decided.len());
        for record in &decided {
            x.push(AttributeVector::from_match(&registry, record)?.as_slice().to_vec());
            let winner = record.winner.as_deref().unwrap_or_default();
            y.push(registry.encode(Field::Winner, winner)?);
        }

        let (train_idx, test_idx) =
            split_indices(x.len(), self.config.test_fraction, self.config.seed);
        let (x_train, y_train) = select(&x, &y, &train_idx);
        let (x_test, y_test) = select(&x, &y, &test_idx);
        log::info!(
            "Split: {} train / {} test (seed {})",
            x_train.len(),
            x_test.len(),
            self.config.seed
        );

        let forest_config = ForestConfig::from(&self.config);
        let domains = registry.input_domains()?;
        let forest = RandomForest::fit(&x_train, &y_train, &domains, winners.len(), &forest_config)?;

        let report = TrainingReport {
            train: evaluate(&forest, &x_train, &y_train)?,
            test: evaluate(&forest, &x_test, &y_test)?,
            n_classes: winners.len(),
            decided_matches: decided.len(),
        };
        log::info!("{}", report);

        let metadata = BundleMetadata {
            trained_at: Utc::now(),
            train_samples: x_train.len(),
            test_samples: x_test.len(),
            train_accuracy: report.train.accuracy(),
            test_accuracy: report.test.accuracy(),
            seed: self.config.seed,
        };
        let bundle = ServingBundle::new(registry, forest, metadata)?;

        Ok((bundle, report))
    }
}

/// Shuffled train/test split; ceil(n * test_fraction) rows are held out,
/// but at least one row always trains. Both halves keep ascending order.
pub fn split_indices(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64 * test_fraction).ceil() as usize).min(n.saturating_sub(1));
    let mut test = indices[..n_test].to_vec();
    let mut train = indices[n_test..].to_vec();
    test.sort_unstable();
    train.sort_unstable();
    (train, test)
}

fn select(x: &[Vec<u32>], y: &[u32], indices: &[usize]) -> (Vec<Vec<u32>>, Vec<u32>) {
    indices.iter().map(|&i| (x[i].clone(), y[i])).unzip()
}

fn evaluate(forest: &RandomForest, x: &[Vec<u32>], y: &[u32]) -> Result<Metrics> {
    let mut metrics = Metrics::new();
    for (sample, &label) in x.iter().zip(y) {
        metrics.update(forest.predict(sample)?, label);
    }
    Ok(metrics)
}
