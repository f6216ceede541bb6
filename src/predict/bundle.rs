//! Serving bundle: trained encoders + classifier, loaded once and read-only

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::{EncoderRegistry, Field};
use crate::model::RandomForest;
use crate::{CricketError, Result};

/// Provenance of a trained bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    pub trained_at: DateTime<Utc>,
    pub train_samples: usize,
    pub test_samples: usize,
    pub train_accuracy: Option<f64>,
    pub test_accuracy: Option<f64>,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingBundle {
    encoders: EncoderRegistry,
    model: RandomForest,
    metadata: BundleMetadata,
}

impl ServingBundle {
    pub fn new(
        encoders: EncoderRegistry,
        model: RandomForest,
        metadata: BundleMetadata,
    ) -> Result<Self> {
        let bundle = ServingBundle {
            encoders,
            model,
            metadata,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    /// Encoders and model must describe the same code spaces
    fn validate(&self) -> Result<()> {
        self.encoders.validate()?;
        self.model.validate()?;

        let domains = self.encoders.input_domains()?;
        if domains != self.model.domains() {
            return Err(CricketError::ShapeMismatch(format!(
                "encoder domains {:?} differ from model domains {:?}",
                domains,
                self.model.domains()
            )));
        }

        let winners = self.encoders.get(Field::Winner)?.len();
        if winners != self.model.n_classes() {
            return Err(CricketError::ShapeMismatch(format!(
                "winner encoder has {} classes, model has {}",
                winners,
                self.model.n_classes()
            )));
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        log::info!("Saved model bundle to {}", path.display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CricketError::NoModel);
        }
        let reader = BufReader::new(File::open(path)?);
        let bundle: ServingBundle = serde_json::from_reader(reader)?;
        bundle.validate()?;
        log::debug!(
            "Loaded model bundle from {} ({} trees, trained {})",
            path.display(),
            bundle.model.n_trees(),
            bundle.metadata.trained_at
        );
        Ok(bundle)
    }

    pub fn encoders(&self) -> &EncoderRegistry {
        &self.encoders
    }

    pub fn model(&self) -> &RandomForest {
        &self.model
    }

    pub fn metadata(&self) -> &BundleMetadata {
        &self.metadata
    }
}
