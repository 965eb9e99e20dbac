//! Nearest-centroid cluster assignment from a fitted scaler + k-means artifact.
//!
//! Artifact layout (JSON):
//! `{"scaler": {"mean": [8 floats], "scale": [8 floats]}, "centroids": [[8 floats], ...]}`

use super::ClusterPredictor;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Scaler {
    /// Standardize one row; a zero scale is treated as 1.
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / if *s == 0.0 { 1.0 } else { *s })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeansClusterer {
    pub scaler: Scaler,
    pub centroids: Vec<Vec<f64>>,
}

impl KMeansClusterer {
    pub fn new(scaler: Scaler, centroids: Vec<Vec<f64>>) -> Result<Self> {
        let model = Self { scaler, centroids };
        model.check_shape()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ModelUnavailable(format!(
                "cluster model not found at {}",
                path.display()
            )));
        }
        let data = std::fs::read_to_string(path)?;
        let model: KMeansClusterer = serde_json::from_str(&data)
            .map_err(|e| Error::ModelUnavailable(format!("{}: {e}", path.display())))?;
        model.check_shape()?;
        Ok(model)
    }

    pub fn cluster_count(&self) -> usize {
        self.centroids.len()
    }

    fn check_shape(&self) -> Result<()> {
        let ok = self.scaler.mean.len() == 8
            && self.scaler.scale.len() == 8
            && !self.centroids.is_empty()
            && self.centroids.iter().all(|c| c.len() == 8);
        if ok {
            Ok(())
        } else {
            Err(Error::ModelUnavailable(
                "cluster model must have 8-wide scaler and centroids".to_string(),
            ))
        }
    }
}

impl ClusterPredictor for KMeansClusterer {
    fn predict(&self, input: &[f64; 8]) -> Result<i64> {
        let scaled = self.scaler.transform(input);
        if scaled.iter().any(|v| !v.is_finite()) {
            return Err(Error::ModelOutput("non-finite cluster input".to_string()));
        }
        let mut best = 0usize;
        let mut best_dist = f64::INFINITY;
        for (i, c) in self.centroids.iter().enumerate() {
            let d: f64 = scaled.iter().zip(c).map(|(a, b)| (a - b).powi(2)).sum();
            if d < best_dist {
                best = i;
                best_dist = d;
            }
        }
        Ok(best as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> KMeansClusterer {
        KMeansClusterer::new(
            Scaler {
                mean: vec![10.0; 8],
                scale: vec![2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 0.0, 2.0],
            },
            vec![vec![0.0; 8], vec![5.0; 8], vec![20.0; 8]],
        )
        .unwrap()
    }

    #[test]
    fn picks_nearest_scaled_centroid() {
        let m = model();
        assert_eq!(m.predict(&[10.0; 8]).unwrap(), 0);
        // (20 - 10) / 2 = 5 on scaled columns, zero-scale column uses 1
        assert_eq!(m.predict(&[20.0, 20.0, 20.0, 20.0, 20.0, 20.0, 15.0, 20.0]).unwrap(), 1);
        assert_eq!(m.predict(&[60.0; 8]).unwrap(), 2);
    }

    #[test]
    fn rejects_wrong_width() {
        let err = KMeansClusterer::new(
            Scaler {
                mean: vec![0.0; 7],
                scale: vec![1.0; 7],
            },
            vec![vec![0.0; 7]],
        )
        .unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }

    #[test]
    fn missing_artifact_is_unavailable() {
        let err = KMeansClusterer::load(Path::new("nonexistent-kmeans.json")).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }
}
