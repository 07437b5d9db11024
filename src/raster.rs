//! On-disk bake engine rendering deterministic raster artifacts.
//!
//! Stands in for a host renderer in the CLI and in integration tests. A real
//! engine rasterizes the procedural source node; this one renders a
//! frame-seeded pattern, so artifacts are reproducible byte-for-byte and a
//! re-bake of the same frame yields the same image.

use image::{Rgb, RgbImage};
use log::debug;
use std::path::PathBuf;

use crate::engine::{BakeEngine, BakeJob};
use crate::error::{BakeError, BakeResult};

/// Bake engine writing one PNG per frame under the paintmaps directory.
#[derive(Debug)]
pub struct RasterBakeEngine {
    root: PathBuf,
}

impl RasterBakeEngine {
    /// `root` is the directory description roots are resolved under.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BakeEngine for RasterBakeEngine {
    fn description_root(&self, collection: &str, description: &str) -> PathBuf {
        self.root.join(collection).join(description)
    }

    fn bake(&mut self, job: &BakeJob) -> BakeResult<PathBuf> {
        let io_err = |e: std::io::Error| BakeError::BakeFailed {
            frame: job.frame,
            reason: e.to_string(),
        };

        std::fs::create_dir_all(&job.output_path).map_err(io_err)?;

        let size = job.resolution.max(1);
        let seed = job.frame as u32;
        let image = RgbImage::from_fn(size, size, |x, y| {
            // Frame-seeded gradient; any change in frame shifts every texel.
            let r = x.wrapping_add(seed.wrapping_mul(7)) & 0xff;
            let g = y.wrapping_add(seed.wrapping_mul(13)) & 0xff;
            let b = x.wrapping_add(y).wrapping_add(seed) & 0xff;
            Rgb([r as u8, g as u8, b as u8])
        });

        let path = job
            .output_path
            .join(format!("{}.{}.png", job.target_node, job.frame));
        image.save(&path).map_err(|e| BakeError::BakeFailed {
            frame: job.frame,
            reason: e.to_string(),
        })?;

        debug!(
            "baked frame {} of '{}' -> {}",
            job.frame,
            job.source_node,
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(dir: &std::path::Path, frame: i32) -> BakeJob {
        BakeJob {
            frame,
            source_node: "noise1".into(),
            target_node: "head".into(),
            resolution: 16,
            output_path: dir.to_path_buf(),
        }
    }

    #[test]
    fn test_bake_writes_named_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = RasterBakeEngine::new(dir.path());

        let path = engine.bake(&job(&dir.path().join("out"), 3)).unwrap();
        assert!(path.is_file());
        assert_eq!(path.file_name().unwrap().to_str(), Some("head.3.png"));
    }

    #[test]
    fn test_bake_is_deterministic_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = RasterBakeEngine::new(dir.path());
        let out = dir.path().join("out");

        let first = engine.bake(&job(&out, 5)).unwrap();
        let bytes_a = std::fs::read(&first).unwrap();
        let again = engine.bake(&job(&out, 5)).unwrap();
        let bytes_b = std::fs::read(&again).unwrap();
        assert_eq!(bytes_a, bytes_b);

        let other = engine.bake(&job(&out, 6)).unwrap();
        assert_ne!(bytes_a, std::fs::read(&other).unwrap());
    }

    #[test]
    fn test_description_root_layout() {
        let engine = RasterBakeEngine::new("/maps");
        assert_eq!(
            engine.description_root("col", "desc"),
            PathBuf::from("/maps/col/desc")
        );
    }
}
