//! Image + label pair persistence
//!
//! Both files are written under temporary names and renamed into place,
//! image first and label last, so an interrupted batch never leaves a label
//! file whose image is missing or truncated.

use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use image::RgbaImage;
use minimap_core::MinimapError;
use rand::Rng;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const MAX_ID_ATTEMPTS: usize = 8;

/// 64-bit random scene identifier shared by the image and label file stems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

impl SceneId {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.r#gen())
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Paths of one persisted scene
#[derive(Debug, Clone)]
pub struct WrittenScene {
    pub id: SceneId,
    pub image_path: PathBuf,
    pub label_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SceneWriter {
    output_dir: PathBuf,
}

impl SceneWriter {
    /// Writer into `output_dir`, creating it when needed
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn image_path(&self, id: SceneId) -> PathBuf {
        self.output_dir.join(format!("{id}.png"))
    }

    pub fn label_path(&self, id: SceneId) -> PathBuf {
        self.output_dir.join(format!("{id}.txt"))
    }

    /// Persist one scene under a fresh identifier
    pub fn write<R: Rng + ?Sized>(
        &self,
        canvas: &RgbaImage,
        labels: &str,
        rng: &mut R,
    ) -> Result<WrittenScene> {
        let id = self.fresh_id(rng)?;
        let image_path = self.image_path(id);
        let label_path = self.label_path(id);
        let image_tmp = self.output_dir.join(format!(".{id}.png.tmp"));
        let label_tmp = self.output_dir.join(format!(".{id}.txt.tmp"));

        let staged = ImageUtils::save_png(canvas, &image_tmp).and_then(|_| {
            fs::write(&label_tmp, labels)
                .with_context(|| format!("Failed to write labels: {:?}", label_tmp))?;
            Ok(())
        });
        if let Err(e) = staged {
            let _ = fs::remove_file(&image_tmp);
            let _ = fs::remove_file(&label_tmp);
            return Err(e);
        }

        fs::rename(&image_tmp, &image_path)
            .with_context(|| format!("Failed to move image into place: {:?}", image_path))?;
        fs::rename(&label_tmp, &label_path)
            .with_context(|| format!("Failed to move labels into place: {:?}", label_path))?;

        Ok(WrittenScene {
            id,
            image_path,
            label_path,
        })
    }

    fn fresh_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SceneId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = SceneId::random(rng);
            if !self.image_path(id).exists() && !self.label_path(id).exists() {
                return Ok(id);
            }
            log::warn!("Scene id {} already taken in {:?}, drawing another", id, self.output_dir);
        }

        Err(MinimapError::InvalidConfig(format!(
            "could not find a free scene id in {:?} after {} attempts",
            self.output_dir, MAX_ID_ATTEMPTS
        ))
        .into())
    }
}
