//! Batch generator
//!
//! Loads every shared input once, then produces independent scenes. Scene `i`
//! draws from its own RNG seeded from the batch seed, so any scene can be
//! reproduced on its own and scenes can run in parallel.

use super::config::{ErrorPolicy, GeneratorConfig};
use crate::bbox::SceneObjects;
use crate::catalog::{AssetCatalog, CatalogManifest};
use crate::compose::SceneComposer;
use crate::effects::{ResolutionDegrader, VisibilityMask};
use crate::export::{LabelExporter, LabelRecord, SceneWriter, WrittenScene};
use crate::traits::PostProcess;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use image::RgbaImage;
use minimap_core::{ClassDictionary, LayoutSpec, MinimapError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// A fully processed scene, not yet written
#[derive(Debug, Clone)]
pub struct RenderedScene {
    pub canvas: RgbaImage,
    pub objects: SceneObjects,
    pub labels: Vec<LabelRecord>,
}

impl RenderedScene {
    pub fn label_text(&self) -> String {
        self.labels.iter().map(|record| format!("{record}\n")).collect()
    }
}

/// A scene persisted to the output directory
#[derive(Debug, Clone)]
pub struct GeneratedScene {
    pub index: usize,
    pub written: WrittenScene,
    pub object_count: usize,
    pub label_count: usize,
}

/// Batch outcome
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub requested: usize,
    pub written: usize,
    pub skipped: usize,
    pub labels: usize,
    pub base_seed: u64,
    pub processing_time_ms: u64,
}

pub struct Generator {
    config: GeneratorConfig,
    base_map: RgbaImage,
    layout: LayoutSpec,
    catalog: AssetCatalog,
    dictionary: ClassDictionary,
    exporter: LabelExporter,
    writer: SceneWriter,
    effects: Vec<Box<dyn PostProcess + Send + Sync>>,
    base_seed: u64,
}

impl Generator {
    /// Load and cross-check every input; nothing is generated yet
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;

        if !config.base_map.is_file() {
            return Err(MinimapError::MissingAsset {
                key: "base_map".to_string(),
                path: config.base_map.clone(),
            }
            .into());
        }
        let base_map = ImageUtils::load_rgba(&config.base_map)?;
        let layout = LayoutSpec::load(&config.layout_file)?;

        let manifest = match &config.catalog_manifest {
            Some(path) => CatalogManifest::load(path)?,
            None => CatalogManifest::default(),
        };
        let catalog = AssetCatalog::build(&config.icons_dir, &config.portraits_dir, manifest)?;

        let dictionary = ClassDictionary::from_dir(&config.portraits_dir)?;
        if dictionary.is_empty() {
            return Err(MinimapError::EmptyDictionary)
                .with_context(|| format!("No portraits found in {:?}", config.portraits_dir));
        }
        if let Some(path) = &config.classes_file {
            dictionary.save_json(path)?;
        }

        let effects: Vec<Box<dyn PostProcess + Send + Sync>> = vec![
            Box::new(VisibilityMask::new(config.composer.fog.clone())),
            Box::new(ResolutionDegrader::new(config.composer.degrade_scale)?),
        ];

        let writer = SceneWriter::new(&config.output_dir)?;
        let exporter = LabelExporter::new(&config.ignore_labels);
        let base_seed = config.seed.unwrap_or_else(rand::random);

        let generator = Self {
            config,
            base_map,
            layout,
            catalog,
            dictionary,
            exporter,
            writer,
            effects,
            base_seed,
        };
        // Surface layout/catalog mismatches before the first scene
        generator.composer()?;

        Ok(generator)
    }

    pub fn dictionary(&self) -> &ClassDictionary {
        &self.dictionary
    }

    pub fn layout(&self) -> &LayoutSpec {
        &self.layout
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    pub fn scene_seed(&self, index: usize) -> u64 {
        self.base_seed ^ (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    pub fn composer(&self) -> Result<SceneComposer<'_>> {
        SceneComposer::new(
            &self.base_map,
            &self.layout,
            &self.catalog,
            &self.dictionary,
            &self.config.composer,
        )
    }

    /// Compose, post-process and label one scene without writing it
    pub fn render(&self, composer: &SceneComposer<'_>, rng: &mut StdRng) -> Result<RenderedScene> {
        let mut scene = composer.compose(rng)?;

        for effect in &self.effects {
            effect
                .apply(&mut scene.canvas, &scene.objects)
                .with_context(|| format!("Post-process '{}' failed", effect.name()))?;
        }

        log::debug!("Composed scene objects: {:?}", scene.objects.label_counts());

        let (width, height) = scene.canvas.dimensions();
        let labels = self.exporter.records(&scene.objects, width, height, &self.dictionary)?;

        Ok(RenderedScene {
            canvas: scene.canvas,
            objects: scene.objects,
            labels,
        })
    }

    pub fn generate_scene(
        &self,
        composer: &SceneComposer<'_>,
        index: usize,
    ) -> Result<GeneratedScene> {
        let mut rng = StdRng::seed_from_u64(self.scene_seed(index));
        let rendered = self.render(composer, &mut rng)?;
        let written = self.writer.write(&rendered.canvas, &rendered.label_text(), &mut rng)?;

        log::debug!(
            "Scene {} -> {} ({} objects, {} labels)",
            index,
            written.id,
            rendered.objects.len(),
            rendered.labels.len()
        );

        Ok(GeneratedScene {
            index,
            written,
            object_count: rendered.objects.len(),
            label_count: rendered.labels.len(),
        })
    }

    /// Generate the configured number of scenes
    pub fn run(&self) -> Result<BatchSummary> {
        let start_time = Instant::now();
        let composer = self.composer()?;
        let requested = self.config.scenes;
        let done = AtomicUsize::new(0);

        log::info!(
            "Generating {} scenes into {:?} (seed {}, on error: {:?})",
            requested,
            self.writer.output_dir(),
            self.base_seed,
            self.config.error_policy
        );

        let attempt = |index: usize| -> Result<Option<GeneratedScene>> {
            let outcome = self.generate_scene(&composer, index);
            self.report_progress(done.fetch_add(1, Ordering::Relaxed) + 1, requested);

            match (outcome, self.config.error_policy) {
                (Ok(scene), _) => Ok(Some(scene)),
                (Err(e), ErrorPolicy::Skip) => {
                    log::warn!("Skipping scene {}: {:#}", index, e);
                    Ok(None)
                }
                (Err(e), ErrorPolicy::Abort) => {
                    Err(e.context(format!("Scene {index} failed, aborting batch")))
                }
            }
        };

        #[cfg(feature = "parallel")]
        let outcomes: Vec<Option<GeneratedScene>> = {
            use rayon::prelude::*;
            (0..requested).into_par_iter().map(attempt).collect::<Result<_>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<Option<GeneratedScene>> =
            (0..requested).map(attempt).collect::<Result<_>>()?;

        let generated: Vec<GeneratedScene> = outcomes.into_iter().flatten().collect();
        let summary = BatchSummary {
            requested,
            written: generated.len(),
            skipped: requested - generated.len(),
            labels: generated.iter().map(|scene| scene.label_count).sum(),
            base_seed: self.base_seed,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        log::info!(
            "Generated {} of {} scenes ({} skipped, {} labels) in {}ms",
            summary.written,
            summary.requested,
            summary.skipped,
            summary.labels,
            summary.processing_time_ms
        );

        Ok(summary)
    }

    fn report_progress(&self, done: usize, requested: usize) {
        let every = self.config.progress_every;
        if every > 0 && (done % every == 0 || done == requested) {
            log::info!("Progress: {}/{} scenes", done, requested);
        }
    }
}
