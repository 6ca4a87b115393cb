//! Command-line surface over the generator

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use minimap_core::ClassDictionary;
use minimap_gen::{ErrorPolicy, Generator, GeneratorConfig};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "minimap", version, about = "Synthetic minimap dataset generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate image/label pairs
    Generate(GenerateArgs),
    /// Copy portraits out of a scraped asset tree and build the class dictionary
    PreparePortraits {
        #[arg(long)]
        source: PathBuf,
        #[arg(long)]
        dest: PathBuf,
        /// Also write the dictionary as JSON
        #[arg(long)]
        classes_file: Option<PathBuf>,
    },
    /// Build the class dictionary from a portrait directory
    Classes {
        #[arg(long)]
        portraits: PathBuf,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// JSON configuration file; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub scenes: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Log and skip scenes that fail instead of aborting the batch
    #[arg(long)]
    pub skip_failed: bool,
    #[arg(long)]
    pub classes_file: Option<PathBuf>,
}

impl GenerateArgs {
    pub fn into_config(self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };

        if let Some(scenes) = self.scenes {
            config.scenes = scenes;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if self.skip_failed {
            config.error_policy = ErrorPolicy::Skip;
        }
        if let Some(classes_file) = self.classes_file {
            config.classes_file = Some(classes_file);
        }

        Ok(config)
    }
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate(args) => {
            let config = args.into_config()?;
            let generator = Generator::new(config).context("Failed to set up generator")?;
            let summary = generator.run()?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::PreparePortraits {
            source,
            dest,
            classes_file,
        } => {
            let dictionary = ClassDictionary::prepare_portraits(&source, &dest)?;
            if let Some(path) = classes_file {
                dictionary.save_json(path)?;
            }
        }
        Command::Classes { portraits, out } => {
            let dictionary = ClassDictionary::from_dir(&portraits)?;
            match out {
                Some(path) => dictionary.save_json(path)?,
                None => println!("{}", serde_json::to_string_pretty(&dictionary)?),
            }
        }
    }

    Ok(())
}
