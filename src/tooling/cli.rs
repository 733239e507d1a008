//! CLI Tooling
//!
//! Command-line interface for resolving backgrounds against an image endpoint.
//! Every command returns its rendered output as a string; the binary prints it.

use crate::background::{
    BackgroundManager, BackgroundResolver, BackgroundState, BackgroundSurface, DirectorySurface,
    FormatNegotiator, ImageCrateProbe, Legend, MemorySurface, UpdateOutcome, VariantCache,
};
use crate::config::{BackdropConfig, ConfigLoader};
use crate::constraint::{Constraint, Viewport};
use crate::error::BackdropError;
use crate::source::{select_image, HttpImageSource, ImageSource};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use futures::future::join_all;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Backdrop CLI - responsive background resolution
#[derive(Parser)]
#[command(name = "backdrop")]
#[command(about = "Resolve breakpoint-sized background images from an image endpoint")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the background for one viewport or constraint
    Resolve {
        /// Viewport size, e.g. 1280x720
        #[arg(long, conflicts_with = "constraint", required_unless_present = "constraint")]
        viewport: Option<Viewport>,
        /// Explicit constraint, e.g. portrait/736 or landscape/unbounded
        #[arg(long)]
        constraint: Option<Constraint>,
        /// Image identifier (random from the catalog when omitted)
        #[arg(long)]
        image: Option<String>,
        /// Directory to write background.{jpg,webp} and legend.json into
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Replay a sequence of viewport changes and report each update
    Simulate {
        /// Viewport sizes in order, e.g. --viewport 480x800 --viewport 736x1000
        #[arg(long = "viewport", required = true)]
        viewports: Vec<Viewport>,
        /// Image identifier (random from the catalog when omitted)
        #[arg(long)]
        image: Option<String>,
        /// Dispatch all updates at once instead of one after another
        #[arg(long)]
        concurrent: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List registered breakpoints and their media queries
    Breakpoints {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List selectable images from the catalog endpoint
    Catalog {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration as TOML
    Config,
}

/// CLI context: loaded configuration plus an image source.
pub struct CliContext {
    config: BackdropConfig,
    source: Arc<dyn ImageSource>,
}

impl CliContext {
    /// Load configuration and connect to the configured endpoint.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, BackdropError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(&path)?,
            None => ConfigLoader::load()?,
        };
        let source = Arc::new(HttpImageSource::new(&config.endpoint)?);
        Ok(Self { config, source })
    }

    /// Build a context over an arbitrary source.
    pub fn with_source(
        config: BackdropConfig,
        source: Arc<dyn ImageSource>,
    ) -> Result<Self, BackdropError> {
        config.validate()?;
        Ok(Self { config, source })
    }

    pub fn config(&self) -> &BackdropConfig {
        &self.config
    }

    /// Record the logging settings actually in effect after CLI overrides.
    pub fn set_logging(&mut self, logging: crate::logging::LoggingConfig) {
        self.config.logging = logging;
    }

    pub fn execute(&self, command: &Commands) -> Result<String, BackdropError> {
        match command {
            Commands::Breakpoints { format } => self.breakpoints(format),
            Commands::Config => toml::to_string_pretty(&self.config)
                .map_err(|e| BackdropError::Config(format!("Failed to render config: {}", e))),
            Commands::Catalog { format } => self.block_on(self.catalog(format)),
            Commands::Resolve {
                viewport,
                constraint,
                image,
                out,
                format,
            } => self.block_on(self.resolve(
                *viewport,
                *constraint,
                image.as_deref(),
                out.as_deref(),
                format,
            )),
            Commands::Simulate {
                viewports,
                image,
                concurrent,
                format,
            } => self.block_on(self.simulate(viewports, image.as_deref(), *concurrent, format)),
        }
    }

    fn block_on<F: std::future::Future<Output = Result<String, BackdropError>>>(
        &self,
        fut: F,
    ) -> Result<String, BackdropError> {
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| BackdropError::Io(format!("Failed to create runtime: {}", e)))?;
        rt.block_on(fut)
    }

    async fn manager(
        &self,
        image: Option<&str>,
        surface: Arc<dyn BackgroundSurface>,
    ) -> Result<BackgroundManager, BackdropError> {
        let identifier = select_image(image, self.source.as_ref()).await?;
        let resolver = BackgroundResolver::new(
            self.source.clone(),
            VariantCache::new(self.config.cache.capacity),
            FormatNegotiator::new(self.config.formats.modern, Arc::new(ImageCrateProbe)),
            self.config.fallback.legend(),
        );
        Ok(BackgroundManager::new(
            identifier,
            self.config.breakpoint_set()?,
            Arc::new(resolver),
            surface,
        ))
    }

    fn breakpoints(&self, format: &str) -> Result<String, BackdropError> {
        let set = self.config.breakpoint_set()?;
        if format == "json" {
            let items: Vec<_> = set
                .iter()
                .map(|b| {
                    json!({
                        "media_query": b.to_media_query(),
                        "low": b.low,
                        "constraint": b.constraint.to_string(),
                        "query": b.constraint.to_query_string(),
                    })
                })
                .collect();
            return render_json(&json!({ "breakpoints": items }));
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Media query", "Constraint", "Query"]);
        for b in set.iter() {
            table.add_row(vec![
                b.to_media_query(),
                b.constraint.to_string(),
                b.constraint.to_query_string(),
            ]);
        }
        Ok(table.to_string())
    }

    async fn catalog(&self, format: &str) -> Result<String, BackdropError> {
        let images = self.source.list_catalog().await?;
        if format == "json" {
            return render_json(&json!({ "total": images.len(), "images": images }));
        }
        Ok(images.join("\n"))
    }

    async fn resolve(
        &self,
        viewport: Option<Viewport>,
        constraint: Option<Constraint>,
        image: Option<&str>,
        out: Option<&std::path::Path>,
        format: &str,
    ) -> Result<String, BackdropError> {
        let memory = Arc::new(MemorySurface::new());
        let surface: Arc<dyn BackgroundSurface> = match out {
            Some(dir) => Arc::new(Tee {
                first: memory.clone(),
                second: Arc::new(DirectorySurface::new(dir)?),
            }),
            None => memory.clone(),
        };
        let manager = self.manager(image, surface).await?;

        let outcome = match (viewport, constraint) {
            (_, Some(c)) => manager.update_constraint(c).await?,
            (Some(v), None) => manager.handle_viewport(v).await?,
            (None, None) => {
                return Err(BackdropError::InvalidArgument(
                    "Either --viewport or --constraint is required".to_string(),
                ))
            }
        };
        info!(outcome = ?outcome, "Resolve finished");

        let legend = memory.legend().unwrap_or_else(|| self.config.fallback.legend());
        let state = manager.state();
        let stats = manager.resolver().stats();

        if format == "json" {
            return render_json(&json!({
                "image": manager.identifier(),
                "outcome": outcome,
                "state": state,
                "legend": legend,
                "fetches": stats.fetches,
            }));
        }

        let mut lines = vec![format!("Image: {}", manager.identifier())];
        match &state {
            BackgroundState::Shown { constraint, key } => {
                lines.push(format!("Constraint: {}", constraint));
                lines.push(format!("Request: {}", key));
            }
            BackgroundState::Empty => lines.push("No background for this viewport".to_string()),
            BackgroundState::Fallback => lines.push("Fallback background".to_string()),
        }
        lines.extend(legend_lines(&legend));
        if let Some(dir) = out {
            lines.push(format!("Written to: {}", dir.display()));
        }
        Ok(lines.join("\n"))
    }

    async fn simulate(
        &self,
        viewports: &[Viewport],
        image: Option<&str>,
        concurrent: bool,
        format: &str,
    ) -> Result<String, BackdropError> {
        let surface = Arc::new(MemorySurface::new());
        let manager = self.manager(image, surface.clone()).await?;

        let results: Vec<Result<UpdateOutcome, BackdropError>> = if concurrent {
            join_all(viewports.iter().map(|v| manager.handle_viewport(*v))).await
        } else {
            let mut results = Vec::with_capacity(viewports.len());
            for v in viewports {
                results.push(manager.handle_viewport(*v).await);
            }
            results
        };

        let stats = manager.resolver().stats();
        let legend = surface.legend();

        if format == "json" {
            let steps: Vec<_> = viewports
                .iter()
                .zip(&results)
                .map(|(v, r)| match r {
                    Ok(outcome) => json!({ "viewport": v.to_string(), "result": outcome }),
                    Err(e) => json!({ "viewport": v.to_string(), "error": e.to_string() }),
                })
                .collect();
            return render_json(&json!({
                "image": manager.identifier(),
                "steps": steps,
                "state": manager.state(),
                "legend": legend,
                "fetches": stats.fetches,
                "cache_hits": stats.cache.hits,
                "layers": surface.layers().len(),
            }));
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Viewport", "Result"]);
        for (v, r) in viewports.iter().zip(&results) {
            table.add_row(vec![v.to_string(), describe(r)]);
        }
        Ok(format!(
            "Image: {}\n{}\nFetches: {}  Cache hits: {}  Layers: {}",
            manager.identifier(),
            table,
            stats.fetches,
            stats.cache.hits,
            surface.layers().len()
        ))
    }
}

fn describe(result: &Result<UpdateOutcome, BackdropError>) -> String {
    match result {
        Ok(UpdateOutcome::Applied {
            constraint,
            from_cache: true,
        }) => format!("applied {} (cached)", constraint),
        Ok(UpdateOutcome::Applied { constraint, .. }) => format!("applied {}", constraint),
        Ok(UpdateOutcome::Skipped) => "skipped".to_string(),
        Ok(UpdateOutcome::Superseded) => "superseded".to_string(),
        Ok(UpdateOutcome::NoBreakpoint) => "no breakpoint".to_string(),
        Err(e) => format!("failed: {}", e),
    }
}

fn legend_lines(legend: &Legend) -> Vec<String> {
    vec![
        format!("Where: {}", legend.location),
        format!("When: {}", legend.date),
        format!("Theme color: {}", legend.main_color),
    ]
}

fn render_json(value: &serde_json::Value) -> Result<String, BackdropError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BackdropError::Io(format!("Failed to serialize output: {}", e)))
}

/// Forwards every call to two surfaces.
struct Tee {
    first: Arc<dyn BackgroundSurface>,
    second: Arc<dyn BackgroundSurface>,
}

impl BackgroundSurface for Tee {
    fn show_background(&self, variant: Arc<crate::background::ImageVariant>) {
        self.first.show_background(variant.clone());
        self.second.show_background(variant);
    }

    fn update_legend(&self, legend: &Legend) {
        self.first.update_legend(legend);
        self.second.update_legend(legend);
    }

    fn show_fallback(&self, legend: &Legend) {
        self.first.show_fallback(legend);
        self.second.show_fallback(legend);
    }
}
