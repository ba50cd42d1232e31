//! Command-line interface for generating, compositing and inspecting a collection

use crate::analysis::duplicates::Deduplicator;
use crate::analysis::search::{SearchFormat, SearchResults, TraitQuery, search};
use crate::analysis::summary::{Summaries, load_token_index};
use crate::generation::attributes::AttributeSet;
use crate::generation::batch::BatchGenerator;
use crate::generation::canonical::split_canonical;
use crate::generation::engine::AttributeGenerator;
use crate::generation::random::SeededStream;
use crate::io::assets::{coverage_problems, dimension_problems, discover_assets};
use crate::io::configuration::{DEFAULT_CONFIG_FILE, LAST_SEED_KEYWORD};
use crate::io::error::{GeneratorError, Result, invalid_parameter};
use crate::io::image::Compositor;
use crate::io::metadata::{OutputFormat, OutputLayout};
use crate::io::progress::ProgressManager;
use crate::io::project::Project;
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "traitweave")]
#[command(
    author,
    version,
    about = "Generate layered token collections from weighted, rule-constrained traits"
)]
/// Command-line arguments shared by every subcommand
pub struct Cli {
    /// Project file describing assets, weights and rules
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available operations
#[derive(Subcommand)]
pub enum Command {
    /// Generate attribute sets and their metadata records
    Generate(GenerateArgs),
    /// Render token images from their internal records
    Composite(CompositeArgs),
    /// Recompute summary files from the records on disk
    Summary,
    /// Find tokens holding every given trait
    Search(SearchArgs),
    /// Regenerate tokens whose attribute sets collide
    Dedupe(DedupeArgs),
    /// Rebuild public records from internal ones
    Reprocess,
    /// Check asset coverage and dimensions
    Validate(ValidateArgs),
}

/// Arguments of `generate`
#[derive(Args)]
pub struct GenerateArgs {
    /// Number of attribute sets to generate
    #[arg(short = 'n', long)]
    pub number: usize,

    /// Seed string, or `last` to reuse the most recent one
    #[arg(short, long)]
    pub seed: Option<String>,

    /// First token id to generate
    #[arg(long, default_value_t = 0)]
    pub start_from: usize,

    /// Only regenerate tokens whose trait matches `Attribute/TraitGlob`
    #[arg(short = 't', long = "trait")]
    pub trait_filter: Option<String>,

    /// Record format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Metadata)]
    pub format: OutputFormat,
}

/// Arguments of `composite`
#[derive(Args)]
pub struct CompositeArgs {
    /// Explicit token ids to render
    #[arg(long, num_args = 1..)]
    pub ids: Vec<usize>,

    /// Render tokens whose trait matches `Attribute/TraitGlob`
    #[arg(short = 't', long = "trait")]
    pub trait_filter: Option<String>,

    /// Skip tokens below this id
    #[arg(long, default_value_t = 0)]
    pub start_from: usize,

    /// Output edge length, defaults to the project's image size
    #[arg(long)]
    pub size: Option<u32>,

    /// Number of parallel shards
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,
}

/// Arguments of `search`
#[derive(Args)]
pub struct SearchArgs {
    /// `Attribute/TraitGlob` terms that must all match
    #[arg(short, long, num_args = 1.., required = true)]
    pub traits: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = SearchFormat::Json)]
    pub format: SearchFormat,
}

/// Arguments of `dedupe`
#[derive(Args)]
pub struct DedupeArgs {
    /// Seed string, or `last` to reuse the most recent one
    #[arg(short, long)]
    pub seed: Option<String>,
}

/// Arguments of `validate`
#[derive(Args)]
pub struct ValidateArgs {
    /// Also require every asset to be this many pixels square
    #[arg(long)]
    pub image_size: Option<u32>,
}

/// Seed to use for a run
///
/// A missing seed becomes a random UUID; `last` reads the seed history.
///
/// # Errors
///
/// Returns an error if `last` is requested but no seed was recorded
pub fn resolve_seed(layout: &OutputLayout, requested: Option<&str>) -> Result<String> {
    match requested {
        None => Ok(Uuid::new_v4().to_string()),
        Some(LAST_SEED_KEYWORD) => layout.last_seed()?.ok_or_else(|| {
            invalid_parameter("seed", &LAST_SEED_KEYWORD, &"the seed history is empty")
        }),
        Some(seed) => Ok(seed.to_string()),
    }
}

fn parse_trait_filter(filter: &str) -> Result<(&str, &str)> {
    split_canonical(filter)
        .ok_or_else(|| invalid_parameter("trait", &filter, &"expected Attribute/TraitGlob"))
}

/// Dispatches a parsed command line against a loaded project
pub struct CommandProcessor {
    cli: Cli,
}

impl CommandProcessor {
    /// Create a processor for the given arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected subcommand
    ///
    /// # Errors
    ///
    /// Returns an error if the project cannot be loaded or the subcommand fails
    pub fn process(&self) -> Result<()> {
        let project = Project::load(&self.cli.config)?;
        let layout = OutputLayout::new(&project.output_root);

        match &self.cli.command {
            Command::Generate(args) => self.generate(&project, &layout, args),
            Command::Composite(args) => self.composite(&project, &layout, args),
            Command::Summary => Self::summary(&project, &layout),
            Command::Search(args) => Self::search(&layout, args),
            Command::Dedupe(args) => self.dedupe(&project, &layout, args),
            Command::Reprocess => Self::reprocess(&project, &layout),
            Command::Validate(args) => Self::validate(&project, args),
        }
    }

    fn progress(&self, shard_sizes: &[usize], label: &str) -> Option<ProgressManager> {
        (!self.cli.quiet).then(|| {
            let mut pm = ProgressManager::new();
            pm.initialize(shard_sizes, label);
            pm
        })
    }

    fn generate(&self, project: &Project, layout: &OutputLayout, args: &GenerateArgs) -> Result<()> {
        layout.ensure_dirs()?;

        let selected = match &args.trait_filter {
            Some(filter) => {
                let (attribute, trait_glob) = parse_trait_filter(filter)?;
                let index = load_token_index(layout)?;
                if !index.contains_attribute(attribute) {
                    warn!(attribute, "attribute is not in the token index");
                }
                Some(index.tokens_matching(attribute, trait_glob)?)
            }
            None => None,
        };

        let seed = resolve_seed(layout, args.seed.as_deref())?;
        layout.append_seed(&seed)?;
        info!(seed = seed.as_str(), count = args.number, "generating attribute sets");

        let mut pool = project.load_pool()?;
        let mut rng = SeededStream::from_seed_str(&seed);
        if project.shuffle_pool {
            pool.shuffle(&mut rng);
        }

        let generator = AttributeGenerator::new(&project.generation, &pool);
        let batch = BatchGenerator::new(&generator, args.start_from, args.number);
        batch.fast_forward(&mut rng);

        let progress = self.progress(&[args.number], "Generating");
        let mut results: Vec<(usize, AttributeSet)> = Vec::with_capacity(args.number);

        let stats = batch.run(
            &mut rng,
            |token_id| {
                let included = selected.as_ref().is_none_or(|ids| ids.contains(&token_id));
                if !included {
                    if let Some(ref pm) = progress {
                        pm.advance(0);
                    }
                }
                included
            },
            |token_id, attributes| {
                layout.write_token(token_id, &attributes, args.format, &project.final_metadata)?;
                if let Some(ref pm) = progress {
                    pm.advance(0);
                }
                results.push((token_id, attributes));
                Ok(())
            },
        )?;

        if let Some(ref pm) = progress {
            pm.finish();
        }
        info!(
            generated = stats.generated,
            skipped = stats.skipped,
            output = %layout.root().display(),
            "generation finished"
        );

        if args.trait_filter.is_some() {
            info!("no summary written for a trait-filtered run, run `summary` to refresh it");
        } else {
            Summaries::compute(pool.entries(), &results, &project.summary_optional_attributes)
                .write(layout)?;
        }

        info!(seed = seed.as_str(), "seed used");
        Ok(())
    }

    fn selected_tokens(
        layout: &OutputLayout,
        args: &CompositeArgs,
    ) -> Result<Vec<(usize, AttributeSet)>> {
        let ids: Option<BTreeSet<usize>> = if !args.ids.is_empty() {
            Some(args.ids.iter().copied().collect())
        } else if let Some(filter) = &args.trait_filter {
            let (attribute, trait_glob) = parse_trait_filter(filter)?;
            Some(load_token_index(layout)?.tokens_matching(attribute, trait_glob)?)
        } else {
            None
        };

        match ids {
            Some(ids) => ids
                .into_iter()
                .filter(|&id| id >= args.start_from)
                .map(|id| Ok((id, layout.load_token(id)?)))
                .collect(),
            None => Ok(layout
                .load_all()?
                .into_iter()
                .filter(|(id, _)| *id >= args.start_from)
                .collect()),
        }
    }

    fn composite(&self, project: &Project, layout: &OutputLayout, args: &CompositeArgs) -> Result<()> {
        let tokens = Self::selected_tokens(layout, args)?;
        if tokens.is_empty() {
            info!("no tokens to render");
            return Ok(());
        }

        let jobs = args.jobs.max(1);
        let size = args.size.unwrap_or(project.image_size);
        if size == 0 {
            return Err(invalid_parameter("size", &size, &"must be positive"));
        }
        let compositor = Compositor::new(&project.layers.blending, size);

        let chunk_size = tokens.len().div_ceil(jobs);
        let shards: Vec<&[(usize, AttributeSet)]> = tokens.chunks(chunk_size).collect();
        let shard_sizes: Vec<usize> = shards.iter().map(|shard| shard.len()).collect();
        for (index, shard) in shards.iter().enumerate() {
            if let (Some((first, _)), Some((last, _))) = (shard.first(), shard.last()) {
                info!(shard = index, first, last, "compositing shard");
            }
        }

        let progress = self.progress(&shard_sizes, "Compositing");
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|err| invalid_parameter("jobs", &jobs, &err))?;

        thread_pool.install(|| {
            shards
                .par_iter()
                .enumerate()
                .try_for_each(|(shard, tokens)| -> Result<()> {
                    for (token_id, attributes) in *tokens {
                        if let Some(ref pm) = progress {
                            pm.set_current(shard, *token_id);
                        }
                        let layers = project.layers.resolve(attributes)?;
                        compositor.render_to(&layers, &layout.image_path(*token_id))?;
                        if let Some(ref pm) = progress {
                            pm.advance(shard);
                        }
                    }
                    if let Some(ref pm) = progress {
                        pm.complete_shard(shard);
                    }
                    Ok(())
                })
        })?;

        if let Some(ref pm) = progress {
            pm.finish();
        }
        info!(images = tokens.len(), "compositing finished");
        Ok(())
    }

    fn summary(project: &Project, layout: &OutputLayout) -> Result<()> {
        let records = layout.load_all()?;
        let pool = project.load_pool()?;
        Summaries::compute(pool.entries(), &records, &project.summary_optional_attributes)
            .write(layout)
    }

    // Search results are the command's output
    #[allow(clippy::print_stdout)]
    fn search(layout: &OutputLayout, args: &SearchArgs) -> Result<()> {
        let queries = args
            .traits
            .iter()
            .map(|query| TraitQuery::parse(query))
            .collect::<Result<Vec<_>>>()?;
        let records = layout.load_all()?;

        let results = SearchResults {
            token_ids: search(&records, &queries),
            format: args.format,
        };
        println!("{results}");
        Ok(())
    }

    fn dedupe(&self, project: &Project, layout: &OutputLayout, args: &DedupeArgs) -> Result<()> {
        let records = layout.load_all()?;
        let seed = resolve_seed(layout, args.seed.as_deref())?;
        info!(seed = seed.as_str(), "deduplicating");

        let pool = project.load_pool()?;
        let generator = AttributeGenerator::new(&project.generation, &pool);
        let mut rng = SeededStream::from_seed_str(&seed);
        let mut deduplicator =
            Deduplicator::new(&generator, &project.duplicates.ignore_attributes, &records);

        let replacements = deduplicator.run(&records, &mut rng)?;
        if replacements.is_empty() {
            info!("no duplicates found");
            return Ok(());
        }

        let progress = self.progress(&[replacements.len()], "Rewriting");
        for (token_id, attributes) in &replacements {
            layout.write_token(
                *token_id,
                attributes,
                OutputFormat::Metadata,
                &project.final_metadata,
            )?;
            if let Some(ref pm) = progress {
                pm.advance(0);
            }
        }
        if let Some(ref pm) = progress {
            pm.finish();
        }

        info!(replaced = replacements.len(), seed = seed.as_str(), "duplicates regenerated");
        Ok(())
    }

    fn reprocess(project: &Project, layout: &OutputLayout) -> Result<()> {
        let records = layout.load_all()?;
        for (token_id, attributes) in &records {
            layout.write_final(*token_id, attributes, &project.final_metadata)?;
        }
        info!(records = records.len(), "public records rebuilt");
        Ok(())
    }

    fn validate(project: &Project, args: &ValidateArgs) -> Result<()> {
        let assets = discover_assets(&project.asset_root)?;
        let mut problems = coverage_problems(
            &assets,
            &project.generation.attribute_order,
            &project.generation.optional_attributes,
            &project.generation.probabilities,
        );

        if let Some(size) = args.image_size {
            problems.extend(dimension_problems(&assets, &project.asset_root, size)?);
        }

        if problems.is_empty() {
            info!(assets = assets.len(), "assets are valid");
            Ok(())
        } else {
            Err(GeneratorError::AssetValidation { problems })
        }
    }
}
