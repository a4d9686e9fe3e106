//! Campaign Generator: localized social ad creatives from a campaign brief.
//!
//! Command-line driver wiring configuration, adapters and the creative
//! pipeline together.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use campaign_core::config::{AppConfig, StorageBackend};
use campaign_core::types::{BrandSummary, CampaignBrief, Product};
use campaign_creative::{
    CampaignGenerator, CampaignMonitor, CampaignOrchestrator, CampaignPresenter, CampaignValidator,
};
use campaign_integrations::{AdapterFactory, Adapters};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-generator")]
#[command(about = "AI-driven creative automation for localized social ad campaigns")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "CAMPAIGN_GENERATOR_CONFIG")]
    config: Option<String>,

    /// Use OpenAI and Weaviate instead of the in-memory adapters (overrides config)
    #[arg(long, global = true, default_value_t = false)]
    real: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate localized campaign creative assets
    Generate(GenerateArgs),

    /// Run a small example campaign
    Demo {
        /// Show the asset list and validation report
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },

    /// Store the example brand in the brand repository
    SeedBrand,

    /// Extract colors, voice and typography from brand asset references
    UnderstandBrand {
        /// Image URLs or paths of existing brand assets
        #[arg(required = true)]
        assets: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Brief file (YAML or JSON); replaces the brief flags below
    #[arg(long)]
    brief: Option<PathBuf>,

    /// Brand id
    #[arg(short, long, default_value = "natural-suds-co")]
    brand: String,

    /// Campaign slogan
    #[arg(short, long, default_value = "Gift Wellness")]
    slogan: String,

    /// Product name (repeat for multiple)
    #[arg(
        short = 'p',
        long = "product",
        default_values = ["Lavender Soap", "Citrus Shower Gel"]
    )]
    products: Vec<String>,

    /// Target locale (repeat for multiple)
    #[arg(short = 'l', long = "locale", default_values = ["en-US", "es-US"])]
    locales: Vec<String>,

    /// Aspect ratio (repeat for multiple)
    #[arg(short = 'a', long = "aspect", default_values = ["1:1", "9:16", "16:9"])]
    aspects: Vec<String>,

    /// Target region
    #[arg(long, default_value = "North America")]
    region: String,

    /// Target audience
    #[arg(long, default_value = "General")]
    audience: String,

    /// Style keyword applied to every product (repeat for multiple)
    #[arg(long = "style", default_values = ["clean", "natural"])]
    styles: Vec<String>,

    /// Write images under this directory instead of the configured storage
    #[arg(long)]
    output_dir: Option<String>,

    /// Look up and record assets in the asset index
    #[arg(long, default_value_t = false)]
    reuse: bool,

    /// Show the asset list and validation report
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Print the full outcome as JSON instead of the text summary
    #[arg(long, default_value_t = false)]
    json: bool,
}

const DEFAULT_LOG_FILTER: &str =
    "campaign_generator=info,campaign_creative=info,campaign_integrations=info";

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// An explicit config file must load; otherwise fall back to defaults.
fn load_config(path: Option<&str>) -> anyhow::Result<AppConfig> {
    match AppConfig::load(path) {
        Ok(config) => Ok(config),
        Err(e) if path.is_some() => Err(e).context("failed to load configuration file"),
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Ok(AppConfig::default())
        }
    }
}

fn load_brief(path: &Path) -> anyhow::Result<CampaignBrief> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read brief {}", path.display()))?;
    let brief = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&raw)
            .with_context(|| format!("invalid JSON brief {}", path.display()))?,
        _ => serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid YAML brief {}", path.display()))?,
    };
    Ok(brief)
}

fn brief_from_args(args: &GenerateArgs) -> anyhow::Result<CampaignBrief> {
    let products = args
        .products
        .iter()
        .map(|name| Product::new(name.as_str(), args.styles.iter().cloned()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CampaignBrief {
        brief_id: format!("cli-{}", Utc::now().format("%Y%m%d-%H%M%S")),
        brand_id: args.brand.clone(),
        campaign_slogan: args.slogan.clone(),
        target_region: args.region.clone(),
        target_audience: args.audience.clone(),
        target_locales: args.locales.clone(),
        products,
        aspects: args.aspects.clone(),
        created_at: Utc::now(),
    })
}

fn demo_brief() -> anyhow::Result<CampaignBrief> {
    Ok(CampaignBrief {
        brief_id: "demo-001".to_string(),
        brand_id: "natural-suds-co".to_string(),
        campaign_slogan: "Pure Wellness".to_string(),
        target_region: "North America".to_string(),
        target_audience: "Health-conscious shoppers".to_string(),
        target_locales: vec!["en-US".to_string(), "es-US".to_string()],
        products: vec![
            Product::new("Lavender Soap", ["calming", "purple"])?,
            Product::new("Citrus Gel", ["energizing", "orange"])?,
        ],
        aspects: vec!["1:1".to_string(), "9:16".to_string()],
        created_at: Utc::now(),
    })
}

fn build_orchestrator(config: &AppConfig, adapters: &Adapters) -> CampaignOrchestrator {
    let mut generator = CampaignGenerator::new(
        adapters.ai.clone(),
        adapters.storage.clone(),
        config.generation.clone(),
    );
    if let Some(index) = &adapters.index {
        generator = generator.with_index(Arc::clone(index));
    }
    CampaignOrchestrator::new(
        generator,
        CampaignValidator::new(&config.validation),
        adapters.brands.clone(),
    )
}

fn print_brief(brief: &CampaignBrief) {
    println!("Campaign Brief: {}", brief.brief_id);
    println!("   Brand: {}", brief.brand_id);
    println!("   Slogan: {}", brief.campaign_slogan);
    println!("   Products: {}", brief.products.len());
    println!("   Locales: {}", brief.target_locales.join(", "));
    println!("   Aspects: {}", brief.aspects.join(", "));
    println!("   Expected Assets: {}\n", brief.total_assets_required());
}

async fn run_campaign(
    config: &AppConfig,
    brief: &CampaignBrief,
    verbose: bool,
    json: bool,
) -> anyhow::Result<()> {
    let adapters = AdapterFactory::new(config).build().await?;
    let orchestrator = build_orchestrator(config, &adapters);
    let monitor = CampaignMonitor::new();

    let outcome = match orchestrator.run(brief).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let alert = monitor.on_error(brief, &e);
            error!(brief_id = %brief.brief_id, error = %e, "Campaign generation failed");
            eprintln!("{}", alert.to_human_readable());
            return Err(e.into());
        }
    };

    if json {
        println!("{}", CampaignPresenter::to_json(&outcome)?);
    } else {
        println!("{}", CampaignPresenter::format_summary(&outcome));
        if verbose {
            println!("{}", CampaignPresenter::format_assets_list(&outcome.assets));
            println!(
                "{}",
                CampaignPresenter::format_validation_report(&outcome.validation_results)
            );
        }
    }

    for alert in monitor.inspect(brief, &outcome) {
        eprintln!("{}", alert.to_human_readable());
    }
    info!(
        storage = adapters.storage.name(),
        assets = outcome.summary.total_assets,
        "Campaign generation complete"
    );
    Ok(())
}

async fn cmd_generate(mut config: AppConfig, args: GenerateArgs) -> anyhow::Result<()> {
    if let Some(dir) = &args.output_dir {
        config.storage.backend = StorageBackend::Local;
        config.storage.local_root = dir.clone();
    }
    if args.reuse {
        config.generation.index_enabled = true;
    }

    let brief = match &args.brief {
        Some(path) => load_brief(path)?,
        None => brief_from_args(&args)?,
    };
    if !args.json {
        print_brief(&brief);
    }
    run_campaign(&config, &brief, args.verbose, args.json).await
}

async fn cmd_demo(config: AppConfig, verbose: bool) -> anyhow::Result<()> {
    let brief = demo_brief()?;
    print_brief(&brief);
    run_campaign(&config, &brief, verbose, false).await
}

/// Seeding only makes sense against a repository that outlives the process.
fn ensure_persistent_brands(config: &AppConfig) -> anyhow::Result<()> {
    if !config.use_real_adapters {
        anyhow::bail!(
            "seed-brand writes to the Weaviate brand repository; rerun with --real \
             (the in-memory repository is discarded on exit)"
        );
    }
    Ok(())
}

async fn cmd_seed_brand(config: AppConfig) -> anyhow::Result<()> {
    ensure_persistent_brands(&config)?;
    let brands = AdapterFactory::new(&config).brands().await?;
    let brand = BrandSummary::natural_suds_co();
    brands.upsert(&brand).await?;
    println!(
        "Seeded brand '{}' ({}) into the {} brand repository",
        brand.name,
        brand.brand_id,
        brands.name()
    );
    Ok(())
}

async fn cmd_understand_brand(config: AppConfig, assets: Vec<String>) -> anyhow::Result<()> {
    let ai = AdapterFactory::new(&config).ai()?;
    let profile = ai.understand_brand(&assets).await?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = load_config(cli.config.as_deref())?;

    // Apply CLI overrides
    if cli.real {
        config.use_real_adapters = true;
    }

    info!(
        use_real_adapters = config.use_real_adapters,
        storage = ?config.storage.backend,
        index_enabled = config.generation.index_enabled,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Generate(args) => cmd_generate(config, args).await,
        Commands::Demo { verbose } => cmd_demo(config, verbose).await,
        Commands::SeedBrand => cmd_seed_brand(config).await,
        Commands::UnderstandBrand { assets } => cmd_understand_brand(config, assets).await,
    }
}
