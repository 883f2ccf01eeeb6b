use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use freidok::config::{find_config_file, load_config, Config};
use freidok::models::{AuthorStyle, FilterCriteria, InstitutionQuery, PublicationQuery, YearRange};
use freidok::pipeline;
use freidok::process::parse_languages;
use freidok::query::{parse_params, resolve_fields};
use freidok::render::{resolve_format, OutputFormat, OutputTarget, RenderOptions};
use freidok::sources::{create_source, SourceSpec};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// FreiDok CLI - Retrieve publications and institutions from the FreiDok API
#[derive(Parser, Debug)]
#[command(name = "freidok")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Retrieve publications from the FreiDok API and render them as HTML, Markdown, JSON or a custom template",
    long_about = None
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Retrieve publications
    Publ(PublArgs),

    /// Retrieve institutions
    Inst(InstArgs),
}

/// Options shared by all retrieval commands
#[derive(Args, Debug)]
struct CommonArgs {
    /// URL of the FreiDok JSON API or path to a JSON file (env: FREIDOK_URL)
    #[arg(long)]
    source: Option<String>,

    /// Output file, `-` or absent for stdout
    #[arg(long, short)]
    out: Option<String>,

    /// Output format (ignored if a template is given)
    #[arg(long, short, value_enum)]
    format: Option<FormatArg>,

    /// Custom template file (env: FREIDOK_TEMPLATE)
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Comma-separated preferred languages, 3-letter codes (env: FREIDOK_LANGUAGES)
    #[arg(long, value_name = "LANG[,LANG...]", value_parser = parse_langs)]
    langs: Option<Languages>,

    /// Index of the first retrieved item
    #[arg(long, value_name = "N", default_value_t = 0)]
    startitem: usize,

    /// Maximum number of items to retrieve
    #[arg(long, value_name = "N", default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..=100))]
    maxitems: u64,

    /// Only print the API request, don't send it
    #[arg(long, short = 'n')]
    dryrun: bool,
}

#[derive(Args, Debug)]
struct PublArgs {
    /// Publication IDs
    #[arg(long, value_name = "ID[,ID...]", value_delimiter = ',')]
    id: Vec<u64>,

    /// Filter by person IDs
    #[arg(long, value_name = "ID[,ID...]", value_delimiter = ',')]
    pers_id: Vec<u64>,

    /// Filter by institution IDs
    #[arg(long, value_name = "ID[,ID...]", value_delimiter = ',')]
    inst_id: Vec<u64>,

    /// Filter by project IDs
    #[arg(long, value_name = "ID[,ID...]", value_delimiter = ',')]
    proj_id: Vec<u64>,

    /// Filter by title (contains)
    #[arg(long, value_name = "TERM")]
    title: Option<String>,

    /// Filter by year of publication
    #[arg(long, value_name = "YYYY[-YYYY]")]
    years: Option<YearRange>,

    /// Limit the number of listed authors (0 for all)
    #[arg(long, value_name = "N", default_value_t = 0)]
    maxpers: usize,

    /// Exclude publications where an author name ("<first> <last>") contains NAME
    #[arg(long, value_name = "NAME")]
    exclude_author: Vec<String>,

    /// Exclude publications having TEXT in their title (case insensitive)
    #[arg(long, value_name = "TEXT")]
    exclude_title: Vec<String>,

    /// Fields to include in the response
    #[arg(long, value_name = "F[,F...]", value_delimiter = ',', conflicts_with = "fieldset")]
    fields: Option<Vec<String>>,

    /// Predefined set of fields
    #[arg(long, value_name = "NAME")]
    fieldset: Option<String>,

    /// Additional API parameters, e.g. "transitive=true pubtype=book"
    #[arg(long, value_name = "STR")]
    params: Option<String>,

    /// Abbreviate author forenames, each initial followed by the optional STR
    #[arg(long, value_name = "STR", num_args = 0..=1, default_missing_value = "")]
    authors_abbrev: Option<String>,

    /// List author names as "last first"
    #[arg(long)]
    authors_reverse: bool,

    /// Separate individual authors with STR
    #[arg(long, value_name = "STR")]
    authors_sep: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct InstArgs {
    /// Institution IDs
    #[arg(long, value_name = "ID[,ID...]", value_delimiter = ',')]
    id: Vec<u64>,

    /// Show institutions whose name contains TERM
    #[arg(long, value_name = "TERM")]
    name: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    /// Markdown list grouped by year
    Markdown,
    /// HTML list
    Html,
    /// Raw API response including derived fields
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Html => OutputFormat::Html,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Parsed `--langs` value
#[derive(Clone, Debug, PartialEq, Eq)]
struct Languages(Vec<String>);

fn parse_langs(value: &str) -> std::result::Result<Languages, String> {
    parse_languages(value).map(Languages)
}

/// Print all available environment variables
fn print_env_vars() {
    println!("FreiDok CLI - Environment Variables");
    println!();
    println!("API:");
    println!("  FREIDOK_URL                 FreiDok JSON API base URL");
    println!("                              (default: https://freidok.uni-freiburg.de/jsonApi/v1/)");
    println!("  FREIDOK_TIMEOUT             Request timeout in seconds (default: 30)");
    println!();
    println!("Output:");
    println!("  FREIDOK_LANGUAGES           Preferred languages, comma-separated (default: eng,deu)");
    println!("  FREIDOK_TEMPLATE            Default custom template file");
    println!();
    println!("Field Sets:");
    println!("  FREIDOK_FIELDSET_PUBLICATION_<NAME>  Custom publication field set <name>,");
    println!("                                       comma or space separated field names");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export FREIDOK_LANGUAGES=\"deu,eng\"");
    println!("  export FREIDOK_FIELDSET_PUBLICATION_MINI=\"id,titles,persons\"");
    println!("  freidok publ --inst-id 2555 --fieldset mini");
    std::process::exit(0);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
    }

    // stdout carries the rendered output, so logs go to stderr
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("freidok={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.clone().or_else(find_config_file);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }
    let config = load_config(config_path.as_deref())?;

    match cli.command {
        Some(Commands::Publ(args)) => publications(args, &config).await,
        Some(Commands::Inst(args)) => institutions(args, &config).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

async fn publications(args: PublArgs, config: &Config) -> Result<()> {
    let fields = resolve_fields(args.fieldset.as_deref(), args.fields.as_deref(), &config.fieldsets)?;

    let mut criteria = FilterCriteria::new()
        .ids(args.id)
        .pers_ids(args.pers_id)
        .inst_ids(args.inst_id)
        .proj_ids(args.proj_id)
        .maxpers(args.maxpers)
        .window(args.common.startitem, args.common.maxitems as usize);
    if let Some(title) = args.title {
        criteria = criteria.title(title);
    }
    if let Some(years) = args.years {
        criteria = criteria.years(years);
    }
    if let Some(params) = &args.params {
        for (key, value) in parse_params(params)? {
            criteria = criteria.param(key, value);
        }
    }
    for name in args.exclude_author {
        criteria = criteria.exclude_author(name);
    }
    for title in args.exclude_title {
        criteria = criteria.exclude_title(title);
    }

    let mut style = AuthorStyle::new().reverse(args.authors_reverse);
    if let Some(marker) = args.authors_abbrev {
        style = style.abbreviate(marker);
    }
    if let Some(sep) = args.authors_sep {
        style = style.separator(sep);
    }

    let query = PublicationQuery::new(criteria, fields);
    let source = create_source(&SourceSpec::parse(args.common.source.as_deref()), config)?;

    if args.common.dryrun {
        print!("{}", source.describe_publications(&query)?);
        return Ok(());
    }

    let (format, target) = output(&args.common, config);
    let options = render_options(&args.common, config)
        .maxpers(args.maxpers)
        .author_style(style);

    let text = pipeline::publications(source.as_ref(), &query, &format, &options)
        .await
        .context("Failed to retrieve publications")?;
    target.write(&text)?;
    Ok(())
}

async fn institutions(args: InstArgs, config: &Config) -> Result<()> {
    let mut query = InstitutionQuery::new().ids(args.id);
    if let Some(name) = args.name {
        query = query.name(name);
    }
    query.start_item = args.common.startitem;
    query.max_items = args.common.maxitems as usize;

    let source = create_source(&SourceSpec::parse(args.common.source.as_deref()), config)?;

    if args.common.dryrun {
        print!("{}", source.describe_institutions(&query)?);
        return Ok(());
    }

    let (format, target) = output(&args.common, config);
    let options = render_options(&args.common, config);

    let text = pipeline::institutions(source.as_ref(), &query, &format, &options)
        .await
        .context("Failed to retrieve institutions")?;
    target.write(&text)?;
    Ok(())
}

fn output(common: &CommonArgs, config: &Config) -> (OutputFormat, OutputTarget) {
    let target = OutputTarget::from_arg(common.out.as_deref());
    let template = common.template.as_deref().or(config.template.as_deref());
    let format = resolve_format(template, common.format.map(OutputFormat::from), &target);
    tracing::debug!("Output format: {:?}, target: {:?}", format, target);
    (format, target)
}

fn render_options(common: &CommonArgs, config: &Config) -> RenderOptions {
    let languages = match &common.langs {
        Some(Languages(langs)) => langs.clone(),
        None => config.languages.clone(),
    };
    RenderOptions::default().languages(languages)
}
