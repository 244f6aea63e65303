//! disclose CLI - annual report disclosure extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use disclose::{
    extract_table, locate_sections, parse_file_with_options, resolve_outline, AnnualReport,
    ExtractOptions, Fallback, OutlineResolver, PageSelection, ParseOptions, TitlePattern,
};

#[derive(Parser)]
#[command(name = "disclose")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract auditors, key audit matters and audit fees from annual report PDFs", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    extract: ExtractArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Layout and extraction settings shared by every command.
#[derive(Args)]
struct ExtractArgs {
    /// Run section and column detection per language partition
    #[arg(long, global = true, env = "DISCLOSE_BILINGUAL")]
    bilingual: bool,

    /// Scan pages in parallel when bookmarks do not resolve a report
    #[arg(long, global = true)]
    parallel: bool,

    /// Latest fiscal year accepted in table headers (defaults to this year)
    #[arg(long, global = true, value_name = "YEAR")]
    reference_year: Option<i32>,

    /// Minimum similarity (0-100) for a registry match
    #[arg(long, global = true, default_value = "90")]
    min_similarity: u8,

    /// Page range to load (e.g., "1-10", "1,3,5")
    #[arg(long, global = true)]
    pages: Option<String>,
}

impl ExtractArgs {
    fn options(&self) -> ExtractOptions {
        let mut options = ExtractOptions::new()
            .with_bilingual(self.bilingual)
            .with_parallel(self.parallel)
            .with_min_similarity(self.min_similarity);
        if let Some(year) = self.reference_year {
            options = options.with_reference_year(year);
        }
        options
    }

    fn parse_options(&self) -> Result<ParseOptions, Box<dyn std::error::Error>> {
        let page_selection = if let Some(p) = &self.pages {
            PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?
        } else {
            PageSelection::All
        };
        // Lenient: a broken page must not hide the rest of the report
        Ok(ParseOptions::new().lenient().with_pages(page_selection))
    }
}

/// A title pattern with its guards.
#[derive(Args)]
struct PatternArgs {
    /// Required pattern (case-insensitive regex)
    #[arg(short, long, value_name = "REGEX")]
    title: String,

    /// At least one of these must also match
    #[arg(long, value_name = "REGEX")]
    any_of: Option<String>,

    /// None of these may match
    #[arg(long, value_name = "REGEX")]
    none_of: Option<String>,
}

impl PatternArgs {
    fn pattern(&self) -> disclose::Result<TitlePattern> {
        let mut pattern = TitlePattern::new(&self.title)?;
        if let Some(any_of) = &self.any_of {
            pattern = pattern.with_any_of(any_of)?;
        }
        if let Some(none_of) = &self.none_of {
            pattern = pattern.with_none_of(none_of)?;
        }
        Ok(pattern)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the auditor's report and corporate governance pipelines
    Analyse {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Registry of audit firms, one name per line
        #[arg(short, long, value_name = "FILE")]
        registry: Option<PathBuf>,

        /// Key audit matter keywords (comma-separated regexes)
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,

        /// Key audit matter keywords, one per line
        #[arg(long, value_name = "FILE")]
        keywords_file: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Resolve the page ranges of a report title
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        pattern: PatternArgs,
    },

    /// Extract the tables under matching section headings of a report
    Tables {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        pattern: PatternArgs,

        /// Section heading (case-insensitive regex)
        #[arg(short, long, value_name = "REGEX")]
        section: String,

        /// Print the section text instead of the table
        #[arg(long)]
        text: bool,
    },

    /// Validate a firm name against a registry
    Validate {
        /// Name as extracted
        #[arg(value_name = "NAME")]
        name: String,

        /// Registry of audit firms, one name per line
        #[arg(short, long, value_name = "FILE")]
        registry: PathBuf,

        /// Label returned when nothing matches (the cleaned name otherwise)
        #[arg(long, value_name = "LABEL")]
        catch_all: Option<String>,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Analyse {
            input,
            registry,
            keywords,
            keywords_file,
            output,
            compact,
        } => cmd_analyse(
            &input,
            &cli.extract,
            registry.as_deref(),
            keywords,
            keywords_file.as_deref(),
            output.as_deref(),
            compact,
        ),
        Commands::Outline { input, pattern } => cmd_outline(&input, &cli.extract, &pattern),
        Commands::Tables {
            input,
            pattern,
            section,
            text,
        } => cmd_tables(&input, &cli.extract, &pattern, &section, text),
        Commands::Validate {
            name,
            registry,
            catch_all,
        } => cmd_validate(&name, &registry, catch_all, cli.extract.min_similarity),
        Commands::Info { input } => cmd_info(&input, &cli.extract),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Non-empty, trimmed lines of a text file.
fn read_lines(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect())
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_analyse(
    input: &Path,
    extract: &ExtractArgs,
    registry: Option<&Path>,
    mut keywords: Vec<String>,
    keywords_file: Option<&Path>,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = match registry {
        Some(path) => read_lines(path)?,
        None => Vec::new(),
    };
    if let Some(path) = keywords_file {
        keywords.extend(read_lines(path)?);
    }
    log::debug!("{} registry entries, {} keywords", registry.len(), keywords.len());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading PDF...");
    let doc = parse_file_with_options(input, extract.parse_options()?)?;

    pb.set_message(format!("Analysing {} pages...", doc.page_count()));
    let summary = AnnualReport::analyse(&doc, registry, keywords.as_slice(), &extract.options())?;
    pb.finish_and_clear();

    write_output(output, &summary.to_json(compact)?)
}

fn cmd_outline(input: &Path, extract: &ExtractArgs, pattern: &PatternArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = parse_file_with_options(input, extract.parse_options()?)?;
    let pattern = pattern.pattern()?;

    let (ranges, source) = OutlineResolver::for_options(&extract.options()).resolve_with_source(&doc, &pattern);
    let json = json!({
        "pattern": pattern.to_string(),
        "source": source,
        // 1-indexed, as printed by PDF viewers
        "pages": ranges.iter().map(|r| [r.from + 1, r.to + 1]).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn cmd_tables(
    input: &Path,
    extract: &ExtractArgs,
    pattern: &PatternArgs,
    section: &str,
    text: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = parse_file_with_options(input, extract.parse_options()?)?;
    let options = extract.options();
    let pattern = pattern.pattern()?;
    let section = TitlePattern::new(section)?;

    let mut results = Vec::new();
    for range in resolve_outline(&doc, &pattern, &options) {
        for region in locate_sections(&doc, range, &section, &options) {
            let mut entry = json!({
                "page": region.page_number() + 1,
                "title": region.title(),
                "bbox": region.bbox(),
            });
            if text {
                entry["text"] = json!(region.text());
            } else {
                entry["table"] = serde_json::to_value(extract_table(&region, &options))?;
            }
            results.push(entry);
        }
    }

    if results.is_empty() {
        eprintln!("{}", "No matching section found".yellow());
    }
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn cmd_validate(
    name: &str,
    registry: &Path,
    catch_all: Option<String>,
    min_similarity: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = read_lines(registry)?;
    let fallback = match catch_all {
        Some(label) => Fallback::CatchAll(label),
        None => Fallback::PassThrough,
    };
    println!("{}", disclose::validate_entity(name, &registry, min_similarity, fallback));
    Ok(())
}

fn cmd_info(input: &Path, extract: &ExtractArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = parse_file_with_options(input, extract.parse_options()?)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.page_count());

    let glyphs: usize = doc.pages.iter().map(|p| p.glyphs().len()).sum();
    let empty = doc.pages.iter().filter(|p| p.is_empty()).count();
    println!("{}: {}", "Glyphs".bold(), glyphs);
    println!("{}: {}", "Pages without text".bold(), empty);

    let outline = doc.outline();
    if !outline.is_empty() {
        println!();
        println!("{}", "Outline".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for entry in outline {
            println!("  {} {}", format!("p{:>4}", entry.range.from + 1).dimmed(), entry.title);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "disclose".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Annual report disclosure extraction tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/disclose".dimmed());
    println!("License: MIT");
}
