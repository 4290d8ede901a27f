use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use jsonschema_validate_core::{
    compile_request_schema, CompileOptions, ConformanceFailure, FormatPolicy, RequestKind,
    Validator,
};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "jsonschema-validate")]
#[command(about = "Check and parse JSON data against a JSON Schema")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether the data conforms, listing every issue when it does not
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Validate the data and write its parsed form
    Parse {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct InputArgs {
    /// JSON data file (`-` reads stdin)
    data: PathBuf,

    /// JSON Schema file. Without one, the default for --kind applies
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Request kind, selects the default validator when no schema is given
    #[arg(long, value_enum, default_value_t = KindArg::Extract)]
    kind: KindArg,

    /// JSON file with compile options (`max-depth`, `formats`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not check string `format` keywords
    #[arg(long)]
    no_formats: bool,

    /// Max schema nesting depth
    #[arg(long)]
    max_depth: Option<usize>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum KindArg {
    Extract,
    Query,
}

impl From<KindArg> for RequestKind {
    fn from(val: KindArg) -> Self {
        match val {
            KindArg::Extract => RequestKind::Extract,
            KindArg::Query => RequestKind::Query,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { input } => {
            let (validator, data) = load(&input)?;
            match validator.parse(&data) {
                Ok(_) => {
                    println!("valid");
                    Ok(ExitCode::SUCCESS)
                }
                Err(failure) => {
                    let mut stdout = io::stdout().lock();
                    report(&failure, &mut stdout)?;
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Parse {
            input,
            output,
            format,
        } => {
            let (validator, data) = load(&input)?;
            match validator.parse(&data) {
                Ok(parsed) => {
                    write_json(&parsed, output.as_deref(), format)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(failure) => {
                    let mut stderr = io::stderr().lock();
                    report(&failure, &mut stderr)?;
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

/// Build the compile options, compile the schema and read the data.
fn load(input: &InputArgs) -> Result<(Validator, Value)> {
    let mut options = match &input.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            serde_json::from_reader::<_, CompileOptions>(BufReader::new(file))
                .with_context(|| format!("Failed to parse config from: {}", path.display()))?
        }
        None => CompileOptions::default(),
    };
    if input.no_formats {
        options.formats = FormatPolicy::Ignore;
    }
    if let Some(max_depth) = input.max_depth {
        options.max_depth = max_depth;
    }

    let schema = input
        .schema
        .as_deref()
        .map(|path| read_json(path, "schema"))
        .transpose()?;

    let validator = compile_request_schema(schema.as_ref(), input.kind.into(), &options)
        .map_err(|e| anyhow::Error::from(e).context("Schema compilation failed"))?;
    tracing::debug!(?options, "schema compiled");

    let data = read_json(&input.data, "data")?;
    Ok((validator, data))
}

fn read_json(path: &Path, what: &str) -> Result<Value> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .with_context(|| format!("Failed to read {what} from stdin"))?;
        return serde_json::from_str(&buf)
            .with_context(|| format!("Failed to parse {what} from stdin"));
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open {what} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {what} from: {}", path.display()))
}

fn report(failure: &ConformanceFailure, out: &mut impl Write) -> Result<()> {
    for issue in &failure.issues {
        writeln!(out, "{issue}").context("Failed to write issue")?;
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
