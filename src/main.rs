use clap::{ArgAction, Parser};
use log::{info, LevelFilter};
use phrase_gen::{RuleSet, START_KEYWORD};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::PathBuf;

/// Random sentence generator driven by keyword grammars
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Rule files, read in order; `-` or no files reads standard input
    #[arg(help = "Rule definition files")]
    files: Vec<PathBuf>,

    /// Number of sentences to generate (`-N` also works, e.g. `-5`)
    #[arg(short = 'n', long = "count", allow_hyphen_values = true)]
    count: Option<String>,

    /// Root keyword to expand
    #[arg(long, default_value = START_KEYWORD)]
    start: String,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Print the loaded rules instead of generating
    #[arg(long)]
    show_rules: bool,

    /// Print the loaded rules as JSON instead of generating
    #[arg(long)]
    json: bool,

    /// Load rules from a JSON export
    #[arg(long, value_name = "FILE")]
    from_json: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (shorthand, args) = extract_count_flag(std::env::args_os());
    let cli = Cli::parse_from(args);

    init_logging(cli.verbose);

    let count = cli
        .count
        .as_deref()
        .or(shorthand.as_deref())
        .map_or(1, normalize_count);

    let rules = load_rules(&cli)?;
    info!("Loaded {} rules", rules.len());

    if cli.show_rules {
        println!("{}", rules.to_display_string());
        return Ok(());
    }
    if cli.json {
        println!("{}", rules.to_json()?);
        return Ok(());
    }

    let mut rng: Box<dyn RngCore> = match cli.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };

    let sentence = format!("{{{}}}", cli.start);
    for _ in 0..count {
        println!("{}", rules.evaluate_with(&sentence, &mut *rng)?);
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Build the rule set from the JSON export and the text sources
fn load_rules(cli: &Cli) -> phrase_gen::Result<RuleSet> {
    let mut rules = match &cli.from_json {
        Some(path) => RuleSet::from_json(&fs::read_to_string(path)?)?,
        None => RuleSet::new(),
    };

    if cli.files.is_empty() {
        if cli.from_json.is_none() {
            rules.extend_from_reader(io::stdin().lock())?;
        }
        return Ok(rules);
    }

    for path in &cli.files {
        let accepted = if path.as_os_str() == "-" {
            rules.extend_from_reader(io::stdin().lock())?
        } else {
            rules.extend_from_reader(BufReader::new(File::open(path)?))?
        };
        info!("{}: {} rule lines", path.display(), accepted);
    }

    Ok(rules)
}

/// Pull the first `-N` style argument out of the command line so clap does
/// not mistake it for a flag
fn extract_count_flag<I>(args: I) -> (Option<String>, Vec<OsString>)
where
    I: IntoIterator<Item = OsString>,
{
    let mut count = None;
    let mut rest: Vec<OsString> = Vec::new();

    for arg in args {
        let after_count_option = rest
            .last()
            .is_some_and(|prev| prev == "-n" || prev == "--count");
        if count.is_none() && !after_count_option {
            if let Some(digits) = arg.to_str().and_then(|s| s.strip_prefix('-')) {
                if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                    count = Some(digits.to_string());
                    continue;
                }
            }
        }
        rest.push(arg);
    }

    (count, rest)
}

/// Non-positive or unparsable counts become 1
fn normalize_count(value: &str) -> usize {
    match value.trim().parse::<i64>() {
        Ok(n) if n > 0 => n as usize,
        _ => 1,
    }
}
