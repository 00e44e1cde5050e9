use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser as ClapParser, Subcommand};
use confique::Config as _;
use jsontree::{Location, ParseError, ParseOptions, Root};
use tracing::*;

use crate::config::Config;
use crate::stats::Stats;

mod config;
mod logging;
mod stats;

#[derive(Debug, ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Read configuration from this TOML file instead of `stjson.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a JSON file and report the first syntax error, if any.
    Check {
        /// The path to a JSON file.
        input: PathBuf,
    },
    /// Print the syntax tree of a JSON file.
    Inspect {
        /// The path to a JSON file.
        input: PathBuf,
        /// Print node counts and nesting depth instead of the tree.
        #[arg(long)]
        stats: bool,
        /// Print the statistics as JSON.
        #[arg(long, requires = "stats")]
        json: bool,
    },
    /// Write the binary dump of a JSON file's syntax tree.
    Dump {
        /// The path to a JSON file.
        input: PathBuf,
        /// Where to write the dump. Defaults to the input path plus the configured suffix.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rebuild a syntax tree from a dump and the exact JSON file it was dumped from.
    Load {
        /// The path to the JSON file that was dumped.
        input: PathBuf,
        /// The dump to load. Defaults to the input path plus the configured suffix.
        #[arg(long)]
        dump: Option<PathBuf>,
        /// Also parse the JSON file and fail if the trees differ.
        #[arg(long)]
        verify: bool,
    },
}

fn main() -> anyhow::Result<()> {
    logging::setup_logging();

    let cli = Args::parse();

    debug!(command = ?cli.command);

    let config = Config::builder()
        .env()
        .file(cli.config.clone().unwrap_or_else(|| PathBuf::from("stjson.toml")))
        .load()
        .context("failed to load configuration")?;

    debug!(?config);

    match cli.command {
        Command::Check { input } => {
            parse_file(&config, &input)?;
            println!("{}: ok", input.display());
        }
        Command::Inspect {
            input,
            stats,
            json,
        } => {
            let (_, root) = parse_file(&config, &input)?;
            if !stats {
                println!("{}", jsontree::inspect::inspect(&root));
            } else if json {
                println!("{}", serde_json::to_string_pretty(&Stats::of(&root))?);
            } else {
                println!("{}", Stats::of(&root));
            }
        }
        Command::Dump { input, output } => {
            let output = output.unwrap_or_else(|| dump_path(&input, &config.dump_suffix));
            dump_file(&config, &input, &output)?;
            println!("{} -> {}", input.display(), output.display());
        }
        Command::Load {
            input,
            dump,
            verify,
        } => {
            let dump = dump.unwrap_or_else(|| dump_path(&input, &config.dump_suffix));
            let root = load_file(&config, &input, &dump, verify)?;
            println!("{}", jsontree::inspect::inspect(&root));
        }
    }

    Ok(())
}

fn read_source(input: &Path) -> anyhow::Result<String> {
    let bytes = match std::fs::read(input) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(path = ?input, "failed to read input");
            return Err(e).with_context(|| format!("failed to read file `{}`", input.display()));
        }
    };

    match String::from_utf8(bytes) {
        Ok(source) => Ok(source),
        Err(e) => {
            let err = ParseError::InvalidEncoding {
                valid_up_to: e.utf8_error().valid_up_to(),
            };
            bail!("failed to parse `{}`: {err}", input.display());
        }
    }
}

/// Read and parse `input`, printing a report that points at the offending bytes on failure.
fn parse_file(config: &Config, input: &Path) -> anyhow::Result<(String, Root)> {
    let source = read_source(input)?;
    let options = ParseOptions {
        max_depth: config.max_depth,
    };

    match jsontree::parse_with(&source, &options) {
        Ok(root) => Ok((source, root)),
        Err(err) => {
            let path = input.display().to_string();
            parse_error_report(&path, &source, &err)
                .eprint((&path, Source::from(&source)))
                .context("failed to print diagnostics")?;
            bail!("failed to parse `{path}`");
        }
    }
}

fn parse_error_report<'a>(
    path: &'a String,
    source: &str,
    err: &ParseError,
) -> Report<'a, (&'a String, Range<usize>)> {
    let span = char_span(source, err.location());
    let label = match err {
        ParseError::UnexpectedByte { .. } => "no JSON token starts here",
        ParseError::TrailingTokens { .. } => "the document already ended",
        ParseError::NestingTooDeep { .. } => "nested too deeply",
        _ => "unexpected here",
    };

    Report::build(ReportKind::Error, path, span.start)
        .with_message(err.to_string())
        .with_label(
            Label::new((path, span))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
}

/// Reports index characters, the library deals in bytes.
fn char_span(source: &str, location: Location) -> Range<usize> {
    let chars_before = |offset: usize| source.get(..offset).map(|prefix| prefix.chars().count());
    let start = chars_before(location.start_offset).unwrap_or(0);
    let end = chars_before(location.end_offset).unwrap_or(start + 1);
    start..end
}

fn dump_path(input: &Path, suffix: &str) -> PathBuf {
    let mut path = input.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

fn dump_file(config: &Config, input: &Path, output: &Path) -> anyhow::Result<()> {
    let (source, root) = parse_file(config, input)?;
    let dumped = jsontree::dump(&root)
        .with_context(|| format!("failed to dump `{}`", input.display()))?;

    if config.verify_after_dump {
        let loaded = jsontree::load(&source, &dumped).context("failed to reload fresh dump")?;
        if loaded != root {
            bail!("reloading the dump of `{}` produced a different tree", input.display());
        }
        debug!("dump verified");
    }

    std::fs::write(output, &dumped)
        .with_context(|| format!("failed to write dump `{}`", output.display()))?;
    info!(path = ?output, bytes = dumped.len(), "wrote dump");
    Ok(())
}

fn load_file(config: &Config, input: &Path, dump: &Path, verify: bool) -> anyhow::Result<Root> {
    let source = read_source(input)?;
    let dumped = std::fs::read(dump)
        .with_context(|| format!("failed to read dump `{}`", dump.display()))?;

    let root = jsontree::load(&source, &dumped)
        .with_context(|| format!("failed to load dump `{}`", dump.display()))?;

    // Inspecting and comparing recurse, so hold loaded trees to the same limit as parsing.
    let depth = root.depth();
    if depth > config.max_depth {
        bail!(
            "dump `{}` nests {depth} levels deep, more than the limit of {}",
            dump.display(),
            config.max_depth
        );
    }

    if verify {
        let (_, parsed) = parse_file(config, input)?;
        if parsed != root {
            bail!(
                "dump `{}` does not match `{}`; was it made from a different version of the file?",
                dump.display(),
                input.display()
            );
        }
    }

    Ok(root)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use jsontree::{LoadError, Location, ParseError};

    use confique::Config as _;

    use super::{char_span, dump_file, dump_path, load_file, parse_error_report};
    use crate::config::Config;

    fn config() -> Config {
        Config::builder().load().unwrap()
    }

    #[test]
    fn dump_path_appends_the_suffix() {
        assert_eq!(
            dump_path(Path::new("dir/data.json"), ".ser"),
            Path::new("dir/data.json.ser")
        );
    }

    #[test]
    fn char_span_counts_characters() {
        let source = "[\"é\", x]";
        assert_eq!(char_span(source, Location::new(7, 8)), 6..7);
        assert_eq!(char_span(source, Location::empty(source.len())), 8..8);
    }

    #[test]
    fn parse_errors_render_as_reports() {
        let path = "data.json".to_string();
        let source = "[1,]";
        let err = jsontree::parse(source).unwrap_err();

        let mut rendered = Vec::new();
        parse_error_report(&path, source, &err)
            .write((&path, ariadne::Source::from(source)), &mut rendered)
            .unwrap();
        let rendered = String::from_utf8_lossy(&rendered);
        assert!(rendered.contains("expected a value, found `]` at offset 3"));
        assert!(rendered.contains("data.json"));
    }

    #[test]
    fn dump_then_load_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.json");
        std::fs::write(&input, "{\"a\": [1, 2.50, \"x\"], \"a\": null}\n").unwrap();
        let output = dump_path(&input, ".ser");

        let config = Config {
            verify_after_dump: true,
            ..config()
        };
        dump_file(&config, &input, &output).unwrap();
        let loaded = load_file(&config, &input, &output, true).unwrap();
        let parsed = jsontree::parse(&std::fs::read_to_string(&input).unwrap()).unwrap();
        assert_eq!(loaded, parsed);
    }

    #[test]
    fn load_reports_a_stale_dump() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.json");
        let output = dir.path().join("doc.bin");
        std::fs::write(&input, "[1, 2]").unwrap();
        dump_file(&config(), &input, &output).unwrap();

        std::fs::write(&input, "[true]").unwrap();
        let err = load_file(&config(), &input, &output, true).unwrap_err();
        assert!(err.to_string().contains("does not match"));

        std::fs::write(&input, "[3]").unwrap();
        let err = load_file(&config(), &input, &output, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::Malformed { .. })
        ));
    }

    #[test]
    fn loaded_trees_deeper_than_the_limit_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.json");
        let output = dir.path().join("doc.bin");
        std::fs::write(&input, "[[[1]], []]").unwrap();
        dump_file(&config(), &input, &output).unwrap();

        let shallow = Config {
            max_depth: 2,
            ..config()
        };
        let err = load_file(&shallow, &input, &output, true).unwrap_err();
        assert!(err.to_string().contains("nests 3 levels deep"), "{err}");

        let exact = Config {
            max_depth: 3,
            ..config()
        };
        assert!(load_file(&exact, &input, &output, true).is_ok());
    }

    #[test]
    fn invalid_utf8_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.json");
        std::fs::write(&input, b"[\"\xff\"]").unwrap();
        let err = dump_file(&config(), &input, &dir.path().join("out")).unwrap_err();
        assert!(err
            .to_string()
            .contains(&ParseError::InvalidEncoding { valid_up_to: 2 }.to_string()));
    }
}
