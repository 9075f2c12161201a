use anyhow::Context;
use clap::Parser;
use dfa_toolkit::{ConsistencyMode, Dataset, DatasetFormat, Dfa, PtaBuilder, PtaKind, ToDot};
use itertools::Itertools;
use owo_colors::{OwoColorize, Stream::Stdout};
use tracing::{debug, info, warn, Level};

mod cli;
mod io;

use cli::{Commands, InputFormat, OutputFormat, Toolkit};

fn load(input: Option<&String>, format: InputFormat) -> anyhow::Result<Dataset<u32>> {
    let format = match format {
        InputFormat::Abbadingo => DatasetFormat::Abbadingo,
        InputFormat::Json => DatasetFormat::Json,
    };
    let text = io::from_file_or_stdin(input)?;
    let dataset = Dataset::parse(&text, format).context("Could not parse input dataset")?;
    info!(
        "Read {} strings ({} accepted, {} rejected)",
        dataset.len(),
        dataset.accepting_count(),
        dataset.rejecting_count()
    );
    Ok(dataset)
}

fn render(dfa: &Dfa<u32>, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Describe => dfa.describe(),
        OutputFormat::Table => format!("{}\n", dfa.transition_table()),
        OutputFormat::Dot => dfa.dot_representation(),
        OutputFormat::Json => dfa.to_json().context("Could not serialize DFA")? + "\n",
    })
}

fn build(
    dataset: &Dataset<u32>,
    kind: PtaKind,
    mode: ConsistencyMode,
) -> anyhow::Result<Dfa<u32>> {
    let mut builder = PtaBuilder::new().with_kind(kind).with_mode(mode);
    builder
        .extend(dataset.iter())
        .context("Could not build prefix tree")?;
    if !builder.conflicts().is_empty() {
        warn!("Ignored {} contradicting labels", builder.conflicts().len());
    }
    let pta = builder.finish();
    info!(
        "Built {:?} with {} states and {} transitions",
        kind,
        pta.size(),
        pta.transitions_count()
    );
    Ok(pta)
}

fn stats(dataset: &Dataset<u32>) -> anyhow::Result<String> {
    let apta = dataset.apta().context("Dataset contradicts itself")?;
    let alphabet = dataset.alphabet().sorted();
    Ok([
        format!("{}", "Dataset".if_supports_color(Stdout, |s| s.bold())),
        format!("  strings:   {}", dataset.len()),
        format!(
            "  accepted:  {} ({:.2})",
            dataset.accepting_count().if_supports_color(Stdout, |n| n.green()),
            dataset.accepting_ratio()
        ),
        format!(
            "  rejected:  {} ({:.2})",
            dataset.rejecting_count().if_supports_color(Stdout, |n| n.red()),
            dataset.rejecting_ratio()
        ),
        format!("  unlabelled: {}", dataset.unlabelled().len()),
        format!(
            "  alphabet:  {{{}}}",
            alphabet.iter().map(|sym| sym.to_string()).join(", ")
        ),
        format!("{}", "APTA".if_supports_color(Stdout, |s| s.bold())),
        format!(
            "  states:      {}",
            apta.size().if_supports_color(Stdout, |n| n.blue())
        ),
        format!("  transitions: {}", apta.transitions_count()),
        format!("  depth:       {}", apta.depth()),
        format!("  leaves:      {}", apta.leaves_count()),
    ]
    .join("\n")
        + "\n")
}

fn main() -> anyhow::Result<()> {
    let args = Toolkit::parse();

    let level = if args.verbose {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Could not install logging subscriber")?;

    match args.command {
        Commands::Pta {
            input,
            input_format,
            output,
            format,
            positive_only,
            best_effort,
            sort,
        } => {
            let mut dataset = load(input.as_ref(), input_format)?;
            if sort {
                debug!("Sorting strings by length");
                dataset = dataset.sorted_by_length();
            }
            let kind = if positive_only {
                PtaKind::Pta
            } else {
                PtaKind::Apta
            };
            let mode = if best_effort {
                ConsistencyMode::BestEffort
            } else {
                ConsistencyMode::Strict
            };
            let pta = build(&dataset, kind, mode)?;
            io::to_file_or_stdout(output.as_ref(), &render(&pta, format)?)
        }
        Commands::Stats {
            input,
            input_format,
        } => {
            let dataset = load(input.as_ref(), input_format)?;
            io::to_file_or_stdout(None, &stats(&dataset)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use dfa_toolkit::{ConsistencyMode, Dataset, PtaKind};
    use tracing_test::traced_test;

    use super::{build, stats};

    const CONTRADICTING: &str = "3 2\n1 1 0\n0 1 0\n1 2 0 1\n";

    #[test]
    #[traced_test]
    fn best_effort_conflicts_are_reported_once() {
        let dataset = Dataset::<u32>::try_from(CONTRADICTING).unwrap();
        let pta = build(&dataset, PtaKind::Apta, ConsistencyMode::BestEffort).unwrap();
        assert_eq!(pta.size(), 3);
        assert!(logs_contain("Ignored 1 contradicting labels"));
        logs_assert(|lines: &[&str]| {
            let reported = lines
                .iter()
                .filter(|line| line.contains("cannot mark it as REJECTING"))
                .count();
            match reported {
                1 => Ok(()),
                n => Err(format!("conflict logged {n} times")),
            }
        });
        assert!(build(&dataset, PtaKind::Apta, ConsistencyMode::Strict).is_err());
    }

    #[test]
    fn stats_without_terminal_are_plain() {
        let dataset = Dataset::<u32>::try_from("2 2\n1 1 0\n0 2 0 1\n").unwrap();
        owo_colors::set_override(false);
        let plain = stats(&dataset).unwrap();
        owo_colors::unset_override();
        assert!(!plain.contains('\x1b'));
        assert!(plain.contains("  accepted:  1 (0.50)"));
        assert!(plain.contains("  states:      3"));
    }
}
