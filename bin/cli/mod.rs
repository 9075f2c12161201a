use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Toolkit {
    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub verbose: bool,
    /// Turn on debugging information
    #[arg(short, long, global = true)]
    pub debug: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Builds the prefix tree acceptor of a dataset")]
    Pta {
        /// Dataset to read, stdin if omitted
        input: Option<String>,
        #[arg(short, long, value_enum, default_value_t = InputFormat::Abbadingo)]
        input_format: InputFormat,
        /// File to write the result to, stdout if omitted
        #[arg(short, long)]
        output: Option<String>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Describe)]
        format: OutputFormat,
        /// Skip rejected strings and build a plain PTA
        #[arg(long)]
        positive_only: bool,
        /// Keep the first label on contradictions instead of failing
        #[arg(long)]
        best_effort: bool,
        /// Insert strings ordered by length
        #[arg(long)]
        sort: bool,
    },
    #[command(about = "Prints statistics of a dataset and its APTA")]
    Stats {
        /// Dataset to read, stdin if omitted
        input: Option<String>,
        #[arg(short, long, value_enum, default_value_t = InputFormat::Abbadingo)]
        input_format: InputFormat,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Listing of states and their transitions
    Describe,
    /// Transition table
    Table,
    /// Graphviz DOT
    Dot,
    /// JSON that can be read back into a DFA
    Json,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum InputFormat {
    /// Header line followed by one `label length symbols...` line per string
    Abbadingo,
    /// JSON array of samples
    Json,
}
