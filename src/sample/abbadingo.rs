use std::{fmt::Display, path::Path, str::FromStr};

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{Alphabet, StateStatus, Symbol};

use super::{Dataset, DatasetError, StringSample};

/// Abstracts the types of errors that can occur when parsing a [`Dataset`] in the Abbadingo
/// format. Line numbers start at 1 and refer to the raw input, including blank lines.
#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum AbbadingoParseError {
    /// The input contains no non-blank line.
    MissingHeader,
    /// The header is not of the form `<string count> <alphabet size>`.
    MalformedHeader { line: usize, content: String },
    /// The label is none of `1`, `0` or `-1`.
    UnknownLabel { line: usize, token: String },
    /// The length is missing or not a non-negative integer.
    MalformedLength { line: usize, token: String },
    /// The declared length differs from the number of symbols on the line.
    LengthMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A symbol could not be parsed into the requested symbol type.
    MalformedSymbol { line: usize, token: String },
    /// The header announces a different number of strings than the file contains.
    CountMismatch { expected: usize, found: usize },
    /// More distinct symbols occur than the header declares.
    AlphabetOverflow { line: usize, declared: usize },
    /// A numeric symbol is not below the alphabet size declared in the header.
    SymbolOutOfRange {
        line: usize,
        token: String,
        declared: usize,
    },
}

impl Display for AbbadingoParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbbadingoParseError::MissingHeader => write!(f, "Missing header"),
            AbbadingoParseError::MalformedHeader { line, content } => {
                write!(f, "Malformed header in line {line}: {content:?}")
            }
            AbbadingoParseError::UnknownLabel { line, token } => {
                write!(f, "Unknown string label {token:?} in line {line}")
            }
            AbbadingoParseError::MalformedLength { line, token } => {
                write!(f, "Invalid string length {token:?} in line {line}")
            }
            AbbadingoParseError::LengthMismatch {
                line,
                expected,
                found,
            } => write!(
                f,
                "String in line {line} declares length {expected} but has {found} symbols"
            ),
            AbbadingoParseError::MalformedSymbol { line, token } => {
                write!(f, "Could not parse symbol {token:?} in line {line}")
            }
            AbbadingoParseError::CountMismatch { expected, found } => write!(
                f,
                "Header announces {expected} strings but {found} were found"
            ),
            AbbadingoParseError::AlphabetOverflow { line, declared } => write!(
                f,
                "Line {line} uses more than the {declared} symbols declared in the header"
            ),
            AbbadingoParseError::SymbolOutOfRange {
                line,
                token,
                declared,
            } => write!(
                f,
                "Symbol {token:?} in line {line} is outside of the declared alphabet 0..{declared}"
            ),
        }
    }
}

impl std::error::Error for AbbadingoParseError {}

fn parse_label(line: usize, token: &str) -> Result<StateStatus, AbbadingoParseError> {
    match token {
        "1" => Ok(StateStatus::Accepting),
        "0" => Ok(StateStatus::Rejecting),
        "-1" => Ok(StateStatus::Unknown),
        _ => Err(AbbadingoParseError::UnknownLabel {
            line,
            token: token.to_string(),
        }),
    }
}

fn label_token(label: StateStatus) -> &'static str {
    match label {
        StateStatus::Accepting => "1",
        StateStatus::Rejecting => "0",
        StateStatus::Unknown => "-1",
    }
}

/// Parses a dataset in the Abbadingo format. The first non-blank line is the header
/// `<string count> <alphabet size>`, every following non-blank line holds one string as
/// `<label> <length> <symbol>*` with the label `1` (accepted), `0` (rejected) or `-1`
/// (unlabelled). Tokens are separated by whitespace and every symbol token is parsed with
/// [`FromStr`].
///
/// The alphabet size from the header bounds the input in two ways: no more distinct symbols
/// may occur than it declares, and a symbol token that is a non-negative integer must be
/// smaller than it, as numeric symbols range over `0..size`.
pub fn parse<S: Symbol + FromStr>(input: &str) -> Result<Dataset<S>, AbbadingoParseError> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (header_line, header) = lines.next().ok_or(AbbadingoParseError::MissingHeader)?;
    let malformed_header = || AbbadingoParseError::MalformedHeader {
        line: header_line,
        content: header.to_string(),
    };
    let (count, alphabet_size) = header
        .split_whitespace()
        .map(|token| token.parse::<usize>())
        .collect_tuple()
        .ok_or_else(malformed_header)?;
    let count = count.map_err(|_| malformed_header())?;
    let alphabet_size = alphabet_size.map_err(|_| malformed_header())?;
    trace!("header announces {count} strings over {alphabet_size} symbols");

    let mut dataset = Dataset::new();
    let mut alphabet = Alphabet::new();
    for (line, content) in lines {
        let mut tokens = content.split_whitespace();
        // the line is non-blank, so there is at least one token
        let label = parse_label(line, tokens.next().unwrap_or_default())?;
        let length_token = tokens.next().unwrap_or_default();
        let length = length_token
            .parse::<usize>()
            .map_err(|_| AbbadingoParseError::MalformedLength {
                line,
                token: length_token.to_string(),
            })?;
        let word = tokens
            .map(|token| {
                if matches!(token.parse::<usize>(), Ok(value) if value >= alphabet_size) {
                    return Err(AbbadingoParseError::SymbolOutOfRange {
                        line,
                        token: token.to_string(),
                        declared: alphabet_size,
                    });
                }
                token
                    .parse::<S>()
                    .map_err(|_| AbbadingoParseError::MalformedSymbol {
                        line,
                        token: token.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if word.len() != length {
            return Err(AbbadingoParseError::LengthMismatch {
                line,
                expected: length,
                found: word.len(),
            });
        }
        alphabet.extend(word.iter().copied());
        if alphabet.len() > alphabet_size {
            return Err(AbbadingoParseError::AlphabetOverflow {
                line,
                declared: alphabet_size,
            });
        }
        dataset.push(StringSample { word, label });
    }

    if dataset.len() != count {
        return Err(AbbadingoParseError::CountMismatch {
            expected: count,
            found: dataset.len(),
        });
    }
    debug!(
        "parsed {} strings ({} accepted, {} rejected)",
        dataset.len(),
        dataset.accepting_count(),
        dataset.rejecting_count()
    );
    Ok(dataset)
}

impl<S: Symbol + FromStr> TryFrom<&str> for Dataset<S> {
    type Error = AbbadingoParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        parse(value)
    }
}

impl<S: Symbol + FromStr> Dataset<S> {
    /// Parses a dataset from a string in the Abbadingo format, see [`parse`].
    pub fn from_abbadingo_str(input: &str) -> Result<Self, AbbadingoParseError> {
        parse(input)
    }
}

impl<S: Symbol> Dataset<S> {
    /// Renders the dataset in the Abbadingo format. Samples are written in their current order.
    /// The alphabet size in the header is the number of distinct symbols, raised to one more
    /// than the largest numeric symbol so that the output parses again.
    pub fn to_abbadingo(&self) -> String {
        let alphabet = self.alphabet();
        let numeric_bound = alphabet
            .iter()
            .filter_map(|sym| sym.show().parse::<usize>().ok())
            .map(|value| value + 1)
            .max()
            .unwrap_or(0);
        let alphabet_size = alphabet.len().max(numeric_bound);
        let mut lines = vec![format!("{} {}", self.len(), alphabet_size)];
        lines.extend(self.iter().map(|sample| {
            std::iter::once(label_token(sample.label).to_string())
                .chain(std::iter::once(sample.len().to_string()))
                .chain(sample.word.iter().map(|sym| sym.show()))
                .join(" ")
        }));
        lines.join("\n") + "\n"
    }

    /// Writes the dataset to `path` in the Abbadingo format, see [`Dataset::to_abbadingo`].
    pub fn write_abbadingo<P: AsRef<Path>>(&self, path: P) -> Result<(), DatasetError> {
        std::fs::write(path, self.to_abbadingo())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{Dataset, DatasetError, DatasetFormat, StateStatus, StringSample};

    use super::AbbadingoParseError;

    const SMALL: &str = "4 2
1 1 0
0 2 0 1

-1 0
1 3 1 1 0
";

    #[test]
    fn parse_small_dataset() {
        let dataset: Dataset<u32> = Dataset::parse(SMALL, DatasetFormat::Abbadingo).unwrap();
        let expected: Vec<StringSample<u32>> = vec![
            StringSample::accepted([0]),
            StringSample::rejected([0, 1]),
            StringSample::unlabelled([]),
            StringSample::accepted([1, 1, 0]),
        ];
        assert_eq!(dataset.samples(), expected.as_slice());
        assert_eq!(dataset.alphabet().sorted(), vec![0, 1]);
    }

    #[test]
    fn written_dataset_parses_back() {
        let dataset: Dataset<u32> = Dataset::try_from(SMALL).unwrap();
        let written = dataset.to_abbadingo();
        assert_eq!(written, "4 2\n1 1 0\n0 2 0 1\n-1 0\n1 3 1 1 0\n");
        assert_eq!(Dataset::<u32>::try_from(written.as_str()).unwrap(), dataset);
    }

    #[test]
    fn char_symbols() {
        let dataset: Dataset<char> = Dataset::try_from("2 2\n1 2 a b\n0 1 b").unwrap();
        assert_eq!(dataset.iter().next().unwrap().word, vec!['a', 'b']);
        assert_eq!(
            dataset.iter().nth(1).unwrap().label,
            StateStatus::Rejecting
        );
    }

    #[test]
    fn parse_errors() {
        let cases: Vec<(&str, AbbadingoParseError)> = vec![
            ("", AbbadingoParseError::MissingHeader),
            (
                "two 2\n",
                AbbadingoParseError::MalformedHeader {
                    line: 1,
                    content: "two 2".to_string(),
                },
            ),
            (
                "1 2 3\n",
                AbbadingoParseError::MalformedHeader {
                    line: 1,
                    content: "1 2 3".to_string(),
                },
            ),
            (
                "1 2\n2 1 0\n",
                AbbadingoParseError::UnknownLabel {
                    line: 2,
                    token: "2".to_string(),
                },
            ),
            (
                "1 2\n1\n",
                AbbadingoParseError::MalformedLength {
                    line: 2,
                    token: "".to_string(),
                },
            ),
            (
                "1 2\n1 x 0\n",
                AbbadingoParseError::MalformedLength {
                    line: 2,
                    token: "x".to_string(),
                },
            ),
            (
                "1 2\n\n1 3 0 1\n",
                AbbadingoParseError::LengthMismatch {
                    line: 3,
                    expected: 3,
                    found: 2,
                },
            ),
            (
                "1 2\n1 1 z\n",
                AbbadingoParseError::MalformedSymbol {
                    line: 2,
                    token: "z".to_string(),
                },
            ),
            (
                "3 2\n1 1 0\n",
                AbbadingoParseError::CountMismatch {
                    expected: 3,
                    found: 1,
                },
            ),
            (
                "2 2\n1 1 a\n0 1 1\n",
                AbbadingoParseError::MalformedSymbol {
                    line: 2,
                    token: "a".to_string(),
                },
            ),
            (
                "1 2\n1 2 0 7\n",
                AbbadingoParseError::SymbolOutOfRange {
                    line: 2,
                    token: "7".to_string(),
                    declared: 2,
                },
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(Dataset::<u32>::try_from(input), Err(expected), "{input:?}");
        }
    }

    #[test]
    fn distinct_symbols_beyond_header() {
        let result = Dataset::<char>::try_from("2 1\na 1 a\n");
        assert!(matches!(result, Err(AbbadingoParseError::UnknownLabel { .. })));
        assert_eq!(
            Dataset::<char>::try_from("2 1\n1 1 a\n0 1 b\n"),
            Err(AbbadingoParseError::AlphabetOverflow {
                line: 3,
                declared: 1,
            })
        );
    }

    #[test]
    fn header_covers_largest_symbol() {
        let dataset: Dataset<u32> = [StringSample::accepted([0, 7])].into_iter().collect();
        let written = dataset.to_abbadingo();
        assert_eq!(written, "1 8\n1 2 0 7\n");
        assert_eq!(Dataset::<u32>::try_from(written.as_str()).unwrap(), dataset);
    }

    #[test]
    fn write_and_load_file() {
        let dataset: Dataset<u32> = Dataset::try_from(SMALL).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.a");
        dataset.write_abbadingo(&path).unwrap();
        let loaded = Dataset::<u32>::load(&path, DatasetFormat::Abbadingo).unwrap();
        assert_eq!(loaded, dataset);

        let missing = dir.path().join("missing.a");
        let result = Dataset::<u32>::load(&missing, DatasetFormat::Abbadingo);
        assert!(matches!(result, Err(DatasetError::Io(_))));
        let result = Dataset::<u32>::load(&path, DatasetFormat::Json);
        assert!(matches!(result, Err(DatasetError::Json(_))));
    }
}
