use std::{
    fmt::{Debug, Display},
    path::Path,
    str::FromStr,
};

use itertools::Itertools;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    prefixtree::{ConsistencyMode, PtaBuilder, PtaKind},
    Alphabet, Dfa, DfaError, StateStatus, Symbol,
};

/// Reading and writing of datasets in the Abbadingo format.
pub mod abbadingo;
use abbadingo::AbbadingoParseError;

/// A word together with a label. The label reuses [`StateStatus`]: an accepted sample is
/// [`StateStatus::Accepting`], a rejected one [`StateStatus::Rejecting`] and an unlabelled one
/// [`StateStatus::Unknown`].
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct StringSample<S> {
    /// The symbols of the sample.
    pub word: Vec<S>,
    /// The classification of the sample.
    pub label: StateStatus,
}

impl<S: Symbol> StringSample<S> {
    /// Creates a new sample from a word and a label.
    pub fn new<W: IntoIterator<Item = S>>(word: W, label: StateStatus) -> Self {
        Self {
            word: word.into_iter().collect(),
            label,
        }
    }

    /// A sample that is accepted by the target language.
    pub fn accepted<W: IntoIterator<Item = S>>(word: W) -> Self {
        Self::new(word, StateStatus::Accepting)
    }

    /// A sample that is rejected by the target language.
    pub fn rejected<W: IntoIterator<Item = S>>(word: W) -> Self {
        Self::new(word, StateStatus::Rejecting)
    }

    /// A sample without classification, typically part of a test set.
    pub fn unlabelled<W: IntoIterator<Item = S>>(word: W) -> Self {
        Self::new(word, StateStatus::Unknown)
    }

    /// The number of symbols in the word.
    pub fn len(&self) -> usize {
        self.word.len()
    }

    /// Returns true for the empty word.
    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    /// Checks whether the sample agrees with `dfa`. Unlabelled samples always agree. A labelled
    /// sample disagrees if it reaches a state with the opposite label, an accepted sample also
    /// disagrees if its run leaves the transition function.
    pub fn consistent_with(&self, dfa: &Dfa<S>) -> bool {
        if self.label.is_unknown() {
            return true;
        }
        match dfa.run(&self.word).and_then(|q| dfa.status(q)) {
            Some(status) => !status.contradicts(self.label),
            None => !self.label.is_accepting(),
        }
    }
}

impl<S: Symbol> Debug for StringSample<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t\"{}\"",
            self.label,
            self.word.iter().map(|sym| sym.show()).join("")
        )
    }
}

/// The formats from which a [`Dataset`] can be loaded.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum DatasetFormat {
    /// One header line holding the number of strings and the alphabet size, followed by one
    /// line `<label> <length> <symbols...>` per string.
    #[default]
    Abbadingo,
    /// A JSON array of samples, each an object with the fields `word` and `label`.
    Json,
}

/// Errors that occur when a [`Dataset`] is read or written.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DatasetError {
    /// The input is not a valid Abbadingo file.
    Abbadingo(AbbadingoParseError),
    /// The input is not a valid JSON dataset, or the dataset could not be serialized.
    Json(String),
    /// The file could not be read or written.
    Io(String),
}

impl Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Abbadingo(err) => write!(f, "{err}"),
            DatasetError::Json(message) => write!(f, "Invalid JSON dataset: {message}"),
            DatasetError::Io(message) => write!(f, "Could not access dataset: {message}"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Abbadingo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AbbadingoParseError> for DatasetError {
    fn from(err: AbbadingoParseError) -> Self {
        DatasetError::Abbadingo(err)
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        DatasetError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        DatasetError::Json(err.to_string())
    }
}

/// An ordered collection of [`StringSample`]s. The order in which samples were added is kept
/// unless the dataset is explicitly sorted.
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset<S> {
    samples: Vec<StringSample<S>>,
}

impl<S: Symbol> Dataset<S> {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Appends a sample.
    pub fn push(&mut self, sample: StringSample<S>) {
        self.samples.push(sample);
    }

    /// The number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterates over the samples in order.
    pub fn iter(&self) -> std::slice::Iter<'_, StringSample<S>> {
        self.samples.iter()
    }

    /// Gives access to the samples as a slice.
    pub fn samples(&self) -> &[StringSample<S>] {
        &self.samples
    }

    /// Returns a copy of the dataset in which samples are ordered by length. The sort is stable,
    /// so samples of equal length keep their relative order.
    pub fn sorted_by_length(&self) -> Self {
        let mut samples = self.samples.clone();
        samples.sort_by_key(|sample| sample.len());
        Self { samples }
    }

    fn with_label(&self, label: StateStatus) -> Self {
        self.samples
            .iter()
            .filter(|sample| sample.label == label)
            .cloned()
            .collect()
    }

    /// The accepted samples.
    pub fn accepting(&self) -> Self {
        self.with_label(StateStatus::Accepting)
    }

    /// The rejected samples.
    pub fn rejecting(&self) -> Self {
        self.with_label(StateStatus::Rejecting)
    }

    /// The samples without a label.
    pub fn unlabelled(&self) -> Self {
        self.with_label(StateStatus::Unknown)
    }

    /// The number of accepted samples.
    pub fn accepting_count(&self) -> usize {
        self.samples.iter().filter(|s| s.label.is_accepting()).count()
    }

    /// The number of rejected samples.
    pub fn rejecting_count(&self) -> usize {
        self.samples.iter().filter(|s| s.label.is_rejecting()).count()
    }

    /// Fraction of all samples that are accepted, `0.0` for an empty dataset.
    pub fn accepting_ratio(&self) -> f64 {
        self.ratio(self.accepting_count())
    }

    /// Fraction of all samples that are rejected, `0.0` for an empty dataset.
    pub fn rejecting_ratio(&self) -> f64 {
        self.ratio(self.rejecting_count())
    }

    fn ratio(&self, count: usize) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            count as f64 / self.len() as f64
        }
    }

    /// Collects every symbol that occurs in some sample, in order of first occurrence.
    pub fn alphabet(&self) -> Alphabet<S> {
        self.samples
            .iter()
            .flat_map(|sample| sample.word.iter().copied())
            .collect()
    }

    /// Checks whether some sample has exactly the given word, regardless of its label.
    pub fn contains(&self, word: &[S]) -> bool {
        self.samples.iter().any(|sample| sample.word == word)
    }

    /// Checks whether every sample is consistent with `dfa`, see
    /// [`StringSample::consistent_with`].
    pub fn consistent_with(&self, dfa: &Dfa<S>) -> bool {
        self.samples.iter().all(|sample| {
            let consistent = sample.consistent_with(dfa);
            if !consistent {
                trace!("sample {:?} is inconsistent with the DFA", sample);
            }
            consistent
        })
    }

    /// The fraction of labelled samples that `dfa` classifies with their own label. Unlabelled
    /// samples are ignored, if there are no labelled samples at all the accuracy is `1.0`.
    pub fn accuracy(&self, dfa: &Dfa<S>) -> f64 {
        let (correct, total) = self
            .samples
            .iter()
            .filter(|sample| sample.label.is_labelled())
            .fold((0usize, 0usize), |(correct, total), sample| {
                if dfa.classify(&sample.word) == sample.label {
                    (correct + 1, total + 1)
                } else {
                    (correct, total + 1)
                }
            });
        if total == 0 {
            1.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Builds a prefix tree from the samples in their current order, see [`PtaBuilder`].
    pub fn pta(&self, kind: PtaKind, mode: ConsistencyMode) -> Result<Dfa<S>, DfaError> {
        let mut builder = PtaBuilder::new().with_kind(kind).with_mode(mode);
        builder.extend(self.samples.iter())?;
        Ok(builder.finish())
    }

    /// Builds the augmented prefix tree acceptor which contains both the accepted and the
    /// rejected samples, aborting on the first contradiction.
    pub fn apta(&self) -> Result<Dfa<S>, DfaError> {
        self.pta(PtaKind::Apta, ConsistencyMode::Strict)
    }
}

impl<S: Symbol + FromStr + DeserializeOwned> Dataset<S> {
    /// Parses a dataset from text in the given `format`.
    pub fn parse(input: &str, format: DatasetFormat) -> Result<Self, DatasetError> {
        match format {
            DatasetFormat::Abbadingo => Ok(abbadingo::parse(input)?),
            DatasetFormat::Json => Ok(serde_json::from_str(input)?),
        }
    }

    /// Reads the file at `path` and parses it in the given `format`.
    pub fn load<P: AsRef<Path>>(path: P, format: DatasetFormat) -> Result<Self, DatasetError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let dataset = Self::parse(&contents, format)?;
        debug!("loaded {} strings from {}", dataset.len(), path.as_ref().display());
        Ok(dataset)
    }
}

impl<S: Symbol + Serialize> Dataset<S> {
    /// Renders the dataset in the given `format`.
    pub fn render(&self, format: DatasetFormat) -> Result<String, DatasetError> {
        match format {
            DatasetFormat::Abbadingo => Ok(self.to_abbadingo()),
            DatasetFormat::Json => self.to_json(),
        }
    }

    /// Serializes the samples into a pretty printed JSON array.
    pub fn to_json(&self) -> Result<String, DatasetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the dataset to `path` in the given `format`.
    pub fn save<P: AsRef<Path>>(&self, path: P, format: DatasetFormat) -> Result<(), DatasetError> {
        std::fs::write(path, self.render(format)?)?;
        Ok(())
    }
}

impl<S: Symbol> Default for Dataset<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Symbol> FromIterator<StringSample<S>> for Dataset<S> {
    fn from_iter<T: IntoIterator<Item = StringSample<S>>>(iter: T) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

impl<S: Symbol> Extend<StringSample<S>> for Dataset<S> {
    fn extend<T: IntoIterator<Item = StringSample<S>>>(&mut self, iter: T) {
        self.samples.extend(iter)
    }
}

impl<S> IntoIterator for Dataset<S> {
    type Item = StringSample<S>;
    type IntoIter = std::vec::IntoIter<StringSample<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a, S> IntoIterator for &'a Dataset<S> {
    type Item = &'a StringSample<S>;
    type IntoIter = std::slice::Iter<'a, StringSample<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl<S: Symbol> Debug for Dataset<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dataset with {} samples", self.len())?;
        for sample in &self.samples {
            write!(f, "\n\t{:?}", sample)?;
        }
        Ok(())
    }
}

/// Builds a [`Dataset`] over `char`s from string literals. Positive words follow `pos`,
/// negative ones follow `neg`, and the order within the dataset is positive words first.
///
/// ```
/// use dfa_toolkit::sample;
///
/// let dataset = sample!(pos "a", "ab"; neg "", "b");
/// assert_eq!(dataset.accepting_count(), 2);
/// assert_eq!(dataset.rejecting_count(), 2);
/// ```
#[macro_export]
macro_rules! sample {
    (pos $($pos:expr),* ; neg $($neg:expr),* $(;)?) => {
        [$($pos),*]
            .into_iter()
            .map(|p: &str| $crate::StringSample::accepted(p.chars()))
            .chain(
                [$($neg),*]
                    .into_iter()
                    .map(|n: &str| $crate::StringSample::rejected(n.chars())),
            )
            .collect::<$crate::Dataset<char>>()
    };
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use tracing_test::traced_test;

    use crate::{Dfa, StateStatus, StringSample};

    use super::{Dataset, DatasetError, DatasetFormat};

    #[test]
    fn sample_macro_keeps_order() {
        let dataset = sample!(pos "ab", "a"; neg "", "b");
        let words = dataset
            .iter()
            .map(|s| (s.word.iter().collect::<String>(), s.label))
            .collect_vec();
        assert_eq!(
            words,
            vec![
                ("ab".to_string(), StateStatus::Accepting),
                ("a".to_string(), StateStatus::Accepting),
                ("".to_string(), StateStatus::Rejecting),
                ("b".to_string(), StateStatus::Rejecting),
            ]
        );
    }

    #[test]
    fn sorting_is_stable() {
        let dataset = sample!(pos "bb", "a", "ab"; neg "b");
        let sorted = dataset.sorted_by_length();
        let words = sorted
            .iter()
            .map(|s| s.word.iter().collect::<String>())
            .collect_vec();
        assert_eq!(words, vec!["a", "b", "bb", "ab"]);
        assert_eq!(dataset.len(), sorted.len());
    }

    #[test]
    fn statistics() {
        let mut dataset = sample!(pos "a", "ab", "abb"; neg "b");
        dataset.push(StringSample::unlabelled("ba".chars()));
        assert_eq!(dataset.accepting_count(), 3);
        assert_eq!(dataset.rejecting_count(), 1);
        assert_eq!(dataset.accepting().len(), 3);
        assert_eq!(dataset.rejecting().len(), 1);
        assert_eq!(dataset.unlabelled().len(), 1);
        assert!((dataset.accepting_ratio() - 0.6).abs() < f64::EPSILON);
        assert!((dataset.rejecting_ratio() - 0.2).abs() < f64::EPSILON);
        assert_eq!(dataset.alphabet().iter().collect_vec(), vec!['a', 'b']);
        assert!(dataset.contains(&['a', 'b']));
        assert!(!dataset.contains(&['b', 'b']));

        let empty: Dataset<char> = Dataset::new();
        assert_eq!(empty.accepting_ratio(), 0.0);
        assert!(empty.alphabet().is_empty());
    }

    #[test]
    #[traced_test]
    fn consistency_and_accuracy() {
        let dataset = sample!(pos "a"; neg "ab", "");
        let apta = dataset.apta().unwrap();
        assert!(dataset.consistent_with(&apta));
        assert_eq!(dataset.accuracy(&apta), 1.0);

        // a DFA that accepts everything it can read
        let mut dfa = Dfa::new();
        dfa.set_status(0, StateStatus::Accepting).unwrap();
        dfa.add_transition(0, 'a', 0).unwrap();
        assert!(!dataset.consistent_with(&dfa));
        assert!((dataset.accuracy(&dfa) - 1.0 / 3.0).abs() < 1e-9);

        let unseen = sample!(pos "b"; neg "c");
        assert!(!unseen.consistent_with(&apta));
        assert!(StringSample::rejected("c".chars()).consistent_with(&apta));
        assert!(StringSample::unlabelled("zz".chars()).consistent_with(&apta));
    }

    #[test]
    fn json_round_trip() {
        let mut dataset = sample!(pos "ab", ""; neg "b");
        dataset.push(StringSample::unlabelled("ba".chars()));
        let json = dataset.to_json().unwrap();
        assert!(json.contains("\"label\": \"Rejecting\""));
        let back: Dataset<char> = Dataset::parse(&json, DatasetFormat::Json).unwrap();
        assert_eq!(back, dataset);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        dataset.save(&path, DatasetFormat::Json).unwrap();
        assert_eq!(
            Dataset::<char>::load(&path, DatasetFormat::Json).unwrap(),
            dataset
        );
    }

    #[test]
    fn invalid_json_dataset() {
        let result = Dataset::<u32>::parse("[{\"word\": [1], \"label\": 1}]", DatasetFormat::Json);
        assert!(matches!(result, Err(DatasetError::Json(_))));
        let result = Dataset::<u32>::load("/does/not/exist.json", DatasetFormat::Json);
        assert!(matches!(result, Err(DatasetError::Io(_))));
    }

    #[test]
    fn accuracy_without_labels() {
        let dataset: Dataset<char> = [StringSample::unlabelled("a".chars())]
            .into_iter()
            .collect();
        assert_eq!(dataset.accuracy(&Dfa::new()), 1.0);
    }
}
