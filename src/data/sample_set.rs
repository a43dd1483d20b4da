use std::ops::{Index, IndexMut};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::data::label::Label;
use crate::data::sample::Sample;
use crate::error::{NetError, Result};

/// One row of a dataset file: `{ "input": [..], "label": 3 }`, where a
/// missing or `null` label means unlabeled.
#[derive(Debug, Deserialize)]
struct SampleRecord {
    input: Vec<f64>,
    #[serde(default)]
    label: Option<usize>,
}

/// Ordered collection of samples used for training and evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    pub fn new() -> SampleSet {
        SampleSet::default()
    }

    /// Reads a JSON array of sample records.
    pub fn load_json<P: AsRef<Path>>(path: P, class_count: usize) -> Result<SampleSet> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let records: Vec<SampleRecord> = serde_json::from_reader(reader)?;
        records
            .into_iter()
            .map(|record| Sample::new(&record.input, class_count, Label::from(record.label)))
            .collect()
    }

    pub fn add(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Sample> {
        self.samples.get_mut(index)
    }

    /// Replaces the sample at `index`, returning the old one.
    pub fn set(&mut self, index: usize, sample: Sample) -> Sample {
        std::mem::replace(&mut self.samples[index], sample)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Sample> {
        self.samples.iter_mut()
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    /// Uniform Fisher-Yates permutation of the contained samples.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.samples.shuffle(rng);
    }

    /// Fraction of samples whose prediction matches the true label.
    /// Every sample must have been scored; an empty set yields `0.0`.
    pub fn accuracy(&self) -> Result<f64> {
        if self.samples.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0usize;
        for sample in &self.samples {
            if !sample.is_scored() {
                return Err(NetError::UnscoredSample);
            }
            if sample.is_correct() {
                correct += 1;
            }
        }
        Ok(correct as f64 / self.samples.len() as f64)
    }

    /// Per-class sum of the signed error of every sample.
    pub fn total_error(&self) -> Result<Vec<f64>> {
        let class_count = self.samples.first().map_or(0, Sample::class_count);
        let mut total = vec![0.0; class_count];
        for sample in &self.samples {
            sample.accumulate_error_into(&mut total)?;
        }
        Ok(total)
    }
}

impl Index<usize> for SampleSet {
    type Output = Sample;

    fn index(&self, index: usize) -> &Sample {
        &self.samples[index]
    }
}

impl IndexMut<usize> for SampleSet {
    fn index_mut(&mut self, index: usize) -> &mut Sample {
        &mut self.samples[index]
    }
}

impl FromIterator<Sample> for SampleSet {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        SampleSet {
            samples: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SampleSet {
    type Item = Sample;
    type IntoIter = std::vec::IntoIter<Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl<'a> IntoIterator for &'a mut SampleSet {
    type Item = &'a mut Sample;
    type IntoIter = std::slice::IterMut<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter_mut()
    }
}
