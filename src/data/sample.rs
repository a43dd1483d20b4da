use std::fmt;

use crate::data::label::Label;
use crate::error::{NetError, Result};
use crate::math::vector::{argmax, sum_of_squares};

/// One observation pushed through the network.
///
/// `output` starts as a one-hot placeholder for labeled samples and is
/// replaced by the final-layer activations on every forward pass. `error`
/// only exists after [`Sample::process_output`] and is always recomputed
/// from the true label, never from the placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    input: Vec<f64>,
    pub(crate) output: Vec<f64>,
    error: Option<Vec<f64>>,
    true_label: Label,
    predicted_label: Label,
}

impl Sample {
    pub fn new(input: &[f64], class_count: usize, true_label: Label) -> Result<Sample> {
        let mut output = vec![0.0; class_count];
        if let Label::Class(label) = true_label {
            if label >= class_count {
                return Err(NetError::LabelOutOfRange { label, class_count });
            }
            output[label] = 1.0;
        }
        Ok(Sample {
            input: input.to_vec(),
            output,
            error: None,
            true_label,
            predicted_label: Label::Undefined,
        })
    }

    /// An unlabeled sample, for inference only.
    pub fn unlabeled(input: &[f64], class_count: usize) -> Sample {
        Sample {
            input: input.to_vec(),
            output: vec![0.0; class_count],
            error: None,
            true_label: Label::Undefined,
            predicted_label: Label::Undefined,
        }
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn output(&self) -> &[f64] {
        &self.output
    }

    pub fn error(&self) -> Option<&[f64]> {
        self.error.as_deref()
    }

    pub fn class_count(&self) -> usize {
        self.output.len()
    }

    pub fn true_label(&self) -> Label {
        self.true_label
    }

    pub fn predicted_label(&self) -> Label {
        self.predicted_label
    }

    pub fn is_scored(&self) -> bool {
        self.error.is_some()
    }

    /// Derives the error vector and predicted label from the current output.
    pub fn process_output(&mut self) {
        let target = self.true_label.index();
        let error = self.error.get_or_insert_with(|| vec![0.0; self.output.len()]);
        for (i, (e, out)) in error.iter_mut().zip(&self.output).enumerate() {
            let expected = if Some(i) == target { 1.0 } else { 0.0 };
            *e = expected - out;
        }
        self.predicted_label = Label::Class(argmax(&self.output));
    }

    /// Summed squared error; zero only when the output is exactly one-hot on
    /// the true label.
    pub fn estimated_error(&self) -> Result<f64> {
        self.error
            .as_deref()
            .map(sum_of_squares)
            .ok_or(NetError::UnscoredSample)
    }

    /// Adds this sample's (signed, unsquared) error into `target`.
    pub fn accumulate_error_into(&self, target: &mut [f64]) -> Result<()> {
        let error = self.error.as_deref().ok_or(NetError::UnscoredSample)?;
        if target.len() != error.len() {
            return Err(NetError::AccumulatorShape {
                expected: error.len(),
                actual: target.len(),
            });
        }
        for (t, e) in target.iter_mut().zip(error) {
            *t += e;
        }
        Ok(())
    }

    pub fn is_correct(&self) -> bool {
        self.predicted_label == self.true_label
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sample: true {}", self.true_label)?;
        writeln!(f, "  input:     {:?}", self.input)?;
        writeln!(f, "  output:    {:?}", self.output)?;
        match &self.error {
            Some(error) => writeln!(f, "  error:     {error:?}")?,
            None => writeln!(f, "  error:     none")?,
        }
        write!(f, "  predicted: {}", self.predicted_label)
    }
}
