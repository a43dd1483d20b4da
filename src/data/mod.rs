pub mod label;
pub mod sample;
pub mod sample_set;

pub use label::Label;
pub use sample::Sample;
pub use sample_set::SampleSet;
