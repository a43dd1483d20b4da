/// Two-class toy problem for ferrite-glyph.
///
/// Architecture: 2 sensors -> 3 hidden -> 2 classes, all sigmoid.
///
/// Run with:
///   cargo run --example separable
use ferrite_glyph::{ExecutionConfig, Label, Network, Sample, SampleSet};

fn main() -> ferrite_glyph::Result<()> {
    let points = [
        ([-1.0, -1.0], 0),
        ([-0.8, -1.0], 0),
        ([-1.0, -0.6], 0),
        ([1.0, 1.0], 1),
        ([1.0, 0.8], 1),
        ([0.7, 1.0], 1),
    ];
    let mut set: SampleSet = points
        .iter()
        .map(|(input, label)| Sample::new(input, 2, Label::Class(*label)))
        .collect::<ferrite_glyph::Result<_>>()?;

    let mut network = Network::new(&[2, 3, 2])?.with_execution(ExecutionConfig::parallel(2))?;
    let accuracy = network.train_on_set(&mut set, 50, 0.0)?;
    println!("last epoch: {accuracy:.1}% learned without updates");

    for (input, _) in &points {
        let mut sample = Sample::unlabeled(input, 2);
        let label = network.predict(&mut sample)?;
        println!("{input:?} -> {label} {:?}", sample.output());
    }
    Ok(())
}
