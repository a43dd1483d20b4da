use ferrite_glyph::network::DEFAULT_LEARNING_RATE;
use ferrite_glyph::train::MAX_TRAIN_ITERATIONS;
use ferrite_glyph::{train_loop, ExecutionConfig, ExecutionMode, Label, Network, Sample, SampleSet, TrainConfig};
use std::sync::mpsc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seeded(structure: &[usize], seed: u64) -> Network {
    Network::with_rng(structure, DEFAULT_LEARNING_RATE, &mut StdRng::seed_from_u64(seed)).unwrap()
}

fn weights_and_biases(network: &Network) -> Vec<Vec<(Vec<f64>, f64)>> {
    network
        .layers()
        .iter()
        .map(|layer| layer.iter().map(|u| (u.weights().to_vec(), u.bias_weight())).collect())
        .collect()
}

fn separable_set() -> SampleSet {
    [
        (vec![-1.0, -1.0], 0),
        (vec![-0.8, -1.0], 0),
        (vec![1.0, 1.0], 1),
        (vec![1.0, 0.8], 1),
    ]
    .into_iter()
    .map(|(input, label)| Sample::new(&input, 2, Label::Class(label)).unwrap())
    .collect()
}

#[test]
fn inference_is_identical_across_modes() {
    let base = seeded(&[6, 5, 3], 17);
    let mut sequential = base.clone().with_execution(ExecutionConfig::sequential()).unwrap();
    let mut parallel = base.with_execution(ExecutionConfig::parallel(4)).unwrap();

    let input = [0.1, 0.9, 0.3, 0.0, 1.0, 0.5];
    let mut a = Sample::new(&input, 3, Label::Class(2)).unwrap();
    let mut b = a.clone();
    sequential.infer(&mut a).unwrap();
    parallel.infer(&mut b).unwrap();

    assert_eq!(a.output(), b.output());
    assert_eq!(a.error(), b.error());
    assert_eq!(a.predicted_label(), b.predicted_label());

    // Repeating the pass does not drift.
    let mut c = Sample::new(&input, 3, Label::Class(2)).unwrap();
    sequential.infer(&mut c).unwrap();
    assert_eq!(a, c);
}

#[test]
fn scored_sample_satisfies_error_invariant() {
    let mut network = seeded(&[4, 6, 3], 5);
    let mut sample = Sample::new(&[0.2, 0.4, 0.6, 0.8], 3, Label::Class(1)).unwrap();
    network.infer(&mut sample).unwrap();

    let output = sample.output();
    let error = sample.error().unwrap();
    for i in 0..3 {
        let target = if i == 1 { 1.0 } else { 0.0 };
        assert_eq!(error[i], target - output[i]);
    }
    let best = (0..3).fold(0, |best, i| if output[i] > output[best] { i } else { best });
    assert_eq!(sample.predicted_label(), Label::Class(best));
    let squares: f64 = error.iter().map(|e| e * e).sum();
    assert_eq!(sample.estimated_error().unwrap(), squares);
}

#[test]
fn predict_returns_the_scored_label() {
    let mut network = seeded(&[3, 2], 2);
    let mut sample = Sample::unlabeled(&[0.3, 0.2, 0.1], 2);
    let label = network.predict(&mut sample).unwrap();
    assert!(label.is_defined());
    assert_eq!(label, sample.predicted_label());
}

/// Upstream widths 7 and 5 do not divide by 3 workers; 16 workers exceed
/// every width. Each case must update exactly what the sequential pass does.
#[test]
fn parallel_backward_matches_sequential_for_uneven_partitions() {
    for workers in [1, 3, 4, 16] {
        let base = seeded(&[7, 5, 3], 99);
        let mut sequential = base.clone();
        let mut parallel = base.clone().with_execution(ExecutionConfig::parallel(workers)).unwrap();

        let input = [0.9, 0.1, 0.5, 0.7, 0.3, 0.8, 0.6];
        let mut a = Sample::new(&input, 3, Label::Class(0)).unwrap();
        let mut b = a.clone();
        sequential.infer_with(&mut a, ExecutionMode::Sequential).unwrap();
        parallel.infer_with(&mut b, ExecutionMode::Parallel).unwrap();
        sequential.backward(&a, ExecutionMode::Sequential).unwrap();
        parallel.backward(&b, ExecutionMode::Parallel).unwrap();

        assert_eq!(
            weights_and_biases(&sequential),
            weights_and_biases(&parallel),
            "workers = {workers}"
        );

        // Every weight moved, so no upstream index was skipped.
        let before = weights_and_biases(&base);
        let after = weights_and_biases(&parallel);
        for (l, (old_layer, new_layer)) in before.iter().zip(&after).enumerate().skip(1) {
            for (old, new) in old_layer.iter().zip(new_layer) {
                for (i, (w0, w1)) in old.0.iter().zip(&new.0).enumerate() {
                    assert_ne!(w0, w1, "layer {l} weight {i} untouched with {workers} workers");
                }
            }
        }
    }
}

#[test]
fn training_in_both_modes_gives_identical_weights() {
    let base = seeded(&[5, 4, 3], 3);
    let mut sequential = base.clone();
    let mut parallel = base.with_execution(ExecutionConfig::parallel(3)).unwrap();

    let mut rng = StdRng::seed_from_u64(21);
    for round in 0..10 {
        let input: Vec<f64> = (0..5).map(|_| rng.gen_range(0.0..1.0)).collect();
        let label = Label::Class(round % 3);
        let mut a = Sample::new(&input, 3, label).unwrap();
        let mut b = a.clone();
        let n_a = sequential.train_with(&mut a, ExecutionMode::Sequential).unwrap();
        let n_b = parallel.train_with(&mut b, ExecutionMode::Parallel).unwrap();
        assert_eq!(n_a, n_b);
    }
    assert_eq!(weights_and_biases(&sequential), weights_and_biases(&parallel));
}

#[test]
fn train_always_returns_within_the_cap() {
    let mut network = seeded(&[3, 4, 2], 12);
    let mut rng = StdRng::seed_from_u64(4);
    for i in 0..20 {
        let input: Vec<f64> = (0..3).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let mut sample = Sample::new(&input, 2, Label::Class(i % 2)).unwrap();
        let iterations = network.train(&mut sample).unwrap();
        assert!(iterations <= MAX_TRAIN_ITERATIONS);
    }
}

#[test]
fn separable_toy_set_is_learned() {
    for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
        let mut network = seeded(&[2, 2], 7)
            .with_execution(ExecutionConfig { mode, workers: 2 })
            .unwrap();
        let mut set = separable_set();

        let percent = network.train_on_set(&mut set, 50, 0.0).unwrap();
        assert!((0.0..=100.0).contains(&percent));

        let mut test_set = separable_set();
        assert_eq!(network.evaluate(&mut test_set).unwrap(), 1.0);
        assert_eq!(test_set.accuracy().unwrap(), 1.0);
    }
}

#[test]
fn training_stops_once_every_sample_converges() {
    for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
        let mut network = seeded(&[2, 2], 7)
            .with_execution(ExecutionConfig { mode, workers: 2 })
            .unwrap();
        let mut set = separable_set();
        let (tx, rx) = mpsc::channel();
        let mut config = TrainConfig::new(50, 0.0).with_seed(3);
        config.progress_tx = Some(tx);

        let percent = train_loop(&mut network, &mut set, &config).unwrap();
        drop(config);
        let stats: Vec<_> = rx.iter().collect();

        assert_eq!(percent, 100.0);
        assert!(!stats.is_empty() && stats.len() < 50, "ran {} epochs", stats.len());
        for (i, s) in stats.iter().enumerate() {
            assert_eq!(s.epoch, i + 1);
            assert_eq!(s.total_epochs, 50);
        }
        let last = stats.last().unwrap();
        assert_eq!(last.converged, 4);
        assert_eq!(last.accuracy, 1.0);
        assert!(stats[..stats.len() - 1].iter().all(|s| s.accuracy < 1.0));
    }
}

#[test]
fn loose_error_rate_stops_after_one_epoch() {
    let mut network = seeded(&[2, 3, 2], 5);
    let mut set = separable_set();
    let (tx, rx) = mpsc::channel();
    let mut config = TrainConfig::new(20, 1.0);
    config.progress_tx = Some(tx);

    let percent = train_loop(&mut network, &mut set, &config).unwrap();
    drop(config);
    let stats: Vec<_> = rx.iter().collect();

    assert_eq!(stats.len(), 1);
    assert_eq!(percent, stats[0].accuracy * 100.0);
}

#[test]
fn evaluate_leaves_weights_alone() {
    let mut network = seeded(&[2, 3, 2], 8);
    let before = weights_and_biases(&network);
    let mut set = separable_set();
    let accuracy = network.evaluate(&mut set).unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
    assert_eq!(weights_and_biases(&network), before);
    assert!(set.iter().all(Sample::is_scored));
}
