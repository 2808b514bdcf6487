//! Reinforcement Demo
//!
//! Grows a handful of seed labels over a synthetic corpus: first with two
//! term association learners under consensus, then with a logistic learner
//! trained on the labels the sparse loop produced.
//!
//! Run with:
//! ```
//! cargo run --example reinforce_demo --release [-- config.toml]
//! ```

use label_core::{
    compare_predictions, AnnotatorVotes, CscMatrix, DeepReinforcement, DenseSource,
    LabelSummary, LabelVector, LogisticConfig, LogisticLearner, ReinforcementConfig,
    SparseFeatureLearner, SparseReinforcement, TermAssociationConfig, TermAssociationLearner,
};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DOCUMENTS: usize = 2_000;
const TERMS: usize = 120;
const TERMS_PER_DOCUMENT: usize = 6;
const SEED_FRACTION: f64 = 0.05;

/// Documents with a hidden abusive/benign truth. Terms 0-39 lean abusive,
/// 40-79 lean benign and 80-119 are shared filler.
fn synthetic_corpus(rng: &mut StdRng) -> (CscMatrix, Vec<bool>) {
    let mut truth = Vec::with_capacity(DOCUMENTS);
    let mut triplets = Vec::with_capacity(DOCUMENTS * TERMS_PER_DOCUMENT);

    for doc in 0..DOCUMENTS {
        let abusive = rng.gen_bool(0.4);
        truth.push(abusive);
        for _ in 0..TERMS_PER_DOCUMENT {
            let term = if rng.gen_bool(0.5) {
                rng.gen_range(80..TERMS)
            } else if rng.gen_bool(0.85) == abusive {
                rng.gen_range(0..40)
            } else {
                rng.gen_range(40..80)
            };
            triplets.push((doc, term, 1));
        }
    }

    let matrix = CscMatrix::from_triplets((DOCUMENTS, TERMS), &triplets)
        .expect("triplets are generated inside the matrix shape");
    (matrix, truth)
}

fn seed_labels(truth: &[bool], rng: &mut StdRng) -> LabelVector {
    let values = truth
        .iter()
        .map(|&abusive| match (rng.gen_bool(SEED_FRACTION), abusive) {
            (true, true) => 1.0,
            (true, false) => 0.0,
            (false, _) => 0.5,
        })
        .collect();
    LabelVector::new(values).expect("seed labels are in range")
}

fn print_summary(stage: &str, summary: &LabelSummary) {
    println!(
        "  {:<10} solid+ {:>5}  solid- {:>5}  undecided {:>5}  neutral {:>5}  mean {:.3}",
        stage,
        summary.solid_positive,
        summary.solid_negative,
        summary.undecided,
        summary.neutral,
        summary.mean
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  Label Reinforcement Demo - consensus then deep learner     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let config = match std::env::args().nth(1) {
        Some(path) => ReinforcementConfig::load_from_file(&path).expect("Failed to load config"),
        None => ReinforcementConfig::default(),
    };

    let mut rng = StdRng::seed_from_u64(42);
    let (corpus, truth) = synthetic_corpus(&mut rng);
    let seeds = seed_labels(&truth, &mut rng);

    println!("Corpus: {} documents × {} terms, {} nonzeros", DOCUMENTS, TERMS, corpus.nnz());
    print_summary("seeds", &LabelSummary::from_labels(&seeds));

    // ── Sparse consensus ──────────────────────────────────────────────
    println!("\n── Sparse consensus ({} rounds max) ──", config.sparse.rounds);
    let mut learners: Vec<Box<dyn SparseFeatureLearner>> = vec![
        Box::new(TermAssociationLearner::new(
            "word_n_grams",
            corpus.clone(),
            TermAssociationConfig::default(),
        )),
        Box::new(TermAssociationLearner::new(
            "strict_terms",
            corpus.clone(),
            TermAssociationConfig {
                min_document_frequency: 4,
                positive_cutoff: 0.8,
                negative_cutoff: 0.2,
            },
        )),
    ];

    let sparse = SparseReinforcement::from_config(&config).expect("Failed to open round log");
    let sparse_outcome = sparse
        .run(&mut learners, seeds)
        .expect("Sparse reinforcement failed");
    for report in &sparse_outcome.reports {
        print_summary(&format!("round {}", report.round), &report.summary);
    }
    if let Some(round) = sparse_outcome.converged_round {
        println!("  converged after round {round}");
    }

    // ── Deep learner ──────────────────────────────────────────────────
    println!("\n── Deep learner ({} rounds) ──", config.deep.rounds);
    let features: Array2<f32> = corpus.to_dense().mapv(|count| count as f32);
    let mut source = DenseSource::new(features);
    let model = LogisticLearner::new(LogisticConfig {
        input_size: TERMS,
        batch_size: config.deep.batch_size,
        learning_rate: 0.5,
        seed: 42,
    });

    let deep = DeepReinforcement::from_config(&config).expect("Failed to open round log");
    let deep_outcome = deep
        .train(model, &sparse_outcome.labels, &mut source)
        .expect("Deep reinforcement failed");
    for report in &deep_outcome.reports {
        print_summary(&format!("round {}", report.round), &report.summary);
    }

    // ── Evaluation ────────────────────────────────────────────────────
    if let Some(predictions) = &deep_outcome.predictions {
        let votes: Vec<AnnotatorVotes> = truth
            .iter()
            .map(|&abusive| {
                if abusive {
                    AnnotatorVotes::new(0, 3)
                } else {
                    AnnotatorVotes::new(3, 0)
                }
            })
            .collect();
        let comparison =
            compare_predictions(predictions, &votes, 2).expect("Comparison failed");

        println!("\n── Evaluation ──");
        println!(
            "  accuracy {:.1}% ({}/{})",
            comparison.accuracy() * 100.0,
            comparison.correct,
            comparison.total
        );
        println!(
            "  false positives {}, false negatives {}",
            comparison.false_positives.len(),
            comparison.false_negatives.len()
        );
    }
}
