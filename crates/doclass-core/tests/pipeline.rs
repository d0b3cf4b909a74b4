//! Train, persist, reload and serve through the public API.

use std::io::{Cursor, Write};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::runtime::Handle;
use zip::write::SimpleFileOptions;

use doclass_core::synth::generators;
use doclass_core::{
    ClassificationService, ClassifierSpec, DoclassConfig, DocumentClassifier, IndustryRegistry,
    JobQueue, JobStatus, LoadOutcome, SyntheticDataFactory, TextClassifier, TrainParams,
};

fn registry() -> Arc<IndustryRegistry> {
    Arc::new(IndustryRegistry::with_defaults())
}

fn params() -> TrainParams {
    TrainParams {
        num_samples: 240,
        epochs: 3,
        seed: Some(21),
        ..TrainParams::default()
    }
}

fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!("<w:document><w:body>{body}</w:body></w:document>");

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[test]
fn test_factory_corpus_is_reproducible() {
    let registry = IndustryRegistry::with_defaults();
    let generate = || {
        SyntheticDataFactory::new(&registry, 30, true, "finance")
            .unwrap()
            .with_seed(5)
            .generate()
            .unwrap()
    };

    let a = generate();
    let b = generate();
    assert_eq!(a.len(), 30);
    assert_eq!(a.texts(), b.texts());
    assert_eq!(a.labels(), b.labels());
}

#[test]
fn test_saved_model_serves_same_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let model_dir = dir.path().join("model");

    let mut trained =
        TextClassifier::new(ClassifierSpec::finance(), registry(), None).with_output_dir(&model_dir);
    let report = trained.train(&params()).unwrap();
    assert_eq!(report.artifact_dir, model_dir);

    let reloaded = TextClassifier::new(ClassifierSpec::finance(), registry(), Some(&model_dir));
    assert!(matches!(reloaded.outcome(), LoadOutcome::FineTuned { .. }));

    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..5 {
        for text in [
            generators::invoice_text(&mut rng),
            generators::bank_statement_text(&mut rng),
            generators::license_text(&mut rng),
        ] {
            assert_eq!(trained.predict(&text).unwrap(), reloaded.predict(&text).unwrap());
        }
    }
}

#[test]
fn test_government_classifier_has_single_class() {
    let dir = tempfile::tempdir().unwrap();
    let spec = ClassifierSpec::finance().with_industry("government");
    let mut classifier =
        TextClassifier::new(spec, registry(), None).with_output_dir(dir.path().join("gov"));

    let report = classifier.train(&params()).unwrap();
    assert_eq!(report.classes, vec!["drivers_license".to_string()]);
    assert_eq!(
        classifier.predict("Invoice Number: 1\nTotal: $3.00").unwrap(),
        "drivers_license"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_service_classifies_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DoclassConfig::default();
    config.classifier.model_dir = dir.path().join("model");

    let mut classifier = TextClassifier::from_config(&config.classifier, registry());
    classifier.train(&params()).unwrap();

    let service = ClassificationService::from_config(&config, registry()).unwrap();
    let queue = JobQueue::new(Arc::new(service), 2, Handle::current());

    let mut rng = StdRng::seed_from_u64(77);
    let invoice = generators::invoice_text(&mut rng);
    let license_lines: Vec<String> = generators::license_text(&mut rng)
        .lines()
        .map(str::to_string)
        .collect();
    let license_refs: Vec<&str> = license_lines.iter().map(String::as_str).collect();

    let text_job = queue.submit(invoice.into_bytes(), "invoice.txt");
    let docx_job = queue.submit(docx(&license_refs), "scan.docx");
    let bad_job = queue.submit(b"%PDF-garbage".to_vec(), "broken.pdf");
    let unsupported_job = queue.submit(b"x".to_vec(), "archive.tar");

    assert_eq!(
        queue.wait(text_job).await,
        Some(JobStatus::Success("invoice".to_string()))
    );
    assert_eq!(
        queue.wait(docx_job).await,
        Some(JobStatus::Success("drivers_license".to_string()))
    );
    match queue.wait(bad_job).await {
        Some(JobStatus::Success(message)) => assert!(message.starts_with("Error: ")),
        other => panic!("unexpected status {other:?}"),
    }
    assert_eq!(
        queue.wait(unsupported_job).await,
        Some(JobStatus::Success(
            "Error: extraction error: Unsupported file type. Extension: tar".to_string()
        ))
    );
}

#[test]
fn test_corrupt_artifact_is_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let model_dir = dir.path().join("model");
    std::fs::create_dir(&model_dir).unwrap();
    std::fs::write(model_dir.join("model.json"), "{ not json").unwrap();
    std::fs::write(model_dir.join("preprocessor.json"), "{}").unwrap();
    std::fs::write(model_dir.join("label_encoder.json"), "{}").unwrap();

    let classifier = TextClassifier::new(ClassifierSpec::finance(), registry(), Some(&model_dir));
    match classifier.outcome() {
        LoadOutcome::Failed { reason, .. } => assert!(!reason.is_empty()),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(classifier.predict("Invoice").is_err());
}
