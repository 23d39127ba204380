use config::{
    CreateModelConfig, RunConfiguration, SamplingConfig, ScoringRunConfig, TransferLearningConfig,
    ValidationRunConfig,
};
use errors::ErrorClass;
use mol_core::RunType;
use policy::TokenPolicy;
use testing::{
    RecordingSink, corpus_policy, local_logging, similarity_function, write_policy, write_smiles,
};
use training::{run, run_with_sink};

const CORPUS: [&str; 5] = ["CCO", "CCN", "c1ccccc1", "CC(C)O", "OCC(=O)N"];

fn config(dir: &std::path::Path, run_type: RunType) -> RunConfiguration {
    let mut config = RunConfiguration::new(run_type);
    config.logging = local_logging(dir);
    config
}

#[tokio::test]
async fn create_model_writes_a_loadable_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_smiles(dir.path(), "corpus.smi", &CORPUS);
    let output = dir.path().join("models").join("prior.ckpt");
    let mut config = config(dir.path(), RunType::CreateModel);
    config.parameters.create_model = Some(CreateModelConfig {
        input_smiles_path: corpus,
        output_model_path: output.clone(),
        max_sequence_length: 48,
    });

    let result = run(&config).await.unwrap();
    assert_eq!(result.artifacts, vec![output.clone()]);
    let model = TokenPolicy::load(&output).unwrap();
    assert_eq!(model.max_sequence_length(), 48);
    assert!(model.vocabulary().index_of("c").is_some());

    let log = std::fs::read_to_string(&config.logging.logging_path).unwrap();
    assert!(log.contains("create_model finished"));
}

#[tokio::test]
async fn sampling_writes_one_line_per_smiles() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_policy(dir.path(), "model.ckpt", &corpus_policy(&CORPUS, 32));
    let output = dir.path().join("sampled.smi");
    let mut config = config(dir.path(), RunType::Sampling);
    config.parameters.sampling = Some(SamplingConfig {
        model_path: model,
        output_smiles_path: output.clone(),
        num_smiles: 25,
        batch_size: 10,
        with_likelihood: true,
        seed: Some(5),
    });

    let sink = RecordingSink::new();
    let result = run_with_sink(&config, sink.boxed()).await.unwrap();
    let content = std::fs::read_to_string(&output).unwrap();
    assert_eq!(content.lines().count(), 25);
    for line in content.lines() {
        let (_, likelihood) = line.split_once('\t').unwrap();
        assert!(likelihood.parse::<f64>().unwrap() <= 0.0);
    }
    let fraction = result.fraction_valid.unwrap();
    assert!((0.0..=100.0).contains(&fraction));
    assert_eq!(sink.results().await, vec![result]);
}

#[tokio::test]
async fn sampling_is_reproducible_with_a_seed() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_policy(dir.path(), "model.ckpt", &corpus_policy(&CORPUS, 32));
    let mut outputs = Vec::new();
    for i in 0..2 {
        let output = dir.path().join(format!("sampled-{i}.smi"));
        let mut config = config(dir.path(), RunType::Sampling);
        config.parameters.sampling = Some(SamplingConfig {
            model_path: model.clone(),
            output_smiles_path: output.clone(),
            num_smiles: 40,
            batch_size: 16,
            with_likelihood: false,
            seed: Some(99),
        });
        run_with_sink(&config, RecordingSink::new().boxed()).await.unwrap();
        outputs.push(std::fs::read_to_string(output).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
    assert!(!outputs[0].contains('\t'));
}

#[tokio::test]
async fn scoring_writes_a_table_with_component_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_smiles(dir.path(), "input.smi", &["CCCCO", "C1CC", "CCN"]);
    let mut config = config(dir.path(), RunType::Scoring);
    config.parameters.scoring = Some(ScoringRunConfig {
        input: vec![input],
        output_path: None,
    });
    config.parameters.scoring_function = Some(similarity_function("CCCCO"));

    let result = run_with_sink(&config, RecordingSink::new().boxed()).await.unwrap();
    let table = std::fs::read_to_string(config.logging.resultdir.join("scored_smiles.csv")).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], "smiles,total_score,similarity,valid");
    assert_eq!(lines[1], "CCCCO,1,1,1");
    assert!(lines[2].starts_with("C1CC,0,0,0"));
    assert_eq!(result.steps_completed, 3);
    assert!((result.fraction_valid.unwrap() - 200.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn transfer_learning_saves_periodic_checkpoints() {
    let dir = tempfile::tempdir().unwrap();
    let input_model = write_policy(dir.path(), "prior.ckpt", &corpus_policy(&CORPUS, 32));
    let smiles = write_smiles(dir.path(), "focus.smi", &["CCO", "CCCO", "CCCCO", "CCOCC"]);
    let output = dir.path().join("focused.ckpt");
    let mut config = config(dir.path(), RunType::TransferLearning);
    config.parameters.transfer_learning = Some(TransferLearningConfig {
        input_model_path: input_model.clone(),
        output_model_path: output.clone(),
        input_smiles_path: smiles,
        num_epochs: 4,
        batch_size: 2,
        learning_rate: 0.05,
        shuffle_each_epoch: true,
        save_every_n_epochs: 2,
        seed: Some(1),
    });

    let result = run_with_sink(&config, RecordingSink::new().boxed()).await.unwrap();
    assert_eq!(
        result.artifacts,
        vec![dir.path().join("focused.2.ckpt"), output.clone()]
    );
    assert_eq!(result.steps_completed, 4);

    let before = TokenPolicy::load(&input_model).unwrap();
    let after = TokenPolicy::load(&output).unwrap();
    let tokens = after.vocabulary().encode("CCCCO").unwrap();
    assert!(after.log_likelihood(&tokens) > before.log_likelihood(&tokens));
}

#[tokio::test]
async fn validation_reports_fraction_valid() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_policy(dir.path(), "model.ckpt", &corpus_policy(&CORPUS, 32));
    let mut config = config(dir.path(), RunType::Validation);
    config.parameters.validation = Some(ValidationRunConfig {
        model_path: model,
        num_smiles: 50,
        seed: Some(3),
    });

    let result = run_with_sink(&config, RecordingSink::new().boxed()).await.unwrap();
    assert_eq!(result.run_type, RunType::Validation);
    assert!((0.0..=100.0).contains(&result.fraction_valid.unwrap()));
}

#[tokio::test]
async fn validation_of_a_missing_model_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path(), RunType::Validation);
    config.parameters.validation = Some(ValidationRunConfig {
        model_path: dir.path().join("absent.ckpt"),
        num_smiles: 10,
        seed: None,
    });

    let sink = RecordingSink::new();
    let err = run_with_sink(&config, sink.boxed()).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(sink.results().await.is_empty());
}

#[tokio::test]
async fn missing_sections_are_configuration_errors() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), RunType::ReinforcementLearning);
    let err = run(&config).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Configuration);
    assert!(!config.logging.resultdir.exists());
}
