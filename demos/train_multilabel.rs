/// Bibtex feature network - train, validate, test and save
///
/// Expects `<data_dir>/train` and `<data_dir>/test`, each holding
/// inputs.npy, labels.npy and optionally dataset.json.
use multilabel_mlp::training::{FeatureNetwork, StepScheduler, TrainingConfig};
use multilabel_mlp::utils::select_device;
use multilabel_mlp::MultiLabelDataset;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/bibtex"));

    let device = select_device(candle_core::utils::cuda_is_available())?;
    log::info!("Using device: {:?}", device);

    log::info!("Loading the training set...");
    let train_set = MultiLabelDataset::from_directory(data_dir.join("train"))?;
    log::info!(
        "train_labels.shape ({}, {}) train_inputs.shape ({}, {}) length_txt_labels {}",
        train_set.len(),
        train_set.n_labels(),
        train_set.len(),
        train_set.dim_input(),
        train_set.metadata().label_names.len()
    );

    let config = TrainingConfig::default();
    let mut net = FeatureNetwork::new(train_set, config.clone(), device)?;
    let mut scheduler = StepScheduler::from_config(&config);

    // 10 epochs
    let results = net.fit(10, &mut scheduler)?;

    log::info!("Loading Test set...");
    let test_set = MultiLabelDataset::from_directory(data_dir.join("test"))?;
    let test_labels = test_set.labels().clone();
    let mut test_loader = net.test_loader(test_set)?;

    log::info!("Computing the F1 Score on the test set...");
    let report = net.test(&mut test_loader, test_labels.view())?;
    log::info!("Test F1: {:.4}, loss: {:.4}", report.f1, report.loss);

    results.save_json(data_dir.join("bibtex_feature_network_results.json"))?;
    net.save_checkpoint(data_dir.join("bibtex_feature_network.safetensors"))?;

    Ok(())
}
