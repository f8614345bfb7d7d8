//! Verify command: score a trained model on held-out predictors and plot
//! diagnostics.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use mosx_evaluate::{
    EvaluateConfig, RunSummary, ScoreTable, VerificationOutput, error_distribution, evaluate,
    rank_histogram, spread_skill, to_json,
};
use mosx_io::{Ensemble, Matrix, PredictorBundle, read_bundle};
use mosx_model::{
    Predictions, RainSpec, SplitConsecutive, TrainedModel, combine_train_test, learning_curve,
    load_model, predict_all, predict_rain_proba, rain_post_average,
};
use mosx_plot::{
    ERROR_DISTRIBUTION_FILE, Figure, LEARNING_CURVE_FILE, RANK_HISTOGRAM_FILE, SPREAD_SKILL_FILE,
    error_distribution_figure, learning_curve_figure, rank_histogram_figure, render_pdf,
    spread_skill_figure,
};

use crate::cli::Cli;
use crate::config::MosxConfig;
use crate::convert;

/// Run the verification pipeline and return the score table.
pub fn run(args: &Cli) -> Result<ScoreTable> {
    let _cmd = info_span!("verify").entered();

    // 1. Load config and inputs
    let config = MosxConfig::load(&args.config)?;
    let predictor_path = config.predictor_path();
    if !predictor_path.exists() {
        bail!(
            "predictor file not found: {} (run the validation step for {} first)",
            predictor_path.display(),
            config.station_id
        );
    }
    let rain = convert::build_rain_spec(&config.model)?;
    let eval_cfg = convert::build_evaluate_config(&config.plot);

    let estimator_path = config.estimator_path();
    let model = load_model(&estimator_path)
        .with_context(|| format!("failed to load model: {}", estimator_path.display()))?;

    info!(path = %predictor_path.display(), "reading predictors");
    let bundle = read_bundle(&predictor_path)
        .with_context(|| format!("failed to read predictors: {}", predictor_path.display()))?;
    let truth = bundle.targets();
    info!(n_cases = bundle.n_cases(), n_predictors = bundle.n_predictors(), "predictors loaded");

    // 2. Predict
    let preds = predict(args, &config, &model, &bundle, &rain)?;
    let rain_proba = if rain.forecast_type().is_probabilistic() {
        Some(
            predict_rain_proba(&model, &bundle, &rain, config.model.rain_tuning)
                .context("rain probability prediction failed")?,
        )
    } else {
        None
    };

    // 3. Score
    let table = evaluate(
        &truth,
        &preds.predicted,
        preds.all_predicted.as_ref(),
        rain_proba.as_ref(),
    )
    .context("scoring failed")?;
    println!("{table}");

    if let Some(path) = &args.output {
        let run = RunSummary {
            station_id: config.station_id.clone(),
            n_cases: bundle.n_cases(),
            n_members: model.n_members(),
            rain_forecast_type: config.model.rain_forecast_type.clone(),
            ensemble: args.ensemble,
            rain_tuning: config.model.rain_tuning,
        };
        let json = to_json(&VerificationOutput::new(run, &table))?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write scores: {}", path.display()))?;
        info!(path = %path.display(), "scores written");
    }

    // 4. Plot
    if args.wants_plots() {
        let plot_dir = &config.plot.output_dir;
        if args.learning_curve {
            plot_learning_curve(&config, &model, &bundle, plot_dir)?;
        }
        let ensemble = preds.all_predicted.as_ref();
        plot_ensemble_diagnostics(args, &eval_cfg, &truth, ensemble, plot_dir)?;
        if args.error_distribution {
            let hists = error_distribution(&truth, &preds.predicted, eval_cfg.error_bins())?;
            save(&error_distribution_figure(&hists)?, plot_dir, ERROR_DISTRIBUTION_FILE)?;
        }
    }

    Ok(table)
}

fn predict(
    args: &Cli,
    config: &MosxConfig,
    model: &TrainedModel,
    bundle: &PredictorBundle,
    rain: &RainSpec,
) -> Result<Predictions> {
    let rain_tuning = config.model.rain_tuning;
    let mut preds = predict_all(
        model,
        bundle,
        rain,
        args.ensemble,
        args.naive_rain_correction,
        rain_tuning,
    )
    .context("prediction failed")?;

    if args.rain_post_average {
        if rain_tuning && model.rain_estimator().is_some() {
            let untuned = predict_all(model, bundle, rain, false, args.naive_rain_correction, false)
                .context("untuned prediction failed")?;
            preds.predicted = rain_post_average(&preds.predicted, &untuned.predicted)?;
            info!("rain forecast averaged over tuned and untuned estimators");
        } else {
            warn!("--rain-post-average needs rain_tuning and a rain-tuned model; ignoring");
        }
    }
    Ok(preds)
}

fn plot_learning_curve(
    config: &MosxConfig,
    model: &TrainedModel,
    test: &PredictorBundle,
    plot_dir: &Path,
) -> Result<()> {
    let _span = info_span!("learning_curve").entered();
    let Some(train_path) = config.training_predictors_path() else {
        bail!("learning curve needs [model] predictors_file");
    };
    let train = read_bundle(&train_path)
        .with_context(|| format!("failed to read training predictors: {}", train_path.display()))?;

    let (combined, count_test) = combine_train_test(&train, test, true)?;
    let split = SplitConsecutive::new(count_test.unwrap_or(test.n_cases()));
    let estimator_cfg = match &config.model.estimator {
        Some(est) => convert::build_estimator_config(est)?,
        None => model.estimator().config().clone(),
    };

    let curve = learning_curve(
        &estimator_cfg,
        &combined,
        &split,
        config.plot.learning_curve_points,
    )
    .context("learning curve failed")?;
    save(&learning_curve_figure(&curve)?, plot_dir, LEARNING_CURVE_FILE)
}

fn plot_ensemble_diagnostics(
    args: &Cli,
    eval_cfg: &EvaluateConfig,
    truth: &Matrix,
    ensemble: Option<&Ensemble>,
    plot_dir: &Path,
) -> Result<()> {
    if args.spread_skill {
        match ensemble {
            Some(ens) => {
                let data = spread_skill(truth, ens, eval_cfg.spread_skill_bins())?;
                save(&spread_skill_figure(&data)?, plot_dir, SPREAD_SKILL_FILE)?;
            }
            None => warn!("spread-skill plot needs --ensemble; skipping"),
        }
    }
    if args.rank_histogram {
        match ensemble {
            Some(ens) => {
                let ranks = rank_histogram(truth, ens)?;
                save(&rank_histogram_figure(&ranks)?, plot_dir, RANK_HISTOGRAM_FILE)?;
            }
            None => warn!("rank histogram needs --ensemble; skipping"),
        }
    }
    Ok(())
}

/// Render `figure` into `dir`, creating the directory on first use.
fn save(figure: &Figure, dir: &Path, file_name: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create plot directory: {}", dir.display()))?;
    let path = dir.join(file_name);
    render_pdf(figure, &path).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "figure written");
    Ok(())
}
