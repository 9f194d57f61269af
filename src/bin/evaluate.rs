use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;

use enhance_eval::config::HarnessConfig;
use enhance_eval::engine::{DetectionEngine, OfflineEngine, UltralyticsEngine};
use enhance_eval::error::{error_chain, EvalError, Result};
use enhance_eval::{EvaluationDriver, Method};

#[derive(FromArgs, Debug)]
/// Evaluate a detector on every enhancement method and compare the results.
struct Args {
    /// model weights path (default: yolov8x.pt)
    #[argh(option)]
    model: Option<String>,

    /// dataset root holding images/{method} and labels/val
    #[argh(option)]
    data_root: Option<PathBuf>,

    /// root directory for per-method results
    #[argh(option)]
    output_root: Option<PathBuf>,

    /// methods to evaluate, repeatable or comma separated (default: raw,pwgcm,hsv)
    #[argh(option)]
    methods: Vec<String>,

    /// batch size (default: 16)
    #[argh(option)]
    batch_size: Option<usize>,

    /// image size (default: 640)
    #[argh(option)]
    imgsz: Option<u32>,

    /// confidence threshold (default: 0.001)
    #[argh(option)]
    conf: Option<f64>,

    /// iou threshold for NMS (default: 0.6)
    #[argh(option)]
    iou: Option<f64>,

    /// device: empty for auto, cpu, 0, 0,1, ...
    #[argh(option)]
    device: Option<String>,

    /// directory for generated dataset descriptors
    #[argh(option)]
    config_dir: Option<PathBuf>,

    /// json configuration file; command-line options override it
    #[argh(option)]
    config: Option<PathBuf>,

    /// detection engine: ultralytics or offline
    #[argh(option, default = "String::from(\"ultralytics\")")]
    engine: String,

    /// root of stored predictions, {root}/{method}/{stem}.txt (offline engine)
    #[argh(option)]
    predictions: Option<PathBuf>,

    /// python interpreter with ultralytics installed
    #[argh(option, default = "PathBuf::from(\"python3\")")]
    python: PathBuf,
}

fn build_config(args: &Args) -> Result<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::from_file(path)?,
        None => HarnessConfig::default(),
    };

    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(data_root) = &args.data_root {
        config.data_root = data_root.clone();
    }
    if let Some(output_root) = &args.output_root {
        config.output_root = output_root.clone();
    }
    if let Some(config_dir) = &args.config_dir {
        config.config_dir = config_dir.clone();
    }
    if !args.methods.is_empty() {
        config.methods = Method::parse_list(&args.methods)?;
    }
    if let Some(batch_size) = args.batch_size {
        config.params.batch_size = batch_size;
    }
    if let Some(imgsz) = args.imgsz {
        config.params.image_size = imgsz;
    }
    if let Some(conf) = args.conf {
        config.params.confidence = conf;
    }
    if let Some(iou) = args.iou {
        config.params.iou = iou;
    }
    if let Some(device) = &args.device {
        config.params.device = device.clone();
    }

    config.validate()?;
    Ok(config)
}

fn load_engine(args: &Args, config: &HarnessConfig) -> Result<Box<dyn DetectionEngine>> {
    match args.engine.as_str() {
        "ultralytics" => Ok(Box::new(UltralyticsEngine::load(&args.python, &config.model)?)),
        "offline" => {
            let predictions = args.predictions.clone().ok_or_else(|| {
                EvalError::InvalidParameter("--predictions is required for the offline engine".to_string())
            })?;
            Ok(Box::new(OfflineEngine::new(predictions)))
        }
        other => Err(EvalError::InvalidParameter(format!(
            "unknown engine '{other}' (expected ultralytics or offline)"
        ))),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(err) => {
            log::error!("invalid configuration: {}", error_chain(&err));
            return ExitCode::FAILURE;
        }
    };

    let engine = match load_engine(&args, &config) {
        Ok(engine) => engine,
        Err(err) => {
            log::error!("failed to load detection engine: {}", error_chain(&err));
            return ExitCode::FAILURE;
        }
    };

    let mut driver = EvaluationDriver::new(engine, config);
    match driver.evaluate_all() {
        Ok(outcome) => {
            let evaluated = outcome.results.len() - outcome.failed().len();
            log::info!("batch finished: {evaluated}/{} methods evaluated", outcome.results.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("failed to export comparison: {}", error_chain(&err));
            ExitCode::FAILURE
        }
    }
}
