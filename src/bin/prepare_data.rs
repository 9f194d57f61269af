use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;

use enhance_eval::config::DEFAULT_DATA_ROOT;
use enhance_eval::staging::{DataPreparer, StageMode};
use enhance_eval::verify::print_verification_report;
use enhance_eval::Method;

#[derive(FromArgs, Debug)]
/// Stage enhanced images into the per-method dataset layout.
struct Args {
    /// directory holding the source images (searched recursively)
    #[argh(option)]
    source: Option<PathBuf>,

    /// method tag: raw, pwgcm or hsv
    #[argh(option)]
    method: Option<String>,

    /// dataset root
    #[argh(option, default = "PathBuf::from(DEFAULT_DATA_ROOT)")]
    data_root: PathBuf,

    /// copy files instead of creating symbolic links
    #[argh(switch)]
    copy: bool,

    /// only verify the staged datasets
    #[argh(switch)]
    verify: bool,

    /// methods to verify, repeatable or comma separated (default: raw,pwgcm,hsv)
    #[argh(option)]
    methods: Vec<String>,
}

fn verify_only(args: &Args) -> ExitCode {
    let methods = if args.methods.is_empty() {
        Method::ALL.to_vec()
    } else {
        match Method::parse_list(&args.methods) {
            Ok(methods) => methods,
            Err(err) => {
                log::error!("{err}");
                return ExitCode::FAILURE;
            }
        }
    };
    print_verification_report(&args.data_root, &methods);
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    if args.verify {
        return verify_only(&args);
    }

    let (Some(source), Some(method)) = (&args.source, &args.method) else {
        log::error!("--source and --method are required unless --verify is given");
        return ExitCode::FAILURE;
    };
    let method: Method = match method.parse() {
        Ok(method) => method,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mode = if args.copy { StageMode::Copy } else { StageMode::Symlink };
    let preparer = DataPreparer::new(&args.data_root);
    if !preparer.prepare_dataset(source, method, mode) {
        return ExitCode::FAILURE;
    }

    print_verification_report(&args.data_root, &[method]);
    ExitCode::SUCCESS
}
