use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;

use enhance_eval::comparison::create_comparison_table;
use enhance_eval::config::DEFAULT_OUTPUT_ROOT;
use enhance_eval::error::error_chain;
use enhance_eval::report::{export_latex, plot_comparison, plot_radar, print_comparison};

const DEFAULT_VISUALIZATION_DIR: &str = "visualizations";

#[derive(FromArgs, Debug)]
/// Render comparison charts and tables from persisted evaluation results.
struct Args {
    /// directory holding {method}/metrics.json
    #[argh(option, default = "PathBuf::from(DEFAULT_OUTPUT_ROOT)")]
    results_dir: PathBuf,

    /// draw the comparison chart at this path
    #[argh(option)]
    output: Option<PathBuf>,

    /// directory for generated figures and tables (default: visualizations)
    #[argh(option, default = "PathBuf::from(DEFAULT_VISUALIZATION_DIR)")]
    output_dir: PathBuf,

    /// generate every output: comparison chart, radar chart and LaTeX table
    #[argh(switch)]
    all: bool,

    /// also draw the radar chart
    #[argh(switch)]
    radar: bool,

    /// also export a LaTeX table
    #[argh(switch)]
    latex: bool,
}

impl Args {
    /// The comparison chart is drawn only when asked for by `--output` or
    /// `--all`.
    fn comparison_chart(&self) -> Option<PathBuf> {
        match (&self.output, self.all) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(self.output_dir.join("comparison.svg")),
            (None, false) => None,
        }
    }

    fn radar_chart(&self) -> Option<PathBuf> {
        (self.all || self.radar).then(|| self.output_dir.join("radar.svg"))
    }

    fn latex_table(&self) -> Option<PathBuf> {
        (self.all || self.latex).then(|| self.output_dir.join("table.tex"))
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    let table = create_comparison_table(&args.results_dir);
    if table.is_empty() {
        log::error!("no metrics files found under {}", args.results_dir.display());
        return ExitCode::FAILURE;
    }
    print_comparison(&table);

    let mut ok = true;
    if let Some(chart) = args.comparison_chart() {
        if let Err(err) = plot_comparison(&table, &chart) {
            log::error!("comparison chart failed: {}", error_chain(&err));
            ok = false;
        }
    }

    if let Some(radar) = args.radar_chart() {
        if let Err(err) = plot_radar(&table, &radar) {
            log::error!("radar chart failed: {}", error_chain(&err));
            ok = false;
        }
    }

    if let Some(latex) = args.latex_table() {
        if let Err(err) = export_latex(&table, &latex) {
            log::error!("LaTeX export failed: {}", error_chain(&err));
            ok = false;
        }
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
