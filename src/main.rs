use clap::{ArgAction, Parser, Subcommand};
use product_canvas::imaging::{
    CanvasOp, CropRequest, ExtendRequest, MatteRequest, RustBackend, ThresholdChoice,
};
use product_canvas::{batch, config, imaging, output};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "product-canvas")]
#[command(about = "Reframe product photos on seamless backgrounds")]
#[command(long_about = "\
Reframe product photos on seamless backgrounds

Three operations, each reading one image and writing one image:

  extend   Find the subject against a light backdrop, trim or pad the canvas
           to a desired height, synthesizing backdrop from the edge rows.
  crop     Crop a rectangle, scale it, and center it on a black canvas
           (default 1080x1920, story format).
  matte    Fit the whole image inside a solid-color canvas with padding.

The output format follows the output extension: jpg, png, tif, webp, avif.

Defaults come from canvas.toml in the working directory (or --config).
Run 'product-canvas gen-config' to generate a documented canvas.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./canvas.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More diagnostics on stderr (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trim or pad the canvas around the subject to a desired height
    Extend {
        input: PathBuf,
        output: PathBuf,
        /// Output height in pixels
        #[arg(allow_negative_numbers = true)]
        desired_height: i64,
        /// Margin above and below the subject, as a fraction of its height
        #[arg(long, allow_negative_numbers = true)]
        padding_pct: Option<f64>,
        /// Background threshold 0-255; -1 or omitted estimates it
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<i64>,
        /// Fit the result into this width (needs --requested-height too)
        #[arg(long, allow_negative_numbers = true)]
        requested_width: Option<i64>,
        /// Fit the result into this height (needs --requested-width too)
        #[arg(long, allow_negative_numbers = true)]
        requested_height: Option<i64>,
    },
    /// Crop a rectangle, scale it, and center it on a black canvas
    Crop {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        crop_x: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        crop_y: Option<i64>,
        /// Crop width; 0 or omitted means the full image width
        #[arg(long, allow_negative_numbers = true)]
        crop_width: Option<i64>,
        /// Crop height; 0 or omitted means the full image height
        #[arg(long, allow_negative_numbers = true)]
        crop_height: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        output_width: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        output_height: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        scale: Option<f64>,
    },
    /// Fit the image inside a solid-color canvas
    Matte {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        width: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        height: Option<i64>,
        /// Percent of each canvas side kept clear (0 <= padding < 50)
        #[arg(long, allow_negative_numbers = true)]
        padding: Option<f64>,
        /// Canvas color as #RRGGBB
        #[arg(long)]
        color: Option<String>,
    },
    /// Report the threshold and foreground rows without writing anything
    Probe {
        input: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<i64>,
    },
    /// Run a JSON file of jobs in parallel
    Batch { jobs: PathBuf },
    /// Print a stock canvas.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config_path = cli.config;
    let load_config = || config::load_config(config_path.as_deref());
    let backend = RustBackend::new();

    match cli.command {
        Command::Extend {
            input,
            output,
            desired_height,
            padding_pct,
            threshold,
            requested_width,
            requested_height,
        } => {
            let config = load_config()?;
            let request = config.fill_extend(ExtendRequest {
                desired_height,
                padding_pct,
                threshold,
                requested_width,
                requested_height,
            });
            let params = request.validate()?;
            let requested = params.final_fit;
            let op = CanvasOp::Extend(params);
            let report = imaging::run(&backend, &input, &output, &op, config.quality())?;
            print_lines(output::format_report(&report, &output, requested));
        }
        Command::Crop {
            input,
            output,
            crop_x,
            crop_y,
            crop_width,
            crop_height,
            output_width,
            output_height,
            scale,
        } => {
            let config = load_config()?;
            let request = config.fill_crop(CropRequest {
                crop_x,
                crop_y,
                crop_width,
                crop_height,
                output_width,
                output_height,
                scale,
            });
            let op = CanvasOp::Crop(request.validate()?);
            let report = imaging::run(&backend, &input, &output, &op, config.quality())?;
            print_lines(output::format_report(&report, &output, None));
        }
        Command::Matte {
            input,
            output,
            width,
            height,
            padding,
            color,
        } => {
            let config = load_config()?;
            let request = config.fill_matte(MatteRequest {
                width,
                height,
                padding,
                color,
            });
            let op = CanvasOp::Matte(request.validate()?);
            let report = imaging::run(&backend, &input, &output, &op, config.quality())?;
            print_lines(output::format_report(&report, &output, None));
        }
        Command::Probe { input, threshold } => {
            let report = imaging::probe(&backend, &input, ThresholdChoice::from_raw(threshold))?;
            print_lines(output::format_probe(&input, &report));
        }
        Command::Batch { jobs } => {
            let config = load_config()?;
            let jobs = batch::load_jobs(&jobs)?;
            init_thread_pool(&config.processing);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    print_lines(output::format_batch_event(&event));
                }
            });
            let summary = batch::run_batch(&backend, &jobs, &config, Some(tx));
            if printer.join().is_err() {
                log::warn!("progress printer thread panicked");
            }
            print_lines(output::format_batch_summary(&summary));
            if !summary.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(ExitCode::SUCCESS)
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

/// Console logging on stderr; `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Initialize the rayon thread pool from `[processing] max_processes`,
/// capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
