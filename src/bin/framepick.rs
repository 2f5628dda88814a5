use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framepick::{
    FfmpegLogLevel, PipelineOptions, ProgressCallback, SelectionResult,
    worker::{self, PipelineEvent},
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framepick run input.mp4 --out output --every 10 --progress\n  framepick extract input.mp4 --out output --every 30\n  framepick select output/input_extractedimages --out output --json\n  framepick completions zsh > _framepick";

#[derive(Debug, Parser)]
#[command(
    name = "framepick",
    version,
    about = "Pick the video frame most similar to a reference frame",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar where supported.
    #[arg(long)]
    progress: bool,

    /// Allow writing into an existing frame directory.
    #[arg(long)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Decode a video and store a subsampled set of frames.
    #[command(
        about = "Extract subsampled frames from a video",
        after_help = "Examples:\n  framepick extract input.mp4 --out output --every 10\n  framepick extract input.mp4 --out output --every 1 --progress"
    )]
    Extract {
        /// Input video path.
        input: PathBuf,
        /// Output root directory; frames land in `{out}/{basename}_extractedimages`.
        #[arg(long)]
        out: PathBuf,
        /// Store every Nth frame.
        #[arg(long, default_value_t = 10)]
        every: u64,
    },

    /// Score a stored frame directory and pick the best frame.
    #[command(
        about = "Select the frame most similar to the reference",
        after_help = "Examples:\n  framepick select output/input_extractedimages --out output\n  framepick select frames --out output --reference 30 --json"
    )]
    Select {
        /// Directory of `frame_{index}.jpg` files.
        frame_dir: PathBuf,
        /// Output root; the winner is copied to `{out}/best_frame_with_pose/`.
        #[arg(long)]
        out: PathBuf,
        /// Index of the stored frame to use as the reference.
        #[arg(long, default_value_t = 0)]
        reference: u64,
        /// Print the result as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Extract frames and select the best one in a single run.
    #[command(
        about = "Extract and select in one run",
        after_help = "Examples:\n  framepick run input.mp4 --out output --every 10 --progress\n  framepick run input.mp4 --out output --every 10 --json"
    )]
    Run {
        /// Input video path.
        input: PathBuf,
        /// Output root directory.
        #[arg(long)]
        out: PathBuf,
        /// Store every Nth frame.
        #[arg(long, default_value_t = 10)]
        every: u64,
        /// Index of the stored frame to use as the reference.
        #[arg(long, default_value_t = 0)]
        reference: u64,
        /// Print the result as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(FfmpegLogLevel::Quiet),
        "panic" => Some(FfmpegLogLevel::Panic),
        "fatal" => Some(FfmpegLogLevel::Fatal),
        "error" => Some(FfmpegLogLevel::Error),
        "warning" | "warn" => Some(FfmpegLogLevel::Warning),
        "info" => Some(FfmpegLogLevel::Info),
        "verbose" => Some(FfmpegLogLevel::Verbose),
        "debug" => Some(FfmpegLogLevel::Debug),
        "trace" => Some(FfmpegLogLevel::Trace),
        _ => None,
    }
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        framepick::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

/// Refuse to write into an existing frame directory unless `--overwrite`.
fn ensure_frame_dir_writable(
    input: &PathBuf,
    out: &PathBuf,
    overwrite: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame_dir = framepick::frame_dir_for(input, out);
    if frame_dir.exists() {
        if !overwrite {
            return Err(format!(
                "frame directory already exists: {} (use --overwrite)",
                frame_dir.display()
            )
            .into());
        }
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("writing into existing directory {}", frame_dir.display()).yellow()
        );
    }
    Ok(())
}

fn styled_bar() -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let bar = ProgressBar::new(0);
    let style =
        ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
    bar.set_style(style.progress_chars("##-"));
    Ok(bar)
}

/// Progress callback that drives an indicatif bar.
struct BarProgress {
    bar: ProgressBar,
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, processed: u64, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(processed);
    }
}

fn print_selection(result: &SelectionResult, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let payload = json!({
            "best_index": result.best_index,
            "best_score": result.best_score,
            "best_frame_path": result.best_frame_path,
            "scored": result.scored,
            "skipped": result.skipped,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match (&result.best_index, &result.best_frame_path) {
        (Some(index), Some(path)) => {
            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "Best frame is index {index} (score {:.3}), saved to {}",
                    result.best_score,
                    path.display()
                )
                .green()
            );
        }
        _ => {
            println!(
                "{} {}",
                "done:".yellow().bold(),
                "No frame beat the initial score; no best frame".yellow()
            );
        }
    }

    if result.skipped > 0 {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("{} frame(s) skipped as unreadable or mismatched", result.skipped).yellow()
        );
    }

    Ok(())
}

fn cli_run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Extract { input, out, every } => {
            if every == 0 {
                return Err("--every must be greater than 0".into());
            }
            ensure_frame_dir_writable(&input, &out, cli.global.overwrite)?;

            let mut options = PipelineOptions::new();
            let bar = if cli.global.progress {
                let bar = styled_bar()?;
                bar.set_message("extracting");
                options = options.with_progress(Arc::new(BarProgress { bar: bar.clone() }));
                Some(bar)
            } else {
                None
            };

            let frame_dir = framepick::extract_frames(&input, &out, every, &options)?;

            if let Some(bar) = bar {
                bar.finish_with_message("done");
            }
            if cli.global.verbose {
                let stored = framepick::list_frames(&frame_dir)?.len();
                eprintln!("stored {stored} frame(s) (every {every})");
            }
            println!(
                "{} {}",
                "success:".green().bold(),
                format!("Frames extracted to {}", frame_dir.display()).green()
            );
        }
        Commands::Select {
            frame_dir,
            out,
            reference,
            json,
        } => {
            if cli.global.verbose {
                eprintln!(
                    "scanning {} against reference frame {reference}",
                    frame_dir.display()
                );
            }

            let mut options = PipelineOptions::new().with_reference_index(reference);
            let bar = if cli.global.progress {
                let bar = styled_bar()?;
                bar.set_message("scoring");
                options = options.with_progress(Arc::new(BarProgress { bar: bar.clone() }));
                Some(bar)
            } else {
                None
            };

            let result = framepick::select_best_frame(&frame_dir, &out, &options)?;

            if let Some(bar) = bar {
                bar.finish_with_message("done");
            }
            print_selection(&result, json)?;
        }
        Commands::Run {
            input,
            out,
            every,
            reference,
            json,
        } => {
            if every == 0 {
                return Err("--every must be greater than 0".into());
            }
            ensure_frame_dir_writable(&input, &out, cli.global.overwrite)?;

            let options = PipelineOptions::new().with_reference_index(reference);
            let run = worker::spawn(input, out, every, options);

            let bar = if cli.global.progress {
                Some(styled_bar()?)
            } else {
                None
            };

            let mut outcome: Option<Result<SelectionResult, String>> = None;
            for event in run.events() {
                match event {
                    PipelineEvent::ExtractProgress { processed, total } => {
                        if let Some(bar) = &bar {
                            bar.set_message("extracting");
                            bar.set_length(total);
                            bar.set_position(processed);
                        }
                    }
                    PipelineEvent::SelectProgress { processed, total } => {
                        if let Some(bar) = &bar {
                            bar.set_message("scoring");
                            bar.set_length(total);
                            bar.set_position(processed);
                        }
                    }
                    PipelineEvent::Completed(result) => {
                        outcome = Some(Ok(result));
                    }
                    PipelineEvent::Failed(error) => {
                        outcome = Some(Err(error.to_string()));
                    }
                    PipelineEvent::Cancelled => {
                        outcome = Some(Err("run cancelled".to_string()));
                    }
                }
            }
            run.join();

            if let Some(bar) = bar {
                bar.finish_with_message("done");
            }

            match outcome.ok_or("worker exited without reporting a result")? {
                Ok(result) => print_selection(&result, json)?,
                Err(message) => return Err(message.into()),
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framepick", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = cli_run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
