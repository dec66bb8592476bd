//! pdftool - batch toolbox for PDF files.
//!
//! Thin binary over the `pdf_toolbox` library: parse arguments, spawn
//! the right batch worker, render its events, and map the outcome to an
//! exit code. Ctrl-C cancels cooperatively; the file in flight finishes
//! before the run stops.

use std::process;

use clap::Parser;
use tokio::sync::mpsc::UnboundedReceiver;

use pdf_toolbox::cli::{expand_inputs, parse_page_list, Cli, Command};
use pdf_toolbox::error::ToolboxError;
use pdf_toolbox::ops::{CompressPreset, SplitMode, WatermarkOptions};
use pdf_toolbox::output::{write_json_report, OutputFormatter};
use pdf_toolbox::repair::{available_engines, find_ghostscript};
use pdf_toolbox::worker::tasks::{
    merge_batch, CompressTask, ConvertTask, ProtectTask, ReorderTask, RotateTask, SplitTask,
    UnlockTask, WatermarkTask,
};
use pdf_toolbox::worker::{BatchHandle, BatchWorker, WorkerEvent};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.quiet, cli.verbose);

    if let Err(err) = run(cli, &formatter).await {
        formatter.error(&err);
        process::exit(err.exit_code());
    }
}

async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<(), ToolboxError> {
    let report = cli.report.clone();

    let (handle, events) = match cli.command {
        Command::Engines => {
            for engine in available_engines() {
                println!("{engine}");
            }
            if find_ghostscript().is_none() {
                eprintln!("note: install Ghostscript to enable the ghostscript engine");
            }
            return Ok(());
        }

        Command::Unlock {
            inputs,
            password,
            output_dir,
        } => {
            let files = expand_inputs(&inputs)?;
            BatchWorker::new(files).spawn(UnlockTask::new(password, output_dir))
        }

        Command::Merge {
            inputs,
            output,
            password,
        } => {
            let files = expand_inputs(&inputs)?;
            BatchWorker::new(files).spawn_batch("merge", merge_batch(output, password))
        }

        Command::Split {
            inputs,
            pages,
            every,
            extract,
            output_dir,
            password,
        } => {
            let mode = match (pages, every, extract) {
                (Some(expr), None, None) => SplitMode::Ranges(expr),
                (None, Some(n), None) => SplitMode::EveryN(n),
                (None, None, Some(expr)) => SplitMode::Extract(parse_page_list(&expr)?),
                _ => {
                    return Err(ToolboxError::invalid_config(
                        "choose one of --pages, --every or --extract",
                    ))
                }
            };
            let files = expand_inputs(&inputs)?;
            let mut task = SplitTask::new(mode, output_dir);
            if let Some(pw) = password {
                task = task.with_password(pw);
            }
            BatchWorker::new(files).spawn(task)
        }

        Command::Rotate {
            inputs,
            degrees,
            pages,
            output_dir,
            password,
        } => {
            let pages = pages.map(|expr| parse_page_list(&expr)).transpose()?;
            let files = expand_inputs(&inputs)?;
            let mut task = RotateTask::new(degrees, pages, output_dir);
            if let Some(pw) = password {
                task = task.with_password(pw);
            }
            BatchWorker::new(files).spawn(task)
        }

        Command::Watermark {
            inputs,
            text,
            font_size,
            opacity,
            angle,
            pages,
            output_dir,
            password,
        } => {
            let mut opts = WatermarkOptions::new(text);
            opts.font_size = font_size;
            opts.opacity = opacity;
            opts.angle_degrees = angle;
            let pages = pages.map(|expr| parse_page_list(&expr)).transpose()?;
            let files = expand_inputs(&inputs)?;
            let mut task = WatermarkTask::new(opts, pages, output_dir);
            if let Some(pw) = password {
                task = task.with_password(pw);
            }
            BatchWorker::new(files).spawn(task)
        }

        Command::Compress {
            inputs,
            level,
            output_dir,
            password,
        } => {
            let preset = match level.as_str() {
                "low" => CompressPreset::Low,
                "medium" => CompressPreset::Medium,
                "high" => CompressPreset::High,
                _ => CompressPreset::Maximum,
            };
            let files = expand_inputs(&inputs)?;
            let mut task = CompressTask::new(preset, output_dir);
            if let Some(pw) = password {
                task = task.with_password(pw);
            }
            BatchWorker::new(files).spawn(task)
        }

        Command::Reorder {
            inputs,
            order,
            output_dir,
            password,
        } => {
            let order = parse_page_list(&order)?;
            let files = expand_inputs(&inputs)?;
            let mut task = ReorderTask::new(order, output_dir);
            if let Some(pw) = password {
                task = task.with_password(pw);
            }
            BatchWorker::new(files).spawn(task)
        }

        Command::Protect {
            inputs,
            password,
            owner_password,
            output_dir,
        } => {
            let files = expand_inputs(&inputs)?;
            let mut task = ProtectTask::new(password, output_dir);
            if let Some(pw) = owner_password {
                task = task.with_owner_password(pw);
            }
            BatchWorker::new(files).spawn(task)
        }

        Command::Convert {
            inputs,
            dpi,
            output_dir,
        } => {
            let files = expand_inputs(&inputs)?;
            BatchWorker::new(files).spawn(ConvertTask::new(dpi, output_dir))
        }
    };

    watch_for_interrupt(&handle);
    let outcome = drive(events, formatter).await;
    handle.join().await?;

    if let Some(path) = report {
        write_json_report(&path, &outcome.results)?;
        formatter.log(&format!("report written to {}", path.display()));
    }

    if outcome.cancelled {
        return Err(ToolboxError::Cancelled);
    }
    if !outcome.success {
        return Err(ToolboxError::operation_failed(
            "batch",
            "no file was processed successfully",
        ));
    }
    Ok(())
}

struct RunOutcome {
    success: bool,
    cancelled: bool,
    results: Vec<pdf_toolbox::worker::FileTaskResult>,
}

/// Render worker events until the stream closes, keeping the terminal
/// outcome.
async fn drive(
    mut events: UnboundedReceiver<WorkerEvent>,
    formatter: &OutputFormatter,
) -> RunOutcome {
    let mut outcome = RunOutcome {
        success: false,
        cancelled: false,
        results: Vec::new(),
    };

    while let Some(event) = events.recv().await {
        match event {
            WorkerEvent::Progress {
                current,
                total,
                message,
            } => formatter.progress(current, total, &message),
            WorkerEvent::FileCompleted {
                success, message, ..
            } => formatter.file_completed(success, &message),
            WorkerEvent::Log(message) => formatter.log(&message),
            WorkerEvent::Finished {
                success,
                cancelled,
                summary,
                results,
            } => {
                formatter.finished(success, &summary);
                outcome.success = success;
                outcome.cancelled = cancelled;
                outcome.results = results;
            }
        }
    }

    outcome
}

/// Cancel the batch on Ctrl-C. The worker finishes the file in flight,
/// emits its terminal event, and the normal shutdown path runs.
fn watch_for_interrupt(handle: &BatchHandle) {
    let flag = handle.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ninterrupt received, finishing the current file...");
            flag.cancel();
        }
    });
}
