//! Replays a recorded touch trace and writes the resulting document.

mod trace;

use clap::Parser;
use notecanvas_core::{document, Workspace};
use std::path::PathBuf;
use std::process::ExitCode;
use trace::{replay, ReplayError, Trace};

/// Replay touch gestures through the notecanvas engine
#[derive(Parser, Debug)]
#[command(name = "notecanvas-replay")]
#[command(version, about, long_about = None)]
struct Args {
    /// Trace file (JSON with `config`, `canvas` and `events`)
    #[arg(value_name = "TRACE")]
    trace: PathBuf,

    /// Document to start from instead of an empty canvas
    #[arg(long, value_name = "FILE")]
    document: Option<PathBuf>,

    /// Where to write the resulting document (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), ReplayError> {
    let trace = Trace::load(&args.trace)?;
    let mut workspace = match &args.document {
        Some(path) => Workspace::with_state(trace.config.clone(), document::load(path)?),
        None => Workspace::new(trace.config.clone()),
    };

    let summary = replay(&trace, &mut workspace);
    log::info!(
        "Replayed {} touch events ({} ignored), {} undo, {} redo; {} blocks",
        summary.touches,
        summary.ignored_touches,
        summary.undos,
        summary.redos,
        workspace.state().block_count()
    );
    if let Some(transform) = workspace.transform(&trace.canvas) {
        log::info!(
            "Final view of {}: scale {:.3}, translate ({:.1}, {:.1})",
            trace.canvas,
            transform.scale,
            transform.translate.x,
            transform.translate.y
        );
    }

    match &args.output {
        Some(path) => workspace.save(path)?,
        None => println!("{}", workspace.to_json()?),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
