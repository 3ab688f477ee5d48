use std::path::PathBuf;
use std::process::ExitCode;

use tour_editor_lib::command::execute_json_batch;
use tour_editor_lib::harness::TestHarness;
use tour_editor_lib::state::{EditorSettings, TourState};
use tour_editor_lib::viewport::HeadlessEngine;

const USAGE: &str = "usage: tour-editor [--settings <file>] [--write-settings] [--restore] \
[--tour <file>] [--commands <file>] [--out <file>]";

/// Command-line options
#[derive(Debug, Default, PartialEq)]
struct Args {
    /// Settings file; the platform config directory when absent
    settings: Option<PathBuf>,
    /// Store the effective settings back to the config directory
    write_settings: bool,
    /// Start from the autosaved tour
    restore: bool,
    /// Tour to start from
    tour: Option<PathBuf>,
    /// JSON array of editor commands to apply
    commands: Option<PathBuf>,
    /// Where to write the resulting tour; stdout when absent
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tour_editor=info".into()),
        )
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), String> {
    let settings = match &args.settings {
        Some(path) => EditorSettings::load_from(path),
        None => EditorSettings::load(),
    };
    if args.write_settings {
        settings.save();
    }
    let mut harness = TestHarness::with_settings(HeadlessEngine::strict(), settings);

    if args.restore {
        match harness.session.restore_autosave() {
            Some(_) => tracing::info!(scenes = harness.scene_count(), "resumed from autosave"),
            None => tracing::warn!("no autosave to restore"),
        }
    } else if TourState::has_autosave() {
        tracing::info!("an autosaved tour exists, pass --restore to resume it");
    }

    if let Some(path) = &args.tour {
        harness.open_file(path).await.map_err(|e| e.to_string())?;
        tracing::info!("Loaded tour from {} ({} scenes)", path.display(), harness.scene_count());
    }

    if let Some(path) = &args.commands {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read commands from {}: {e}", path.display()))?;
        let responses = execute_json_batch(&mut harness, &json)?;
        let failed = responses.iter().filter(|r| !r.success).count();
        for (i, response) in responses.iter().enumerate() {
            if let Some(error) = &response.error {
                tracing::warn!(command = i, "{error}");
            }
        }
        tracing::info!(applied = responses.len() - failed, failed, "commands executed");
    }

    for (owner, hotspot, target) in harness.doc().dangling_references() {
        tracing::warn!(%owner, %hotspot, %target, "hotspot targets a missing scene");
    }

    match &args.out {
        Some(path) => harness.save_file(path).await.map_err(|e| e.to_string())?,
        None => println!("{}", harness.export_json()),
    }
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(flag) = args.next() {
        let slot = match flag.as_str() {
            "--restore" => {
                parsed.restore = true;
                continue;
            }
            "--write-settings" => {
                parsed.write_settings = true;
                continue;
            }
            "--settings" => &mut parsed.settings,
            "--tour" => &mut parsed.tour,
            "--commands" => &mut parsed.commands,
            "--out" => &mut parsed.out,
            other => return Err(format!("Unknown argument: {other}")),
        };
        let value = args.next().ok_or_else(|| format!("Missing value for {flag}"))?;
        *slot = Some(PathBuf::from(value));
    }
    Ok(parsed)
}
