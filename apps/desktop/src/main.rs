use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    fetch_service_info, load_settings, ClassifierService, ClassifierSession,
    HttpClassifierService, SourceFile, SubmissionStatus, SubmissionView,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(about = "Identify the species in an image with the classification service")]
struct Args {
    /// Overrides the service URL from classifier.toml / environment.
    #[arg(long)]
    service_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate, upload and classify one image.
    Classify { path: PathBuf },
    /// Show service health and model metadata.
    Info,
    /// List the species the model knows.
    Classes,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = &args.service_url {
        settings = settings.with_service_url(url)?;
    }
    let service = Arc::new(HttpClassifierService::new(&settings)?);
    info!(service_url = %service.base_url(), "desktop: using classification service");

    match args.command {
        Command::Classify { path } => classify(service, path).await,
        Command::Info => {
            show_info(service.as_ref()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Classes => {
            let classes = service.classes().await?;
            println!("{}", render::render_classes(&classes));
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn classify(service: Arc<dyn ClassifierService>, path: PathBuf) -> Result<ExitCode> {
    let source = SourceFile::from_path(&path).await?;
    let view = run_classification(service, source).await;
    Ok(finish(&view))
}

/// Selects and submits `source`, printing every view as it is published.
/// Service info is fetched alongside and printed whenever it arrives; the
/// submission never waits for it.
async fn run_classification(
    service: Arc<dyn ClassifierService>,
    source: SourceFile,
) -> SubmissionView {
    let info_service = Arc::clone(&service);
    let info_task = tokio::spawn(async move {
        if let Some(info) = fetch_service_info(info_service.as_ref()).await {
            println!("{}", render::render_service_info(&info));
        }
    });

    let session = ClassifierSession::new(service);
    let mut views = session.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(view) = views.recv().await {
            println!("{}", render::render_status_line(&view));
        }
    });

    let view = session.select_file(source).await;
    let view = if view.status == SubmissionStatus::Ready {
        session.submit().await
    } else {
        view
    };

    drop(session);
    let _ = printer.await;
    info_task.abort();

    view
}

fn finish(view: &SubmissionView) -> ExitCode {
    println!("{}", render::render_result(view));
    if view.status == SubmissionStatus::Succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn show_info(service: &HttpClassifierService) -> Result<()> {
    match fetch_service_info(service).await {
        Some(info) => println!("{}", render::render_service_info(&info)),
        None => println!("service health: unavailable"),
    }
    let model = service.model_info().await?;
    println!("{}", render::render_model_info(&model));
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
