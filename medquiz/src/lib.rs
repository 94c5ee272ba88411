// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use anyhow::{bail, Context, Result};
use chrono::{Local, Utc};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::application::catalog::{unique_exam_types, unique_subjects};
use crate::application::{
    CatalogBuilder, DirectoryScanner, StructureGenerator, StudyTracker, TopicFilter, TopicLoader,
    TopicLocator,
};
use crate::cli::args::{Args, Command, StudyCommand};
use crate::domain::{ActivityStats, DailyActivity, QuizRunner, SessionFilter};
use crate::infrastructure::{Config, FsContentRepository, JsonFileStore, StructureWatcher};
use crate::ports::http::{self, SharedRepository};
use crate::ports::{terminal, AppState, TerminalPresenter};
use crate::util::text::format_duration;

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting medquiz with arguments");

    let mut config = Config::resolve(args.config.as_deref())?;
    if let Some(public_dir) = args.public_dir {
        debug!(?public_dir, "Using public directory from command line");
        config.content.public_dir = public_dir;
    }

    match args.command {
        Command::Serve { watch, host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(&config, watch)
        }
        Command::Generate => generate(&config),
        Command::Watch => watch(&config),
        Command::Scan { module, subject } => {
            let scanner = DirectoryScanner::new(FsContentRepository::new(config.modules_root()));
            let names = scanner.scan(module.as_deref(), subject.as_deref())?;
            println!("{}", TerminalPresenter::new().render_names(&names));
            Ok(())
        }
        Command::Catalog {
            search,
            difficulty,
            exam,
            subject,
            year,
            json,
        } => {
            let filter = TopicFilter {
                search,
                difficulty,
                exam_type: exam,
                subject,
                year,
            };
            catalog(&config, &filter, json)
        }
        Command::Quiz { slug } => quiz(&config, &slug),
        Command::Study { action } => study(&config, action),
        Command::Streak { file, today } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            streak(&file, today)
        }
        Command::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Config::create_default(&path)?;
            info!(path = %path.display(), "Wrote default config");
            println!("Created {}", path.display());
            Ok(())
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn shared_generator(
    config: &Config,
) -> (SharedRepository, Arc<StructureGenerator<SharedRepository>>) {
    let repository: SharedRepository = Arc::new(FsContentRepository::new(config.modules_root()));
    let generator = Arc::new(StructureGenerator::new(
        Arc::clone(&repository),
        config.index_path(),
    ));
    (repository, generator)
}

fn serve(config: &Config, watch: bool) -> Result<()> {
    let addr = config.bind_addr()?;
    let (repository, generator) = shared_generator(config);
    let state = AppState::new(repository, Arc::clone(&generator), &config.content.public_dir);

    let watcher = watch.then(|| {
        StructureWatcher::new(
            generator,
            config.modules_root(),
            config.poll_interval(),
            config.debounce(),
        )
    });

    runtime()?.block_on(async move {
        let handle = watcher.map(StructureWatcher::spawn);
        let shutdown = async move {
            shutdown_signal().await;
            if let Some(handle) = handle {
                handle.stop().await;
            }
        };
        http::serve(state, addr, shutdown).await
    })?;

    info!("Graceful shutdown complete");
    Ok(())
}

fn generate(config: &Config) -> Result<()> {
    let (_, generator) = shared_generator(config);
    let report = generator
        .generate()
        .with_context(|| format!("Failed to generate {}", generator.output().display()))?;
    println!("{} ({} modules)", report.message, report.structure.len());
    Ok(())
}

fn watch(config: &Config) -> Result<()> {
    let (_, generator) = shared_generator(config);
    let watcher = StructureWatcher::new(
        generator,
        config.modules_root(),
        config.poll_interval(),
        config.debounce(),
    );

    runtime()?.block_on(async move {
        let handle = watcher.spawn();
        shutdown_signal().await;
        handle.stop().await;
    });
    Ok(())
}

fn catalog(config: &Config, filter: &TopicFilter, json: bool) -> Result<()> {
    let entries = CatalogBuilder::new(FsContentRepository::new(config.modules_root())).build();
    let matching = filter.apply(&entries);
    debug!(total = entries.len(), matching = matching.len(), "Filtered catalog");

    if json {
        let out = serde_json::to_string_pretty(&matching).context("Failed to serialize catalog")?;
        println!("{out}");
    } else {
        println!("{}", TerminalPresenter::new().render_catalog(&matching));
        println!(
            "\nSubjects: {}\nExam types: {}",
            unique_subjects(&entries).join(", "),
            unique_exam_types(&entries).join(", ")
        );
    }
    Ok(())
}

fn quiz(config: &Config, slug: &str) -> Result<()> {
    let locator: TopicLocator = slug.parse()?;
    let loader = TopicLoader::new(FsContentRepository::new(config.modules_root()));

    let mut runner = QuizRunner::new();
    runner.load(loader.load(&locator))?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    terminal::play_quiz(
        &mut runner,
        &mut stdin.lock(),
        &mut stdout.lock(),
        Utc::now,
        || loader.load(&locator),
    )
}

fn study(config: &Config, action: StudyCommand) -> Result<()> {
    let store = JsonFileStore::open(config.storage_path()?)?;
    let mut tracker = StudyTracker::open(store)?;
    let presenter = TerminalPresenter::new();
    let now_ms = Utc::now().timestamp_millis();

    match action {
        StudyCommand::Start {
            subject,
            tags,
            notes,
        } => {
            tracker.set_details(&subject, &tags, &notes)?;
            tracker.start(now_ms)?;
            println!("{}", presenter.render_timer(tracker.timer(), now_ms));
        }
        StudyCommand::Pause => {
            tracker.pause(now_ms)?;
            println!("{}", presenter.render_timer(tracker.timer(), now_ms));
        }
        StudyCommand::Resume => {
            tracker.resume(now_ms)?;
            println!("{}", presenter.render_timer(tracker.timer(), now_ms));
        }
        StudyCommand::Reset => {
            tracker.reset()?;
            println!("{}", presenter.render_timer(tracker.timer(), now_ms));
        }
        StudyCommand::Status => {
            println!("{}", presenter.render_timer(tracker.timer(), now_ms));
        }
        StudyCommand::Stop => {
            let session = tracker.stop(now_ms)?;
            println!(
                "Saved {}: {} ({})",
                session.id,
                session.subject,
                format_duration(session.duration)
            );
        }
        StudyCommand::List { filter } => {
            let filter = SessionFilter::from(filter);
            println!(
                "{}",
                presenter.render_sessions(&tracker.filtered(&filter, now_ms))
            );
        }
        StudyCommand::Stats => {
            println!("{}", presenter.render_stats(&tracker.stats(Local::now())));
        }
        StudyCommand::Export { filter, output } => {
            let csv = tracker.export_csv(&SessionFilter::from(filter), now_ms);
            match output {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), "Exported study sessions");
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    writeln!(stdout, "{csv}").context("Failed to write CSV")?;
                }
            }
        }
    }
    Ok(())
}

fn streak(file: &Path, today: chrono::NaiveDate) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records: Vec<DailyActivity> =
        serde_json::from_str(&content).context("Failed to parse activity records")?;

    let stats = ActivityStats::compute(&records, today);
    println!("{}", TerminalPresenter::new().render_activity(&stats));
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
/// must be public to be used from integration tests
mod tests {
    use crate::util::testing;
    #[ctor::ctor]
    fn init() {
        testing::init_test_setup().expect("Failed to initialize test setup");
    }
}
