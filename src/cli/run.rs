use std::path::PathBuf;

use tracing::{info, warn};

use pongo::{Orchestrator, PongoError, RunReport};

pub(crate) fn run(
    config_path: Option<PathBuf>,
    plugins_dir: Option<PathBuf>,
    report_path: Option<PathBuf>,
    workers: Option<usize>,
    timeout: Option<u64>,
) {
    let mut config = super::load_config("run", config_path.as_deref());
    if plugins_dir.is_some() {
        config.plugins_directory = plugins_dir;
    }
    if let Some(path) = report_path {
        config.report_path = path;
    }
    if workers.is_some() {
        config.max_workers = workers;
    }
    if timeout.is_some() {
        config.task_timeout_secs = timeout;
    }

    let root = config.plugins_directory().unwrap_or_else(|e| fail(e)).to_path_buf();
    let options = config.run_options().unwrap_or_else(|e| fail(e));

    if pongo::gateway::is_version_available(&config.kong_versions_dir, &config.kong_version) {
        info!("Kong version {} is available.", config.kong_version);
    } else {
        warn!(
            "Kong version {} not found at {}",
            config.kong_version,
            pongo::gateway::version_path(&config.kong_versions_dir, &config.kong_version).display()
        );
    }

    info!("Listing plugins in: {}", root.display());
    let plugins = pongo::discover(&root).unwrap_or_else(|e| fail(e));
    if plugins.is_empty() {
        warn!("no plugin directories found under {}", root.display());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| fail(e.into()));
    let report: RunReport = runtime.block_on(Orchestrator::new(plugins, options).run());

    pongo::write_report(&report, &config.report_path).unwrap_or_else(|e| fail(e));

    println!("{}", pongo::render_table(&report));
    info!("Report saved to {}", config.report_path.display());

    if report.failed() > 0 {
        std::process::exit(1);
    }
}

fn fail(e: PongoError) -> ! {
    eprintln!("pongo run: {e}");
    std::process::exit(1);
}
