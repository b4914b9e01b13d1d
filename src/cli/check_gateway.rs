use std::path::PathBuf;

pub(crate) fn run(
    config_path: Option<PathBuf>,
    kong_version: Option<String>,
    versions_dir: Option<PathBuf>,
) {
    let mut config = super::load_config("check-gateway", config_path.as_deref());
    if let Some(version) = kong_version {
        config.kong_version = version;
    }
    if let Some(dir) = versions_dir {
        config.kong_versions_dir = dir;
    }

    let path = pongo::gateway::version_path(&config.kong_versions_dir, &config.kong_version);
    if pongo::gateway::is_version_available(&config.kong_versions_dir, &config.kong_version) {
        eprintln!("Kong {}: available at {}", config.kong_version, path.display());
    } else {
        eprintln!("Kong {}: not found at {}", config.kong_version, path.display());
        std::process::exit(1);
    }
}
