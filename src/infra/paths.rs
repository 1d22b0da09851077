// src/infra/paths.rs - Path management
//
// All paths respect the VOXOVER_HOME environment variable for isolation.
// When VOXOVER_HOME is set, config and data live under that directory.
// When unset, config uses ~/.voxover/ and data uses the platform data dir.

use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::OnceLock;

static PROJECT_DIRS: OnceLock<ProjectDirs> = OnceLock::new();

fn project_dirs() -> &'static ProjectDirs {
    PROJECT_DIRS.get_or_init(|| {
        ProjectDirs::from("", "", "voxover").expect("Could not determine home directory")
    })
}

/// Returns the VOXOVER_HOME override, if set.
fn voxover_home() -> Option<PathBuf> {
    std::env::var_os("VOXOVER_HOME").map(PathBuf::from)
}

/// Configuration directory: $VOXOVER_HOME/ or ~/.voxover/
pub fn config_dir() -> PathBuf {
    if let Some(home) = voxover_home() {
        return home;
    }
    dirs_home().join(".voxover")
}

/// Data directory: $VOXOVER_HOME/data/ or the platform-local data dir
pub fn data_dir() -> PathBuf {
    if let Some(home) = voxover_home() {
        return home.join("data");
    }
    project_dirs().data_local_dir().to_path_buf()
}

/// Home directory
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .expect("Could not determine home directory")
        .home_dir()
        .to_path_buf()
}

/// Default base directory for per-chat working files
pub fn media_dir() -> PathBuf {
    data_dir().join("media")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Ensure all required directories exist
pub async fn ensure_dirs() -> anyhow::Result<()> {
    let dirs = [config_dir(), data_dir(), media_dir()];

    for dir in &dirs {
        tokio::fs::create_dir_all(dir).await?;
    }

    Ok(())
}
