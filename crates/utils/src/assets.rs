use directories::ProjectDirs;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");

pub fn asset_dir() -> std::path::PathBuf {
    let path = if cfg!(debug_assertions) {
        std::path::PathBuf::from(PROJECT_ROOT).join("../../dev_assets")
    } else {
        ProjectDirs::from("org", "runlog", "runlog")
            .expect("OS didn't give us a home directory")
            .data_dir()
            .to_path_buf()
    };

    // Ensure the directory exists
    if !path.exists() {
        std::fs::create_dir_all(&path).expect("Failed to create asset directory");
    }

    path
}

/// Get the database file path.
///
/// Respects the `RUNLOG_DATABASE_PATH` environment variable for custom
/// locations. Supports tilde expansion (e.g., `~/runlog/db.sqlite`).
///
/// Default: `{asset_dir}/db.sqlite`
pub fn database_path() -> std::path::PathBuf {
    if let Ok(path) = std::env::var("RUNLOG_DATABASE_PATH") {
        return crate::path::expand_tilde(&path);
    }
    asset_dir().join("db.sqlite")
}
