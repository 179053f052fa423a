//! Environment configuration helpers

/// Load a `.env` file from the current directory or its parents
///
/// A missing file is not an error; returns whether one was loaded.
pub fn load_dotenv() -> bool {
    dotenvy::dotenv().is_ok()
}

/// Read an environment variable, treating empty or blank values as unset
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
