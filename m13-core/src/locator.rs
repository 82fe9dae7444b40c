use std::path::{Path, PathBuf};

/// File name of the single backing save file
pub const SAVE_FILE_NAME: &str = "user.json";

const COMPANY_DIR: &str = "Mickey_13";
const PRODUCT_DIR: &str = "Mickey13";

/// Get the platform-specific application data directory
///
/// Returns:
/// - Linux: ~/.config/unity3d/Mickey_13/Mickey13
/// - Windows: %USERPROFILE%\AppData\LocalLow\Mickey_13\Mickey13
/// - macOS: ~/Library/Application Support/Mickey_13/Mickey13
pub fn save_directory() -> Option<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()?;

    save_directory_in(Path::new(&home))
}

/// Same as [`save_directory`] for an explicit home directory
pub fn save_directory_in(home: &Path) -> Option<PathBuf> {
    let mut path = home.to_path_buf();

    if cfg!(target_os = "linux") {
        path.push(".config");
        path.push("unity3d");
    } else if cfg!(target_os = "windows") {
        path.push("AppData");
        path.push("LocalLow");
    } else if cfg!(target_os = "macos") {
        path.push("Library");
        path.push("Application Support");
    } else {
        return None;
    }

    path.push(COMPANY_DIR);
    path.push(PRODUCT_DIR);

    Some(path)
}

/// Get the path to user.json
pub fn default_save_path() -> Option<PathBuf> {
    save_directory().map(|dir| dir.join(SAVE_FILE_NAME))
}
