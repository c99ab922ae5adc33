use std::fs;
use std::path::{Path, PathBuf};

const PREFERRED_ICON_NAMES: [&str; 3] = ["AppIcon.icns", "app.icns", "icon.icns"];

/// Locates the `.icns` file of an application bundle, preferring the
/// conventional names before any other icon in `Contents/Resources`.
pub fn find_bundle_icon(bundle: &Path) -> Option<PathBuf> {
    let resources = bundle.join("Contents").join("Resources");
    if !resources.is_dir() {
        return None;
    }

    if let Some(preferred) = PREFERRED_ICON_NAMES
        .iter()
        .map(|name| resources.join(name))
        .find(|candidate| candidate.is_file())
    {
        return Some(preferred);
    }

    let mut fallbacks: Vec<PathBuf> = fs::read_dir(&resources)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("icns"))
                .unwrap_or(false)
        })
        .collect();
    fallbacks.sort();
    fallbacks.into_iter().next()
}
