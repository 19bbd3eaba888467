use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Bundled font file looked up in the project fonts directory
pub const BUNDLED_EMOJI_FILE: &str = "NotoColorEmoji.ttf";
pub const BUNDLED_EMOJI_NAME: &str = "Noto Color Emoji";
/// Name used when neither a preferred nor a bundled font is available
pub const PLATFORM_EMOJI_NAME: &str = "Segoe UI Emoji";

/// Known on-disk locations of the preferred emoji font
const PREFERRED_FONT_FILES: &[&str] = &[
    "/System/Library/Fonts/Apple Color Emoji.ttc",
    "C:/Windows/Fonts/AppleColorEmoji.ttf",
];

/// Emoji font chosen for the styling file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFont {
    pub name: String,
    /// Font file the compositor should be pointed at, when one was found
    pub file: Option<PathBuf>,
}

/// Chooses the emoji font name used in inline overrides
pub trait FontResolver: Send + Sync {
    fn resolve(&self, preferred: Option<&str>) -> ResolvedFont;
}

/// Resolves fonts by probing the filesystem.
///
/// Order: preferred font if one of its system files exists, then the bundled
/// font in the fonts directory, then the platform default (or the preferred
/// name unverified when one was given).
pub struct FsFontResolver {
    system_files: Vec<PathBuf>,
    fonts_dir: PathBuf,
}

impl FsFontResolver {
    pub fn new<P: AsRef<Path>>(fonts_dir: P) -> Self {
        Self {
            system_files: PREFERRED_FONT_FILES.iter().map(PathBuf::from).collect(),
            fonts_dir: fonts_dir.as_ref().to_path_buf(),
        }
    }

    /// Replace the system font locations checked for the preferred font
    pub fn with_system_files(mut self, files: Vec<PathBuf>) -> Self {
        self.system_files = files;
        self
    }
}

impl FontResolver for FsFontResolver {
    fn resolve(&self, preferred: Option<&str>) -> ResolvedFont {
        if let Some(name) = preferred {
            if let Some(found) = self.system_files.iter().find(|p| p.exists()) {
                debug!("Using emoji font '{}' at {}", name, found.display());
                return ResolvedFont {
                    name: name.to_string(),
                    file: None,
                };
            }
        }

        let bundled = self.fonts_dir.join(BUNDLED_EMOJI_FILE);
        if bundled.exists() {
            info!("Using bundled {} font", BUNDLED_EMOJI_NAME);
            return ResolvedFont {
                name: BUNDLED_EMOJI_NAME.to_string(),
                file: Some(bundled),
            };
        }

        match preferred {
            None => {
                warn!("No dedicated emoji font found; falling back to {}", PLATFORM_EMOJI_NAME);
                ResolvedFont {
                    name: PLATFORM_EMOJI_NAME.to_string(),
                    file: None,
                }
            }
            Some(name) => {
                warn!("Preferred emoji font '{}' not found on disk; using it anyway", name);
                ResolvedFont {
                    name: name.to_string(),
                    file: None,
                }
            }
        }
    }
}
