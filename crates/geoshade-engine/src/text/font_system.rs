use std::fmt;
use std::path::Path;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// Owns the loaded fonts. Fonts are immutable after loading.
#[derive(Default)]
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        Ok(id)
    }

    /// Loads the first readable, parseable font among `paths`.
    ///
    /// Returns `None` (after logging what was tried) if none qualifies.
    pub fn load_first_available<P: AsRef<Path>>(&mut self, paths: &[P]) -> Option<FontId> {
        for path in paths {
            let path = path.as_ref();
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            match self.load_font(&bytes) {
                Ok(id) => {
                    log::debug!("overlay font loaded from {}", path.display());
                    return Some(id);
                }
                Err(e) => log::warn!("skipping {}: {e}", path.display()),
            }
        }
        log::warn!("no overlay font found among {} candidate paths", paths.len());
        None
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_to_load() {
        let mut fs = FontSystem::new();
        assert!(fs.load_font(&[0u8, 1, 2, 3]).is_err());
        assert!(fs.is_empty());
    }

    #[test]
    fn missing_paths_yield_none() {
        let mut fs = FontSystem::new();
        let id = fs.load_first_available(&["/nonexistent/geoshade/a.ttf", "/nonexistent/b.otf"]);
        assert!(id.is_none());
        assert_eq!(fs.len(), 0);
    }
}
