use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use thiserror::Error;

/// Errors that can occur while building display textures.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to build texture image")]
    GenerationFailed,
    #[error("texture has invalid dimensions")]
    InvalidDimensions,
}

/// The fixed display slots the cropper needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRole {
    /// The source image under edit.
    Source,
    /// The most recent export result.
    Preview,
}

/// Caches the cropper's display textures so the source bitmap and export
/// preview are not re-uploaded every frame.
///
/// Entries are keyed by role and stamped with a version; asking for a newer
/// version replaces the cached handle.
pub struct TextureStore {
    cache: HashMap<TextureRole, (u64, TextureHandle)>,
}

impl Default for TextureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureStore {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Get the texture for `role` at `version`, uploading through
    /// `generator` on a miss or a version change.
    pub fn get_or_upload<F>(
        &mut self,
        role: TextureRole,
        version: u64,
        ctx: &Context,
        generator: F,
    ) -> Result<TextureId, TextureError>
    where
        F: FnOnce() -> Result<ColorImage, TextureError>,
    {
        if let Some((cached_version, handle)) = self.cache.get(&role) {
            if *cached_version == version {
                return Ok(handle.id());
            }
        }

        let image = generator()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::InvalidDimensions);
        }

        let name = format!("cropper_{role:?}_v{version}");
        let handle = ctx.load_texture(&name, image, TextureOptions::LINEAR);
        let id = handle.id();
        self.cache.insert(role, (version, handle));
        Ok(id)
    }

    /// Drop the cached texture for `role`.
    pub fn invalidate(&mut self, role: TextureRole) {
        self.cache.remove(&role);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    #[cfg(test)]
    fn cached_version(&self, role: TextureRole) -> Option<u64> {
        self.cache.get(&role).map(|(version, _)| *version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_image() -> Result<ColorImage, TextureError> {
        Ok(ColorImage::new([10, 10], egui::Color32::WHITE))
    }

    #[test]
    fn cache_hit_reuses_the_handle() {
        let ctx = Context::default();
        let mut store = TextureStore::new();

        let first = store
            .get_or_upload(TextureRole::Source, 1, &ctx, mock_image)
            .unwrap();
        let second = store
            .get_or_upload(TextureRole::Source, 1, &ctx, mock_image)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn version_bump_replaces_the_texture() {
        let ctx = Context::default();
        let mut store = TextureStore::new();

        store
            .get_or_upload(TextureRole::Preview, 1, &ctx, mock_image)
            .unwrap();
        store
            .get_or_upload(TextureRole::Preview, 2, &ctx, mock_image)
            .unwrap();

        // Still one entry per role, now at the newer version.
        assert_eq!(store.len(), 1);
        assert_eq!(store.cached_version(TextureRole::Preview), Some(2));
    }

    #[test]
    fn invalidate_clears_the_role() {
        let ctx = Context::default();
        let mut store = TextureStore::new();

        store
            .get_or_upload(TextureRole::Source, 1, &ctx, mock_image)
            .unwrap();
        store.invalidate(TextureRole::Source);

        assert!(store.is_empty());
    }

    #[test]
    fn zero_sized_images_are_rejected() {
        let ctx = Context::default();
        let mut store = TextureStore::new();

        let result = store.get_or_upload(TextureRole::Source, 1, &ctx, || {
            Ok(ColorImage::new([0, 0], egui::Color32::WHITE))
        });

        assert!(matches!(result, Err(TextureError::InvalidDimensions)));
    }
}
