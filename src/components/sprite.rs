use bevy_ecs::prelude::Component;

/// Drawable capability: the texture an object is drawn with and its tint.
///
/// The sprite covers the object's [`BoxCollider`] bounds. Texture ids are
/// resolved by the render target through its asset store.
///
/// [`BoxCollider`]: crate::components::boxcollider::BoxCollider
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Sprite {
    pub tex_key: String,
    /// RGBA tint.
    pub tint: [u8; 4],
}

impl Sprite {
    pub fn new(tex_key: impl Into<String>) -> Self {
        Self {
            tex_key: tex_key.into(),
            tint: [255, 255, 255, 255],
        }
    }

    pub fn with_tint(mut self, tint: [u8; 4]) -> Self {
        self.tint = tint;
        self
    }
}
