use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Gameplay role of a map object.
///
/// The kind decides which group the object joins when a level is built:
/// solid kinds go into the map's collision group, trigger kinds into an
/// intersection group of their own.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Player,
    Platform,
    PowerUp,
    DeathZone,
    Goal,
    Decoration,
}

impl ObjectKind {
    /// Kinds the editor palette offers, in palette order.
    pub const PALETTE: &'static [ObjectKind] = &[
        ObjectKind::Platform,
        ObjectKind::PowerUp,
        ObjectKind::DeathZone,
        ObjectKind::Goal,
        ObjectKind::Decoration,
    ];

    /// Trigger kinds and the order their groups are resolved in.
    pub const TRIGGERS: &'static [ObjectKind] =
        &[ObjectKind::PowerUp, ObjectKind::DeathZone, ObjectKind::Goal];

    /// True for kinds handled by an intersection (trigger) group.
    pub fn is_trigger(self) -> bool {
        Self::TRIGGERS.contains(&self)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Platform => "platform",
            Self::PowerUp => "power-up",
            Self::DeathZone => "death zone",
            Self::Goal => "goal",
            Self::Decoration => "decoration",
        }
    }

    /// Texture id used when an object does not name its own.
    pub fn texture_key(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Platform => "platform",
            Self::PowerUp => "power_up",
            Self::DeathZone => "death_zone",
            Self::Goal => "goal",
            Self::Decoration => "decoration",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_are_not_solid_kinds() {
        assert!(ObjectKind::PowerUp.is_trigger());
        assert!(ObjectKind::DeathZone.is_trigger());
        assert!(!ObjectKind::Platform.is_trigger());
        assert!(!ObjectKind::Player.is_trigger());
    }

    #[test]
    fn serializes_as_snake_case() {
        let text = serde_json::to_string(&ObjectKind::DeathZone).unwrap();
        assert_eq!(text, "\"death_zone\"");
    }

    #[test]
    fn palette_excludes_player() {
        assert!(!ObjectKind::PALETTE.contains(&ObjectKind::Player));
    }
}
