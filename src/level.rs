//! Level descriptions.
//!
//! A level is stored as JSON in the shape of [`LevelFile`]. [`build_map`]
//! turns it into a populated [`Map`]:
//!
//! - the player becomes the primary of the collision group;
//! - every `can_collide` object joins the collision group in file order;
//! - trigger objects are gathered into one [`IntersectionGroup`] per trigger
//!   kind, added in the order power-ups, death zones, goals.
//!
//! [`level_from_map`] goes the other way for the editor.
//!
//! # Example
//!
//! ```json
//! {
//!   "name": "first steps",
//!   "kill_y": 800.0,
//!   "player": { "kind": "player", "position": [64, 200], "size": [24, 32] },
//!   "objects": [
//!     { "kind": "platform", "position": [320, 400], "size": [640, 32], "can_collide": true },
//!     { "kind": "power_up", "position": [200, 360], "size": [16, 16],
//!       "properties": { "tint": { "type": "color", "value": [255, 220, 0, 255] } } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glam::Vec2;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::objectkind::ObjectKind;
use crate::map::{Map, ObjectSpec};
use crate::resources::gameconfig::GameConfig;
use crate::systems::collision::IntersectionGroup;

const DEFAULT_KILL_Y: f32 = 2000.0;
const WHITE: [u8; 4] = [255, 255, 255, 255];

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to access level file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed level data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("object {index} has a negative size {size:?}")]
    NegativeSize { index: usize, size: [f32; 2] },
    #[error("the player entry has kind '{0}'")]
    NotAPlayer(ObjectKind),
    #[error("object {index} is a second player")]
    ExtraPlayer { index: usize },
    #[error("property '{name}' should be a {expected}")]
    PropertyType { name: String, expected: &'static str },
    #[error("the map has no player")]
    MissingPlayer,
}

/// Typed value of a free-form object property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Float(f32),
    Vector2([f32; 2]),
    /// x, y, width, height.
    Rect([f32; 4]),
    String(String),
    /// RGBA.
    Color([u8; 4]),
    Bool(bool),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Vector2(_) => "vector2",
            Self::Rect(_) => "rect",
            Self::String(_) => "string",
            Self::Color(_) => "color",
            Self::Bool(_) => "bool",
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            Self::Vector2(v) => Some(Vec2::from_array(*v)),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<[u8; 4]> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// One object as written in a level file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDesc {
    pub kind: ObjectKind,
    /// Center position.
    pub position: [f32; 2],
    pub size: [f32; 2],
    #[serde(default)]
    pub can_collide: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl ObjectDesc {
    pub fn new(kind: ObjectKind, position: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            kind,
            position,
            size,
            can_collide: false,
            texture: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn solid(mut self) -> Self {
        self.can_collide = true;
        self
    }

    pub fn with_property(mut self, name: &str, value: PropertyValue) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    fn property<T>(
        &self,
        name: &str,
        expected: &'static str,
        read: impl Fn(&PropertyValue) -> Option<T>,
    ) -> Result<Option<T>, LevelError> {
        match self.properties.get(name) {
            None => Ok(None),
            Some(value) => read(value).map(Some).ok_or_else(|| LevelError::PropertyType {
                name: name.to_string(),
                expected,
            }),
        }
    }

    /// Convert to an [`ObjectSpec`], applying the recognised properties.
    /// `gravity` is used when the object is a moving body without its own.
    fn to_spec(&self, index: usize, gravity: Vec2) -> Result<ObjectSpec, LevelError> {
        if self.size[0] < 0.0 || self.size[1] < 0.0 {
            return Err(LevelError::NegativeSize { index, size: self.size });
        }
        let mut spec = ObjectSpec::new(self.kind, Vec2::from_array(self.position), Vec2::from_array(self.size));
        spec.can_collide = self.can_collide;
        if let Some(texture) = &self.texture {
            spec.texture = Some(texture.clone());
        }
        if let Some(tint) = self.property("tint", "color", PropertyValue::as_color)? {
            spec.tint = tint;
        }
        if let Some(label) = self.property("label", "string", |v| v.as_str().map(str::to_owned))? {
            spec.label = Some(label);
        }
        let own_gravity = self.property("gravity", "vector2", PropertyValue::as_vec2)?;
        let velocity = self.property("velocity", "vector2", PropertyValue::as_vec2)?;
        if self.kind == ObjectKind::Player || own_gravity.is_some() || velocity.is_some() {
            spec = spec.moving(own_gravity.unwrap_or(gravity));
        }
        if let Some(velocity) = velocity {
            spec = spec.with_velocity(velocity);
        }
        Ok(spec)
    }

    /// Inverse of [`to_spec`](Self::to_spec).
    fn from_spec(spec: &ObjectSpec, default_gravity: Vec2) -> Self {
        let mut desc = ObjectDesc::new(spec.kind, spec.position.to_array(), spec.size.to_array());
        desc.can_collide = spec.can_collide && spec.kind != ObjectKind::Player;
        if spec.texture.as_deref() != Some(spec.kind.texture_key()) {
            desc.texture = spec.texture.clone();
        }
        if spec.tint != WHITE {
            desc.properties.insert("tint".into(), PropertyValue::Color(spec.tint));
        }
        if let Some(label) = &spec.label {
            desc.properties.insert("label".into(), PropertyValue::String(label.clone()));
        }
        if let Some(body) = spec.body {
            let implicit = spec.kind == ObjectKind::Player && body.gravity == default_gravity;
            if !implicit {
                desc.properties
                    .insert("gravity".into(), PropertyValue::Vector2(body.gravity.to_array()));
            }
            if body.velocity != Vec2::ZERO {
                desc.properties
                    .insert("velocity".into(), PropertyValue::Vector2(body.velocity.to_array()));
            }
        }
        desc
    }
}

fn default_kill_y() -> f32 {
    DEFAULT_KILL_Y
}

/// A complete level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelFile {
    pub name: String,
    pub player: ObjectDesc,
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
    /// Falling below this Y kills the player.
    #[serde(default = "default_kill_y")]
    pub kill_y: f32,
}

impl LevelFile {
    /// A level with only a player, used by the editor when no file exists.
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            player: ObjectDesc::new(ObjectKind::Player, [64.0, 64.0], [24.0, 32.0]),
            objects: Vec::new(),
            kill_y: DEFAULT_KILL_Y,
        }
    }
}

/// Build a map from a level description.
pub fn build_map(level: &LevelFile, config: &GameConfig) -> Result<Map, LevelError> {
    if level.player.kind != ObjectKind::Player {
        return Err(LevelError::NotAPlayer(level.player.kind));
    }
    let gravity = Vec2::new(0.0, config.gravity);

    let mut map = Map::new();
    let player = map.add_object(level.player.to_spec(0, gravity)?);
    map.set_primary(player);

    let mut triggers: Vec<(ObjectKind, IntersectionGroup)> = ObjectKind::TRIGGERS
        .iter()
        .map(|kind| (*kind, IntersectionGroup::new().with_primary(player)))
        .collect();

    for (index, desc) in level.objects.iter().enumerate() {
        if desc.kind == ObjectKind::Player {
            return Err(LevelError::ExtraPlayer { index });
        }
        let entity = map.add_object(desc.to_spec(index, gravity)?);
        if let Some((_, group)) = triggers.iter_mut().find(|(kind, _)| *kind == desc.kind) {
            group.add(entity);
        }
    }

    for (_, group) in triggers {
        if !group.is_empty() {
            map.add_interaction_group(group);
        }
    }

    info!(
        "Built level '{}': {} objects, {} trigger groups",
        level.name,
        map.len(),
        map.interaction_group_count()
    );
    Ok(map)
}

/// Describe the current contents of `map` as a level.
pub fn level_from_map(map: &Map, name: &str, kill_y: f32, config: &GameConfig) -> Result<LevelFile, LevelError> {
    let gravity = Vec2::new(0.0, config.gravity);
    let player = map.primary().ok_or(LevelError::MissingPlayer)?;
    let player_spec = map.object_spec(player).ok_or(LevelError::MissingPlayer)?;
    let objects = map
        .objects()
        .iter()
        .filter(|entity| **entity != player)
        .filter_map(|entity| map.object_spec(*entity))
        .map(|spec| ObjectDesc::from_spec(&spec, gravity))
        .collect();
    Ok(LevelFile {
        name: name.to_string(),
        player: ObjectDesc::from_spec(&player_spec, gravity),
        objects,
        kill_y,
    })
}

pub fn load_level_from_path(path: impl AsRef<Path>) -> Result<LevelFile, LevelError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let level: LevelFile = serde_json::from_str(&text)?;
    info!("Loaded level '{}' from {:?}", level.name, path);
    Ok(level)
}

/// Write `level` as pretty-printed JSON, creating parent directories.
pub fn save_level_to_path(level: &LevelFile, path: impl AsRef<Path>) -> Result<(), LevelError> {
    let path = path.as_ref();
    let io_error = |source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let text = serde_json::to_string_pretty(level)?;
    fs::write(path, text).map_err(io_error)?;
    info!("Saved level '{}' to {:?}", level.name, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "sample",
        "kill_y": 600.0,
        "player": { "kind": "player", "position": [0, 0], "size": [24, 32] },
        "objects": [
            { "kind": "goal", "position": [500, 0], "size": [16, 64] },
            { "kind": "platform", "position": [0, 100], "size": [200, 32], "can_collide": true },
            { "kind": "death_zone", "position": [300, 500], "size": [600, 16] },
            { "kind": "power_up", "position": [100, 50], "size": [16, 16],
              "properties": { "tint": { "type": "color", "value": [255, 200, 0, 255] } } },
            { "kind": "platform", "position": [200, 60], "size": [64, 16], "can_collide": true,
              "properties": { "velocity": { "type": "vector2", "value": [40, 0] },
                              "gravity": { "type": "vector2", "value": [0, 0] } } }
        ]
    }"#;

    fn sample() -> LevelFile {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn parses_defaults() {
        let level = sample();
        assert_eq!(level.objects.len(), 5);
        assert!(!level.objects[0].can_collide);
        assert_eq!(
            level.objects[3].properties.get("tint"),
            Some(&PropertyValue::Color([255, 200, 0, 255]))
        );
        let minimal: LevelFile =
            serde_json::from_str(r#"{"name":"m","player":{"kind":"player","position":[0,0],"size":[1,1]}}"#).unwrap();
        assert!(minimal.objects.is_empty());
        assert_eq!(minimal.kill_y, DEFAULT_KILL_Y);
    }

    #[test]
    fn build_map_wires_groups() {
        let map = build_map(&sample(), &GameConfig::new()).unwrap();
        assert_eq!(map.len(), 6);
        let player = map.primary().unwrap();
        assert_eq!(map.kind(player), Some(ObjectKind::Player));
        assert!(map.body(player).is_some());

        let solids = map.collision_group().members();
        assert_eq!(solids.len(), 2);
        assert_eq!(map.kind(solids[0]), Some(ObjectKind::Platform));
        assert_eq!(map.position(solids[0]), Some(Vec2::new(0.0, 100.0)));

        // One group per trigger kind present, in fixed kind order.
        assert_eq!(map.interaction_group_count(), 3);
        let moving = solids[1];
        let body = map.body(moving).unwrap();
        assert_eq!(body.velocity, Vec2::new(40.0, 0.0));
        assert_eq!(body.gravity, Vec2::ZERO);
    }

    #[test]
    fn player_uses_configured_gravity() {
        let mut config = GameConfig::new();
        config.gravity = 500.0;
        let map = build_map(&sample(), &config).unwrap();
        let player = map.primary().unwrap();
        assert_eq!(map.body(player).unwrap().gravity, Vec2::new(0.0, 500.0));
    }

    #[test]
    fn rejects_bad_levels() {
        let mut level = sample();
        level.objects[1].size = [-1.0, 4.0];
        assert!(matches!(
            build_map(&level, &GameConfig::new()),
            Err(LevelError::NegativeSize { index: 1, .. })
        ));

        let mut level = sample();
        level.objects[0]
            .properties
            .insert("tint".into(), PropertyValue::Float(1.0));
        match build_map(&level, &GameConfig::new()) {
            Err(LevelError::PropertyType { name, expected }) => {
                assert_eq!(name, "tint");
                assert_eq!(expected, "color");
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("expected an error"),
        }

        let mut level = sample();
        level.player.kind = ObjectKind::Goal;
        assert!(matches!(
            build_map(&level, &GameConfig::new()),
            Err(LevelError::NotAPlayer(ObjectKind::Goal))
        ));

        let mut level = sample();
        level.objects.push(ObjectDesc::new(ObjectKind::Player, [0.0, 0.0], [1.0, 1.0]));
        assert!(matches!(
            build_map(&level, &GameConfig::new()),
            Err(LevelError::ExtraPlayer { index: 5 })
        ));
    }

    #[test]
    fn level_from_map_inverts_build_map() {
        let config = GameConfig::new();
        let level = sample();
        let map = build_map(&level, &config).unwrap();
        let rebuilt = level_from_map(&map, &level.name, level.kill_y, &config).unwrap();
        assert_eq!(rebuilt, level);
    }

    #[test]
    fn level_from_map_needs_a_player() {
        let map = Map::new();
        assert!(matches!(
            level_from_map(&map, "x", 0.0, &GameConfig::new()),
            Err(LevelError::MissingPlayer)
        ));
    }

    #[test]
    fn save_and_load_files() {
        let dir = std::env::temp_dir().join(format!("ledgehop_level_{}", std::process::id()));
        let path = dir.join("nested").join("level.json");
        let level = sample();
        save_level_to_path(&level, &path).unwrap();
        assert_eq!(load_level_from_path(&path).unwrap(), level);
        fs::remove_dir_all(&dir).ok();

        assert!(matches!(
            load_level_from_path(dir.join("missing.json")),
            Err(LevelError::Io { .. })
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("ledgehop_bad_{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_level_from_path(&path), Err(LevelError::Json(_))));
        fs::remove_file(&path).ok();
    }
}
