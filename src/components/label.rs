use bevy_ecs::prelude::Component;

/// Free-form name given to an object by the level author.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct Label(pub String);
