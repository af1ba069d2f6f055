use bevy_ecs::prelude::*;

use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::resources::worldtime::WorldTime;

/// Integrate every non-frozen rigid body over the current step.
///
/// Velocity picks up gravity first, then the position moves by the new
/// velocity (semi-implicit Euler).
pub fn movement_system(mut query: Query<(&mut MapPosition, &mut RigidBody)>, time: Res<WorldTime>) {
    if time.delta <= 0.0 {
        return;
    }
    for (mut position, mut rigidbody) in query.iter_mut() {
        if rigidbody.frozen {
            continue;
        }
        let moved = rigidbody.integrate(time.delta);
        position.translate(moved);
    }
}
