//! The in-memory document an export produces, and how it is written out.

mod components;
mod game_object;
mod scene;
mod transform;

pub use self::components::{
    JsonAnimator, JsonCollider, JsonLight, JsonPhysicsJoint, JsonReflectionProbe,
    JsonRendererData, JsonRigidbody, JsonSkinRendererData, JsonTerrain,
};
pub use self::game_object::JsonGameObject;
pub use self::scene::JsonScene;
pub use self::transform::JsonTransform;

use log::warn;

/// Converts every present item with `f`, skipping missing ones with a warning.
///
/// `node_label` only feeds the warning. Never fails.
pub fn convert_components<In, Out, F>(
    node_label: &str,
    items: Vec<Option<In>>,
    mut f: F,
) -> Vec<Out>
where
    F: FnMut(In) -> Out,
{
    let mut result = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Some(item) => result.push(f(item)),
            None => warn!("Component {} is null on object {}", index, node_label),
        }
    }
    result
}
