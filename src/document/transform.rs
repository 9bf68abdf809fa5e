use crate::json_value::JsonValue;
use crate::json_writer::JsonWriter;

use glam::{Mat4, Vec3};

/// Basis vectors and translation of an affine matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsonTransform {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
    pub pos: Vec3,
}

impl From<&Mat4> for JsonTransform {
    fn from(m: &Mat4) -> Self {
        JsonTransform {
            x: m.x_axis.truncate(),
            y: m.y_axis.truncate(),
            z: m.z_axis.truncate(),
            pos: m.w_axis.truncate(),
        }
    }
}

fn write_triple(w: &mut JsonWriter, key: &str, v: Vec3) {
    w.write_key(key);
    w.write_inline_array(v.to_array(), |w, f| w.write_f32(f));
}

impl JsonValue for JsonTransform {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.object(|w| {
            write_triple(w, "x", self.x);
            write_triple(w, "y", self.y);
            write_triple(w, "z", self.z);
            write_triple(w, "pos", self.pos);
        });
    }
}
