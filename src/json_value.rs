//! Values that know how to write themselves through a [`JsonWriter`].

use crate::json_writer::JsonWriter;
use crate::res_id::ResId;

use glam::{Mat4, Quat, Vec3, Vec4};

pub trait JsonValue {
    fn write_json_value(&self, w: &mut JsonWriter);
}

macro_rules! impl_json_value_int {
    ($method:ident, $wide:ty, $($t:ty),+) => {
        $(
            impl JsonValue for $t {
                #[inline]
                fn write_json_value(&self, w: &mut JsonWriter) {
                    w.$method(*self as $wide);
                }
            }
        )+
    };
}

impl_json_value_int!(write_i64, i64, i8, i16, i32, i64, isize);
impl_json_value_int!(write_u64, u64, u8, u16, u32, u64, usize);

impl JsonValue for f32 {
    #[inline]
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.write_f32(*self);
    }
}

impl JsonValue for f64 {
    #[inline]
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.write_f64(*self);
    }
}

impl JsonValue for bool {
    #[inline]
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.write_bool(*self);
    }
}

impl JsonValue for str {
    #[inline]
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.write_quoted_str(self);
    }
}

impl JsonValue for String {
    #[inline]
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.write_quoted_str(self);
    }
}

impl JsonValue for ResId {
    #[inline]
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.write_i64(i64::from(self.raw()));
    }
}

impl<T: JsonValue + ?Sized> JsonValue for &T {
    fn write_json_value(&self, w: &mut JsonWriter) {
        (**self).write_json_value(w);
    }
}

impl<T: JsonValue> JsonValue for Option<T> {
    fn write_json_value(&self, w: &mut JsonWriter) {
        match self {
            Some(value) => value.write_json_value(w),
            None => w.write_null(),
        }
    }
}

impl<T: JsonValue> JsonValue for [T] {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.write_array(self, |w, value| value.write_json_value(w));
    }
}

impl<T: JsonValue> JsonValue for Vec<T> {
    fn write_json_value(&self, w: &mut JsonWriter) {
        self.as_slice().write_json_value(w);
    }
}

impl JsonValue for Vec3 {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.inline_object(|w| {
            w.write_key_val("x", &self.x);
            w.write_key_val("y", &self.y);
            w.write_key_val("z", &self.z);
        });
    }
}

impl JsonValue for Vec4 {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.inline_object(|w| {
            w.write_key_val("x", &self.x);
            w.write_key_val("y", &self.y);
            w.write_key_val("z", &self.z);
            w.write_key_val("w", &self.w);
        });
    }
}

impl JsonValue for Quat {
    fn write_json_value(&self, w: &mut JsonWriter) {
        w.inline_object(|w| {
            w.write_key_val("x", &self.x);
            w.write_key_val("y", &self.y);
            w.write_key_val("z", &self.z);
            w.write_key_val("w", &self.w);
        });
    }
}

/// Flat 16 element array, row by row (`m00, m01, m02, m03, m10, ...`).
impl JsonValue for Mat4 {
    fn write_json_value(&self, w: &mut JsonWriter) {
        // glam stores columns; the transpose's columns are our rows.
        let rows = self.transpose().to_cols_array();
        w.write_inline_array(rows, |w, value| w.write_f32(value));
    }
}
