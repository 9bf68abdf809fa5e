use crate::export_settings::ExportSettings;
use crate::json_value::JsonValue;

use log::warn;

#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Entries written into this container so far.
    count: usize,
    /// Inline containers keep all entries on one line.
    inline: bool,
}

/// Streaming JSON writer over a single growable buffer.
///
/// Responsibilities:
/// - Tracks nesting with a stack of per-container entry counters, so commas are only ever
///   emitted between entries
/// - Handles indentation and line breaks for pretty output
/// - Escapes strings and formats numbers via itoa/ryu without intermediate allocations
///
/// Every `begin_*` must be matched by exactly one `end_*`. The closure based helpers
/// ([`JsonWriter::object`], [`JsonWriter::key_array`], ...) do the pairing for the caller and
/// should be preferred. An unbalanced sequence produces malformed text, not an error.
#[derive(Debug, Clone)]
pub struct JsonWriter {
    buf: String,
    indent: usize,
    frames: Vec<Frame>,
    pretty: bool,
    indent_str: String,
    skip_empty_arrays: bool,
}

impl Default for JsonWriter {
    fn default() -> Self {
        JsonWriter::new()
    }
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::with_settings(&ExportSettings::default())
    }

    pub fn with_settings(settings: &ExportSettings) -> Self {
        JsonWriter {
            buf: String::with_capacity(settings.get_reserve_capacity()),
            indent: 0,
            frames: Vec::new(),
            pretty: settings.should_indent(),
            indent_str: settings.get_indent_str().to_owned(),
            skip_empty_arrays: settings.should_skip_empty_components(),
        }
    }

    /// The text written so far. Only a complete document once the root container is closed.
    pub fn get_text(&self) -> &str {
        &self.buf
    }

    pub fn into_text(self) -> String {
        if !self.is_balanced() {
            warn!(
                "JSON text taken with {} container(s) still open",
                self.frames.len()
            );
        }
        self.buf
    }

    /// Number of currently open containers.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_balanced(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn skips_empty_arrays(&self) -> bool {
        self.skip_empty_arrays
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn in_inline_container(&self) -> bool {
        self.frames.last().is_some_and(|f| f.inline)
    }

    fn write_indent(&mut self) {
        if !self.pretty {
            return;
        }
        for _ in 0..self.indent {
            self.buf.push_str(&self.indent_str);
        }
    }

    fn line_break(&mut self) {
        if self.pretty {
            self.buf.push('\n');
            self.write_indent();
        }
    }

    /// Counts a new entry in the current container and writes the separator in front of it.
    ///
    /// Entries start on their own indented line. With `line_break` unset (or inside an inline
    /// container) they follow the previous entry after `", "` instead.
    pub fn process_comma(&mut self, line_break: bool) {
        let line_break = self.pretty
            && line_break
            && !self.frames.is_empty()
            && !self.in_inline_container();
        let count = match self.frames.last_mut() {
            Some(frame) => {
                frame.count += 1;
                frame.count - 1
            }
            None => 0,
        };

        if count > 0 {
            self.buf.push(',');
        }
        if line_break {
            self.line_break();
        } else if count > 0 && self.pretty {
            self.buf.push(' ');
        }
    }

    fn open(&mut self, token: char, inline: bool) {
        self.buf.push(token);
        self.indent += 1;
        self.frames.push(Frame { count: 0, inline });
    }

    fn close(&mut self, token: char) {
        let Some(frame) = self.frames.pop() else {
            warn!("Closing `{}` without an open container", token);
            self.buf.push(token);
            return;
        };
        self.indent = self.indent.saturating_sub(1);
        // Empty containers close on the same line: `[]`.
        if !frame.inline && frame.count > 0 {
            self.line_break();
        }
        self.buf.push(token);
    }

    pub fn begin_object(&mut self) {
        self.open('{', false);
    }

    pub fn begin_inline_object(&mut self) {
        self.open('{', true);
    }

    pub fn end_object(&mut self) {
        self.close('}');
    }

    pub fn begin_array(&mut self) {
        self.open('[', false);
    }

    pub fn begin_inline_array(&mut self) {
        self.open('[', true);
    }

    pub fn end_array(&mut self) {
        self.close(']');
    }

    /// Writes `"key": `, preceded by a separator unless it is the first entry.
    ///
    /// Keys are written in the order given; nothing is sorted or deduplicated.
    pub fn write_key(&mut self, key: &str) {
        self.write_key_with(key, true);
    }

    pub fn write_key_with(&mut self, key: &str, line_break: bool) {
        self.process_comma(line_break);
        self.write_quoted_str(key);
        if self.pretty {
            self.buf.push_str(": ");
        } else {
            self.buf.push(':');
        }
    }

    /// Writes a JSON-escaped string surrounded by quotes.
    pub fn write_quoted_str(&mut self, s: &str) {
        let bytes = s.as_bytes();
        // Fast path: no escapes → write '"' + s + '"'.
        let has_escape = bytes
            .iter()
            .any(|&b| matches!(b, b'"' | b'\\') || b <= 0x1F);

        self.buf.reserve(s.len() + 2);
        self.buf.push('"');
        if !has_escape {
            self.buf.push_str(s);
            self.buf.push('"');
            return;
        }

        // Escape path: copy runs between special bytes. Every special byte is ASCII, so the run
        // boundaries always fall on char boundaries.
        let hex = b"0123456789ABCDEF";
        let mut run_start = 0usize;
        for (i, &b) in bytes.iter().enumerate() {
            let needs_escape = matches!(b, b'"' | b'\\') || b <= 0x1F;
            if !needs_escape {
                continue;
            }
            if run_start < i {
                self.buf.push_str(&s[run_start..i]);
            }
            match b {
                b'"' => self.buf.push_str("\\\""),
                b'\\' => self.buf.push_str("\\\\"),
                b'\n' => self.buf.push_str("\\n"),
                b'\r' => self.buf.push_str("\\r"),
                b'\t' => self.buf.push_str("\\t"),
                _ => {
                    self.buf.push_str("\\u00");
                    self.buf.push(hex[(b >> 4) as usize] as char);
                    self.buf.push(hex[(b & 0x0F) as usize] as char);
                }
            }
            run_start = i + 1;
        }
        if run_start < bytes.len() {
            self.buf.push_str(&s[run_start..]);
        }
        self.buf.push('"');
    }

    #[inline]
    pub fn write_i64(&mut self, n: i64) {
        let mut buf = itoa::Buffer::new();
        self.buf.push_str(buf.format(n));
    }

    #[inline]
    pub fn write_u64(&mut self, n: u64) {
        let mut buf = itoa::Buffer::new();
        self.buf.push_str(buf.format(n));
    }

    /// Shortest round-trippable form. Non-finite values have no JSON form and become `null`.
    pub fn write_f32(&mut self, n: f32) {
        if !n.is_finite() {
            warn!("Writing non-finite value {} as null", n);
            self.write_null();
            return;
        }
        let mut buf = ryu::Buffer::new();
        self.buf.push_str(buf.format_finite(n));
    }

    pub fn write_f64(&mut self, n: f64) {
        if !n.is_finite() {
            warn!("Writing non-finite value {} as null", n);
            self.write_null();
            return;
        }
        let mut buf = ryu::Buffer::new();
        self.buf.push_str(buf.format_finite(n));
    }

    #[inline]
    pub fn write_bool(&mut self, b: bool) {
        self.buf.push_str(if b { "true" } else { "false" });
    }

    #[inline]
    pub fn write_null(&mut self) {
        self.buf.push_str("null");
    }

    /// Writes `{ ... }` with `f` filling in the fields.
    pub fn object<F: FnOnce(&mut Self)>(&mut self, f: F) {
        self.begin_object();
        f(self);
        self.end_object();
    }

    pub fn inline_object<F: FnOnce(&mut Self)>(&mut self, f: F) {
        self.begin_inline_object();
        f(self);
        self.end_object();
    }

    pub fn key_object<F: FnOnce(&mut Self)>(&mut self, key: &str, f: F) {
        self.write_key(key);
        self.object(f);
    }

    pub fn key_array<F: FnOnce(&mut Self)>(&mut self, key: &str, f: F) {
        self.write_key(key);
        self.begin_array();
        f(self);
        self.end_array();
    }

    /// Writes an array element; the separator is handled here.
    pub fn write_element<V: JsonValue + ?Sized>(&mut self, value: &V) {
        self.process_comma(true);
        value.write_json_value(self);
    }

    pub fn write_key_val<V: JsonValue + ?Sized>(&mut self, key: &str, value: &V) {
        self.write_key(key);
        value.write_json_value(self);
    }

    /// Like [`JsonWriter::write_key_val`] for arrays, omitting the key entirely when `values`
    /// is empty and the writer is configured to skip empty arrays.
    pub fn write_key_array<V: JsonValue>(&mut self, key: &str, values: &[V]) {
        if values.is_empty() && self.skip_empty_arrays {
            return;
        }
        self.write_key_val(key, values);
    }

    /// Generic array writer over any iterator; `write_elem` writes one value.
    pub fn write_array<T, I, F>(&mut self, iter: I, mut write_elem: F)
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&mut Self, T),
    {
        self.begin_array();
        for elem in iter {
            self.process_comma(true);
            write_elem(self, elem);
        }
        self.end_array();
    }

    pub fn write_inline_array<T, I, F>(&mut self, iter: I, mut write_elem: F)
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&mut Self, T),
    {
        self.begin_inline_array();
        for elem in iter {
            self.process_comma(false);
            write_elem(self, elem);
        }
        self.end_array();
    }
}
