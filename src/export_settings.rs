use std::fmt;

/// Knobs for a single export. Built by value, like:
///
/// ```
/// # use scene_snapshot::ExportSettings;
/// let settings = ExportSettings::new().indent(false).reserve_capacity(1 << 20);
/// assert!(!settings.should_indent());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    /// Pretty (line broken, indented) or compact output.
    indent: bool,
    indent_str: String,
    /// Omit per-kind component arrays that have no entries.
    skip_empty_components: bool,
    /// Initial capacity of the output buffer, in bytes.
    reserve_capacity: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            indent: true,
            indent_str: "\t".to_owned(),
            skip_empty_components: true,
            reserve_capacity: 64 * 1024,
        }
    }
}

impl ExportSettings {
    pub fn new() -> Self {
        ExportSettings::default()
    }

    pub fn indent(mut self, pretty: bool) -> Self {
        self.indent = pretty;
        self
    }

    pub fn indent_str(mut self, indent_str: &str) -> Self {
        self.indent_str = indent_str.to_owned();
        self
    }

    pub fn skip_empty_components(mut self, skip: bool) -> Self {
        self.skip_empty_components = skip;
        self
    }

    pub fn reserve_capacity(mut self, bytes: usize) -> Self {
        self.reserve_capacity = bytes;
        self
    }

    pub fn should_indent(&self) -> bool {
        self.indent
    }

    pub fn get_indent_str(&self) -> &str {
        &self.indent_str
    }

    pub fn should_skip_empty_components(&self) -> bool {
        self.skip_empty_components
    }

    pub fn get_reserve_capacity(&self) -> usize {
        self.reserve_capacity
    }
}

/// What an export was started from. Decides the suggested output file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportType {
    CurrentObject,
    SelectedObjects,
    CurrentScene,
}

impl ExportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportType::CurrentObject => "current object",
            ExportType::SelectedObjects => "selected objects",
            ExportType::CurrentScene => "current scene",
        }
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggested file name (without directory) for an export.
///
/// Object exports are named after the first object, scene exports after the scene. Whenever
/// that name is empty `fallback` (usually the project name) is used instead.
pub fn default_file_name(
    export_type: ExportType,
    first_object: Option<&str>,
    scene_name: &str,
    fallback: &str,
) -> String {
    let base = match export_type {
        ExportType::CurrentObject | ExportType::SelectedObjects => first_object.unwrap_or_default(),
        ExportType::CurrentScene => scene_name,
    };
    let base = if base.trim().is_empty() { fallback } else { base };
    format!("{}.json", base)
}

/// Free-form messages collected during an export, meant for display to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportLog {
    messages: Vec<String>,
}

impl ExportLog {
    pub fn new() -> Self {
        ExportLog::default()
    }

    pub fn log_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn get_text(&self) -> String {
        self.messages.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_defaults() {
        let settings = ExportSettings::new();
        assert!(settings.should_indent());
        assert_eq!(settings.get_indent_str(), "\t");
        assert!(settings.should_skip_empty_components());

        let settings = settings.indent_str("  ").skip_empty_components(false);
        assert_eq!(settings.get_indent_str(), "  ");
        assert!(!settings.should_skip_empty_components());
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(
            default_file_name(ExportType::CurrentObject, Some("Tank"), "Level", "Project"),
            "Tank.json"
        );
        assert_eq!(
            default_file_name(ExportType::CurrentScene, Some("Tank"), "Level", "Project"),
            "Level.json"
        );
        assert_eq!(
            default_file_name(ExportType::SelectedObjects, None, "Level", "Project"),
            "Project.json"
        );
        assert_eq!(
            default_file_name(ExportType::CurrentScene, None, "", "Project"),
            "Project.json"
        );
    }

    #[test]
    fn test_log_collects_messages_in_order() {
        let mut log = ExportLog::new();
        log.log_message("first");
        log.log_message(String::from("second"));
        assert_eq!(log.get_text(), "first\nsecond");
        log.clear();
        assert!(log.is_empty());
    }
}
