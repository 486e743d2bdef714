//! Template loading and management

use restmeta_common::{GeneratorError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Load the markdown description templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("escape_pipe", escape_pipe_filter);

    tera.add_raw_template(
        "parameters.md",
        include_str!("../templates/parameters.md.tera"),
    )
    .map_err(|e| {
        GeneratorError::Template(format!("Failed to load parameters.md template: {}", e))
    })?;

    tera.add_raw_template("model.md", include_str!("../templates/model.md.tera"))
        .map_err(|e| {
            GeneratorError::Template(format!("Failed to load model.md template: {}", e))
        })?;

    Ok(tera)
}

/// Make text safe inside a markdown table cell
pub fn escape_pipe(text: &str) -> String {
    text.replace('|', "\\|").replace("\r\n", "<br/>").replace('\n', "<br/>")
}

/// Filter form of [`escape_pipe`]
fn escape_pipe_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("escape_pipe filter expects a string"))?;

    Ok(Value::String(escape_pipe(text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_templates() {
        let tera = load_templates().unwrap();
        let names: Vec<&str> = tera.get_template_names().collect();
        assert!(names.contains(&"parameters.md"));
        assert!(names.contains(&"model.md"));
    }

    #[test]
    fn test_escape_pipe() {
        assert_eq!(escape_pipe("A | B"), "A \\| B");
        assert_eq!(escape_pipe("line one\nline two"), "line one<br/>line two");
        assert_eq!(escape_pipe("plain"), "plain");
    }

    #[test]
    fn test_escape_pipe_filter_rejects_non_strings() {
        let result = escape_pipe_filter(&Value::from(3), &HashMap::new());
        assert!(result.is_err());
    }
}
