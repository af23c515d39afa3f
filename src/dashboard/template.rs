//! Placeholder templating and stylesheet output.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::logging::{info, obj, v_str, warn, Domain};

pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/dashboard_template.html");
pub const DEFAULT_STYLESHEET: &str = include_str!("../../static/styles.css");

/// Replaces every `{{key}}` with its value.
///
/// Values are inserted verbatim with no HTML escaping. Everything routed
/// through here is produced by this pipeline and treated as trusted.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{{{}}}}}", key), value);
    }
    out
}

/// `{{name}}` tokens still present in `doc`.
pub fn unresolved_placeholders(doc: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = doc;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty()
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    found.push(name.to_string());
                }
                rest = &after[end + 2..];
            }
            None => break,
        }
    }
    found
}

/// The template at `path` when it exists, otherwise the built-in one.
pub fn load_template(path: &Path) -> Result<String> {
    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read template {}", path.display()))?;
        info(
            Domain::Dashboard,
            "template",
            obj(&[("source", v_str(&path.display().to_string()))]),
        );
        Ok(raw)
    } else {
        info(Domain::Dashboard, "template", obj(&[("source", v_str("builtin"))]));
        Ok(DEFAULT_TEMPLATE.to_string())
    }
}

/// Copies `static_css` to `out` when present, otherwise writes the built-in
/// stylesheet. Returns true when the override was used.
pub fn write_stylesheet(static_css: &Path, out: &Path) -> Result<bool> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    if static_css.exists() {
        fs::copy(static_css, out).with_context(|| {
            format!("failed to copy {} to {}", static_css.display(), out.display())
        })?;
        info(
            Domain::Dashboard,
            "stylesheet_copied",
            obj(&[
                ("from", v_str(&static_css.display().to_string())),
                ("to", v_str(&out.display().to_string())),
            ]),
        );
        Ok(true)
    } else {
        warn(
            Domain::Dashboard,
            "stylesheet_builtin",
            obj(&[
                ("missing", v_str(&static_css.display().to_string())),
                ("to", v_str(&out.display().to_string())),
            ]),
        );
        fs::write(out, DEFAULT_STYLESHEET)
            .with_context(|| format!("failed to write {}", out.display()))?;
        Ok(false)
    }
}
