//! HTML rendering.
//!
//! Templates live in `packages/server/templates/` and are embedded into the
//! binary, so a deployed server needs no template directory. `.html`
//! templates are autoescaped.

use minijinja::{AutoEscape, Environment, Value};
use rust_embed::RustEmbed;
use serde::Serialize;
use thiserror::Error;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct TemplateAssets;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Template environment shared by every view
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_loader(|name| {
            Ok(TemplateAssets::get(name)
                .and_then(|file| String::from_utf8(file.data.into_owned()).ok()))
        });
        env.set_auto_escape_callback(|name| {
            if name.ends_with(".html") {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        register_filters(&mut env);
        Self { env }
    }

    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, RenderError> {
        let template = self.env.get_template(name)?;
        Ok(template.render(Value::from_serialize(&context))?)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Filters used by the circuits templates.
pub fn register_filters(env: &mut Environment<'static>) {
    // kbps to a readable rate: 1544 -> "1.544 Mbps", 10000000 -> "10 Gbps"
    env.add_filter("speed", |value: Value| -> String {
        match value.as_i64() {
            Some(kbps) => humanize_speed(kbps),
            None => String::new(),
        }
    });

    // Value or an em placeholder for blank optional fields
    env.add_filter("placeholder", |value: Value| -> Value {
        if value.is_undefined() || value.is_none() || value.as_str() == Some("") {
            Value::from_safe_string("<span class=\"text-muted\">&mdash;</span>".to_string())
        } else {
            value
        }
    });
}

fn humanize_speed(kbps: i64) -> String {
    const UNITS: [(i64, &str); 3] = [(1_000_000_000, "Tbps"), (1_000_000, "Gbps"), (1_000, "Mbps")];
    for (divisor, unit) in UNITS {
        if kbps >= divisor {
            let value = kbps as f64 / divisor as f64;
            let text = format!("{:.3}", value);
            let text = text.trim_end_matches('0').trim_end_matches('.');
            return format!("{} {}", text, unit);
        }
    }
    format!("{} Kbps", kbps)
}
