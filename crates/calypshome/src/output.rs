//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Green for good, red for bad, dim for unknown.
pub fn paint_status(text: &str, healthy: Option<bool>, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    match healthy {
        Some(true) => text.green().to_string(),
        Some(false) => text.red().to_string(),
        None => text.dimmed().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views are key/value
/// listings rather than `Tabled` rows.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => id_fn(data),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        id: i64,
        name: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: 1,
                name: "Kitchen".into(),
            },
            Row {
                id: 2,
                name: "Bedroom".into(),
            },
        ]
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let out = render_list(
            &OutputFormat::Plain,
            &rows(),
            |r| Row {
                id: r.id,
                name: r.name.clone(),
            },
            |r| r.id.to_string(),
        )
        .unwrap();
        assert_eq!(out, "1\n2");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_list(
            &OutputFormat::JsonCompact,
            &rows(),
            |r| Row {
                id: r.id,
                name: r.name.clone(),
            },
            |r| r.id.to_string(),
        )
        .unwrap();
        assert_eq!(out, r#"[{"id":1,"name":"Kitchen"},{"id":2,"name":"Bedroom"}]"#);
    }

    #[test]
    fn table_has_headers() {
        let out = render_list(
            &OutputFormat::Table,
            &rows(),
            |r| Row {
                id: r.id,
                name: r.name.clone(),
            },
            |r| r.id.to_string(),
        )
        .unwrap();
        assert!(out.contains("name"));
        assert!(out.contains("Bedroom"));
    }

    #[test]
    fn uncolored_status_is_untouched() {
        assert_eq!(paint_status("up", Some(true), false), "up");
        assert_ne!(paint_status("up", Some(true), true), "up");
    }
}
