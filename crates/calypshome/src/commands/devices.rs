//! Device command handlers.

use tabled::Tabled;

use calypshome_api::{CalypshomeClient, Device};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Tilt")]
    tilt: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
}

impl DeviceRow {
    fn new(d: &Device, color: bool) -> Self {
        Self {
            id: d.id,
            name: d.name().unwrap_or("-").to_owned(),
            gateway: d.gateway_id.clone(),
            position: d.position().map_or_else(|| "-".into(), |p| format!("{p}%")),
            tilt: d.tilt_angle().map_or_else(
                || if d.supports_tilt() { "?".into() } else { "-".into() },
                |a| format!("{a}°"),
            ),
            status: status_cell(d, color),
            manufacturer: d.manufacturer().unwrap_or("-").to_owned(),
        }
    }
}

fn status_cell(d: &Device, color: bool) -> String {
    if let Some(alert) = d.alert_message() {
        return output::paint_status(alert, Some(false), color);
    }
    match (d.is_present(), d.motion_status()) {
        (Some(false), _) => output::paint_status("absent", Some(false), color),
        (_, Some(motion)) => output::paint_status(&motion.to_string(), Some(true), color),
        (Some(true), None) => output::paint_status("idle", Some(true), color),
        (None, None) => output::paint_status("-", None, color),
    }
}

fn detail(d: &Device) -> String {
    let mut lines = vec![
        format!("ID:           {}", d.id),
        format!("Gateway:      {}", d.gateway_id),
        format!("Name:         {}", d.name().unwrap_or("-")),
        format!("Manufacturer: {}", d.manufacturer().unwrap_or("-")),
        format!("Product:      {}", d.product_name().unwrap_or("-")),
        format!(
            "Position:     {}",
            d.position().map_or_else(|| "-".into(), |p| format!("{p}%"))
        ),
    ];
    if d.supports_tilt() {
        lines.push(format!(
            "Tilt:         {}",
            d.tilt_angle().map_or_else(|| "?".into(), |a| format!("{a}°"))
        ));
    }
    if let Some(motion) = d.motion_status() {
        lines.push(format!("Motion:       {motion}"));
    }
    if let Some(alert) = d.alert_message() {
        lines.push(format!("Alert:        {alert}"));
    }

    lines.push(String::new());
    lines.push("Attributes:".into());
    let width = d.attributes.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in &d.attributes {
        lines.push(format!("  {key:<width$}  {value}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &CalypshomeClient,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        DevicesCommand::List => {
            let devices = client.list_devices().await?;
            tracing::info!(count = devices.len(), "listed devices");
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::new(d, color),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let device = util::lookup_device(client, &device).await?;
            let out = output::render_single(&global.output, &device, detail, |d| {
                d.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
