//! Cover command handlers: open, close, stop, level, tilt.

use serde::Serialize;

use calypshome_api::{CalypshomeClient, CoverCommand as ApiCommand, DeviceTarget};

use crate::cli::{CoverArgs, CoverCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct ActionReport {
    id: i64,
    gw: String,
    name: Option<String>,
    action: &'static str,
    args: Option<String>,
    accepted: bool,
}

fn split(cmd: CoverCommand) -> (String, ApiCommand) {
    match cmd {
        CoverCommand::Open { device } => (device, ApiCommand::Open),
        CoverCommand::Close { device } => (device, ApiCommand::Close),
        CoverCommand::Stop { device } => (device, ApiCommand::Stop),
        CoverCommand::Level { device, level } => (device, ApiCommand::Level(level)),
        CoverCommand::Tilt { device, angle } => (device, ApiCommand::Tilt(angle)),
    }
}

fn describe(target: &DeviceTarget, name: Option<&str>) -> String {
    name.map_or_else(
        || format!("{}@{}", target.id, target.gateway_id),
        ToOwned::to_owned,
    )
}

pub async fn handle(
    client: &CalypshomeClient,
    args: CoverArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (input, command) = split(args.command);
    let (target, device) = util::resolve_target(client, &input).await?;
    let name = device.as_ref().and_then(|d| d.name()).map(ToOwned::to_owned);

    if let (ApiCommand::Tilt(_), Some(device)) = (command, device.as_ref()) {
        if !device.supports_tilt() {
            return Err(CliError::Validation {
                field: "device".into(),
                reason: format!(
                    "'{}' does not report a tilt angle",
                    describe(&target, name.as_deref())
                ),
            });
        }
    }

    let accepted = client.send_command(&target, command).await?;
    if !accepted {
        return Err(CliError::ActionRejected {
            action: command.action().to_string(),
            device: describe(&target, name.as_deref()),
        });
    }

    let report = ActionReport {
        id: target.id,
        gw: target.gateway_id.clone(),
        name,
        action: command.action().as_str(),
        args: command.args(),
        accepted,
    };
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            let who = r.name.clone().unwrap_or_else(|| format!("{}@{}", r.id, r.gw));
            match r.args {
                Some(ref args) => format!("{} {who} ({args})", r.action),
                None => format!("{} {who}", r.action),
            }
        },
        |r| r.action.to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
