//! Shared helpers for command handlers.

use calypshome_api::{CalypshomeClient, Device, DeviceTarget};

use crate::error::CliError;

/// A device reference as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceRef {
    /// `<id>@<gateway>`: addressable without listing devices first.
    Direct(DeviceTarget),
    /// Numeric id or display name, resolved against the device list.
    Lookup(String),
}

impl DeviceRef {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if let Some((id, gw)) = input.split_once('@') {
            if let Ok(id) = id.parse::<i64>() {
                if !gw.is_empty() {
                    return Self::Direct(DeviceTarget::new(id, gw));
                }
            }
        }
        Self::Lookup(input.to_owned())
    }
}

/// Find a device by id or name, or fail with `NotFound`.
pub async fn lookup_device(client: &CalypshomeClient, query: &str) -> Result<Device, CliError> {
    client
        .find_device(query)
        .await?
        .ok_or_else(|| CliError::NotFound {
            identifier: query.into(),
        })
}

/// Resolve a command-line device reference to an action target.
///
/// The device is returned too when a lookup was needed.
pub async fn resolve_target(
    client: &CalypshomeClient,
    input: &str,
) -> Result<(DeviceTarget, Option<Device>), CliError> {
    match DeviceRef::parse(input) {
        DeviceRef::Direct(target) => Ok((target, None)),
        DeviceRef::Lookup(query) => {
            let device = lookup_device(client, &query).await?;
            Ok((device.target(), Some(device)))
        }
    }
}
