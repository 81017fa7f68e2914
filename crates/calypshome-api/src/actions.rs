// Cover actions
//
// `POST /ihm` with a form body `gw`, `id`, `action`, `args`. The gateway
// sends no structured body back, so a 200 only means the request was
// accepted, not that the covering finished moving.

use std::fmt;
use std::str::FromStr;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::client::CalypshomeClient;
use crate::error::Error;
use crate::models::DeviceTarget;
use crate::transport::ApiRequest;

pub(crate) const IHM_PATH: &str = "/ihm";

/// Motion verbs understood by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverAction {
    Stop,
    Close,
    Open,
    Level,
    Tilt,
}

impl CoverAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stop => "STOP",
            Self::Close => "CLOSE",
            Self::Open => "OPEN",
            Self::Level => "LEVEL",
            Self::Tilt => "TILT",
        }
    }
}

impl fmt::Display for CoverAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoverAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STOP" => Ok(Self::Stop),
            "CLOSE" => Ok(Self::Close),
            "OPEN" => Ok(Self::Open),
            "LEVEL" => Ok(Self::Level),
            "TILT" => Ok(Self::Tilt),
            other => Err(Error::Validation {
                message: format!("unknown cover action '{other}'"),
            }),
        }
    }
}

/// A cover action together with its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverCommand {
    Stop,
    Open,
    Close,
    /// Target position, 0 to 100.
    Level(u8),
    /// Target tilt angle in degrees.
    Tilt(i32),
}

impl CoverCommand {
    pub fn action(self) -> CoverAction {
        match self {
            Self::Stop => CoverAction::Stop,
            Self::Open => CoverAction::Open,
            Self::Close => CoverAction::Close,
            Self::Level(_) => CoverAction::Level,
            Self::Tilt(_) => CoverAction::Tilt,
        }
    }

    /// The `args` form field, if the action takes one.
    pub fn args(self) -> Option<String> {
        match self {
            Self::Level(level) => Some(format!("level={level}")),
            Self::Tilt(angle) => Some(format!("angle={angle}")),
            Self::Stop | Self::Open | Self::Close => None,
        }
    }

    fn validate(self) -> Result<Self, Error> {
        match self {
            Self::Level(level) if level > 100 => Err(Error::Validation {
                message: format!("level must be between 0 and 100, got {level}"),
            }),
            other => Ok(other),
        }
    }
}

impl CalypshomeClient {
    /// Send a raw action to a device.
    ///
    /// Returns `true` when the gateway answers 200. Any other status is
    /// returned as `false` rather than an error.
    pub async fn send_action(
        &self,
        target: &DeviceTarget,
        action: CoverAction,
        args: Option<&str>,
    ) -> Result<bool, Error> {
        let request = ApiRequest::post(IHM_PATH).form(vec![
            ("gw", target.gateway_id.clone()),
            ("id", target.id.to_string()),
            ("action", action.as_str().to_owned()),
            ("args", args.unwrap_or_default().to_owned()),
        ]);

        let resp = self.call(&request).await?;
        let accepted = resp.status == StatusCode::OK;
        if accepted {
            debug!(id = target.id, gw = %target.gateway_id, %action, "action accepted");
        } else {
            warn!(
                id = target.id,
                gw = %target.gateway_id,
                %action,
                status = resp.status.as_u16(),
                "action not accepted"
            );
        }
        Ok(accepted)
    }

    /// Send a typed command, validating its argument first.
    pub async fn send_command(
        &self,
        target: &DeviceTarget,
        command: CoverCommand,
    ) -> Result<bool, Error> {
        let command = command.validate()?;
        let args = command.args();
        self.send_action(target, command.action(), args.as_deref())
            .await
    }

    pub async fn open(&self, target: &DeviceTarget) -> Result<bool, Error> {
        self.send_command(target, CoverCommand::Open).await
    }

    pub async fn close(&self, target: &DeviceTarget) -> Result<bool, Error> {
        self.send_command(target, CoverCommand::Close).await
    }

    pub async fn stop(&self, target: &DeviceTarget) -> Result<bool, Error> {
        self.send_command(target, CoverCommand::Stop).await
    }

    pub async fn set_level(&self, target: &DeviceTarget, level: u8) -> Result<bool, Error> {
        self.send_command(target, CoverCommand::Level(level)).await
    }

    pub async fn set_tilt(&self, target: &DeviceTarget, angle: i32) -> Result<bool, Error> {
        self.send_command(target, CoverCommand::Tilt(angle)).await
    }
}
