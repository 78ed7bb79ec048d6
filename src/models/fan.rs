//! Fan controller models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Desired fan state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanCommand {
    On,
    Off,
}

impl FanCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanCommand::On => "on",
            FanCommand::Off => "off",
        }
    }
}

impl fmt::Display for FanCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FanCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(FanCommand::On),
            "off" => Ok(FanCommand::Off),
            other => Err(format!("Invalid command: {}", other)),
        }
    }
}

/// Fan control request from the client
#[derive(Debug, Deserialize)]
pub struct FanControlRequest {
    #[serde(default)]
    pub command: Option<String>,
}

impl FanControlRequest {
    pub fn parse_command(&self) -> Result<FanCommand, String> {
        match self.command.as_deref() {
            Some(cmd) => cmd.parse(),
            None => Err("Invalid command".to_string()),
        }
    }
}

/// Payload sent to the fan controller's `/fan` endpoint
#[derive(Debug, Serialize)]
pub struct DeviceStateRequest {
    pub state: FanCommand,
}

/// Status response when the fan controller cannot be reached
#[derive(Debug, Serialize)]
pub struct DisconnectedStatus {
    pub status: &'static str,
    pub error: &'static str,
}

impl Default for DisconnectedStatus {
    fn default() -> Self {
        Self {
            status: "disconnected",
            error: "Could not reach fan controller.",
        }
    }
}
