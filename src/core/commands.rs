//! Slash command catalog.
//!
//! The gateway owns no game logic: every subcommand is proxied verbatim to
//! the engine. This table only describes what gets registered with Discord
//! and how each subcommand is acknowledged.

use crate::domain::model::ParamValue;
use crate::utils::error::{GatewayError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Integer,
    Boolean,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    /// Value sent to the engine when the user omits the option.
    pub default: Option<&'static str>,
}

impl OptionSpec {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubcommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub ephemeral: bool,
    pub options: &'static [OptionSpec],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandGroup {
    pub name: &'static str,
    pub description: &'static str,
    pub subcommands: &'static [SubcommandSpec],
}

pub const DEFAULT_CARTRIDGE: &str = "foster-protocol";

pub const CSCRATCH: CommandGroup = CommandGroup {
    name: "cscratch",
    description: "Manage cscratch games",
    subcommands: &[
        SubcommandSpec {
            name: "start",
            description: "Start a new game",
            ephemeral: false,
            options: &[OptionSpec {
                name: "cartridge",
                description: "Game cartridge to load",
                kind: OptionKind::String,
                default: Some(DEFAULT_CARTRIDGE),
            }],
        },
        SubcommandSpec {
            name: "end",
            description: "Clean up the current game",
            ephemeral: false,
            options: &[],
        },
        SubcommandSpec {
            name: "balance",
            description: "Check your scratch balance (Private)",
            ephemeral: true,
            options: &[],
        },
        SubcommandSpec {
            name: "guide",
            description: "Read a getting started guide",
            ephemeral: false,
            options: &[],
        },
        SubcommandSpec {
            name: "manual",
            description: "Read a manual covering all game mechanics",
            ephemeral: false,
            options: &[],
        },
    ],
};

/// A subcommand invocation with defaults filled in, ready to be proxied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCommand {
    pub name: String,
    pub ephemeral: bool,
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl CommandGroup {
    pub fn subcommand(&self, name: &str) -> Option<&SubcommandSpec> {
        self.subcommands.iter().find(|s| s.name == name)
    }

    pub fn resolve(
        &self,
        subcommand: &str,
        supplied: Vec<(String, ParamValue)>,
    ) -> Result<ResolvedCommand> {
        let spec = self
            .subcommand(subcommand)
            .ok_or_else(|| GatewayError::UnknownCommand {
                name: format!("{} {}", self.name, subcommand),
            })?;

        let mut params = serde_json::Map::new();
        for option in spec.options {
            if let Some(default) = option.default {
                params.insert(
                    option.name.to_string(),
                    serde_json::Value::String(default.to_string()),
                );
            }
        }
        for (name, value) in supplied {
            params.insert(name, value.to_json());
        }

        Ok(ResolvedCommand {
            name: spec.name.to_string(),
            ephemeral: spec.ephemeral,
            params,
        })
    }
}
