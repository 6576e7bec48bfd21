//! # CLI Interface
//!
//! Defines the command-line argument structure for `sensorpay-device`
//! using `clap` derive. Supports four subcommands: `send`, `address`,
//! `keygen`, and `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use sensorpay_protocol::config::Network;
use sensorpay_protocol::note::NoteValue;

use crate::logging::LogFormat;

/// SensorPay device client.
///
/// Turns sensor readings into signed ledger payments: every `send` posts
/// one payment whose note carries the readings as JSON.
#[derive(Parser, Debug)]
#[command(
    name = "sensorpay-device",
    about = "Sign and submit telemetry-carrying ledger payments",
    version,
    propagate_version = true
)]
pub struct DeviceCli {
    /// Log output format.
    #[arg(
        long,
        global = true,
        value_enum,
        env = "SENSORPAY_LOG_FORMAT",
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is not set.
    #[arg(
        long,
        global = true,
        env = "SENSORPAY_LOG",
        default_value = "sensorpay_device=info,sensorpay_protocol=info"
    )]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit one payment carrying the configured and given telemetry.
    Send(SendArgs),
    /// Print the address of the configured account.
    Address(AddressArgs),
    /// Generate a fresh account and print its phrase and address.
    Keygen,
    /// Print version information and protocol constants.
    Version,
}

/// Where the account comes from.
#[derive(Args, Debug)]
pub struct AccountArgs {
    /// Path to the device configuration file (TOML).
    #[arg(long, short = 'c', env = "SENSORPAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// 25-word account phrase. Prefer the config file or the environment
    /// over the command line, where it ends up in shell history.
    #[arg(long, env = "SENSORPAY_MNEMONIC", hide_env_values = true)]
    pub mnemonic: Option<String>,
}

/// Arguments for the `send` subcommand.
#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub account: AccountArgs,

    /// Application name written in the note preamble.
    #[arg(long, env = "SENSORPAY_APP_NAME")]
    pub app_name: Option<String>,

    /// Receiving address (58 characters). Defaults to the device itself.
    #[arg(long, env = "SENSORPAY_RECEIVER")]
    pub receiver: Option<String>,

    /// Network: testnet or mainnet.
    #[arg(long, env = "SENSORPAY_NETWORK")]
    pub network: Option<Network>,

    /// Payment amount in microunits.
    #[arg(long, env = "SENSORPAY_AMOUNT")]
    pub amount: Option<u32>,

    /// REST gateway base URL, overriding the network default.
    #[arg(long, env = "SENSORPAY_API_ENDPOINT")]
    pub api_endpoint: Option<String>,

    /// API token for gateways that require one.
    #[arg(long, env = "SENSORPAY_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Telemetry field, repeatable. Types: i8 u8 i16 u16 i32 u32 f32 str.
    #[arg(long = "field", short = 'f', value_name = "LABEL:TYPE=VALUE")]
    pub fields: Vec<FieldArg>,
}

/// Arguments for the `address` subcommand.
#[derive(Args, Debug)]
pub struct AddressArgs {
    #[command(flatten)]
    pub account: AccountArgs,

    /// Also verify the phrase's checksum word.
    #[arg(long)]
    pub verify_checksum: bool,
}

// ---------------------------------------------------------------------------
// Telemetry field syntax
// ---------------------------------------------------------------------------

/// One `LABEL:TYPE=VALUE` telemetry field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArg {
    pub label: String,
    pub value: NoteValue,
}

impl FromStr for FieldArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (spec, raw) = s
            .split_once('=')
            .ok_or_else(|| format!("expected LABEL:TYPE=VALUE, got {:?}", s))?;
        let (label, kind) = spec
            .rsplit_once(':')
            .ok_or_else(|| format!("missing :TYPE in {:?}", spec))?;
        if label.is_empty() {
            return Err("empty field label".into());
        }

        let bad = |e: &dyn std::fmt::Display| format!("bad {} value {:?}: {}", kind, raw, e);
        let value = match kind {
            "i8" => NoteValue::I8(raw.parse().map_err(|e| bad(&e))?),
            "u8" => NoteValue::U8(raw.parse().map_err(|e| bad(&e))?),
            "i16" => NoteValue::I16(raw.parse().map_err(|e| bad(&e))?),
            "u16" => NoteValue::U16(raw.parse().map_err(|e| bad(&e))?),
            "i32" => NoteValue::I32(raw.parse().map_err(|e| bad(&e))?),
            "u32" => NoteValue::U32(raw.parse().map_err(|e| bad(&e))?),
            "f32" => NoteValue::F32(raw.parse().map_err(|e| bad(&e))?),
            "str" => NoteValue::Text(raw.to_string()),
            other => {
                return Err(format!(
                    "unknown field type {:?}, expected one of i8 u8 i16 u16 i32 u32 f32 str",
                    other
                ))
            }
        };

        Ok(Self {
            label: label.to_string(),
            value,
        })
    }
}
