//! Device configuration.
//!
//! Settings come from three places, highest priority first: command-line
//! flags (and their environment variables), the TOML file, built-in
//! defaults. Only the application name and the phrase have no default.
//!
//! ```toml
//! app_name = "sensor1"
//! mnemonic = "shadow market lounge ... sniff"
//! network = "testnet"
//! payment_amount = 1000
//! # receiver = "..."
//! # api_endpoint = "http://127.0.0.1:4001"
//! # api_token = "..."
//! fields = ["site:str=greenhouse-2", "fw:u16=3"]
//! ```

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use zeroize::Zeroizing;

use sensorpay_protocol::config::{Network, DEFAULT_PAYMENT_AMOUNT};

use crate::cli::{AccountArgs, FieldArg, SendArgs};

/// The configuration file, as written. Every key is optional.
#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub app_name: Option<String>,
    pub mnemonic: Option<String>,
    pub receiver: Option<String>,
    pub network: Option<String>,
    pub payment_amount: Option<u32>,
    pub api_endpoint: Option<String>,
    pub api_token: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl SettingsFile {
    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid device configuration")
    }

    /// Read and parse `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    /// The file named by `--config`, or an empty one.
    pub fn from_args(args: &AccountArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Everything `send` needs, after merging.
pub struct DeviceSettings {
    pub app_name: String,
    pub mnemonic: Zeroizing<String>,
    pub receiver: Option<String>,
    pub network: Network,
    pub payment_amount: u32,
    pub api_endpoint: Option<String>,
    pub api_token: Option<String>,
    pub fields: Vec<FieldArg>,
}

impl std::fmt::Debug for DeviceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSettings")
            .field("app_name", &self.app_name)
            .field("receiver", &self.receiver)
            .field("network", &self.network)
            .field("payment_amount", &self.payment_amount)
            .field("api_endpoint", &self.api_endpoint)
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}

/// The phrase from the flag/environment, else from the file.
pub fn resolve_mnemonic(file: &mut SettingsFile, args: &AccountArgs) -> Result<Zeroizing<String>> {
    args.mnemonic
        .clone()
        .or_else(|| file.mnemonic.take())
        .map(Zeroizing::new)
        .ok_or_else(|| anyhow!("no account phrase: set `mnemonic` in the config file or SENSORPAY_MNEMONIC"))
}

/// Merge the file with the `send` flags.
pub fn resolve(mut file: SettingsFile, args: &SendArgs) -> Result<DeviceSettings> {
    let mnemonic = resolve_mnemonic(&mut file, &args.account)?;

    let app_name = args
        .app_name
        .clone()
        .or(file.app_name)
        .ok_or_else(|| anyhow!("no application name: set `app_name` or pass --app-name"))?;

    let network = match (args.network, file.network.as_deref()) {
        (Some(network), _) => network,
        (None, Some(name)) => name.parse().context("invalid `network` in config file")?,
        (None, None) => Network::default(),
    };

    // File fields first, so a flag with the same label overwrites.
    let mut fields = file
        .fields
        .iter()
        .map(|raw| {
            raw.parse::<FieldArg>()
                .map_err(|e| anyhow!("invalid field {:?} in config file: {}", raw, e))
        })
        .collect::<Result<Vec<_>>>()?;
    fields.extend(args.fields.iter().cloned());

    Ok(DeviceSettings {
        app_name,
        mnemonic,
        receiver: args.receiver.clone().or(file.receiver),
        network,
        payment_amount: args
            .amount
            .or(file.payment_amount)
            .unwrap_or(DEFAULT_PAYMENT_AMOUNT),
        api_endpoint: args.api_endpoint.clone().or(file.api_endpoint),
        api_token: args.api_token.clone().or(file.api_token),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorpay_protocol::note::NoteValue;

    fn send_args() -> SendArgs {
        SendArgs {
            account: AccountArgs {
                config: None,
                mnemonic: None,
            },
            app_name: None,
            receiver: None,
            network: None,
            amount: None,
            api_endpoint: None,
            api_token: None,
            fields: Vec::new(),
        }
    }

    const FILE: &str = r#"
        app_name = "sensor1"
        mnemonic = "one two three"
        network = "mainnet"
        payment_amount = 2500
        fields = ["site:str=greenhouse-2", "fw:u16=3"]
    "#;

    #[test]
    fn file_values_apply() {
        let s = resolve(SettingsFile::parse(FILE).unwrap(), &send_args()).unwrap();
        assert_eq!(s.app_name, "sensor1");
        assert_eq!(s.mnemonic.as_str(), "one two three");
        assert_eq!(s.network, Network::Mainnet);
        assert_eq!(s.payment_amount, 2500);
        assert_eq!(s.fields.len(), 2);
        assert_eq!(s.fields[1].value, NoteValue::U16(3));
        assert!(s.receiver.is_none());
    }

    #[test]
    fn flags_override_file() {
        let mut args = send_args();
        args.app_name = Some("sensor9".into());
        args.network = Some(Network::Testnet);
        args.amount = Some(7);
        args.account.mnemonic = Some("from env".into());
        args.fields.push("fw:u16=4".parse().unwrap());

        let s = resolve(SettingsFile::parse(FILE).unwrap(), &args).unwrap();
        assert_eq!(s.app_name, "sensor9");
        assert_eq!(s.mnemonic.as_str(), "from env");
        assert_eq!(s.network, Network::Testnet);
        assert_eq!(s.payment_amount, 7);
        // Flag field comes last and wins when applied in order.
        assert_eq!(s.fields.last().unwrap().value, NoteValue::U16(4));
    }

    #[test]
    fn defaults_without_file() {
        let mut args = send_args();
        args.app_name = Some("sensor1".into());
        args.account.mnemonic = Some("words".into());
        let s = resolve(SettingsFile::default(), &args).unwrap();
        assert_eq!(s.network, Network::Testnet);
        assert_eq!(s.payment_amount, DEFAULT_PAYMENT_AMOUNT);
        assert!(s.fields.is_empty());
    }

    #[test]
    fn missing_required_values() {
        assert!(resolve(SettingsFile::default(), &send_args()).is_err());

        let mut args = send_args();
        args.account.mnemonic = Some("words".into());
        assert!(resolve(SettingsFile::default(), &args).is_err());
    }

    #[test]
    fn bad_file_contents() {
        assert!(SettingsFile::parse("unknown_key = 1").is_err());
        let file = SettingsFile::parse("network = \"devnet\"\nmnemonic = \"x\"\napp_name = \"a\"")
            .unwrap();
        assert!(resolve(file, &send_args()).is_err());
        let file = SettingsFile::parse("fields = [\"t:u99=1\"]\nmnemonic = \"x\"\napp_name = \"a\"")
            .unwrap();
        assert!(resolve(file, &send_args()).is_err());
    }

    #[test]
    fn debug_hides_the_phrase() {
        let s = resolve(SettingsFile::parse(FILE).unwrap(), &send_args()).unwrap();
        assert!(!format!("{:?}", s).contains("one two three"));
    }
}
