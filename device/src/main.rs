// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # SensorPay Device
//!
//! Entry point for the `sensorpay-device` binary. Parses CLI arguments,
//! initializes logging, and runs one command to completion.
//!
//! The binary supports four subcommands:
//!
//! - `send`    : post one payment carrying telemetry, print its id
//! - `address` : print the configured account's address
//! - `keygen`  : create a new account
//! - `version` : print build version information
//!
//! Results go to stdout, logs to stderr.

mod cli;
mod logging;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;

use sensorpay_protocol::config::{
    MAX_NOTE_SIZE, MAX_SIGNED_TX_SIZE, SUBMIT_TRANSACTION_PATH, TRANSACTION_PARAMS_PATH,
    VALIDITY_WINDOW_ROUNDS,
};
use sensorpay_protocol::identity::recover_private_key_checked;
use sensorpay_protocol::{Account, ClientError, Ed25519Primitive, ReqwestHttpClient, TelemetryClient};

use cli::{AddressArgs, Commands, DeviceCli, SendArgs};
use settings::SettingsFile;

fn main() -> Result<()> {
    let cli = DeviceCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Send(args) => send(args),
        Commands::Address(args) => show_address(args),
        Commands::Keygen => keygen(),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Attach the error category, which is what a device maps to an LED code
/// or a retry decision.
fn classified(err: ClientError) -> anyhow::Error {
    let kind = err.kind();
    anyhow::Error::new(err).context(format!("{} error", kind))
}

/// Configures a client from the merged settings and submits once.
fn send(args: SendArgs) -> Result<()> {
    let file = SettingsFile::from_args(&args.account)?;
    let settings = settings::resolve(file, &args)?;
    tracing::debug!(?settings, "settings resolved");

    let http = ReqwestHttpClient::new().context("failed to build HTTP client")?;
    let mut client = TelemetryClient::new(&settings.app_name, &settings.mnemonic, http)
        .map_err(classified)
        .context("failed to set up the telemetry client")?;

    client.set_network(settings.network).map_err(classified)?;
    if let Some(url) = &settings.api_endpoint {
        client
            .set_api_endpoint(url)
            .map_err(classified)
            .context("invalid API endpoint")?;
    }
    if let Some(token) = &settings.api_token {
        client
            .set_api_token(token)
            .map_err(classified)
            .context("invalid API token")?;
    }
    if let Some(receiver) = &settings.receiver {
        client
            .set_destination_address(receiver)
            .map_err(classified)
            .context("invalid receiver address")?;
    }
    client
        .set_payment_amount(settings.payment_amount)
        .map_err(classified)?;

    for field in &settings.fields {
        client
            .add(&field.label, field.value.clone())
            .map_err(classified)
            .with_context(|| format!("cannot add field {:?}", field.label))?;
    }

    tracing::info!(
        from = %client.address(),
        network = %client.network(),
        endpoint = client.api_endpoint(),
        amount = client.payment_amount(),
        note_bytes = client.note().serialized_len(),
        "submitting payment"
    );

    let tx_id = match client.submit() {
        Ok(tx_id) => tx_id,
        Err(err) => {
            let context = match client.failed_stage() {
                Some(stage) if stage.crosses_network() => {
                    format!("submission failed at {} (talking to the node)", stage)
                }
                Some(stage) => format!("submission failed at {}", stage),
                None => "submission failed".to_string(),
            };
            return Err(classified(err).context(context));
        }
    };
    println!("{}", tx_id);
    Ok(())
}

/// Prints the configured account's address.
fn show_address(args: AddressArgs) -> Result<()> {
    let mut file = SettingsFile::from_args(&args.account)?;
    let phrase = settings::resolve_mnemonic(&mut file, &args.account)?;

    let account = if args.verify_checksum {
        let key = recover_private_key_checked(&phrase)
            .map_err(|e| classified(e.into()))
            .context("phrase failed verification")?;
        Account::from_private_key(key, &Ed25519Primitive)
    } else {
        Account::from_mnemonic(&phrase, &Ed25519Primitive)
            .map_err(|e| classified(e.into()))
            .context("invalid phrase")?
    };

    println!("{}", account.address());
    Ok(())
}

/// Creates a fresh account. The phrase is printed once and never stored.
fn keygen() -> Result<()> {
    let (account, phrase) = Account::generate(&Ed25519Primitive);
    let address = account.address();

    tracing::info!(address = %address, "generated new account");
    println!("address:  {}", address);
    println!("mnemonic: {}", phrase.as_str());
    eprintln!("Write the mnemonic down now. It is the only way to recover this account.");
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("sensorpay-device {}", env!("CARGO_PKG_VERSION"));
    println!("  params path:       {}", TRANSACTION_PARAMS_PATH);
    println!("  submit path:       {}", SUBMIT_TRANSACTION_PATH);
    println!("  validity window:   {} rounds", VALIDITY_WINDOW_ROUNDS);
    println!("  max note size:     {} bytes", MAX_NOTE_SIZE);
    println!("  max signed tx:     {} bytes", MAX_SIGNED_TX_SIZE);
}
