//! `armory` command-line front end for the regional game-data API
//!
//! Thin wrapper that parses arguments, initializes logging, builds a
//! [`RegionalApiClient`] and prints the result of one operation.

use anyhow::{Context, Result, bail};
use armory_client::{ClientConfig, IconOptions, RegionalApiClient};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "armory",
    about = "Query the regional World of Warcraft game-data API",
    version
)]
struct Cli {
    /// Region code to use instead of the first region in the region file
    #[arg(short, long, env = "ARMORY_REGION", global = true)]
    region: Option<String>,

    /// Credentials file
    #[arg(long, env = "ARMORY_CONFIG_FILE", global = true)]
    config_file: Option<PathBuf>,

    /// Region data file
    #[arg(long, env = "ARMORY_REGIONS_FILE", global = true)]
    regions_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List known regions
    Regions,

    /// List realms of the selected region
    Realms {
        /// Fetch the realm list from the API and rewrite the region file
        #[arg(long)]
        refresh: bool,
    },

    /// Show a character profile
    Character {
        /// Character name
        name: String,
        /// Realm slug
        realm: String,
    },

    /// Show spell data
    Spell {
        /// Numeric spell id
        id: u64,
    },

    /// Print the local path of an icon
    Icon {
        /// Icon name, e.g. `inv_sword_04`
        id: String,

        /// Icon edge length in pixels
        #[arg(long, default_value_t = armory_client::DEFAULT_ICON_SIZE)]
        size: u32,

        /// Download the icon when it is not on disk
        #[arg(long)]
        download: bool,

        /// Icon root directory
        #[arg(long, env = "ARMORY_ICONS_DIR")]
        dir: Option<PathBuf>,
    },
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(path) = &self.config_file {
            config.config_file.clone_from(path);
        }
        if let Some(path) = &self.regions_file {
            config.regions_file.clone_from(path);
        }
        config
    }

    fn default_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn init_tracing(default: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.client_config();
    debug!(
        "Using config file {} and region file {}",
        config.config_file.display(),
        config.regions_file.display()
    );
    let mut client = RegionalApiClient::new(config)
        .await
        .context("failed to initialize client")?;

    if let Some(region) = &cli.region {
        if !client.is_valid_region(region) {
            bail!("unknown region: {region}");
        }
        client.select_region(region);
    }
    debug!("Selected region {}", client.selected_region());

    match cli.command {
        Command::Regions => {
            for (id, info) in client.regions().iter() {
                println!("{id}\t{}", info.name);
            }
        }
        Command::Realms { refresh } => {
            let realms = client.realms(refresh).await?;
            print_json(realms)?;
        }
        Command::Character { name, realm } => {
            if !RegionalApiClient::is_valid_character_name(&name) {
                bail!("invalid character name: {name}");
            }
            if !client.is_valid_realm(&realm) {
                bail!(
                    "unknown realm {realm} in region {}",
                    client.selected_region()
                );
            }
            let profile = client.character(&name, &realm).await?;
            print_json(&profile)?;
        }
        Command::Spell { id } => {
            let spell = client.spell(id).await?;
            print_json(&spell)?;
        }
        Command::Icon {
            id,
            size,
            download,
            dir,
        } => {
            debug!("Looking up icon {id} ({size}px, download: {download})");
            let mut options = IconOptions::default()
                .with_size(size)
                .with_download(download);
            if let Some(dir) = dir {
                options = options.with_dir(dir);
            }
            match client.icon_image_path(&id, &options).await? {
                Some(path) => println!("{}", path.display()),
                None => bail!("icon {id} is not cached, pass --download to fetch it"),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.default_filter());
    run(cli).await
}
