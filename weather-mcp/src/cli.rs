use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use weather_mcp_core::{Config, Toolbox, validate::validate_api_key};

use crate::server::{self, WeatherServer};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-mcp", version, about = "Weather and location tools for AI assistants")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the tools to an MCP client over stdio.
    Serve,

    /// Store a WeatherAPI.com key in the config file.
    Configure {
        /// Key to store; prompted for when omitted.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Invoke a single tool and print its result.
    Call {
        /// Tool name, e.g. "get_weather_by_city".
        tool: String,

        /// Tool arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// List the available tools.
    Tools,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve => {
                let config = Config::resolve()?;
                // Refuse to start without a credential rather than failing on every call.
                config.require_api_key().context(
                    "Hint: set WEATHERAPI_KEY or run `weather-mcp configure` first.",
                )?;

                let toolbox = Toolbox::from_config(&config)?;
                tracing::info!(tools = WeatherServer::tools().len(), "serving weather tools on stdio");
                server::serve_stdio(toolbox).await?;
                tracing::info!("stdin closed, shutting down");
            }
            Command::Configure { api_key } => {
                let api_key = match api_key {
                    Some(key) => key,
                    None => Password::new("WeatherAPI.com API key:")
                        .with_display_mode(PasswordDisplayMode::Masked)
                        .without_confirmation()
                        .prompt()
                        .context("Failed to read API key")?,
                };
                let api_key = validate_api_key(Some(api_key.as_str()))?.to_string();

                let mut config = Config::load()?;
                config.set_api_key(api_key);
                let path = config.save()?;
                println!("Saved WeatherAPI.com key to {}", path.display());
            }
            Command::Call { tool, args } => {
                let arguments: serde_json::Value =
                    serde_json::from_str(&args).context("--args must be a JSON object")?;

                let config = Config::resolve()?;
                let toolbox = Toolbox::from_config(&config)?;
                let outcome = toolbox.call(&tool, arguments).await;

                if outcome.is_error {
                    return Err(anyhow!(outcome.text));
                }
                println!("{}", outcome.text);
            }
            Command::Tools => {
                for tool in WeatherServer::tools() {
                    println!("{:<38} {}", tool.name, tool.description.unwrap_or_default());
                }
            }
        }

        Ok(())
    }
}
