use anyhow::Result;
use clap::{Parser, Subcommand};
use ghibli_converter::convert::{Converter, DEFAULT_DOWNLOAD_NAME};
use ghibli_converter::models::Config;
use ghibli_converter::server;
use ghibli_converter::session::{ConversionEvent, ConversionState, Session};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "ghibli-converter")]
#[command(about = "Restyle images through a multimodal chat-completion API")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP proxy.
    Serve {
        /// Listen address, overrides BIND_ADDR.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Convert one image and print the result URL.
    Convert {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Also download the result.
        #[arg(long)]
        download: bool,

        /// Download destination.
        #[arg(long, short, value_name = "FILE", default_value = DEFAULT_DOWNLOAD_NAME)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ghibli_converter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    match args.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Err(e) = server::serve(config).await {
                error!("Server failed: {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Convert {
            image,
            download,
            output,
        } => {
            let converter = match Converter::from_config(&config) {
                Ok(converter) => converter,
                Err(e) => {
                    error!("Failed to initialize converter: {}", e);
                    std::process::exit(1);
                }
            };

            let mut session = Session::new();
            session.dispatch(ConversionEvent::FileSelected(image));

            match session.run(&converter).await.clone() {
                ConversionState::Succeeded { url } => {
                    println!("{}", url);
                    if download {
                        let bytes = converter.download(&url, &output).await?;
                        info!("Saved {} bytes to {}", bytes, output.display());
                    }
                    Ok(())
                }
                ConversionState::Failed { error } => {
                    error!("Conversion failed: {}", error);
                    std::process::exit(1);
                }
                other => {
                    error!("Conversion ended in unexpected state {:?}", other);
                    std::process::exit(1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_convert_args() {
        let args = CliArgs::try_parse_from(["ghibli-converter", "convert", "cat.jpg", "--download"])
            .unwrap();
        match args.command {
            Command::Convert {
                image,
                download,
                output,
            } => {
                assert_eq!(image, PathBuf::from("cat.jpg"));
                assert!(download);
                assert_eq!(output, PathBuf::from(DEFAULT_DOWNLOAD_NAME));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_bind_override() {
        let args =
            CliArgs::try_parse_from(["ghibli-converter", "serve", "--bind", "127.0.0.1:8080"])
                .unwrap();
        assert!(matches!(
            args.command,
            Command::Serve { bind: Some(ref b) } if b == "127.0.0.1:8080"
        ));
    }
}
