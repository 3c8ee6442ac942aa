use clap::{Parser, Subcommand};
use dropout_predictor::config::Config;
use dropout_predictor::{server, EnrollmentForm, FallbackPolicy, PredictError, Predictor};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "dropout-predictor", version, about = "Student dropout prediction service")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serialized forest (overrides the config file)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Model column list, JSON or CSV (overrides the config file)
    #[arg(long, global = true)]
    columns: Option<PathBuf>,

    /// Which categorical attributes fall back to "Other"
    #[arg(long, global = true, value_enum)]
    fallback: Option<FallbackPolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the prediction API over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Predict a single enrollment form read from a JSON file
    Predict { input: PathBuf },
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(model) = &cli.model {
        config.model.forest = model.clone();
    }
    if let Some(columns) = &cli.columns {
        config.model.columns = columns.clone();
    }
    if let Some(fallback) = cli.fallback {
        config.normalize.fallback = fallback;
    }
    Ok(config)
}

#[actix_web::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // No request is accepted until both artifacts load and agree.
    let predictor = Predictor::load(&config.model, config.normalize.fallback)?;

    match cli.command {
        Command::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            server::start_api(predictor, &host, port).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Predict { input } => {
            let file = File::open(&input)?;
            let form: EnrollmentForm = serde_json::from_reader(BufReader::new(file))?;
            match predictor.predict(&form) {
                Ok(prediction) => {
                    println!("Prediction: {prediction}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(PredictError::Invalid(err)) => {
                    eprintln!("{err}");
                    Ok(ExitCode::from(2))
                }
                Err(err) => Err(err.into()),
            }
        }
    }
}
