use anyhow::Result;
use chrono::Utc;
use washday_core::{AppError, Config};
use washday_weather::{HassClient, WashdayReport, WeatherBundle};

#[tokio::main]
async fn main() -> Result<()> {
    washday_core::init()?;

    let config = match Config::load_validated() {
        Ok((config, _)) => config,
        Err(e) => exit_with("Failed to load config", AppError::from_anyhow(e)),
    };

    let bundle = match fetch(&config).await {
        Ok(bundle) => bundle,
        Err(e) => exit_with("Failed to fetch weather", e),
    };

    tracing::info!(
        "Fetched {} hourly and {} daily entries",
        bundle.hourly.len(),
        bundle.daily.len()
    );

    let report = WashdayReport::build(&bundle, Utc::now(), &config);
    println!("{report}");

    Ok(())
}

async fn fetch(config: &Config) -> Result<WeatherBundle, AppError> {
    let client = HassClient::new(&config.home_assistant)?;
    tracing::info!("Using weather entity: {}", client.entity_id());
    Ok(client.fetch_bundle().await?)
}

fn exit_with(context: &str, error: AppError) -> ! {
    tracing::error!("{}: {}", context, error);
    eprintln!("{}", error.user_message());
    std::process::exit(1);
}
