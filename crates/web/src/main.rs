use std::sync::Arc;

use overpass::OverpassClient;
use web::{init_logging, start_web_server, views::ViewRegistry, WebConfig, WebState};

#[tokio::main]
async fn main() {
    if let Err(why) = init_logging(WebConfig::http_trace_from_env()) {
        eprintln!("could not set up logging: {why}");
        std::process::exit(1);
    }
    let config = WebConfig::from_env();

    // road data
    let client = match OverpassClient::new(config.overpass.clone()) {
        Ok(client) => client,
        Err(why) => {
            log::error!("could not set up the road data client: {}", why);
            std::process::exit(1);
        }
    };
    log::info!(
        "Using road data from '{}', new views default to {}.",
        client.config.url,
        config.default_mode
    );

    // web server
    let state = WebState {
        views: ViewRegistry::new(Arc::new(client), config.snap_radius_m),
        default_mode: config.default_mode,
    };
    if let Err(why) = start_web_server(&config, state).await {
        log::error!("web server stopped: {}", why);
        std::process::exit(1);
    }
}
