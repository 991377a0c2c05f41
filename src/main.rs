use std::sync::{Arc, Mutex};

use echowire::broker::Broker;
use echowire::config::load_config;
use echowire::persistence::file_store::FileStore;
use echowire::transport::websocket::start_websocket_server;
use echowire::utils::logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = load_config().expect("Failed to load configuration");
    logging::init(&config.log.level);

    // A corrupt log is fatal: starting empty would silently discard history.
    let store = FileStore::open(&config.store.path).expect("Failed to load message store");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let broker = Arc::new(Mutex::new(Broker::new(store)));
    start_websocket_server(&addr, broker).await;
}
