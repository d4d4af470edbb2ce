use actix_files as fs;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::{info, warn};

use chess_server::config::ServerConfig;
use chess_server::models::AppState;
use chess_server::routes::configure_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::parse();
    let (host, port) = config.bind_address();
    info!("Starting chess server at http://{}:{}", host, port);

    let serve_static = config.static_dir.is_dir();
    if serve_static {
        info!("Serving client files from {}", config.static_dir.display());
    } else {
        warn!(
            "Static directory {} not found; serving the API only",
            config.static_dir.display()
        );
    }

    let app_state = web::Data::new(AppState::in_memory());
    let static_dir = config.static_dir.clone();

    HttpServer::new(move || {
        let app = App::new()
            .app_data(app_state.clone())
            .configure(configure_routes);
        if serve_static {
            app.service(fs::Files::new("/", static_dir.clone()).index_file("index.html"))
        } else {
            app
        }
    })
    .bind((host, port))?
    .run()
    .await
}
