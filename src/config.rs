use clap::Parser;
use std::path::PathBuf;

/// Command-line options for the chess server.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct ServerConfig {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,
    /// Directory of browser client files, served when it exists
    #[arg(short, long, default_value = "./web")]
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
