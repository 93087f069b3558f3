//! Procura CLI — serve the gateway or bootstrap the admin account.

use clap::{Parser, Subcommand};
use procura_core::ProcuraConfig;
use procura_store::PortalDb;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "procura", version, about = "Vendor/tender e-procurement portal backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway.
    Serve {
        /// Override the configured listen port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create the administrator account. Admins are never created via the
    /// public API.
    CreateAdmin {
        #[arg(long, default_value = "Admin")]
        name: String,
        #[arg(long, default_value = "admin@eprocurement.com")]
        email: String,
        #[arg(long, default_value = "admin123")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("procura=info,tower_http=info")),
        )
        .init();

    let mut config = ProcuraConfig::load();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            procura_gateway::start(&config).await
        }
        Command::CreateAdmin {
            name,
            email,
            password,
        } => {
            if let Some(parent) = config.storage.db_path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            let db = PortalDb::open(&config.storage.db_path)?;

            if db.admin_by_email(&email)?.is_some() {
                println!("Admin already exists!");
                return Ok(());
            }

            let hash = procura_gateway::auth::hash_password(&password)?;
            db.create_admin(&name, &email, &hash)?;

            println!("Admin created successfully!");
            println!("Email: {email}");
            println!("Password: {password}");
            println!("Please change the password after first login!");
            Ok(())
        }
    }
}
