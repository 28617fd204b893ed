use anyhow::Context;
use clap::{Parser, Subcommand};
use library_kernel::settings::{Settings, StoreBackend};

/// Library service command line
#[derive(Parser)]
#[command(name = "library-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations, then serve HTTP until shutdown
    Serve {
        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending migrations and exit
    Migrate,
    /// Print the merged OpenAPI document
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().context("failed to load library settings")?;
    library_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            library_app::run(settings).await
        }
        Commands::Migrate => {
            let app = library_app::assemble(&settings).await?;
            let applied = app.migrate().await?;
            app.registry.stop_all().await?;
            println!("applied {applied} migrations");
            Ok(())
        }
        Commands::Openapi => {
            // The document only depends on registered modules, not on data.
            settings.database.backend = StoreBackend::Memory;
            let app = library_app::assemble(&settings).await?;
            let document = library_http::router::openapi_document(&app.registry);
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
    }
}
