use crate::{
    app::App,
    echo::register_demo_routes,
    middleware::TracingMiddleware,
    runtime_config::{parse_stack_size, ServerOptions},
    server::{AppService, HttpServer},
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

/// Command-line interface for the consume demo server
#[derive(Parser, Debug)]
#[command(name = "consume")]
#[command(about = "Request dispatcher with ordered routing, middleware chains and payload validation", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the health and echo endpoints
    Serve {
        /// Listen address (overrides CONSUME_ADDR)
        #[arg(long)]
        addr: Option<String>,

        /// Install the secure-headers middleware
        #[arg(long, default_value_t = false)]
        secure_headers: bool,

        /// Log every matched request with its payload
        #[arg(long, default_value_t = false)]
        log_requests: bool,

        /// Coroutine stack size, decimal or 0x-prefixed hex (overrides CONSUME_STACK_SIZE)
        #[arg(long)]
        stack_size: Option<String>,
    },
    /// Print the registered endpoints in resolution order
    Routes,
}

/// Merge command-line flags over options loaded from the environment.
///
/// Flags can only switch features on; absent flags keep the environment value.
pub fn resolve_options(
    mut options: ServerOptions,
    addr: Option<&str>,
    secure_headers: bool,
    log_requests: bool,
    stack_size: Option<&str>,
) -> anyhow::Result<ServerOptions> {
    if let Some(addr) = addr {
        options.addr = addr.to_string();
    }
    options.use_secure_headers |= secure_headers;
    options.log_requests |= log_requests;
    if let Some(size) = stack_size {
        options.stack_size = parse_stack_size(size)?;
    }
    Ok(options)
}

fn demo_app(options: ServerOptions) -> App {
    let mut app = App::with_options(options);
    app.use_middleware(TracingMiddleware);
    register_demo_routes(&mut app);
    app
}

pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve {
            addr,
            secure_headers,
            log_requests,
            stack_size,
        } => {
            let options = resolve_options(
                ServerOptions::from_env().context("Invalid server configuration")?,
                addr.as_deref(),
                secure_headers,
                log_requests,
                stack_size.as_deref(),
            )?;
            may::config().set_stack_size(options.stack_size);
            info!(
                addr = %options.addr,
                stack_size = options.stack_size,
                secure_headers = options.use_secure_headers,
                log_requests = options.log_requests,
                "Starting server"
            );

            let addr = options.addr.clone();
            let dispatcher = demo_app(options)
                .build()
                .context("Failed to register endpoints")?;
            let handle = HttpServer(AppService::new(dispatcher))
                .start(addr.as_str())
                .with_context(|| format!("Failed to bind {addr}"))?;
            handle
                .join()
                .map_err(|e| anyhow::anyhow!("server coroutine panicked: {e:?}"))?;
            Ok(())
        }
        Commands::Routes => {
            let dispatcher = demo_app(ServerOptions::default())
                .build()
                .context("Failed to register endpoints")?;
            dispatcher.router().dump_routes();
            Ok(())
        }
    }
}
