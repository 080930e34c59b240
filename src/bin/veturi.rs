use anyhow::Result;
use veturi::cli::{actions, actions::Action, start, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse arguments and set up logging/telemetry
    let (action, globals) = start()?;

    // Handle the action
    match action {
        Action::Server { .. } => actions::server::handle(action, &globals).await?,
    }

    telemetry::shutdown_tracer();

    Ok(())
}
