//! Binary to log in to a Looker instance with `LOOKERSDK_*` credentials,
//! print the current user and session, and log out again.
//!
//! # Usage
//!
//! ```sh
//! export LOOKERSDK_BASE_URL="https://example.looker.com:19999"
//! export LOOKERSDK_CLIENT_ID="your-client-id"
//! export LOOKERSDK_CLIENT_SECRET="your-client-secret"
//! cargo run --bin looker_check --features cli
//! ```

use looker_rs::types::session::ApiSession;
use looker_rs::types::user::User;
use looker_rs::{Json, LookerClient};

#[tokio::main]
async fn main() -> looker_rs::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let client = LookerClient::from_env()?;
    println!("Connecting to {}…", client.api_root());

    let Json(me): Json<User> = client.me(Some("id,display_name,email"), None).await?;
    println!(
        "Logged in as {} <{}> (id {})",
        me.display_name.as_deref().unwrap_or("?"),
        me.email.as_deref().unwrap_or("?"),
        me.id.as_deref().unwrap_or("?"),
    );

    let Json(session): Json<ApiSession> = client.session(None).await?;
    println!(
        "Workspace: {}",
        session.workspace_id.as_deref().unwrap_or("production")
    );

    if client.logout().await? {
        println!("Logged out.");
    }
    Ok(())
}
