//! Basic authentication example.
//!
//! Logs in (or reuses tokens saved by a previous run), prints the session
//! state and fetches the trending feed.
//!
//! Run with: cargo run --example basic_auth

use axiomtrade_rs::auth::FileCredentialStore;
use axiomtrade_rs::{AxiomClient, ClientConfig, TimePeriod};

#[tokio::main]
async fn main() -> axiomtrade_rs::Result<()> {
    axiomtrade_rs::logging::init("axiomtrade_rs=info");

    let email = std::env::var("AXIOM_EMAIL").ok();
    let password = std::env::var("AXIOM_PASSWORD").ok();
    let credentials = email.zip(password);

    let store = FileCredentialStore::default_location()?;
    println!("Token store: {}", store.path().display());

    let client = AxiomClient::from_store(store, credentials, ClientConfig::default())?;

    if !client.ensure_authenticated().await {
        eprintln!("No saved tokens and no AXIOM_EMAIL/AXIOM_PASSWORD set");
        return Ok(());
    }

    println!("Session state: {:?}", client.session().status().await);
    let info = client.session().token_info().await;
    if let Some(preview) = &info.access_token_preview {
        println!("Access token: {}", preview);
    }
    println!("Expires in {}s", info.time_until_expiry);

    let trending = client.trending().get(TimePeriod::OneHour).await?;
    let count = trending.as_array().map(Vec::len).unwrap_or(0);
    println!("\nTrending tokens (1h): {}", count);

    println!("\nDone!");
    Ok(())
}
