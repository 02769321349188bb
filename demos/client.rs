//! Example Sippar X402 client.
//!
//! Walks through the whole payment flow against the live service: marketplace
//! discovery, payment creation, a (locally stubbed) AI query with the service
//! token, and token verification. Stops at the first failing step.
//!
//! Run with:
//! ```bash
//! cargo run --example client
//! ```
//!
//! Environment variables (a `.env` file is honoured):
//! - X402_PRINCIPAL: principal of the paying entity
//! - X402_ALGORAND_ADDRESS: Algorand address backing the payment
//! - X402_BASE_URL: API base URL (default: production)
//! - X402_TIMEOUT_SECS: request timeout in seconds (default: 30)
//! - X402_API_KEY: enterprise API key
//! - RUST_LOG: log filter (default: info)

use serde_json::{json, Value};
use sippar_x402::types::{find_service, SUPPORTED_AI_MODELS};
use sippar_x402::utils::format_usd;
use sippar_x402::{ClientConfig, X402Client};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

const DEMO_PRINCIPAL: &str = "rdmx6-jaaaa-aaaah-qcaiq-cai";
const DEMO_ALGORAND_ADDRESS: &str = "6W47GCLXWEIEZ2LRQCXF7HGLOYSXYCXOPXJ5YE55EULFHB7O4RWIM3JDCI";
const DEMO_SERVICE: &str = "ai-oracle-enhanced";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🦀 Sippar X402 Rust Client Example");
    println!("===================================");

    let config = ClientConfig::new(DEMO_PRINCIPAL, DEMO_ALGORAND_ADDRESS).with_env_overrides()?;
    if let Err(e) = config.validate() {
        println!("⚠️  {}", e);
    }
    let client = X402Client::new(config)?;
    println!("   API: {}", client.base_url());

    // 1. Marketplace
    println!("\n📊 Fetching marketplace...");
    let marketplace = match client.get_marketplace().await {
        Ok(marketplace) => marketplace,
        Err(e) => {
            println!("❌ Error getting marketplace: {}", e);
            return Ok(());
        }
    };

    if let Some(total) = marketplace.total_services() {
        println!("Available services: {}", total);
    }

    // 2. Payment
    println!("\n💳 Creating payment for AI service...");
    let amount = find_service(DEMO_SERVICE)
        .map(|s| s.base_price)
        .unwrap_or(0.05);
    println!("   {} for {}", format_usd(amount), DEMO_SERVICE);

    let mut metadata: HashMap<String, Value> = HashMap::new();
    metadata.insert("client".to_string(), json!("rust"));
    metadata.insert("version".to_string(), json!("1.0"));

    let payment = match client.create_payment(DEMO_SERVICE, amount, Some(metadata)).await {
        Ok(payment) => payment,
        Err(e) => {
            println!("❌ Error creating payment: {}", e);
            return Ok(());
        }
    };

    println!("✅ Payment created: {}", payment.payment.transaction_id);
    println!("⚡ Processing time: {}", payment.performance.processing_time);
    if let Some(expires_at) = payment.payment.expires_at() {
        println!("⏳ Token expires: {}", expires_at.to_rfc3339());
    }

    // 3. AI query with the service token
    println!("\n🤖 Querying AI service...");
    let model = SUPPORTED_AI_MODELS.first().copied().unwrap_or("deepseek-r1");
    let ai_response = client.query_ai_service(
        "What are the benefits of blockchain technology?",
        model,
        &payment.payment.service_access_token,
    );

    if let Some(Value::String(response)) = ai_response.get("response") {
        println!("🔮 AI Response: {}", response);
    }

    // 4. Token verification
    println!("\n🔐 Verifying token...");
    let is_valid = match client
        .verify_token(&payment.payment.service_access_token)
        .await
    {
        Ok(valid) => valid,
        Err(e) => {
            println!("❌ Error verifying token: {}", e);
            return Ok(());
        }
    };

    println!("Token valid: {}", is_valid);
    println!("\n🎉 Rust X402 integration successful!");
    Ok(())
}
