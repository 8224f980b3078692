//! Test Claim Producer
//!
//! Generates and publishes claim requests to NATS for pipeline testing.
//! Values are drawn from the bundled claims schema so most requests encode
//! cleanly; a share of them is deliberately malformed.

use anyhow::Context;
use claim_fraud_pipeline::schema::{FeatureSchema, FieldKind, SchemaProfile};
use claim_fraud_pipeline::ClaimRequest;
use rand::seq::IteratorRandom;
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// Claim generator for testing
struct ClaimGenerator {
    schema: FeatureSchema,
    rng: rand::rngs::ThreadRng,
    claim_counter: u64,
}

impl ClaimGenerator {
    fn new(schema: FeatureSchema) -> Self {
        Self {
            schema,
            rng: rand::thread_rng(),
            claim_counter: 0,
        }
    }

    /// Generate a claim whose every field is valid for the schema
    fn generate_valid(&mut self) -> ClaimRequest {
        self.claim_counter += 1;

        let mut fields = HashMap::new();
        for field in self.schema.fields() {
            let value = match field.kind() {
                FieldKind::Categorical(codebook) => codebook
                    .labels()
                    .choose(&mut self.rng)
                    .unwrap_or_default()
                    .to_string(),
                FieldKind::Integer { min, max } => {
                    let low = min.unwrap_or(-50_000);
                    let high = max.unwrap_or(low + 100_000);
                    self.rng.gen_range(low..=high).to_string()
                }
                FieldKind::Float { min, max } => {
                    let low = min.unwrap_or(0.0);
                    let high = max.unwrap_or(low + 1.0);
                    format!("{:.3}", self.rng.gen_range(low..=high))
                }
            };
            fields.insert(field.input_name().to_string(), value);
        }

        ClaimRequest::new(format!("clm_{:012}", self.claim_counter), fields)
    }

    /// Generate a claim with one field broken the way form input breaks
    fn generate_malformed(&mut self) -> ClaimRequest {
        let mut claim = self.generate_valid();
        let field = self
            .schema
            .fields()
            .iter()
            .choose(&mut self.rng)
            .map(|f| f.input_name().to_string())
            .unwrap_or_default();

        match self.rng.gen_range(0..3) {
            0 => {
                claim.fields.insert(field, "n/a".to_string());
            }
            1 => {
                claim.fields.remove(&field);
            }
            _ => {
                claim.fields.insert("claim_notes".to_string(), "see attachment".to_string());
            }
        }

        claim
    }
}

/// Share of malformed claims, a probability in [0, 1]. Defaults to 0.1.
fn parse_malformed_rate(arg: Option<&str>) -> anyhow::Result<f64> {
    let rate = match arg {
        Some(arg) => arg
            .parse::<f64>()
            .with_context(|| format!("malformed rate {:?} is not a number", arg))?,
        None => 0.1,
    };

    anyhow::ensure!(
        (0.0..=1.0).contains(&rate),
        "malformed rate {} must lie in [0, 1]",
        rate
    );
    Ok(rate)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("claim_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Claim Producer");

    // Positional arguments: url subject count malformed_rate delay_ms
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("claims.requests");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let malformed_rate = parse_malformed_rate(args.get(4).map(|s| s.as_str()))?;
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        malformed_rate = malformed_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let generator = ClaimGenerator::new(SchemaProfile::ClaimsV1.build()?);

    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(generator, count, malformed_rate, delay_ms).await;
        }
    };

    let mut generator = generator;
    let mut rng = rand::thread_rng();
    let mut valid_count = 0;
    let mut malformed_count = 0;

    info!("Starting to publish {} claims...", count);

    for i in 0..count {
        let claim = if rng.gen_bool(malformed_rate) {
            malformed_count += 1;
            generator.generate_malformed()
        } else {
            valid_count += 1;
            generator.generate_valid()
        };

        let payload = serde_json::to_vec(&claim)?;
        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} claims ({} valid, {} malformed)",
                i + 1,
                count,
                valid_count,
                malformed_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    client.flush().await?;

    info!(
        "Completed! Published {} claims ({} valid, {} malformed)",
        count, valid_count, malformed_count
    );

    Ok(())
}

async fn run_dry_mode(
    mut generator: ClaimGenerator,
    count: u64,
    malformed_rate: f64,
    delay_ms: u64,
) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut rng = rand::thread_rng();

    for i in 0..count {
        let claim = if rng.gen_bool(malformed_rate) {
            generator.generate_malformed()
        } else {
            generator.generate_valid()
        };

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample claim {}:\n{}", i + 1, serde_json::to_string_pretty(&claim)?);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
