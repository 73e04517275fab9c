//! # Outage Simulator
//!
//! Walks the full offline flow end to end against an in-memory remote
//! store: sales captured during an outage, connectivity restored, queue
//! drained, audit trail printed.
//!
//! ## Usage
//! ```bash
//! # Run with default settings
//! cargo run -p lumen-sync --bin simulate
//!
//! # Queue more sales during the simulated outage
//! cargo run -p lumen-sync --bin simulate -- --sales 10
//!
//! # Verbose engine logs
//! RUST_LOG=debug cargo run -p lumen-sync --bin simulate
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use lumen_core::{Money, PaymentMethod, QueuedItem, SaleDraft};
use lumen_db::{Database, DbConfig};
use lumen_sync::{
    Checkout, CheckoutOutcome, ConnectivitySignal, Drainer, NoOpEmitter, OfflineQueue,
    QueueStore,
};

/// Products available at the simulated till.
const PRODUCTS: &[(&str, i64)] = &[
    ("Rice 5kg", 25_000),
    ("Drinking Water 1.5L", 5_000),
    ("Cooking Oil 1L", 18_000),
    ("Instant Noodles", 4_000),
    ("Sticky Rice Basket", 12_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut sales: usize = 3;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Lumen POS Outage Simulator");
                println!();
                println!("Usage: simulate [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sales <N>    Sales to capture during the outage (default: 3)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let db = Arc::new(Database::new(DbConfig::in_memory()).await?);

    let queue_path = std::env::temp_dir().join(format!("lumen-simulate-{}.json", Uuid::new_v4()));
    let store = QueueStore::new(&queue_path);
    let queue = Arc::new(OfflineQueue::open(store.clone())?);

    let connectivity = ConnectivitySignal::new(false);
    let checkout = Checkout::new(
        db.clone(),
        queue.clone(),
        connectivity.clone(),
        Arc::new(NoOpEmitter),
    );

    println!("=== Outage: remote store unreachable ===");
    for n in 0..sales {
        let (name, cents) = PRODUCTS[n % PRODUCTS.len()];
        let outcome = checkout
            .submit(SaleDraft {
                items: vec![QueuedItem {
                    product_id: format!("p-{}", n % PRODUCTS.len()),
                    name: name.to_string(),
                    quantity: 1,
                    unit_price: Money::from_cents(cents),
                    line_total: Money::from_cents(cents),
                    stock_at_add: None,
                }],
                payment_method: PaymentMethod::Cash,
                discount: Money::zero(),
                points_discount: Money::zero(),
                employee_id: Some("emp-1".into()),
                customer_id: None,
            })
            .await?;

        match outcome {
            CheckoutOutcome::Queued(queued) => {
                println!(
                    "  queued {} ({} cents), pending = {}",
                    queued.id,
                    queued.final_amount.cents(),
                    queue.pending_count()
                );
            }
            CheckoutOutcome::Completed(_) => unreachable!("signal is offline"),
        }
    }

    println!();
    println!("=== Connectivity restored, draining ===");
    connectivity.set_online();

    let drainer = Drainer::new(
        db.clone(),
        queue.clone(),
        Arc::new(NoOpEmitter),
        Duration::from_secs(10),
    );
    let report = drainer.drain().await?;

    println!(
        "  attempted = {}, synced = {}, failed = {}",
        report.attempted, report.synced, report.failed
    );
    println!("  pending after drain = {}", queue.pending_count());
    println!("  remote sale headers = {}", db.sales().count().await?);

    store.remove_file()?;
    Ok(())
}
