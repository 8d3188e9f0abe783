//! Minimal embedding example for namebind-core
//!
//! This example drives a NameBinder against the in-memory dev chain:
//! a first bind on an empty network (provisions everything), a repeat bind
//! (no transactions), and a bind attempt by an account that does not own
//! the name (refused).
//!
//! Configuration comes from the environment (`NAMEBIND_REGISTRY_ADDRESS`,
//! `NAMEBIND_DRY_RUN`, ...); log level from `NAMEBIND_LOG_LEVEL`.

use anyhow::Result;
use namebind_core::{Address, BindRequest, BinderConfig, MemoryChain, NameBinder, Namehash};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn init_tracing() -> Result<()> {
    let level = match std::env::var("NAMEBIND_LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    println!("=== Embedded namebind-core Example ===\n");

    let config = BinderConfig::from_env()?;
    let chain = MemoryChain::new();
    let deployer = Address::from_low_u64(0xd00d);
    let target = Address::from_low_u64(0xaaa);

    println!("1. Creating binder (dry run: {})...", config.dry_run);
    let (binder, event_rx) = NameBinder::new(
        Box::new(chain.clone()),
        Box::new(chain.clone()),
        Box::new(Namehash),
        config,
    )?;

    let event_listener = tokio::spawn(async move {
        let mut events = ReceiverStream::new(event_rx);
        while let Some(event) = events.next().await {
            println!("[Event] {:?}", event);
        }
    });

    println!("2. Binding alice -> {} on an empty network...", target);
    let report = binder
        .set_address(&BindRequest::new("alice", target, deployer))
        .await?;
    info!("First bind: {:?}", report.outcome);
    println!(
        "   registry deployed: {}, resolver deployed: {}, transactions: {}",
        report.registry_deployed,
        report.resolver_deployed,
        chain.transactions().await.len()
    );

    println!("3. Binding again with the same arguments...");
    let before = chain.transactions().await.len();
    let report = binder
        .set_address(&BindRequest::new("alice", target, deployer))
        .await?;
    println!(
        "   outcome: {:?}, new transactions: {}",
        report.outcome,
        chain.transactions().await.len() - before
    );

    println!("4. Binding from an account that does not own the name...");
    let stranger = Address::from_low_u64(0xccc);
    match binder
        .set_address(&BindRequest::new("alice", target, stranger))
        .await
    {
        Ok(report) => println!("   unexpectedly succeeded: {:?}", report.outcome),
        Err(e) => println!("   refused:\n{}", e),
    }

    drop(binder);
    let _ = event_listener.await;

    println!("\n=== Embedding Successful ===");
    Ok(())
}
