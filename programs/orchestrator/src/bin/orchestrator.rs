use std::sync::Arc;

use clap::Parser;
use evm_bridge_orchestrator::broadcaster::{
    Broadcaster, CosmosTxBuilder, HttpSubmitClient, LocalSequenceSource,
};
use evm_bridge_orchestrator::cli::{Commands, OrchestratorCli, OrchestratorConfig};
use evm_bridge_orchestrator::index::{Indexer, LocalIndex};
use evm_bridge_orchestrator::retrier::Retrier;
use evm_bridge_orchestrator::shutdown;
use evm_bridge_orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = OrchestratorCli::parse();

    match cli.command {
        Commands::Start(args) => {
            let config = OrchestratorConfig::from_file(&args.config)?;

            tracing_subscriber::fmt::fmt()
                .with_max_level(config.server.log_level())
                .init();
            tracing::info!(%config, "loaded configuration");

            let signer = config.signer.evm_signer()?;
            tracing::info!(address = %signer.address(), "orchestrator EVM address");

            let index = LocalIndex::new();
            // The ingestion side feeds attestations, confirms and heights in
            // through this handle.
            let _indexer = Indexer::new(index.clone());

            let account_key = config
                .signer
                .account_key
                .trim_start_matches("0x")
                .parse()?;
            let tx_builder = CosmosTxBuilder::new(
                account_key,
                config.orchestrator.chain_id.clone(),
                Box::new(LocalSequenceSource::new(
                    config.orchestrator.account_number,
                    0,
                )),
            );
            let submit_client = HttpSubmitClient::new(&config.orchestrator.rpc_url)?;
            let broadcaster =
                Broadcaster::new(tx_builder, submit_client, config.orchestrator.gas_limit);

            let orchestrator = Arc::new(Orchestrator::new(
                index,
                broadcaster,
                Retrier::new(config.orchestrator.max_retries),
                signer,
                config.orchestrator.account_address.clone(),
                config.bridge.bridge_id,
                config.orchestrator.start_height,
            ));

            let (signal, ctx) = shutdown::channel();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("interrupt received, shutting down");
                    signal.trigger();
                }
            });

            orchestrator.start(ctx).await?;
            Ok(())
        }

        Commands::Key(command) => {
            use evm_bridge_orchestrator::cli::cmd::key::KeyCommands;
            match command {
                KeyCommands::Generate => {
                    let signer = alloy_signer_local::PrivateKeySigner::random();
                    println!("address: {}", signer.address());
                    println!("private key: 0x{}", hex_key(&signer));
                }
                KeyCommands::Show(args) => {
                    let config = OrchestratorConfig::from_file(&args.config)?;
                    let signer = config.signer.evm_signer()?;
                    println!("address: {}", signer.address());
                }
            }
            Ok(())
        }
    }
}

fn hex_key(signer: &alloy_signer_local::PrivateKeySigner) -> String {
    alloy_primitives::hex::encode(signer.credential().to_bytes())
}
