//! Command Line Interface for Fleeditto.
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use fleeditto_api::{ApiServer, ServerConfig};
use fleeditto_domain::enums::{DexId, Network, TokenSide};
use fleeditto_domain::fees::FeeTier;
use fleeditto_domain::position::PendingPosition;
use fleeditto_execution::batch::build_args;
use fleeditto_execution::calculation::{CalculatorConfig, LiquidityCalculator};
use fleeditto_execution::state::{Action, Store};
use fleeditto_protocols::batch_contract::batch_hyperion;
use fleeditto_protocols::config::{NetworkConfig, ProtocolConfig};
use fleeditto_protocols::token_service::TokenService;
use fleeditto_protocols::{AdapterFactory, AptosRestClient, HyperionGraphQl};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fleeditto")]
#[command(about = "Concentrated-liquidity batching for Aptos DEXes", long_about = None)]
struct Cli {
    /// Aptos network (mainnet, testnet, devnet)
    #[arg(long, global = true, env = "APTOS_NETWORK")]
    network: Option<Network>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum InputSide {
    A,
    B,
}

impl From<InputSide> for TokenSide {
    fn from(side: InputSide) -> Self {
        match side {
            InputSide::A => TokenSide::A,
            InputSide::B => TokenSide::B,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the fee tiers a DEX supports
    FeeTiers {
        /// DEX identifier; all DEXes when omitted
        #[arg(long)]
        dex: Option<String>,
    },
    /// Compute the paired amount for a Hyperion position
    Quote {
        #[arg(long)]
        token_a: String,
        #[arg(long)]
        token_b: String,
        /// Fee tier index (0-5)
        #[arg(long)]
        fee_tier: u8,
        /// Lower price bound, token B per token A
        #[arg(long)]
        min: Decimal,
        /// Upper price bound
        #[arg(long)]
        max: Decimal,
        /// Current price
        #[arg(long)]
        price: Decimal,
        /// Amount of the input token
        #[arg(long)]
        amount: String,
        /// Which token `amount` is for
        #[arg(long, value_enum, default_value = "a")]
        input: InputSide,
    },
    /// Check whether a Hyperion pool exists
    Pool {
        #[arg(long)]
        token_a: String,
        #[arg(long)]
        token_b: String,
        #[arg(long)]
        fee_tier: u8,
    },
    /// Print the batch transaction payload for a JSON list of pending positions
    BatchPayload {
        #[arg(long)]
        file: PathBuf,
    },
    /// Run the Tapp API proxy
    ServeProxy {
        /// Listen address, overrides PROXY_BIND_ADDR
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
}

struct Setup {
    network: NetworkConfig,
    protocols: ProtocolConfig,
}

impl Setup {
    fn load(network: Option<Network>) -> Result<Self> {
        let mut config = NetworkConfig::from_env().context("Failed to read network configuration")?;
        if let Some(network) = network {
            if network != config.network {
                config = NetworkConfig::for_network(network);
            }
        }
        let protocols = ProtocolConfig::from_env(config.network);
        Ok(Self {
            network: config,
            protocols,
        })
    }

    fn factory(&self) -> Result<AdapterFactory> {
        let chain = AptosRestClient::from_config(&self.network).context("Failed to create fullnode client")?;
        let indexer = HyperionGraphQl::from_config(&self.protocols).context("Failed to create GraphQL client")?;
        Ok(AdapterFactory::new(Arc::new(chain), self.protocols.clone()).with_indexer(Arc::new(indexer)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::FeeTiers { dex } => {
            let ctx = Setup::load(cli.network)?;
            let factory = ctx.factory()?;
            let adapters = match dex {
                Some(dex) => {
                    let id: DexId = dex.parse()?;
                    vec![(id, factory.adapter_for(id))]
                }
                None => DexId::ALL.into_iter().map(|id| (id, factory.adapter_for(id))).collect(),
            };

            for (id, adapter) in adapters {
                println!("{} ({})", id.display_name(), adapter.contract_address());
                println!("{:<6} | {:<8} | {:<8} | Description", "Index", "Fee", "Spacing");
                for tier in adapter.supported_fee_tiers() {
                    println!(
                        "{:<6} | {:<8} | {:<8} | {}",
                        tier.index(),
                        tier.label(),
                        tier.tick_spacing(),
                        tier.description()
                    );
                }
                println!();
            }
        }
        Commands::Quote {
            token_a,
            token_b,
            fee_tier,
            min,
            max,
            price,
            amount,
            input,
        } => {
            let ctx = Setup::load(cli.network)?;
            let factory = ctx.factory()?;
            let fee_tier = FeeTier::new(fee_tier)?;
            let chain = AptosRestClient::from_config(&ctx.network)?;
            let tokens = TokenService::new(Arc::new(chain), ctx.network.network);
            let (meta_a, meta_b) = tokio::join!(tokens.metadata(&token_a), tokens.metadata(&token_b));
            println!("🔍 {} / {} at {} (fee {})", meta_a.symbol, meta_b.symbol, price, fee_tier.label());

            let store = Store::new();
            store.dispatch_all([
                Action::SetSelectedDex(Some(DexId::Hyperion)),
                Action::SetTokenAddress(TokenSide::A, token_a.clone()),
                Action::SetTokenAddress(TokenSide::B, token_b.clone()),
                Action::SetTokenMetadata(TokenSide::A, Some(meta_a.clone())),
                Action::SetTokenMetadata(TokenSide::B, Some(meta_b.clone())),
                Action::SetFeeTier(Some(fee_tier)),
                Action::SetPriceRange {
                    min_price: Some(min),
                    max_price: Some(max),
                },
                Action::SetCurrentPrice(Some(price)),
            ]);

            let hyperion = Arc::new(factory.hyperion());
            let pool_tick = match hyperion.lookup_pool(&token_a, &token_b, fee_tier).await {
                Ok(lookup) => lookup.and_then(|l| l.current_tick),
                Err(e) => {
                    warn!(error = %e, "Pool lookup failed, using the price-derived tick");
                    None
                }
            };
            let calculator = LiquidityCalculator::for_hyperion(
                store.clone(),
                Arc::clone(&hyperion),
                CalculatorConfig {
                    debounce: Duration::ZERO,
                    ..CalculatorConfig::default()
                },
            );
            calculator.set_pool_tick(pool_tick).await;
            calculator.set_input_token(input.into()).await;
            let form = calculator.set_input_amount(&amount).await;
            if let Some(error) = form.calculation_error {
                bail!(error);
            }

            let state = store.state();
            println!("✅ {} {}", state.token_a.amount, meta_a.symbol);
            println!("   {} {}", state.token_b.amount, meta_b.symbol);
            if let Some(liquidity) = form.liquidity {
                println!("   liquidity {liquidity}");
            }
        }
        Commands::Pool {
            token_a,
            token_b,
            fee_tier,
        } => {
            let ctx = Setup::load(cli.network)?;
            let hyperion = ctx.factory()?.hyperion();
            let fee_tier = FeeTier::new(fee_tier)?;

            let lookup = hyperion.lookup_pool(&token_a, &token_b, fee_tier).await?;
            let pool_id = lookup.as_ref().map(|l| l.pool_id.as_str());
            let report = hyperion
                .check_pool_state(pool_id, &token_a, &token_b, fee_tier)
                .await?;

            if !report.exists {
                println!("❌ No Hyperion pool for this pair at {}", fee_tier.label());
                return Ok(());
            }
            println!("✅ Pool exists at {}", fee_tier.label());
            if let Some(lookup) = lookup {
                println!("   id           {}", lookup.pool_id);
                if let Some(tick) = lookup.current_tick {
                    println!("   current tick {tick}");
                }
            }
            if let Some(stats) = report.stats {
                println!("   TVL          ${}", stats.tvl_usd.round_dp(2));
                println!("   24h volume   ${}", stats.daily_volume_usd.round_dp(2));
                println!("   APR          {}%", stats.total_apr().round_dp(2));
            }
        }
        Commands::BatchPayload { file } => {
            let ctx = Setup::load(cli.network)?;
            let raw = std::fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let positions: Vec<PendingPosition> =
                serde_json::from_str(&raw).with_context(|| format!("Invalid positions file {}", file.display()))?;
            if positions.is_empty() {
                bail!("No positions in {}", file.display());
            }

            let args = build_args(&positions)?;
            let payload = batch_hyperion(&ctx.protocols.batch_contract, &args)?;
            info!(positions = args.len(), function = %payload.function, "Built batch payload");
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Commands::ServeProxy { bind } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            println!("📡 Proxying {} on http://{}", config.tapp_api_base_url, config.bind_addr);
            ApiServer::new(config).run().await?;
        }
    }

    Ok(())
}
