mod cli;

use anyhow::Context;
use cli::{Cli, Commands, LogFormat, output::Output};
use fitbuddy::{
    AppState, FitConfig, GeminiClient,
    db::{LocalVectorStore, VectorStore},
    rag::{Embedder, GeminiEmbedder, IngestReport, Ingestor, TextChunker},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let log_filter = init_tracing(&cli);
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Err(e) = run(&cli, &output, log_filter).await {
        error!(error = %format!("{:#}", e), "FitBuddy failed");
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, output: &Output, log_filter: Option<FilterHandle>) -> anyhow::Result<()> {
    let config = FitConfig::load(&cli.config).context("failed to load configuration")?;
    apply_log_level(log_filter, &config.server.log_level);

    match cli.command() {
        Commands::Config => {
            print_config(output, &cli.config, &config);
            Ok(())
        }
        Commands::Ingest => ingest_only(output, config).await,
        Commands::Serve => serve(output, config).await,
    }
}

/// Start logging before configuration is read.
///
/// `RUST_LOG` wins when set, then `--verbose`. Otherwise the `info` filter is
/// provisional and the returned handle swaps in the configured `log_level`.
fn init_tracing(cli: &Cli) -> Option<FilterHandle> {
    let from_env = EnvFilter::try_from_default_env().ok();
    let provisional = from_env.is_none() && !cli.verbose;
    let filter = from_env.unwrap_or_else(|| {
        EnvFilter::new(filter_directives(if cli.verbose { "debug" } else { "info" }))
    });
    let (filter, handle) = reload::Layer::new(filter);

    let (text, json) = match cli.log_format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();

    provisional.then_some(handle)
}

fn apply_log_level(handle: Option<FilterHandle>, level: &str) {
    let Some(handle) = handle else {
        return;
    };
    if let Err(e) = handle.reload(EnvFilter::new(filter_directives(level))) {
        warn!(error = %e, level, "Failed to apply configured log level");
    }
}

fn filter_directives(level: &str) -> String {
    format!(
        "fitbuddy={0},fitbuddy_server={0},fitbuddy_vector={0},tower_http={0}",
        level
    )
}

fn print_config(output: &Output, path: &Path, config: &FitConfig) {
    output.header("Configuration");
    output.kv(
        "file",
        &format!(
            "{}{}",
            path.display(),
            if path.exists() { "" } else { " (not found, defaults)" }
        ),
    );

    output.header("Server");
    output.kv("address", &config.bind_address());
    output.kv("log_level", &config.server.log_level);
    output.kv("cors_origin", &config.server.cors_origin);

    output.header("LLM");
    output.kv("base_url", &config.llm.base_url);
    output.kv("model", &config.llm.model);
    output.kv("temperature", &config.llm.temperature.to_string());
    output.kv("embedding_model", &config.llm.embedding_model);
    output.kv(
        "api_key_env",
        &format!(
            "{} ({})",
            config.llm.api_key_env,
            if config.api_key().is_ok() { "set" } else { "not set" }
        ),
    );

    output.header("RAG");
    output.kv("source_document", &config.rag.source_document);
    output.kv("persist_directory", &config.rag.persist_directory);
    output.kv("collection", &config.rag.collection);
    output.kv("chunk_size", &config.rag.chunk_size.to_string());
    output.kv("chunk_overlap", &config.rag.chunk_overlap.to_string());
    output.kv("top_k", &config.rag.top_k.to_string());

    output.header("Agent");
    output.kv("max_iterations", &config.agent.max_iterations.to_string());
}

/// Backends shared by ingestion and serving.
struct Backends {
    api_key: String,
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
}

async fn open_backends(config: &FitConfig) -> anyhow::Result<Backends> {
    let api_key = config.api_key()?;
    let store: Arc<dyn VectorStore> =
        Arc::new(LocalVectorStore::open(&config.rag.persist_directory).await?);
    let embedder: Arc<dyn Embedder> = Arc::new(GeminiEmbedder::from_config(&config.llm, &api_key));
    Ok(Backends {
        api_key,
        store,
        embedder,
    })
}

async fn ingest(config: &FitConfig, backends: &Backends) -> anyhow::Result<IngestReport> {
    let chunker = TextChunker::new(config.rag.chunk_size, config.rag.chunk_overlap)?;
    let ingestor = Ingestor::new(
        backends.store.clone(),
        backends.embedder.clone(),
        chunker,
        config.rag.collection.clone(),
    );

    let report = ingestor
        .ingest_file(Path::new(&config.rag.source_document))
        .await
        .with_context(|| format!("failed to ingest {}", config.rag.source_document))?;
    Ok(report)
}

fn report_ingest(output: &Output, report: &IngestReport) {
    if report.skipped {
        output.info(&format!(
            "Index current for {} ({} chunks)",
            report.source, report.chunks
        ));
    } else {
        output.success(&format!(
            "Indexed {} chunks from {}",
            report.upserted, report.source
        ));
    }
}

async fn ingest_only(output: &Output, config: FitConfig) -> anyhow::Result<()> {
    let backends = open_backends(&config).await?;
    let report = ingest(&config, &backends).await?;
    report_ingest(output, &report);
    Ok(())
}

async fn serve(output: &Output, config: FitConfig) -> anyhow::Result<()> {
    output.banner();

    let backends = open_backends(&config).await?;
    let report = ingest(&config, &backends).await?;
    report_ingest(output, &report);

    let llm = Arc::new(GeminiClient::from_config(&config.llm, &backends.api_key));
    let address = config.bind_address();
    let state = AppState::new(config, llm, backends.embedder, backends.store);
    info!(tools = ?state.tool_registry.tool_names(), "Agent ready");

    let app = state.router()?;
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    output.success(&format!("Listening on http://{}", address));
    info!(%address, "Server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives_cover_every_crate() {
        let directives = filter_directives("warn");
        for target in ["fitbuddy=warn", "fitbuddy_server=warn", "fitbuddy_vector=warn", "tower_http=warn"] {
            assert!(directives.contains(target), "{} missing", target);
        }
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
