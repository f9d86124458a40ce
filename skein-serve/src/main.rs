//! skein-serve: boots the core (checkpointer, datastore, tool registry, graph) behind the
//! axum HTTP surface, and starts the scheduler alongside it.
//!
//! Grounded on `serve::run_serve`/`run_serve_on_listener` (build state once, bind a
//! `TcpListener`, `axum::serve`) and on `loom::model_spec::refresher::ResolverRefresher`'s
//! spawn-then-graceful-shutdown shape for the scheduler half.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;

use skein::agent::{default_specs, AgentLoopConfig, AgentSpec};
use skein::agent_name::AgentName;
use skein::checkpoint::{Checkpointer, SqliteSaver};
use skein::config::RuntimeConfig;
use skein::graph::{CompiledGraph, RunContext};
use skein::llm::{ChatOpenAI, LlmCapability, MockLlm};
use skein::routing::RouterConfig;
use skein::scheduler::jobs::cleanup_old_data::CleanupOldDataJob;
use skein::scheduler::jobs::expand_recurring_tasks::ExpandRecurringTasksJob;
use skein::scheduler::jobs::external_sync::{ExternalSyncJob, NoopExternalSyncClient};
use skein::scheduler::jobs::fire_reminders::{FireRemindersJob, LogSink};
use skein::scheduler::jobs::health_probe::HealthProbeJob;
use skein::scheduler::jobs::vault_sync::VaultSyncJob;
use skein::scheduler::{JobSpec, Scheduler};
use skein::store::Datastore;
use skein::tools::builtin;
use skein::tools::ToolRegistry;
use skein::{Orchestrator, OrchestratorConfig};

fn build_llm(config: &RuntimeConfig) -> Arc<dyn LlmCapability> {
    match &config.openai_api_key {
        Some(key) => {
            let mut openai_config = async_openai::config::OpenAIConfig::new().with_api_key(key);
            if let Some(base_url) = &config.openai_base_url {
                openai_config = openai_config.with_api_base(base_url);
            }
            Arc::new(ChatOpenAI::with_config(
                openai_config,
                config.chat_model.clone(),
                config.embedding_model.clone(),
            ))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set; running with a mock LLM (routing/replies are canned)");
            Arc::new(MockLlm::fixed("ok"))
        }
    }
}

fn spawn_scheduler(config: &RuntimeConfig, store: Arc<Datastore>, llm: Arc<dyn LlmCapability>) -> Scheduler {
    let mut scheduler = Scheduler::new();
    if !config.scheduler_enabled {
        info!("scheduler disabled (SCHEDULER_ENABLED=false)");
        return scheduler;
    }

    scheduler.spawn(
        JobSpec {
            name: "fire_reminders",
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(15),
            enabled: config.fire_reminders_enabled,
        },
        Arc::new(FireRemindersJob::new(Arc::clone(&store), Arc::new(LogSink))),
    );
    scheduler.spawn(
        JobSpec {
            name: "expand_recurring_tasks",
            interval: Duration::from_secs(3600),
            timeout: Duration::from_secs(30),
            enabled: config.expand_recurring_tasks_enabled,
        },
        Arc::new(ExpandRecurringTasksJob::new(Arc::clone(&store))),
    );
    scheduler.spawn(
        JobSpec {
            name: "cleanup_old_data",
            interval: Duration::from_secs(86_400),
            timeout: Duration::from_secs(60),
            enabled: config.cleanup_old_data_enabled,
        },
        Arc::new(CleanupOldDataJob::new(Arc::clone(&store))),
    );
    scheduler.spawn(
        JobSpec {
            name: "health_probe",
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(15),
            enabled: config.health_probe_enabled,
        },
        Arc::new(HealthProbeJob::new(Arc::clone(&store), Arc::clone(&llm))),
    );
    scheduler.spawn(
        JobSpec {
            name: "vault_sync",
            interval: Duration::from_secs(300),
            timeout: Duration::from_secs(30),
            enabled: config.vault_sync_enabled,
        },
        Arc::new(VaultSyncJob::new(Arc::clone(&store), std::env::current_dir().unwrap_or_default())),
    );
    scheduler.spawn(
        JobSpec {
            name: "external_sync",
            interval: Duration::from_secs(600),
            timeout: Duration::from_secs(30),
            enabled: config.external_sync_enabled,
        },
        Arc::new(ExternalSyncJob::new(store, Arc::new(NoopExternalSyncClient))),
    );

    scheduler
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = skein_config::load_and_apply("skein", None);
    let _guard = skein_config::init_tracing("skein-serve", true);

    let config = RuntimeConfig::from_env();

    let store = Arc::new(Datastore::new(&config.datastore_path)?);
    let checkpointer: Arc<dyn Checkpointer> = Arc::new(SqliteSaver::new(&config.checkpoint_db_path)?);
    let llm = build_llm(&config);

    let mut registry = ToolRegistry::new();
    builtin::register_all(&mut registry, Arc::clone(&store));

    let specs: HashMap<AgentName, AgentSpec> = default_specs().into_iter().map(|s| (s.name, s)).collect();

    let run_context = RunContext {
        llm: Arc::clone(&llm),
        registry: Arc::new(registry),
        specs: Arc::new(specs),
        router_config: RouterConfig {
            confidence_floor: config.router_confidence_floor,
            default_agent: config.default_agent,
            routing_temperature: config.routing_llm_temperature,
            llm_deadline: config.llm_deadline(),
        },
        agent_loop_config: AgentLoopConfig {
            max_tool_rounds: config.max_tool_rounds,
            tool_deadline: config.tool_deadline(),
            llm_deadline: config.llm_deadline(),
            agent_temperature: config.agent_llm_temperature,
        },
        tool_deadline: config.tool_deadline(),
        max_handoffs: config.max_handoffs,
        state_max_messages: config.state_max_messages,
    };

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&checkpointer),
        CompiledGraph::new(run_context),
        OrchestratorConfig {
            checkpoint_ttl_seconds: config.state_ttl_seconds,
            turn_budget: config.turn_budget(),
        },
    ));

    let scheduler = spawn_scheduler(&config, Arc::clone(&store), llm);

    let state = skein_serve::AppState {
        orchestrator,
        checkpointer,
        store,
    };
    let app = skein_serve::router(state);

    let addr = std::env::var("SKEIN_SERVE_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!("skein-serve listening on http://{}", addr);

    let shutdown_signal = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    };

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal).await?;

    scheduler.shutdown(Duration::from_secs(10)).await;
    Ok(())
}
