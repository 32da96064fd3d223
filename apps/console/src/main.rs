//! LabDesk console runtime.

#![forbid(unsafe_code)]

mod console_config;
mod dev_seed;
mod state;

use labdesk_application::{AuditLogQuery, UserRepository};
use labdesk_core::{AppError, AppResult};
use labdesk_domain::UserId;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::console_config::{ConsoleConfig, ConsoleView};
use crate::state::{LabState, build_lab_state};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ConsoleConfig::load()?;
    let state = build_lab_state();

    if config.seed_demo {
        dev_seed::run(&state).await?;
    }

    let actor = state
        .repository
        .find_user_by_username(config.actor.as_str())
        .await?
        .ok_or_else(|| AppError::Unauthorized(format!("unknown account '{}'", config.actor)))?;
    let actor = state.user_service.record_login(actor.id()).await?;

    info!(
        actor = actor.username(),
        role = actor.role().as_str(),
        view = ?config.view,
        "labdesk console started"
    );

    let rendered = render_view(&state, &config, actor.id()).await?;
    println!("{rendered}");

    Ok(())
}

async fn render_view(
    state: &LabState,
    config: &ConsoleConfig,
    actor: UserId,
) -> AppResult<String> {
    let value = match config.view {
        ConsoleView::Dashboard => to_json(&state.analytics_service.dashboard(actor).await?)?,
        ConsoleView::Analytics => {
            to_json(&state.analytics_service.analytics_report(actor).await?)?
        }
        ConsoleView::Export => return state.analytics_service.export_analytics(actor).await,
        ConsoleView::Audit => {
            let query = AuditLogQuery {
                limit: config.audit_limit,
                ..AuditLogQuery::default()
            };
            to_json(&state.audit_service.list_events(actor, query).await?)?
        }
        ConsoleView::Modules => to_json(
            &state
                .authorization_service
                .accessible_modules(Some(actor))
                .await?,
        )?,
    };

    serde_json::to_string_pretty(&value)
        .map_err(|error| AppError::Internal(format!("failed to render console view: {error}")))
}

fn to_json<T: Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|error| AppError::Internal(format!("failed to serialize console view: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
