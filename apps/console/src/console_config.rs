use std::env;
use std::str::FromStr;

use labdesk_core::{AppError, AppResult};

/// Snapshot printed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleView {
    Dashboard,
    Analytics,
    Export,
    Audit,
    Modules,
}

impl FromStr for ConsoleView {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(Self::Dashboard),
            "analytics" => Ok(Self::Analytics),
            "export" => Ok(Self::Export),
            "audit" => Ok(Self::Audit),
            "modules" => Ok(Self::Modules),
            other => Err(AppError::Validation(format!(
                "LABDESK_VIEW must be dashboard, analytics, export, audit or modules; got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub actor: String,
    pub view: ConsoleView,
    pub seed_demo: bool,
    pub audit_limit: usize,
}

impl ConsoleConfig {
    pub fn load() -> AppResult<Self> {
        let actor = env::var("LABDESK_ACTOR")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "admin".to_owned());
        let view = match env::var("LABDESK_VIEW") {
            Ok(value) => value.parse()?,
            Err(_) => ConsoleView::Dashboard,
        };
        let seed_demo = parse_env_bool("LABDESK_SEED_DEMO", true)?;
        let audit_limit = parse_env_usize("LABDESK_AUDIT_LIMIT", 20)?;

        if audit_limit == 0 {
            return Err(AppError::Validation(
                "LABDESK_AUDIT_LIMIT must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            actor,
            view,
            seed_demo,
            audit_limit,
        })
    }
}

fn parse_env_bool(name: &str, default: bool) -> AppResult<bool> {
    match env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::Validation(format!(
                "invalid {name} value '{value}': expected true or false"
            ))),
        },
        Err(_) => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> AppResult<usize> {
    match env::var(name) {
        Ok(value) => value.parse::<usize>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
