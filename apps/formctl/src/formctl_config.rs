use std::env;
use std::path::PathBuf;

use ekklesia_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

const DEFAULT_FORM_KEY: &str = "registration";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormctlConfig {
    pub definition_path: PathBuf,
    pub values_path: Option<PathBuf>,
    pub submissions_path: Option<PathBuf>,
    pub form_key: String,
}

impl FormctlConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_sources(env::args().skip(1), |name| env::var(name).ok())
    }

    fn from_sources<A, F>(args: A, lookup: F) -> AppResult<Self>
    where
        A: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut args = args.into_iter();
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let definition_path = args
            .next()
            .or_else(|| optional("FORMCTL_DEFINITION_PATH"))
            .map(PathBuf::from)
            .ok_or_else(|| {
                AppError::Validation(
                    "FORMCTL_DEFINITION_PATH is required (or pass the definition path as the first argument)"
                        .to_owned(),
                )
            })?;
        let values_path = args
            .next()
            .or_else(|| optional("FORMCTL_VALUES_PATH"))
            .map(PathBuf::from);
        let submissions_path = optional("FORMCTL_SUBMISSIONS_PATH").map(PathBuf::from);
        let form_key =
            optional("FORMCTL_FORM_KEY").unwrap_or_else(|| DEFAULT_FORM_KEY.to_owned());

        if let Some(extra) = args.next() {
            return Err(AppError::Validation(format!(
                "unexpected argument '{extra}'; usage: formctl <definition.json> [values.json]"
            )));
        }

        Ok(Self {
            definition_path,
            values_path,
            submissions_path,
            form_key,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
