use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrigmenuError {
    #[error("trigger '{trigger}' has no parameter named '{parameter}'")]
    ParameterNotFound { trigger: String, parameter: String },

    #[error("tolerance must be greater than zero, got {0}")]
    InvalidTolerance(f64),

    #[error(
        "no threshold assignment for parameter '{parameter}' of trigger '{trigger}' \
         passes the event: both edges of the search interval give the same result"
    )]
    Infeasible { trigger: String, parameter: String },

    #[error(
        "bisection state for parameter '{parameter}' of trigger '{trigger}' is \
         inconsistent with monotonic acceptance"
    )]
    InvariantViolation { trigger: String, parameter: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrigmenuError>;
