use std::{io::Error as IO_ERROR, num::ParseIntError};

use reqwest::Error as REQWEST_ERROR;
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;
use url::ParseError as URL_ERROR;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    URL(#[from] URL_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[error("{0}")]
    ReqwestError(#[from] REQWEST_ERROR),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Input fetch error: {0}")]
    InputFetchError(String),

    #[error("Invalid input: {0}")]
    InvalidInputError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Transport error: {0}")]
    TransportError(String),
}
