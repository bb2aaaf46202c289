use std::fmt;

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    Auth(String),
    Api {
        method: &'static str,
        path: String,
        status: u16,
    },
    UnknownDevice(String),
    InvalidMode(String),
    InvalidSetPoints { heat_c: f64, cool_c: f64 },
    InvalidRequest(String),
    Config(String),
    Json(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Auth(msg) => write!(f, "authentication failed: {msg}"),
            Error::Api {
                method,
                path,
                status,
            } => write!(f, "request to Daikin API failed: {method} {path} ({status})"),
            Error::UnknownDevice(id) => write!(f, "unknown device: {id}"),
            Error::InvalidMode(mode) => write!(f, "invalid mode: {mode}"),
            Error::InvalidSetPoints { heat_c, cool_c } => {
                write!(f, "invalid set points: heat {heat_c}°C above cool {cool_c}°C")
            }
            Error::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
