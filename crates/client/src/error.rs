use catalink_config::ConfigError;

/// Failures talking to either registry.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Credentials rejected, or a call was made before authenticating.
    #[error("{service} auth failed ({status}): {message}")]
    Auth {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Any other non-2xx response.
    #[error("{service} error ({status}): {message}")]
    Http {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Connection reset, timeout, DNS. Not retried.
    #[error("{service} request failed: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} response invalid: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    #[error("{service} TLS setup failed: {message}")]
    Tls {
        service: &'static str,
        message: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    pub(crate) fn parse(service: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            service,
            message: message.into(),
        }
    }
}
