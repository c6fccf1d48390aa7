//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: schedulers and scripts rely
//! on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain      | Description                                  |
//! |---------|-------------|----------------------------------------------|
//! | 0       | Universal   | Success (deferred ambiguities included)      |
//! | 1       | Universal   | General error (unspecified)                  |
//! | 2       | Universal   | CLI usage error (bad args)                   |
//! | 10-19   | config      | Config file, validation, provider selection  |
//! | 20-29   | upstream    | Registry / catalog authentication and calls  |
//! | 30-39   | review      | Manual-review artifact                       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the mapping functions below

use catalink_client::ClientError;
use catalink_config::ConfigError;
use catalink_linker::LinkerError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - run completed, even if ambiguities were deferred.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown subcommand.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Config (10-19)
// =============================================================================

/// Config missing, unreadable, malformed or invalid; unknown provider tag;
/// unusable TLS material. Always raised before any network call.
pub const EXIT_CONFIG: u8 = 10;

// =============================================================================
// Upstream (20-29)
// =============================================================================

/// Credentials rejected by Immuta or the catalog provider (any non-2xx on
/// authenticate, 401/403 elsewhere).
pub const EXIT_AUTH: u8 = 20;

/// Network failure, unexpected status, or malformed response body.
pub const EXIT_UPSTREAM: u8 = 21;

// =============================================================================
// Review (30-39)
// =============================================================================

/// Manual-review artifact could not be written. Its JSON was emitted on
/// stdout instead.
pub const EXIT_REVIEW_PERSIST: u8 = 30;

// =============================================================================
// Error mapping
// =============================================================================

pub fn config_exit_code(_err: &ConfigError) -> u8 {
    EXIT_CONFIG
}

pub fn client_exit_code(err: &ClientError) -> u8 {
    match err {
        ClientError::Auth { .. } => EXIT_AUTH,
        ClientError::Http { .. } | ClientError::Network { .. } | ClientError::Parse { .. } => {
            EXIT_UPSTREAM
        }
        ClientError::Tls { .. } => EXIT_CONFIG,
        ClientError::Config(e) => config_exit_code(e),
    }
}

pub fn linker_exit_code(err: &LinkerError) -> u8 {
    match err {
        LinkerError::Client(e) => client_exit_code(e),
        LinkerError::Persistence { .. } => EXIT_REVIEW_PERSIST,
        LinkerError::Serialize(_) => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_map_to_config() {
        let err = ConfigError::UnknownProvider("alation".into());
        assert_eq!(config_exit_code(&err), EXIT_CONFIG);
        assert_eq!(client_exit_code(&ClientError::Config(err)), EXIT_CONFIG);
    }

    #[test]
    fn test_client_errors() {
        let auth = ClientError::Auth {
            service: "Collibra",
            status: 401,
            message: "Invalid credentials".into(),
        };
        assert_eq!(client_exit_code(&auth), EXIT_AUTH);

        let http = ClientError::Http {
            service: "Immuta",
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(client_exit_code(&http), EXIT_UPSTREAM);

        let tls = ClientError::Tls {
            service: "Immuta",
            message: "cannot read CA".into(),
        };
        assert_eq!(client_exit_code(&tls), EXIT_CONFIG);
    }

    #[test]
    fn test_linker_errors() {
        let persist = LinkerError::Persistence {
            dir: "results".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(linker_exit_code(&persist), EXIT_REVIEW_PERSIST);

        let wrapped = LinkerError::Client(ClientError::Auth {
            service: "Immuta",
            status: 401,
            message: "Invalid API key".into(),
        });
        assert_eq!(linker_exit_code(&wrapped), EXIT_AUTH);
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_CONFIG,
            EXIT_AUTH,
            EXIT_UPSTREAM,
            EXIT_REVIEW_PERSIST,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }
}
