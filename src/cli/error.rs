use gnet::{Error, ErrorKind};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] Error),

    #[error("could not render output: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Api(Error::InvalidParameter { .. }) => 2,
            Self::Api(error) => match error.kind() {
                ErrorKind::Configuration => 2,
                ErrorKind::Client => 3,
                ErrorKind::Connection
                | ErrorKind::Timeout
                | ErrorKind::Server
                | ErrorKind::ExhaustedRetries => 4,
                ErrorKind::Parse => 5,
            },
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }

    /// Classification and origin, shown under `--verbose`.
    pub fn detail(&self) -> Option<String> {
        let Self::Api(error) = self else {
            return None;
        };

        let mut detail = format!("kind: {}", error.kind());
        if let Some(endpoint) = error.endpoint() {
            detail.push_str(&format!("\nendpoint: {endpoint}"));
        }
        if let Some(status) = error.status() {
            detail.push_str(&format!("\nstatus: {status}"));
        }
        if let Error::ExhaustedRetries { attempts, .. } = error {
            detail.push_str(&format!("\nattempts: {attempts}"));
        }
        Some(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_exit_codes() {
        let invalid = CliError::from(Error::InvalidParameter {
            name: "mmi",
            reason: "out of range".into(),
        });
        assert_eq!(invalid.exit_code(), 2);

        let not_found = CliError::from(Error::NotFound {
            endpoint: "/quake/x".into(),
            id: "x".into(),
        });
        assert_eq!(not_found.exit_code(), 3);

        let exhausted = CliError::from(Error::ExhaustedRetries {
            attempts: 4,
            last_error: Box::new(Error::Timeout {
                endpoint: "/quake".into(),
            }),
        });
        assert_eq!(exhausted.exit_code(), 4);

        let parse = CliError::from(Error::Parse {
            endpoint: "/quake".into(),
            message: "missing field".into(),
            raw_response: "{}".into(),
        });
        assert_eq!(parse.exit_code(), 5);

        let io = CliError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(io.exit_code(), 10);
        assert_eq!(io.detail(), None);
    }

    #[test]
    fn test_verbose_detail() {
        let error = CliError::from(Error::Client {
            endpoint: "/quake/bogus".into(),
            status: StatusCode::NOT_FOUND,
            body: String::new(),
        });

        let detail = error.detail().unwrap();
        assert!(detail.contains("kind: client"));
        assert!(detail.contains("endpoint: /quake/bogus"));
        assert!(detail.contains("status: 404 Not Found"));
    }
}
