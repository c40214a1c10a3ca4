//! Command-line interface.
//!
//! `admission-httpd -p <port> -maxclient <N> -maxtotal <M>`
//!
//! clap only knows single-character short flags, so the single-dash long
//! forms are rewritten to `--maxclient` / `--maxtotal` before parsing.

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::{read_config, validate_config, ConfigError, ServerConfig};

/// Long flags that are also accepted with a single dash.
const SINGLE_DASH_LONG_FLAGS: [&str; 2] = ["maxclient", "maxtotal"];

#[derive(Debug, Parser)]
#[command(name = "admission-httpd")]
#[command(about = "HTTP/1.0 static file server with per-client and global connection limits", long_about = None)]
pub struct Cli {
    /// TCP port to listen on
    #[arg(short = 'p', long = "port")]
    pub port: u16,

    /// Maximum concurrent connections per client session
    #[arg(long = "maxclient", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_client: u32,

    /// Maximum concurrent connections overall
    #[arg(long = "maxtotal", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_total: u32,

    /// Optional TOML configuration file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Document root (defaults to the working directory)
    #[arg(long = "root")]
    pub root: Option<PathBuf>,
}

impl Cli {
    /// Parse the process arguments, exiting with a usage error on failure.
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Merge defaults, the optional config file and these flags, then validate.
    pub fn resolve_config(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServerConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Overwrite config values with the ones given on the command line.
    pub fn apply(&self, config: &mut ServerConfig) {
        config.listener.port = self.port;
        config.limits.max_per_client = self.max_client as usize;
        config.limits.max_total = self.max_total as usize;
        if let Some(root) = &self.root {
            config.files.document_root = root.clone();
        }
    }
}

/// Rewrite `-maxclient` / `-maxtotal` (and `=value` forms) to double-dash.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let rewritten = arg.to_str().and_then(|s| {
                let rest = s.strip_prefix('-').filter(|r| !r.starts_with('-'))?;
                let name = rest.split('=').next().unwrap_or(rest);
                SINGLE_DASH_LONG_FLAGS
                    .contains(&name)
                    .then(|| OsString::from(format!("-{s}")))
            });
            rewritten.unwrap_or(arg)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(normalize_args(args.iter().copied()))
    }

    #[test]
    fn parses_single_dash_long_flags() {
        let cli = parse(&["admission-httpd", "-p", "20001", "-maxclient", "3", "-maxtotal", "10"]).unwrap();
        assert_eq!(cli.port, 20001);
        assert_eq!(cli.max_client, 3);
        assert_eq!(cli.max_total, 10);
        assert!(cli.config.is_none());
    }

    #[test]
    fn accepts_double_dash_and_equals_forms() {
        let cli = parse(&["admission-httpd", "--port=80", "--maxclient", "1", "-maxtotal=2"]).unwrap();
        assert_eq!(cli.port, 80);
        assert_eq!(cli.max_client, 1);
        assert_eq!(cli.max_total, 2);
    }

    #[test]
    fn missing_arguments_are_usage_errors() {
        assert!(parse(&["admission-httpd", "-p", "8080"]).is_err());
        assert!(parse(&["admission-httpd", "-maxclient", "1", "-maxtotal", "1"]).is_err());
    }

    #[test]
    fn malformed_values_are_usage_errors() {
        assert!(parse(&["admission-httpd", "-p", "http", "-maxclient", "1", "-maxtotal", "1"]).is_err());
        assert!(parse(&["admission-httpd", "-p", "1", "-maxclient", "0", "-maxtotal", "1"]).is_err());
        assert!(parse(&["admission-httpd", "-p", "1", "-maxclient", "1", "-maxtotal", "-4"]).is_err());
        assert!(parse(&["admission-httpd", "-p", "70000", "-maxclient", "1", "-maxtotal", "1"]).is_err());
    }

    #[test]
    fn normalize_leaves_other_args_alone() {
        let args = normalize_args(["bin", "-p", "1", "--root", "-maxclientx"]);
        assert_eq!(args, vec!["bin", "-p", "1", "--root", "-maxclientx"]);
    }

    #[test]
    fn flags_override_config() {
        let cli = parse(&["admission-httpd", "-p", "9000", "-maxclient", "2", "-maxtotal", "5", "--root", "/srv"]).unwrap();
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.limits.max_per_client, 2);
        assert_eq!(config.limits.max_total, 5);
        assert_eq!(config.files.document_root, PathBuf::from("/srv"));
    }

    #[test]
    fn invalid_file_values_fail_after_merge() {
        let path = std::env::temp_dir().join(format!("admission-httpd-cli-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[connection]\nread_buffer_bytes = 4\n").unwrap();
        let path_arg = path.to_string_lossy().into_owned();

        let cli = parse(&["admission-httpd", "-p", "9000", "-maxclient", "2", "-maxtotal", "5", "--config", &path_arg]).unwrap();
        match cli.resolve_config() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "connection.read_buffer_bytes");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        let _ = std::fs::remove_file(path);
    }
}
