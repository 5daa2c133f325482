//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::Parser;

/// Dovetail MCP server - exposes the Dovetail API as MCP tools over stdio
#[derive(Parser, Debug)]
#[command(name = "dovetail-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to dovetail-mcp.yaml config file
    #[arg(short, long)]
    pub config: Option<Utf8PathBuf>,

    /// Dovetail API token
    #[arg(long, env = "DOVETAIL_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Dovetail API base URL
    #[arg(long, env = "DOVETAIL_URL")]
    pub base_url: Option<String>,

    /// Maximum retries per API request
    #[arg(long)]
    pub max_retries: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("DOVETAIL_API_TOKEN");
        std::env::remove_var("DOVETAIL_URL");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let cli = Cli::try_parse_from(["dovetail-mcp"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
        assert!(cli.api_token.is_none());
        assert!(cli.base_url.is_none());
        assert!(cli.max_retries.is_none());
    }

    #[test]
    #[serial]
    fn test_flags() {
        clear_env();
        let cli = Cli::try_parse_from([
            "dovetail-mcp",
            "-vv",
            "-c",
            "conf/dovetail-mcp.yaml",
            "--api-token",
            "abc",
            "--base-url",
            "http://localhost:8080/api/v1",
            "--max-retries",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some(camino::Utf8Path::new("conf/dovetail-mcp.yaml")));
        assert_eq!(cli.api_token.as_deref(), Some("abc"));
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8080/api/v1"));
        assert_eq!(cli.max_retries, Some(5));
    }

    #[test]
    #[serial]
    fn test_env_fallbacks() {
        clear_env();
        std::env::set_var("DOVETAIL_API_TOKEN", "from-env");
        std::env::set_var("DOVETAIL_URL", "https://example.test/api");

        let cli = Cli::try_parse_from(["dovetail-mcp"]).unwrap();
        clear_env();

        assert_eq!(cli.api_token.as_deref(), Some("from-env"));
        assert_eq!(cli.base_url.as_deref(), Some("https://example.test/api"));
    }

    #[test]
    #[serial]
    fn test_flag_beats_env() {
        clear_env();
        std::env::set_var("DOVETAIL_API_TOKEN", "from-env");

        let cli = Cli::try_parse_from(["dovetail-mcp", "--api-token", "from-flag"]).unwrap();
        clear_env();

        assert_eq!(cli.api_token.as_deref(), Some("from-flag"));
    }

    #[test]
    fn test_rejects_negative_retries() {
        assert!(Cli::try_parse_from(["dovetail-mcp", "--max-retries", "-1"]).is_err());
    }
}
