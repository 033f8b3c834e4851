use clap::Parser;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable overriding the backend URL.
pub const API_URL_ENV: &str = "PRICING_API_URL";

/// Runtime configuration. Page size and upload limit are fixed
/// ([`crate::data::page::PAGE_SIZE`], [`crate::api::upload::MAX_UPLOAD_BYTES`]).
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "pricing-dashboard")]
#[command(about = "Desktop dashboard for the drug pricing backend", long_about = None)]
pub struct Config {
    /// Base URL of the pricing backend
    #[arg(
        long = "api-url",
        env = API_URL_ENV,
        default_value = DEFAULT_API_URL,
        value_parser = parse_base_url
    )]
    pub api_base_url: String,
}

/// Trimmed URL; a blank value falls back to the default.
fn parse_base_url(s: &str) -> Result<String, String> {
    let url = s.trim();
    if url.is_empty() {
        Ok(DEFAULT_API_URL.to_string())
    } else {
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("pricing-dashboard").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn flag_accepts_both_spellings() {
        assert_eq!(parse(&["--api-url", "http://flag:1"]).api_base_url, "http://flag:1");
        assert_eq!(parse(&["--api-url=http://flag:2"]).api_base_url, "http://flag:2");
    }

    #[test]
    fn blank_values_fall_back_to_default() {
        assert_eq!(parse(&["--api-url", "  "]).api_base_url, DEFAULT_API_URL);
        assert_eq!(parse_base_url(" http://host:9000 "), Ok("http://host:9000".to_string()));
    }

    #[test]
    fn without_flag_environment_or_default_applies() {
        let expected = std::env::var(API_URL_ENV)
            .ok()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        assert_eq!(parse(&[]).api_base_url, expected);
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        let err = Config::try_parse_from(["pricing-dashboard", "--port", "80"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
