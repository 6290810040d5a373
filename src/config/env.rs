use std::env;

use super::{AppConfig, DEFAULT_CONN_DETAILS_ENDPOINT, utils::parse_bool};
use crate::errors::{AppError, AppResult};

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads configuration from environment variables with sensible
    /// defaults, loading a `.env` file first if one is present.
    ///
    /// # Errors
    /// Returns an error if a variable is present but malformed (bad
    /// boolean, non-numeric sample rate, zero channels).
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let conn_details_endpoint = env::var("CONN_DETAILS_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_CONN_DETAILS_ENDPOINT.to_string());

        let pre_connect_buffer = match env::var("PRE_CONNECT_BUFFER") {
            Ok(v) => parse_bool(&v)
                .ok_or_else(|| AppError::Config(format!("invalid PRE_CONNECT_BUFFER: {v}")))?,
            Err(_) => true,
        };

        let start_button_text =
            env::var("START_BUTTON_TEXT").unwrap_or_else(|_| "Start call".to_string());

        let sample_rate = match env::var("CAPTURE_SAMPLE_RATE") {
            Ok(v) => v
                .parse::<u32>()
                .map_err(|e| AppError::Config(format!("invalid CAPTURE_SAMPLE_RATE: {e}")))?,
            Err(_) => 48_000,
        };

        let channels = match env::var("CAPTURE_CHANNELS") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("invalid CAPTURE_CHANNELS: {e}")))?,
            Err(_) => 1,
        };
        if channels == 0 {
            return Err(AppError::Config(
                "CAPTURE_CHANNELS must be at least 1".to_string(),
            ));
        }

        Ok(AppConfig {
            conn_details_endpoint,
            pre_connect_buffer,
            start_button_text,
            sample_rate,
            channels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("CONN_DETAILS_ENDPOINT");
            env::remove_var("PRE_CONNECT_BUFFER");
            env::remove_var("START_BUTTON_TEXT");
            env::remove_var("CAPTURE_SAMPLE_RATE");
            env::remove_var("CAPTURE_CHANNELS");
        }
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        cleanup_env_vars();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.conn_details_endpoint, DEFAULT_CONN_DETAILS_ENDPOINT);
        assert!(config.pre_connect_buffer);
        assert_eq!(config.start_button_text, "Start call");
        assert_eq!(config.sample_rate, 48_000);
        assert_eq!(config.channels, 1);
    }

    #[test]
    #[serial]
    fn test_endpoint_override() {
        cleanup_env_vars();
        unsafe {
            env::set_var("CONN_DETAILS_ENDPOINT", "https://example.com/api/details");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.conn_details_endpoint, "https://example.com/api/details");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_pre_connect_buffer_disabled() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PRE_CONNECT_BUFFER", "no");
        }

        let config = AppConfig::from_env().unwrap();
        assert!(!config.pre_connect_buffer);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_invalid_boolean_rejected() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PRE_CONNECT_BUFFER", "maybe");
        }

        let result = AppConfig::from_env();
        assert!(matches!(result, Err(AppError::Config(_))));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_zero_channels_rejected() {
        cleanup_env_vars();
        unsafe {
            env::set_var("CAPTURE_CHANNELS", "0");
        }

        let result = AppConfig::from_env();
        assert!(matches!(result, Err(AppError::Config(_))));

        cleanup_env_vars();
    }
}
