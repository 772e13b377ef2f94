//! `value_parser` functions for arguments clap cannot check on its own.

use std::net::Ipv4Addr;
use std::path::PathBuf;

pub fn validate_port(value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(0) => Err("Port must be between 1 and 65535. Port 0 is not allowed.".to_string()),
        Ok(port) => Ok(port),
        Err(_) => Err(format!(
            "Port must be a valid number between 1 and 65535, got: '{}'",
            value
        )),
    }
}

/// The file must exist and be readable.
pub fn validate_config_file_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.is_file() {
        return Err(format!("Configuration file does not exist: '{}'", value));
    }
    std::fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("Cannot read configuration file '{}': {}", value, e))
}

pub fn validate_rollback_steps(value: &str) -> Result<u32, String> {
    let steps: u32 = value.parse().map_err(|_| {
        format!(
            "Rollback steps must be a valid positive number, got: '{}'",
            value
        )
    })?;

    match steps {
        0 => Err("Rollback steps must be greater than 0".to_string()),
        s if s > 100 => Err("Rollback steps cannot exceed 100".to_string()),
        s => Ok(s),
    }
}

/// Accepts `localhost`, dotted IPv4 and plain hostnames.
pub fn validate_host_address(value: &str) -> Result<String, String> {
    let host = value.trim();

    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }
    if host.contains(char::is_whitespace) {
        return Err("Host address cannot contain spaces".to_string());
    }
    if host.len() > 253 {
        return Err("Host address is too long (maximum 253 characters)".to_string());
    }
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') && host.parse::<Ipv4Addr>().is_err()
    {
        return Err(format!("Invalid IPv4 address format: '{}'", value));
    }

    Ok(host.to_string())
}

/// Message bodies sent with `notify` must carry some text.
pub fn validate_message_text(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        return Err("Message text cannot be empty".to_string());
    }
    Ok(value.to_string())
}

pub fn validate_link_url(value: &str) -> Result<String, String> {
    reqwest::Url::parse(value)
        .map(|_| value.to_string())
        .map_err(|e| format!("Invalid URL '{}': {}", value, e))
}
