use std::collections::BTreeSet;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::WebcamError;

pub const DEFAULT_EXCLUDED_CATEGORIES: &str = "Gaming,Sports,Film & Animation,Howto & Style";

pub const DEFAULT_SEARCH_QUERY: &str = "cam|webcam|live|beach|wildlife|aquarium|space|harbor|park|mountain|coast|city|traffic|nature|zoo -gameplay -playing -subscriber -donation -follower -facecam -reaction -chatting -gaming -fortnite -troll -asmr -twitch";

const DEFAULT_UPDATE_INTERVAL_HOURS: u64 = 5;
const DEFAULT_MAX_VIDEOS: usize = 1000;
const MIN_MAX_VIDEOS: usize = 100;
const DEFAULT_CONCURRENT_EXTRACTIONS: usize = 5;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // YouTube
    pub youtube_api_key: String,
    pub region_code: String,
    pub search_query: String,
    pub excluded_categories: BTreeSet<String>,

    // Cycle limits
    pub update_interval_hours: u64,
    pub max_videos: usize,
    pub concurrent_extractions: usize,

    // Resolver
    pub yt_dlp_bin: String,

    // Output + web server
    pub playlist_path: PathBuf,
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, WebcamError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Fails only when the API key is missing or the web port is not a port.
    /// Out-of-range or unparseable limits fall back to their defaults with a
    /// warning.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WebcamError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let youtube_api_key = get("YOUTUBE_API_KEY").ok_or_else(|| {
            WebcamError::Config("YOUTUBE_API_KEY environment variable is required".to_string())
        })?;

        let web_port = match get("WEB_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| WebcamError::Config(format!("WEB_PORT must be a port number, got {raw:?}")))?,
            None => 8000,
        };

        Ok(Self {
            youtube_api_key,
            region_code: get("REGION_CODE").unwrap_or_else(|| "US".to_string()),
            search_query: get("SEARCH_QUERY").unwrap_or_else(|| DEFAULT_SEARCH_QUERY.to_string()),
            excluded_categories: parse_category_list(
                &get("EXCLUDED_CATEGORIES").unwrap_or_else(|| DEFAULT_EXCLUDED_CATEGORIES.to_string()),
            ),
            update_interval_hours: bounded(
                "UPDATE_INTERVAL_HOURS",
                get("UPDATE_INTERVAL_HOURS"),
                DEFAULT_UPDATE_INTERVAL_HOURS,
                1,
            ),
            max_videos: bounded("MAX_VIDEOS", get("MAX_VIDEOS"), DEFAULT_MAX_VIDEOS, MIN_MAX_VIDEOS),
            concurrent_extractions: bounded(
                "CONCURRENT_EXTRACTIONS",
                get("CONCURRENT_EXTRACTIONS"),
                DEFAULT_CONCURRENT_EXTRACTIONS,
                1,
            ),
            yt_dlp_bin: get("YT_DLP_BIN").unwrap_or_else(|| "yt-dlp".to_string()),
            playlist_path: get("PLAYLIST_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("playlist.m3u8")),
            web_host: get("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port,
        })
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_hours * 3600)
    }

    pub fn web_addr(&self) -> String {
        format!("{}:{}", self.web_host, self.web_port)
    }

    /// Log the effective configuration with the API key masked.
    pub fn log_redacted(&self) {
        fn preview(val: &str) -> String {
            let head: String = val.chars().take(4).collect();
            format!("{}...({} chars)", head, val.chars().count())
        }

        let excluded: Vec<&str> = self.excluded_categories.iter().map(String::as_str).collect();

        tracing::info!("Config loaded:");
        tracing::info!("  YOUTUBE_API_KEY: {}", preview(&self.youtube_api_key));
        tracing::info!("  REGION_CODE: {}", self.region_code);
        tracing::info!("  SEARCH_QUERY: {}", self.search_query);
        tracing::info!("  EXCLUDED_CATEGORIES: {}", excluded.join(", "));
        tracing::info!("  UPDATE_INTERVAL_HOURS: {}", self.update_interval_hours);
        tracing::info!("  MAX_VIDEOS: {}", self.max_videos);
        tracing::info!("  CONCURRENT_EXTRACTIONS: {}", self.concurrent_extractions);
        tracing::info!("  YT_DLP_BIN: {}", self.yt_dlp_bin);
        tracing::info!("  PLAYLIST_PATH: {}", self.playlist_path.display());
        tracing::info!("  WEB: {}", self.web_addr());
    }
}

/// Default tracing directive from `LOG_LEVEL`. Read separately from
/// [`Config`] because the subscriber has to exist before config loading logs
/// anything.
pub fn log_level_from_env() -> String {
    log_level_from_lookup(|key| env::var(key).ok())
}

pub fn log_level_from_lookup<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("LOG_LEVEL")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "info".to_string())
}

fn parse_category_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn bounded<T>(key: &str, raw: Option<String>, default: T, min: T) -> T
where
    T: FromStr + PartialOrd + Display + Copy,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) if value >= min => value,
        Ok(value) => {
            tracing::warn!("{key} must be at least {min}, got {value}; using {default}");
            default
        }
        Err(_) => {
            tracing::warn!("{key} is not a number ({raw:?}); using {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, WebcamError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn api_key_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("YOUTUBE_API_KEY"));

        assert!(load(&[("YOUTUBE_API_KEY", "   ")]).is_err());
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("YOUTUBE_API_KEY", "secret")]).unwrap();
        assert_eq!(config.update_interval_hours, 5);
        assert_eq!(config.update_interval(), Duration::from_secs(5 * 3600));
        assert_eq!(config.max_videos, 1000);
        assert_eq!(config.concurrent_extractions, 5);
        assert_eq!(config.search_query, DEFAULT_SEARCH_QUERY);
        assert_eq!(config.playlist_path, PathBuf::from("playlist.m3u8"));
        assert_eq!(config.web_addr(), "0.0.0.0:8000");
        assert_eq!(config.region_code, "US");
        assert_eq!(config.yt_dlp_bin, "yt-dlp");

        let excluded: Vec<&str> = config.excluded_categories.iter().map(String::as_str).collect();
        assert_eq!(
            excluded,
            vec!["Film & Animation", "Gaming", "Howto & Style", "Sports"]
        );
    }

    #[test]
    fn excluded_categories_are_trimmed() {
        let config = load(&[
            ("YOUTUBE_API_KEY", "secret"),
            ("EXCLUDED_CATEGORIES", " Music , ,News & Politics,"),
        ])
        .unwrap();
        assert_eq!(config.excluded_categories.len(), 2);
        assert!(config.excluded_categories.contains("Music"));
        assert!(config.excluded_categories.contains("News & Politics"));
    }

    #[test]
    fn out_of_range_limits_fall_back_to_defaults() {
        let config = load(&[
            ("YOUTUBE_API_KEY", "secret"),
            ("UPDATE_INTERVAL_HOURS", "0"),
            ("MAX_VIDEOS", "99"),
            ("CONCURRENT_EXTRACTIONS", "lots"),
        ])
        .unwrap();
        assert_eq!(config.update_interval_hours, 5);
        assert_eq!(config.max_videos, 1000);
        assert_eq!(config.concurrent_extractions, 5);
    }

    #[test]
    fn valid_limits_are_kept() {
        let config = load(&[
            ("YOUTUBE_API_KEY", "secret"),
            ("UPDATE_INTERVAL_HOURS", "1"),
            ("MAX_VIDEOS", "100"),
            ("CONCURRENT_EXTRACTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(config.update_interval_hours, 1);
        assert_eq!(config.max_videos, 100);
        assert_eq!(config.concurrent_extractions, 12);
    }

    #[test]
    fn log_level_defaults_to_info() {
        assert_eq!(log_level_from_lookup(|_| None), "info");
        assert_eq!(log_level_from_lookup(|_| Some("  ".to_string())), "info");
        assert_eq!(
            log_level_from_lookup(|key| (key == "LOG_LEVEL").then(|| " debug ".to_string())),
            "debug"
        );
    }

    #[test]
    fn bad_web_port_is_an_error() {
        let err = load(&[("YOUTUBE_API_KEY", "secret"), ("WEB_PORT", "http")]).unwrap_err();
        assert!(matches!(err, WebcamError::Config(_)));
    }
}
