use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub listen: Option<String>,
    // Sanity project to query. Overridable with SANITY_PROJECT_ID
    // (the legacy SANITY_PROJECTID spelling is accepted too).
    pub project_id: String,
    // Dataset within the project. Overridable with SANITY_DATASET.
    pub dataset: String,
    // Read token for private datasets. Overridable with SANITY_TOKEN.
    // When set, the CDN host is never used.
    pub token: Option<String>,
    pub use_cdn: bool,
    // Sanity API version path segment, e.g. "v2021-10-21".
    pub api_version: String,
    // Overrides the derived https://{project}.api[cdn].sanity.io origin.
    // Meant for self-hosted gateways and tests.
    pub base_url: Option<String>,
    // Total timeout in seconds for the outbound query. Defaults to 30.
    pub timeout_secs: Option<u64>,
    // Connection timeout in seconds for establishing the upstream connection.
    // If not set, uses reqwest's default behavior.
    pub connect_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen: None,
            project_id: "0q6ju337".to_string(),
            dataset: "production".to_string(),
            token: None,
            use_cdn: true,
            api_version: "v2021-10-21".to_string(),
            base_url: None,
            timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

impl Config {
    /// Loads the TOML file at `path` (defaults apply when the file does not
    /// exist), then overlays the SANITY_* environment variables.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let mut cfg = if Path::new(path).exists() {
            let cfg_str = fs::read_to_string(path)?;
            toml::from_str(&cfg_str)?
        } else {
            Config::default()
        };
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Some(id) =
            env_nonempty("SANITY_PROJECT_ID").or_else(|| env_nonempty("SANITY_PROJECTID"))
        {
            self.project_id = id;
        }
        if let Some(ds) = env_nonempty("SANITY_DATASET") {
            self.dataset = ds;
        }
        if let Some(token) = env_nonempty("SANITY_TOKEN") {
            self.token = Some(token);
        }
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hosted_project() {
        let cfg = Config::default();
        assert_eq!(cfg.project_id, "0q6ju337");
        assert_eq!(cfg.dataset, "production");
        assert!(cfg.use_cdn);
        assert!(cfg.token.is_none());
    }

    // Asserts only on fields the env overlay never touches, since the
    // overlay test mutates process-global SANITY_* variables.
    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load("does-not-exist.toml").expect("load");
        assert_eq!(cfg.api_version, "v2021-10-21");
        assert!(cfg.use_cdn);
    }

    #[test]
    fn parse_example_config() {
        let s = fs::read_to_string("config.toml.example").expect("read example config");
        let cfg: Config = toml::from_str(&s).expect("parse example toml");
        assert!(
            cfg.listen.is_some(),
            "example config should set a listen address"
        );
    }

    // Environment overlay tests share process-global state, so they live in
    // a single test function.
    #[test]
    fn env_overlay_takes_precedence() {
        std::env::set_var("SANITY_DATASET", "staging");
        std::env::set_var("SANITY_PROJECTID", "abc123de");
        let mut cfg = Config::default();
        cfg.apply_env();
        assert_eq!(cfg.dataset, "staging");
        assert_eq!(cfg.project_id, "abc123de", "legacy spelling should apply");

        // The canonical spelling wins over the legacy one
        std::env::set_var("SANITY_PROJECT_ID", "zyx987wv");
        let mut cfg = Config::default();
        cfg.apply_env();
        assert_eq!(cfg.project_id, "zyx987wv");

        // The overlay also wins over values sourced from a config file
        let mut cfg: Config = toml::from_str(
            r#"
            project_id = "file1234"
            dataset = "filedata"
            "#,
        )
        .expect("parse");
        cfg.apply_env();
        assert_eq!(cfg.project_id, "zyx987wv", "env should override the file");
        assert_eq!(cfg.dataset, "staging", "env should override the file");

        std::env::remove_var("SANITY_DATASET");
        std::env::remove_var("SANITY_PROJECTID");
        std::env::remove_var("SANITY_PROJECT_ID");
    }
}
