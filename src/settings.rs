use serde::{Deserialize, Serialize};
use std::fs;

use crate::payments::CatalogEntry;
use crate::utils::crypto::generate_secret;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DaringSettings {
    pub application: ApplicationSettings,
    pub routes: RouteSettings,
    pub session: SessionSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingSettings,
    pub identity: IdentitySettings,
    pub payments: PaymentSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub redirect_base_url: String,
    pub cors_origins: String,
}

/// Site destinations the callback resolver navigates to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RouteSettings {
    pub home_path: String,
    pub sign_in_path: String,
    pub password_update_path: String,
    pub callback_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Secret the storage cookie encryption key is derived from
    pub session_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    /// Base URL of the Supabase project, e.g. `https://abc.supabase.co`
    pub url: String,

    // Direct value (can be overridden by environment variable)
    pub anon_key: Option<String>,
    // Environment variable name for override
    pub anon_key_env: Option<String>,

    /// External providers offered on the sign-in page
    pub providers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSettings {
    pub api_base_url: String,

    // Direct value (can be overridden by environment variable)
    pub secret_key: Option<String>,
    // Environment variable name for override
    pub secret_key_env: Option<String>,

    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,

    /// When non-empty, checkout prices come from here rather than the request
    pub catalog: Vec<CatalogEntry>,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            redirect_base_url: "http://localhost:8080".to_string(),
            cors_origins: "http://localhost:3000,http://localhost:8080".to_string(),
        }
    }
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            home_path: "/".to_string(),
            sign_in_path: "/auth/sign_in".to_string(),
            password_update_path: "/update-password".to_string(),
            callback_path: "/auth/callback".to_string(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_secret: String::new(), // Will be generated if empty
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true, // Default to secure cookies
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: None,
            anon_key_env: Some("SUPABASE_ANON_KEY".to_string()),
            providers: vec!["google".to_string()],
        }
    }
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.stripe.com".to_string(),
            secret_key: None,
            secret_key_env: Some("STRIPE_SECRET_KEY".to_string()),
            currency: "usd".to_string(),
            success_url: "http://localhost:3000/success?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "http://localhost:3000/cancel".to_string(),
            catalog: Vec::new(),
        }
    }
}

impl DaringSettings {
    /// Load settings from configuration files and environment variables,
    /// then initialize logging at the configured level
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read or parsed
    /// - Logger initialization fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_env_file();

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(settings.logging.level.as_str()),
        )
        .try_init()?;

        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `DARING_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read or parsed
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_file(&default_config_path)?;
            println!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(secrets_dir) = std::env::var("DARING_SECRETS_DIR") {
            let secrets_path = std::path::Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_file(&secrets_path)?;
                println!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                println!(
                    "ℹ DARING_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a settings file; missing sections and fields keep their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let toml_content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&toml_content)?)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_logging_env_overrides(&mut settings.logging);
        Self::apply_identity_env_overrides(&mut settings.identity);
        Self::apply_payment_env_overrides(&mut settings.payments);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(redirect_base_url) = std::env::var("REDIRECT_BASE_URL") {
            app_settings.redirect_base_url = redirect_base_url;
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
    }

    /// Apply environment overrides for session settings, generating a
    /// secret when none is configured
    pub fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        let env_secret_set = std::env::var("SESSION_SECRET").is_ok_and(|secret| {
            if secret.is_empty() {
                false
            } else {
                session_settings.session_secret = secret;
                true
            }
        });

        if !env_secret_set && session_settings.session_secret.is_empty() {
            session_settings.session_secret = generate_secret(32);
            Self::warn_about_generated_secret();
        }
    }

    fn warn_about_generated_secret() {
        eprintln!("⚠️  WARNING: Using auto-generated session secret");
        eprintln!("🔒 For production use, set the SESSION_SECRET environment variable");
        eprintln!("   or configure session_secret in Settings.toml");
        eprintln!("💡 Saved sign-in destinations will not survive a restart");
    }

    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = cookie_secure;
            }
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    fn apply_identity_env_overrides(identity_settings: &mut IdentitySettings) {
        if let Ok(url) = std::env::var("IDENTITY_URL") {
            identity_settings.url = url;
        }
    }

    fn apply_payment_env_overrides(payment_settings: &mut PaymentSettings) {
        if let Ok(api_base_url) = std::env::var("STRIPE_API_BASE_URL") {
            payment_settings.api_base_url = api_base_url;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Absolute URL the identity provider sends users back to
    #[must_use]
    pub fn get_callback_url(&self) -> String {
        format!(
            "{}{}",
            self.application.redirect_base_url.trim_end_matches('/'),
            self.routes.callback_path
        )
    }
}

impl IdentitySettings {
    /// Get the anon key, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_anon_key(&self) -> Option<String> {
        if let Some(env_var) = &self.anon_key_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.anon_key.clone()
    }

    #[must_use]
    pub fn is_provider_enabled(&self, provider: &str) -> bool {
        self.providers.iter().any(|p| p == provider)
    }
}

impl PaymentSettings {
    /// Get the secret key, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_secret_key(&self) -> Option<String> {
        if let Some(env_var) = &self.secret_key_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.secret_key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clean_env_vars() {
        for var in [
            "SESSION_SECRET",
            "HOST",
            "PORT",
            "REDIRECT_BASE_URL",
            "CORS_ORIGINS",
            "COOKIE_SECURE",
            "IDENTITY_URL",
            "STRIPE_API_BASE_URL",
            "DARING_TEST_ANON_KEY",
            "DARING_TEST_STRIPE_KEY",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_routes() {
        let routes = RouteSettings::default();
        assert_eq!(routes.home_path, "/");
        assert_eq!(routes.sign_in_path, "/auth/sign_in");
        assert_eq!(routes.password_update_path, "/update-password");
        assert_eq!(routes.callback_path, "/auth/callback");
    }

    #[test]
    #[serial]
    fn test_session_secret_env_override() {
        clean_env_vars();

        let mut session_settings = SessionSettings {
            session_secret: "default-secret".to_string(),
        };
        std::env::set_var("SESSION_SECRET", "env-override-secret");

        DaringSettings::apply_session_env_overrides(&mut session_settings);

        assert_eq!(session_settings.session_secret, "env-override-secret");
        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_session_secret_auto_generation() {
        clean_env_vars();

        let mut first = SessionSettings::default();
        let mut second = SessionSettings::default();
        DaringSettings::apply_session_env_overrides(&mut first);
        DaringSettings::apply_session_env_overrides(&mut second);

        // Base64 encoded 32 bytes is 44 chars
        assert_eq!(first.session_secret.len(), 44);
        assert_ne!(first.session_secret, second.session_secret);
        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_application_env_overrides() {
        clean_env_vars();
        std::env::set_var("PORT", "9090");
        std::env::set_var("REDIRECT_BASE_URL", "https://daringdifferent.com");
        std::env::set_var("COOKIE_SECURE", "false");

        let mut settings = DaringSettings::default();
        settings.session.session_secret = "fixed".to_string();
        DaringSettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.application.port, 9090);
        assert!(!settings.cookies.secure);
        assert_eq!(
            settings.get_callback_url(),
            "https://daringdifferent.com/auth/callback"
        );
        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_invalid_port_keeps_default() {
        clean_env_vars();
        std::env::set_var("PORT", "not-a-port");

        let mut settings = DaringSettings::default();
        settings.session.session_secret = "fixed".to_string();
        DaringSettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.application.port, 8080);
        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_keys_prefer_environment() {
        clean_env_vars();
        let identity = IdentitySettings {
            anon_key: Some("direct-anon".to_string()),
            anon_key_env: Some("DARING_TEST_ANON_KEY".to_string()),
            ..Default::default()
        };
        let payments = PaymentSettings {
            secret_key: Some("sk_test_direct".to_string()),
            secret_key_env: Some("DARING_TEST_STRIPE_KEY".to_string()),
            ..Default::default()
        };

        assert_eq!(identity.get_anon_key().as_deref(), Some("direct-anon"));
        assert_eq!(payments.get_secret_key().as_deref(), Some("sk_test_direct"));

        std::env::set_var("DARING_TEST_ANON_KEY", "env-anon");
        std::env::set_var("DARING_TEST_STRIPE_KEY", "sk_test_env");

        assert_eq!(identity.get_anon_key().as_deref(), Some("env-anon"));
        assert_eq!(payments.get_secret_key().as_deref(), Some("sk_test_env"));
        clean_env_vars();
    }

    #[test]
    fn test_settings_file_with_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[application]
port = 7000

[routes]
home_path = "/episodes"

[identity]
url = "https://project.supabase.co"
providers = ["google", "github"]

[[payments.catalog]]
name = "Daring Different (hardcover)"
unit_amount = 2999
"#
        )
        .unwrap();

        let settings = DaringSettings::from_file(file.path()).unwrap();

        assert_eq!(settings.application.port, 7000);
        assert_eq!(settings.application.host, "0.0.0.0");
        assert_eq!(settings.routes.home_path, "/episodes");
        assert_eq!(settings.routes.sign_in_path, "/auth/sign_in");
        assert_eq!(settings.identity.url, "https://project.supabase.co");
        assert!(settings.identity.is_provider_enabled("github"));
        assert!(!settings.identity.is_provider_enabled("apple"));
        assert_eq!(settings.payments.currency, "usd");
        assert_eq!(settings.payments.catalog.len(), 1);
        assert_eq!(settings.payments.catalog[0].unit_amount, 2999);
        assert_eq!(settings.payments.catalog[0].image, None);
    }

    #[test]
    fn test_cors_origins_split() {
        let mut settings = DaringSettings::default();
        settings.application.cors_origins = "https://a.com, https://b.com,".to_string();
        assert_eq!(
            settings.get_cors_origins(),
            vec!["https://a.com".to_string(), "https://b.com".to_string()]
        );
    }
}
