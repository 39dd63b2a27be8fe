//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Which backing store the resolvers read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process records seeded from a JSON fixture file.
    Memory {
        /// Path to the fixture document.
        fixtures_path: PathBuf,
    },
    /// Firebase Realtime Database over its REST API.
    Realtime {
        /// Database root, e.g. "https://my-project-default-rtdb.firebaseio.com".
        database_url: String,
        /// Optional database secret or ID token passed as `?auth=`.
        auth_token: Option<String>,
    },
    /// Cloud Firestore over its REST API.
    Firestore {
        /// Google Cloud project id.
        project_id: String,
        /// Optional web API key passed as `?key=`.
        api_key: Option<String>,
    },
}

impl StoreBackend {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory { .. } => "memory",
            Self::Realtime { .. } => "realtime",
            Self::Firestore { .. } => "firestore",
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:3000").
    pub bind_addr: String,

    /// Public origin of the share pages, used for canonical URLs and default
    /// image assets. No trailing slash.
    pub base_url: String,

    /// URI scheme registered by the mobile app (e.g., "mealmingle").
    pub app_scheme: String,

    /// App Store page visitors land on when the app is not installed.
    pub app_store_url: String,

    /// Site name shown in titles and descriptions.
    pub site_name: String,

    /// Path of the share page template.
    pub template_path: PathBuf,

    /// Directory served for static assets and the landing page.
    pub static_dir: PathBuf,

    /// `max-age` for share page responses, in seconds.
    pub cache_max_age: u32,

    /// Upper bound for a single backing store lookup.
    pub lookup_timeout: Duration,

    /// Backing store selection.
    pub store: StoreBackend,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `FIREBASE_DATABASE_URL` when `UNFURL_STORE=realtime`
    /// - `FIREBASE_PROJECT_ID` when `UNFURL_STORE=firestore`
    ///
    /// Optional:
    /// - `UNFURL_BIND_ADDR`: Server bind address (default: "0.0.0.0:3000")
    /// - `UNFURL_BASE_URL`: Public origin (default: "https://meal-mingle.app")
    /// - `UNFURL_APP_SCHEME`: Deep link scheme (default: "mealmingle")
    /// - `UNFURL_APP_STORE_URL`: App Store fallback page
    /// - `UNFURL_SITE_NAME`: Site name (default: "Meal Mingle")
    /// - `UNFURL_TEMPLATE_PATH`: Share page template (default: "templates/share.html")
    /// - `UNFURL_STATIC_DIR`: Static asset directory (default: "public")
    /// - `UNFURL_CACHE_MAX_AGE`: Share page max-age in seconds (default: 300)
    /// - `UNFURL_LOOKUP_TIMEOUT_MS`: Per-lookup timeout (default: 3000)
    /// - `UNFURL_STORE`: "memory", "realtime" or "firestore" (default: "memory")
    /// - `UNFURL_FIXTURES_PATH`: Fixture file for the memory store (default: "fixtures/demo.json")
    /// - `FIREBASE_AUTH_TOKEN`: Realtime Database auth token
    /// - `FIREBASE_API_KEY`: Firestore API key
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("UNFURL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let base_url = std::env::var("UNFURL_BASE_URL")
            .unwrap_or_else(|_| "https://meal-mingle.app".to_string())
            .trim_end_matches('/')
            .to_string();

        let app_scheme = std::env::var("UNFURL_APP_SCHEME")
            .unwrap_or_else(|_| "mealmingle".to_string())
            .trim_end_matches("://")
            .to_string();

        let app_store_url = std::env::var("UNFURL_APP_STORE_URL").unwrap_or_else(|_| {
            "https://apps.apple.com/app/meal-mingle/id6754255710".to_string()
        });

        let site_name =
            std::env::var("UNFURL_SITE_NAME").unwrap_or_else(|_| "Meal Mingle".to_string());

        let template_path: PathBuf = std::env::var("UNFURL_TEMPLATE_PATH")
            .unwrap_or_else(|_| "templates/share.html".to_string())
            .into();

        let static_dir: PathBuf = std::env::var("UNFURL_STATIC_DIR")
            .unwrap_or_else(|_| "public".to_string())
            .into();

        let cache_max_age = match std::env::var("UNFURL_CACHE_MAX_AGE") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid UNFURL_CACHE_MAX_AGE '{raw}': {e}"))?,
            Err(_) => 300,
        };

        let lookup_timeout_ms: u64 = match std::env::var("UNFURL_LOOKUP_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid UNFURL_LOOKUP_TIMEOUT_MS '{raw}': {e}"))?,
            Err(_) => 3000,
        };

        let store = store_backend_from_env()?;

        tracing::info!(
            bind_addr = %bind_addr,
            base_url = %base_url,
            app_scheme = %app_scheme,
            site_name = %site_name,
            template_path = %template_path.display(),
            store = store.name(),
            lookup_timeout_ms,
            cache_max_age,
            "unfurl configuration loaded"
        );

        Ok(Self {
            bind_addr,
            base_url,
            app_scheme,
            app_store_url,
            site_name,
            template_path,
            static_dir,
            cache_max_age,
            lookup_timeout: Duration::from_millis(lookup_timeout_ms),
            store,
        })
    }
}

/// Read the `UNFURL_STORE` selection and the variables its backend needs.
fn store_backend_from_env() -> anyhow::Result<StoreBackend> {
    let kind = std::env::var("UNFURL_STORE")
        .unwrap_or_else(|_| "memory".to_string())
        .trim()
        .to_lowercase();

    let optional = |key: &str| {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    match kind.as_str() {
        "memory" => Ok(StoreBackend::Memory {
            fixtures_path: optional("UNFURL_FIXTURES_PATH")
                .unwrap_or_else(|| "fixtures/demo.json".to_string())
                .into(),
        }),
        "realtime" => {
            let database_url = optional("FIREBASE_DATABASE_URL").ok_or_else(|| {
                anyhow::anyhow!("FIREBASE_DATABASE_URL is required when UNFURL_STORE=realtime")
            })?;
            Ok(StoreBackend::Realtime {
                database_url: database_url.trim_end_matches('/').to_string(),
                auth_token: optional("FIREBASE_AUTH_TOKEN"),
            })
        }
        "firestore" => {
            let project_id = optional("FIREBASE_PROJECT_ID").ok_or_else(|| {
                anyhow::anyhow!("FIREBASE_PROJECT_ID is required when UNFURL_STORE=firestore")
            })?;
            Ok(StoreBackend::Firestore {
                project_id,
                api_key: optional("FIREBASE_API_KEY"),
            })
        }
        other => anyhow::bail!(
            "unknown UNFURL_STORE '{other}' (expected memory, realtime or firestore)"
        ),
    }
}
