use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::dto::settings_dto::{PlatformSettings, UpdateSettingsRequest};
use crate::error::Result;

const SETTINGS_KEY: &str = "platform";

/// Storage adapter behind the settings service; tests inject a fake.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<JsonValue>>;
    async fn write(&self, key: &str, value: JsonValue) -> Result<()>;
}

pub struct PgSettingsStore {
    pool: PgPool,
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn read(&self, key: &str) -> Result<Option<JsonValue>> {
        let value: Option<JsonValue> =
            sqlx::query_scalar(r#"SELECT value FROM platform_settings WHERE key = $1"#)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn write(&self, key: &str, value: JsonValue) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO platform_settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
}

impl SettingsService {
    pub fn postgres(pool: PgPool) -> Self {
        Self::with_store(Arc::new(PgSettingsStore { pool }))
    }

    pub fn with_store(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Current settings; defaults apply until an admin has saved a document.
    pub async fn get(&self) -> Result<PlatformSettings> {
        match self.store.read(SETTINGS_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(PlatformSettings::default()),
        }
    }

    pub async fn update(&self, patch: UpdateSettingsRequest) -> Result<PlatformSettings> {
        let mut settings = self.get().await?;
        if let Some(site_name) = patch.site_name {
            settings.site_name = site_name;
        }
        if let Some(welcome_message) = patch.welcome_message {
            settings.welcome_message = welcome_message;
        }
        if let Some(support_email) = patch.support_email {
            settings.support_email = support_email;
        }
        if let Some(maintenance_mode) = patch.maintenance_mode {
            settings.maintenance_mode = maintenance_mode;
        }

        self.store
            .write(SETTINGS_KEY, serde_json::to_value(&settings)?)
            .await?;
        Ok(settings)
    }
}
