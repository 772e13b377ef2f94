//! Notifier repository for async database operations.
//!
//! Persists the `notifiers` base rows and each plugin's settings table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::SettingsStore;
use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::{
    NewNotifier, NotifierRecord, NotifierSettings, SettingsKind, TelegramSettingsRow,
};
use crate::schema::{notifiers, telegram_settings};

#[derive(Clone)]
pub struct NotifierRepository {
    pool: AsyncDbPool,
}

impl NotifierRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Finds the base record for a plugin
    pub async fn find_by_plugin(&self, name: &str) -> AppResult<Option<NotifierRecord>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AppError::ConnectionPool {
                source: anyhow::Error::from(e),
            })?;

        notifiers::table
            .filter(notifiers::plugin.eq(name))
            .select(NotifierRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }
}

#[async_trait]
impl SettingsStore for NotifierRepository {
    async fn load(&self, plugin: &str) -> AppResult<Option<NotifierSettings>> {
        let Some(kind) = SettingsKind::for_plugin(plugin) else {
            return Ok(None);
        };

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AppError::ConnectionPool {
                source: anyhow::Error::from(e),
            })?;

        match kind {
            SettingsKind::Telegram => {
                let row = telegram_settings::table
                    .inner_join(notifiers::table)
                    .filter(notifiers::plugin.eq(plugin))
                    .select(TelegramSettingsRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(AppError::from)?;

                Ok(row.map(|r| NotifierSettings::Telegram(r.into())))
            }
        }
    }

    /// Upserts the base row, then the plugin's settings row, in one transaction.
    async fn save(&self, plugin: &str, settings: &NotifierSettings) -> AppResult<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AppError::ConnectionPool {
                source: anyhow::Error::from(e),
            })?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let notifier_id: i32 = diesel::insert_into(notifiers::table)
                    .values(NewNotifier {
                        plugin,
                        is_enabled: false,
                    })
                    .on_conflict(notifiers::plugin)
                    .do_update()
                    .set(notifiers::plugin.eq(excluded(notifiers::plugin)))
                    .returning(notifiers::id)
                    .get_result(conn)
                    .await?;

                match settings {
                    NotifierSettings::Telegram(telegram) => {
                        let row = TelegramSettingsRow::from_settings(notifier_id, telegram);
                        diesel::insert_into(telegram_settings::table)
                            .values(&row)
                            .on_conflict(telegram_settings::id)
                            .do_update()
                            .set(&row)
                            .execute(conn)
                            .await?;
                    }
                }

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "save notifier settings"))
    }

    async fn set_enabled(&self, plugin: &str, enabled: bool) -> AppResult<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AppError::ConnectionPool {
                source: anyhow::Error::from(e),
            })?;

        diesel::insert_into(notifiers::table)
            .values(NewNotifier {
                plugin,
                is_enabled: enabled,
            })
            .on_conflict(notifiers::plugin)
            .do_update()
            .set(notifiers::is_enabled.eq(enabled))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }

    async fn is_enabled(&self, plugin: &str) -> AppResult<bool> {
        Ok(self
            .find_by_plugin(plugin)
            .await?
            .map(|record| record.is_enabled)
            .unwrap_or(false))
    }
}
