//! Application Startup
//!
//! Service wiring and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;

use crate::application::services::{
    AuthService, AuthServiceImpl, ChatService, ChatServiceImpl, JwtTokenIssuer, PasswordService,
    UserService, UserServiceImpl,
};
use crate::config::{RoomSeed, Settings, StorageBackend};
use crate::domain::{CredentialStore, MessageStore, PresenceStore, RoomMembership};
use crate::infrastructure::database;
use crate::infrastructure::memory::{InMemoryMessageStore, InMemoryRoomDirectory, InMemoryUserStore};
use crate::infrastructure::repositories::{PgMessageStore, PgRoomMembership, PgUserStore};
use crate::presentation::http::routes;
use crate::shared::clock::{Clock, SystemClock};
use crate::shared::error::{ServiceError, StoreError};
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub chat: Arc<dyn ChatService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the services over the given stores.
    ///
    /// `id_generator` must be the generator the message store assigns IDs
    /// from, so user IDs, presence sequences and message IDs share one
    /// monotonic source.
    pub fn from_stores<U, R, M>(
        settings: Settings,
        user_store: Arc<U>,
        rooms: Arc<R>,
        messages: Arc<M>,
        id_generator: Arc<SnowflakeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServiceError>
    where
        U: CredentialStore + PresenceStore + 'static,
        R: RoomMembership + 'static,
        M: MessageStore + 'static,
    {
        let passwords = Arc::new(PasswordService::new(&settings.password)?);
        let tokens = Arc::new(JwtTokenIssuer::new(&settings.jwt, clock.clone()));

        let auth = AuthServiceImpl::new(
            user_store.clone(),
            tokens,
            passwords,
            id_generator.clone(),
            clock.clone(),
        );
        let users = UserServiceImpl::new(user_store.clone(), id_generator, clock.clone());
        let chat = ChatServiceImpl::new(
            user_store,
            rooms,
            messages,
            settings.messages.clone(),
            clock,
        );

        Ok(Self {
            auth: Arc::new(auth),
            users: Arc::new(users),
            chat: Arc::new(chat),
            settings: Arc::new(settings),
        })
    }

    /// Process-local state with the rooms from `settings.rooms` created.
    /// The room directory is returned so further rooms can be seeded.
    pub fn in_memory(
        settings: Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, Arc<InMemoryRoomDirectory>), ServiceError> {
        let id_generator = Arc::new(snowflake_from(&settings));
        let rooms = Arc::new(InMemoryRoomDirectory::new());
        seed_rooms(&rooms, &settings.rooms, clock.now())?;

        let state = Self::from_stores(
            settings,
            Arc::new(InMemoryUserStore::new()),
            rooms.clone(),
            Arc::new(InMemoryMessageStore::new(id_generator.clone())),
            id_generator,
            clock,
        )?;

        Ok((state, rooms))
    }

    /// PostgreSQL-backed state.
    pub async fn postgres(settings: Settings, clock: Arc<dyn Clock>) -> Result<Self> {
        let db = database::create_pool(&settings.storage.database)
            .await
            .context("failed to connect to PostgreSQL")?;
        tracing::info!("Database connection pool created");

        if settings.storage.database.run_migrations {
            database::run_migrations(&db)
                .await
                .context("failed to run database migrations")?;
            tracing::info!("Database migrations applied");
        }

        let id_generator = Arc::new(snowflake_from(&settings));

        let state = Self::from_stores(
            settings,
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgRoomMembership::new(db.clone())),
            Arc::new(PgMessageStore::new(db, id_generator.clone())),
            id_generator,
            clock,
        )?;

        Ok(state)
    }
}

fn seed_rooms(
    directory: &InMemoryRoomDirectory,
    seeds: &[RoomSeed],
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    for seed in seeds {
        directory.create_room(seed.id, &seed.name, now);
        directory.set_open(seed.id, seed.open)?;
        for member in &seed.members {
            directory.add_member(seed.id, member.user_id, member.role)?;
        }
        tracing::debug!(room_id = seed.id, name = %seed.name, open = seed.open, "Room seeded");
    }
    Ok(())
}

fn snowflake_from(settings: &Settings) -> SnowflakeGenerator {
    SnowflakeGenerator::with_epoch(settings.snowflake.machine_id, settings.snowflake.epoch)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let addr = settings.server_addr();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let state = match settings.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!(
                    rooms = settings.rooms.len(),
                    "Using in-memory storage; state is lost on restart"
                );
                let (state, _rooms) = AppState::in_memory(settings, clock)?;
                state
            }
            StorageBackend::Postgres => AppState::postgres(settings, clock).await?,
        };

        let router = routes::create_router(state);

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
