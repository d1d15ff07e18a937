//! Builders choosing between real and in-memory adapters for each port.

use std::io;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use cadence::domain::ports::{
    BlobStore, IdentityProvider, LessonRepository, ProfileRepository, ProgressRepository,
};
use cadence::inbound::http::state::HttpStatePorts;
use cadence::outbound::blob::FsBlobStore;
use cadence::outbound::identity::{HttpIdentityProvider, IdentityProviderSettings};
use cadence::outbound::memory::{
    InMemoryIdentityProvider, InMemoryLessonRepository, InMemoryProfileRepository,
    InMemoryProgressRepository,
};
use cadence::outbound::persistence::{
    DbPool, DieselLessonRepository, DieselProfileRepository, DieselProgressRepository,
    PoolConfig, run_pending_migrations,
};
use cadence::settings::AppSettings;

/// Store-backed ports.
struct StorePorts {
    profiles: Arc<dyn ProfileRepository>,
    lessons: Arc<dyn LessonRepository>,
    progress: Arc<dyn ProgressRepository>,
}

fn config_error(err: impl ToString) -> io::Error {
    io::Error::other(err.to_string())
}

async fn build_stores(settings: &AppSettings, clock: Arc<dyn Clock>) -> io::Result<StorePorts> {
    let Some(url) = settings.database_url() else {
        warn!("no database configured; using in-memory stores");
        return Ok(StorePorts {
            profiles: Arc::new(InMemoryProfileRepository::with_clock(clock)),
            lessons: Arc::new(InMemoryLessonRepository::default()),
            progress: Arc::new(InMemoryProgressRepository::default()),
        });
    };
    if settings.skip_migrations {
        info!("skipping embedded migrations");
    } else {
        run_pending_migrations(url.as_str())
            .await
            .map_err(config_error)?;
    }
    let mut pool_config = PoolConfig::new(url.as_str());
    if let Some(max) = settings.db_max_connections {
        pool_config = pool_config.with_max_size(max);
    }
    let pool = DbPool::new(pool_config).await.map_err(config_error)?;
    info!("connected to PostgreSQL");
    Ok(StorePorts {
        profiles: Arc::new(DieselProfileRepository::new(pool.clone())),
        lessons: Arc::new(DieselLessonRepository::new(pool.clone())),
        progress: Arc::new(DieselProgressRepository::new(pool)),
    })
}

fn build_identity(settings: &AppSettings) -> io::Result<Arc<dyn IdentityProvider>> {
    let Some(identity) = settings.identity().map_err(config_error)? else {
        warn!("no identity provider configured; sign-ups are confirmed in-process");
        return Ok(Arc::new(InMemoryIdentityProvider::default()));
    };
    let mut provider = IdentityProviderSettings::new(identity.base_url, identity.api_key.as_str());
    provider.reset_redirect = settings.reset_redirect().map_err(config_error)?;
    let adapter = HttpIdentityProvider::new(provider).map_err(config_error)?;
    Ok(Arc::new(adapter))
}

fn build_blobs(settings: &AppSettings) -> io::Result<Arc<dyn BlobStore>> {
    let root = settings.blob_root();
    let store = FsBlobStore::open(&root, settings.blob_base_url())?;
    info!(root = %root.display(), "lesson assets stored on disk");
    Ok(Arc::new(store))
}

/// Build every driven port from `settings`.
///
/// # Errors
///
/// Returns an I/O error when a configured adapter cannot be initialised.
pub async fn build_ports(settings: &AppSettings) -> io::Result<HttpStatePorts> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let stores = build_stores(settings, clock.clone()).await?;
    Ok(HttpStatePorts {
        identity: build_identity(settings)?,
        profiles: stores.profiles,
        lessons: stores.lessons,
        progress: stores.progress,
        blobs: build_blobs(settings)?,
        clock,
    })
}
