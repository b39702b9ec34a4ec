use rocket::fairing::{Fairing, Info, Kind};
use rocket::tokio;
use rocket::{Orbit, Rocket};
use std::sync::Arc;
use std::time::Duration;

use crate::identity::IdentityProvider;
use crate::rate_limit::RateLimiter;

const SESSION_CLEANUP_MINUTES: u64 = 30;
const LIMITER_CLEANUP_MINUTES: u64 = 10;

pub struct BackgroundTasks;

#[rocket::async_trait]
impl Fairing for BackgroundTasks {
    fn info(&self) -> Info {
        Info {
            name: "Background Tasks",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        // Session and reset-token cleanup task
        if let Some(identity) = rocket.state::<Arc<dyn IdentityProvider>>() {
            let identity = Arc::clone(identity);
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_secs(SESSION_CLEANUP_MINUTES * 60)).await;
                    let id = Arc::clone(&identity);
                    match tokio::task::spawn_blocking(move || id.purge_expired()).await {
                        Ok(Ok(count)) if count > 0 => {
                            log::info!("[task] Cleaned up {} expired sessions and reset tokens", count)
                        }
                        Ok(Ok(_)) => {}
                        Ok(Err(e)) => log::error!("[task] Session cleanup failed: {}", e),
                        Err(e) => log::error!("[task] Session cleanup panicked: {}", e),
                    }
                }
            });
        }

        // Rate limiter cleanup task
        if let Some(limiter) = rocket.state::<Arc<RateLimiter>>() {
            let limiter = Arc::clone(limiter);
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_secs(LIMITER_CLEANUP_MINUTES * 60)).await;
                    limiter.cleanup(Duration::from_secs(15 * 60));
                }
            });
        }
    }
}
