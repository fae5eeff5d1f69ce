use std::time::Duration;
use tokio::time::sleep;
use lazy_static::lazy_static;
use actix_web::{web, App, HttpServer};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use crate::utils::config::Config;
use crate::utils::logging::*;
use crate::utils::log_entry::system::SystemEntry;
use crate::detection::detection_manager::DetectionManager;
use crate::web::api;

lazy_static! {
    static ref SPOTTER: RwLock<Spotter> = RwLock::new(Spotter::new());
}

pub struct Spotter {
    terminate: bool,
}

impl Spotter {
    fn new() -> Self {
        Self {
            terminate: false,
        }
    }

    pub async fn instance() -> RwLockReadGuard<'static, Self> {
        SPOTTER.read().await
    }

    pub async fn instance_mut() -> RwLockWriteGuard<'static, Self> {
        SPOTTER.write().await
    }

    pub async fn is_terminating() -> bool {
        Self::instance().await.terminate
    }

    pub async fn run() {
        Config::now().await;
        DetectionManager::run().await;
        let http_server = loop {
            let config = Config::now().await;
            let http_server = HttpServer::new(|| {
                App::new()
                    .service(web::scope("/api")
                        .service(api::detection::initialize())
                        .service(api::misc::initialize()))
            }).bind(format!("127.0.0.1:{}", config.http_server_bind_port));
            match http_server {
                Ok(http_server) => break http_server,
                Err(err) => {
                    logging_error!("Http service failed to bind port", format!("Err: {err}"));
                    sleep(Duration::from_secs(config.bind_retry_duration)).await;
                    continue;
                },
            }
        };
        logging_information!(SystemEntry::WebReady);
        logging_information!(SystemEntry::Online);
        if let Err(err) = http_server.run().await {
            logging_error!(SystemEntry::WebPanic(err));
        }
    }

    pub async fn terminate() {
        logging_information!(SystemEntry::Terminating);
        DetectionManager::terminate().await;
        Self::instance_mut().await.terminate = true;
        logging_information!(SystemEntry::TerminateComplete);
    }
}
