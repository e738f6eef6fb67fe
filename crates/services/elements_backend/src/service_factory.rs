// --- File: crates/services/elements_backend/src/service_factory.rs ---
//! Builds the one scheduling client the whole process shares.

use elements_common::log_result;
use elements_common::services::{ApiError, SchedulingApi};
use elements_config::AppConfig;
use elements_cronofy::CronofyService;
use std::sync::Arc;
use tracing::info;

pub fn scheduling_api(config: &AppConfig) -> Result<Arc<dyn SchedulingApi>, ApiError> {
    let service = log_result(
        CronofyService::new(&config.cronofy),
        "Cronofy client built",
        "Cronofy client could not be built",
    )?;
    info!(
        "Cronofy client ready at {} (data center: {}, timeout: {}s)",
        service.api_base(),
        config.cronofy.data_center,
        config.cronofy.timeout_secs
    );
    Ok(Arc::new(service))
}
