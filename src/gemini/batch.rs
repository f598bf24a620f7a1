use crate::{
    error::{Result, StudioError},
    gemini::traits::ImageGenerator,
    logger,
    models::GenerationRequest,
};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Issue `request.count` independent generations concurrently.
///
/// The result keeps issuance order regardless of completion order. The batch
/// is all-or-nothing: the first failure aborts the siblings still in flight
/// and is returned as the batch error.
pub async fn generate_batch(
    generator: Arc<dyn ImageGenerator>,
    request: &GenerationRequest,
) -> Result<Vec<String>> {
    if request.count <= 0 {
        return Ok(Vec::new());
    }

    let count = request.count as usize;
    let _timer = logger::timer(&format!("batch of {} image(s)", count));

    let mut tasks = JoinSet::new();
    for index in 0..count {
        let generator = Arc::clone(&generator);
        let reference = Arc::clone(&request.reference);
        let brand_name = Arc::clone(&request.brand_name);
        tasks.spawn(async move {
            let outcome = generator.generate_one(&reference, &brand_name).await;
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<String>> = vec![None; count];
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined.map_err(|e| {
            StudioError::Generation(format!("generation task did not complete: {}", e))
        })?;

        match outcome {
            Ok(uri) => slots[index] = Some(uri),
            Err(e) => {
                log::error!("Image {} of {} failed, abandoning batch: {}", index + 1, count, e);
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| StudioError::Generation("batch finished with missing images".into()))
}
