use super::*;

pub async fn invalidate_cache_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Json(payload): Json<InvalidateCacheRequest>,
) -> ApiResult<StatusCode> {
    if !state
        .authorization_service
        .is_administrator(actor.actor_id())
        .await?
    {
        return Err(AppError::Forbidden(format!(
            "actor '{}' may not invalidate permission caches",
            actor.actor_id()
        ))
        .into());
    }

    let target = ActorId::new(payload.actor_id)?;
    state.authorization_service.invalidate_cache(target).await?;

    Ok(StatusCode::NO_CONTENT)
}
