use crate::{
    AppState,
    error::AppError,
    models::{OrgCategory, UserProfile, timestamp_now},
};

pub async fn get_profile(state: &AppState, user_id: &str) -> Result<UserProfile, AppError> {
    sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::not_found("PROFILE_NOT_FOUND", "Profile not found for the specified user_id")
        })
}

pub async fn create_profile(
    state: &AppState,
    user_id: &str,
    organization_name: &str,
    category: OrgCategory,
    mobile_number: &str,
) -> Result<UserProfile, AppError> {
    let exists = || AppError::conflict("PROFILE_EXISTS", "Profile already exists for this user");

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM user_profiles WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(exists());
    }

    let now = timestamp_now();
    let res = sqlx::query_as::<_, UserProfile>(
        r#"
        INSERT INTO user_profiles (user_id, organization_name, category, mobile_number, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(organization_name)
    .bind(category)
    .bind(mobile_number)
    .bind(&now)
    .bind(&now)
    .fetch_one(&state.db)
    .await;

    match res {
        Ok(profile) => Ok(profile),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(exists()),
        Err(e) => Err(e.into()),
    }
}
