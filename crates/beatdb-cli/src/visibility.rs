use beatdb_core::{DataVisibility, DATA_VISIBILITY_KEY};

pub(crate) async fn run_show(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let visibility = beatdb_db::get_data_visibility(pool).await?;
    println!("store data is {visibility}");
    Ok(())
}

pub(crate) async fn run_set(pool: &sqlx::PgPool, value: DataVisibility) -> anyhow::Result<()> {
    beatdb_db::upsert_setting(pool, DATA_VISIBILITY_KEY, value.as_str()).await?;
    tracing::info!(visibility = %value, "updated data visibility");
    println!("store data is now {value}");
    Ok(())
}
