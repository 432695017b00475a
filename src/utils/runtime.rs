use anyhow::Result;

/// Everything the reminder does is sequential, so one thread is all the runtime gets.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
