use user_directory::error::StartupError;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    user_directory::run().await
}
