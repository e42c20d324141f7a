#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    if let Err(e) = brandpulse::run().await {
        eprintln!("Error running server: {}", e);
        std::process::exit(1);
    }
}
