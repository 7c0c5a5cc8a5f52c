use creator_discovery::build_rocket;
use creator_discovery::config::{create_app_state, create_cors, init_logger, load_environment};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    load_environment();
    init_logger();

    let state = create_app_state()?;
    let cors = create_cors()?;

    let _rocket = build_rocket(state)
        .attach(cors)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed to launch: {e}"))?;

    Ok(())
}
