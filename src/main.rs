use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

mod auth;
mod cli;
mod config;
mod credentials;
mod endpoints;
mod installer;
mod logging;
mod mods;
mod portal;
mod types;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    let settings = config::read_settings()?;
    let app_data = config::build_config(&settings)?;

    if cli::maybe_cli(&app_data).await? {
        return anyhow::Ok(());
    }

    let addr = "0.0.0.0";
    let port = app_data.port();
    let debug = app_data.debug();

    info!(
        "Installing mods into {} from {}",
        settings.mods_dir.display(),
        settings.portal_url
    );
    info!("Starting server on {}:{}", addr, port);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_data.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST"])
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(endpoints::configure)
    })
    .bind((addr, port))?;

    if debug {
        info!("Running in debug mode, using 1 thread.");
        server.workers(1).run().await?;
    } else {
        server.run().await?;
    }

    anyhow::Ok(())
}
