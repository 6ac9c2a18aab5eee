use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    routes::{health_check_route, search_profiles_route},
    services::ProfileSearch,
};

pub fn run(listener: TcpListener, profile_search: ProfileSearch) -> Result<Server, std::io::Error> {
    let profile_search = web::Data::new(profile_search);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(
                web::JsonConfig::default().error_handler(search_profiles_route::json_error_handler),
            )
            .service(health_check_route::health_check)
            .service(search_profiles_route::search_profiles)
            .app_data(profile_search.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
