use crate::{
    api::{assignment, attendance, dashboard, guard, site},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/guards")
                    // /guards
                    .service(
                        web::resource("")
                            .route(web::post().to(guard::create_guard))
                            .route(web::get().to(guard::list_guards)),
                    )
                    // /guards/detailed
                    .service(
                        web::resource("/detailed")
                            .route(web::get().to(guard::list_guards_detailed)),
                    )
                    // /guards/me
                    .service(web::resource("/me").route(web::get().to(guard::my_profile)))
                    // /guards/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(guard::get_guard))
                            .route(web::put().to(guard::update_guard))
                            .route(web::delete().to(guard::delete_guard)),
                    ),
            )
            .service(
                web::scope("/sites")
                    // /sites
                    .service(
                        web::resource("")
                            .route(web::post().to(site::create_site))
                            .route(web::get().to(site::list_sites)),
                    )
                    // /sites/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(site::get_site))
                            .route(web::put().to(site::update_site)),
                    )
                    // /sites/{id}/posts
                    .service(
                        web::resource("/{id}/posts")
                            .route(web::post().to(site::create_site_post))
                            .route(web::get().to(site::list_site_posts)),
                    ),
            )
            .service(
                web::scope("/assignments")
                    // /assignments
                    .service(
                        web::resource("")
                            .route(web::post().to(assignment::create_assignment))
                            .route(web::get().to(assignment::list_assignments)),
                    )
                    // /assignments/shift-types (before the {id} matcher)
                    .service(
                        web::resource("/shift-types")
                            .route(web::get().to(assignment::list_shift_types)),
                    )
                    // /assignments/guard/{guard_id}
                    .service(
                        web::resource("/guard/{guard_id}")
                            .route(web::get().to(assignment::list_by_guard)),
                    )
                    // /assignments/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(assignment::cancel_assignment)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance/check-in
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    // /attendance/check-out
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    // /attendance/today
                    .service(
                        web::resource("/today").route(web::get().to(attendance::today_summary)),
                    )
                    // /attendance/guard/{guard_id}
                    .service(
                        web::resource("/guard/{guard_id}")
                            .route(web::get().to(attendance::by_guard)),
                    ),
            )
            .service(
                web::scope("/dashboard")
                    // /dashboard/admin-summary
                    .service(
                        web::resource("/admin-summary")
                            .route(web::get().to(dashboard::admin_summary)),
                    )
                    // /dashboard/manager-summary
                    .service(
                        web::resource("/manager-summary")
                            .route(web::get().to(dashboard::manager_summary)),
                    )
                    // /dashboard/guard-summary
                    .service(
                        web::resource("/guard-summary")
                            .route(web::get().to(dashboard::guard_summary)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
