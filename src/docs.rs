use crate::api::assignment::CreateAssignment;
use crate::api::guard::{CreateGuardRequest, GuardDetailResponse};
use crate::api::site::{CreateSite, CreateSitePost, SiteResponse, UpdateSite};
use crate::model::assignment::Assignment;
use crate::model::attendance::Attendance;
use crate::model::guard::Guard;
use crate::model::shift_type::ShiftType;
use crate::model::site::{Site, SitePost};
use crate::service::summary::{AdminSummary, GuardSummary, ManagerSummary};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SGMS API",
        version = "1.0.0",
        description = r#"
## Security Guard Management System (SGMS)

This API powers a **Security Guard Management System** that tracks guard
workforce assignments and attendance, and serves role-scoped dashboards.

### 🔹 Key Features
- **Guard Management**
  - Create, update, list, and view guard profiles (with supervisor links)
- **Site & Post Management**
  - Sites, duty posts, and shift type reference data
- **Assignment Management**
  - Date-ranged guard-to-post assignments with deterministic resolution
- **Attendance Management**
  - Daily check-in and check-out tracking with lateness detection
- **Dashboards**
  - Admin, supervisor, and guard summaries scoped by role

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Administrative operations require the **Admin** role; supervisors and
guards only ever see their own scope.

### 📦 Response Format
- JSON-based RESTful responses

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::guard::create_guard,
        crate::api::guard::list_guards,
        crate::api::guard::list_guards_detailed,
        crate::api::guard::my_profile,
        crate::api::guard::get_guard,
        crate::api::guard::update_guard,
        crate::api::guard::delete_guard,

        crate::api::site::create_site,
        crate::api::site::list_sites,
        crate::api::site::get_site,
        crate::api::site::update_site,
        crate::api::site::create_site_post,
        crate::api::site::list_site_posts,

        crate::api::assignment::create_assignment,
        crate::api::assignment::list_assignments,
        crate::api::assignment::list_by_guard,
        crate::api::assignment::cancel_assignment,
        crate::api::assignment::list_shift_types,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today_summary,
        crate::api::attendance::by_guard,

        crate::api::dashboard::admin_summary,
        crate::api::dashboard::manager_summary,
        crate::api::dashboard::guard_summary
    ),
    components(
        schemas(
            Guard,
            Site,
            SitePost,
            ShiftType,
            Assignment,
            Attendance,
            CreateGuardRequest,
            GuardDetailResponse,
            CreateSite,
            UpdateSite,
            CreateSitePost,
            SiteResponse,
            CreateAssignment,
            AdminSummary,
            ManagerSummary,
            GuardSummary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Guard", description = "Guard management APIs"),
        (name = "Site", description = "Site and duty post APIs"),
        (name = "Assignment", description = "Assignment management APIs"),
        (name = "Attendance", description = "Attendance tracking APIs"),
        (name = "Dashboard", description = "Role-scoped dashboard APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
