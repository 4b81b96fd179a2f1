pub mod auth;
pub mod call_report_service;
pub mod company_service;
pub mod customer_service;
pub mod policy;
pub mod rbac_service;
pub mod service_type_service;
pub mod user_service;

pub use call_report_service::CallReportService;
pub use company_service::CompanyService;
pub use customer_service::CustomerService;
pub use rbac_service::RbacService;
pub use service_type_service::ServiceTypeService;
pub use user_service::UserService;
