//! Small macros shared by the HTTP front door.

/// Generate a `routes(&mut ServiceConfig)` function.
///
/// `route` entries register actix handlers declared in the current module,
/// `mod` entries declare a child module and call its own `routes` function.
///
/// ```ignore
/// macros_utils::routes! {
///     mod health,
///     mod monitors,
/// }
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($(route $handler:ident),+ $(,)?) => {
        pub fn routes(cfg: &mut ::actix_web::web::ServiceConfig) {
            $(cfg.service($handler);)+
        }
    };
    ($(mod $module:ident),+ $(,)?) => {
        $(mod $module;)+

        pub fn routes(cfg: &mut ::actix_web::web::ServiceConfig) {
            $($module::routes(cfg);)+
        }
    };
}
