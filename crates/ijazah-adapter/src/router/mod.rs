/*
[INPUT]:  Auth store and route declarations
[OUTPUT]: Navigation decisions for the application's pages
[POS]:    Router layer - page access control
[UPDATE]: When routes or guard rules change
*/

pub mod guard;
pub mod routes;

pub use guard::{Navigation, RouteGuard, decide};
pub use routes::{HOME_PATH, LOGIN_PATH, Route, RouteMatch, RouteTable};
