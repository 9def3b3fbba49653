// Plan document: storage, typed view, print HTML and the HTTP handlers over them.

pub mod handlers;
pub mod html;
pub mod model;
pub mod store;

pub use model::PlanDocument;
pub use store::{FilePlanStore, PlanSource};
