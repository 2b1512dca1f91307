pub mod article;
pub mod event;
pub mod response;

pub use article::{Article, Source};
pub use event::ApiEvent;
pub use response::{ApiErrorBody, NewsApiResponse};
