use frontpage_api::FrontpageError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("startup: {0}")]
    Startup(#[from] FrontpageError),

    #[error("serve: {0}")]
    Serve(String),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
