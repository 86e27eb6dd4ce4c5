use thiserror::Error;

/// Errors that can occur while scraping recipes or computing their nutrition
#[derive(Error, Debug)]
pub enum RecipeError {
    /// The recipe page redirected away or the recipe does not exist
    #[error("recipe not found")]
    NotFound,

    /// The search page explicitly reported zero results
    #[error("no recipes found")]
    NoResults,

    /// A site URL could not be built from the configured base URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to fetch a page from the recipe site
    #[error("Failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),

    /// The recipe or product repository failed
    #[error("Repository error: {0}")]
    Repository(String),

    /// The product catalog could not be read
    #[error("Failed to load products: {0}")]
    ProductLoad(#[from] csv::Error),

    /// Filesystem error from a file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A substitution referenced an ingredient that does not exist
    #[error("Ingredient index {0} is out of range")]
    InvalidIngredient(usize),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl RecipeError {
    /// HTTP status code declared for this error.
    pub fn code(&self) -> u16 {
        match self {
            RecipeError::NotFound | RecipeError::NoResults => 400,
            _ => 500,
        }
    }
}
