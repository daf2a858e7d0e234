pub mod alert;
pub mod article;
pub mod sentiment;
pub mod user;
pub mod watchlist;

pub use alert::{Alert, AlertKind};
pub use article::{RawArticle, SelectedArticle};
pub use sentiment::{Sentiment, SentimentResult};
pub use user::User;
pub use watchlist::WatchlistItem;
