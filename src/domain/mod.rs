pub mod feed;
pub mod article;
pub mod bookmark;
pub mod channel;

pub use feed::Feed;
pub use article::{canonicalize, strip_html, Article};
pub use bookmark::Bookmark;
pub use channel::{RawChannel, RawItem};
