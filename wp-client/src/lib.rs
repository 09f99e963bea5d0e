//! Клиентская библиотека для XML-RPC API блога WordPress.
//!
//! Покрывает три семейства методов: `blogger.*`/`metaWeblog.*`,
//! расширения MovableType (`mt.*`) и собственные методы WordPress (`wp.*`).
//!
//! - `transport` — один блокирующий удалённый вызов (`xmlrpc` + `reqwest`);
//! - `filters` — XML-RPC записи ⇄ доменные модели;
//! - `WordPressClient` — операции блога, выбранный блог и кэш рубрик.
//!
//! XML-RPC fault превращается в `WordPressError` с кодом и сообщением,
//! прочие ошибки транспорта пробрасываются как есть.
#![warn(missing_docs)]

mod client;
mod error;
mod filters;
mod models;
mod transport;

pub use client::{Batch, DEFAULT_RECENT_POSTS, DEFAULT_SUGGESTIONS, WordPressClient};
pub use error::{ClientError, ClientResult, DecodeError, ErrorOrigin, RpcError, WordPressError};
pub use models::{Blog, Category, Comment, CommentQuery, Post, Tag, TrackbackPing, User};
pub use transport::{RpcTransport, XmlRpcTransport};

/// Значения XML-RPC, которыми оперирует `RpcTransport`.
pub use xmlrpc::Value;
