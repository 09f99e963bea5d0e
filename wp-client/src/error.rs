use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Источник ошибки `WordPressError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// Сервер вернул XML-RPC fault.
    Fault,
    /// Сбой обнаружен клиентом по результату вызова (fault не было).
    Client,
}

/// Доменная ошибка WordPress: код и сообщение.
///
/// Для ошибок, обнаруженных клиентом, код всегда равен `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPressError {
    /// Код ошибки (`faultCode` либо `0`).
    pub code: i32,
    /// Текст ошибки (`faultString` либо описание от клиента).
    pub message: String,
    /// Откуда пришла ошибка.
    pub origin: ErrorOrigin,
}

impl WordPressError {
    /// Оборачивает XML-RPC fault.
    pub fn from_fault(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            origin: ErrorOrigin::Fault,
        }
    }

    /// Ошибка, обнаруженная клиентом, с кодом `0`.
    pub fn client(message: impl Into<String>) -> Self {
        Self {
            code: 0,
            message: message.into(),
            origin: ErrorOrigin::Client,
        }
    }

    /// `true`, если ошибка пришла от сервера в виде fault.
    pub fn is_fault(&self) -> bool {
        self.origin == ErrorOrigin::Fault
    }
}

impl fmt::Display for WordPressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WordPressError {}: '{}'", self.code, self.message)
    }
}

impl StdError for WordPressError {}

/// Результат одного удалённого вызова на уровне транспорта.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Сервер ответил XML-RPC fault.
    #[error("xml-rpc fault {code}: {message}")]
    Fault {
        /// `faultCode`.
        code: i32,
        /// `faultString`.
        message: String,
    },

    /// Любая другая ошибка транспорта: сеть, HTTP-статус, битый XML.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),
}

/// Запись с сервера не удалось привести к доменной модели.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed '{field}': {message}")]
pub struct DecodeError {
    /// Ключ записи (или `<record>` для записи целиком).
    pub field: String,
    /// Что именно не так.
    pub message: String,
}

impl DecodeError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Ошибки клиентской библиотеки `wp-client`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Доменная ошибка WordPress (fault или сбой, обнаруженный клиентом).
    #[error(transparent)]
    WordPress(#[from] WordPressError),

    /// Ошибка транспорта, пробрасывается без интерпретации.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Ответ сервера не соответствует ожидаемой структуре.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Не удалось прочитать локальный файл.
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// В блоге нет ни одного поста.
    #[error("blog has no posts")]
    NoPosts,
}

/// Результат операций `wp-client`.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Возвращает доменную ошибку, если это она.
    pub fn as_wordpress(&self) -> Option<&WordPressError> {
        match self {
            Self::WordPress(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RpcError> for ClientError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Fault { code, message } => {
                Self::WordPress(WordPressError::from_fault(code, message))
            }
            RpcError::Transport(source) => Self::Transport(source),
        }
    }
}
