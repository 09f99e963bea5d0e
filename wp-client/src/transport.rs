use std::error::Error as StdError;

use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use xmlrpc::{Request, Value};

use crate::error::{ClientError, ClientResult, RpcError};

/// Транспорт удалённых вызовов: имя метода и позиционные аргументы.
///
/// Реализация выполняет ровно один блокирующий вызов без повторов.
pub trait RpcTransport {
    /// Вызывает метод `method` и возвращает декодированный результат.
    fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value, RpcError>;
}

#[derive(Debug, Clone)]
/// XML-RPC поверх HTTP POST на фиксированный endpoint (`.../xmlrpc.php`).
pub struct XmlRpcTransport {
    endpoint: String,
    client: Client,
}

impl XmlRpcTransport {
    /// Создаёт транспорт для endpoint.
    pub fn new(endpoint: impl Into<String>) -> ClientResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("wp-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport(Box::new(e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Адрес XML-RPC endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RpcTransport for XmlRpcTransport {
    fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value, RpcError> {
        debug!(method, args = args.len(), "xml-rpc call");

        let request = build_request(method, args);
        let post = HttpPost {
            client: &self.client,
            endpoint: &self.endpoint,
        };

        request.call(post).map_err(|err| match err.fault() {
            Some(fault) => RpcError::Fault {
                code: fault.fault_code,
                message: fault.fault_string.clone(),
            },
            None => RpcError::Transport(Box::new(err)),
        })
    }
}

fn build_request(method: &str, args: Vec<Value>) -> Request<'_> {
    args.into_iter()
        .fold(Request::new(method), |request, arg| request.arg(arg))
}

/// Один HTTP POST с телом `methodCall`.
struct HttpPost<'a> {
    client: &'a Client,
    endpoint: &'a str,
}

impl xmlrpc::Transport for HttpPost<'_> {
    type Stream = Response;

    fn transmit(self, request: &Request<'_>) -> Result<Self::Stream, Box<dyn StdError + Send + Sync>> {
        let mut body = Vec::new();
        request.write_as_xml(&mut body)?;

        let response = self
            .client
            .post(self.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body)
            .send()?
            .error_for_status()?;

        Ok(response)
    }
}
