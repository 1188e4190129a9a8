use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("no pool named '{0}'")]
    PoolNotFound(String),

    #[error("no healthy proxy available in pool '{0}'")]
    NoHealthyProxy(String),
}
