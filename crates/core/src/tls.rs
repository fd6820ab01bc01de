use tracing::debug;

/// # Summary
/// 安装进程级的 rustls 加密提供者 (ring)。
///
/// # Logic
/// 1. reqwest 以 `rustls-no-provider` 方式编译，构造客户端前必须存在默认 CryptoProvider。
/// 2. 重复安装会返回错误，此时说明已有提供者，直接忽略。
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}
