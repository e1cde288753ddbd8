pub mod create;
pub mod drop;
pub mod dump;
pub mod init;
pub mod replay;

use async_trait::async_trait;

#[async_trait]
pub trait Action {
    async fn execute(&self) -> anyhow::Result<()>;
}
