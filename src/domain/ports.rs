use crate::utils::error::Result;
use std::path::Path;

pub trait Storage: Send + Sync {
    fn exists(&self, path: &Path) -> impl std::future::Future<Output = Result<bool>> + Send;
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
